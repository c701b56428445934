use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use shared::{
    domain::{AvailabilitySlot, Provider, ProviderId, User},
    error::ApiException,
    protocol::{
        CreateAppointmentRequest, DayAvailabilityQuery, SessionResponse, SignInRequest,
    },
};
use tokio::sync::RwLock;
use tracing::{debug, info};

pub mod controller;
pub mod profile;

pub use controller::{
    events::{Alert, Route, ScreenEvent},
    scheduling::{
        AvailabilityTicket, LoadPhase, SchedulingController, SchedulingState, ScreenHeader,
        SubmitPhase,
    },
};
pub use profile::{ProfileUpdate, ProfileValidationError};

/// Remote calls the scheduling screen depends on.
#[async_trait]
pub trait SchedulingApi: Send + Sync {
    async fn list_providers(&self) -> Result<Vec<Provider>>;
    async fn day_availability(
        &self,
        provider_id: &ProviderId,
        query: DayAvailabilityQuery,
    ) -> Result<Vec<AvailabilitySlot>>;
    async fn create_appointment(&self, request: &CreateAppointmentRequest) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub token: String,
}

pub struct BookingClient {
    http: Client,
    api_url: String,
    session: RwLock<Option<Session>>,
}

impl BookingClient {
    pub fn new(api_url: impl Into<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self {
            http: Client::new(),
            api_url,
            session: RwLock::new(None),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.api_url)
    }

    async fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.read().await.as_ref() {
            Some(session) => request.bearer_auth(&session.token),
            None => request,
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User> {
        let response = self
            .http
            .post(self.endpoint("sessions"))
            .json(&SignInRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await
            .context("failed to reach booking API")?;
        let body: SessionResponse = ensure_success(response)
            .await
            .context("sign in rejected")?
            .json()
            .await
            .context("malformed session response")?;

        info!(user_id = %body.user.id, "signed in");
        let user = body.user.clone();
        *self.session.write().await = Some(Session {
            user: body.user,
            token: body.token,
        });
        Ok(user)
    }

    pub async fn sign_out(&self) {
        if self.session.write().await.take().is_some() {
            info!("signed out");
        }
    }

    pub async fn current_user(&self) -> Option<User> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|session| session.user.clone())
    }

    /// Validates `update` locally, sends it, and replaces the session user
    /// with the server's copy.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
        let request = update.validate()?;
        if self.session.read().await.is_none() {
            return Err(anyhow!("not signed in: missing session token"));
        }

        let response = self
            .authorize(self.http.put(self.endpoint("profile")))
            .await
            .json(&request)
            .send()
            .await?;
        let user: User = ensure_success(response)
            .await
            .context("profile update rejected")?
            .json()
            .await?;

        if let Some(session) = self.session.write().await.as_mut() {
            session.user = user.clone();
        }
        info!(user_id = %user.id, "profile updated");
        Ok(user)
    }
}

#[async_trait]
impl SchedulingApi for BookingClient {
    async fn list_providers(&self) -> Result<Vec<Provider>> {
        let response = self
            .authorize(self.http.get(self.endpoint("providers")))
            .await
            .send()
            .await?;
        let providers: Vec<Provider> = ensure_success(response).await?.json().await?;
        debug!(count = providers.len(), "providers fetched");
        Ok(providers)
    }

    async fn day_availability(
        &self,
        provider_id: &ProviderId,
        query: DayAvailabilityQuery,
    ) -> Result<Vec<AvailabilitySlot>> {
        let url = self.endpoint(&format!("providers/{provider_id}/day-availability"));
        let response = self
            .authorize(self.http.get(url))
            .await
            .query(&query)
            .send()
            .await?;
        let slots: Vec<AvailabilitySlot> = ensure_success(response).await?.json().await?;
        debug!(
            provider_id = %provider_id,
            year = query.year,
            month = query.month,
            day = query.day,
            count = slots.len(),
            "day availability fetched"
        );
        Ok(slots)
    }

    async fn create_appointment(&self, request: &CreateAppointmentRequest) -> Result<()> {
        let response = self
            .authorize(self.http.post(self.endpoint("appointments")))
            .await
            .json(request)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }
}

async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiException::from_response(status.as_u16(), &body).into())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
