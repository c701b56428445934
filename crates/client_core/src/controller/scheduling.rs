//! State container for the appointment scheduling screen.
//!
//! Every user action is a method on [`SchedulingController`]. Actions that
//! change the (provider, date) pair return `true` when availability must be
//! reloaded; the caller decides when to run [`SchedulingController::load_availability`]
//! or drive the ticket pair itself.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Local, TimeZone, Utc};
use shared::{
    domain::{AvailabilitySlot, Platform, Provider, ProviderId, User},
    protocol::{CreateAppointmentRequest, DayAvailabilityQuery, RouteParams},
    schedule::{appointment_time, minimum_bookable_date, slots_in_period, DayPeriod, HourSlot},
};
use tracing::{debug, info, warn};

use crate::{
    controller::events::{Alert, Route, ScreenEvent},
    SchedulingApi,
};

pub const HEADER_TITLE: &str = "Cabeleireiros";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPhase {
    #[default]
    Idle,
    Loading,
    Loaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitPhase {
    #[default]
    Idle,
    Submitting,
    Submitted,
    Failed,
}

/// Dates live in the user's own zone so that picking another day resolves
/// that day's offset, not today's.
#[derive(Debug, Clone)]
pub struct SchedulingState<Tz: TimeZone> {
    pub providers: Vec<Provider>,
    pub selected_provider: ProviderId,
    pub selected_date: DateTime<Tz>,
    /// `None` until the user taps a slot.
    pub selected_hour: Option<u8>,
    pub availability: Vec<AvailabilitySlot>,
    pub show_date_picker: bool,
    pub minimum_date: DateTime<Tz>,
}

/// An issued availability request. Only the most recently issued ticket may
/// write its result into the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityTicket {
    seq: u64,
    pub provider_id: ProviderId,
    pub query: DayAvailabilityQuery,
}

impl AvailabilityTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

pub struct ScreenHeader<'a> {
    pub title: &'static str,
    pub avatar_url: Option<&'a str>,
}

pub struct SchedulingController<A: SchedulingApi + ?Sized, Tz: TimeZone = Local> {
    api: Arc<A>,
    platform: Platform,
    user: Option<User>,
    state: SchedulingState<Tz>,
    latest_availability_seq: u64,
    providers_phase: LoadPhase,
    availability_phase: LoadPhase,
    submit_phase: SubmitPhase,
}

impl<A: SchedulingApi + ?Sized, Tz: TimeZone> SchedulingController<A, Tz> {
    /// `now` is the local wall-clock time the screen opens at; the minimum
    /// bookable date is derived from it once.
    pub fn new(
        api: Arc<A>,
        params: RouteParams,
        now: DateTime<Tz>,
        platform: Platform,
    ) -> Self {
        let minimum_date = minimum_bookable_date(now);
        Self {
            api,
            platform,
            user: None,
            state: SchedulingState {
                providers: Vec::new(),
                selected_provider: params.provider_id,
                selected_date: minimum_date.clone(),
                selected_hour: None,
                availability: Vec::new(),
                show_date_picker: false,
                minimum_date,
            },
            latest_availability_seq: 0,
            providers_phase: LoadPhase::Idle,
            availability_phase: LoadPhase::Idle,
            submit_phase: SubmitPhase::Idle,
        }
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }

    pub fn state(&self) -> &SchedulingState<Tz> {
        &self.state
    }

    pub fn providers_phase(&self) -> LoadPhase {
        self.providers_phase
    }

    pub fn availability_phase(&self) -> LoadPhase {
        self.availability_phase
    }

    pub fn submit_phase(&self) -> SubmitPhase {
        self.submit_phase
    }

    pub fn header(&self) -> ScreenHeader<'_> {
        ScreenHeader {
            title: HEADER_TITLE,
            avatar_url: self.user.as_ref().and_then(|user| user.avatar_url.as_deref()),
        }
    }

    pub async fn load_providers(&mut self) {
        self.providers_phase = LoadPhase::Loading;
        let result = self.api.list_providers().await;
        self.apply_providers(result);
    }

    /// Stores a provider list fetched by the caller. Failures leave the
    /// previous list in place.
    pub fn apply_providers(&mut self, result: Result<Vec<Provider>>) {
        match result {
            Ok(providers) => {
                debug!(count = providers.len(), "providers loaded");
                self.state.providers = providers;
                self.providers_phase = LoadPhase::Loaded;
            }
            Err(err) => {
                warn!(error = %err, "providers fetch failed; keeping previous list");
                self.providers_phase = if self.state.providers.is_empty() {
                    LoadPhase::Idle
                } else {
                    LoadPhase::Loaded
                };
            }
        }
    }

    /// Issues a ticket for the current (provider, date) pair, superseding any
    /// ticket issued before.
    pub fn request_availability(&mut self) -> AvailabilityTicket {
        self.latest_availability_seq += 1;
        self.availability_phase = LoadPhase::Loading;
        AvailabilityTicket {
            seq: self.latest_availability_seq,
            provider_id: self.state.selected_provider.clone(),
            query: DayAvailabilityQuery::for_date(&self.state.selected_date),
        }
    }

    /// Applies the outcome of `ticket`. Returns whether the state changed;
    /// results of superseded tickets and failures are dropped. Slots with an
    /// hour outside 0..=23 are discarded.
    pub fn complete_availability(
        &mut self,
        ticket: AvailabilityTicket,
        result: Result<Vec<AvailabilitySlot>>,
    ) -> bool {
        if ticket.seq != self.latest_availability_seq {
            debug!(
                seq = ticket.seq,
                latest = self.latest_availability_seq,
                provider_id = %ticket.provider_id,
                "dropping stale availability response"
            );
            return false;
        }

        match result {
            Ok(mut slots) => {
                let received = slots.len();
                slots.retain(|slot| slot.hour < 24);
                if slots.len() != received {
                    warn!(
                        provider_id = %ticket.provider_id,
                        dropped = received - slots.len(),
                        "discarding availability slots with out-of-range hours"
                    );
                }
                self.state.availability = slots;
                self.availability_phase = LoadPhase::Loaded;
                true
            }
            Err(err) => {
                warn!(
                    provider_id = %ticket.provider_id,
                    error = %err,
                    "availability fetch failed; keeping previous slots"
                );
                self.availability_phase = if self.state.availability.is_empty() {
                    LoadPhase::Idle
                } else {
                    LoadPhase::Loaded
                };
                false
            }
        }
    }

    pub async fn load_availability(&mut self) -> bool {
        let ticket = self.request_availability();
        let result = self
            .api
            .day_availability(&ticket.provider_id, ticket.query)
            .await;
        self.complete_availability(ticket, result)
    }

    pub fn toggle_date_picker(&mut self) {
        self.state.show_date_picker = !self.state.show_date_picker;
    }

    /// Date picker callback. `None` means the user dismissed the picker.
    pub fn on_date_changed(&mut self, date: Option<DateTime<Tz>>) -> bool {
        if self.platform.dismisses_picker_on_select() {
            self.state.show_date_picker = false;
        }
        match date {
            Some(date) => {
                self.state.selected_date = date;
                true
            }
            None => false,
        }
    }

    /// Returns `false` when `provider_id` was already selected.
    pub fn select_provider(&mut self, provider_id: ProviderId) -> bool {
        let changed = self.state.selected_provider != provider_id;
        self.state.selected_provider = provider_id;
        changed
    }

    pub fn select_hour(&mut self, hour: u8) {
        self.state.selected_hour = Some(hour);
    }

    pub fn is_provider_selected(&self, provider_id: &ProviderId) -> bool {
        &self.state.selected_provider == provider_id
    }

    pub fn is_hour_selected(&self, hour: u8) -> bool {
        self.state.selected_hour == Some(hour)
    }

    pub fn morning_slots(&self) -> Vec<HourSlot> {
        slots_in_period(&self.state.availability, DayPeriod::Morning)
    }

    pub fn afternoon_slots(&self) -> Vec<HourSlot> {
        slots_in_period(&self.state.availability, DayPeriod::Afternoon)
    }

    /// The time that [`submit`](Self::submit) would book. An unselected hour
    /// books midnight.
    pub fn appointment_date(&self) -> Result<DateTime<Tz>> {
        let hour = self.state.selected_hour.unwrap_or(0);
        appointment_time(&self.state.selected_date, hour)
            .ok_or_else(|| anyhow!("{hour}:00 does not exist on the selected day"))
    }

    /// Books the current selection. The selection is left untouched whatever
    /// the outcome so the user can retry.
    pub async fn submit(&mut self) -> ScreenEvent {
        self.submit_phase = SubmitPhase::Submitting;
        match self.try_submit().await {
            Ok(date) => {
                info!(
                    provider_id = %self.state.selected_provider,
                    date = %date.with_timezone(&Utc),
                    "appointment created"
                );
                self.submit_phase = SubmitPhase::Submitted;
                ScreenEvent::Navigate(Route::AppointmentCreated {
                    date: date.timestamp_millis(),
                })
            }
            Err(err) => {
                warn!(
                    provider_id = %self.state.selected_provider,
                    error = %err,
                    "appointment creation failed"
                );
                self.submit_phase = SubmitPhase::Failed;
                ScreenEvent::Alert(Alert::CREATE_APPOINTMENT_FAILED)
            }
        }
    }

    async fn try_submit(&self) -> Result<DateTime<Tz>> {
        let date = self.appointment_date()?;
        let request = CreateAppointmentRequest {
            provider_id: self.state.selected_provider.clone(),
            date: date.with_timezone(&Utc),
        };
        self.api.create_appointment(&request).await?;
        Ok(date)
    }

    pub fn navigate_back(&self) -> ScreenEvent {
        ScreenEvent::Navigate(Route::Back)
    }
}

#[cfg(test)]
#[path = "tests/scheduling_tests.rs"]
mod tests;
