//! Profile form state and the checks run before it is sent.

use shared::protocol::UpdateProfileRequest;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileValidationError {
    #[error("name is required")]
    MissingName,
    #[error("a valid e-mail is required")]
    InvalidEmail,
    #[error("current password is required to set a new one")]
    MissingOldPassword,
    #[error("password confirmation does not match")]
    PasswordMismatch,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    pub old_password: String,
    pub password: String,
    pub password_confirmation: String,
}

impl ProfileUpdate {
    pub fn validate(&self) -> Result<UpdateProfileRequest, ProfileValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ProfileValidationError::MissingName);
        }

        let email = self.email.trim();
        let valid_email = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !valid_email {
            return Err(ProfileValidationError::InvalidEmail);
        }

        // Password fields are only sent together.
        if self.password.is_empty() {
            return Ok(UpdateProfileRequest {
                name: name.to_string(),
                email: email.to_string(),
                ..UpdateProfileRequest::default()
            });
        }
        if self.old_password.is_empty() {
            return Err(ProfileValidationError::MissingOldPassword);
        }
        if self.password != self.password_confirmation {
            return Err(ProfileValidationError::PasswordMismatch);
        }

        Ok(UpdateProfileRequest {
            name: name.to_string(),
            email: email.to_string(),
            old_password: Some(self.old_password.clone()),
            password: Some(self.password.clone()),
            password_confirmation: Some(self.password_confirmation.clone()),
        })
    }
}
