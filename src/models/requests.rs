use serde::{Deserialize, Serialize};

use crate::{
    core::{MAX_EMAIL_LENGTH, MAX_PASSWORD_LENGTH, MAX_USERNAME_LENGTH},
    error::AuthError,
};

/// Validate a username as typed by the user
///
/// # Validation Rules
///
/// - Must not be empty or whitespace only
/// - At most 64 characters
/// - No control characters
pub fn validate_username(username: &str) -> Result<(), AuthError> {
    if username.trim().is_empty() {
        return Err(AuthError::InvalidRequest("Username is required".to_string()));
    }

    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(AuthError::InvalidRequest(format!(
            "Username must be {} characters or less",
            MAX_USERNAME_LENGTH
        )));
    }

    if username.chars().any(char::is_control) {
        return Err(AuthError::InvalidRequest(
            "Username must not contain control characters".to_string(),
        ));
    }

    Ok(())
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.is_empty() {
        return Err(AuthError::InvalidRequest("Password is required".to_string()));
    }

    if password.chars().count() > MAX_PASSWORD_LENGTH {
        return Err(AuthError::InvalidRequest(format!(
            "Password must be {} characters or less",
            MAX_PASSWORD_LENGTH
        )));
    }

    Ok(())
}

/// Body of signup and login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn validate(&self) -> Result<(), AuthError> {
        validate_username(&self.username)?;
        validate_password(&self.password)
    }
}

/// Body of re-login; the password may be omitted for an already
/// authenticated session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReLoginRequest {
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
}

impl ReLoginRequest {
    /// The supplied password, treating an empty string as absent
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }

    pub fn validate(&self) -> Result<(), AuthError> {
        validate_username(&self.username)?;
        match self.password() {
            Some(password) => validate_password(password),
            None => Ok(()),
        }
    }
}

/// Body of email submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitEmailRequest {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl SubmitEmailRequest {
    pub fn validate(&self) -> Result<(), AuthError> {
        validate_username(&self.username)?;
        if let Some(email) = &self.email {
            if email.chars().count() > MAX_EMAIL_LENGTH {
                return Err(AuthError::InvalidRequest(format!(
                    "Email must be {} characters or less",
                    MAX_EMAIL_LENGTH
                )));
            }
        }
        Ok(())
    }
}

/// Body of email lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindEmailRequest {
    pub username: String,
}
