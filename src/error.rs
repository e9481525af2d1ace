use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Failures of the account endpoints
///
/// Every variant renders as `400 Bad Request`; the tag in the body tells
/// clients which one happened.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("That username is already registered to another user; try logging in!")]
    DuplicateUsername,

    #[error("Could not find that user with that username. Try signing up!")]
    UserNotFound,

    #[error("Username and password do not match")]
    InvalidPassword,

    #[error("Unable to save email to user")]
    UpdateFailed,

    #[error("{0}")]
    InvalidRequest(String),

    /// A collaborator (store, hasher, game service) failed
    #[error("{0}")]
    Dependency(String),
}

impl AuthError {
    /// Stable tag sent to clients
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::DuplicateUsername => "duplicate_username",
            AuthError::UserNotFound => "user_not_found",
            AuthError::InvalidPassword => "invalid_password",
            AuthError::UpdateFailed => "update_failed",
            AuthError::InvalidRequest(_) => "invalid_request",
            AuthError::Dependency(_) => "dependency_failure",
        }
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        AuthError::Dependency(format!("{:#}", err))
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": self.kind(),
                "message": self.to_string(),
            })),
        )
            .into_response()
    }
}
