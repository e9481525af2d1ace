use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use super::token::{generate_session_token, verify_session_token};
use crate::{
    core::{Session, SESSION_COOKIE, SESSION_TTL_SECONDS},
    error::AuthError,
    state::AppState,
};

/// The caller's session, resolved from the signed `sid` cookie
///
/// A missing, forged, or expired cookie yields a fresh anonymous session
/// under a new id. Changes to `session` are only stored by [`commit`].
///
/// [`commit`]: SessionContext::commit
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub id: String,
    pub session: Session,
    jar: CookieJar,
}

#[async_trait]
impl FromRequestParts<AppState> for SessionContext {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar.get(SESSION_COOKIE).map(|c| c.value());

        let stored = match verify_session_token(token, &state.secret_key) {
            Some((id, _expiry)) => {
                let session = state.sessions.read(&id).await?;
                session.map(|session| (id, session))
            }
            None => None,
        };

        let (id, session) = match stored {
            Some(found) => found,
            None => (uuid::Uuid::new_v4().to_string(), Session::default()),
        };

        Ok(Self { id, session, jar })
    }
}

impl SessionContext {
    /// Move the session to a freshly generated id
    ///
    /// Called before a request authenticates, so an id handed out while
    /// anonymous never ends up logged in. Nothing is stored until
    /// [`commit`](Self::commit); pass the returned id to
    /// [`retire`](Self::retire) once the login has succeeded.
    ///
    /// # Returns
    ///
    /// The id the session had before
    pub fn renew_id(&mut self) -> String {
        std::mem::replace(&mut self.id, uuid::Uuid::new_v4().to_string())
    }

    /// Drop everything still held under an id replaced by
    /// [`renew_id`](Self::renew_id)
    pub async fn retire(state: &AppState, previous_id: &str) -> Result<(), AuthError> {
        state.broadcaster.leave_all(previous_id).await;
        state.sessions.clear(previous_id).await?;
        Ok(())
    }

    /// Persist the session and refresh its cookie
    ///
    /// # Returns
    ///
    /// Cookie jar to attach to the response
    pub async fn commit(self, state: &AppState) -> Result<CookieJar, AuthError> {
        state.sessions.write(&self.id, self.session).await?;

        let token =
            generate_session_token(&self.id, &state.secret_key).map_err(AuthError::Dependency)?;

        let cookie = Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .secure(state.secure_cookies)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::seconds(SESSION_TTL_SECONDS as i64))
            .build();

        Ok(self.jar.add(cookie))
    }
}
