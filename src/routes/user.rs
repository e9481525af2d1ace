use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    auth::SessionContext,
    error::AuthError,
    models::{Credentials, FindEmailRequest, ReLoginRequest, StatusResponse, SubmitEmailRequest},
    services::accounts,
    state::AppState,
};

/// Register a new user and log the caller in
///
/// Signup, login and reLogin all move the session to a new id on success;
/// the cookie the caller arrived with stops working.
///
/// # Returns
///
/// The new user's id, with the session cookie set
pub async fn signup(
    State(state): State<AppState>,
    mut ctx: SessionContext,
    Json(creds): Json<Credentials>,
) -> Result<(CookieJar, Json<u64>), AuthError> {
    let previous = ctx.renew_id();
    let id = accounts::signup(&state, &mut ctx.session, &creds).await?;
    SessionContext::retire(&state, &previous).await?;
    let jar = ctx.commit(&state).await?;
    Ok((jar, Json(id)))
}

/// Log the caller in with username and password
///
/// # Returns
///
/// The user's id, with the session cookie set
pub async fn login(
    State(state): State<AppState>,
    mut ctx: SessionContext,
    Json(creds): Json<Credentials>,
) -> Result<(CookieJar, Json<u64>), AuthError> {
    let previous = ctx.renew_id();
    let id = accounts::login(&state, &mut ctx.session, &creds).await?;
    SessionContext::retire(&state, &previous).await?;
    let jar = ctx.commit(&state).await?;
    Ok((jar, Json(id)))
}

/// Restore the caller's session and game subscriptions after a reconnect
///
/// # Returns
///
/// Empty 200 with the session cookie set
pub async fn re_login(
    State(state): State<AppState>,
    mut ctx: SessionContext,
    Json(req): Json<ReLoginRequest>,
) -> Result<(CookieJar, StatusCode), AuthError> {
    // Rooms are joined under the new id, so renew before re-logging in
    let previous = ctx.renew_id();
    accounts::re_login(&state, &ctx.id, &mut ctx.session, &req).await?;
    SessionContext::retire(&state, &previous).await?;
    let jar = ctx.commit(&state).await?;
    Ok((jar, StatusCode::OK))
}

/// Log the caller out; always succeeds
pub async fn logout(State(state): State<AppState>, mut ctx: SessionContext) -> StatusCode {
    accounts::logout(&state, &ctx.id, &mut ctx.session).await;
    StatusCode::OK
}

/// Store an email for a username
///
/// # Returns
///
/// The updated user's id
pub async fn submit_email(
    State(state): State<AppState>,
    Json(req): Json<SubmitEmailRequest>,
) -> Result<Json<u64>, AuthError> {
    accounts::submit_email(&state, &req).await.map(Json)
}

/// Look up the email stored for a username
///
/// # Returns
///
/// The email as a JSON string, or null if none was submitted
pub async fn find_email(
    State(state): State<AppState>,
    Json(req): Json<FindEmailRequest>,
) -> Result<Json<Option<String>>, AuthError> {
    accounts::find_email(&state, &req).await.map(Json)
}

/// Report the caller's authentication state
///
/// # Returns
///
/// `{id, username, authenticated, gameId}` for a valid session,
/// `{authenticated: false}` for an anonymous one
pub async fn status(
    State(state): State<AppState>,
    mut ctx: SessionContext,
) -> Result<Json<StatusResponse>, AuthError> {
    accounts::status(&state, &ctx.id, &mut ctx.session)
        .await
        .map(Json)
}
