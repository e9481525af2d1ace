//! Account operations behind the `/user` routes
//!
//! Each function takes the collaborators from [`AppState`] and the caller's
//! session explicitly. Callers are responsible for persisting the session
//! afterwards; only [`logout`] touches the session store itself.

use crate::{
    core::{game_room, Session, UsernameTaken, GAME_LIST_ROOM, PLAYERS_PER_GAME},
    error::AuthError,
    models::{
        game_updated_event, Credentials, FindEmailRequest, ReLoginRequest, StatusResponse,
        SubmitEmailRequest,
    },
    state::AppState,
};

/// Register a new user and log the session in as them
///
/// # Returns
///
/// The new user's id
///
/// # Errors
///
/// `DuplicateUsername` if the username is taken
pub async fn signup(
    state: &AppState,
    session: &mut Session,
    creds: &Credentials,
) -> Result<u64, AuthError> {
    creds.validate()?;

    if state.users.find_by_username(&creds.username).await?.is_some() {
        return Err(AuthError::DuplicateUsername);
    }

    let encrypted_password = state.passwords.hash(&creds.password).await?;
    let user = match state.users.create(&creds.username, &encrypted_password).await {
        Ok(user) => user,
        // Lost a race with a concurrent signup for the same name
        Err(e) if e.is::<UsernameTaken>() => return Err(AuthError::DuplicateUsername),
        Err(e) => return Err(e.into()),
    };

    session.authenticate(user.id);
    tracing::info!("User signed up: id={} username={}", user.id, user.username);

    Ok(user.id)
}

/// Log the session in with a username and password
///
/// # Returns
///
/// The user's id
///
/// # Errors
///
/// `UserNotFound` or `InvalidPassword`; the session is untouched on failure
pub async fn login(
    state: &AppState,
    session: &mut Session,
    creds: &Credentials,
) -> Result<u64, AuthError> {
    creds.validate()?;

    let user = state
        .users
        .find_by_username(&creds.username)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    if !state
        .passwords
        .verify(&creds.password, &user.encrypted_password)
        .await?
    {
        tracing::warn!("Failed login for username={}", creds.username);
        return Err(AuthError::InvalidPassword);
    }

    session.authenticate(user.id);
    tracing::info!("User logged in: id={}", user.id);

    Ok(user.id)
}

/// Restore a user's session and game context after a reconnect
///
/// The password is only checked when the session is not already logged in
/// and one was supplied. The check runs concurrently with loading the user's
/// game; the first failure wins.
///
/// On success the session is subscribed to the game's room, joins the game
/// list room, and the game's room receives an `updated` event.
pub async fn re_login(
    state: &AppState,
    session_id: &str,
    session: &mut Session,
    req: &ReLoginRequest,
) -> Result<(), AuthError> {
    req.validate()?;

    let user = state
        .users
        .find_by_username(&req.username)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    let password = if session.logged_in {
        if session.usr != Some(user.id) {
            // An authenticated session may re-login as any user without a password
            tracing::warn!(
                "Re-login as user id={} from session of user {:?} without password check",
                user.id,
                session.usr
            );
        }
        None
    } else {
        req.password()
    };

    let check_password = async {
        match password {
            Some(password) => {
                if state
                    .passwords
                    .verify(password, &user.encrypted_password)
                    .await?
                {
                    Ok(())
                } else {
                    Err(AuthError::InvalidPassword)
                }
            }
            None => Ok::<(), AuthError>(()),
        }
    };
    let populate_game = async {
        state
            .games
            .populate(user.game)
            .await
            .map_err(AuthError::from)
    };

    let (game, ()) = tokio::try_join!(populate_game, check_password)?;

    session.authenticate(user.id);
    session.game = Some(game.id);
    session.p_num = user.p_num;

    state.broadcaster.subscribe(session_id, game.id).await;
    state.broadcaster.join(session_id, GAME_LIST_ROOM).await;
    let reached = state
        .broadcaster
        .publish(&game_room(game.id), game_updated_event(&game))
        .await;

    tracing::info!(
        "User re-logged in: id={} game={} notified={}",
        user.id,
        game.id,
        reached
    );

    Ok(())
}

/// Tear the session down completely
///
/// Never fails; store errors are logged and the in-memory session is
/// cleared regardless.
pub async fn logout(state: &AppState, session_id: &str, session: &mut Session) {
    if let Some(user_id) = session.usr {
        tracing::info!("User logged out: id={}", user_id);
    }

    session.clear();
    state.broadcaster.leave_all(session_id).await;

    if let Err(e) = state.sessions.clear(session_id).await {
        tracing::warn!("Failed to clear stored session: {:#}", e);
    }
}

/// Set the email of the user matching the username
///
/// # Returns
///
/// The updated user's id
pub async fn submit_email(state: &AppState, req: &SubmitEmailRequest) -> Result<u64, AuthError> {
    req.validate()?;

    let user = state
        .users
        .update_email(&req.username, req.email.clone())
        .await?
        .ok_or(AuthError::UpdateFailed)?;

    Ok(user.id)
}

/// Look up the email stored for a username
///
/// # Returns
///
/// The email, or None if the user never submitted one
pub async fn find_email(
    state: &AppState,
    req: &FindEmailRequest,
) -> Result<Option<String>, AuthError> {
    let user = state
        .users
        .find_by_username(&req.username)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    Ok(user.email)
}

/// Report who the session belongs to, re-validating the user on every call
///
/// A logged-in session whose user cannot be confirmed is logged out before
/// the error is returned.
pub async fn status(
    state: &AppState,
    session_id: &str,
    session: &mut Session,
) -> Result<StatusResponse, AuthError> {
    let user_id = match session.usr {
        Some(id) if session.logged_in => id,
        _ => return Ok(StatusResponse::anonymous()),
    };

    match authenticated_status(state, user_id, session.game).await {
        Ok(response) => Ok(response),
        Err(e) => {
            tracing::warn!("Session for user id={} failed re-validation: {}", user_id, e);
            logout(state, session_id, session).await;
            Err(e)
        }
    }
}

/// Status body for a logged-in session
///
/// Only a missing user or a failing collaborator is an error here, and only
/// an error makes [`status`] log the session out. A game id that no longer
/// resolves to a game is not an error: it is reported as a null `gameId` and
/// the session stays logged in.
async fn authenticated_status(
    state: &AppState,
    user_id: u64,
    game_id: Option<u64>,
) -> Result<StatusResponse, AuthError> {
    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    let game = match game_id {
        Some(id) => state.games.find(id).await?,
        None => None,
    };

    let game_id = game
        .filter(|g| g.players.len() == PLAYERS_PER_GAME)
        .map(|g| g.id);

    Ok(StatusResponse::Authenticated {
        id: user.id,
        username: user.username,
        authenticated: true,
        game_id,
    })
}
