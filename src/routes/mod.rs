pub mod health;
pub mod user;
pub mod websocket;

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    middleware::{rate_limit_middleware, security_headers_middleware},
    state::AppState,
};

/// Build the full application router with its middleware stack
///
/// # Arguments
///
/// * `state` - Shared application state
/// * `allowed_origins` - Origins allowed to send credentialed requests
pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health::health_check))
        // Accounts and session
        .route("/user/signup", post(user::signup))
        .route("/user/login", post(user::login))
        .route("/user/reLogin", post(user::re_login))
        .route("/user/logout", post(user::logout))
        .route("/user/submitEmail", post(user::submit_email))
        .route("/user/findEmail", post(user::find_email))
        .route("/user/status", get(user::status))
        // WebSocket
        .route("/ws", get(websocket::websocket_handler))
        .with_state(state)
        // Add middleware layers (applied in reverse order)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(security_headers_middleware))
                .layer(middleware::from_fn(rate_limit_middleware))
                .layer(cors),
        )
}
