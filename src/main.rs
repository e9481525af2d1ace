use anyhow::Context;
use std::net::SocketAddr;

use parlor::{
    auth::Argon2Hasher, config::Config, core::SWEEP_INTERVAL_SECONDS, routes::build_router,
    services::spawn_sweeper, state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parlor=info,tower_http=warn".into()),
        )
        .init();

    let config = Config::from_env().context("failed to load configuration")?;
    tracing::info!("Starting parlor in {} mode", config.environment);

    let passwords = match (config.password_memory_kib, config.password_iterations) {
        (None, None) => Argon2Hasher::new(),
        (memory, iterations) => Argon2Hasher::with_cost(
            memory.unwrap_or(argon2::Params::DEFAULT_M_COST),
            iterations.unwrap_or(argon2::Params::DEFAULT_T_COST),
        )?,
    };

    let mut state = AppState::in_memory(config.session_secret.clone(), passwords);
    // Plain-HTTP local runs need non-Secure cookies
    state.secure_cookies = !config.is_development();

    spawn_sweeper(
        state.clone(),
        std::time::Duration::from_secs(SWEEP_INTERVAL_SECONDS),
    );

    let app = build_router(state, &config.allowed_origins);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;

    tracing::info!("Server listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("server error")?;

    tracing::info!("Shutting down");
    Ok(())
}
