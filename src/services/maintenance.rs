//! Periodic cleanup of server-side session state

use std::time::Duration;
use tokio::{task::JoinHandle, time::MissedTickBehavior};

use crate::state::AppState;

/// Remove expired sessions, their room memberships, and rooms nobody
/// listens on any more
///
/// # Returns
///
/// Number of sessions and rooms removed
pub async fn sweep(state: &AppState) -> anyhow::Result<(usize, usize)> {
    let expired = state.sessions.sweep_expired().await?;
    for session_id in &expired {
        state.broadcaster.leave_all(session_id).await;
    }

    let rooms = state.broadcaster.prune().await;
    Ok((expired.len(), rooms))
}

/// Run [`sweep`] on a fixed period for the lifetime of the process
pub fn spawn_sweeper(state: AppState, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick fires immediately; nothing can have expired yet
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match sweep(&state).await {
                Ok((0, 0)) => {}
                Ok((sessions, rooms)) => {
                    tracing::info!("Swept {} expired sessions and {} idle rooms", sessions, rooms)
                }
                Err(e) => tracing::warn!("Session sweep failed: {:#}", e),
            }
        }
    })
}
