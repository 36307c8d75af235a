//! Contest status sweep
//!
//! Periodic task that keeps each contest's cached status in step with the
//! wall clock and starts/stops submission pollers to match. The cached
//! status only ever lags the clock, never leads it, and transitions are
//! one-way: a sweep can never regress a contest.

use chrono::Utc;

use crate::{
    db::repositories::ContestRepository,
    error::AppResult,
    models::ContestStatus,
    services::notify_service::NotifyService,
    state::AppState,
};

/// Run the status sweep as a background task.
pub async fn run_status_sweep(state: AppState) {
    let sweep_interval = state.config().monitor.sweep_interval;

    tracing::info!(
        interval_secs = sweep_interval.as_secs(),
        "Starting contest status sweep"
    );

    let mut interval = tokio::time::interval(sweep_interval);

    loop {
        interval.tick().await;

        if let Err(e) = sweep_contest_statuses(&state).await {
            tracing::error!(error = %e, "Contest status sweep failed");
        }
    }
}

/// One sweep pass: flip due contests and reconcile pollers.
///
/// Idempotent; rerunning against an already-correct state changes nothing.
pub async fn sweep_contest_statuses(state: &AppState) -> AppResult<()> {
    let now = Utc::now();

    let started = ContestRepository::mark_due_started(state.db(), now).await?;
    for id in &started {
        tracing::info!(contest_id = %id, "Contest is now ongoing");
        NotifyService::contest_updated(state.redis(), id).await;
    }

    let completed = ContestRepository::mark_due_completed(state.db(), now).await?;
    for id in &completed {
        tracing::info!(contest_id = %id, "Contest completed");
        state.monitor().stop_monitoring(id).await;
        NotifyService::contest_updated(state.redis(), id).await;
    }

    // Ensure every ongoing contest has a poller. Start is a no-op for
    // contests already monitored, and this re-attaches pollers after a
    // process restart.
    let ongoing = ContestRepository::ids_by_status(state.db(), ContestStatus::Ongoing).await?;
    for id in ongoing {
        if let Err(e) = state.monitor().start_monitoring(id).await {
            tracing::error!(
                contest_id = %id,
                error = %e,
                "Failed to start submission poller"
            );
        }
    }

    Ok(())
}
