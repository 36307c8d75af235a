//! Submission monitoring
//!
//! One poller task per ongoing contest keeps the contest's submission log
//! current with the external judge. The [`SubmissionMonitor`] supervisor
//! owns the poller registry; nothing here lives in module-level state.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use sqlx::PgPool;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    config::MonitorConfig,
    db::repositories::{ContestRepository, UserRepository},
    error::AppResult,
    judge::{ExternalSubmission, JudgeFeed},
    models::{Contest, ContestStatus, Verdict},
    services::{
        notify_service::NotifyService,
        standings_service::{ContestLocks, StandingsService},
    },
};

/// Supervisor for the per-contest submission pollers
#[derive(Clone)]
pub struct SubmissionMonitor {
    inner: Arc<MonitorInner>,
}

struct MonitorInner {
    db: PgPool,
    redis: ConnectionManager,
    judge: Arc<dyn JudgeFeed>,
    locks: ContestLocks,
    config: MonitorConfig,
    /// Registry of running pollers; add/remove only under this mutex
    pollers: Mutex<HashMap<Uuid, PollerHandle>>,
}

struct PollerHandle {
    cancel: CancellationToken,
}

/// A submission observed on the feed, resolved to a contest participant
#[derive(Debug, Clone)]
struct ObservedSubmission {
    user_id: Uuid,
    problem_index: String,
    verdict: Verdict,
    submitted_at: DateTime<Utc>,
}

/// Why a poll iteration ended
enum PollOutcome {
    /// Keep polling; `checked_at` becomes the new low-water mark
    Continue { checked_at: DateTime<Utc> },
    /// The contest is gone or no longer ongoing
    Finished,
}

impl SubmissionMonitor {
    pub fn new(
        db: PgPool,
        redis: ConnectionManager,
        judge: Arc<dyn JudgeFeed>,
        locks: ContestLocks,
        config: MonitorConfig,
    ) -> Self {
        Self {
            inner: Arc::new(MonitorInner {
                db,
                redis,
                judge,
                locks,
                config,
                pollers: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Start polling submissions for a contest.
    ///
    /// No-op when a poller is already running or the contest is not ongoing.
    /// The participant handle set is captured here; participants joining
    /// after the poller starts are not monitored until it is restarted.
    pub async fn start_monitoring(&self, contest_id: Uuid) -> AppResult<()> {
        if self.inner.pollers.lock().await.contains_key(&contest_id) {
            return Ok(());
        }

        let Some(contest) = ContestRepository::find_by_id(&self.inner.db, &contest_id).await?
        else {
            tracing::warn!(contest_id = %contest_id, "Cannot monitor missing contest");
            return Ok(());
        };
        if contest.status != ContestStatus::Ongoing {
            return Ok(());
        }

        let user_ids: Vec<Uuid> = contest.participants.iter().map(|p| p.user_id).collect();
        let handles: HashMap<String, Uuid> =
            UserRepository::judge_handles(&self.inner.db, &user_ids)
                .await?
                .into_iter()
                .map(|(user_id, handle)| (handle, user_id))
                .collect();

        let mut pollers = self.inner.pollers.lock().await;
        if pollers.contains_key(&contest_id) {
            // Lost the race to a concurrent start; theirs is as good as ours
            return Ok(());
        }

        let cancel = CancellationToken::new();
        pollers.insert(
            contest_id,
            PollerHandle {
                cancel: cancel.clone(),
            },
        );
        drop(pollers);

        tracing::info!(
            contest_id = %contest_id,
            tracked_handles = handles.len(),
            "Starting submission poller"
        );

        let inner = self.inner.clone();
        tokio::spawn(run_poller(inner, contest_id, handles, cancel));

        Ok(())
    }

    /// Stop the poller for a contest. No-op when none is running.
    pub async fn stop_monitoring(&self, contest_id: &Uuid) {
        let handle = self.inner.pollers.lock().await.remove(contest_id);

        match handle {
            Some(handle) => {
                handle.cancel.cancel();
                tracing::info!(contest_id = %contest_id, "Stopping submission poller");
            }
            None => {
                tracing::debug!(contest_id = %contest_id, "No submission poller to stop");
            }
        }
    }

    /// Whether a poller is currently registered for a contest
    pub async fn is_monitoring(&self, contest_id: &Uuid) -> bool {
        self.inner.pollers.lock().await.contains_key(contest_id)
    }
}

/// Poller loop for one contest. Suspends only on its interval timer; a
/// transient feed error stretches the wait to the backoff interval without
/// advancing the low-water mark, so nothing is dropped.
async fn run_poller(
    inner: Arc<MonitorInner>,
    contest_id: Uuid,
    handles: HashMap<String, Uuid>,
    cancel: CancellationToken,
) {
    let mut last_checked = Utc::now();
    let mut wait = inner.config.poll_interval;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(wait) => {}
        }

        match poll_once(&inner, contest_id, &handles, last_checked).await {
            Ok(PollOutcome::Continue { checked_at }) => {
                last_checked = checked_at;
                wait = inner.config.poll_interval;
            }
            Ok(PollOutcome::Finished) => break,
            Err(e) => {
                tracing::warn!(
                    contest_id = %contest_id,
                    error = %e,
                    "Submission poll failed; backing off"
                );
                wait = inner.config.poll_backoff;
            }
        }
    }

    // On a natural exit the registry still holds our entry; after an
    // explicit stop it was removed (and possibly replaced) already.
    if !cancel.is_cancelled() {
        inner.pollers.lock().await.remove(&contest_id);
    }

    tracing::info!(contest_id = %contest_id, "Submission poller stopped");
}

/// One poll iteration: fetch, filter, score, advance the low-water mark.
async fn poll_once(
    inner: &MonitorInner,
    contest_id: Uuid,
    handles: &HashMap<String, Uuid>,
    last_checked: DateTime<Utc>,
) -> AppResult<PollOutcome> {
    let Some(contest) = ContestRepository::find_by_id(&inner.db, &contest_id).await? else {
        tracing::warn!(contest_id = %contest_id, "Monitored contest disappeared");
        return Ok(PollOutcome::Finished);
    };
    if contest.status != ContestStatus::Ongoing {
        return Ok(PollOutcome::Finished);
    }

    let observed =
        fetch_observed(inner.judge.as_ref(), &contest, handles, last_checked).await?;

    // Advance to "now" rather than the newest submission time, so judge-side
    // clock skew cannot open a redelivery gap.
    let checked_at = Utc::now();

    if observed.is_empty() {
        return Ok(PollOutcome::Continue { checked_at });
    }

    let _guard = inner.locks.acquire(contest_id).await;

    // Re-read under the lock; the document may have moved since the fetch
    let Some(mut contest) = ContestRepository::find_by_id(&inner.db, &contest_id).await? else {
        return Ok(PollOutcome::Finished);
    };
    if contest.status != ContestStatus::Ongoing {
        return Ok(PollOutcome::Finished);
    }

    let mut scored = 0usize;
    for sub in &observed {
        match StandingsService::apply_submission(
            &mut contest,
            &sub.user_id,
            &sub.problem_index,
            sub.verdict,
            sub.submitted_at,
        ) {
            Ok(outcome) if outcome.is_scored() => scored += 1,
            Ok(_) => {}
            Err(e) => {
                tracing::error!(
                    contest_id = %contest_id,
                    user_id = %sub.user_id,
                    problem_index = %sub.problem_index,
                    error = %e,
                    "Failed to apply observed submission"
                );
            }
        }
    }

    ContestRepository::save(&inner.db, &contest).await?;

    tracing::info!(
        contest_id = %contest_id,
        observed = observed.len(),
        scored,
        "Recorded submissions from the judge feed"
    );

    if scored > 0 {
        NotifyService::standings_updated(inner.redis.clone(), &contest_id).await;
    }

    Ok(PollOutcome::Continue { checked_at })
}

/// Fetch one page of the feed and keep what concerns this contest
async fn fetch_observed(
    judge: &dyn JudgeFeed,
    contest: &Contest,
    handles: &HashMap<String, Uuid>,
    last_checked: DateTime<Utc>,
) -> AppResult<Vec<ObservedSubmission>> {
    let handle_list: Vec<String> = handles.keys().cloned().collect();
    let fetched = judge.recent_submissions(&handle_list).await?;

    Ok(select_new_submissions(contest, handles, last_checked, fetched))
}

/// Keep submissions newer than the low-water mark, from tracked handles, on
/// configured problems; returned in chronological order.
fn select_new_submissions(
    contest: &Contest,
    handles: &HashMap<String, Uuid>,
    last_checked: DateTime<Utc>,
    fetched: Vec<ExternalSubmission>,
) -> Vec<ObservedSubmission> {
    let mut observed: Vec<ObservedSubmission> = fetched
        .into_iter()
        .filter_map(|sub| {
            let submitted_at = sub.creation_time();
            if submitted_at <= last_checked {
                return None;
            }

            let user_id = *sub.handle().and_then(|h| handles.get(h))?;

            let external_contest_id = sub.problem.contest_id?;
            contest.problem_by_external_id(external_contest_id, &sub.problem.index)?;

            // No verdict yet means the judge is still testing
            let verdict = sub
                .verdict
                .as_deref()
                .map(Verdict::from_judge)
                .unwrap_or(Verdict::Testing);

            Some(ObservedSubmission {
                user_id,
                problem_index: sub.problem.index,
                verdict,
                submitted_at,
            })
        })
        .collect();

    observed.sort_by_key(|s| s.submitted_at);
    observed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judge::{ExternalAuthor, ExternalPartyMember, ExternalProblem, MockJudgeFeed};
    use crate::models::{ContestProblem, Participant};

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_717_243_200, 0).unwrap()
    }

    fn contest(user_id: Uuid) -> Contest {
        Contest {
            id: Uuid::new_v4(),
            title: "Mirror Round".to_string(),
            creator_id: Uuid::new_v4(),
            start_time: t0(),
            duration_minutes: 120,
            is_private: false,
            access_code: None,
            status: ContestStatus::Ongoing,
            problems: vec![ContestProblem {
                external_contest_id: 1951,
                problem_index: "A".to_string(),
                name: "Dual Trigger".to_string(),
                rating: Some(800),
                tags: Vec::new(),
                points: 200,
            }],
            participants: vec![Participant::new(user_id, t0())],
            submissions: Vec::new(),
            created_at: t0(),
            updated_at: t0(),
        }
    }

    fn external(
        handle: &str,
        contest_id: i64,
        index: &str,
        verdict: Option<&str>,
        offset_secs: i64,
    ) -> ExternalSubmission {
        ExternalSubmission {
            id: offset_secs,
            creation_time_seconds: t0().timestamp() + offset_secs,
            problem: ExternalProblem {
                contest_id: Some(contest_id),
                index: index.to_string(),
                name: None,
                rating: None,
                tags: Vec::new(),
            },
            author: ExternalAuthor {
                members: vec![ExternalPartyMember {
                    handle: handle.to_string(),
                }],
            },
            verdict: verdict.map(str::to_string),
        }
    }

    fn tracked(user_id: Uuid) -> HashMap<String, Uuid> {
        HashMap::from([("tourist".to_string(), user_id)])
    }

    #[test]
    fn test_select_filters_and_orders() {
        let user = Uuid::new_v4();
        let contest = contest(user);
        let handles = tracked(user);
        let last_checked = t0() + chrono::Duration::seconds(100);

        let fetched = vec![
            // Newer, tracked, configured problem, out of order
            external("tourist", 1951, "A", Some("OK"), 500),
            external("tourist", 1951, "A", Some("WRONG_ANSWER"), 300),
            // Too old
            external("tourist", 1951, "A", Some("OK"), 50),
            // Untracked handle
            external("petr", 1951, "A", Some("OK"), 400),
            // Problem not in the contest
            external("tourist", 1951, "B", Some("OK"), 400),
            external("tourist", 2042, "A", Some("OK"), 400),
        ];

        let observed = select_new_submissions(&contest, &handles, last_checked, fetched);

        assert_eq!(observed.len(), 2);
        assert_eq!(observed[0].verdict, Verdict::WrongAnswer);
        assert_eq!(observed[1].verdict, Verdict::Accepted);
        assert!(observed[0].submitted_at < observed[1].submitted_at);
        assert!(observed.iter().all(|s| s.user_id == user));
    }

    #[test]
    fn test_select_maps_missing_verdict_to_testing() {
        let user = Uuid::new_v4();
        let contest = contest(user);
        let handles = tracked(user);

        let fetched = vec![external("tourist", 1951, "A", None, 200)];
        let observed = select_new_submissions(&contest, &handles, t0(), fetched);

        assert_eq!(observed.len(), 1);
        assert_eq!(observed[0].verdict, Verdict::Testing);
    }

    #[tokio::test]
    async fn test_fetch_observed_uses_one_batched_call() {
        let user = Uuid::new_v4();
        let contest = contest(user);
        let handles = tracked(user);

        let mut feed = MockJudgeFeed::new();
        feed.expect_recent_submissions()
            .withf(|handles| handles.len() == 1 && handles[0] == "tourist")
            .times(1)
            .returning(|_| {
                Ok(vec![external("tourist", 1951, "A", Some("OK"), 120)])
            });

        let observed = fetch_observed(&feed, &contest, &handles, t0())
            .await
            .unwrap();

        assert_eq!(observed.len(), 1);
        assert_eq!(observed[0].problem_index, "A");
    }

    #[tokio::test]
    async fn test_fetch_observed_propagates_feed_errors() {
        let user = Uuid::new_v4();
        let contest = contest(user);
        let handles = tracked(user);

        let mut feed = MockJudgeFeed::new();
        feed.expect_recent_submissions().returning(|_| {
            Err(crate::error::AppError::ExternalFeed(
                "connection reset".to_string(),
            ))
        });

        let result = fetch_observed(&feed, &contest, &handles, t0()).await;

        assert!(matches!(
            result,
            Err(crate::error::AppError::ExternalFeed(_))
        ));
    }
}
