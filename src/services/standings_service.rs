//! Standings updater and standings view
//!
//! The updater applies one observed submission to a contest document,
//! exactly once in effect no matter how often the feed redelivers it. All
//! scoring for a contest runs under that contest's [`ContestLocks`] entry so
//! the cached totals stay consistent with the solved-problem entries.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::{
    db::repositories::{ContestRepository, UserRepository},
    error::{AppError, AppResult},
    handlers::contests::response::{StandingRow, StandingUser},
    models::{Contest, Participant, SubmissionRecord, Verdict},
    services::{notify_service::NotifyService, scoring},
    state::AppState,
    utils::time::minutes_between,
};

/// Per-contest async locks: the contest document is the unit of mutual
/// exclusion for scoring. Read-only queries never take these.
#[derive(Clone, Default)]
pub struct ContestLocks {
    locks: Arc<Mutex<HashMap<Uuid, Arc<Mutex<()>>>>>,
}

impl ContestLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the scoring lock for a contest, creating it on first use
    pub async fn acquire(&self, contest_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks
                .entry(contest_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };

        lock.lock_owned().await
    }
}

/// What applying one submission did to the score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// First accepted submission for the (user, problem) pair
    Scored { attempts: i32, penalty_minutes: i64 },
    /// Logged without affecting the score (non-accept, redelivery, or a
    /// submission on an already-solved problem)
    Recorded,
    /// Timestamped before the contest start; logged, never scored
    ClockAnomaly,
}

impl SubmissionOutcome {
    pub fn is_scored(&self) -> bool {
        matches!(self, Self::Scored { .. })
    }
}

/// Standings service for scoring and ranking
pub struct StandingsService;

impl StandingsService {
    /// Apply one submission to the contest document.
    ///
    /// Always appends to the submission log (the log is a history and may
    /// hold duplicates); scores at most the first accepted submission per
    /// (user, problem). Callers must hold the contest's scoring lock and
    /// persist the document afterwards.
    pub fn apply_submission(
        contest: &mut Contest,
        user_id: &Uuid,
        problem_index: &str,
        verdict: Verdict,
        submission_time: DateTime<Utc>,
    ) -> AppResult<SubmissionOutcome> {
        if !contest.is_participant(user_id) {
            return Err(AppError::NotParticipant);
        }

        let time_from_start = minutes_between(contest.start_time, submission_time);

        contest.submissions.push(SubmissionRecord {
            user_id: *user_id,
            problem_index: problem_index.to_string(),
            verdict,
            submission_time,
            time_from_start_minutes: time_from_start,
        });

        if time_from_start < 0 {
            tracing::warn!(
                contest_id = %contest.id,
                user_id = %user_id,
                problem_index,
                time_from_start,
                "Submission predates contest start; recorded but not scored"
            );
            return Ok(SubmissionOutcome::ClockAnomaly);
        }

        let already_solved = contest
            .participant(user_id)
            .is_some_and(|p| p.solved(problem_index).is_some());

        if !verdict.is_accepted() || already_solved {
            return Ok(SubmissionOutcome::Recorded);
        }

        // Every earlier submission on this problem counts as an attempt,
        // plus one for the accepting submission itself.
        let prior = contest
            .submissions
            .iter()
            .filter(|s| {
                s.user_id == *user_id
                    && s.problem_index == problem_index
                    && s.submission_time < submission_time
            })
            .count();
        let attempts = prior as i32 + 1;
        let penalty = scoring::penalty_minutes(time_from_start, attempts);

        let Some(participant) = contest.participant_mut(user_id) else {
            return Err(AppError::NotParticipant);
        };
        participant.solved_problems.push(crate::models::SolvedProblem {
            problem_index: problem_index.to_string(),
            solved_at: submission_time,
            attempts,
            penalty_minutes: penalty,
        });
        participant.total_solved += 1;
        participant.total_penalty_minutes += penalty;

        Self::verify_totals(participant)?;

        Ok(SubmissionOutcome::Scored {
            attempts,
            penalty_minutes: penalty,
        })
    }

    /// Record one submission against a contest, under the contest lock, and
    /// persist the document. Publishes a standings event when it scored.
    pub async fn record_submission(
        state: &AppState,
        contest_id: &Uuid,
        user_id: &Uuid,
        problem_index: &str,
        verdict: Verdict,
        submission_time: DateTime<Utc>,
    ) -> AppResult<SubmissionOutcome> {
        let _guard = state.locks().acquire(*contest_id).await;

        let mut contest = ContestRepository::find_by_id(state.db(), contest_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Contest not found".to_string()))?;

        let outcome = Self::apply_submission(
            &mut contest,
            user_id,
            problem_index,
            verdict,
            submission_time,
        )?;

        ContestRepository::save(state.db(), &contest).await?;

        if outcome.is_scored() {
            NotifyService::standings_updated(state.redis(), contest_id).await;
        }

        Ok(outcome)
    }

    /// Derive the ranked standings for a contest.
    ///
    /// Pure read over the loaded document; safe to compute on every request.
    pub async fn standings(state: &AppState, contest: &Contest) -> AppResult<Vec<StandingRow>> {
        let user_ids: Vec<Uuid> = contest.participants.iter().map(|p| p.user_id).collect();
        let users = UserRepository::find_by_ids(state.db(), &user_ids).await?;
        let users_by_id: HashMap<Uuid, _> = users.into_iter().map(|u| (u.id, u)).collect();

        let mut rows: Vec<StandingRow> = contest
            .participants
            .iter()
            .map(|p| {
                let user = users_by_id.get(&p.user_id);
                StandingRow {
                    user: StandingUser {
                        id: p.user_id,
                        username: user.map(|u| u.username.clone()).unwrap_or_default(),
                        judge_handle: user.and_then(|u| u.judge_handle.clone()),
                    },
                    solved: p.total_solved,
                    penalty_minutes: p.total_penalty_minutes,
                    solved_problems: p.solved_problems.clone(),
                    submissions: contest
                        .submissions
                        .iter()
                        .filter(|s| s.user_id == p.user_id)
                        .cloned()
                        .collect(),
                }
            })
            .collect();

        Self::rank(&mut rows);

        Ok(rows)
    }

    /// Order standings rows: most solved first, least penalty breaking ties
    pub fn rank(rows: &mut [StandingRow]) {
        rows.sort_by(|a, b| {
            b.solved
                .cmp(&a.solved)
                .then(a.penalty_minutes.cmp(&b.penalty_minutes))
        });
    }

    /// Defensive check that the cached totals match the solved entries
    fn verify_totals(participant: &Participant) -> AppResult<()> {
        let solved = participant.solved_problems.len() as i32;
        let penalty: i64 = participant
            .solved_problems
            .iter()
            .map(|s| s.penalty_minutes)
            .sum();

        if participant.total_solved != solved || participant.total_penalty_minutes != penalty {
            return Err(AppError::InvariantViolation(format!(
                "participant {} totals ({}, {}) diverge from solved entries ({}, {})",
                participant.user_id,
                participant.total_solved,
                participant.total_penalty_minutes,
                solved,
                penalty
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use crate::models::{ContestProblem, ContestStatus};

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-06-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn contest_with(user_ids: &[Uuid]) -> Contest {
        Contest {
            id: Uuid::new_v4(),
            title: "Weekly Duel".to_string(),
            creator_id: Uuid::new_v4(),
            start_time: t0(),
            duration_minutes: 120,
            is_private: true,
            access_code: Some("duel42".to_string()),
            status: ContestStatus::Ongoing,
            problems: vec![ContestProblem {
                external_contest_id: 1951,
                problem_index: "A".to_string(),
                name: "Dual Trigger".to_string(),
                rating: Some(800),
                tags: vec!["constructive algorithms".to_string()],
                points: 200,
            }],
            participants: user_ids
                .iter()
                .map(|id| Participant::new(*id, t0()))
                .collect(),
            submissions: Vec::new(),
            created_at: t0(),
            updated_at: t0(),
        }
    }

    #[test]
    fn test_rejects_non_participant() {
        let mut contest = contest_with(&[Uuid::new_v4()]);
        let stranger = Uuid::new_v4();

        let result = StandingsService::apply_submission(
            &mut contest,
            &stranger,
            "A",
            Verdict::Accepted,
            t0() + Duration::minutes(5),
        );

        assert!(matches!(result, Err(AppError::NotParticipant)));
        assert!(contest.submissions.is_empty());
    }

    #[test]
    fn test_wrong_then_accepted_scores_with_attempt_penalty() {
        let user = Uuid::new_v4();
        let mut contest = contest_with(&[user]);

        let first = StandingsService::apply_submission(
            &mut contest,
            &user,
            "A",
            Verdict::WrongAnswer,
            t0() + Duration::minutes(10),
        )
        .unwrap();
        assert_eq!(first, SubmissionOutcome::Recorded);

        let second = StandingsService::apply_submission(
            &mut contest,
            &user,
            "A",
            Verdict::Accepted,
            t0() + Duration::minutes(35),
        )
        .unwrap();
        assert_eq!(
            second,
            SubmissionOutcome::Scored {
                attempts: 2,
                penalty_minutes: 55
            }
        );

        let participant = contest.participant(&user).unwrap();
        assert_eq!(participant.total_solved, 1);
        assert_eq!(participant.total_penalty_minutes, 55);
        assert_eq!(participant.solved("A").unwrap().attempts, 2);
        assert_eq!(contest.submissions.len(), 2);
    }

    #[test]
    fn test_redelivered_accept_scores_once() {
        let user = Uuid::new_v4();
        let mut contest = contest_with(&[user]);
        let accepted_at = t0() + Duration::minutes(20);

        for _ in 0..2 {
            StandingsService::apply_submission(
                &mut contest,
                &user,
                "A",
                Verdict::Accepted,
                accepted_at,
            )
            .unwrap();
        }

        // The log keeps the redelivery; the score does not
        let participant = contest.participant(&user).unwrap();
        assert_eq!(contest.submissions.len(), 2);
        assert_eq!(participant.total_solved, 1);
        assert_eq!(participant.total_penalty_minutes, 20);
    }

    #[test]
    fn test_submission_after_solve_only_extends_log() {
        let user = Uuid::new_v4();
        let mut contest = contest_with(&[user]);

        StandingsService::apply_submission(
            &mut contest,
            &user,
            "A",
            Verdict::Accepted,
            t0() + Duration::minutes(15),
        )
        .unwrap();

        let later = StandingsService::apply_submission(
            &mut contest,
            &user,
            "A",
            Verdict::WrongAnswer,
            t0() + Duration::minutes(40),
        )
        .unwrap();

        assert_eq!(later, SubmissionOutcome::Recorded);
        let participant = contest.participant(&user).unwrap();
        assert_eq!(participant.total_solved, 1);
        assert_eq!(participant.total_penalty_minutes, 15);
    }

    #[test]
    fn test_submission_before_start_is_logged_not_scored() {
        let user = Uuid::new_v4();
        let mut contest = contest_with(&[user]);

        let outcome = StandingsService::apply_submission(
            &mut contest,
            &user,
            "A",
            Verdict::Accepted,
            t0() - Duration::minutes(3),
        )
        .unwrap();

        assert_eq!(outcome, SubmissionOutcome::ClockAnomaly);
        assert_eq!(contest.submissions.len(), 1);
        assert!(contest.submissions[0].time_from_start_minutes < 0);

        let participant = contest.participant(&user).unwrap();
        assert_eq!(participant.total_solved, 0);
        assert_eq!(participant.total_penalty_minutes, 0);
    }

    #[test]
    fn test_detects_diverged_totals() {
        let user = Uuid::new_v4();
        let mut contest = contest_with(&[user]);

        // Corrupt the cached totals behind the updater's back
        contest.participant_mut(&user).unwrap().total_solved = 3;

        let result = StandingsService::apply_submission(
            &mut contest,
            &user,
            "A",
            Verdict::Accepted,
            t0() + Duration::minutes(5),
        );

        assert!(matches!(result, Err(AppError::InvariantViolation(_))));
    }

    fn row(solved: i32, penalty: i64, username: &str) -> StandingRow {
        StandingRow {
            user: StandingUser {
                id: Uuid::new_v4(),
                username: username.to_string(),
                judge_handle: None,
            },
            solved,
            penalty_minutes: penalty,
            solved_problems: Vec::new(),
            submissions: Vec::new(),
        }
    }

    #[test]
    fn test_ranking_order() {
        let mut rows = vec![
            row(1, 30, "carol"),
            row(2, 200, "bob"),
            row(2, 55, "alice"),
            row(0, 0, "dave"),
        ];

        StandingsService::rank(&mut rows);

        let order: Vec<&str> = rows.iter().map(|r| r.user.username.as_str()).collect();
        // More solved wins regardless of penalty; penalty breaks ties
        assert_eq!(order, vec!["alice", "bob", "carol", "dave"]);
    }
}
