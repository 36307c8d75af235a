//! Contest model

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::submission::SubmissionRecord;

/// Contest database model
///
/// The aggregate (problems, participants, submission log) is stored in JSONB
/// columns and saved as one atomic row update. `status` is a cached snapshot
/// of [`ContestStatus::derived`]; the sweep refreshes it, so it may lag the
/// clock until the next tick but never runs ahead of it on its own.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Contest {
    pub id: Uuid,
    pub title: String,
    pub creator_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: i64,
    pub is_private: bool,
    #[serde(skip_serializing)]
    pub access_code: Option<String>,
    pub status: ContestStatus,
    #[sqlx(json)]
    pub problems: Vec<ContestProblem>,
    #[sqlx(json)]
    pub participants: Vec<Participant>,
    #[sqlx(json)]
    pub submissions: Vec<SubmissionRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contest {
    /// Scheduled end of the contest
    pub fn end_time(&self) -> DateTime<Utc> {
        self.start_time + Duration::minutes(self.duration_minutes)
    }

    /// Status the clock says the contest should have right now
    pub fn derived_status(&self, now: DateTime<Utc>) -> ContestStatus {
        ContestStatus::derived(self.start_time, self.duration_minutes, now)
    }

    /// Look up a participant by user id
    pub fn participant(&self, user_id: &Uuid) -> Option<&Participant> {
        self.participants.iter().find(|p| p.user_id == *user_id)
    }

    /// Look up a participant by user id, mutably
    pub fn participant_mut(&mut self, user_id: &Uuid) -> Option<&mut Participant> {
        self.participants.iter_mut().find(|p| p.user_id == *user_id)
    }

    /// Check whether a user has joined this contest
    pub fn is_participant(&self, user_id: &Uuid) -> bool {
        self.participant(user_id).is_some()
    }

    /// Find a configured problem by its identity on the external judge
    pub fn problem_by_external_id(
        &self,
        external_contest_id: i64,
        problem_index: &str,
    ) -> Option<&ContestProblem> {
        self.problems.iter().find(|p| {
            p.external_contest_id == external_contest_id && p.problem_index == problem_index
        })
    }

    /// Check whether a user may see this contest
    pub fn is_visible_to(&self, user_id: &Uuid) -> bool {
        !self.is_private || self.creator_id == *user_id || self.is_participant(user_id)
    }
}

/// Contest status enum
///
/// Statuses only ever advance (`upcoming -> ongoing -> completed`); the
/// transition table rejects everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "contest_status", rename_all = "lowercase")]
pub enum ContestStatus {
    Upcoming,
    Ongoing,
    Completed,
}

impl ContestStatus {
    /// Position in the lifecycle, used to enforce monotonic advancement
    fn rank(self) -> u8 {
        match self {
            Self::Upcoming => 0,
            Self::Ongoing => 1,
            Self::Completed => 2,
        }
    }

    /// Whether moving to `next` is a legal (strictly forward) transition
    pub fn can_transition_to(self, next: ContestStatus) -> bool {
        next.rank() > self.rank()
    }

    /// Status a contest with the given schedule should have at `now`
    pub fn derived(
        start_time: DateTime<Utc>,
        duration_minutes: i64,
        now: DateTime<Utc>,
    ) -> ContestStatus {
        if now < start_time {
            Self::Upcoming
        } else if now < start_time + Duration::minutes(duration_minutes) {
            Self::Ongoing
        } else {
            Self::Completed
        }
    }

    /// Parse status from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "upcoming" => Some(Self::Upcoming),
            "ongoing" => Some(Self::Ongoing),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

impl std::fmt::Display for ContestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Upcoming => write!(f, "upcoming"),
            Self::Ongoing => write!(f, "ongoing"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// A problem configured into a contest, identified by its coordinates on the
/// external judge. Set at creation, immutable afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContestProblem {
    pub external_contest_id: i64,
    pub problem_index: String,
    pub name: String,
    pub rating: Option<i32>,
    pub tags: Vec<String>,
    pub points: i32,
}

/// Contest participant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub user_id: Uuid,
    pub joined_at: DateTime<Utc>,
    pub solved_problems: Vec<SolvedProblem>,
    pub total_solved: i32,
    pub total_penalty_minutes: i64,
}

impl Participant {
    /// Create a fresh participant with no score
    pub fn new(user_id: Uuid, joined_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            joined_at,
            solved_problems: Vec::new(),
            total_solved: 0,
            total_penalty_minutes: 0,
        }
    }

    /// First-accept entry for a problem, if the participant has solved it
    pub fn solved(&self, problem_index: &str) -> Option<&SolvedProblem> {
        self.solved_problems
            .iter()
            .find(|s| s.problem_index == problem_index)
    }
}

/// First accepted submission for one (participant, problem) pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolvedProblem {
    pub problem_index: String,
    pub solved_at: DateTime<Utc>,
    pub attempts: i32,
    pub penalty_minutes: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_transitions_only_advance() {
        use ContestStatus::*;

        assert!(Upcoming.can_transition_to(Ongoing));
        assert!(Upcoming.can_transition_to(Completed));
        assert!(Ongoing.can_transition_to(Completed));

        assert!(!Ongoing.can_transition_to(Upcoming));
        assert!(!Completed.can_transition_to(Ongoing));
        assert!(!Completed.can_transition_to(Upcoming));

        // Re-asserting the current status is not a transition
        assert!(!Upcoming.can_transition_to(Upcoming));
        assert!(!Ongoing.can_transition_to(Ongoing));
        assert!(!Completed.can_transition_to(Completed));
    }

    #[test]
    fn test_derived_status_boundaries() {
        let start = t("2024-06-01T12:00:00Z");

        assert_eq!(
            ContestStatus::derived(start, 120, t("2024-06-01T11:59:59Z")),
            ContestStatus::Upcoming
        );
        // Start instant is inclusive
        assert_eq!(
            ContestStatus::derived(start, 120, start),
            ContestStatus::Ongoing
        );
        assert_eq!(
            ContestStatus::derived(start, 120, t("2024-06-01T13:59:59Z")),
            ContestStatus::Ongoing
        );
        // End instant is exclusive
        assert_eq!(
            ContestStatus::derived(start, 120, t("2024-06-01T14:00:00Z")),
            ContestStatus::Completed
        );
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            ContestStatus::Upcoming,
            ContestStatus::Ongoing,
            ContestStatus::Completed,
        ] {
            assert_eq!(ContestStatus::from_str(&status.to_string()), Some(status));
        }
        assert_eq!(ContestStatus::from_str("cancelled"), None);
    }
}
