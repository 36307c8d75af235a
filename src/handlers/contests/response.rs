//! Contest response DTOs

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{ContestProblem, SolvedProblem, SubmissionRecord};

/// Contest response
#[derive(Debug, Serialize)]
pub struct ContestResponse {
    pub id: Uuid,
    pub title: String,
    pub creator_id: Uuid,
    pub creator_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_minutes: i64,
    pub is_private: bool,
    pub status: String, // upcoming, ongoing, completed
    pub problems: Vec<ContestProblem>,
    pub participant_count: i64,
    pub submission_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Contest list response
#[derive(Debug, Serialize)]
pub struct ContestsListResponse {
    pub contests: Vec<ContestSummary>,
    pub total: i64,
}

/// Contest summary for list views
#[derive(Debug, Serialize)]
pub struct ContestSummary {
    pub id: Uuid,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: i64,
    pub is_private: bool,
    pub status: String,
    pub participant_count: i64,
    pub problem_count: i64,
}

/// Join confirmation
#[derive(Debug, Serialize)]
pub struct RegistrationResponse {
    pub message: String,
    pub contest_id: Uuid,
    pub joined_at: DateTime<Utc>,
}

/// Receipt for a reported submission
#[derive(Debug, Serialize)]
pub struct SubmissionReceiptResponse {
    pub message: String,
    /// Whether this submission changed the score
    pub scored: bool,
    pub penalty_minutes: Option<i64>,
}

/// Standings response
#[derive(Debug, Serialize)]
pub struct StandingsResponse {
    pub contest_id: Uuid,
    pub standings: Vec<StandingRow>,
}

/// One row of the standings, ordered by solved desc then penalty asc
#[derive(Debug, Serialize)]
pub struct StandingRow {
    pub user: StandingUser,
    pub solved: i32,
    pub penalty_minutes: i64,
    pub solved_problems: Vec<SolvedProblem>,
    pub submissions: Vec<SubmissionRecord>,
}

/// Participant identity shown in the standings
#[derive(Debug, Serialize)]
pub struct StandingUser {
    pub id: Uuid,
    pub username: String,
    pub judge_handle: Option<String>,
}
