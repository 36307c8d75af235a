//! Contest request DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::constants::{
    MAX_CONTEST_DURATION_MINUTES, MAX_CONTEST_TITLE_LENGTH, MIN_CONTEST_DURATION_MINUTES,
};

/// Create contest request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateContestRequest {
    #[validate(length(min = 1, max = MAX_CONTEST_TITLE_LENGTH))]
    pub title: String,

    /// Contest start time
    pub start_time: DateTime<Utc>,

    /// Contest length in minutes
    #[validate(range(min = MIN_CONTEST_DURATION_MINUTES, max = MAX_CONTEST_DURATION_MINUTES))]
    pub duration_minutes: i64,

    /// Private contests require an access code to join
    pub is_private: bool,

    pub access_code: Option<String>,

    /// Problems on the external judge; verified at creation
    #[validate(length(min = 1))]
    pub problems: Vec<ProblemRef>,
}

/// Reference to a problem on the external judge
#[derive(Debug, Deserialize, Serialize)]
pub struct ProblemRef {
    pub external_contest_id: i64,
    pub problem_index: String,

    /// Override the rating-derived default points
    pub points: Option<i32>,
}

/// Join contest request
#[derive(Debug, Deserialize)]
pub struct JoinContestRequest {
    pub access_code: Option<String>,
}

/// Manual status override request
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    /// Target status: upcoming, ongoing, completed
    pub status: String,
}

/// Participant-reported submission
#[derive(Debug, Deserialize)]
pub struct ReportSubmissionRequest {
    pub problem_index: String,
    pub verdict: String,
    pub submission_time: DateTime<Utc>,
}

/// List contests query parameters
#[derive(Debug, Deserialize)]
pub struct ListContestsQuery {
    /// upcoming, ongoing, completed, or all
    pub status: Option<String>,
}
