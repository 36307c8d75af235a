//! Application-wide constants
//!
//! This module contains all constant values used throughout the application.
//! Constants are grouped by their purpose for better organization.

// =============================================================================
// SERVER DEFAULTS
// =============================================================================

/// Default server host address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 8080;

// =============================================================================
// DATABASE DEFAULTS
// =============================================================================

/// Default maximum database connections in the pool
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 20;

// =============================================================================
// CONTEST RULES
// =============================================================================

/// Minimum contest duration in minutes
pub const MIN_CONTEST_DURATION_MINUTES: i64 = 30;

/// Maximum contest duration in minutes
pub const MAX_CONTEST_DURATION_MINUTES: i64 = 300;

/// Maximum contest title length
pub const MAX_CONTEST_TITLE_LENGTH: u64 = 128;

/// Penalty minutes added for each wrong submission before the accepting one
pub const PENALTY_PER_WRONG_SUBMISSION_MINUTES: i64 = 20;

/// Points awarded for a problem with no rating on the external judge
pub const DEFAULT_PROBLEM_POINTS: i32 = 100;

/// Maximum points a problem can be worth
pub const MAX_PROBLEM_POINTS: i32 = 500;

// =============================================================================
// MONITORING DEFAULTS
// =============================================================================

/// Default interval between contest status sweeps, in seconds
pub const DEFAULT_SWEEP_INTERVAL_SECONDS: u64 = 60;

/// Default interval between submission polls for an ongoing contest, in seconds
pub const DEFAULT_POLL_INTERVAL_SECONDS: u64 = 30;

/// Default backoff after a failed submission poll, in seconds
pub const DEFAULT_POLL_BACKOFF_SECONDS: u64 = 60;

// =============================================================================
// EXTERNAL JUDGE DEFAULTS
// =============================================================================

/// Default base URL of the external judge API
pub const DEFAULT_JUDGE_API_BASE_URL: &str = "https://codeforces.com/api";

/// Default request timeout against the external judge, in seconds
pub const DEFAULT_JUDGE_TIMEOUT_SECONDS: u64 = 10;

/// Submissions fetched per poll (the feed's page size; older submissions
/// beyond one page are not recovered)
pub const DEFAULT_JUDGE_FETCH_COUNT: u32 = 100;
