//! Submission model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One observed submission, as recorded in a contest's append-only log.
///
/// The log is a history, not a dedup index: redelivered submissions may
/// appear more than once. Entries are never edited after insertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub user_id: Uuid,
    pub problem_index: String,
    pub verdict: Verdict,
    pub submission_time: DateTime<Utc>,
    /// Whole minutes from contest start; negative marks a clock anomaly
    /// (recorded but never scored)
    pub time_from_start_minutes: i64,
}

/// Submission verdict enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Accepted,
    WrongAnswer,
    TimeLimitExceeded,
    MemoryLimitExceeded,
    RuntimeError,
    CompilationError,
    Challenged,
    Skipped,
    Testing,
    Other,
}

impl Verdict {
    /// Get verdict as string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::WrongAnswer => "wrong_answer",
            Self::TimeLimitExceeded => "time_limit_exceeded",
            Self::MemoryLimitExceeded => "memory_limit_exceeded",
            Self::RuntimeError => "runtime_error",
            Self::CompilationError => "compilation_error",
            Self::Challenged => "challenged",
            Self::Skipped => "skipped",
            Self::Testing => "testing",
            Self::Other => "other",
        }
    }

    /// Parse verdict from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "accepted" => Some(Self::Accepted),
            "wrong_answer" => Some(Self::WrongAnswer),
            "time_limit_exceeded" => Some(Self::TimeLimitExceeded),
            "memory_limit_exceeded" => Some(Self::MemoryLimitExceeded),
            "runtime_error" => Some(Self::RuntimeError),
            "compilation_error" => Some(Self::CompilationError),
            "challenged" => Some(Self::Challenged),
            "skipped" => Some(Self::Skipped),
            "testing" => Some(Self::Testing),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    /// Map a verdict string from the external judge's wire format
    pub fn from_judge(s: &str) -> Self {
        match s {
            "OK" => Self::Accepted,
            "WRONG_ANSWER" => Self::WrongAnswer,
            "TIME_LIMIT_EXCEEDED" => Self::TimeLimitExceeded,
            "MEMORY_LIMIT_EXCEEDED" => Self::MemoryLimitExceeded,
            "RUNTIME_ERROR" => Self::RuntimeError,
            "COMPILATION_ERROR" => Self::CompilationError,
            "CHALLENGED" => Self::Challenged,
            "SKIPPED" => Self::Skipped,
            "TESTING" => Self::Testing,
            _ => Self::Other,
        }
    }

    /// Check if this verdict means the solution was accepted
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_judge_wire_mapping() {
        assert_eq!(Verdict::from_judge("OK"), Verdict::Accepted);
        assert_eq!(Verdict::from_judge("WRONG_ANSWER"), Verdict::WrongAnswer);
        assert_eq!(Verdict::from_judge("PARTIAL"), Verdict::Other);
        assert!(Verdict::from_judge("OK").is_accepted());
        assert!(!Verdict::from_judge("TESTING").is_accepted());
    }

    #[test]
    fn test_verdict_round_trip() {
        for v in [
            Verdict::Accepted,
            Verdict::WrongAnswer,
            Verdict::TimeLimitExceeded,
            Verdict::Skipped,
            Verdict::Other,
        ] {
            assert_eq!(Verdict::from_str(v.as_str()), Some(v));
        }
    }
}
