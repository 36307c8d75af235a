//! Wire types for the external judge API

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Response envelope used by every judge endpoint
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub result: Option<T>,
    pub comment: Option<String>,
}

/// A submission as reported by the judge's feed
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalSubmission {
    pub id: i64,
    pub creation_time_seconds: i64,
    pub problem: ExternalProblem,
    pub author: ExternalAuthor,
    /// Absent while the judge is still testing the submission
    pub verdict: Option<String>,
}

impl ExternalSubmission {
    /// Submission creation time as a UTC instant
    pub fn creation_time(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.creation_time_seconds, 0).unwrap_or_default()
    }

    /// Handle of the submitting party (first team member)
    pub fn handle(&self) -> Option<&str> {
        self.author.members.first().map(|m| m.handle.as_str())
    }
}

/// A problem as described by the judge
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalProblem {
    pub contest_id: Option<i64>,
    pub index: String,
    #[serde(default)]
    pub name: Option<String>,
    pub rating: Option<i32>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Submission author (a party of one or more members)
#[derive(Debug, Clone, Deserialize)]
pub struct ExternalAuthor {
    pub members: Vec<ExternalPartyMember>,
}

/// One member of a submitting party
#[derive(Debug, Clone, Deserialize)]
pub struct ExternalPartyMember {
    pub handle: String,
}

/// Public profile data for a judge account
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalUserInfo {
    pub handle: String,
    pub rating: Option<i32>,
    pub rank: Option<String>,
}

/// Result payload of the judge's problem-set endpoint
#[derive(Debug, Deserialize)]
pub struct ProblemSet {
    pub problems: Vec<ExternalProblem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_submission_feed() {
        let payload = r#"{
            "status": "OK",
            "result": [
                {
                    "id": 900001,
                    "creationTimeSeconds": 1717243800,
                    "problem": {
                        "contestId": 1951,
                        "index": "B",
                        "name": "Battle Cows",
                        "rating": 1000,
                        "tags": ["brute force", "greedy"]
                    },
                    "author": { "members": [{ "handle": "tourist" }] },
                    "verdict": "OK"
                },
                {
                    "id": 900002,
                    "creationTimeSeconds": 1717243900,
                    "problem": { "contestId": 1951, "index": "C" },
                    "author": { "members": [{ "handle": "petr" }] }
                }
            ]
        }"#;

        let envelope: ApiResponse<Vec<ExternalSubmission>> =
            serde_json::from_str(payload).unwrap();
        assert_eq!(envelope.status, "OK");

        let subs = envelope.result.unwrap();
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].handle(), Some("tourist"));
        assert_eq!(subs[0].problem.contest_id, Some(1951));
        assert_eq!(subs[0].verdict.as_deref(), Some("OK"));
        assert_eq!(
            subs[0].creation_time(),
            DateTime::from_timestamp(1717243800, 0).unwrap()
        );

        // Verdict may be absent while the judge is still testing
        assert_eq!(subs[1].verdict, None);
        assert!(subs[1].problem.name.is_none());
        assert!(subs[1].problem.tags.is_empty());
    }

    #[test]
    fn test_parse_failed_envelope() {
        let payload = r#"{ "status": "FAILED", "comment": "handles: User not found" }"#;
        let envelope: ApiResponse<Vec<ExternalSubmission>> =
            serde_json::from_str(payload).unwrap();

        assert_eq!(envelope.status, "FAILED");
        assert!(envelope.result.is_none());
        assert_eq!(envelope.comment.as_deref(), Some("handles: User not found"));
    }
}
