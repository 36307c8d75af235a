//! External judge feed
//!
//! Read-only HTTP client for the external judge, plus the [`JudgeFeed`]
//! trait the rest of the application consumes. The feed is the only
//! outbound I/O the monitoring hot path performs.

pub mod client;
pub mod types;

pub use client::CodeforcesClient;
pub use types::*;

use async_trait::async_trait;

use crate::error::AppResult;

/// Read-only contract against the external judge's HTTP API
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JudgeFeed: Send + Sync {
    /// Fetch the most recent submissions for a set of handles in one
    /// batched call. Returns at most one page of the feed.
    async fn recent_submissions(&self, handles: &[String]) -> AppResult<Vec<ExternalSubmission>>;

    /// Fetch public profile data for a handle (join/link time only)
    async fn user_info(&self, handle: &str) -> AppResult<ExternalUserInfo>;

    /// Resolve a problem by its coordinates on the judge
    async fn problem_info(
        &self,
        external_contest_id: i64,
        problem_index: &str,
    ) -> AppResult<ExternalProblem>;
}
