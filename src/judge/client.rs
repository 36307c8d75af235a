//! HTTP client for the Codeforces-compatible judge API

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::{
    config::JudgeConfig,
    error::{AppError, AppResult},
};

use super::{
    types::{ApiResponse, ExternalProblem, ExternalSubmission, ExternalUserInfo, ProblemSet},
    JudgeFeed,
};

/// Client for the external judge's read-only HTTP API
pub struct CodeforcesClient {
    http: reqwest::Client,
    base_url: String,
    fetch_count: u32,
}

impl CodeforcesClient {
    /// Build a client from configuration
    pub fn new(config: &JudgeConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            fetch_count: config.fetch_count,
        })
    }

    /// Issue a GET and unwrap the judge's response envelope
    async fn get_result<T: DeserializeOwned>(&self, url: String) -> AppResult<T> {
        let response = self.http.get(&url).send().await?.error_for_status()?;
        let envelope: ApiResponse<T> = response.json().await?;

        if envelope.status != "OK" {
            return Err(AppError::ExternalFeed(
                envelope
                    .comment
                    .unwrap_or_else(|| "judge reported failure".to_string()),
            ));
        }

        envelope
            .result
            .ok_or_else(|| AppError::ExternalFeed("judge returned empty result".to_string()))
    }
}

#[async_trait]
impl JudgeFeed for CodeforcesClient {
    async fn recent_submissions(&self, handles: &[String]) -> AppResult<Vec<ExternalSubmission>> {
        if handles.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!(
            "{}/user.status?handle={}&from=1&count={}",
            self.base_url,
            handles.join(";"),
            self.fetch_count
        );

        self.get_result(url).await
    }

    async fn user_info(&self, handle: &str) -> AppResult<ExternalUserInfo> {
        let url = format!("{}/user.info?handles={}", self.base_url, handle);
        let users: Vec<ExternalUserInfo> = self.get_result(url).await?;

        users
            .into_iter()
            .next()
            .ok_or_else(|| AppError::ExternalFeed(format!("unknown judge handle: {}", handle)))
    }

    async fn problem_info(
        &self,
        external_contest_id: i64,
        problem_index: &str,
    ) -> AppResult<ExternalProblem> {
        let url = format!("{}/problemset.problems", self.base_url);
        let problem_set: ProblemSet = self.get_result(url).await?;

        problem_set
            .problems
            .into_iter()
            .find(|p| {
                p.contest_id == Some(external_contest_id) && p.index == problem_index
            })
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Problem {}{} not found on the judge",
                    external_contest_id, problem_index
                ))
            })
    }
}
