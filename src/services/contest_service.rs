//! Contest service

use chrono::Utc;
use uuid::Uuid;

use crate::{
    constants::{DEFAULT_PROBLEM_POINTS, MAX_PROBLEM_POINTS},
    db::repositories::{ContestRepository, UserRepository},
    error::{AppError, AppResult},
    handlers::contests::{
        request::CreateContestRequest,
        response::{ContestResponse, ContestSummary, RegistrationResponse, StandingsResponse},
    },
    models::{Contest, ContestProblem, ContestStatus, Participant},
    services::{notify_service::NotifyService, standings_service::StandingsService},
    state::AppState,
};

/// Contest service for business logic
pub struct ContestService;

impl ContestService {
    /// Create a new contest.
    ///
    /// Every configured problem is verified against the external judge and
    /// enriched with its name, rating and tags. The problem list is fixed
    /// here; it cannot change afterwards.
    pub async fn create_contest(
        state: &AppState,
        creator_id: &Uuid,
        payload: CreateContestRequest,
    ) -> AppResult<ContestResponse> {
        if payload.is_private && payload.access_code.as_deref().unwrap_or("").is_empty() {
            return Err(AppError::Validation(
                "Private contests require an access code".to_string(),
            ));
        }

        let mut problems = Vec::with_capacity(payload.problems.len());
        for requested in &payload.problems {
            let info = state
                .judge()
                .problem_info(requested.external_contest_id, &requested.problem_index)
                .await?;

            problems.push(ContestProblem {
                external_contest_id: requested.external_contest_id,
                problem_index: info.index.clone(),
                name: info.name.clone().unwrap_or_default(),
                rating: info.rating,
                tags: info.tags.clone(),
                points: requested.points.unwrap_or_else(|| Self::default_points(info.rating)),
            });
        }

        let contest = ContestRepository::create(
            state.db(),
            &payload.title,
            creator_id,
            payload.start_time,
            payload.duration_minutes,
            payload.is_private,
            payload.access_code.as_deref(),
            &problems,
        )
        .await?;

        tracing::info!(contest_id = %contest.id, title = %contest.title, "Contest created");

        Self::to_contest_response(state, contest).await
    }

    /// Default points for a problem, derived from its judge rating
    pub fn default_points(rating: Option<i32>) -> i32 {
        match rating {
            Some(rating) => (rating / 4).clamp(DEFAULT_PROBLEM_POINTS, MAX_PROBLEM_POINTS),
            None => DEFAULT_PROBLEM_POINTS,
        }
    }

    /// Get contest by ID, enforcing private-contest visibility
    pub async fn get_contest(
        state: &AppState,
        id: &Uuid,
        requester_id: &Uuid,
    ) -> AppResult<ContestResponse> {
        let contest = ContestRepository::find_by_id(state.db(), id)
            .await?
            .ok_or_else(|| AppError::NotFound("Contest not found".to_string()))?;

        if !contest.is_visible_to(requester_id) {
            return Err(AppError::Forbidden("This is a private contest".to_string()));
        }

        Self::to_contest_response(state, contest).await
    }

    /// List contests visible to the requester, optionally filtered by status
    pub async fn list_contests(
        state: &AppState,
        requester_id: &Uuid,
        status: Option<&str>,
    ) -> AppResult<Vec<ContestSummary>> {
        let status = Self::parse_status_filter(status)?;
        let contests = ContestRepository::list_visible(state.db(), requester_id, status).await?;

        Ok(contests.iter().map(Self::to_contest_summary).collect())
    }

    /// Join a contest.
    ///
    /// Private contests require the matching access code. Joining is
    /// rejected once the contest has completed; a join during an ongoing
    /// contest succeeds but is only picked up by the submission poller at
    /// its next restart.
    pub async fn join_contest(
        state: &AppState,
        contest_id: &Uuid,
        user_id: &Uuid,
        access_code: Option<&str>,
    ) -> AppResult<RegistrationResponse> {
        let user = UserRepository::find_by_id(state.db(), user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        // Refresh the cached judge rating while we are here, before taking
        // the contest lock; a feed hiccup must not block the join.
        if let Some(handle) = user.judge_handle.as_deref() {
            match state.judge().user_info(handle).await {
                Ok(info) => {
                    UserRepository::update_judge_rating(
                        state.db(),
                        user_id,
                        info.rating,
                        info.rank.as_deref(),
                    )
                    .await?;
                }
                Err(e) => {
                    tracing::warn!(
                        user_id = %user_id,
                        handle,
                        error = %e,
                        "Could not refresh judge rating on join"
                    );
                }
            }
        }

        let _guard = state.locks().acquire(*contest_id).await;

        let mut contest = ContestRepository::find_by_id(state.db(), contest_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Contest not found".to_string()))?;

        if contest.is_private && contest.access_code.as_deref() != access_code {
            return Err(AppError::Forbidden("Invalid access code".to_string()));
        }

        if contest.is_participant(user_id) {
            return Err(AppError::AlreadyExists(
                "Already registered for this contest".to_string(),
            ));
        }

        if contest.status == ContestStatus::Completed {
            return Err(AppError::Validation(
                "Contest has already ended".to_string(),
            ));
        }

        let joined_at = Utc::now();
        contest.participants.push(Participant::new(*user_id, joined_at));
        ContestRepository::save(state.db(), &contest).await?;

        tracing::info!(contest_id = %contest_id, user_id = %user_id, "Participant joined");
        NotifyService::contest_updated(state.redis(), contest_id).await;

        Ok(RegistrationResponse {
            message: "Successfully joined the contest".to_string(),
            contest_id: *contest_id,
            joined_at,
        })
    }

    /// Manually advance a contest's status (creator only).
    ///
    /// Statuses never move backwards; an override may run ahead of the
    /// clock (e.g. ending a contest early), and the sweep will never undo
    /// it. Monitoring is started or stopped to match the new status.
    pub async fn update_status(
        state: &AppState,
        contest_id: &Uuid,
        requester_id: &Uuid,
        status: &str,
    ) -> AppResult<ContestResponse> {
        let next = ContestStatus::from_str(status)
            .ok_or_else(|| AppError::Validation(format!("Unknown contest status: {}", status)))?;

        let contest = {
            let _guard = state.locks().acquire(*contest_id).await;

            let mut contest = ContestRepository::find_by_id(state.db(), contest_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Contest not found".to_string()))?;

            if contest.creator_id != *requester_id {
                return Err(AppError::Forbidden(
                    "Only the contest creator can change its status".to_string(),
                ));
            }

            if contest.status != next {
                if !contest.status.can_transition_to(next) {
                    return Err(AppError::Validation(format!(
                        "Contest status cannot move from {} to {}",
                        contest.status, next
                    )));
                }

                tracing::info!(
                    contest_id = %contest_id,
                    from = %contest.status,
                    to = %next,
                    "Contest status changed by creator"
                );

                contest.status = next;
                ContestRepository::save(state.db(), &contest).await?;
            }

            contest
        };

        match next {
            ContestStatus::Ongoing => state.monitor().start_monitoring(*contest_id).await?,
            ContestStatus::Completed => state.monitor().stop_monitoring(contest_id).await,
            ContestStatus::Upcoming => {}
        }

        NotifyService::contest_updated(state.redis(), contest_id).await;

        Self::to_contest_response(state, contest).await
    }

    /// Ranked standings for a contest
    pub async fn standings(
        state: &AppState,
        contest_id: &Uuid,
        requester_id: &Uuid,
    ) -> AppResult<StandingsResponse> {
        let contest = ContestRepository::find_by_id(state.db(), contest_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Contest not found".to_string()))?;

        if !contest.is_visible_to(requester_id) {
            return Err(AppError::Forbidden("This is a private contest".to_string()));
        }

        let standings = StandingsService::standings(state, &contest).await?;

        Ok(StandingsResponse {
            contest_id: *contest_id,
            standings,
        })
    }

    /// Parse a status query filter; `all` and absence mean no filter
    fn parse_status_filter(status: Option<&str>) -> AppResult<Option<ContestStatus>> {
        match status {
            None | Some("all") => Ok(None),
            Some(s) => ContestStatus::from_str(s)
                .map(Some)
                .ok_or_else(|| AppError::Validation(format!("Unknown contest status: {}", s))),
        }
    }

    // Helper functions
    async fn to_contest_response(state: &AppState, contest: Contest) -> AppResult<ContestResponse> {
        let creator_name: Option<String> =
            sqlx::query_scalar(r#"SELECT username FROM users WHERE id = $1"#)
                .bind(contest.creator_id)
                .fetch_optional(state.db())
                .await?;

        let end_time = contest.end_time();
        Ok(ContestResponse {
            id: contest.id,
            title: contest.title,
            creator_id: contest.creator_id,
            creator_name: creator_name.unwrap_or_default(),
            start_time: contest.start_time,
            end_time,
            duration_minutes: contest.duration_minutes,
            is_private: contest.is_private,
            status: contest.status.to_string(),
            problems: contest.problems,
            participant_count: contest.participants.len() as i64,
            submission_count: contest.submissions.len() as i64,
            created_at: contest.created_at,
            updated_at: contest.updated_at,
        })
    }

    fn to_contest_summary(contest: &Contest) -> ContestSummary {
        ContestSummary {
            id: contest.id,
            title: contest.title.clone(),
            start_time: contest.start_time,
            duration_minutes: contest.duration_minutes,
            is_private: contest.is_private,
            status: contest.status.to_string(),
            participant_count: contest.participants.len() as i64,
            problem_count: contest.problems.len() as i64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_points_from_rating() {
        assert_eq!(ContestService::default_points(None), 100);
        assert_eq!(ContestService::default_points(Some(800)), 200);
        assert_eq!(ContestService::default_points(Some(1600)), 400);
        // Clamped at both ends
        assert_eq!(ContestService::default_points(Some(200)), 100);
        assert_eq!(ContestService::default_points(Some(3500)), 500);
    }

    #[test]
    fn test_parse_status_filter() {
        assert_eq!(ContestService::parse_status_filter(None).unwrap(), None);
        assert_eq!(
            ContestService::parse_status_filter(Some("all")).unwrap(),
            None
        );
        assert_eq!(
            ContestService::parse_status_filter(Some("ongoing")).unwrap(),
            Some(ContestStatus::Ongoing)
        );
        assert!(ContestService::parse_status_filter(Some("paused")).is_err());
    }
}
