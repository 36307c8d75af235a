//! Contest handler implementations

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    middleware::auth::AuthenticatedUser,
    models::Verdict,
    services::{ContestService, StandingsService, SubmissionOutcome},
    state::AppState,
};

use super::{
    request::{
        CreateContestRequest, JoinContestRequest, ListContestsQuery, ReportSubmissionRequest,
        UpdateStatusRequest,
    },
    response::{
        ContestResponse, ContestsListResponse, RegistrationResponse, StandingsResponse,
        SubmissionReceiptResponse,
    },
};

/// List contests visible to the caller (with status filtering)
pub async fn list_contests(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Query(query): Query<ListContestsQuery>,
) -> AppResult<Json<ContestsListResponse>> {
    let contests =
        ContestService::list_contests(&state, &auth_user.id, query.status.as_deref()).await?;

    let total = contests.len() as i64;

    Ok(Json(ContestsListResponse { contests, total }))
}

/// Create a new contest
pub async fn create_contest(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(payload): Json<CreateContestRequest>,
) -> AppResult<(StatusCode, Json<ContestResponse>)> {
    payload.validate()?;

    let contest = ContestService::create_contest(&state, &auth_user.id, payload).await?;

    Ok((StatusCode::CREATED, Json(contest)))
}

/// Get a specific contest
pub async fn get_contest(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ContestResponse>> {
    let contest = ContestService::get_contest(&state, &id, &auth_user.id).await?;
    Ok(Json(contest))
}

/// Join a contest
pub async fn join_contest(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<JoinContestRequest>,
) -> AppResult<Json<RegistrationResponse>> {
    let registration = ContestService::join_contest(
        &state,
        &id,
        &auth_user.id,
        payload.access_code.as_deref(),
    )
    .await?;

    Ok(Json(registration))
}

/// Manually advance a contest's status (creator only)
pub async fn update_contest_status(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<ContestResponse>> {
    let contest =
        ContestService::update_status(&state, &id, &auth_user.id, &payload.status).await?;

    Ok(Json(contest))
}

/// Report a submission for the calling participant
pub async fn report_submission(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReportSubmissionRequest>,
) -> AppResult<Json<SubmissionReceiptResponse>> {
    let verdict = Verdict::from_str(&payload.verdict)
        .ok_or_else(|| AppError::Validation(format!("Unknown verdict: {}", payload.verdict)))?;

    let outcome = StandingsService::record_submission(
        &state,
        &id,
        &auth_user.id,
        &payload.problem_index,
        verdict,
        payload.submission_time,
    )
    .await?;

    let penalty_minutes = match outcome {
        SubmissionOutcome::Scored {
            penalty_minutes, ..
        } => Some(penalty_minutes),
        _ => None,
    };

    Ok(Json(SubmissionReceiptResponse {
        message: "Submission processed successfully".to_string(),
        scored: outcome.is_scored(),
        penalty_minutes,
    }))
}

/// Get contest standings
pub async fn get_standings(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<StandingsResponse>> {
    let standings = ContestService::standings(&state, &id, &auth_user.id).await?;
    Ok(Json(standings))
}
