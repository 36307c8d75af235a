//! Contest repository
//!
//! The contest aggregate lives in one row (scalar columns + JSONB for the
//! problems, participants and submission log), so `save` is a single atomic
//! full-document update.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Contest, ContestProblem, ContestStatus},
};

/// Repository for contest database operations
pub struct ContestRepository;

impl ContestRepository {
    /// Create a new contest
    pub async fn create(
        pool: &PgPool,
        title: &str,
        creator_id: &Uuid,
        start_time: DateTime<Utc>,
        duration_minutes: i64,
        is_private: bool,
        access_code: Option<&str>,
        problems: &[ContestProblem],
    ) -> AppResult<Contest> {
        let contest = sqlx::query_as::<_, Contest>(
            r#"
            INSERT INTO contests (
                title, creator_id, start_time, duration_minutes,
                is_private, access_code, problems
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(title)
        .bind(creator_id)
        .bind(start_time)
        .bind(duration_minutes)
        .bind(is_private)
        .bind(access_code)
        .bind(Json(problems))
        .fetch_one(pool)
        .await?;

        Ok(contest)
    }

    /// Find contest by ID
    pub async fn find_by_id(pool: &PgPool, id: &Uuid) -> AppResult<Option<Contest>> {
        let contest = sqlx::query_as::<_, Contest>(r#"SELECT * FROM contests WHERE id = $1"#)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(contest)
    }

    /// Persist the whole contest document in one atomic update.
    ///
    /// `contest_status` values compare in declaration order, so GREATEST
    /// keeps a concurrent sweep and a stale document save from ever moving
    /// a status backwards.
    pub async fn save(pool: &PgPool, contest: &Contest) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE contests
            SET
                title = $2,
                status = GREATEST(status, $3),
                participants = $4,
                submissions = $5,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(contest.id)
        .bind(&contest.title)
        .bind(contest.status)
        .bind(Json(&contest.participants))
        .bind(Json(&contest.submissions))
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Flip every due upcoming contest to ongoing, returning the ids that moved
    pub async fn mark_due_started(pool: &PgPool, now: DateTime<Utc>) -> AppResult<Vec<Uuid>> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE contests
            SET status = 'ongoing', updated_at = NOW()
            WHERE status = 'upcoming' AND start_time <= $1
            RETURNING id
            "#,
        )
        .bind(now)
        .fetch_all(pool)
        .await?;

        Ok(ids)
    }

    /// Flip every due ongoing contest to completed, returning the ids that moved
    pub async fn mark_due_completed(pool: &PgPool, now: DateTime<Utc>) -> AppResult<Vec<Uuid>> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE contests
            SET status = 'completed', updated_at = NOW()
            WHERE status = 'ongoing'
              AND start_time + (duration_minutes * interval '1 minute') <= $1
            RETURNING id
            "#,
        )
        .bind(now)
        .fetch_all(pool)
        .await?;

        Ok(ids)
    }

    /// Ids of all contests currently in the given status
    pub async fn ids_by_status(pool: &PgPool, status: ContestStatus) -> AppResult<Vec<Uuid>> {
        let ids: Vec<Uuid> =
            sqlx::query_scalar(r#"SELECT id FROM contests WHERE status = $1"#)
                .bind(status)
                .fetch_all(pool)
                .await?;

        Ok(ids)
    }

    /// List contests visible to a user, optionally filtered by status.
    ///
    /// Private contests are visible only to their creator and participants.
    pub async fn list_visible(
        pool: &PgPool,
        user_id: &Uuid,
        status: Option<ContestStatus>,
    ) -> AppResult<Vec<Contest>> {
        let contests = sqlx::query_as::<_, Contest>(
            r#"
            SELECT * FROM contests
            WHERE
                (
                    is_private = FALSE
                    OR creator_id = $1
                    OR participants @> jsonb_build_array(jsonb_build_object('user_id', $1::uuid))
                )
                AND ($2::contest_status IS NULL OR status = $2)
            ORDER BY start_time DESC
            "#,
        )
        .bind(user_id)
        .bind(status)
        .fetch_all(pool)
        .await?;

        Ok(contests)
    }
}
