//! User repository

use sqlx::PgPool;
use uuid::Uuid;

use crate::{error::AppResult, models::User};

/// Repository for user database operations
pub struct UserRepository;

impl UserRepository {
    /// Find user by ID
    pub async fn find_by_id(pool: &PgPool, id: &Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE id = $1"#)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Fetch a batch of users by id
    pub async fn find_by_ids(pool: &PgPool, ids: &[Uuid]) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE id = ANY($1)"#)
            .bind(ids)
            .fetch_all(pool)
            .await?;

        Ok(users)
    }

    /// Resolve the judge handles for a set of users.
    ///
    /// Users with no linked handle are silently omitted.
    pub async fn judge_handles(pool: &PgPool, ids: &[Uuid]) -> AppResult<Vec<(Uuid, String)>> {
        let handles: Vec<(Uuid, String)> = sqlx::query_as(
            r#"
            SELECT id, judge_handle FROM users
            WHERE id = ANY($1) AND judge_handle IS NOT NULL
            "#,
        )
        .bind(ids)
        .fetch_all(pool)
        .await?;

        Ok(handles)
    }

    /// Refresh the cached judge rating for a user
    pub async fn update_judge_rating(
        pool: &PgPool,
        id: &Uuid,
        rating: Option<i32>,
        judge_rank: Option<&str>,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET rating = $2, judge_rank = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(rating)
        .bind(judge_rank)
        .execute(pool)
        .await?;

        Ok(())
    }
}
