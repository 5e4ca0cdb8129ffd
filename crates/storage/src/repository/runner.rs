use chrono::NaiveDateTime;
use sqlx::{PgPool, Postgres, Transaction};

use crate::dto::runner::{CreateRunnerRequest, UpdateRunnerRequest};
use crate::error::{Result, StorageError};
use crate::models::{DEFAULT_RATING, Runner};

const RUNNER_COLUMNS: &str = "id, name, rating, rank, last_active_date, created_at";

/// Repository for Runner database operations
pub struct RunnerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RunnerRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all runners, highest rated first
    pub async fn list(&self) -> Result<Vec<Runner>> {
        let runners = sqlx::query_as::<_, Runner>(&format!(
            "SELECT {RUNNER_COLUMNS} FROM runners ORDER BY rating DESC, name"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(runners)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Runner> {
        let runner = sqlx::query_as::<_, Runner>(&format!(
            "SELECT {RUNNER_COLUMNS} FROM runners WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(runner)
    }

    pub async fn create(&self, req: &CreateRunnerRequest) -> Result<Runner> {
        let runner = sqlx::query_as::<_, Runner>(&format!(
            r#"
            INSERT INTO runners (name, rating, rank)
            VALUES ($1, $2, $3)
            RETURNING {RUNNER_COLUMNS}
            "#
        ))
        .bind(req.name.trim())
        .bind(req.rating.unwrap_or(DEFAULT_RATING))
        .bind(req.rank)
        .fetch_one(self.pool)
        .await?;

        Ok(runner)
    }

    /// Update name, rating or legacy rank; omitted fields keep their value
    pub async fn update(&self, existing: &Runner, req: &UpdateRunnerRequest) -> Result<Runner> {
        let name = req.name.as_deref().map(str::trim).unwrap_or(&existing.name);
        let rating = req.rating.unwrap_or(existing.rating);
        let rank = req.rank.or(existing.rank);

        let runner = sqlx::query_as::<_, Runner>(&format!(
            r#"
            UPDATE runners
            SET name = $2, rating = $3, rank = $4
            WHERE id = $1
            RETURNING {RUNNER_COLUMNS}
            "#
        ))
        .bind(existing.id)
        .bind(name)
        .bind(rating)
        .bind(rank)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(runner)
    }

    /// Overwrite a runner's rating; the last write wins
    pub async fn update_rating(&self, id: i64, rating: f64) -> Result<Runner> {
        let runner = sqlx::query_as::<_, Runner>(&format!(
            "UPDATE runners SET rating = $2 WHERE id = $1 RETURNING {RUNNER_COLUMNS}"
        ))
        .bind(id)
        .bind(rating)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(runner)
    }

    /// Write a rated competition's results inside the caller's transaction.
    ///
    /// `last_active_date` only moves forward, so rating an older competition
    /// late does not make a runner look less recently active.
    pub async fn apply_rating(
        tx: &mut Transaction<'_, Postgres>,
        id: i64,
        new_rating: f64,
        active_at: NaiveDateTime,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE runners
            SET rating = $2,
                last_active_date = GREATEST(last_active_date, $3)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(new_rating)
        .bind(active_at)
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }

    /// Delete a runner; participation rows go with it
    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM runners WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }
}
