use std::collections::HashMap;

use sqlx::{PgPool, Postgres, Transaction};

use crate::dto::competition::{CreateCompetitionRequest, ParticipantTime};
use crate::error::{Result, StorageError};
use crate::models::{Competition, CompetitionParticipant, RatingParticipant};

const COMPETITION_COLUMNS: &str = "id, name, date, difficulty, rated_at, created_at";

/// Repository for Competition and participation database operations
pub struct CompetitionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CompetitionRepository<'a> {
    /// Create a new CompetitionRepository
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all competitions, most recent first
    pub async fn list(&self) -> Result<Vec<Competition>> {
        let competitions = sqlx::query_as::<_, Competition>(&format!(
            r#"
            SELECT {COMPETITION_COLUMNS}
            FROM competitions
            ORDER BY date DESC NULLS LAST, created_at DESC
            "#
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(competitions)
    }

    /// List competitions along with their participants
    pub async fn list_with_participants(
        &self,
    ) -> Result<Vec<(Competition, Vec<CompetitionParticipant>)>> {
        let competitions = self.list().await?;

        let participants = sqlx::query_as::<_, CompetitionParticipant>(
            r#"
            SELECT cr.competition_id, cr.runner_id, r.name, cr.time
            FROM competition_runners cr
            INNER JOIN runners r ON r.id = cr.runner_id
            ORDER BY cr.competition_id, cr.time, r.name
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        let mut by_competition: HashMap<i64, Vec<CompetitionParticipant>> = HashMap::new();
        for participant in participants {
            by_competition
                .entry(participant.competition_id)
                .or_default()
                .push(participant);
        }

        Ok(competitions
            .into_iter()
            .map(|competition| {
                let participants = by_competition.remove(&competition.id).unwrap_or_default();
                (competition, participants)
            })
            .collect())
    }

    /// Get a competition by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Competition> {
        let competition = sqlx::query_as::<_, Competition>(&format!(
            "SELECT {COMPETITION_COLUMNS} FROM competitions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(competition)
    }

    /// Participants of one competition, fastest first
    pub async fn participants(&self, competition_id: i64) -> Result<Vec<CompetitionParticipant>> {
        let participants = sqlx::query_as::<_, CompetitionParticipant>(
            r#"
            SELECT cr.competition_id, cr.runner_id, r.name, cr.time
            FROM competition_runners cr
            INNER JOIN runners r ON r.id = cr.runner_id
            WHERE cr.competition_id = $1
            ORDER BY cr.time, r.name
            "#,
        )
        .bind(competition_id)
        .fetch_all(self.pool)
        .await?;

        Ok(participants)
    }

    /// Participants joined with the runner state a rating pass reads
    pub async fn participants_for_rating(
        tx: &mut Transaction<'_, Postgres>,
        competition_id: i64,
    ) -> Result<Vec<RatingParticipant>> {
        let participants = sqlx::query_as::<_, RatingParticipant>(
            r#"
            SELECT cr.runner_id, r.rating, cr.time, r.last_active_date
            FROM competition_runners cr
            INNER JOIN runners r ON r.id = cr.runner_id
            WHERE cr.competition_id = $1
            ORDER BY cr.time, cr.runner_id
            FOR UPDATE OF r
            "#,
        )
        .bind(competition_id)
        .fetch_all(&mut **tx)
        .await?;

        Ok(participants)
    }

    /// Create a new competition
    pub async fn create(&self, req: &CreateCompetitionRequest) -> Result<Competition> {
        let competition = sqlx::query_as::<_, Competition>(&format!(
            r#"
            INSERT INTO competitions (name, date, difficulty)
            VALUES ($1, $2, $3)
            RETURNING {COMPETITION_COLUMNS}
            "#
        ))
        .bind(req.name.trim())
        .bind(req.date)
        .bind(req.competition_type().as_key())
        .fetch_one(self.pool)
        .await?;

        Ok(competition)
    }

    /// Insert or re-time participants as a single all-or-nothing write
    pub async fn upsert_participants(
        &self,
        competition_id: i64,
        runners: &[ParticipantTime],
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for runner in runners {
            sqlx::query(
                r#"
                INSERT INTO competition_runners (competition_id, runner_id, time)
                VALUES ($1, $2, $3)
                ON CONFLICT (competition_id, runner_id)
                DO UPDATE SET time = EXCLUDED.time
                "#,
            )
            .bind(competition_id)
            .bind(runner.id)
            .bind(runner.time)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                StorageError::from_foreign_key(e, &format!("Runner {} does not exist", runner.id))
            })?;
        }

        tx.commit().await?;

        Ok(())
    }

    /// Stamp the competition as rated, failing if another pass got there first
    pub async fn mark_rated(tx: &mut Transaction<'_, Postgres>, id: i64) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE competitions
            SET rated_at = NOW()
            WHERE id = $1 AND rated_at IS NULL
            "#,
        )
        .bind(id)
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::ConstraintViolation(
                "Ratings were already applied for this competition".to_string(),
            ));
        }

        Ok(())
    }

    /// Delete a competition by ID
    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM competitions WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }
}
