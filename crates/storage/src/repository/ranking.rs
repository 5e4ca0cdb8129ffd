use sqlx::{PgPool, QueryBuilder};

use crate::dto::ranking::{StandingEntry, StandingsFilter};
use crate::error::Result;

pub struct RankingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RankingRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Runners ordered by rating with shared ranks for equal ratings, plus the total count
    pub async fn get_standings(&self, filter: &StandingsFilter) -> Result<(Vec<StandingEntry>, i64)> {
        let pagination = filter.pagination();

        let total_items = self.count_runners(filter).await?;

        let entries = self
            .fetch_standings(filter, pagination.offset(), pagination.limit())
            .await?;

        Ok((entries, total_items))
    }

    async fn count_runners(&self, filter: &StandingsFilter) -> Result<i64> {
        let mut query = QueryBuilder::new("SELECT COUNT(*) FROM runners WHERE 1=1");

        if let Some(min_rating) = filter.min_rating {
            query.push(" AND rating >= ");
            query.push_bind(min_rating);
        }

        let count = query
            .build_query_scalar::<i64>()
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }

    async fn fetch_standings(
        &self,
        filter: &StandingsFilter,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<StandingEntry>> {
        // Rank over the whole table so a rating floor does not renumber places
        let mut query = QueryBuilder::new(
            r#"
            WITH ranked AS (
                SELECT
                    RANK() OVER (ORDER BY rating DESC) AS rank,
                    id AS runner_id,
                    name,
                    rating,
                    last_active_date
                FROM runners
            )
            SELECT rank, runner_id, name, rating, last_active_date
            FROM ranked
            WHERE 1=1
            "#,
        );

        if let Some(min_rating) = filter.min_rating {
            query.push(" AND rating >= ");
            query.push_bind(min_rating);
        }

        query.push(" ORDER BY rank, name LIMIT ");
        query.push_bind(limit);
        query.push(" OFFSET ");
        query.push_bind(offset);

        let entries: Vec<StandingEntry> = query.build_query_as().fetch_all(self.pool).await?;

        Ok(entries)
    }
}
