use sqlx::PgPool;
use storage::{
    dto::runner::{CreateRunnerRequest, UpdateRunnerRequest},
    error::Result,
    models::Runner,
    repository::runner::RunnerRepository,
};

/// List all runners
pub async fn list_runners(pool: &PgPool) -> Result<Vec<Runner>> {
    let repo = RunnerRepository::new(pool);
    repo.list().await
}

/// Get runner by id
pub async fn get_runner(pool: &PgPool, id: i64) -> Result<Runner> {
    let repo = RunnerRepository::new(pool);
    repo.find_by_id(id).await
}

/// Add a runner
pub async fn create_runner(pool: &PgPool, request: &CreateRunnerRequest) -> Result<Runner> {
    let repo = RunnerRepository::new(pool);
    let runner = repo.create(request).await?;
    tracing::info!(runner_id = runner.id, rating = runner.rating, "Runner added");
    Ok(runner)
}

/// Edit a runner
pub async fn update_runner(pool: &PgPool, id: i64, request: &UpdateRunnerRequest) -> Result<Runner> {
    let repo = RunnerRepository::new(pool);

    let existing = repo.find_by_id(id).await?;
    repo.update(&existing, request).await
}

/// Override a runner's rating
pub async fn update_rating(pool: &PgPool, id: i64, rating: f64) -> Result<Runner> {
    let repo = RunnerRepository::new(pool);
    let runner = repo.update_rating(id, rating).await?;
    tracing::info!(runner_id = id, rating, "Runner rating overridden");
    Ok(runner)
}

/// Delete a runner and its competition entries
pub async fn delete_runner(pool: &PgPool, id: i64) -> Result<()> {
    let repo = RunnerRepository::new(pool);
    repo.delete(id).await?;
    tracing::info!(runner_id = id, "Runner deleted");
    Ok(())
}
