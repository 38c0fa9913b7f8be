use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

/// Opens the configured database and creates the schema.
pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(&config.db).await?;
    ensure_schema(&pool).await?;
    pool.close().await;
    Ok(())
}

/// Creates the `resource` table if it does not exist yet. Idempotent.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS resource (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name VARCHAR(100) NOT NULL,
            category VARCHAR(50) NOT NULL,
            description TEXT NOT NULL,
            website VARCHAR(200),
            phone VARCHAR(20),
            address VARCHAR(200)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_resource_category_name ON resource(category, name)")
        .execute(pool)
        .await?;

    Ok(())
}
