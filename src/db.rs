use anyhow::{Context, Result};
use sqlx::{sqlite::SqliteConnectOptions, SqlitePool};
use std::{path::Path, str::FromStr};

pub async fn init_pool(db_path: &Path) -> Result<SqlitePool> {
    let url = format!("sqlite:{}", db_path.display());
    let opts = SqliteConnectOptions::from_str(&url)
        .context("Invalid DB path")?
        .create_if_missing(true);

    let pool = SqlitePool::connect_with(opts)
        .await
        .context("Failed to open SQLite database")?;

    init_schema(&pool).await?;

    Ok(pool)
}

/// In-memory pool for tests. Capped at one connection: every `:memory:`
/// connection is a distinct database, so a larger pool would hand out
/// connections that never saw the schema.
#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory database");
    init_schema(&pool).await.expect("schema");
    pool
}

pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    // The UNIQUE on internal_title is load-bearing: it is what guarantees
    // exactly one winner when two creates race on the same slug.
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS posts (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            internal_title TEXT    NOT NULL UNIQUE,
            title          TEXT    NOT NULL,
            summary        TEXT    NOT NULL,
            content        TEXT    NOT NULL,
            tags           TEXT    NOT NULL DEFAULT '[]',
            created_at     TEXT    NOT NULL,
            updated_at     TEXT    NOT NULL
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create posts table")?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_posts_created_at ON posts(created_at DESC, internal_title)",
    )
    .execute(pool)
    .await
    .context("Failed to create posts index")?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS editors (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            editor_id     TEXT    NOT NULL UNIQUE,
            username      TEXT    NOT NULL UNIQUE,
            password_hash TEXT    NOT NULL,
            last_login    TEXT,
            created_at    TEXT    NOT NULL DEFAULT (datetime('now'))
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create editors table")?;

    Ok(())
}

/// UTC timestamp in the `TEXT` format the schema stores.
pub fn now_utc() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
