use std::str::FromStr;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS diary_entries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    content TEXT NOT NULL,
    enhanced_content TEXT,
    created_at TEXT NOT NULL,
    context TEXT
)
"#;

const USER_INDEX: &str = "CREATE INDEX IF NOT EXISTS idx_diary_entries_user_created \
    ON diary_entries (user_id, created_at)";

/// Creates the SQLite connection pool and makes sure the schema exists.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    let url = sqlite_url(database_url);
    info!("Opening SQLite database at {url}");

    let options = SqliteConnectOptions::from_str(&url)
        .with_context(|| format!("Invalid database location '{database_url}'"))?
        .create_if_missing(true);

    let pool = pool_options(is_in_memory(&url))
        .connect_with(options)
        .await
        .context("Failed to connect to SQLite database")?;

    init_schema(&pool).await?;

    info!("SQLite pool established");
    Ok(pool)
}

/// An in-memory database lives exactly as long as its one connection, so that
/// connection is pinned: never reaped for idleness or age.
fn pool_options(in_memory: bool) -> SqlitePoolOptions {
    if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    }
}

/// Idempotently creates the entries table and its lookup index.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(SCHEMA)
        .execute(pool)
        .await
        .context("Failed to create diary_entries table")?;

    sqlx::query(USER_INDEX)
        .execute(pool)
        .await
        .context("Failed to create diary_entries user index")?;

    Ok(())
}

/// Accepts either a `sqlite:` URL or a bare file path.
fn sqlite_url(location: &str) -> String {
    if location.starts_with("sqlite:") {
        location.to_string()
    } else {
        format!("sqlite://{location}")
    }
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}
