use crate::config::DatabaseConfig;
use sqlx::{postgres::PgPoolOptions, PgPool};

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await
}

pub async fn health_check(pool: &PgPool) -> Result<String, sqlx::Error> {
    let row: (String,) = sqlx::query_as("SELECT version()").fetch_one(pool).await?;
    Ok(row.0)
}

/// Names of the chat tables that are missing from the connected database.
pub async fn missing_tables(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
    let present: Vec<(String,)> = sqlx::query_as(
        "SELECT table_name::text FROM information_schema.tables
         WHERE table_schema = current_schema()
           AND table_name IN ('users', 'chat_sessions', 'chat_messages')",
    )
    .fetch_all(pool)
    .await?;

    Ok(["users", "chat_sessions", "chat_messages"]
        .iter()
        .filter(|t| !present.iter().any(|(p,)| p == *t))
        .map(|t| t.to_string())
        .collect())
}
