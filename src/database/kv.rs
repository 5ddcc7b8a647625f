// file: src/database/kv.rs
use anyhow::Result;
use sqlx::SqlitePool;

pub async fn get(pool: &SqlitePool, key: &str) -> Result<Option<String>> {
    let value: Option<String> = sqlx::query_scalar("SELECT value FROM reminder_kv WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;

    Ok(value)
}

pub async fn set(pool: &SqlitePool, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO reminder_kv (key, value, updated_at)
        VALUES (?, ?, CURRENT_TIMESTAMP)
        ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn remove(pool: &SqlitePool, key: &str) -> Result<()> {
    sqlx::query("DELETE FROM reminder_kv WHERE key = ?")
        .bind(key)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn keys_with_prefix(pool: &SqlitePool, prefix: &str) -> Result<Vec<String>> {
    let keys: Vec<String> = sqlx::query_scalar("SELECT key FROM reminder_kv WHERE instr(key, ?) = 1 ORDER BY key")
        .bind(prefix)
        .fetch_all(pool)
        .await?;

    Ok(keys)
}

pub async fn count(pool: &SqlitePool) -> Result<i64> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reminder_kv")
        .fetch_one(pool)
        .await?;

    Ok(total)
}
