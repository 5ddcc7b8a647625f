// file: src/database/mod.rs

use crate::error::AppResult;
use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use sqlx::{migrate::MigrateDatabase, sqlite::SqlitePool, Sqlite};
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::RwLock;

// Declare submodules
pub mod kv;

/// String key-value persistence the reminder index is written against.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> AppResult<()>;
    async fn remove(&self, key: &str) -> AppResult<()>;
    /// Every stored key starting with `prefix`.
    async fn keys_with_prefix(&self, prefix: &str) -> AppResult<Vec<String>>;
}

#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    /// Opens (creating if needed) the SQLite database at `db_url` and applies the schema.
    pub async fn open(db_url: &str) -> Result<Self> {
        if let Some(parent) = sqlite_file_path(db_url).and_then(|p| p.parent().map(Path::to_path_buf)) {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(&parent)
                    .with_context(|| format!("Failed to create database directory {}", parent.display()))?;
            }
        }

        // Create database if it doesn't exist
        let db_exists = Sqlite::database_exists(db_url)
            .await
            .context("Failed to check if database exists")?;
        if !db_exists {
            info!("Creating reminder database");
            Sqlite::create_database(db_url)
                .await
                .context("Failed to create database")?;
        }

        let pool = SqlitePool::connect(db_url)
            .await
            .context("Failed to connect to database")?;

        run_schema(&pool).await.context("Failed to run database schema")?;

        info!("Reminder database initialized");

        Ok(Database { pool })
    }

    pub async fn entry_count(&self) -> Result<i64> {
        kv::count(&self.pool).await
    }
}

#[async_trait]
impl KeyValueStore for Database {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(kv::get(&self.pool, key).await?)
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        debug!("[Database] set {} ({} bytes)", key, value.len());
        Ok(kv::set(&self.pool, key, value).await?)
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        debug!("[Database] remove {}", key);
        Ok(kv::remove(&self.pool, key).await?)
    }

    async fn keys_with_prefix(&self, prefix: &str) -> AppResult<Vec<String>> {
        Ok(kv::keys_with_prefix(&self.pool, prefix).await?)
    }
}

/// Process-local store for tests and runs without a database file.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> AppResult<Vec<String>> {
        let mut keys: Vec<String> = self
            .entries
            .read()
            .await
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }
}

fn sqlite_file_path(db_url: &str) -> Option<&Path> {
    let rest = db_url.strip_prefix("sqlite:")?;
    let rest = rest.strip_prefix("//").unwrap_or(rest);
    let path = rest.split('?').next().unwrap_or(rest);
    if path.is_empty() || path == ":memory:" || path.starts_with("file:") {
        return None;
    }
    Some(Path::new(path))
}

async fn run_schema(pool: &SqlitePool) -> Result<()> {
    let schema = include_str!("schema.sql");

    let mut current_statement = String::new();
    for line in schema.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("--") || trimmed.is_empty() {
            continue;
        }

        current_statement.push_str(line);
        current_statement.push('\n');

        if trimmed.ends_with(';') {
            sqlx::query(&current_statement).execute(pool).await?;
            current_statement.clear();
        }
    }
    Ok(())
}
