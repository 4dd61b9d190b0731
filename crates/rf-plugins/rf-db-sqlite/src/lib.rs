//! # rf-db-sqlite Implementation
//!
//! This module implements the data mapping between SQLite and the `rf-core`
//! domain models. Each thread kind has its own table; a row holds the whole
//! aggregate as one JSON document plus the few columns listings filter on.
//! Every save is a single conditional UPDATE on `version`.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use rf_core::error::{AppError, Result};
use rf_core::models::{Page, PageRequest, Role, Thread, ThreadFilter, ThreadId, UserId, UserProfile};
use rf_core::traits::{ThreadStore, UserDirectory};
use rf_core::ThreadKind;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Clone)]
pub struct SqliteForumRepo {
    pool: SqlitePool,
}

// Helper for UUID conversion
fn uuid_to_blob(id: Uuid) -> Vec<u8> {
    id.as_bytes().to_vec()
}

fn blob_to_uuid(blob: &[u8]) -> anyhow::Result<Uuid> {
    Ok(Uuid::from_slice(blob)?)
}

fn db(e: sqlx::Error) -> AppError {
    AppError::Unexpected(e.into())
}

fn decode(document: &str) -> Result<Thread> {
    serde_json::from_str(document).map_err(|e| AppError::Unexpected(anyhow::anyhow!("corrupt thread document: {e}")))
}

fn encode(thread: &Thread) -> Result<(String, String)> {
    let document = serde_json::to_string(thread).map_err(anyhow::Error::from)?;
    let tags = serde_json::to_string(&thread.tags).map_err(anyhow::Error::from)?;
    Ok((document, tags))
}

fn role_name(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Moderator => "moderator",
        Role::Admin => "admin",
    }
}

fn parse_role(raw: &str) -> anyhow::Result<Role> {
    match raw {
        "user" => Ok(Role::User),
        "moderator" => Ok(Role::Moderator),
        "admin" => Ok(Role::Admin),
        other => Err(anyhow::anyhow!("unknown role '{other}'")),
    }
}

impl SqliteForumRepo {
    /// Connects and creates the schema if needed.
    pub async fn new(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let mut pool = SqlitePoolOptions::new().max_connections(max_connections.max(1));
        if url.contains(":memory:") {
            // each connection would get its own private database
            pool = pool.max_connections(1).idle_timeout(None::<Duration>).max_lifetime(None::<Duration>);
        }
        let repo = Self::from_pool(pool.connect_with(options).await?);
        repo.migrate().await?;
        info!("SQLite forum store ready at {}", url);
        Ok(repo)
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        for kind in ThreadKind::ALL {
            let table = kind.collection();
            let ddl = format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    id          BLOB PRIMARY KEY,
                    author      BLOB NOT NULL,
                    tags        TEXT NOT NULL,
                    created_at  TEXT NOT NULL,
                    version     INTEGER NOT NULL,
                    document    TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_{table}_author ON {table}(author, created_at);
                CREATE INDEX IF NOT EXISTS idx_{table}_created ON {table}(created_at);"
            );
            sqlx::raw_sql(&ddl).execute(&self.pool).await?;
        }

        sqlx::raw_sql(
            "CREATE TABLE IF NOT EXISTS users (
                id            BLOB PRIMARY KEY,
                username      TEXT NOT NULL UNIQUE,
                display_name  TEXT,
                role          TEXT NOT NULL DEFAULT 'user',
                created_at    TEXT NOT NULL
            );",
        )
        .execute(&self.pool)
        .await?;

        debug!("SQLite schema migrated");
        Ok(())
    }

    /// Inserts or replaces an account row. Account management proper lives
    /// outside this crate; this feeds the directory for seeding and tests.
    pub async fn upsert_user(&self, user: &UserProfile) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO users (id, username, display_name, role, created_at) VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET username = excluded.username,
                 display_name = excluded.display_name, role = excluded.role",
        )
        .bind(uuid_to_blob(user.id.0))
        .bind(user.username.as_str())
        .bind(user.display_name.as_deref())
        .bind(role_name(user.role))
        .bind(user.created)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn delete_user(&self, id: UserId) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(uuid_to_blob(id.0))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn stored_version(&self, kind: ThreadKind, id: ThreadId) -> Result<Option<u64>> {
        let sql = format!("SELECT version FROM {} WHERE id = ?", kind.collection());
        let row = sqlx::query(&sql)
            .bind(uuid_to_blob(id.0))
            .fetch_optional(&self.pool)
            .await
            .map_err(db)?;
        Ok(row.map(|r| r.get::<i64, _>("version") as u64))
    }
}

/// WHERE clause shared by the page and count queries, plus its bind values.
fn filter_clause(table: &str, filter: &ThreadFilter) -> (String, Option<Vec<u8>>) {
    let mut clause = String::from(" WHERE 1 = 1");
    let author = filter.author.map(|a| {
        clause.push_str(" AND author = ?");
        uuid_to_blob(a.0)
    });
    if !filter.tags.is_empty() {
        let placeholders = vec!["?"; filter.tags.len()].join(", ");
        clause.push_str(&format!(
            " AND EXISTS (SELECT 1 FROM json_each({table}.tags) WHERE json_each.value IN ({placeholders}))"
        ));
    }
    (clause, author)
}

#[async_trait]
impl ThreadStore for SqliteForumRepo {
    async fn find_by_id(&self, kind: ThreadKind, id: ThreadId) -> Result<Option<Thread>> {
        let sql = format!("SELECT document FROM {} WHERE id = ?", kind.collection());
        let row = sqlx::query(&sql)
            .bind(uuid_to_blob(id.0))
            .fetch_optional(&self.pool)
            .await
            .map_err(db)?;

        row.map(|r| decode(&r.get::<String, _>("document"))).transpose()
    }

    async fn find_many(&self, kind: ThreadKind, filter: &ThreadFilter, page: PageRequest) -> Result<Page<Thread>> {
        let table = kind.collection();
        let (clause, author) = filter_clause(table, filter);

        let count_sql = format!("SELECT COUNT(*) AS total FROM {table}{clause}");
        let mut count = sqlx::query(&count_sql);
        if let Some(author) = &author {
            count = count.bind(author.clone());
        }
        for tag in &filter.tags {
            count = count.bind(tag.as_str());
        }
        let total: i64 = count.fetch_one(&self.pool).await.map_err(db)?.get("total");

        let page_sql =
            format!("SELECT document FROM {table}{clause} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?");
        let mut query = sqlx::query(&page_sql);
        if let Some(author) = author {
            query = query.bind(author);
        }
        for tag in &filter.tags {
            query = query.bind(tag.as_str());
        }
        let rows = query
            .bind(i64::from(page.limit))
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(db)?;

        let items = rows
            .iter()
            .map(|r| decode(&r.get::<String, _>("document")))
            .collect::<Result<Vec<_>>>()?;
        Ok(Page::new(items, total as u64, page))
    }

    async fn insert(&self, kind: ThreadKind, thread: &Thread) -> Result<()> {
        let (document, tags) = encode(thread)?;
        let sql = format!(
            "INSERT INTO {} (id, author, tags, created_at, version, document) VALUES (?, ?, ?, ?, ?, ?)",
            kind.collection()
        );
        sqlx::query(&sql)
            .bind(uuid_to_blob(thread.id.0))
            .bind(uuid_to_blob(thread.author.0))
            .bind(tags)
            .bind(thread.created)
            .bind(thread.version as i64)
            .bind(document)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(d) = &e {
                    if d.is_unique_violation() {
                        return AppError::Conflict(format!("{} {} already exists", kind, thread.id));
                    }
                }
                db(e)
            })?;
        Ok(())
    }

    async fn save(&self, kind: ThreadKind, thread: &Thread, expected_version: u64) -> Result<()> {
        let (document, tags) = encode(thread)?;
        let sql = format!(
            "UPDATE {} SET tags = ?, version = ?, document = ? WHERE id = ? AND version = ?",
            kind.collection()
        );
        let result = sqlx::query(&sql)
            .bind(tags)
            .bind(thread.version as i64)
            .bind(document)
            .bind(uuid_to_blob(thread.id.0))
            .bind(expected_version as i64)
            .execute(&self.pool)
            .await
            .map_err(db)?;

        if result.rows_affected() == 1 {
            debug!(%kind, id = %thread.id, version = thread.version, "saved thread");
            return Ok(());
        }

        match self.stored_version(kind, thread.id).await? {
            None => Err(AppError::not_found(ThreadId::ENTITY, thread.id)),
            Some(current) => Err(AppError::Conflict(format!(
                "{} {} is at version {}, expected {}",
                kind, thread.id, current, expected_version
            ))),
        }
    }

    async fn delete(&self, kind: ThreadKind, id: ThreadId) -> Result<bool> {
        let sql = format!("DELETE FROM {} WHERE id = ?", kind.collection());
        let result = sqlx::query(&sql)
            .bind(uuid_to_blob(id.0))
            .execute(&self.pool)
            .await
            .map_err(db)?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UserDirectory for SqliteForumRepo {
    async fn find_user(&self, id: UserId) -> anyhow::Result<Option<UserProfile>> {
        let row = sqlx::query("SELECT id, username, display_name, role, created_at FROM users WHERE id = ?")
            .bind(uuid_to_blob(id.0))
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| user_from_row(&r)).transpose()
    }

    async fn find_user_by_username(&self, username: &str) -> anyhow::Result<Option<UserProfile>> {
        let row = sqlx::query("SELECT id, username, display_name, role, created_at FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| user_from_row(&r)).transpose()
    }
}

fn user_from_row(row: &sqlx::sqlite::SqliteRow) -> anyhow::Result<UserProfile> {
    Ok(UserProfile {
        id: UserId(blob_to_uuid(row.get::<Vec<u8>, _>("id").as_slice())?),
        username: row.get("username"),
        display_name: row.get("display_name"),
        role: parse_role(&row.get::<String, _>("role"))?,
        created: row.get("created_at"),
    })
}
