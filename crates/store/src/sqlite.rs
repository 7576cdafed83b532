use {async_trait::async_trait, sqlx::SqlitePool, uuid::Uuid};

use crate::{
    conversations::{ConversationStore, Direction, Identity, MessageRecord, Thread},
    error::{Error, Result},
};

/// SQLite-backed conversation store.
pub struct SqliteConversationStore {
    pool: SqlitePool,
}

impl SqliteConversationStore {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the schema if it does not exist. Called once at startup
    /// and by tests running against in-memory databases.
    pub async fn init(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS identities (
                id         TEXT    PRIMARY KEY,
                token      TEXT    NOT NULL UNIQUE,
                created_at INTEGER NOT NULL
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS threads (
                id           TEXT    PRIMARY KEY,
                identity_id  TEXT    NOT NULL,
                provider_sid TEXT,
                started_at   INTEGER NOT NULL,
                ended_at     INTEGER
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS messages (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                thread_id    TEXT    NOT NULL,
                provider_sid TEXT,
                direction    TEXT    NOT NULL
                             CHECK (direction IN ('inbound', 'outbound', 'system')),
                body         TEXT    NOT NULL,
                sent_at      INTEGER NOT NULL
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_threads_identity_started
             ON threads (identity_id, started_at)",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_messages_thread_sent
             ON messages (thread_id, sent_at)",
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

#[async_trait]
impl ConversationStore for SqliteConversationStore {
    async fn ensure_identity(&self, token: &str) -> Result<Identity> {
        sqlx::query(
            "INSERT INTO identities (id, token, created_at)
             VALUES (?, ?, ?)
             ON CONFLICT (token) DO NOTHING",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(token)
        .bind(now_ms())
        .execute(&self.pool)
        .await?;

        let row = sqlx::query_as::<_, (String, String, i64)>(
            "SELECT id, token, created_at FROM identities WHERE token = ?",
        )
        .bind(token)
        .fetch_one(&self.pool)
        .await?;

        Ok(Identity {
            id: row.0,
            token: row.1,
            created_at: row.2,
        })
    }

    async fn open_thread(&self, identity_id: &str, provider_sid: Option<&str>) -> Result<Thread> {
        let id = Uuid::new_v4().to_string();
        let started_at = now_ms();
        sqlx::query(
            "INSERT INTO threads (id, identity_id, provider_sid, started_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(identity_id)
        .bind(provider_sid)
        .bind(started_at)
        .execute(&self.pool)
        .await?;

        Ok(Thread {
            id,
            identity_id: identity_id.to_string(),
            provider_sid: provider_sid.map(str::to_string),
            started_at,
            ended_at: None,
        })
    }

    async fn append_message(
        &self,
        thread_id: &str,
        provider_sid: Option<&str>,
        direction: Direction,
        body: &str,
        sent_at: i64,
    ) -> Result<MessageRecord> {
        let result = sqlx::query(
            "INSERT INTO messages (thread_id, provider_sid, direction, body, sent_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(thread_id)
        .bind(provider_sid)
        .bind(direction.as_str())
        .bind(body)
        .bind(sent_at)
        .execute(&self.pool)
        .await?;

        Ok(MessageRecord {
            id: result.last_insert_rowid(),
            thread_id: thread_id.to_string(),
            provider_sid: provider_sid.map(str::to_string),
            direction,
            body: body.to_string(),
            sent_at,
        })
    }

    async fn close_thread(&self, thread_id: &str, ended_at: i64) -> Result<()> {
        let result = sqlx::query("UPDATE threads SET ended_at = ? WHERE id = ?")
            .bind(ended_at)
            .bind(thread_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found("thread", thread_id));
        }
        Ok(())
    }

    async fn list_identities(&self) -> Result<Vec<Identity>> {
        let rows = sqlx::query_as::<_, (String, String, i64)>(
            "SELECT id, token, created_at FROM identities ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Identity {
                id: r.0,
                token: r.1,
                created_at: r.2,
            })
            .collect())
    }

    async fn list_threads(&self, identity_id: &str) -> Result<Vec<Thread>> {
        let rows = sqlx::query_as::<_, (String, String, Option<String>, i64, Option<i64>)>(
            "SELECT id, identity_id, provider_sid, started_at, ended_at
             FROM threads
             WHERE identity_id = ?
             ORDER BY started_at, id",
        )
        .bind(identity_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Thread {
                id: r.0,
                identity_id: r.1,
                provider_sid: r.2,
                started_at: r.3,
                ended_at: r.4,
            })
            .collect())
    }

    async fn list_messages(&self, thread_id: &str) -> Result<Vec<MessageRecord>> {
        let rows = sqlx::query_as::<_, (i64, String, Option<String>, String, String, i64)>(
            "SELECT id, thread_id, provider_sid, direction, body, sent_at
             FROM messages
             WHERE thread_id = ?
             ORDER BY sent_at, id",
        )
        .bind(thread_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|r| {
                Ok(MessageRecord {
                    id: r.0,
                    thread_id: r.1,
                    provider_sid: r.2,
                    direction: Direction::parse(&r.3)?,
                    body: r.4,
                    sent_at: r.5,
                })
            })
            .collect()
    }
}
