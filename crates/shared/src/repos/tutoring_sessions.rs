use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::Row;
use uuid::Uuid;

use crate::models::{SessionTurn, TutoringSession};

use super::{Store, StoreError};

pub const TUTOR_SESSIONS_LIST_LIMIT: i64 = 10;

#[derive(Debug, Clone)]
pub struct TutoringSessionRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub subject: String,
    pub topic: String,
    pub turns: Vec<SessionTurn>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TutoringSessionRecord> for TutoringSession {
    fn from(record: TutoringSessionRecord) -> Self {
        Self {
            id: record.id,
            owner_id: record.owner_id,
            subject: record.subject,
            topic: record.topic,
            turns: record.turns,
            is_active: record.is_active,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

impl Store {
    pub async fn create_tutoring_session(
        &self,
        owner_id: Uuid,
        subject: &str,
        topic: &str,
        turns: &[SessionTurn],
        now: DateTime<Utc>,
    ) -> Result<Uuid, StoreError> {
        let session_id: Uuid = sqlx::query_scalar(
            "INSERT INTO tutoring_sessions (
                owner_id, subject, topic, turns, is_active, created_at, updated_at
             ) VALUES ($1, $2, $3, $4, TRUE, $5, $5)
             RETURNING id",
        )
        .bind(owner_id)
        .bind(subject)
        .bind(topic)
        .bind(encode_turns(turns)?)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(session_id)
    }

    pub async fn get_tutoring_session(
        &self,
        session_id: Uuid,
    ) -> Result<Option<TutoringSessionRecord>, StoreError> {
        let row = sqlx::query(
            "SELECT id, owner_id, subject, topic, turns, is_active, created_at, updated_at
             FROM tutoring_sessions
             WHERE id = $1",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(session_from_row).transpose()
    }

    /// Appends one user/assistant turn pair by rewriting the full turn array.
    /// The array read here is the authority; a concurrent append to the same
    /// session is last-writer-wins.
    pub async fn append_tutoring_turns(
        &self,
        session_id: Uuid,
        user_turn: SessionTurn,
        assistant_turn: SessionTurn,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT turns FROM tutoring_sessions WHERE id = $1")
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(false);
        };

        let mut turns = decode_turns(row.try_get("turns")?)?;
        turns.push(user_turn);
        turns.push(assistant_turn);

        sqlx::query("UPDATE tutoring_sessions SET turns = $2, updated_at = $3 WHERE id = $1")
            .bind(session_id)
            .bind(encode_turns(&turns)?)
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(true)
    }

    pub async fn list_recent_tutoring_sessions(
        &self,
        owner_id: Uuid,
        limit: i64,
    ) -> Result<Vec<TutoringSessionRecord>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, owner_id, subject, topic, turns, is_active, created_at, updated_at
             FROM tutoring_sessions
             WHERE owner_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2",
        )
        .bind(owner_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(session_from_row).collect()
    }
}

fn session_from_row(row: sqlx::postgres::PgRow) -> Result<TutoringSessionRecord, StoreError> {
    Ok(TutoringSessionRecord {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        subject: row.try_get("subject")?,
        topic: row.try_get("topic")?,
        turns: decode_turns(row.try_get("turns")?)?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn encode_turns(turns: &[SessionTurn]) -> Result<Value, StoreError> {
    serde_json::to_value(turns)
        .map_err(|err| StoreError::InvalidData(format!("tutoring turns invalid: {err}")))
}

fn decode_turns(value: Value) -> Result<Vec<SessionTurn>, StoreError> {
    serde_json::from_value(value)
        .map_err(|err| StoreError::InvalidData(format!("tutoring turns invalid: {err}")))
}
