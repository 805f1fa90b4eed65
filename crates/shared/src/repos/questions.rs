use sqlx::Row;
use uuid::Uuid;

use crate::models::{Answer, AskQuestionRequest, Question};

use super::{Store, StoreError};

const QUESTION_LIST_LIMIT: i64 = 20;

impl Store {
    pub async fn insert_question(
        &self,
        asker_id: Uuid,
        req: &AskQuestionRequest,
    ) -> Result<Uuid, StoreError> {
        let question_id: Uuid = sqlx::query_scalar(
            "INSERT INTO questions (
                title, content, subject, course, university, asker_id, tags, bounty,
                is_resolved, views, upvotes
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, FALSE, 0, 0)
             RETURNING id",
        )
        .bind(&req.title)
        .bind(&req.content)
        .bind(&req.subject)
        .bind(&req.course)
        .bind(&req.university)
        .bind(asker_id)
        .bind(&req.tags)
        .bind(req.bounty)
        .fetch_one(&self.pool)
        .await?;

        Ok(question_id)
    }

    pub async fn question_exists(&self, question_id: Uuid) -> Result<bool, StoreError> {
        let exists: Option<i32> = sqlx::query_scalar("SELECT 1 FROM questions WHERE id = $1")
            .bind(question_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(exists.is_some())
    }

    pub async fn list_questions(&self, subject: Option<&str>) -> Result<Vec<Question>, StoreError> {
        let rows = sqlx::query(
            "SELECT q.id, q.title, q.content, q.subject, q.course, q.university, q.asker_id,
                    q.tags, q.bounty, q.is_resolved, q.views, q.upvotes, q.created_at,
                    p.display_name AS asker_name, p.reputation AS asker_reputation
             FROM questions q
             LEFT JOIN profiles p ON p.user_id = q.asker_id
             WHERE ($1::text IS NULL OR q.subject = $1)
             ORDER BY q.created_at DESC, q.id DESC
             LIMIT $2",
        )
        .bind(subject)
        .bind(QUESTION_LIST_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(question_from_row).collect()
    }

    pub async fn insert_answer(
        &self,
        question_id: Uuid,
        answerer_id: Uuid,
        content: &str,
    ) -> Result<Uuid, StoreError> {
        let answer_id: Uuid = sqlx::query_scalar(
            "INSERT INTO answers (question_id, content, answerer_id, upvotes, downvotes, is_accepted)
             VALUES ($1, $2, $3, 0, 0, FALSE)
             RETURNING id",
        )
        .bind(question_id)
        .bind(content)
        .bind(answerer_id)
        .fetch_one(&self.pool)
        .await?;

        self.bump_profile_for_answer(answerer_id).await?;

        Ok(answer_id)
    }

    pub async fn list_answers(&self, question_id: Uuid) -> Result<Vec<Answer>, StoreError> {
        let rows = sqlx::query(
            "SELECT a.id, a.question_id, a.content, a.answerer_id, a.upvotes, a.downvotes,
                    a.is_accepted, a.created_at,
                    p.display_name AS answerer_name, p.reputation AS answerer_reputation
             FROM answers a
             LEFT JOIN profiles p ON p.user_id = a.answerer_id
             WHERE a.question_id = $1
             ORDER BY a.created_at DESC, a.id DESC",
        )
        .bind(question_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(answer_from_row).collect()
    }
}

fn question_from_row(row: sqlx::postgres::PgRow) -> Result<Question, StoreError> {
    let asker_name: Option<String> = row.try_get("asker_name")?;
    let asker_reputation: Option<i32> = row.try_get("asker_reputation")?;

    Ok(Question {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        subject: row.try_get("subject")?,
        course: row.try_get("course")?,
        university: row.try_get("university")?,
        asker_id: row.try_get("asker_id")?,
        tags: row.try_get("tags")?,
        bounty: row.try_get("bounty")?,
        is_resolved: row.try_get("is_resolved")?,
        views: row.try_get("views")?,
        upvotes: row.try_get("upvotes")?,
        created_at: row.try_get("created_at")?,
        asker_name: asker_name.unwrap_or_else(|| "Anonymous".to_string()),
        asker_reputation: asker_reputation.unwrap_or(0),
    })
}

fn answer_from_row(row: sqlx::postgres::PgRow) -> Result<Answer, StoreError> {
    let answerer_name: Option<String> = row.try_get("answerer_name")?;
    let answerer_reputation: Option<i32> = row.try_get("answerer_reputation")?;

    Ok(Answer {
        id: row.try_get("id")?,
        question_id: row.try_get("question_id")?,
        content: row.try_get("content")?,
        answerer_id: row.try_get("answerer_id")?,
        upvotes: row.try_get("upvotes")?,
        downvotes: row.try_get("downvotes")?,
        is_accepted: row.try_get("is_accepted")?,
        created_at: row.try_get("created_at")?,
        answerer_name: answerer_name.unwrap_or_else(|| "Anonymous".to_string()),
        answerer_reputation: answerer_reputation.unwrap_or(0),
    })
}
