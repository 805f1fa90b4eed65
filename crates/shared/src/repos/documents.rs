use sqlx::Row;
use uuid::Uuid;

use crate::models::{Document, DocumentType, UploadDocumentRequest};

use super::{Store, StoreError};

const DOCUMENT_LIST_LIMIT: i64 = 20;

const DOCUMENT_SELECT: &str = "SELECT d.id, d.title, d.description, d.subject, d.course,
            d.university, d.document_type, d.file_id, d.uploader_id, d.tags, d.downloads,
            d.rating, d.rating_count, d.is_verified, d.is_premium, d.created_at,
            p.display_name AS uploader_name, p.reputation AS uploader_reputation
     FROM documents d
     LEFT JOIN profiles p ON p.user_id = d.uploader_id";

impl Store {
    pub async fn insert_document(
        &self,
        uploader_id: Uuid,
        req: &UploadDocumentRequest,
    ) -> Result<Uuid, StoreError> {
        let document_id: Uuid = sqlx::query_scalar(
            "INSERT INTO documents (
                title, description, subject, course, university, document_type,
                file_id, uploader_id, tags, downloads, rating, rating_count,
                is_verified, is_premium
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 0, 0, 0, FALSE, $10)
             RETURNING id",
        )
        .bind(&req.title)
        .bind(&req.description)
        .bind(&req.subject)
        .bind(&req.course)
        .bind(&req.university)
        .bind(document_type_to_db(req.document_type))
        .bind(req.file_id)
        .bind(uploader_id)
        .bind(&req.tags)
        .bind(req.is_premium)
        .fetch_one(&self.pool)
        .await?;

        self.bump_profile_for_document_upload(uploader_id).await?;

        Ok(document_id)
    }

    pub async fn get_document(&self, document_id: Uuid) -> Result<Option<Document>, StoreError> {
        let row = sqlx::query(&format!("{DOCUMENT_SELECT} WHERE d.id = $1"))
            .bind(document_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(document_from_row).transpose()
    }

    pub async fn search_documents(
        &self,
        search_term: &str,
        subject: Option<&str>,
        university: Option<&str>,
        document_type: Option<DocumentType>,
    ) -> Result<Vec<Document>, StoreError> {
        let rows = sqlx::query(&format!(
            "{DOCUMENT_SELECT}
             WHERE to_tsvector('english', d.title) @@ websearch_to_tsquery('english', $1)
               AND ($2::text IS NULL OR d.subject = $2)
               AND ($3::text IS NULL OR d.university = $3)
               AND ($4::text IS NULL OR d.document_type = $4)
             ORDER BY d.created_at DESC, d.id DESC
             LIMIT $5"
        ))
        .bind(search_term)
        .bind(subject)
        .bind(university)
        .bind(document_type.map(document_type_to_db))
        .bind(DOCUMENT_LIST_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(document_from_row).collect()
    }

    pub async fn list_documents(
        &self,
        subject: Option<&str>,
        university: Option<&str>,
    ) -> Result<Vec<Document>, StoreError> {
        let rows = sqlx::query(&format!(
            "{DOCUMENT_SELECT}
             WHERE ($1::text IS NULL OR d.subject = $1)
               AND ($2::text IS NULL OR d.university = $2)
             ORDER BY d.created_at DESC, d.id DESC
             LIMIT $3"
        ))
        .bind(subject)
        .bind(university)
        .bind(DOCUMENT_LIST_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(document_from_row).collect()
    }

    pub async fn increment_document_downloads(
        &self,
        document_id: Uuid,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE documents SET downloads = downloads + 1 WHERE id = $1")
            .bind(document_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn document_from_row(row: sqlx::postgres::PgRow) -> Result<Document, StoreError> {
    let document_type_raw: String = row.try_get("document_type")?;
    let uploader_name: Option<String> = row.try_get("uploader_name")?;
    let uploader_reputation: Option<i32> = row.try_get("uploader_reputation")?;

    Ok(Document {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        subject: row.try_get("subject")?,
        course: row.try_get("course")?,
        university: row.try_get("university")?,
        document_type: document_type_from_db(&document_type_raw)?,
        file_id: row.try_get("file_id")?,
        uploader_id: row.try_get("uploader_id")?,
        tags: row.try_get("tags")?,
        downloads: row.try_get("downloads")?,
        rating: row.try_get("rating")?,
        rating_count: row.try_get("rating_count")?,
        is_verified: row.try_get("is_verified")?,
        is_premium: row.try_get("is_premium")?,
        created_at: row.try_get("created_at")?,
        uploader_name: uploader_name.unwrap_or_else(|| "Anonymous".to_string()),
        uploader_reputation: uploader_reputation.unwrap_or(0),
    })
}

fn document_type_to_db(value: DocumentType) -> &'static str {
    match value {
        DocumentType::Notes => "notes",
        DocumentType::Assignment => "assignment",
        DocumentType::Exam => "exam",
        DocumentType::Textbook => "textbook",
        DocumentType::Research => "research",
    }
}

fn document_type_from_db(value: &str) -> Result<DocumentType, StoreError> {
    match value {
        "notes" => Ok(DocumentType::Notes),
        "assignment" => Ok(DocumentType::Assignment),
        "exam" => Ok(DocumentType::Exam),
        "textbook" => Ok(DocumentType::Textbook),
        "research" => Ok(DocumentType::Research),
        _ => Err(StoreError::InvalidData(format!(
            "unknown document type persisted: {value}"
        ))),
    }
}
