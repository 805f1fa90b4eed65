use sqlx::Row;
use uuid::Uuid;

use crate::models::{CreateStudyGroupRequest, StudyGroup};

use super::{Store, StoreError};

const GROUP_LIST_LIMIT: i64 = 20;

const GROUP_SELECT: &str = "SELECT g.id, g.name, g.description, g.subject, g.university,
            g.creator_id, g.members, g.max_members, g.is_private, g.meeting_schedule,
            g.tags, g.created_at,
            p.display_name AS creator_name
     FROM study_groups g
     LEFT JOIN profiles p ON p.user_id = g.creator_id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinGroupOutcome {
    Joined,
    NotFound,
    AlreadyMember,
    GroupFull,
}

impl Store {
    pub async fn create_study_group(
        &self,
        creator_id: Uuid,
        req: &CreateStudyGroupRequest,
    ) -> Result<Uuid, StoreError> {
        let group_id: Uuid = sqlx::query_scalar(
            "INSERT INTO study_groups (
                name, description, subject, university, creator_id, members,
                max_members, is_private, meeting_schedule, tags
             ) VALUES ($1, $2, $3, $4, $5, ARRAY[$5], $6, $7, $8, $9)
             RETURNING id",
        )
        .bind(&req.name)
        .bind(&req.description)
        .bind(&req.subject)
        .bind(&req.university)
        .bind(creator_id)
        .bind(req.max_members)
        .bind(req.is_private)
        .bind(&req.meeting_schedule)
        .bind(&req.tags)
        .fetch_one(&self.pool)
        .await?;

        Ok(group_id)
    }

    pub async fn list_study_groups(
        &self,
        subject: Option<&str>,
        university: Option<&str>,
    ) -> Result<Vec<StudyGroup>, StoreError> {
        let rows = sqlx::query(&format!(
            "{GROUP_SELECT}
             WHERE ($1::text IS NULL OR g.subject = $1)
               AND ($2::text IS NULL OR g.university = $2)
             ORDER BY g.created_at DESC, g.id DESC
             LIMIT $3"
        ))
        .bind(subject)
        .bind(university)
        .bind(GROUP_LIST_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(group_from_row).collect()
    }

    pub async fn list_user_study_groups(&self, user_id: Uuid) -> Result<Vec<StudyGroup>, StoreError> {
        let rows = sqlx::query(&format!(
            "{GROUP_SELECT}
             WHERE $1 = ANY(g.members)
             ORDER BY g.created_at DESC, g.id DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(group_from_row).collect()
    }

    // Read-modify-write over the members array; the membership and capacity
    // checks run against the snapshot read here.
    pub async fn join_study_group(
        &self,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<JoinGroupOutcome, StoreError> {
        let row = sqlx::query("SELECT members, max_members FROM study_groups WHERE id = $1")
            .bind(group_id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(JoinGroupOutcome::NotFound);
        };

        let members: Vec<Uuid> = row.try_get("members")?;
        let max_members: i32 = row.try_get("max_members")?;

        if members.contains(&user_id) {
            return Ok(JoinGroupOutcome::AlreadyMember);
        }

        if members.len() >= max_members.max(0) as usize {
            return Ok(JoinGroupOutcome::GroupFull);
        }

        sqlx::query("UPDATE study_groups SET members = array_append(members, $2) WHERE id = $1")
            .bind(group_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(JoinGroupOutcome::Joined)
    }
}

fn group_from_row(row: sqlx::postgres::PgRow) -> Result<StudyGroup, StoreError> {
    let creator_name: Option<String> = row.try_get("creator_name")?;
    let members: Vec<Uuid> = row.try_get("members")?;
    let member_count = i32::try_from(members.len())
        .map_err(|_| StoreError::InvalidData("study group member count out of range".to_string()))?;

    Ok(StudyGroup {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        subject: row.try_get("subject")?,
        university: row.try_get("university")?,
        creator_id: row.try_get("creator_id")?,
        members,
        max_members: row.try_get("max_members")?,
        is_private: row.try_get("is_private")?,
        meeting_schedule: row.try_get("meeting_schedule")?,
        tags: row.try_get("tags")?,
        created_at: row.try_get("created_at")?,
        creator_name: creator_name.unwrap_or_else(|| "Anonymous".to_string()),
        member_count,
    })
}
