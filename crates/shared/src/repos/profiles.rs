use sqlx::Row;
use uuid::Uuid;

use crate::models::{CreateProfileRequest, Profile, UpdateProfileRequest};

use super::{Store, StoreError};

const TOP_CONTRIBUTORS_LIMIT: i64 = 10;

const PROFILE_COLUMNS: &str =
    "user_id, display_name, university, course, year, country, bio, avatar_file_id,
     reputation, documents_shared, helpful_answers, study_streak, achievements";

impl Store {
    pub async fn create_profile(
        &self,
        user_id: Uuid,
        req: &CreateProfileRequest,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO profiles (
                user_id, display_name, university, course, year, country, bio,
                reputation, documents_shared, helpful_answers, study_streak, achievements
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, 0, 0, 0, 0, '{}')",
        )
        .bind(user_id)
        .bind(&req.display_name)
        .bind(&req.university)
        .bind(&req.course)
        .bind(req.year)
        .bind(&req.country)
        .bind(&req.bio)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(profile_from_row).transpose()
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        req: &UpdateProfileRequest,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE profiles
             SET display_name = COALESCE($2, display_name),
                 university = COALESCE($3, university),
                 course = COALESCE($4, course),
                 year = COALESCE($5, year),
                 country = COALESCE($6, country),
                 bio = COALESCE($7, bio)
             WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(&req.display_name)
        .bind(&req.university)
        .bind(&req.course)
        .bind(req.year)
        .bind(&req.country)
        .bind(&req.bio)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list_top_contributors(&self) -> Result<Vec<Profile>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles ORDER BY reputation DESC LIMIT $1"
        ))
        .bind(TOP_CONTRIBUTORS_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(profile_from_row).collect()
    }

    pub(super) async fn bump_profile_for_document_upload(
        &self,
        user_id: Uuid,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE profiles
             SET documents_shared = documents_shared + 1,
                 reputation = reputation + 5
             WHERE user_id = $1",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub(super) async fn bump_profile_for_answer(&self, user_id: Uuid) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE profiles
             SET helpful_answers = helpful_answers + 1,
                 reputation = reputation + 2
             WHERE user_id = $1",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn profile_from_row(row: sqlx::postgres::PgRow) -> Result<Profile, StoreError> {
    Ok(Profile {
        user_id: row.try_get("user_id")?,
        display_name: row.try_get("display_name")?,
        university: row.try_get("university")?,
        course: row.try_get("course")?,
        year: row.try_get("year")?,
        country: row.try_get("country")?,
        bio: row.try_get("bio")?,
        avatar_file_id: row.try_get("avatar_file_id")?,
        reputation: row.try_get("reputation")?,
        documents_shared: row.try_get("documents_shared")?,
        helpful_answers: row.try_get("helpful_answers")?,
        study_streak: row.try_get("study_streak")?,
        achievements: row.try_get("achievements")?,
    })
}
