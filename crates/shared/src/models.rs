use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub user_id: Uuid,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshSessionRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: Uuid,
    pub display_name: String,
    pub university: String,
    pub course: String,
    pub year: i32,
    pub country: String,
    pub bio: Option<String>,
    pub avatar_file_id: Option<Uuid>,
    pub reputation: i32,
    pub documents_shared: i32,
    pub helpful_answers: i32,
    pub study_streak: i32,
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProfileRequest {
    pub display_name: String,
    pub university: String,
    pub course: String,
    pub year: i32,
    pub country: String,
    #[serde(default)]
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub university: Option<String>,
    #[serde(default)]
    pub course: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListProfilesResponse {
    pub items: Vec<Profile>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Notes,
    Assignment,
    Exam,
    Textbook,
    Research,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub subject: String,
    pub course: String,
    pub university: String,
    pub document_type: DocumentType,
    pub file_id: Uuid,
    pub uploader_id: Uuid,
    pub tags: Vec<String>,
    pub downloads: i32,
    pub rating: f64,
    pub rating_count: i32,
    pub is_verified: bool,
    pub is_premium: bool,
    pub created_at: DateTime<Utc>,
    pub uploader_name: String,
    pub uploader_reputation: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentDetail {
    #[serde(flatten)]
    pub document: Document,
    pub file_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadDocumentRequest {
    pub title: String,
    pub description: String,
    pub subject: String,
    pub course: String,
    pub university: String,
    pub document_type: DocumentType,
    pub file_id: Uuid,
    pub tags: Vec<String>,
    pub is_premium: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadDocumentResponse {
    pub document_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadUrlResponse {
    pub file_id: Uuid,
    pub upload_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListDocumentsResponse {
    pub items: Vec<Document>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub subject: String,
    pub course: String,
    pub university: String,
    pub asker_id: Uuid,
    pub tags: Vec<String>,
    pub bounty: Option<i32>,
    pub is_resolved: bool,
    pub views: i32,
    pub upvotes: i32,
    pub created_at: DateTime<Utc>,
    pub asker_name: String,
    pub asker_reputation: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskQuestionRequest {
    pub title: String,
    pub content: String,
    pub subject: String,
    pub course: String,
    pub university: String,
    pub tags: Vec<String>,
    #[serde(default)]
    pub bounty: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskQuestionResponse {
    pub question_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListQuestionsResponse {
    pub items: Vec<Question>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub id: Uuid,
    pub question_id: Uuid,
    pub content: String,
    pub answerer_id: Uuid,
    pub upvotes: i32,
    pub downvotes: i32,
    pub is_accepted: bool,
    pub created_at: DateTime<Utc>,
    pub answerer_name: String,
    pub answerer_reputation: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerQuestionRequest {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerQuestionResponse {
    pub answer_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListAnswersResponse {
    pub items: Vec<Answer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyGroup {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub subject: String,
    pub university: String,
    pub creator_id: Uuid,
    pub members: Vec<Uuid>,
    pub max_members: i32,
    pub is_private: bool,
    pub meeting_schedule: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub creator_name: String,
    pub member_count: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStudyGroupRequest {
    pub name: String,
    pub description: String,
    pub subject: String,
    pub university: String,
    pub max_members: i32,
    pub is_private: bool,
    #[serde(default)]
    pub meeting_schedule: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStudyGroupResponse {
    pub group_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListStudyGroupsResponse {
    pub items: Vec<StudyGroup>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionTurn {
    pub role: TurnRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutoringSession {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub subject: String,
    pub topic: String,
    pub turns: Vec<SessionTurn>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartTutoringRequest {
    pub subject: String,
    pub topic: String,
    pub initial_question: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartTutoringResponse {
    pub session_id: Uuid,
    pub response: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContinueTutoringRequest {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContinueTutoringResponse {
    pub response: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListTutoringSessionsResponse {
    pub items: Vec<TutoringSession>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}
