use chrono::NaiveDateTime;
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::*;

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = users)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: String,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = document_requests)]
#[diesel(belongs_to(User))]
pub struct DocumentRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub document_type: String,
    pub purpose: String,
    pub preferred_date: String,
    pub preferred_time: String,
    pub notes: Option<String>,
    pub status: String,
    pub archived: bool,
    pub archived_at: Option<NaiveDateTime>,
    pub archived_by: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = document_requests)]
pub struct NewDocumentRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub document_type: String,
    pub purpose: String,
    pub preferred_date: String,
    pub preferred_time: String,
    pub notes: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = enrollments)]
pub struct Enrollment {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub enrollment_number: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub birth_date: String,
    pub gender: String,
    pub address: String,
    pub contact_number: String,
    pub email: String,
    pub guardian_name: String,
    pub guardian_contact: String,
    pub guardian_relationship: String,
    pub grade_level: String,
    pub school_year: String,
    pub previous_school: Option<String>,
    pub lrn: Option<String>,
    pub form137_path: Option<String>,
    pub form138_path: Option<String>,
    pub birth_certificate_path: Option<String>,
    pub good_moral_path: Option<String>,
    pub id_photo_path: Option<String>,
    pub other_document_path: Option<String>,
    pub status: String,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<NaiveDateTime>,
    pub review_notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = enrollments)]
pub struct NewEnrollment {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub enrollment_number: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub birth_date: String,
    pub gender: String,
    pub address: String,
    pub contact_number: String,
    pub email: String,
    pub guardian_name: String,
    pub guardian_contact: String,
    pub guardian_relationship: String,
    pub grade_level: String,
    pub school_year: String,
    pub previous_school: Option<String>,
    pub lrn: Option<String>,
    pub form137_path: Option<String>,
    pub form138_path: Option<String>,
    pub birth_certificate_path: Option<String>,
    pub good_moral_path: Option<String>,
    pub id_photo_path: Option<String>,
    pub other_document_path: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = inquiries)]
#[diesel(belongs_to(User))]
pub struct Inquiry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    pub status: String,
    pub resolved_at: Option<NaiveDateTime>,
    pub resolved_by: Option<String>,
    pub archived: bool,
    pub archived_at: Option<NaiveDateTime>,
    pub archived_by: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = inquiries)]
pub struct NewInquiry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    pub status: String,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = inquiry_replies)]
#[diesel(belongs_to(Inquiry))]
pub struct InquiryReply {
    pub id: Uuid,
    pub inquiry_id: Uuid,
    pub message: String,
    pub replied_by: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = inquiry_replies)]
pub struct NewInquiryReply {
    pub id: Uuid,
    pub inquiry_id: Uuid,
    pub message: String,
    pub replied_by: String,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = refresh_tokens)]
#[diesel(belongs_to(User))]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub issued_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
    pub revoked_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = refresh_tokens)]
pub struct NewRefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub issued_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
}
