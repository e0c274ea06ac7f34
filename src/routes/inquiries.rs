use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use chrono::Utc;
use diesel::{prelude::*, PgConnection};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::documents::{to_iso, StudentSummary};
use crate::archival;
use crate::auth::{AdminUser, AuthenticatedUser};
use crate::error::{AppError, AppResult};
use crate::models::{Inquiry, InquiryReply, NewInquiry, NewInquiryReply, User};
use crate::schema::{inquiries, inquiry_replies, users};
use crate::state::AppState;
use crate::workflow::{self, InquiryStatus};

const MAX_REPLY_LENGTH: usize = 10_000;

#[derive(Deserialize)]
pub struct CreateInquiryPayload {
    pub message: String,
}

#[derive(Deserialize)]
pub struct UpdateStatusPayload {
    pub status: String,
    /// Free-text resolver identity; defaults to the acting admin's email.
    pub resolved_by: Option<String>,
}

#[derive(Deserialize)]
pub struct ReplyPayload {
    pub message: String,
    /// Free-text attribution, e.g. "Registrar's Office"; defaults to the
    /// acting admin's name.
    pub replied_by: Option<String>,
}

#[derive(Serialize, Clone)]
pub struct ReplyResponse {
    pub id: Uuid,
    pub message: String,
    pub replied_by: String,
    pub date: String,
}

impl From<InquiryReply> for ReplyResponse {
    fn from(reply: InquiryReply) -> Self {
        Self {
            id: reply.id,
            message: reply.message,
            replied_by: reply.replied_by,
            date: to_iso(reply.created_at),
        }
    }
}

#[derive(Serialize)]
pub struct InquiryResponse {
    pub id: Uuid,
    pub message: String,
    pub status: String,
    pub resolved_at: Option<String>,
    pub resolved_by: Option<String>,
    pub archived: bool,
    pub archived_at: Option<String>,
    pub archived_by: Option<String>,
    pub created_at: String,
    pub replies: Vec<ReplyResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<StudentSummary>,
}

impl InquiryResponse {
    fn from_record(
        record: Inquiry,
        replies: Vec<InquiryReply>,
        student: Option<StudentSummary>,
    ) -> Self {
        Self {
            id: record.id,
            message: record.message,
            status: record.status,
            resolved_at: record.resolved_at.map(to_iso),
            resolved_by: record.resolved_by,
            archived: record.archived,
            archived_at: record.archived_at.map(to_iso),
            archived_by: record.archived_by,
            created_at: to_iso(record.created_at),
            replies: replies.into_iter().map(Into::into).collect(),
            student,
        }
    }
}

fn load_replies(
    conn: &mut PgConnection,
    records: &[Inquiry],
) -> Result<Vec<Vec<InquiryReply>>, diesel::result::Error> {
    let replies = InquiryReply::belonging_to(records)
        .order(inquiry_replies::created_at.asc())
        .load::<InquiryReply>(conn)?
        .grouped_by(records);
    Ok(replies)
}

fn load_thread(
    conn: &mut PgConnection,
    inquiry_id: Uuid,
) -> Result<(Inquiry, Vec<InquiryReply>), diesel::result::Error> {
    let record: Inquiry = inquiries::table.find(inquiry_id).first(conn)?;
    let replies = InquiryReply::belonging_to(&record)
        .order(inquiry_replies::created_at.asc())
        .load::<InquiryReply>(conn)?;
    Ok((record, replies))
}

pub async fn create_inquiry(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateInquiryPayload>,
) -> AppResult<(StatusCode, Json<InquiryResponse>)> {
    let message = payload.message.trim().to_string();
    if message.is_empty() {
        return Err(AppError::bad_request("message must not be empty"));
    }

    let mut conn = state.db()?;
    let new_inquiry = NewInquiry {
        id: Uuid::new_v4(),
        user_id: user.user_id,
        message,
        status: InquiryStatus::Pending.as_str().to_string(),
    };

    diesel::insert_into(inquiries::table)
        .values(&new_inquiry)
        .execute(&mut conn)?;

    let record: Inquiry = inquiries::table.find(new_inquiry.id).first(&mut conn)?;

    info!(inquiry_id = %record.id, "inquiry created");

    Ok((
        StatusCode::CREATED,
        Json(InquiryResponse::from_record(record, Vec::new(), None)),
    ))
}

pub async fn my_inquiries(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<Vec<InquiryResponse>>> {
    let mut conn = state.db()?;

    let records: Vec<Inquiry> = inquiries::table
        .filter(inquiries::user_id.eq(user.user_id))
        .filter(inquiries::archived.eq(false))
        .order(inquiries::created_at.desc())
        .load(&mut conn)?;

    let replies = load_replies(&mut conn, &records)?;

    let response = records
        .into_iter()
        .zip(replies)
        .map(|(record, thread)| InquiryResponse::from_record(record, thread, None))
        .collect();

    Ok(Json(response))
}

pub async fn list_inquiries(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<Json<Vec<InquiryResponse>>> {
    let mut conn = state.db()?;

    let rows: Vec<(Inquiry, User)> = inquiries::table
        .inner_join(users::table)
        .filter(inquiries::archived.eq(false))
        .order(inquiries::created_at.desc())
        .load(&mut conn)?;

    let (records, owners): (Vec<Inquiry>, Vec<User>) = rows.into_iter().unzip();
    let replies = load_replies(&mut conn, &records)?;

    let response = records
        .into_iter()
        .zip(replies)
        .zip(owners)
        .map(|((record, thread), owner)| {
            InquiryResponse::from_record(record, thread, Some(owner.into()))
        })
        .collect();

    Ok(Json(response))
}

pub async fn list_archived_inquiries(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<Json<Vec<InquiryResponse>>> {
    let mut conn = state.db()?;

    let rows: Vec<(Inquiry, User)> = inquiries::table
        .inner_join(users::table)
        .filter(inquiries::archived.eq(true))
        .order(inquiries::archived_at.desc())
        .load(&mut conn)?;

    let (records, owners): (Vec<Inquiry>, Vec<User>) = rows.into_iter().unzip();
    let replies = load_replies(&mut conn, &records)?;

    let response = records
        .into_iter()
        .zip(replies)
        .zip(owners)
        .map(|((record, thread), owner)| {
            InquiryResponse::from_record(record, thread, Some(owner.into()))
        })
        .collect();

    Ok(Json(response))
}

pub async fn update_inquiry_status(
    State(state): State<AppState>,
    Path(inquiry_id): Path<Uuid>,
    admin: AdminUser,
    Json(payload): Json<UpdateStatusPayload>,
) -> AppResult<Json<InquiryResponse>> {
    let transition = workflow::inquiry_transition(&payload.status)?;
    let resolver = payload
        .resolved_by
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| admin.0.email.clone());

    let mut conn = state.db()?;
    let now = Utc::now().naive_utc();

    // Status write, resolution back-fill, and archival land together or
    // not at all; a resolved-but-not-archived record cannot be observed.
    let record: Inquiry = conn.transaction(|conn| {
        let existing: Inquiry = inquiries::table.find(inquiry_id).first(conn)?;

        diesel::update(inquiries::table.find(inquiry_id))
            .set((
                inquiries::status.eq(transition.status.as_str()),
                inquiries::updated_at.eq(now),
            ))
            .execute(conn)?;

        if transition.backfill_resolution && existing.resolved_at.is_none() {
            diesel::update(inquiries::table.find(inquiry_id))
                .set((
                    inquiries::resolved_at.eq(now),
                    inquiries::resolved_by.eq(&resolver),
                ))
                .execute(conn)?;
        }

        if transition.archive && !existing.archived {
            diesel::update(inquiries::table.find(inquiry_id))
                .set((
                    inquiries::archived.eq(true),
                    inquiries::archived_at.eq(now),
                    inquiries::archived_by.eq(&resolver),
                ))
                .execute(conn)?;
        }

        inquiries::table.find(inquiry_id).first(conn)
    })?;

    info!(
        inquiry_id = %inquiry_id,
        status = %record.status,
        admin = %admin.0.email,
        "inquiry status updated"
    );

    let (record, replies) = load_thread(&mut conn, record.id)?;
    Ok(Json(InquiryResponse::from_record(record, replies, None)))
}

pub async fn add_reply(
    State(state): State<AppState>,
    Path(inquiry_id): Path<Uuid>,
    admin: AdminUser,
    Json(payload): Json<ReplyPayload>,
) -> AppResult<(StatusCode, Json<InquiryResponse>)> {
    let message = payload.message.trim().to_string();
    if message.is_empty() {
        return Err(AppError::bad_request("reply message must not be empty"));
    }
    if message.chars().count() > MAX_REPLY_LENGTH {
        return Err(AppError::bad_request(format!(
            "reply message must not exceed {MAX_REPLY_LENGTH} characters"
        )));
    }
    let replied_by = payload
        .replied_by
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| admin.0.full_name.clone());

    let mut conn = state.db()?;
    let record: Inquiry = inquiries::table.find(inquiry_id).first(&mut conn)?;

    let new_reply = NewInquiryReply {
        id: Uuid::new_v4(),
        inquiry_id: record.id,
        message,
        replied_by,
    };

    diesel::insert_into(inquiry_replies::table)
        .values(&new_reply)
        .execute(&mut conn)?;

    // Replying does not touch the inquiry's status; marking it resolved is
    // a separate, explicit call.
    let (record, replies) = load_thread(&mut conn, record.id)?;

    info!(
        inquiry_id = %record.id,
        replies = replies.len(),
        "reply appended to inquiry"
    );

    Ok((
        StatusCode::CREATED,
        Json(InquiryResponse::from_record(record, replies, None)),
    ))
}

pub async fn archive_inquiry(
    State(state): State<AppState>,
    Path(inquiry_id): Path<Uuid>,
    admin: AdminUser,
) -> AppResult<Json<InquiryResponse>> {
    let mut conn = state.db()?;
    let record = archival::archive_inquiry(&mut conn, inquiry_id, &admin.0.email)?;
    let (record, replies) = load_thread(&mut conn, record.id)?;
    Ok(Json(InquiryResponse::from_record(record, replies, None)))
}

pub async fn restore_inquiry(
    State(state): State<AppState>,
    Path(inquiry_id): Path<Uuid>,
    _admin: AdminUser,
) -> AppResult<Json<InquiryResponse>> {
    let mut conn = state.db()?;
    let record = archival::restore_inquiry(&mut conn, inquiry_id)?;
    let (record, replies) = load_thread(&mut conn, record.id)?;
    Ok(Json(InquiryResponse::from_record(record, replies, None)))
}

/// Housekeeping surface carried over from the admin UI; not part of the
/// workflow engine. Removes the thread with the inquiry.
pub async fn delete_inquiry(
    State(state): State<AppState>,
    Path(inquiry_id): Path<Uuid>,
    admin: AdminUser,
) -> AppResult<StatusCode> {
    let mut conn = state.db()?;

    let deleted = conn.transaction::<_, diesel::result::Error, _>(|conn| {
        diesel::delete(inquiry_replies::table.filter(inquiry_replies::inquiry_id.eq(inquiry_id)))
            .execute(conn)?;
        diesel::delete(inquiries::table.find(inquiry_id)).execute(conn)
    })?;

    if deleted == 0 {
        return Err(AppError::not_found());
    }

    info!(inquiry_id = %inquiry_id, admin = %admin.0.email, "inquiry deleted");

    Ok(StatusCode::NO_CONTENT)
}
