use axum::extract::{Json, Path, State};
use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::archival;
use crate::auth::{AdminUser, AuthenticatedUser};
use crate::error::{AppError, AppResult};
use crate::models::{DocumentRequest, NewDocumentRequest, User};
use crate::schema::{document_requests, users};
use crate::state::AppState;
use crate::workflow::{self, RequestStatus};

pub(crate) fn to_iso(dt: NaiveDateTime) -> String {
    DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc).to_rfc3339()
}

#[derive(Serialize, Clone)]
pub struct StudentSummary {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
}

impl From<User> for StudentSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
        }
    }
}

#[derive(Deserialize)]
pub struct CreateRequestPayload {
    pub document_type: String,
    pub purpose: String,
    pub preferred_date: String,
    pub preferred_time: String,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateStatusPayload {
    pub status: String,
}

#[derive(Serialize)]
pub struct RequestResponse {
    pub id: Uuid,
    pub document_type: String,
    pub purpose: String,
    pub preferred_date: String,
    pub preferred_time: String,
    pub notes: Option<String>,
    pub status: String,
    pub archived: bool,
    pub archived_at: Option<String>,
    pub archived_by: Option<String>,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<StudentSummary>,
}

impl RequestResponse {
    fn from_record(record: DocumentRequest, student: Option<StudentSummary>) -> Self {
        Self {
            id: record.id,
            document_type: record.document_type,
            purpose: record.purpose,
            preferred_date: record.preferred_date,
            preferred_time: record.preferred_time,
            notes: record.notes,
            status: record.status,
            archived: record.archived,
            archived_at: record.archived_at.map(to_iso),
            archived_by: record.archived_by,
            created_at: to_iso(record.created_at),
            student,
        }
    }
}

#[derive(Serialize)]
pub struct BulkArchiveResponse {
    pub archived: usize,
}

pub async fn create_request(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateRequestPayload>,
) -> AppResult<(axum::http::StatusCode, Json<RequestResponse>)> {
    if payload.document_type.trim().is_empty() {
        return Err(AppError::bad_request("document_type must not be empty"));
    }
    if payload.purpose.trim().is_empty() {
        return Err(AppError::bad_request("purpose must not be empty"));
    }

    let mut conn = state.db()?;
    let new_request = NewDocumentRequest {
        id: Uuid::new_v4(),
        user_id: user.user_id,
        document_type: payload.document_type.trim().to_string(),
        purpose: payload.purpose.trim().to_string(),
        preferred_date: payload.preferred_date.trim().to_string(),
        preferred_time: payload.preferred_time.trim().to_string(),
        notes: payload.notes,
        status: RequestStatus::Pending.as_str().to_string(),
    };

    diesel::insert_into(document_requests::table)
        .values(&new_request)
        .execute(&mut conn)?;

    let record: DocumentRequest = document_requests::table
        .find(new_request.id)
        .first(&mut conn)?;

    info!(
        request_id = %record.id,
        document_type = %record.document_type,
        "document request created"
    );

    Ok((
        axum::http::StatusCode::CREATED,
        Json(RequestResponse::from_record(record, None)),
    ))
}

pub async fn my_requests(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<Vec<RequestResponse>>> {
    let mut conn = state.db()?;

    let records: Vec<DocumentRequest> = document_requests::table
        .filter(document_requests::user_id.eq(user.user_id))
        .filter(document_requests::archived.eq(false))
        .order(document_requests::created_at.desc())
        .load(&mut conn)?;

    let response = records
        .into_iter()
        .map(|record| RequestResponse::from_record(record, None))
        .collect();

    Ok(Json(response))
}

pub async fn list_requests(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<Json<Vec<RequestResponse>>> {
    let mut conn = state.db()?;

    let rows: Vec<(DocumentRequest, User)> = document_requests::table
        .inner_join(users::table)
        .filter(document_requests::archived.eq(false))
        .order(document_requests::created_at.desc())
        .load(&mut conn)?;

    let response = rows
        .into_iter()
        .map(|(record, owner)| RequestResponse::from_record(record, Some(owner.into())))
        .collect();

    Ok(Json(response))
}

pub async fn list_archived_requests(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<Json<Vec<RequestResponse>>> {
    let mut conn = state.db()?;

    let rows: Vec<(DocumentRequest, User)> = document_requests::table
        .inner_join(users::table)
        .filter(document_requests::archived.eq(true))
        .order(document_requests::archived_at.desc())
        .load(&mut conn)?;

    let response = rows
        .into_iter()
        .map(|(record, owner)| RequestResponse::from_record(record, Some(owner.into())))
        .collect();

    Ok(Json(response))
}

pub async fn update_request_status(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
    admin: AdminUser,
    Json(payload): Json<UpdateStatusPayload>,
) -> AppResult<Json<RequestResponse>> {
    let target = workflow::request_transition(&payload.status)?;

    let mut conn = state.db()?;
    let existing: DocumentRequest = document_requests::table.find(request_id).first(&mut conn)?;

    diesel::update(document_requests::table.find(request_id))
        .set((
            document_requests::status.eq(target.as_str()),
            document_requests::updated_at.eq(Utc::now().naive_utc()),
        ))
        .execute(&mut conn)?;

    let updated: DocumentRequest = document_requests::table.find(request_id).first(&mut conn)?;

    info!(
        request_id = %request_id,
        from = %existing.status,
        to = %updated.status,
        admin = %admin.0.email,
        "document request status updated"
    );

    Ok(Json(RequestResponse::from_record(updated, None)))
}

pub async fn archive_request(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
    admin: AdminUser,
) -> AppResult<Json<RequestResponse>> {
    let mut conn = state.db()?;
    let record = archival::archive_request(&mut conn, request_id, &admin.0.email)?;
    Ok(Json(RequestResponse::from_record(record, None)))
}

pub async fn restore_request(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
    _admin: AdminUser,
) -> AppResult<Json<RequestResponse>> {
    let mut conn = state.db()?;
    let record = archival::restore_request(&mut conn, request_id)?;
    Ok(Json(RequestResponse::from_record(record, None)))
}

pub async fn bulk_archive_completed(
    State(state): State<AppState>,
    admin: AdminUser,
) -> AppResult<Json<BulkArchiveResponse>> {
    let mut conn = state.db()?;
    let archived = archival::bulk_archive_completed_requests(&mut conn, &admin.0.email)?;

    info!(count = archived, admin = %admin.0.email, "bulk-archived completed requests");

    Ok(Json(BulkArchiveResponse { archived }))
}
