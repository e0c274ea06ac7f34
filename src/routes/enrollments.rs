use axum::extract::{Json, Multipart, Path, State};
use axum::http::StatusCode;
use chrono::{Datelike, Utc};
use diesel::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use super::documents::to_iso;
use crate::auth::{AdminUser, AuthenticatedUser};
use crate::error::{AppError, AppResult};
use crate::models::{Enrollment, NewEnrollment};
use crate::notify::StatusEmail;
use crate::schema::enrollments;
use crate::state::AppState;
use crate::workflow::{self, EnrollmentStatus};

const ENROLLMENT_NUMBER_ATTEMPTS: usize = 5;

/// The six attachment slots an application may carry, keyed by multipart
/// field name.
const ATTACHMENT_FIELDS: &[&str] = &[
    "form137",
    "form138",
    "birth_certificate",
    "good_moral",
    "id_photo",
    "other_document",
];

#[derive(Deserialize)]
pub struct UpdateStatusPayload {
    pub status: String,
    pub review_notes: Option<String>,
}

#[derive(Serialize)]
pub struct EnrollmentResponse {
    pub id: Uuid,
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
    pub reviewed_at: Option<String>,
    pub review_notes: Option<String>,
    pub created_at: String,
}

impl From<Enrollment> for EnrollmentResponse {
    fn from(record: Enrollment) -> Self {
        Self {
            id: record.id,
            enrollment_number: record.enrollment_number,
            first_name: record.first_name,
            middle_name: record.middle_name,
            last_name: record.last_name,
            birth_date: record.birth_date,
            gender: record.gender,
            address: record.address,
            contact_number: record.contact_number,
            email: record.email,
            guardian_name: record.guardian_name,
            guardian_contact: record.guardian_contact,
            guardian_relationship: record.guardian_relationship,
            grade_level: record.grade_level,
            school_year: record.school_year,
            previous_school: record.previous_school,
            lrn: record.lrn,
            form137_path: record.form137_path,
            form138_path: record.form138_path,
            birth_certificate_path: record.birth_certificate_path,
            good_moral_path: record.good_moral_path,
            id_photo_path: record.id_photo_path,
            other_document_path: record.other_document_path,
            status: record.status,
            reviewed_at: record.reviewed_at.map(to_iso),
            review_notes: record.review_notes,
            created_at: to_iso(record.created_at),
        }
    }
}

#[derive(Default)]
struct EnrollmentForm {
    first_name: Option<String>,
    middle_name: Option<String>,
    last_name: Option<String>,
    birth_date: Option<String>,
    gender: Option<String>,
    address: Option<String>,
    contact_number: Option<String>,
    email: Option<String>,
    guardian_name: Option<String>,
    guardian_contact: Option<String>,
    guardian_relationship: Option<String>,
    grade_level: Option<String>,
    school_year: Option<String>,
    previous_school: Option<String>,
    lrn: Option<String>,
    attachments: Vec<AttachmentUpload>,
}

struct AttachmentUpload {
    field: &'static str,
    filename: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

fn require(value: Option<String>, field: &str) -> AppResult<String> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    value.ok_or_else(|| AppError::bad_request(format!("{field} is required")))
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub async fn create_enrollment(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<EnrollmentResponse>)> {
    let mut form = EnrollmentForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|err| {
        error!(error = %err, "invalid multipart data");
        AppError::bad_request(format!("invalid multipart data: {err}"))
    })? {
        let name = field.name().map(|n| n.to_string());
        let Some(name) = name else { continue };

        if let Some(&slot) = ATTACHMENT_FIELDS.iter().find(|f| **f == name) {
            let filename = field
                .file_name()
                .map(|n| n.to_string())
                .unwrap_or_else(|| slot.to_string());
            let content_type = field.content_type().map(|mime| mime.to_string());
            let bytes = field.bytes().await.map_err(|err| {
                error!(error = %err, field = %slot, "failed to read attachment bytes");
                AppError::bad_request(format!("failed to read {slot}: {err}"))
            })?;
            if bytes.is_empty() {
                continue;
            }
            form.attachments.push(AttachmentUpload {
                field: slot,
                filename,
                content_type,
                bytes: bytes.to_vec(),
            });
            continue;
        }

        let value = field.text().await.map_err(|err| {
            error!(error = %err, field = %name, "invalid multipart field");
            AppError::bad_request(format!("invalid value for {name}: {err}"))
        })?;

        match name.as_str() {
            "first_name" => form.first_name = Some(value),
            "middle_name" => form.middle_name = Some(value),
            "last_name" => form.last_name = Some(value),
            "birth_date" => form.birth_date = Some(value),
            "gender" => form.gender = Some(value),
            "address" => form.address = Some(value),
            "contact_number" => form.contact_number = Some(value),
            "email" => form.email = Some(value),
            "guardian_name" => form.guardian_name = Some(value),
            "guardian_contact" => form.guardian_contact = Some(value),
            "guardian_relationship" => form.guardian_relationship = Some(value),
            "grade_level" => form.grade_level = Some(value),
            "school_year" => form.school_year = Some(value),
            "previous_school" => form.previous_school = Some(value),
            "lrn" => form.lrn = Some(value),
            _ => {}
        }
    }

    // Validate the form before any attachment lands in storage.
    let first_name = require(form.first_name.take(), "first_name")?;
    let last_name = require(form.last_name.take(), "last_name")?;
    let birth_date = require(form.birth_date.take(), "birth_date")?;
    let gender = require(form.gender.take(), "gender")?;
    let address = require(form.address.take(), "address")?;
    let contact_number = require(form.contact_number.take(), "contact_number")?;
    let email = require(form.email.take(), "email")?;
    let guardian_name = require(form.guardian_name.take(), "guardian_name")?;
    let guardian_contact = require(form.guardian_contact.take(), "guardian_contact")?;
    let guardian_relationship = require(form.guardian_relationship.take(), "guardian_relationship")?;
    let grade_level = require(form.grade_level.take(), "grade_level")?;
    let school_year = require(form.school_year.take(), "school_year")?;
    let middle_name = optional(form.middle_name.take());
    let previous_school = optional(form.previous_school.take());
    let lrn = optional(form.lrn.take());

    let enrollment_id = Uuid::new_v4();
    let mut paths: [Option<String>; 6] = Default::default();

    for upload in &form.attachments {
        let key = format!(
            "enrollments/{}/{}-{}",
            enrollment_id, upload.field, upload.filename
        );
        state
            .storage
            .put_object(&key, upload.bytes.clone(), upload.content_type.clone())
            .await?;

        let slot = ATTACHMENT_FIELDS
            .iter()
            .position(|f| *f == upload.field)
            .expect("attachment field is always a known slot");
        paths[slot] = Some(key);
    }

    let [form137_path, form138_path, birth_certificate_path, good_moral_path, id_photo_path, other_document_path] =
        paths;

    let mut conn = state.db()?;
    let mut record: Option<Enrollment> = None;

    for attempt in 0..ENROLLMENT_NUMBER_ATTEMPTS {
        let new_enrollment = NewEnrollment {
            id: enrollment_id,
            user_id: user.as_ref().map(|u| u.user_id),
            enrollment_number: generate_enrollment_number(),
            first_name: first_name.clone(),
            middle_name: middle_name.clone(),
            last_name: last_name.clone(),
            birth_date: birth_date.clone(),
            gender: gender.clone(),
            address: address.clone(),
            contact_number: contact_number.clone(),
            email: email.clone(),
            guardian_name: guardian_name.clone(),
            guardian_contact: guardian_contact.clone(),
            guardian_relationship: guardian_relationship.clone(),
            grade_level: grade_level.clone(),
            school_year: school_year.clone(),
            previous_school: previous_school.clone(),
            lrn: lrn.clone(),
            form137_path: form137_path.clone(),
            form138_path: form138_path.clone(),
            birth_certificate_path: birth_certificate_path.clone(),
            good_moral_path: good_moral_path.clone(),
            id_photo_path: id_photo_path.clone(),
            other_document_path: other_document_path.clone(),
            status: EnrollmentStatus::Pending.as_str().to_string(),
        };

        match diesel::insert_into(enrollments::table)
            .values(&new_enrollment)
            .execute(&mut conn)
        {
            Ok(_) => {
                record = Some(enrollments::table.find(enrollment_id).first(&mut conn)?);
                break;
            }
            Err(diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            )) if attempt + 1 < ENROLLMENT_NUMBER_ATTEMPTS => {
                // Enrollment-number collision; roll a new one.
                continue;
            }
            Err(err) => return Err(AppError::from(err)),
        }
    }

    let record = record.ok_or_else(|| {
        AppError::internal("could not allocate a unique enrollment number")
    })?;

    info!(
        enrollment_id = %record.id,
        enrollment_number = %record.enrollment_number,
        attachments = form.attachments.len(),
        anonymous = user.is_none(),
        "enrollment application submitted"
    );

    Ok((StatusCode::CREATED, Json(EnrollmentResponse::from(record))))
}

pub async fn my_enrollments(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<Vec<EnrollmentResponse>>> {
    let mut conn = state.db()?;

    let records: Vec<Enrollment> = enrollments::table
        .filter(enrollments::user_id.eq(user.user_id))
        .order(enrollments::created_at.desc())
        .load(&mut conn)?;

    Ok(Json(records.into_iter().map(Into::into).collect()))
}

pub async fn list_enrollments(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<Json<Vec<EnrollmentResponse>>> {
    let mut conn = state.db()?;

    let records: Vec<Enrollment> = enrollments::table
        .order(enrollments::created_at.desc())
        .load(&mut conn)?;

    Ok(Json(records.into_iter().map(Into::into).collect()))
}

pub async fn update_enrollment_status(
    State(state): State<AppState>,
    Path(enrollment_id): Path<Uuid>,
    admin: AdminUser,
    Json(payload): Json<UpdateStatusPayload>,
) -> AppResult<Json<EnrollmentResponse>> {
    let transition = workflow::enrollment_transition(&payload.status)?;

    let mut conn = state.db()?;
    let _existing: Enrollment = enrollments::table.find(enrollment_id).first(&mut conn)?;

    let now = Utc::now().naive_utc();
    diesel::update(enrollments::table.find(enrollment_id))
        .set((
            enrollments::status.eq(transition.status.as_str()),
            enrollments::reviewed_by.eq(admin.0.user_id),
            enrollments::reviewed_at.eq(now),
            enrollments::review_notes.eq(payload.review_notes.as_deref()),
            enrollments::updated_at.eq(now),
        ))
        .execute(&mut conn)?;

    let updated: Enrollment = enrollments::table.find(enrollment_id).first(&mut conn)?;

    info!(
        enrollment_id = %updated.id,
        enrollment_number = %updated.enrollment_number,
        status = %updated.status,
        admin = %admin.0.email,
        "enrollment status updated"
    );

    // The write above is already committed; delivery is best-effort and a
    // failure never surfaces to the caller.
    if transition.notify {
        state.notifier.dispatch(status_email(&state, &updated));
    }

    Ok(Json(EnrollmentResponse::from(updated)))
}

fn status_email(state: &AppState, enrollment: &Enrollment) -> StatusEmail {
    let body = match enrollment.review_notes.as_deref() {
        Some(notes) => format!(
            "Your enrollment application {} has been {}.\n\nRegistrar notes: {}",
            enrollment.enrollment_number, enrollment.status, notes
        ),
        None => format!(
            "Your enrollment application {} has been {}.",
            enrollment.enrollment_number, enrollment.status
        ),
    };

    StatusEmail {
        to: enrollment.email.clone(),
        from: state.config.notification_sender.clone(),
        subject: format!(
            "Enrollment {} {}",
            enrollment.enrollment_number, enrollment.status
        ),
        body,
    }
}

fn generate_enrollment_number() -> String {
    let serial: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("ENR-{}-{:06}", Utc::now().year(), serial)
}
