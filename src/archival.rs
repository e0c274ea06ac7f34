//! Archive, restore, and bulk-archive operations over the live/archived
//! partition of document requests and inquiries.
//!
//! Restoring keeps `archived_at`/`archived_by` in place so the last
//! archival stays auditable. Enrollments have no archival surface.

use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{DocumentRequest, Inquiry};
use crate::schema::{document_requests, inquiries};
use crate::workflow::RequestStatus;

#[derive(Debug, Error)]
pub enum ArchivalError {
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
}

pub type ArchivalResult<T> = Result<T, ArchivalError>;

pub fn archive_request(
    conn: &mut PgConnection,
    request_id: Uuid,
    actor: &str,
) -> ArchivalResult<DocumentRequest> {
    let existing: DocumentRequest = document_requests::table.find(request_id).first(conn)?;
    if existing.archived {
        // Idempotent: archiving an archived record keeps the original stamp.
        return Ok(existing);
    }

    let now = Utc::now().naive_utc();
    diesel::update(document_requests::table.find(request_id))
        .set((
            document_requests::archived.eq(true),
            document_requests::archived_at.eq(now),
            document_requests::archived_by.eq(actor),
            document_requests::updated_at.eq(now),
        ))
        .execute(conn)?;

    let updated = document_requests::table.find(request_id).first(conn)?;
    Ok(updated)
}

pub fn restore_request(
    conn: &mut PgConnection,
    request_id: Uuid,
) -> ArchivalResult<DocumentRequest> {
    let _existing: DocumentRequest = document_requests::table.find(request_id).first(conn)?;

    diesel::update(document_requests::table.find(request_id))
        .set((
            document_requests::archived.eq(false),
            document_requests::updated_at.eq(Utc::now().naive_utc()),
        ))
        .execute(conn)?;

    let updated = document_requests::table.find(request_id).first(conn)?;
    Ok(updated)
}

/// Archives every completed, still-live request in one statement and
/// returns the affected count. Postgres runs the single UPDATE atomically,
/// which also makes repeated sweeps monotonic: rows archived by an earlier
/// run no longer match the predicate.
pub fn bulk_archive_completed_requests(
    conn: &mut PgConnection,
    actor: &str,
) -> ArchivalResult<usize> {
    let now = Utc::now().naive_utc();
    let affected = diesel::update(
        document_requests::table
            .filter(document_requests::status.eq(RequestStatus::Completed.as_str()))
            .filter(document_requests::archived.eq(false)),
    )
    .set((
        document_requests::archived.eq(true),
        document_requests::archived_at.eq(now),
        document_requests::archived_by.eq(actor),
        document_requests::updated_at.eq(now),
    ))
    .execute(conn)?;

    Ok(affected)
}

pub fn archive_inquiry(
    conn: &mut PgConnection,
    inquiry_id: Uuid,
    actor: &str,
) -> ArchivalResult<Inquiry> {
    let existing: Inquiry = inquiries::table.find(inquiry_id).first(conn)?;
    if existing.archived {
        return Ok(existing);
    }

    let now = Utc::now().naive_utc();
    conn.transaction(|conn| {
        diesel::update(inquiries::table.find(inquiry_id))
            .set((
                inquiries::archived.eq(true),
                inquiries::archived_at.eq(now),
                inquiries::archived_by.eq(actor),
                inquiries::updated_at.eq(now),
            ))
            .execute(conn)?;

        // Archiving implies the thread is settled; stamp the resolution if
        // nobody did so explicitly.
        if existing.resolved_at.is_none() {
            diesel::update(inquiries::table.find(inquiry_id))
                .set((
                    inquiries::resolved_at.eq(now),
                    inquiries::resolved_by.eq(actor),
                ))
                .execute(conn)?;
        }

        inquiries::table.find(inquiry_id).first(conn)
    })
    .map_err(ArchivalError::from)
}

pub fn restore_inquiry(conn: &mut PgConnection, inquiry_id: Uuid) -> ArchivalResult<Inquiry> {
    let _existing: Inquiry = inquiries::table.find(inquiry_id).first(conn)?;

    diesel::update(inquiries::table.find(inquiry_id))
        .set((
            inquiries::archived.eq(false),
            inquiries::updated_at.eq(Utc::now().naive_utc()),
        ))
        .execute(conn)?;

    let updated = inquiries::table.find(inquiry_id).first(conn)?;
    Ok(updated)
}
