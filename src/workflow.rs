//! Status vocabulary and transition rules for document requests,
//! enrollments, and inquiries.
//!
//! The functions here are pure: they validate a requested target status
//! against the entity's vocabulary and report which coupled effects the
//! caller must apply alongside the status write. Role checks happen at the
//! REST boundary; no ordering between statuses is enforced, so a record can
//! move backward (e.g. `completed` back to `pending`).

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("invalid status '{value}': allowed values are {allowed}")]
    UnknownStatus { value: String, allowed: &'static str },
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

impl RequestStatus {
    pub const ALLOWED: &'static str = "pending, approved, rejected, completed";

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
            RequestStatus::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> WorkflowResult<Self> {
        match value {
            "pending" => Ok(RequestStatus::Pending),
            "approved" => Ok(RequestStatus::Approved),
            "rejected" => Ok(RequestStatus::Rejected),
            "completed" => Ok(RequestStatus::Completed),
            other => Err(WorkflowError::UnknownStatus {
                value: other.to_string(),
                allowed: Self::ALLOWED,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    Pending,
    Approved,
    Rejected,
}

impl EnrollmentStatus {
    pub const ALLOWED: &'static str = "pending, approved, rejected";

    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Pending => "pending",
            EnrollmentStatus::Approved => "approved",
            EnrollmentStatus::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> WorkflowResult<Self> {
        match value {
            "pending" => Ok(EnrollmentStatus::Pending),
            "approved" => Ok(EnrollmentStatus::Approved),
            "rejected" => Ok(EnrollmentStatus::Rejected),
            other => Err(WorkflowError::UnknownStatus {
                value: other.to_string(),
                allowed: Self::ALLOWED,
            }),
        }
    }
}

/// One canonical vocabulary shared by the store and every client. The
/// former UI-only values `in_progress` and `closed` are first-class here;
/// `closed` carries the same coupled effects as `resolved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InquiryStatus {
    Pending,
    InProgress,
    Resolved,
    Closed,
    Archived,
}

impl InquiryStatus {
    pub const ALLOWED: &'static str = "pending, in_progress, resolved, closed, archived";

    pub fn as_str(&self) -> &'static str {
        match self {
            InquiryStatus::Pending => "pending",
            InquiryStatus::InProgress => "in_progress",
            InquiryStatus::Resolved => "resolved",
            InquiryStatus::Closed => "closed",
            InquiryStatus::Archived => "archived",
        }
    }

    pub fn parse(value: &str) -> WorkflowResult<Self> {
        match value {
            "pending" => Ok(InquiryStatus::Pending),
            "in_progress" => Ok(InquiryStatus::InProgress),
            "resolved" => Ok(InquiryStatus::Resolved),
            "closed" => Ok(InquiryStatus::Closed),
            "archived" => Ok(InquiryStatus::Archived),
            other => Err(WorkflowError::UnknownStatus {
                value: other.to_string(),
                allowed: Self::ALLOWED,
            }),
        }
    }
}

/// Document requests have no coupled effects; the transition is the write.
pub fn request_transition(target: &str) -> WorkflowResult<RequestStatus> {
    RequestStatus::parse(target)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrollmentTransition {
    pub status: EnrollmentStatus,
    /// Approve and reject hand an email to the dispatcher. The write
    /// commits whether or not the notification ever leaves the queue.
    pub notify: bool,
}

pub fn enrollment_transition(target: &str) -> WorkflowResult<EnrollmentTransition> {
    let status = EnrollmentStatus::parse(target)?;
    let notify = matches!(
        status,
        EnrollmentStatus::Approved | EnrollmentStatus::Rejected
    );
    Ok(EnrollmentTransition { status, notify })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InquiryTransition {
    pub status: InquiryStatus,
    /// Stamp `resolved_at`/`resolved_by` if the inquiry has none yet.
    pub backfill_resolution: bool,
    /// Move the inquiry into the archived view in the same transaction.
    pub archive: bool,
}

pub fn inquiry_transition(target: &str) -> WorkflowResult<InquiryTransition> {
    let status = InquiryStatus::parse(target)?;
    let transition = match status {
        InquiryStatus::Pending | InquiryStatus::InProgress => InquiryTransition {
            status,
            backfill_resolution: false,
            archive: false,
        },
        InquiryStatus::Resolved | InquiryStatus::Closed => InquiryTransition {
            status,
            backfill_resolution: true,
            archive: true,
        },
        InquiryStatus::Archived => InquiryTransition {
            status,
            backfill_resolution: true,
            archive: true,
        },
    };
    Ok(transition)
}
