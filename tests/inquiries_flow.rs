mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{acquire_db_lock, body_to_vec, TestApp};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

#[derive(Deserialize)]
struct ReplyInfo {
    id: Uuid,
    message: String,
    replied_by: String,
    date: String,
}

#[derive(Deserialize)]
struct InquiryInfo {
    id: Uuid,
    #[allow(dead_code)]
    message: String,
    status: String,
    resolved_at: Option<String>,
    resolved_by: Option<String>,
    archived: bool,
    archived_at: Option<String>,
    archived_by: Option<String>,
    replies: Vec<ReplyInfo>,
}

struct Actors {
    student: String,
    admin: String,
}

async fn setup_actors(app: &TestApp, tag: &str) -> Result<Actors> {
    let student_email = format!("student-{tag}@students.test");
    let admin_email = format!("admin-{tag}@registrar.test");
    app.insert_user(&student_email, "studpass", "Test Student", "student")
        .await?;
    app.insert_user(&admin_email, "adminpass", "Test Admin", "admin")
        .await?;
    Ok(Actors {
        student: app.login_token(&student_email, "studpass").await?,
        admin: app.login_token(&admin_email, "adminpass").await?,
    })
}

async fn create_inquiry(app: &TestApp, token: &str, message: &str) -> Result<InquiryInfo> {
    let response = app
        .post_json("/api/inquiries", &json!({ "message": message }), Some(token))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_to_vec(response.into_body()).await?;
    Ok(serde_json::from_slice(&body)?)
}

#[tokio::test]
async fn reply_thread_is_append_only() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;
    let actors = setup_actors(&app, "thread").await?;

    let inquiry = create_inquiry(&app, &actors.student, "When can I claim my Form 137?").await?;

    let mut snapshots: Vec<Vec<ReplyInfo>> = Vec::new();
    for (index, text) in ["We are processing it.", "Ready next week.", "Ready for pickup."]
        .iter()
        .enumerate()
    {
        let response = app
            .post_json(
                &format!("/api/admin/inquiries/{}/reply", inquiry.id),
                &json!({ "message": text, "replied_by": "Registrar's Office" }),
                Some(&actors.admin),
            )
            .await?;
        assert_eq!(response.status(), StatusCode::CREATED);
        let updated: InquiryInfo =
            serde_json::from_slice(&body_to_vec(response.into_body()).await?)?;
        assert_eq!(updated.replies.len(), index + 1);
        snapshots.push(updated.replies);
    }

    // Every earlier reply survives each append untouched, in call order.
    let last = snapshots.last().unwrap();
    assert_eq!(last[0].message, "We are processing it.");
    assert_eq!(last[1].message, "Ready next week.");
    assert_eq!(last[2].message, "Ready for pickup.");
    for earlier in &snapshots[..snapshots.len() - 1] {
        for (a, b) in earlier.iter().zip(last.iter()) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.message, b.message);
            assert_eq!(a.replied_by, b.replied_by);
            assert_eq!(a.date, b.date);
        }
    }

    // Replying never moves the status; resolution is a separate call.
    let listed = app.get("/api/inquiries/my", Some(&actors.student)).await?;
    let listed: Vec<InquiryInfo> = serde_json::from_slice(&body_to_vec(listed.into_body()).await?)?;
    assert_eq!(listed[0].status, "pending");

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn empty_or_oversized_replies_are_rejected() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;
    let actors = setup_actors(&app, "validation").await?;

    let inquiry = create_inquiry(&app, &actors.student, "Is the office open Saturday?").await?;

    let response = app
        .post_json(
            &format!("/api/admin/inquiries/{}/reply", inquiry.id),
            &json!({ "message": "   " }),
            Some(&actors.admin),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let oversized = "x".repeat(10_001);
    let response = app
        .post_json(
            &format!("/api/admin/inquiries/{}/reply", inquiry.id),
            &json!({ "message": oversized }),
            Some(&actors.admin),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn resolving_archives_and_stamps_in_one_step() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;
    let actors = setup_actors(&app, "resolve").await?;

    let inquiry = create_inquiry(&app, &actors.student, "Lost my report card.").await?;

    let response = app
        .patch_json(
            &format!("/api/admin/inquiries/{}/status", inquiry.id),
            &json!({ "status": "resolved", "resolved_by": "Ms. Dela Cruz" }),
            Some(&actors.admin),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let resolved: InquiryInfo = serde_json::from_slice(&body_to_vec(response.into_body()).await?)?;

    assert_eq!(resolved.status, "resolved");
    assert!(resolved.resolved_at.is_some());
    assert_eq!(resolved.resolved_by.as_deref(), Some("Ms. Dela Cruz"));
    assert!(resolved.archived, "resolution must archive in the same step");
    assert!(resolved.archived_at.is_some());

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn closing_behaves_like_resolving() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;
    let actors = setup_actors(&app, "close").await?;

    let inquiry = create_inquiry(&app, &actors.student, "Wrong name on my diploma.").await?;

    let response = app
        .patch_json(
            &format!("/api/admin/inquiries/{}/status", inquiry.id),
            &json!({ "status": "closed" }),
            Some(&actors.admin),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let closed: InquiryInfo = serde_json::from_slice(&body_to_vec(response.into_body()).await?)?;

    assert_eq!(closed.status, "closed");
    assert!(closed.resolved_at.is_some());
    assert!(closed.archived);

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn direct_archive_backfills_resolution() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;
    let actors = setup_actors(&app, "archive").await?;

    let inquiry = create_inquiry(&app, &actors.student, "Do you keep SF9 copies?").await?;

    let response = app
        .patch_json(
            &format!("/api/admin/inquiries/{}/archive", inquiry.id),
            &json!({}),
            Some(&actors.admin),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let archived: InquiryInfo = serde_json::from_slice(&body_to_vec(response.into_body()).await?)?;

    assert!(archived.archived);
    assert!(
        archived.resolved_at.is_some(),
        "archiving must leave resolved_at non-null"
    );

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn restore_preserves_the_archival_stamp() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;
    let actors = setup_actors(&app, "restore").await?;

    let inquiry = create_inquiry(&app, &actors.student, "Requesting a records review.").await?;

    let response = app
        .patch_json(
            &format!("/api/admin/inquiries/{}/archive", inquiry.id),
            &json!({}),
            Some(&actors.admin),
        )
        .await?;
    let archived: InquiryInfo = serde_json::from_slice(&body_to_vec(response.into_body()).await?)?;
    let stamp = archived.archived_at.clone().expect("archived_at set");
    let actor = archived.archived_by.clone().expect("archived_by set");

    // Archiving twice is a no-op success that keeps the original stamp.
    let response = app
        .patch_json(
            &format!("/api/admin/inquiries/{}/archive", inquiry.id),
            &json!({}),
            Some(&actors.admin),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let again: InquiryInfo = serde_json::from_slice(&body_to_vec(response.into_body()).await?)?;
    assert_eq!(again.archived_at, Some(stamp.clone()));

    let response = app
        .patch_json(
            &format!("/api/admin/inquiries/{}/restore", inquiry.id),
            &json!({}),
            Some(&actors.admin),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let restored: InquiryInfo = serde_json::from_slice(&body_to_vec(response.into_body()).await?)?;

    assert!(!restored.archived);
    assert_eq!(restored.archived_at, Some(stamp));
    assert_eq!(restored.archived_by, Some(actor));

    // Back in the live admin view, gone from the archived one.
    let live = app.get("/api/admin/inquiries", Some(&actors.admin)).await?;
    let live: Vec<InquiryInfo> = serde_json::from_slice(&body_to_vec(live.into_body()).await?)?;
    assert!(live.iter().any(|i| i.id == inquiry.id));

    let shelved = app
        .get("/api/admin/inquiries/archived", Some(&actors.admin))
        .await?;
    let shelved: Vec<InquiryInfo> =
        serde_json::from_slice(&body_to_vec(shelved.into_body()).await?)?;
    assert!(shelved.iter().all(|i| i.id != inquiry.id));

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn unknown_inquiry_status_is_rejected() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;
    let actors = setup_actors(&app, "vocabulary").await?;

    let inquiry = create_inquiry(&app, &actors.student, "Transfer credentials?").await?;

    // The old admin UI used to send `completed`; the canonical vocabulary
    // rejects it along with camelCase spellings.
    for value in ["completed", "inProgress", "done"] {
        let response = app
            .patch_json(
                &format!("/api/admin/inquiries/{}/status", inquiry.id),
                &json!({ "status": value }),
                Some(&actors.admin),
            )
            .await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{value}");
    }

    let listed = app.get("/api/inquiries/my", Some(&actors.student)).await?;
    let listed: Vec<InquiryInfo> = serde_json::from_slice(&body_to_vec(listed.into_body()).await?)?;
    assert_eq!(listed[0].status, "pending");

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn deleting_an_inquiry_removes_the_thread() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;
    let actors = setup_actors(&app, "delete").await?;

    let inquiry = create_inquiry(&app, &actors.student, "Please remove my inquiry.").await?;
    let response = app
        .post_json(
            &format!("/api/admin/inquiries/{}/reply", inquiry.id),
            &json!({ "message": "Noted." }),
            Some(&actors.admin),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .delete(
            &format!("/api/admin/inquiries/{}", inquiry.id),
            Some(&actors.admin),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .delete(
            &format!("/api/admin/inquiries/{}", inquiry.id),
            Some(&actors.admin),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let listed = app.get("/api/inquiries/my", Some(&actors.student)).await?;
    let listed: Vec<InquiryInfo> = serde_json::from_slice(&body_to_vec(listed.into_body()).await?)?;
    assert!(listed.is_empty());

    app.cleanup().await?;
    Ok(())
}
