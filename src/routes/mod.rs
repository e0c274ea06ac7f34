use axum::http::HeaderValue;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::{
    auth::{AdminUser, AuthenticatedUser},
    state::AppState,
};

pub mod auth;
pub mod documents;
pub mod enrollments;
pub mod health;
pub mod inquiries;

pub fn create_router(state: AppState) -> Router<()> {
    let cors = if let Some(origins) = state.config.cors_allowed_origin.as_ref() {
        let headers: Vec<HeaderValue> = origins
            .split(',')
            .filter_map(|value| {
                let trimmed = value.trim();
                (!trimmed.is_empty()).then(|| {
                    trimmed
                        .parse::<HeaderValue>()
                        .expect("invalid CORS allowed origin")
                })
            })
            .collect();

        let allow_origin = AllowOrigin::list(headers);

        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods(tower_http::cors::AllowMethods::mirror_request())
            .allow_headers(tower_http::cors::AllowHeaders::mirror_request())
            .allow_credentials(true)
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods(tower_http::cors::AllowMethods::mirror_request())
            .allow_headers(tower_http::cors::AllowHeaders::mirror_request())
            .allow_credentials(true)
    };

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me));

    let student_documents = Router::new()
        .route("/request", post(documents::create_request))
        .route("/my-requests", get(documents::my_requests));

    let student_inquiries = Router::new()
        .route("/", post(inquiries::create_inquiry))
        .route("/my", get(inquiries::my_inquiries));

    let student_state = state.clone();
    let student_routes = Router::new()
        .nest("/api/documents", student_documents)
        .nest("/api/inquiries", student_inquiries)
        .route("/api/enrollments/my", get(enrollments::my_enrollments))
        .layer(middleware::from_extractor_with_state::<AuthenticatedUser, _>(student_state));

    let admin_documents = Router::new()
        .route("/requests", get(documents::list_requests))
        .route(
            "/archived-requests",
            get(documents::list_archived_requests),
        )
        .route(
            "/request/:id/status",
            patch(documents::update_request_status),
        )
        .route("/request/:id/archive", patch(documents::archive_request))
        .route("/request/:id/restore", patch(documents::restore_request))
        .route(
            "/bulk-archive-completed",
            post(documents::bulk_archive_completed),
        );

    let admin_enrollments = Router::new()
        .route("/", get(enrollments::list_enrollments))
        .route("/:id/status", put(enrollments::update_enrollment_status));

    let admin_inquiries = Router::new()
        .route("/", get(inquiries::list_inquiries))
        .route("/archived", get(inquiries::list_archived_inquiries))
        .route("/:id", delete(inquiries::delete_inquiry))
        .route("/:id/status", patch(inquiries::update_inquiry_status))
        .route("/:id/reply", post(inquiries::add_reply))
        .route("/:id/archive", patch(inquiries::archive_inquiry))
        .route("/:id/restore", patch(inquiries::restore_inquiry));

    let admin_state = state.clone();
    let admin_routes = Router::new()
        .nest("/api/admin/documents", admin_documents)
        .nest("/api/admin/enrollments", admin_enrollments)
        .nest("/api/admin/inquiries", admin_inquiries)
        .layer(middleware::from_extractor_with_state::<AdminUser, _>(admin_state));

    Router::new()
        .merge(student_routes)
        .merge(admin_routes)
        // Enrollment submission is open to anonymous applicants; the
        // handler picks up the owning user when a bearer token is present.
        .route("/api/enrollments", post(enrollments::create_enrollment))
        .nest("/api/auth", auth_routes)
        .route("/api/health", get(health::health_check))
        .with_state(state)
        .layer(cors)
        .layer(DefaultBodyLimit::max(1024 * 1024 * 32))
}
