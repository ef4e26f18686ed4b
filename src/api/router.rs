//! Clinic API router.
//!
//! Returns a composable `Router` with every route nested under `/api/`.
//!
//! Middleware stack (outermost → innermost):
//! 1. Extension(ApiContext) → 2. Cache-Control → 3. Session validator → 4. Audit logger

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue};
use axum::routing::{get, post};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Headroom for multipart framing on top of the file limit.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Build the clinic API router.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost layer).
/// Endpoint handlers use `State<ApiContext>` (provided via `with_state`).
pub fn api_router(core: Arc<CoreState>) -> Router {
    let ctx = ApiContext::new(core);

    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let protected = Router::new()
        .route("/auth/logout", post(endpoints::auth::logout))
        .route("/auth/me", get(endpoints::auth::me))
        .route(
            "/users",
            post(endpoints::users::create).get(endpoints::users::list),
        )
        .route("/dashboard", get(endpoints::dashboard::overview))
        .route(
            "/patients",
            post(endpoints::patients::create).get(endpoints::patients::list),
        )
        .route("/patients/:id", get(endpoints::patients::detail))
        .route("/patients/:id/select", post(endpoints::patients::select))
        .route("/patients/:id/history", get(endpoints::patients::history))
        .route(
            "/patients/:id/files",
            post(endpoints::files::upload)
                .get(endpoints::files::list)
                .layer(DefaultBodyLimit::max(
                    endpoints::files::MAX_UPLOAD_BYTES + MULTIPART_OVERHEAD,
                )),
        )
        .route("/patients/:id/files/:name", get(endpoints::files::download))
        .route(
            "/patients/:id/contact-lenses",
            get(endpoints::contact_lenses::list_for_patient),
        )
        .route("/contact-lenses", post(endpoints::contact_lenses::create))
        .route("/exam", get(endpoints::exam::status))
        .route("/exam/start", post(endpoints::exam::start))
        .route("/exam/medical-history", post(endpoints::exam::medical_history))
        .route("/exam/refraction", post(endpoints::exam::refraction))
        .route("/exam/functional-tests", post(endpoints::exam::functional_tests))
        .route("/exam/anterior-segment", post(endpoints::exam::anterior_segment))
        .route("/exam/fundus", post(endpoints::exam::fundus))
        .route("/exam/groups", post(endpoints::exam::groups))
        .route("/exam/report", get(endpoints::exam::report_view))
        .route("/exam/report.pdf", get(endpoints::exam::report_pdf))
        .route("/exam/finish", post(endpoints::exam::finish))
        .route(
            "/appointments",
            post(endpoints::appointments::create).get(endpoints::appointments::list),
        )
        .route("/appointments/slots", get(endpoints::appointments::slots))
        .route(
            "/appointments/:id/status",
            post(endpoints::appointments::set_status),
        )
        .route("/working-hours", get(endpoints::working_hours::list))
        .with_state(ctx.clone())
        // Middleware stack (innermost first, outermost last):
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::middleware::from_fn(middleware::auth::require_session))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        // Extension must be outermost so middleware can extract ApiContext
        .layer(axum::Extension(ctx.clone()));

    // Unprotected routes (no session required)
    let unprotected = Router::new()
        .route("/auth/login", post(endpoints::auth::login))
        .route("/health", get(endpoints::health::check))
        .with_state(ctx.clone())
        .layer(axum::Extension(ctx));

    Router::new()
        .nest("/api", protected)
        .nest("/api", unprotected)
}
