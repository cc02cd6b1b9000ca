use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use domain::services::{ApprovalGate, ExpirySweep, Mailer};
use persistence::repositories::StudentRepository;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::jobs::expiry_sweep;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, require_admin,
    security_headers_middleware, trace_id, RateLimiterState,
};
use crate::routes::{
    admin_applications, admin_jobs, admin_popups, admin_programs, admin_students, applications,
    health, programs, student_popups, students,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub mailer: Arc<dyn Mailer>,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
}

impl AppState {
    pub fn new(config: Config, pool: PgPool, mailer: Arc<dyn Mailer>) -> Self {
        let rate_limiter = RateLimiterState::new(config.security.rate_limit_per_minute).map(Arc::new);
        Self {
            pool,
            config: Arc::new(config),
            mailer,
            rate_limiter,
        }
    }

    pub fn approval_gate(&self) -> ApprovalGate {
        ApprovalGate::new(
            Arc::new(StudentRepository::new(self.pool.clone())),
            self.mailer.clone(),
        )
    }

    pub fn expiry_sweep(&self) -> ExpirySweep {
        expiry_sweep(&self.pool, self.mailer.clone(), self.config.expiry.thresholds())
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        // Development: any origin
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

pub fn create_app(config: Config, pool: PgPool, mailer: Arc<dyn Mailer>) -> Router {
    let state = AppState::new(config, pool, mailer);
    let config = state.config.clone();

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler))
        .route("/api/v1/programs", get(programs::list_programs));

    // Credential endpoints, rate limited per client
    let credential_routes = Router::new()
        .route("/api/v1/students/register", post(students::register))
        .route("/api/v1/students/login", post(students::login))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    // Student routes resolve the caller through the StudentAuth extractor
    let student_routes = Router::new()
        .route("/api/v1/student/popups", get(student_popups::list_popups))
        .route(
            "/api/v1/student/popups/:popup_id/mark-viewed",
            post(student_popups::mark_viewed),
        )
        .route(
            "/api/v1/student/applications",
            get(applications::list_my_applications).post(applications::create_application),
        )
        .route(
            "/api/v1/student/applications/:id/mark-remarks-viewed",
            post(applications::mark_remarks_viewed),
        );

    let admin_routes = Router::new()
        .route("/api/v1/admin/students", get(admin_students::list_students))
        .route(
            "/api/v1/admin/students/:id/approve",
            post(admin_students::approve_student),
        )
        .route(
            "/api/v1/admin/students/:id/reject",
            post(admin_students::reject_student),
        )
        .route(
            "/api/v1/admin/students/:id/status",
            post(admin_students::set_student_status),
        )
        .route(
            "/api/v1/admin/account-expiry/run",
            post(admin_jobs::run_account_expiry_now),
        )
        .route(
            "/api/v1/admin/popups",
            get(admin_popups::list_popups).post(admin_popups::create_popup),
        )
        .route(
            "/api/v1/admin/popups/:id",
            get(admin_popups::get_popup)
                .put(admin_popups::update_popup)
                .delete(admin_popups::delete_popup),
        )
        .route(
            "/api/v1/admin/popups/:id/toggle",
            post(admin_popups::toggle_popup),
        )
        .route("/api/v1/admin/programs", post(admin_programs::create_program))
        .route(
            "/api/v1/admin/programs/:id",
            put(admin_programs::update_program).delete(admin_programs::delete_program),
        )
        .route(
            "/api/v1/admin/applications",
            get(admin_applications::list_applications),
        )
        .route(
            "/api/v1/admin/applications/:id/approve",
            post(admin_applications::approve_application),
        )
        .route(
            "/api/v1/admin/applications/:id/reject",
            post(admin_applications::reject_application),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .merge(public_routes)
        .merge(credential_routes)
        .merge(student_routes)
        .merge(admin_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors_layer(&config.security.cors_origins))
        .with_state(state)
}
