use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use domain::services::RsvpNotifier;
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
use crate::middleware::{
    metrics_handler, metrics_middleware, security_headers_middleware, trace_id, KeyedRateLimiter,
};
use crate::routes::{admin, health, rsvp};
use crate::services::EmailNotifier;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub notifier: Arc<dyn RsvpNotifier>,
    /// `None` when RSVP rate limiting is disabled.
    pub rsvp_limiter: Option<Arc<KeyedRateLimiter>>,
    pub login_limiter: Option<Arc<KeyedRateLimiter>>,
}

impl AppState {
    pub fn new(config: Config, pool: PgPool, notifier: Arc<dyn RsvpNotifier>) -> Self {
        let security = &config.security;
        let rsvp_limiter =
            KeyedRateLimiter::new(security.rsvp_max_attempts, security.rsvp_window_secs)
                .map(Arc::new);
        let login_limiter =
            KeyedRateLimiter::new(security.login_max_attempts, security.login_window_secs)
                .map(Arc::new);

        Self {
            pool,
            config: Arc::new(config),
            notifier,
            rsvp_limiter,
            login_limiter,
        }
    }

    /// Limiters that are enabled, for the pruning job.
    pub fn limiters(&self) -> Vec<Arc<KeyedRateLimiter>> {
        self.rsvp_limiter
            .iter()
            .chain(self.login_limiter.iter())
            .cloned()
            .collect()
    }
}

/// Builds the router with the email notifier from configuration.
pub fn create_app(config: Config, pool: PgPool) -> Router {
    let notifier = Arc::new(EmailNotifier::new(config.notification.clone()));
    router(AppState::new(config, pool, notifier))
}

/// Builds the router around a caller-supplied notifier.
pub fn create_app_with_notifier(
    config: Config,
    pool: PgPool,
    notifier: Arc<dyn RsvpNotifier>,
) -> Router {
    router(AppState::new(config, pool, notifier))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

pub fn router(state: AppState) -> Router {
    let config = state.config.clone();

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    let rsvp_routes = Router::new().route(
        "/api/v1/rsvp/:code",
        get(rsvp::get_invitation).post(rsvp::submit_rsvp),
    );

    // Session checks happen in the AdminAuth extractor
    let admin_routes = Router::new()
        .route("/api/v1/admin/auth", post(admin::login))
        .route("/api/v1/admin/logout", post(admin::logout))
        .route("/api/v1/admin/invitations", get(admin::list_invitations))
        .route(
            "/api/v1/admin/invitations/:id",
            patch(admin::update_invitation),
        );

    Router::new()
        .merge(public_routes)
        .merge(rsvp_routes)
        .merge(admin_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn(security_headers_middleware))
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
