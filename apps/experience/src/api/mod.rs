//! # Experience HTTP API Module
//!
//! This module implements the registration REST API using axum.
//!
//! ## Public Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /activities` - Full activity catalog
//! - `POST /eligibility` - Activities, lounge access and steps for a profile
//! - `POST /register` - Validate, finalize and store a registration
//! - `GET /registration/{id}` - Confirmation summary
//! - `GET /calendar/{activity_id}` - Calendar event, ICS and add-to-calendar links
//!
//! ## Admin Endpoints (Bearer admin key)
//!
//! - `GET /admin/registrations` - All registrations, newest first
//! - `GET /admin/registrations/{id}` - One registration
//! - `PUT /admin/registrations/{id}` - Replace a registration
//! - `DELETE /admin/registrations/{id}` - Delete a registration

mod auth;
mod handlers;
mod middleware;
mod types;

pub use auth::keys_match;
pub use middleware::{GlobalRateLimiter, create_rate_limiter};
pub use types::{
    ActivitiesResponse, ActivityJson, CalendarResponse, Confirmation, ConfirmationResponse,
    ConfirmedActivity, EligibilityResponse, ErrorResponse, HealthResponse, RecordResponse, RegisterResponse,
    RegistrationListResponse, check_text_lengths,
};

use crate::config::Config;
use crate::crm::{self, ContactSync};
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use experience_core::{ExperienceError, Registry};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state.
#[derive(Clone)]
pub struct AppState {
    /// The registration store.
    pub registry: Arc<RwLock<Registry>>,
    pub config: Arc<Config>,
    /// CRM destination for new registrations.
    pub crm: Arc<dyn ContactSync>,
    /// Admin key; `None` disables the admin routes.
    pub admin_key: Option<Arc<str>>,
}

impl AppState {
    /// State with default configuration and CRM sync disabled.
    #[must_use]
    pub fn new(registry: Registry) -> Self {
        Self::with_config(registry, Config::default())
    }

    /// State wired from `config`, including the CRM client.
    #[must_use]
    pub fn with_config(registry: Registry, config: Config) -> Self {
        let crm = crm::from_config(&config.crm);
        Self {
            registry: Arc::new(RwLock::new(registry)),
            admin_key: config.admin_key().map(Arc::from),
            config: Arc::new(config),
            crm,
        }
    }

    /// Replace the CRM destination.
    #[must_use]
    pub fn with_crm(mut self, crm: Arc<dyn ContactSync>) -> Self {
        self.crm = crm;
        self
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build the CORS layer from `[server] cors_origins`.
///
/// - `"*"`: allows all origins (development only)
/// - unset: localhost only
/// - otherwise: the comma-separated list of origins
fn build_cors_layer(origins: Option<&str>) -> CorsLayer {
    match origins.map(str::trim) {
        Some("*") => {
            tracing::warn!("CORS: Allowing ALL origins. This is insecure for production!");
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .filter_map(|s| match s.parse::<HeaderValue>() {
                    Ok(hv) => {
                        tracing::info!("CORS: Allowing origin: {}", s);
                        Some(hv)
                    }
                    Err(e) => {
                        tracing::warn!("CORS: Invalid origin '{}': {}", s, e);
                        None
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!("CORS: No valid origins configured, defaulting to localhost only");
                build_localhost_cors()
            } else {
                restricted_cors(allowed_origins)
            }
        }
        None => {
            tracing::info!("CORS: No origins configured, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .into_iter()
    .filter_map(|origin| origin.parse::<HeaderValue>().ok())
    .collect();
    restricted_cors(origins)
}

fn restricted_cors(origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing
/// 2. CORS
/// 3. Body limit
/// 4. Rate limiting (if enabled)
/// 5. Admin authentication (admin routes only)
pub fn create_router(state: AppState) -> Router {
    let config = Arc::clone(&state.config);
    let cors = build_cors_layer(config.server.cors_origins.as_deref());

    if state.admin_key.is_some() {
        tracing::info!("Admin API enabled");
    } else {
        tracing::warn!("Admin API disabled: set EXPERIENCE_ADMIN_KEY to enable it");
    }

    let admin = Router::new()
        .route("/admin/registrations", get(handlers::admin_list_handler))
        .route(
            "/admin/registrations/{id}",
            get(handlers::admin_get_handler)
                .put(handlers::admin_update_handler)
                .delete(handlers::admin_delete_handler),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth::admin_auth_middleware,
        ));

    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/activities", get(handlers::activities_handler))
        .route("/eligibility", post(handlers::eligibility_handler))
        .route("/register", post(handlers::register_handler))
        .route("/registration/{id}", get(handlers::confirmation_handler))
        .route("/calendar/{activity_id}", get(handlers::calendar_handler))
        .merge(admin);

    let rate_limit = config.limits.rate_limit;
    if rate_limit > 0 {
        tracing::info!("Rate limiting enabled: {} requests/second", rate_limit);
        router = router.layer(axum_middleware::from_fn_with_state(
            create_rate_limiter(rate_limit),
            middleware::rate_limit_middleware,
        ));
    } else {
        tracing::info!("Rate limiting disabled");
    }

    router
        .layer(axum::extract::DefaultBodyLimit::max(
            config.limits.body_limit_bytes,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server and run until Ctrl-C.
pub async fn run_server(registry: Registry, config: Config) -> Result<(), ExperienceError> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let router = create_router(AppState::with_config(registry, config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ExperienceError::Io(format!("Bind failed: {}", e)))?;

    tracing::info!("Registration server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ExperienceError::Io(format!("Server error: {}", e)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
