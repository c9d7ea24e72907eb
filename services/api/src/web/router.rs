//! services/api/src/web/router.rs
//!
//! The routing table. Built once at startup and never mutated afterwards.

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method, StatusCode,
    },
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::ConfigError;
use crate::error::ApiError;
use crate::web::{
    auth::login_handler,
    documents::{
        delete_document_handler, get_document_handler, list_documents_handler,
        upload_document_handler,
    },
    health::health_handler,
    insights::{document_insight_handler, patient_insights_handler},
    middleware::require_auth,
    rest::ApiDoc,
    state::AppState,
};

pub fn build_router(state: Arc<AppState>) -> Result<Router, ApiError> {
    let origin = HeaderValue::from_str(&state.config.cors_origin).map_err(|e| {
        ConfigError::InvalidValue("CORS_ORIGIN".to_string(), e.to_string())
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/healthz", get(health_handler))
        .route("/login", post(login_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route(
            "/documents",
            post(upload_document_handler).get(list_documents_handler),
        )
        .route(
            "/documents/{id}",
            get(get_document_handler).delete(delete_document_handler),
        )
        .route("/documents/{id}/insight", get(document_insight_handler))
        .route("/user/insights", get(patient_insights_handler))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .with_state(state.clone());

    Ok(Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            state.config.request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors))
}
