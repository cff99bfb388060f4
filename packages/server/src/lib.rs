pub mod config;
pub mod cors;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod migration;
pub mod models;
pub mod routes;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::http::{StatusCode, header};
use axum::routing::any;
use tower_http::catch_panic::CatchPanicLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Maquette API",
        version = "1.0.0",
        description = "Model catalog and storage gateway for the Maquette 3D model gallery"
    ),
    tags(
        (name = "Models", description = "Model catalog CRUD and download tracking"),
        (name = "Migration", description = "Storage path migration between legacy and canonical layouts"),
    ),
)]
struct ApiDoc;

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let (api_router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api", routes::api_routes())
        .split_for_parts();

    let gateway = axum::Router::new()
        .route("/models/{*key}", any(handlers::gateway::gateway))
        .layer(DefaultBodyLimit::max(
            state.config.gateway.max_object_size as usize,
        ));

    api_router
        .merge(gateway)
        .route("/", any(handlers::gateway::health))
        .route("/health", any(handlers::gateway::health))
        .fallback(handlers::gateway::fallback)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api.clone()))
        .merge(Scalar::with_url("/scalar", api))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            cors::apply_cors,
        ))
        .with_state(state)
}

/// Convert an escaped panic into the structured 500 body instead of a
/// dropped connection; the hosting runtime has no process to recover.
fn panic_response(err: Box<dyn std::any::Any + Send + 'static>) -> axum::response::Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!("Handler panicked: {detail}");

    let body = serde_json::json!({
        "error": "INTERNAL_ERROR",
        "message": format!("Unhandled fault: {detail}"),
    });

    axum::response::Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(body.to_string()))
        .unwrap_or_else(|_| {
            let mut res = axum::response::Response::new(axum::body::Body::empty());
            *res.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            res
        })
}
