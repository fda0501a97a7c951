//! HTTP server: router assembly, readiness and graceful shutdown

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    middleware,
    routing::get,
    Json, Router,
};
use domain_estimation::{handlers, CatalogClient, EstimationService};
use eyre::{Result, WrapErr};
use serde_json::{json, Value};
use tokio::signal;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{error, info, warn, Level};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;

#[derive(OpenApi)]
#[openapi(
    info(title = "Cost Estimator", description = "Cloud cost estimation tools"),
    nest((path = "/mcp", api = handlers::ApiDoc))
)]
struct ApiDoc;

/// Assemble the full application router
pub fn build_router<C: CatalogClient + 'static>(
    service: EstimationService<C>,
    config: &Config,
) -> Result<Router> {
    let readiness = Router::new()
        .route("/ready", get(ready::<C>))
        .with_state(service.clone());

    let router = Router::new()
        .route("/", get(service_info))
        .route("/health", get(health))
        .route("/metrics", get(observability::metrics_handler))
        .merge(readiness)
        .nest("/mcp", handlers::router(service))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn(observability::http_metrics))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&config.cors_allowed_origins)?);

    Ok(router)
}

/// Bind and serve until SIGINT/SIGTERM
pub async fn serve(router: Router, config: &Config) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(config.address())
        .await
        .wrap_err_with(|| format!("Failed to bind {}", config.address()))?;

    info!("Server starting on {}", listener.local_addr()?);
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .inspect_err(|e| error!("Server encountered an error: {:?}", e))?;

    Ok(())
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() {
        warn!("CORS_ALLOWED_ORIGIN not set, allowing any origin");
        return Ok(layer.allow_origin(Any));
    }

    let allowed = origins
        .iter()
        .map(|o| o.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()
        .wrap_err("Invalid CORS_ALLOWED_ORIGIN value")?;

    info!("CORS configured with allowed origins: {}", origins.join(","));
    Ok(layer.allow_origin(AllowOrigin::list(allowed)))
}

async fn service_info() -> Json<Value> {
    Json(json!({
        "service": "Cost Estimator",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/mcp/tools",
            "/mcp/extract-resources",
            "/mcp/get-pricing",
            "/mcp/calculate-cost"
        ]
    }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "name": env!("CARGO_PKG_NAME") }))
}

async fn ready<C: CatalogClient>(
    State(service): State<EstimationService<C>>,
) -> (StatusCode, Json<Value>) {
    match service.resolver().catalog().health_check().await {
        Ok(true) => (
            StatusCode::OK,
            Json(json!({ "ready": true, "catalog": "reachable" })),
        ),
        Ok(false) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "ready": false, "catalog": "unhealthy" })),
        ),
        Err(e) => {
            error!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "ready": false, "catalog": "unreachable" })),
            )
        }
    }
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C signal, shutting down gracefully"),
        _ = terminate => info!("Received SIGTERM signal, shutting down gracefully"),
    }
}
