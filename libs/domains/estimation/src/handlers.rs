//! HTTP handlers for the estimation tools

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::catalog::CatalogClient;
use crate::diagram::{DiagramAnalysisRequest, DiagramAnalysisResult, ImageType};
use crate::error::EstimationResult;
use crate::models::{
    CostCalculation, CostLineItem, CostSummary, PriceQuote, PriceQuoteRecord, PricingAnalysis,
    ResourceDescriptor,
};
use crate::service::EstimationService;
use crate::tools::{ToolDescriptor, ToolsListResponse};

pub const TAG: &str = "estimation";

/// OpenAPI documentation for the estimation tools
#[derive(OpenApi)]
#[openapi(
    paths(list_tools, extract_resources, get_pricing, calculate_cost),
    components(schemas(
        ResourceDescriptor,
        PriceQuoteRecord,
        PricingAnalysis,
        CostLineItem,
        CostSummary,
        CostCalculation,
        DiagramAnalysisRequest,
        DiagramAnalysisResult,
        ImageType,
        ToolDescriptor,
        ToolsListResponse,
    )),
    tags((name = TAG, description = "Cloud cost estimation tools"))
)]
pub struct ApiDoc;

/// Create the estimation router; mount it under `/mcp`
pub fn router<C: CatalogClient + 'static>(service: EstimationService<C>) -> Router {
    Router::new()
        .route("/tools", get(list_tools::<C>))
        .route("/extract-resources", post(extract_resources::<C>))
        .route("/get-pricing", post(get_pricing::<C>))
        .route("/calculate-cost", post(calculate_cost::<C>))
        .with_state(Arc::new(service))
}

/// List the available tools and their input schemas
#[utoipa::path(
    get,
    path = "/tools",
    tag = TAG,
    responses((status = 200, description = "Available tools", body = ToolsListResponse))
)]
async fn list_tools<C: CatalogClient>(
    State(service): State<Arc<EstimationService<C>>>,
) -> Json<ToolsListResponse> {
    Json(ToolsListResponse {
        tools: service.tools(),
    })
}

/// Extract resource descriptors from an architecture diagram
#[utoipa::path(
    post,
    path = "/extract-resources",
    tag = TAG,
    request_body = DiagramAnalysisRequest,
    responses(
        (status = 200, description = "Detected resources", body = DiagramAnalysisResult),
        (status = 400, description = "Invalid request")
    )
)]
async fn extract_resources<C: CatalogClient>(
    State(service): State<Arc<EstimationService<C>>>,
    Json(request): Json<DiagramAnalysisRequest>,
) -> EstimationResult<Json<DiagramAnalysisResult>> {
    let result = service.extract_resources(request).await?;
    Ok(Json(result))
}

/// Resolve retail prices for a list of resources
#[utoipa::path(
    post,
    path = "/get-pricing",
    tag = TAG,
    request_body = Vec<ResourceDescriptor>,
    responses(
        (status = 200, description = "Per-resource pricing; failures are reported per item", body = PricingAnalysis),
        (status = 400, description = "Missing or invalid resource list")
    )
)]
async fn get_pricing<C: CatalogClient>(
    State(service): State<Arc<EstimationService<C>>>,
    Json(resources): Json<Option<Vec<ResourceDescriptor>>>,
) -> EstimationResult<Json<PricingAnalysis>> {
    let analysis = service.get_pricing(resources).await?;
    Ok(Json(analysis))
}

/// Calculate total costs from pricing data
#[utoipa::path(
    post,
    path = "/calculate-cost",
    tag = TAG,
    request_body = Vec<PriceQuoteRecord>,
    responses(
        (status = 200, description = "Cost summary and breakdown", body = CostCalculation),
        (status = 400, description = "Missing pricing data")
    )
)]
async fn calculate_cost<C: CatalogClient>(
    State(service): State<Arc<EstimationService<C>>>,
    Json(pricing_data): Json<Option<Vec<PriceQuote>>>,
) -> EstimationResult<Json<CostCalculation>> {
    let report = service.calculate_cost(pricing_data)?;
    Ok(Json(CostCalculation::from(report)))
}
