//! Diagram analysis capability
//!
//! Turning an architecture diagram into resource descriptors is pluggable.
//! The bundled analyzer is a placeholder that returns a canned architecture.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::EstimationResult;
use crate::models::ResourceDescriptor;

/// How `image_data` should be interpreted
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ImageType {
    #[default]
    Base64,
    Url,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiagramAnalysisRequest {
    /// Base64-encoded image data or URL of the architecture diagram
    #[validate(length(min = 1, message = "image data must not be empty"))]
    pub image_data: String,
    #[serde(default)]
    pub image_type: Option<ImageType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiagramAnalysisResult {
    pub status: String,
    pub message: String,
    pub detected_resources: Vec<ResourceDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[async_trait]
pub trait DiagramAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        image_data: &str,
        image_type: ImageType,
    ) -> EstimationResult<DiagramAnalysisResult>;
}

/// Stand-in until a vision backend is wired up
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderDiagramAnalyzer;

impl PlaceholderDiagramAnalyzer {
    fn example_resources() -> Vec<ResourceDescriptor> {
        vec![
            ResourceDescriptor::new("Virtual Machines", "Standard_D2s_v3")
                .with_quantity(2)
                .with_notes("Example: Web application servers"),
            ResourceDescriptor::new("Azure SQL Database", "S3")
                .with_notes("Example: Application database"),
            ResourceDescriptor::new("Storage", "Standard_LRS")
                .with_notes("Example: Blob storage for assets"),
            ResourceDescriptor::new("Azure App Service", "P1v2")
                .with_notes("Example: Application hosting"),
        ]
    }
}

#[async_trait]
impl DiagramAnalyzer for PlaceholderDiagramAnalyzer {
    async fn analyze(
        &self,
        image_data: &str,
        image_type: ImageType,
    ) -> EstimationResult<DiagramAnalysisResult> {
        info!(
            image_type = %image_type,
            bytes = image_data.len(),
            "Analyzing architecture diagram"
        );

        Ok(DiagramAnalysisResult {
            status: "success".to_string(),
            message: "Architecture diagram analyzed successfully".to_string(),
            detected_resources: Self::example_resources(),
            note: Some(
                "Detected resources are examples; configure a vision backend to analyze real diagrams"
                    .to_string(),
            ),
        })
    }
}
