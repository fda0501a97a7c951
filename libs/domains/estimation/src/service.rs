use std::sync::Arc;
use validator::Validate;

use crate::aggregator::CostAggregator;
use crate::catalog::CatalogClient;
use crate::diagram::{DiagramAnalysisRequest, DiagramAnalysisResult, DiagramAnalyzer, PlaceholderDiagramAnalyzer};
use crate::error::{EstimationError, EstimationResult};
use crate::models::{CostReport, PriceQuote, PricingAnalysis, ResourceDescriptor};
use crate::resolver::PricingResolver;
use crate::tools::{available_tools, ToolDescriptor, CALCULATE_COST_TOOL};

/// Entry point for the estimation operations exposed to callers
pub struct EstimationService<C: CatalogClient> {
    resolver: PricingResolver<C>,
    aggregator: CostAggregator,
    analyzer: Arc<dyn DiagramAnalyzer>,
}

impl<C: CatalogClient> Clone for EstimationService<C> {
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
            aggregator: self.aggregator.clone(),
            analyzer: self.analyzer.clone(),
        }
    }
}

impl<C: CatalogClient> EstimationService<C> {
    /// Create a service with default notes and the placeholder diagram analyzer
    pub fn new(resolver: PricingResolver<C>) -> Self {
        Self {
            resolver,
            aggregator: CostAggregator::default(),
            analyzer: Arc::new(PlaceholderDiagramAnalyzer),
        }
    }

    pub fn with_aggregator(mut self, aggregator: CostAggregator) -> Self {
        self.aggregator = aggregator;
        self
    }

    pub fn with_analyzer(mut self, analyzer: Arc<dyn DiagramAnalyzer>) -> Self {
        self.analyzer = analyzer;
        self
    }

    pub fn resolver(&self) -> &PricingResolver<C> {
        &self.resolver
    }

    /// Resolve a batch of descriptors.
    ///
    /// A missing list or an invalid descriptor rejects the whole batch; lookup
    /// failures are reported per quote instead.
    pub async fn get_pricing(
        &self,
        resources: Option<Vec<ResourceDescriptor>>,
    ) -> EstimationResult<PricingAnalysis> {
        let resources = require_batch(resources, "resources")?;

        for (index, descriptor) in resources.iter().enumerate() {
            descriptor.validate().map_err(|e| {
                EstimationError::InvalidInput(format!("resources[{}]: {}", index, e))
            })?;
        }

        let pricing_data = self.resolver.resolve_batch(&resources).await;

        Ok(PricingAnalysis {
            status: "success".to_string(),
            resource_count: resources.len(),
            pricing_data,
            instructions: Some(format!(
                "Use {} to get the total monthly and yearly costs",
                CALCULATE_COST_TOOL
            )),
        })
    }

    /// Aggregate previously resolved quotes into a report
    pub fn calculate_cost(&self, pricing_data: Option<Vec<PriceQuote>>) -> EstimationResult<CostReport> {
        let pricing_data = require_batch(pricing_data, "pricing data")?;
        Ok(self.aggregator.aggregate(&pricing_data))
    }

    /// Resolve and aggregate in one step
    pub async fn estimate(
        &self,
        resources: Option<Vec<ResourceDescriptor>>,
    ) -> EstimationResult<CostReport> {
        let analysis = self.get_pricing(resources).await?;
        Ok(self.aggregator.aggregate(&analysis.pricing_data))
    }

    pub async fn extract_resources(
        &self,
        request: DiagramAnalysisRequest,
    ) -> EstimationResult<DiagramAnalysisResult> {
        request
            .validate()
            .map_err(|e| EstimationError::InvalidInput(e.to_string()))?;

        self.analyzer
            .analyze(&request.image_data, request.image_type.unwrap_or_default())
            .await
    }

    pub fn tools(&self) -> Vec<ToolDescriptor> {
        available_tools()
    }
}

fn require_batch<T>(batch: Option<Vec<T>>, name: &str) -> EstimationResult<Vec<T>> {
    batch.ok_or_else(|| EstimationError::InvalidInput(format!("{} list is required", name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogError, CatalogItem, MockCatalogClient};
    use crate::diagram::ImageType;
    use rust_decimal::Decimal;

    fn vm_item() -> CatalogItem {
        CatalogItem {
            currency_code: "USD".to_string(),
            retail_price: Decimal::new(96, 3),
            unit_price: Decimal::new(96, 3),
            unit_of_measure: "1 Hour".to_string(),
            service_name: "Virtual Machines".to_string(),
            product_name: "Virtual Machines DSv3 Series".to_string(),
            sku_name: "D2s v3".to_string(),
            meter_name: "D2s v3".to_string(),
            arm_region_name: "eastus".to_string(),
            arm_sku_name: Some("Standard_D2s_v3".to_string()),
        }
    }

    fn service(catalog: MockCatalogClient) -> EstimationService<MockCatalogClient> {
        EstimationService::new(PricingResolver::new(catalog))
    }

    #[tokio::test]
    async fn test_get_pricing_rejects_missing_list() {
        let mut catalog = MockCatalogClient::new();
        catalog.expect_query().never();

        let result = service(catalog).get_pricing(None).await;

        assert!(matches!(result, Err(EstimationError::InvalidInput(msg)) if msg.contains("resources")));
    }

    #[tokio::test]
    async fn test_get_pricing_rejects_zero_quantity_before_lookup() {
        let mut catalog = MockCatalogClient::new();
        catalog.expect_query().never();

        let resources = vec![
            ResourceDescriptor::new("Storage", "Standard_LRS"),
            ResourceDescriptor::new("Virtual Machines", "Standard_D2s_v3").with_quantity(0),
        ];
        let result = service(catalog).get_pricing(Some(resources)).await;

        match result {
            Err(EstimationError::InvalidInput(msg)) => assert!(msg.starts_with("resources[1]")),
            other => panic!("expected invalid input, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_pricing_reports_count_and_instructions() {
        let mut catalog = MockCatalogClient::new();
        catalog.expect_query().times(1).returning(|_| Ok(vec![vm_item()]));

        let analysis = service(catalog)
            .get_pricing(Some(vec![ResourceDescriptor::new(
                "Virtual Machines",
                "Standard_D2s_v3",
            )]))
            .await
            .unwrap();

        assert_eq!(analysis.status, "success");
        assert_eq!(analysis.resource_count, 1);
        assert_eq!(analysis.pricing_data.len(), 1);
        assert!(analysis.instructions.unwrap().contains("calculate_total_cost"));
    }

    #[tokio::test]
    async fn test_get_pricing_empty_batch_is_valid() {
        let analysis = service(MockCatalogClient::new())
            .get_pricing(Some(vec![]))
            .await
            .unwrap();

        assert_eq!(analysis.resource_count, 0);
        assert!(analysis.pricing_data.is_empty());
    }

    #[test]
    fn test_calculate_cost_rejects_missing_list() {
        let result = service(MockCatalogClient::new()).calculate_cost(None);
        assert!(matches!(result, Err(EstimationError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_estimate_end_to_end_with_failed_lookup() {
        let mut catalog = MockCatalogClient::new();
        catalog
            .expect_query()
            .withf(|f| f.to_odata().contains("Virtual Machines"))
            .returning(|_| Ok(vec![vm_item()]));
        catalog
            .expect_query()
            .withf(|f| f.to_odata().contains("Unknown Service"))
            .returning(|_| Ok(vec![]));

        let report = service(catalog)
            .estimate(Some(vec![
                ResourceDescriptor::new("Virtual Machines", "Standard_D2s_v3").with_quantity(2),
                ResourceDescriptor::new("Unknown Service", "X"),
            ]))
            .await
            .unwrap();

        assert_eq!(report.breakdown.len(), 2);
        assert_eq!(report.summary.total_hourly_cost, Decimal::new(1920, 4));
        assert_eq!(report.summary.total_monthly_cost, Decimal::new(14016, 2));
        assert_eq!(report.summary.total_yearly_cost, Decimal::new(168192, 2));
        assert!(report.breakdown[1].is_error());
    }

    #[tokio::test]
    async fn test_estimate_survives_transport_failure() {
        let mut catalog = MockCatalogClient::new();
        catalog
            .expect_query()
            .returning(|_| Err(CatalogError::Timeout(std::time::Duration::from_secs(30))));

        let report = service(catalog)
            .estimate(Some(vec![ResourceDescriptor::new("Storage", "Standard_LRS")]))
            .await
            .unwrap();

        assert_eq!(report.breakdown.len(), 1);
        assert!(report.breakdown[0].error.as_deref().unwrap().contains("timed out"));
        assert_eq!(report.summary.total_monthly_cost, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_extract_resources_validates_request() {
        let svc = service(MockCatalogClient::new());

        let empty = DiagramAnalysisRequest {
            image_data: String::new(),
            image_type: None,
        };
        assert!(matches!(
            svc.extract_resources(empty).await,
            Err(EstimationError::InvalidInput(_))
        ));

        let ok = DiagramAnalysisRequest {
            image_data: "https://example.com/diagram.png".to_string(),
            image_type: Some(ImageType::Url),
        };
        let result = svc.extract_resources(ok).await.unwrap();
        assert_eq!(result.detected_resources.len(), 4);
    }
}
