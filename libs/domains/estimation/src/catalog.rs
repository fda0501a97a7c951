//! Retail Pricing Catalog
//!
//! Narrow client for the Azure Retail Prices API.
//! https://learn.microsoft.com/en-us/rest/api/cost-management/retail-prices/azure-retail-prices
//!
//! Only the first page of a query is ever read; pagination, retries and
//! caching are left to callers.

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::models::ResourceDescriptor;

/// Azure Retail Prices API endpoint
pub const RETAIL_PRICES_API: &str = "https://prices.azure.com/api/retail/prices";

/// Upper bound for a single catalog request
pub const DEFAULT_CATALOG_TIMEOUT: Duration = Duration::from_secs(30);

/// Error type for catalog lookups
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Catalog request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Catalog returned non-success status: {0}")]
    Status(u16),

    #[error("Failed to parse catalog response: {0}")]
    Parse(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Catalog attributes a filter can constrain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogField {
    ServiceName,
    ArmSkuName,
    ArmRegionName,
}

impl CatalogField {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogField::ServiceName => "serviceName",
            CatalogField::ArmSkuName => "armSkuName",
            CatalogField::ArmRegionName => "armRegionName",
        }
    }
}

/// Conjunction of equality predicates, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    predicates: Vec<(CatalogField, String)>,
}

impl CatalogFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `field eq 'value'`; empty values are skipped, never widened to a wildcard.
    pub fn eq(mut self, field: CatalogField, value: &str) -> Self {
        if !value.is_empty() {
            self.predicates.push((field, value.to_string()));
        }
        self
    }

    /// Filter on whichever of service, SKU and region the descriptor sets
    pub fn for_descriptor(descriptor: &ResourceDescriptor) -> Self {
        Self::new()
            .eq(CatalogField::ServiceName, &descriptor.service_name)
            .eq(CatalogField::ArmSkuName, &descriptor.sku_name)
            .eq(CatalogField::ArmRegionName, &descriptor.region)
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn value(&self, field: CatalogField) -> Option<&str> {
        self.predicates
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, v)| v.as_str())
    }

    /// Render as an OData `$filter` expression
    pub fn to_odata(&self) -> String {
        self.predicates
            .iter()
            .map(|(field, value)| format!("{} eq '{}'", field.as_str(), value.replace('\'', "''")))
            .collect::<Vec<_>>()
            .join(" and ")
    }
}

/// One page of the Retail Prices API response
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogPage {
    #[serde(rename = "Items", alias = "items", default)]
    pub items: Vec<CatalogItem>,
    #[serde(rename = "NextPageLink", alias = "nextPageLink", default)]
    pub next_page_link: Option<String>,
    #[serde(rename = "Count", alias = "count", default)]
    pub count: u64,
}

/// A priced catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    #[serde(default = "default_currency")]
    pub currency_code: String,
    #[serde(default)]
    pub retail_price: Decimal,
    #[serde(default)]
    pub unit_price: Decimal,
    #[serde(default)]
    pub unit_of_measure: String,
    #[serde(default)]
    pub service_name: String,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub sku_name: String,
    #[serde(default)]
    pub meter_name: String,
    #[serde(default)]
    pub arm_region_name: String,
    #[serde(default)]
    pub arm_sku_name: Option<String>,
}

fn default_currency() -> String {
    crate::models::DEFAULT_CURRENCY.to_string()
}

/// Lookup capability the resolver depends on
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Items of the first result page, in catalog order
    async fn query(&self, filter: &CatalogFilter) -> CatalogResult<Vec<CatalogItem>>;

    /// Verify the catalog is reachable
    async fn health_check(&self) -> CatalogResult<bool>;
}

/// Connection settings for [`RetailPricesClient`]
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: RETAIL_PRICES_API.to_string(),
            timeout: DEFAULT_CATALOG_TIMEOUT,
        }
    }
}

/// HTTP client for the public Retail Prices API (no authentication)
#[derive(Clone)]
pub struct RetailPricesClient {
    config: CatalogConfig,
    client: Client,
}

impl RetailPricesClient {
    pub fn new(config: CatalogConfig) -> CatalogResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn query_url(&self, filter: &CatalogFilter) -> String {
        if filter.is_empty() {
            self.config.base_url.clone()
        } else {
            format!(
                "{}?$filter={}",
                self.config.base_url,
                urlencoding::encode(&filter.to_odata())
            )
        }
    }

    fn map_send_error(&self, err: reqwest::Error) -> CatalogError {
        if err.is_timeout() {
            CatalogError::Timeout(self.config.timeout)
        } else {
            CatalogError::Http(err)
        }
    }
}

#[async_trait]
impl CatalogClient for RetailPricesClient {
    async fn query(&self, filter: &CatalogFilter) -> CatalogResult<Vec<CatalogItem>> {
        let url = self.query_url(filter);
        debug!(url = %url, "Querying retail prices catalog");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            return Err(CatalogError::Status(response.status().as_u16()));
        }

        let body = response.text().await.map_err(|e| self.map_send_error(e))?;
        let page: CatalogPage =
            serde_json::from_str(&body).map_err(|e| CatalogError::Parse(e.to_string()))?;

        debug!(
            items = page.items.len(),
            has_next_page = page.next_page_link.is_some(),
            "Catalog page received"
        );

        Ok(page.items)
    }

    async fn health_check(&self) -> CatalogResult<bool> {
        let url = format!("{}?$top=1", self.config.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        Ok(response.status().is_success())
    }
}
