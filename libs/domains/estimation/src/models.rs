use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Average hours in a month used for every monthly projection
pub const HOURS_PER_MONTH: u32 = 730;

/// Hours in a (non-leap) year used for every yearly projection
pub const HOURS_PER_YEAR: u32 = 8760;

/// Region assumed when a descriptor does not name one
pub const DEFAULT_REGION: &str = "eastus";

/// Currency assumed when nothing priced or the catalog omitted it
pub const DEFAULT_CURRENCY: &str = "USD";

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

fn default_quantity() -> u32 {
    1
}

/// Human readable identity of a resource, stable across success and failure
pub fn resource_label(service_name: &str, sku_name: &str) -> String {
    format!("{} - {}", service_name, sku_name)
}

/// Hourly, monthly and yearly cost of some quantity of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostProjection {
    pub hourly: Decimal,
    pub monthly: Decimal,
    pub yearly: Decimal,
}

/// Project `quantity` units at `unit_hourly`; `None` when any figure overflows.
pub fn project_costs(unit_hourly: Decimal, quantity: u32) -> Option<CostProjection> {
    let hourly = unit_hourly.checked_mul(Decimal::from(quantity))?;
    Some(CostProjection {
        hourly,
        monthly: hourly.checked_mul(Decimal::from(HOURS_PER_MONTH))?,
        yearly: hourly.checked_mul(Decimal::from(HOURS_PER_YEAR))?,
    })
}

/// A resource the caller wants priced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescriptor {
    /// Catalog service name (e.g., "Virtual Machines")
    #[serde(default)]
    pub service_name: String,
    /// ARM SKU name (e.g., "Standard_D2s_v3")
    #[serde(default)]
    pub sku_name: String,
    /// ARM region code
    #[serde(default = "default_region")]
    pub region: String,
    /// Number of identical instances
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: u32,
    /// Free-form caller notes, not used for pricing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ResourceDescriptor {
    pub fn new(service_name: impl Into<String>, sku_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            sku_name: sku_name.into(),
            region: default_region(),
            quantity: 1,
            notes: None,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn label(&self) -> String {
        resource_label(&self.service_name, &self.sku_name)
    }
}

/// Pricing fields of a successfully resolved quote
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PricedDetails {
    pub unit_of_measure: String,
    pub retail_price: Decimal,
    pub unit_price: Decimal,
    pub currency_code: String,
    /// Per-unit hourly rate
    pub hourly_cost: Decimal,
    /// `hourly_cost * 730 * quantity`
    pub monthly_cost: Decimal,
    /// `hourly_cost * 8760 * quantity`
    pub yearly_cost: Decimal,
    pub product_name: Option<String>,
    pub meter_name: Option<String>,
}

/// Either the priced fields or the reason pricing failed, never both
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteOutcome {
    Priced(PricedDetails),
    Failed { error: String },
}

/// One priced (or failed) resource.
///
/// Serialized as the flat [`PriceQuoteRecord`] so tool clients can send the
/// `get-pricing` output straight back to `calculate-cost`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PriceQuoteRecord", into = "PriceQuoteRecord")]
pub struct PriceQuote {
    pub resource_label: String,
    pub service_name: String,
    pub sku_name: String,
    pub region: String,
    pub quantity: u32,
    pub outcome: QuoteOutcome,
}

impl PriceQuote {
    pub fn priced(descriptor: &ResourceDescriptor, details: PricedDetails) -> Self {
        Self::from_descriptor(descriptor, QuoteOutcome::Priced(details))
    }

    pub fn failed(descriptor: &ResourceDescriptor, error: impl Into<String>) -> Self {
        Self::from_descriptor(
            descriptor,
            QuoteOutcome::Failed {
                error: error.into(),
            },
        )
    }

    fn from_descriptor(descriptor: &ResourceDescriptor, outcome: QuoteOutcome) -> Self {
        Self {
            resource_label: descriptor.label(),
            service_name: descriptor.service_name.clone(),
            sku_name: descriptor.sku_name.clone(),
            region: descriptor.region.clone(),
            quantity: descriptor.quantity,
            outcome,
        }
    }

    pub fn details(&self) -> Option<&PricedDetails> {
        match &self.outcome {
            QuoteOutcome::Priced(details) => Some(details),
            QuoteOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            QuoteOutcome::Priced(_) => None,
            QuoteOutcome::Failed { error } => Some(error),
        }
    }

    pub fn is_priced(&self) -> bool {
        matches!(self.outcome, QuoteOutcome::Priced(_))
    }
}

/// Wire shape of a [`PriceQuote`].
///
/// A record whose `error` is non-empty is a failure regardless of any
/// monetary fields it carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuoteRecord {
    #[serde(default, alias = "resourceName")]
    pub resource_label: String,
    #[serde(default)]
    pub service_name: String,
    #[serde(default)]
    pub sku_name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub unit_of_measure: String,
    #[serde(default)]
    pub retail_price: Decimal,
    #[serde(default)]
    pub unit_price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
    #[serde(default)]
    pub hourly_cost: Decimal,
    #[serde(default)]
    pub monthly_cost: Decimal,
    #[serde(default)]
    pub yearly_cost: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meter_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<PriceQuoteRecord> for PriceQuote {
    fn from(record: PriceQuoteRecord) -> Self {
        let resource_label = if record.resource_label.is_empty() {
            resource_label(&record.service_name, &record.sku_name)
        } else {
            record.resource_label
        };

        let outcome = match record.error.filter(|e| !e.is_empty()) {
            Some(error) => QuoteOutcome::Failed { error },
            None => QuoteOutcome::Priced(PricedDetails {
                unit_of_measure: record.unit_of_measure,
                retail_price: record.retail_price,
                unit_price: record.unit_price,
                currency_code: record
                    .currency_code
                    .filter(|c| !c.is_empty())
                    .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
                hourly_cost: record.hourly_cost,
                monthly_cost: record.monthly_cost,
                yearly_cost: record.yearly_cost,
                product_name: record.product_name,
                meter_name: record.meter_name,
            }),
        };

        Self {
            resource_label,
            service_name: record.service_name,
            sku_name: record.sku_name,
            region: record.region,
            quantity: record.quantity,
            outcome,
        }
    }
}

impl From<PriceQuote> for PriceQuoteRecord {
    fn from(quote: PriceQuote) -> Self {
        let mut record = PriceQuoteRecord {
            resource_label: quote.resource_label,
            service_name: quote.service_name,
            sku_name: quote.sku_name,
            region: quote.region,
            quantity: quote.quantity,
            unit_of_measure: String::new(),
            retail_price: Decimal::ZERO,
            unit_price: Decimal::ZERO,
            currency_code: None,
            hourly_cost: Decimal::ZERO,
            monthly_cost: Decimal::ZERO,
            yearly_cost: Decimal::ZERO,
            product_name: None,
            meter_name: None,
            error: None,
        };

        match quote.outcome {
            QuoteOutcome::Priced(details) => {
                record.unit_of_measure = details.unit_of_measure;
                record.retail_price = details.retail_price;
                record.unit_price = details.unit_price;
                record.currency_code = Some(details.currency_code);
                record.hourly_cost = details.hourly_cost;
                record.monthly_cost = details.monthly_cost;
                record.yearly_cost = details.yearly_cost;
                record.product_name = details.product_name;
                record.meter_name = details.meter_name;
            }
            QuoteOutcome::Failed { error } => record.error = Some(error),
        }

        record
    }
}

/// One row of the cost breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CostLineItem {
    pub resource_label: String,
    pub quantity: u32,
    /// Rounded to 4 decimal places
    pub hourly_cost: Decimal,
    /// Rounded to 2 decimal places
    pub monthly_cost: Decimal,
    /// Rounded to 2 decimal places
    pub yearly_cost: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CostLineItem {
    /// Line for a quote that failed to price: zero costs, no currency
    pub fn failed(resource_label: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            resource_label: resource_label.into(),
            quantity: 0,
            hourly_cost: Decimal::ZERO,
            monthly_cost: Decimal::ZERO,
            yearly_cost: Decimal::ZERO,
            currency_code: None,
            error: Some(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Totals over every successfully priced line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CostSummary {
    pub total_hourly_cost: Decimal,
    pub total_monthly_cost: Decimal,
    pub total_yearly_cost: Decimal,
    pub currency_code: String,
}

impl Default for CostSummary {
    fn default() -> Self {
        Self {
            total_hourly_cost: Decimal::ZERO,
            total_monthly_cost: Decimal::ZERO,
            total_yearly_cost: Decimal::ZERO,
            currency_code: DEFAULT_CURRENCY.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CostReport {
    pub summary: CostSummary,
    /// Same length and order as the aggregated quotes
    pub breakdown: Vec<CostLineItem>,
    pub notes: Vec<String>,
}

/// Response of the `get-pricing` operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricingAnalysis {
    pub status: String,
    pub resource_count: usize,
    #[schema(value_type = Vec<PriceQuoteRecord>)]
    pub pricing_data: Vec<PriceQuote>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

/// Response of the `calculate-cost` operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CostCalculation {
    pub status: String,
    pub currency: String,
    pub summary: CostSummary,
    pub breakdown: Vec<CostLineItem>,
    pub notes: Vec<String>,
}

impl From<CostReport> for CostCalculation {
    fn from(report: CostReport) -> Self {
        Self {
            status: "success".to_string(),
            currency: report.summary.currency_code.clone(),
            summary: report.summary,
            breakdown: report.breakdown,
            notes: report.notes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_descriptor_defaults() {
        let descriptor: ResourceDescriptor =
            serde_json::from_value(json!({ "serviceName": "Storage" })).unwrap();

        assert_eq!(descriptor.sku_name, "");
        assert_eq!(descriptor.region, "eastus");
        assert_eq!(descriptor.quantity, 1);
        assert!(descriptor.notes.is_none());
    }

    #[test]
    fn test_descriptor_rejects_zero_quantity() {
        let descriptor = ResourceDescriptor::new("Storage", "Standard_LRS").with_quantity(0);
        assert!(descriptor.validate().is_err());

        let descriptor = descriptor.with_quantity(1);
        assert!(descriptor.validate().is_ok());
    }

    #[test]
    fn test_project_costs_uses_fixed_hours() {
        let costs = project_costs(Decimal::new(96, 3), 2).unwrap();
        assert_eq!(costs.hourly, Decimal::new(192, 3));
        assert_eq!(costs.monthly, Decimal::new(14016, 2));
        assert_eq!(costs.yearly, Decimal::new(168192, 2));
    }

    #[test]
    fn test_project_costs_overflow_is_none() {
        let rate: Decimal = "100000000000000000000".parse().unwrap();
        assert!(project_costs(rate, 4_000_000_000).is_none());
        assert!(project_costs(rate, 1).is_some());
    }

    #[test]
    fn test_label_format() {
        let descriptor = ResourceDescriptor::new("Virtual Machines", "Standard_D2s_v3");
        assert_eq!(descriptor.label(), "Virtual Machines - Standard_D2s_v3");
    }

    #[test]
    fn test_record_with_error_is_failed_even_with_prices() {
        let quote: PriceQuote = serde_json::from_value(json!({
            "resourceName": "Storage - Standard_LRS",
            "serviceName": "Storage",
            "skuName": "Standard_LRS",
            "quantity": 3,
            "hourlyCost": 1.5,
            "currencyCode": "USD",
            "error": "upstream exploded"
        }))
        .unwrap();

        assert_eq!(quote.resource_label, "Storage - Standard_LRS");
        assert_eq!(quote.error(), Some("upstream exploded"));
        assert!(quote.details().is_none());
    }

    #[test]
    fn test_record_with_empty_error_is_priced() {
        let quote: PriceQuote = serde_json::from_value(json!({
            "serviceName": "Storage",
            "skuName": "Standard_LRS",
            "hourlyCost": 2,
            "error": ""
        }))
        .unwrap();

        assert!(quote.is_priced());
        assert_eq!(quote.resource_label, "Storage - Standard_LRS");
        assert_eq!(quote.quantity, 1);
        let details = quote.details().unwrap();
        assert_eq!(details.currency_code, "USD");
        assert_eq!(details.hourly_cost, Decimal::from(2));
    }

    #[test]
    fn test_failed_quote_serializes_without_currency() {
        let descriptor = ResourceDescriptor::new("Unknown Service", "X");
        let quote = PriceQuote::failed(&descriptor, "No pricing data found for this resource");

        let value = serde_json::to_value(&quote).unwrap();

        assert_eq!(value["resourceLabel"], "Unknown Service - X");
        assert_eq!(value["error"], "No pricing data found for this resource");
        assert!(value.get("currencyCode").is_none());
        assert_eq!(value["hourlyCost"].as_f64(), Some(0.0));
        assert_eq!(value["monthlyCost"].as_f64(), Some(0.0));
    }

    #[test]
    fn test_cost_calculation_takes_summary_currency() {
        let report = CostReport {
            summary: CostSummary {
                currency_code: "EUR".to_string(),
                ..Default::default()
            },
            breakdown: vec![],
            notes: vec!["note".to_string()],
        };

        let calculation = CostCalculation::from(report);
        assert_eq!(calculation.status, "success");
        assert_eq!(calculation.currency, "EUR");
        assert_eq!(calculation.notes, vec!["note".to_string()]);
    }
}
