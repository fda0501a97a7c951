//! Cost Aggregator
//!
//! Rolls priced quotes into a [`CostReport`]. Failed quotes stay in the
//! breakdown but never contribute to totals.
//!
//! Lines whose costs overflow, or that claim zero instances, become error
//! lines too.
//!
//! Rounding happens twice and independently: each breakdown line is rounded
//! for display, and the summary rounds the unrounded running sums once.

use observability::EstimationMetrics;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::BTreeSet;
use tracing::{info, warn};

use crate::error::{COST_OVERFLOW_ERROR, ZERO_QUANTITY_ERROR};
use crate::models::{
    project_costs, CostLineItem, CostReport, CostSummary, PriceQuote, QuoteOutcome,
    DEFAULT_CURRENCY,
};

/// Advisory notes attached to every report
pub const DEFAULT_NOTES: [&str; 4] = [
    "Monthly costs calculated based on 730 hours per month (average)",
    "Yearly costs calculated based on 8760 hours per year",
    "Costs may vary based on actual usage patterns",
    "Additional costs may apply for data transfer, storage transactions, etc.",
];

const HOURLY_DECIMALS: u32 = 4;
const PERIOD_DECIMALS: u32 = 2;

fn round_to(value: Decimal, decimals: u32) -> Decimal {
    value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointNearestEven)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostAggregator {
    notes: Vec<String>,
}

impl Default for CostAggregator {
    fn default() -> Self {
        Self::with_notes(DEFAULT_NOTES)
    }
}

impl CostAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the advisory notes appended to every report
    pub fn with_notes<I, S>(notes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            notes: notes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    /// Build the report. Pure: the same input always yields the same report.
    pub fn aggregate(&self, quotes: &[PriceQuote]) -> CostReport {
        info!(count = quotes.len(), "Calculating total costs for resources");

        let mut total_hourly = Decimal::ZERO;
        let mut total_monthly = Decimal::ZERO;
        let mut total_yearly = Decimal::ZERO;
        let mut currency = DEFAULT_CURRENCY.to_string();
        let mut currencies_seen = BTreeSet::new();
        let mut breakdown = Vec::with_capacity(quotes.len());

        for quote in quotes {
            let details = match &quote.outcome {
                QuoteOutcome::Priced(details) => details,
                QuoteOutcome::Failed { error } => {
                    breakdown.push(CostLineItem::failed(&quote.resource_label, error));
                    continue;
                }
            };

            if quote.quantity == 0 {
                breakdown.push(CostLineItem::failed(&quote.resource_label, ZERO_QUANTITY_ERROR));
                continue;
            }

            // Re-derived from the unit rate; upstream monthly/yearly fields are ignored.
            let Some(costs) = project_costs(details.hourly_cost, quote.quantity) else {
                warn!(resource = %quote.resource_label, "Line cost overflows; excluded from totals");
                breakdown.push(CostLineItem::failed(&quote.resource_label, COST_OVERFLOW_ERROR));
                continue;
            };

            let (Some(hourly), Some(monthly), Some(yearly)) = (
                total_hourly.checked_add(costs.hourly),
                total_monthly.checked_add(costs.monthly),
                total_yearly.checked_add(costs.yearly),
            ) else {
                warn!(resource = %quote.resource_label, "Running total overflows; line excluded from totals");
                breakdown.push(CostLineItem::failed(&quote.resource_label, COST_OVERFLOW_ERROR));
                continue;
            };
            total_hourly = hourly;
            total_monthly = monthly;
            total_yearly = yearly;

            // Last priced item wins; no conversion between currencies.
            currency = details.currency_code.clone();
            currencies_seen.insert(details.currency_code.clone());

            breakdown.push(CostLineItem {
                resource_label: quote.resource_label.clone(),
                quantity: quote.quantity,
                hourly_cost: round_to(costs.hourly, HOURLY_DECIMALS),
                monthly_cost: round_to(costs.monthly, PERIOD_DECIMALS),
                yearly_cost: round_to(costs.yearly, PERIOD_DECIMALS),
                currency_code: Some(currency.clone()),
                error: None,
            });
        }

        let mut notes = self.notes.clone();
        if currencies_seen.len() > 1 {
            let listed = currencies_seen.into_iter().collect::<Vec<_>>().join(", ");
            warn!(
                currencies = %listed,
                summary_currency = %currency,
                "Mixed currencies in cost batch; totals are not converted"
            );
            notes.push(format!(
                "Priced resources use multiple currencies ({}); totals are summed without conversion and labeled {}",
                listed, currency
            ));
        }

        let failed = breakdown.iter().filter(|line| line.is_error()).count();
        EstimationMetrics::record_report(breakdown.len(), failed);

        CostReport {
            summary: CostSummary {
                total_hourly_cost: round_to(total_hourly, HOURLY_DECIMALS),
                total_monthly_cost: round_to(total_monthly, PERIOD_DECIMALS),
                total_yearly_cost: round_to(total_yearly, PERIOD_DECIMALS),
                currency_code: currency,
            },
            breakdown,
            notes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PricedDetails, ResourceDescriptor};

    fn priced(service: &str, sku: &str, quantity: u32, hourly: Decimal, currency: &str) -> PriceQuote {
        let descriptor = ResourceDescriptor::new(service, sku).with_quantity(quantity);
        PriceQuote::priced(
            &descriptor,
            PricedDetails {
                unit_of_measure: "1 Hour".to_string(),
                retail_price: hourly,
                unit_price: hourly,
                currency_code: currency.to_string(),
                hourly_cost: hourly,
                ..Default::default()
            },
        )
    }

    fn failed(service: &str, sku: &str, error: &str) -> PriceQuote {
        PriceQuote::failed(&ResourceDescriptor::new(service, sku), error)
    }

    #[test]
    fn test_mixed_batch_excludes_failed_items_from_totals() {
        let quotes = vec![
            priced("Virtual Machines", "Standard_D2s_v3", 2, Decimal::new(96, 3), "USD"),
            failed("Unknown Service", "X", "No pricing data found for this resource"),
        ];

        let report = CostAggregator::default().aggregate(&quotes);

        assert_eq!(report.breakdown.len(), 2);

        let vm = &report.breakdown[0];
        assert_eq!(vm.resource_label, "Virtual Machines - Standard_D2s_v3");
        assert_eq!(vm.quantity, 2);
        assert_eq!(vm.hourly_cost, Decimal::new(1920, 4));
        assert_eq!(vm.monthly_cost, Decimal::new(14016, 2));
        assert_eq!(vm.yearly_cost, Decimal::new(168192, 2));
        assert_eq!(vm.currency_code.as_deref(), Some("USD"));

        let unknown = &report.breakdown[1];
        assert_eq!(unknown.resource_label, "Unknown Service - X");
        assert_eq!(
            unknown.error.as_deref(),
            Some("No pricing data found for this resource")
        );
        assert_eq!(unknown.quantity, 0);
        assert_eq!(unknown.hourly_cost, Decimal::ZERO);
        assert_eq!(unknown.monthly_cost, Decimal::ZERO);
        assert_eq!(unknown.yearly_cost, Decimal::ZERO);

        assert_eq!(report.summary.total_hourly_cost, vm.hourly_cost);
        assert_eq!(report.summary.total_monthly_cost, vm.monthly_cost);
        assert_eq!(report.summary.total_yearly_cost, vm.yearly_cost);
        assert_eq!(report.summary.currency_code, "USD");
    }

    #[test]
    fn test_line_rounding_precision() {
        let quotes = vec![priced("Storage", "Hot", 2, Decimal::new(33333, 6), "USD")];

        let report = CostAggregator::default().aggregate(&quotes);
        let line = &report.breakdown[0];

        // 0.066666/h
        assert_eq!(line.hourly_cost, Decimal::new(667, 4));
        // 0.066666 * 730 = 48.66618
        assert_eq!(line.monthly_cost, Decimal::new(4867, 2));
        // 0.066666 * 8760 = 583.99416
        assert_eq!(line.yearly_cost, Decimal::new(58399, 2));
    }

    #[test]
    fn test_uses_exact_hour_multipliers() {
        let quotes = vec![priced("Compute", "One", 1, Decimal::ONE, "USD")];

        let report = CostAggregator::default().aggregate(&quotes);

        assert_eq!(report.breakdown[0].monthly_cost, Decimal::from(730));
        assert_eq!(report.breakdown[0].yearly_cost, Decimal::from(8760));
        assert_eq!(report.summary.total_monthly_cost, Decimal::from(730));
        assert_eq!(report.summary.total_yearly_cost, Decimal::from(8760));
    }

    #[test]
    fn test_summary_rounds_unrounded_sums_once() {
        // Each line rounds to 0.0000/h, the summed rate does not.
        let quotes = vec![
            priced("Tiny", "A", 1, Decimal::new(4, 5), "USD"),
            priced("Tiny", "B", 1, Decimal::new(4, 5), "USD"),
            priced("Tiny", "C", 1, Decimal::new(4, 5), "USD"),
        ];

        let report = CostAggregator::default().aggregate(&quotes);

        assert!(report.breakdown.iter().all(|l| l.hourly_cost == Decimal::ZERO));
        assert_eq!(report.summary.total_hourly_cost, Decimal::new(1, 4));
        // 0.00012 * 730 = 0.0876
        assert_eq!(report.summary.total_monthly_cost, Decimal::new(9, 2));
    }

    #[test]
    fn test_recomputes_from_unit_rate_ignoring_upstream_totals() {
        let mut quote = priced("Virtual Machines", "Standard_D2s_v3", 2, Decimal::new(96, 3), "USD");
        if let QuoteOutcome::Priced(details) = &mut quote.outcome {
            details.monthly_cost = Decimal::from(999_999);
            details.yearly_cost = Decimal::ZERO;
        }

        let report = CostAggregator::default().aggregate(&[quote]);

        assert_eq!(report.breakdown[0].monthly_cost, Decimal::new(14016, 2));
        assert_eq!(report.breakdown[0].yearly_cost, Decimal::new(168192, 2));
    }

    #[test]
    fn test_empty_batch_still_has_notes() {
        let report = CostAggregator::default().aggregate(&[]);

        assert!(report.breakdown.is_empty());
        assert_eq!(report.summary, CostSummary::default());
        assert_eq!(report.summary.currency_code, "USD");
        assert_eq!(report.notes.len(), DEFAULT_NOTES.len());
        assert!(report.notes[0].contains("730"));
        assert!(report.notes[1].contains("8760"));
    }

    #[test]
    fn test_all_failed_batch_has_zero_totals() {
        let quotes = vec![
            failed("A", "1", "Catalog returned non-success status: 503"),
            failed("B", "2", "No pricing data found for this resource"),
        ];

        let report = CostAggregator::default().aggregate(&quotes);

        assert_eq!(report.breakdown.len(), 2);
        assert!(report.breakdown.iter().all(CostLineItem::is_error));
        assert_eq!(report.summary, CostSummary::default());
    }

    #[test]
    fn test_last_priced_currency_wins() {
        let quotes = vec![
            priced("A", "1", 1, Decimal::ONE, "EUR"),
            priced("B", "2", 1, Decimal::ONE, "USD"),
            failed("C", "3", "boom"),
        ];

        let report = CostAggregator::default().aggregate(&quotes);

        assert_eq!(report.summary.currency_code, "USD");
        assert_eq!(report.breakdown[0].currency_code.as_deref(), Some("EUR"));
        assert_eq!(report.summary.total_hourly_cost, Decimal::from(2));
    }

    #[test]
    fn test_mixed_currencies_add_warning_note() {
        let quotes = vec![
            priced("A", "1", 1, Decimal::ONE, "USD"),
            priced("B", "2", 1, Decimal::ONE, "EUR"),
        ];

        let report = CostAggregator::default().aggregate(&quotes);

        assert_eq!(report.notes.len(), DEFAULT_NOTES.len() + 1);
        let warning = report.notes.last().unwrap();
        assert!(warning.contains("EUR, USD"));
        assert!(warning.ends_with("labeled EUR"));
    }

    #[test]
    fn test_single_currency_has_only_fixed_notes() {
        let quotes = vec![
            priced("A", "1", 1, Decimal::ONE, "USD"),
            priced("B", "2", 1, Decimal::ONE, "USD"),
        ];

        let report = CostAggregator::default().aggregate(&quotes);
        assert_eq!(report.notes, DEFAULT_NOTES.map(String::from).to_vec());
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let quotes = vec![
            priced("A", "1", 3, Decimal::new(12345, 5), "USD"),
            failed("B", "2", "boom"),
            priced("C", "3", 1, Decimal::new(7, 1), "USD"),
        ];
        let aggregator = CostAggregator::default();

        assert_eq!(aggregator.aggregate(&quotes), aggregator.aggregate(&quotes));
    }

    #[test]
    fn test_injected_notes_replace_defaults() {
        let aggregator = CostAggregator::with_notes(["custom note"]);
        let report = aggregator.aggregate(&[]);

        assert_eq!(report.notes, vec!["custom note".to_string()]);
    }

    fn big(digits: &str) -> Decimal {
        digits.parse().unwrap()
    }

    #[test]
    fn test_overflowing_line_is_error_tagged() {
        let quotes = vec![
            priced("Huge", "X", 4_000_000_000, big("100000000000000000000"), "USD"),
            priced("Compute", "One", 1, Decimal::ONE, "EUR"),
        ];

        let report = CostAggregator::default().aggregate(&quotes);

        assert_eq!(report.breakdown.len(), 2);
        assert_eq!(report.breakdown[0].error.as_deref(), Some(COST_OVERFLOW_ERROR));
        assert_eq!(report.breakdown[0].monthly_cost, Decimal::ZERO);
        assert_eq!(report.breakdown[1].monthly_cost, Decimal::from(730));
        assert_eq!(report.summary.total_monthly_cost, Decimal::from(730));
        assert_eq!(report.summary.currency_code, "EUR");
    }

    #[test]
    fn test_overflowing_running_total_excludes_line() {
        // Each line's yearly cost fits (4.38e28); their sum does not.
        let rate = big("5000000000000000000000000");
        let quotes = vec![
            priced("A", "1", 1, rate, "USD"),
            priced("B", "2", 1, rate, "EUR"),
        ];

        let report = CostAggregator::default().aggregate(&quotes);

        assert!(!report.breakdown[0].is_error());
        assert_eq!(report.breakdown[1].error.as_deref(), Some(COST_OVERFLOW_ERROR));
        assert_eq!(report.summary.total_hourly_cost, rate);
        assert_eq!(report.summary.total_yearly_cost, report.breakdown[0].yearly_cost);
        assert_eq!(report.summary.currency_code, "USD");
        assert_eq!(report.notes.len(), DEFAULT_NOTES.len());
    }

    #[test]
    fn test_zero_quantity_line_is_error_tagged() {
        let mut zero = priced("Storage", "Standard_LRS", 1, Decimal::ONE, "USD");
        zero.quantity = 0;
        let quotes = vec![zero, priced("Compute", "One", 1, Decimal::ONE, "USD")];

        let report = CostAggregator::default().aggregate(&quotes);

        assert_eq!(report.breakdown[0].error.as_deref(), Some(ZERO_QUANTITY_ERROR));
        assert_eq!(report.breakdown[0].resource_label, "Storage - Standard_LRS");
        assert_eq!(report.summary.total_hourly_cost, Decimal::ONE);
    }
}
