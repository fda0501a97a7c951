//! Pricing Resolver
//!
//! Maps each [`ResourceDescriptor`] to exactly one [`PriceQuote`]. A failed
//! lookup only ever affects its own quote.

use futures::stream::{self, StreamExt};
use observability::EstimationMetrics;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

use crate::catalog::{CatalogClient, CatalogFilter, CatalogItem};
use crate::error::ResolutionError;
use crate::models::{project_costs, PriceQuote, PricedDetails, ResourceDescriptor};

/// Concurrent catalog lookups per batch when not configured
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Resolves descriptors against a catalog
pub struct PricingResolver<C: CatalogClient> {
    catalog: Arc<C>,
    max_concurrency: usize,
}

impl<C: CatalogClient> Clone for PricingResolver<C> {
    fn clone(&self) -> Self {
        Self {
            catalog: self.catalog.clone(),
            max_concurrency: self.max_concurrency,
        }
    }
}

impl<C: CatalogClient> PricingResolver<C> {
    pub fn new(catalog: C) -> Self {
        Self::from_arc(Arc::new(catalog))
    }

    pub fn from_arc(catalog: Arc<C>) -> Self {
        Self {
            catalog,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    /// Bound the number of in-flight lookups in [`Self::resolve_batch`]
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Price one descriptor. Never fails: lookup problems become an error-tagged quote.
    #[instrument(skip(self, descriptor), fields(resource = %descriptor.label(), region = %descriptor.region))]
    pub async fn resolve(&self, descriptor: &ResourceDescriptor) -> PriceQuote {
        let start = Instant::now();

        let priced = self
            .lookup(descriptor)
            .await
            .and_then(|item| price_details(item, descriptor.quantity));

        let (quote, outcome) = match priced {
            Ok(details) => (PriceQuote::priced(descriptor, details), "priced"),
            Err(e) => {
                warn!(error = %e, kind = e.kind(), "Failed to resolve price");
                (PriceQuote::failed(descriptor, e.to_string()), e.kind())
            }
        };

        EstimationMetrics::record_resolution(outcome, start.elapsed().as_secs_f64());
        quote
    }

    /// Price every descriptor; output order always matches input order.
    pub async fn resolve_batch(&self, descriptors: &[ResourceDescriptor]) -> Vec<PriceQuote> {
        info!(count = descriptors.len(), "Fetching pricing for resources");
        let start = Instant::now();

        let lookups: Vec<_> = descriptors.iter().map(|d| self.resolve(d)).collect();
        let quotes: Vec<PriceQuote> = stream::iter(lookups)
            .buffered(self.max_concurrency)
            .collect()
            .await;

        let failed = quotes.iter().filter(|q| !q.is_priced()).count();
        EstimationMetrics::record_batch_resolved(
            quotes.len(),
            failed,
            start.elapsed().as_secs_f64(),
        );

        quotes
    }

    /// Single catalog query; the first returned item wins.
    async fn lookup(&self, descriptor: &ResourceDescriptor) -> Result<CatalogItem, ResolutionError> {
        let filter = CatalogFilter::for_descriptor(descriptor);
        let items = self.catalog.query(&filter).await?;
        items.into_iter().next().ok_or(ResolutionError::NoMatch)
    }
}

/// Catalog prices are per-hour retail rates, so the hourly cost is the retail price.
fn price_details(item: CatalogItem, quantity: u32) -> Result<PricedDetails, ResolutionError> {
    let hourly_cost = item.retail_price;
    let costs = project_costs(hourly_cost, quantity).ok_or(ResolutionError::CostOverflow)?;

    Ok(PricedDetails {
        unit_of_measure: item.unit_of_measure,
        retail_price: item.retail_price,
        unit_price: item.unit_price,
        currency_code: item.currency_code,
        hourly_cost,
        monthly_cost: costs.monthly,
        yearly_cost: costs.yearly,
        product_name: Some(item.product_name),
        meter_name: Some(item.meter_name),
    })
}
