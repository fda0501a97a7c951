//! Cost Estimation Domain
//!
//! Prices abstract resource descriptors against a public retail catalog and
//! rolls the results into a cost report.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │   Service   │  ← Batch validation, tool surface
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐      ┌────────────┐
//! │  Resolver   │ ───▶ │  Catalog   │  ← Retail Prices API (first page only)
//! └──────┬──────┘      └────────────┘
//!        │ PriceQuote (priced | failed)
//! ┌──────▼──────┐
//! │ Aggregator  │  ← Totals, breakdown, advisory notes
//! └─────────────┘
//! ```
//!
//! One descriptor always yields one quote and one breakdown line, in input
//! order. Lookup failures are captured per quote and never abort a batch.

pub mod aggregator;
pub mod catalog;
pub mod diagram;
pub mod error;
pub mod handlers;
pub mod models;
pub mod resolver;
pub mod service;
pub mod tools;

// Re-export commonly used types
pub use aggregator::{CostAggregator, DEFAULT_NOTES};
pub use catalog::{
    CatalogClient, CatalogConfig, CatalogError, CatalogFilter, CatalogItem, RetailPricesClient,
};
pub use diagram::{DiagramAnalyzer, ImageType, PlaceholderDiagramAnalyzer};
pub use error::{EstimationError, EstimationResult, ResolutionError};
pub use models::{
    CostCalculation, CostLineItem, CostReport, CostSummary, PriceQuote, PricedDetails,
    PricingAnalysis, QuoteOutcome, ResourceDescriptor, HOURS_PER_MONTH, HOURS_PER_YEAR,
};
pub use resolver::{PricingResolver, DEFAULT_MAX_CONCURRENCY};
pub use service::EstimationService;
pub use tools::{available_tools, SchemaNode, ToolDescriptor};
