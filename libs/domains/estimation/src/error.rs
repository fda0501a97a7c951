use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::catalog::CatalogError;

/// Result type for estimation operations
pub type EstimationResult<T> = Result<T, EstimationError>;

/// Errors that abort a whole estimation request.
///
/// Per-resource lookup problems never show up here; they are folded into the
/// affected quote as an `error` string (see [`ResolutionError`]).
#[derive(Debug, Error)]
pub enum EstimationError {
    /// The caller sent a malformed batch (missing list, invalid descriptor)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Diagram analysis backend failed
    #[error("Diagram analysis failed: {0}")]
    Analysis(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for EstimationError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            EstimationError::InvalidInput(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            EstimationError::Analysis(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
            EstimationError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": message,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

/// Line error for a cost projection that does not fit in a `Decimal`
pub const COST_OVERFLOW_ERROR: &str = "Cost exceeds representable range";

/// Line error for a priced record that claims zero instances
pub const ZERO_QUANTITY_ERROR: &str = "quantity must be at least 1";

/// Why a single descriptor could not be priced.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// Transport failure or non-success response from the catalog
    #[error(transparent)]
    Lookup(#[from] CatalogError),

    /// The catalog answered but nothing matched the filter
    #[error("No pricing data found for this resource")]
    NoMatch,

    /// The matched rate times the quantity overflows
    #[error("Cost exceeds representable range")]
    CostOverflow,
}

impl ResolutionError {
    /// Metric/log label for this failure class
    pub fn kind(&self) -> &'static str {
        match self {
            ResolutionError::Lookup(_) => "lookup_failure",
            ResolutionError::NoMatch => "no_match",
            ResolutionError::CostOverflow => "cost_overflow",
        }
    }
}
