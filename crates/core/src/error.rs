//! Engine error model.

use thiserror::Error;

use crate::id::ProductId;

/// Result type used across the engine.
pub type EngineResult<T> = Result<T, EngineError>;

/// Engine-level error.
///
/// Keep this focused on deterministic input/configuration failures. File IO
/// is wrapped by the infra `DatasetError`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The product has no historical demand, so there is nothing to seed
    /// `current_stock` from.
    #[error("product {0} has no historical demand")]
    NotFound(ProductId),

    /// The product is unknown to the time-series store or has no stock state.
    #[error("unknown product: {0}")]
    MissingProduct(ProductId),

    /// A month failed to parse, or a quantity is non-numeric / out of contract.
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    /// Risk thresholds or the reorder window are invalid.
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

impl EngineError {
    pub fn not_found(product_id: &ProductId) -> Self {
        Self::NotFound(product_id.clone())
    }

    pub fn missing_product(product_id: &ProductId) -> Self {
        Self::MissingProduct(product_id.clone())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedRecord(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Short machine-readable kind, used in logs and failure summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::NotFound(_) => "not_found",
            EngineError::MissingProduct(_) => "missing_product",
            EngineError::MalformedRecord(_) => "malformed_record",
            EngineError::Configuration(_) => "configuration",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_product() {
        let id = ProductId::new("42");
        assert_eq!(
            EngineError::not_found(&id).to_string(),
            "product 42 has no historical demand"
        );
        assert_eq!(EngineError::missing_product(&id).to_string(), "unknown product: 42");
        assert_eq!(EngineError::missing_product(&id).kind(), "missing_product");
    }
}
