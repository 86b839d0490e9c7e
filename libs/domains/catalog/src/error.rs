use thiserror::Error;

use crate::models::CloudProvider;

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur in the catalog domain
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Entity not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// An update run is already in flight for this provider
    #[error("Catalog update already in progress for provider '{0}'")]
    UpdateInProgress(CloudProvider),

    /// An enablement pattern failed to compile
    #[error("Invalid enablement pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// A rating table failed to parse
    #[error("Invalid rating table '{name}': {details}")]
    InvalidRatingTable { name: String, details: String },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Fetched offer data could not be reconciled
    #[error("Offer data error: {0}")]
    OfferData(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
