use crate::domain::variants::VariantError;
use crate::models::Money;

// ============================================================================
// Product Draft Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProductDraftError {
    #[error("Product name cannot be empty")]
    EmptyName,

    #[error("Price must be greater than 0")]
    InvalidPrice,

    #[error("Sale price {sale} cannot exceed price {price}")]
    SalePriceAbovePrice { sale: Money, price: Money },

    #[error("Please choose a category")]
    MissingCategory,

    #[error("Product must have at least one variant")]
    NoVariants,

    #[error(transparent)]
    Variant(#[from] VariantError),
}
