use super::value_objects::VariantKey;

// ============================================================================
// Variant Store Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VariantError {
    #[error("Please choose a color")]
    MissingColor,

    #[error("Please choose a size")]
    MissingSize,

    #[error("Quantity must be greater than 0 (got {0})")]
    InvalidQuantity(i64),

    #[error("Unit price cannot be negative")]
    NegativePrice,

    #[error("Amount is too large")]
    AmountOverflow,

    #[error("Variant {0} has already been added")]
    Duplicate(VariantKey),

    #[error("Variant {0} not found")]
    NotFound(VariantKey),

    #[error("No variant at position {index} (have {len})")]
    IndexOutOfRange { index: usize, len: usize },
}
