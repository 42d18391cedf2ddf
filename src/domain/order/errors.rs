use crate::domain::variants::VariantError;

// ============================================================================
// Order Draft Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderDraftError {
    #[error("Customer name cannot be empty")]
    EmptyCustomerName,

    #[error("Phone number cannot be empty")]
    EmptyPhone,

    #[error("Invalid email format: {0}")]
    InvalidEmail(String),

    #[error("Shipping address cannot be empty")]
    EmptyAddress,

    #[error("Shipping cost cannot be negative")]
    NegativeShippingCost,

    #[error("Discount cannot be negative")]
    NegativeDiscount,

    #[error("Order must contain at least one item")]
    NoItems,

    #[error(transparent)]
    Variant(#[from] VariantError),
}
