use crate::domain::variants::{QuantityChange, VariantKey};
use crate::models::{Color, Size};
use super::value_objects::ProductInfo;

// ============================================================================
// Product Draft Commands
// ============================================================================
//
// Variant commands carry no price: every variant is priced from the
// product's effective price.
//
// ============================================================================

#[derive(Debug, Clone)]
pub enum ProductDraftCommand {
    SetInfo(ProductInfo),
    SelectColor(Color),
    SelectSize(Size),
    ClearSelection,
    AddVariant {
        color: Option<Color>,
        size: Option<Size>,
        quantity: i64,
    },
    /// Add the pair chosen in the pickers
    AddSelected {
        quantity: i64,
    },
    EditVariant {
        index: usize,
        color: Option<Color>,
        size: Option<Size>,
        quantity: i64,
    },
    RemoveVariant(VariantKey),
    AdjustQuantity {
        key: VariantKey,
        change: QuantityChange,
    },
}
