use crate::domain::variants::{LineInput, QuantityChange, VariantKey};
use crate::models::{Color, Money, Size};
use super::value_objects::{CustomerInfo, OrderStatus, PaymentMethod};

// ============================================================================
// Order Draft Commands - every way a wizard step can change the draft
// ============================================================================

#[derive(Debug, Clone)]
pub enum OrderDraftCommand {
    SetCustomer(CustomerInfo),
    SetPaymentMethod(PaymentMethod),
    SetStatus(OrderStatus),
    SetShippingCost(Money),
    SetDiscount(Money),
    SetNote(String),
    SelectColor(Color),
    SelectSize(Size),
    ClearSelection,
    AddLine(LineInput),
    /// Add the pair chosen in the pickers
    AddSelected {
        quantity: i64,
        unit_price: Money,
    },
    EditLine {
        index: usize,
        line: LineInput,
    },
    RemoveLine(VariantKey),
    AdjustQuantity {
        key: VariantKey,
        change: QuantityChange,
    },
}
