// ============================================================================
// Order Domain - the order-in-progress draft
// ============================================================================
//
// - Value objects (CustomerInfo, PaymentMethod, OrderStatus)
// - Commands (OrderDraftCommand)
// - Errors (OrderDraftError)
// - Draft (OrderDraft with line items and always-fresh totals)
//
// ============================================================================

pub mod value_objects;
pub mod commands;
pub mod errors;
pub mod draft;

pub use value_objects::*;
pub use commands::*;
pub use errors::*;
pub use draft::*;
