// ============================================================================
// Variant Reconciliation - shared by the order and product drafts
// ============================================================================
//
// - Value objects (LineItem, VariantKey, QuantityChange, DuplicatePolicy)
// - Errors (VariantError)
// - Store (VariantStore, the keyed ordered collection)
//
// ============================================================================

pub mod value_objects;
pub mod errors;
pub mod store;

pub use value_objects::*;
pub use errors::*;
pub use store::*;
