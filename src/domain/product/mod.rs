// ============================================================================
// Product Domain - the product-in-progress draft
// ============================================================================
//
// - Value objects (ProductInfo)
// - Commands (ProductDraftCommand)
// - Errors (ProductDraftError)
// - Draft (ProductDraft with variant reconciliation)
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
