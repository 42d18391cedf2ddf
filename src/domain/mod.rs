// ============================================================================
// Domain Layer - Drafts and their business rules
// ============================================================================
//
// Each draft has its own subdirectory with:
// - Value objects
// - Commands
// - Errors
// - Draft implementation
//
// Both drafts build on the shared variant reconciliation store.
//
// ============================================================================

pub mod variants;
pub mod order;
pub mod product;
