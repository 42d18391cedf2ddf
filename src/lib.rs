// ============================================================================
// shop_admin - workflow core of an e-commerce admin dashboard
// ============================================================================
//
// - picker      paginated, searchable selection dialogs for reference data
// - domain      order and product drafts over a shared variant store
// - wizard      Information -> Variants -> Preview -> Submitted controller
// - submission  ordered header-then-items backend calls
// - api         AdminApi trait, REST client and in-memory backend
//
// ============================================================================

pub mod api;
pub mod config;
pub mod context;
pub mod domain;
pub mod metrics;
pub mod models;
pub mod notify;
pub mod picker;
pub mod submission;
pub mod wizard;
