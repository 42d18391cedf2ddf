use std::sync::Arc;

use crate::api::AdminApi;
use crate::config::AdminConfig;
use crate::metrics::Metrics;
use crate::notify::Notifier;

// ============================================================================
// Admin Context
// ============================================================================
//
// Explicit bundle of collaborators handed down to pickers, wizards and the
// submission orchestrator. There is no global state; two wizards built from
// two contexts share nothing.
//
// ============================================================================

#[derive(Clone)]
pub struct AdminContext {
    pub api: Arc<dyn AdminApi>,
    pub notifier: Arc<dyn Notifier>,
    pub metrics: Arc<Metrics>,
    pub config: AdminConfig,
}

impl AdminContext {
    pub fn new(
        api: Arc<dyn AdminApi>,
        notifier: Arc<dyn Notifier>,
        metrics: Arc<Metrics>,
        config: AdminConfig,
    ) -> Self {
        Self { api, notifier, metrics, config }
    }

    pub fn page_size(&self) -> u32 {
        self.config.page_size
    }
}
