use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

use crate::api::ApiError;
use crate::context::AdminContext;
use crate::domain::order::OrderDraft;
use crate::domain::product::ProductDraft;
use crate::models::OrderId;
use crate::notify::Notice;

// ============================================================================
// Submission Orchestrator
// ============================================================================
//
// Persists a draft as two ordered backend calls:
//
//   order:   create-order     -> create-line-items(order id)
//   product: create-product   -> create-product-variants(product id)
//
// The second call only runs after the first succeeds, carrying the id it
// returned. The first failure halts the sequence and is reported verbatim.
// Nothing is retried.
//
// If the items of an order fail after its header was saved, the header is
// left in place unless CompensationPolicy::DeleteHeader is configured.
//
// At most one sequence runs per orchestrator; the in-flight flag is
// released on every exit path by InFlightGuard.
//
// ============================================================================

mod errors;

pub use errors::{Compensation, SubmissionError};

pub const ORDER_CREATED: &str = "Order created successfully";
pub const PRODUCT_CREATED: &str = "Product created successfully";

/// Navigation target after a successful submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    OrderList,
    ProductList,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submitted {
    pub kind: String,
    pub id: String,
    pub route: Route,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompensationPolicy {
    #[default]
    Disabled,
    /// Delete the order header when its line items are rejected
    DeleteHeader,
}

struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

pub struct SubmissionOrchestrator {
    ctx: AdminContext,
    compensation: CompensationPolicy,
    in_flight: AtomicBool,
}

impl SubmissionOrchestrator {
    pub fn new(ctx: AdminContext) -> Self {
        let compensation = if ctx.config.compensate_failed_orders {
            CompensationPolicy::DeleteHeader
        } else {
            CompensationPolicy::Disabled
        };
        Self { ctx, compensation, in_flight: AtomicBool::new(false) }
    }

    pub fn with_compensation(mut self, compensation: CompensationPolicy) -> Self {
        self.compensation = compensation;
        self
    }

    pub fn compensation(&self) -> CompensationPolicy {
        self.compensation
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub async fn submit_order(&self, draft: &OrderDraft) -> Result<Submitted, SubmissionError> {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            return Err(self.reject_in_flight("order"));
        };

        let correlation_id = Uuid::new_v4();
        let started = Utc::now();
        let result = self.run_order(draft, correlation_id).await;
        self.finish("order", correlation_id, started, &result);
        result
    }

    pub async fn submit_product(&self, draft: &ProductDraft) -> Result<Submitted, SubmissionError> {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            return Err(self.reject_in_flight("product"));
        };

        let correlation_id = Uuid::new_v4();
        let started = Utc::now();
        let result = self.run_product(draft, correlation_id).await;
        self.finish("product", correlation_id, started, &result);
        result
    }

    async fn run_order(&self, draft: &OrderDraft, correlation_id: Uuid) -> Result<Submitted, SubmissionError> {
        draft
            .validate_information()
            .and_then(|_| draft.validate_items())
            .map_err(|e| self.incomplete(e.to_string()))?;

        let header = draft.header();
        tracing::info!(
            %correlation_id,
            customer = %header.customer_name,
            item_count = draft.lines().len(),
            total = %header.total,
            "Creating order"
        );

        let order_id = match self.ctx.api.create_order(&header).await {
            Ok(order_id) => order_id,
            Err(e) => {
                tracing::warn!(%correlation_id, error = %e, "Order header rejected");
                self.ctx.notifier.notify(Notice::error(e.to_string()));
                return Err(SubmissionError::HeaderRejected(e));
            }
        };

        let items = draft.line_payloads(&order_id);
        tracing::debug!(%correlation_id, %order_id, item_count = items.len(), "Creating order line items");

        if let Err(e) = self.ctx.api.create_line_items(&order_id, &items).await {
            tracing::warn!(%correlation_id, %order_id, error = %e, "Order line items rejected");
            let compensation = self.compensate(&order_id, correlation_id).await;
            self.ctx.notifier.notify(Notice::error(items_failure_message(&e, &order_id, &compensation)));
            return Err(SubmissionError::ItemsRejected {
                parent_id: order_id.to_string(),
                compensation,
                source: e,
            });
        }

        self.ctx.notifier.notify(Notice::success(ORDER_CREATED));
        Ok(Submitted {
            kind: "order".to_string(),
            id: order_id.to_string(),
            route: Route::OrderList,
        })
    }

    async fn run_product(&self, draft: &ProductDraft, correlation_id: Uuid) -> Result<Submitted, SubmissionError> {
        draft
            .validate_information()
            .and_then(|_| draft.validate_variants())
            .map_err(|e| self.incomplete(e.to_string()))?;

        let header = draft.header();
        tracing::info!(
            %correlation_id,
            name = %header.name,
            variant_count = draft.variants().len(),
            "Creating product"
        );

        let product_id = match self.ctx.api.create_product(&header).await {
            Ok(product_id) => product_id,
            Err(e) => {
                tracing::warn!(%correlation_id, error = %e, "Product header rejected");
                self.ctx.notifier.notify(Notice::error(e.to_string()));
                return Err(SubmissionError::HeaderRejected(e));
            }
        };

        let variants = draft.variant_payloads(&product_id);
        if let Err(e) = self.ctx.api.create_product_variants(&product_id, &variants).await {
            tracing::warn!(%correlation_id, %product_id, error = %e, "Product variants rejected");
            self.ctx.notifier.notify(Notice::error(e.to_string()));
            return Err(SubmissionError::ItemsRejected {
                parent_id: product_id.to_string(),
                compensation: Compensation::NotAttempted,
                source: e,
            });
        }

        self.ctx.notifier.notify(Notice::success(PRODUCT_CREATED));
        Ok(Submitted {
            kind: "product".to_string(),
            id: product_id.to_string(),
            route: Route::ProductList,
        })
    }

    async fn compensate(&self, order_id: &OrderId, correlation_id: Uuid) -> Compensation {
        if self.compensation != CompensationPolicy::DeleteHeader {
            tracing::warn!(%correlation_id, %order_id, "Order header left without line items");
            return Compensation::NotAttempted;
        }

        match self.ctx.api.delete_order(order_id).await {
            Ok(()) => {
                tracing::info!(%correlation_id, %order_id, "Order header deleted after failed line items");
                self.ctx.metrics.record_compensation(true);
                Compensation::HeaderDeleted
            }
            Err(e) => {
                tracing::error!(%correlation_id, %order_id, error = %e, "Failed to delete order header");
                self.ctx.metrics.record_compensation(false);
                Compensation::Failed(e.to_string())
            }
        }
    }

    fn incomplete(&self, message: String) -> SubmissionError {
        self.ctx.notifier.notify(Notice::warning(message.clone()));
        SubmissionError::Incomplete(message)
    }

    fn reject_in_flight(&self, kind: &str) -> SubmissionError {
        let err = SubmissionError::InFlight;
        tracing::warn!(kind, "Submission rejected: another one is in flight");
        self.ctx.metrics.submissions.with_label_values(&[kind, err.outcome()]).inc();
        self.ctx.notifier.notify(Notice::warning(err.to_string()));
        err
    }

    fn finish(&self, kind: &str, correlation_id: Uuid, started: DateTime<Utc>, result: &Result<Submitted, SubmissionError>) {
        let elapsed = Utc::now() - started;
        let duration_secs = elapsed.to_std().map(|d| d.as_secs_f64()).unwrap_or_default();
        let outcome = match result {
            Ok(_) => "success",
            Err(e) => e.outcome(),
        };

        self.ctx.metrics.record_submission(kind, outcome, duration_secs);
        tracing::info!(kind, %correlation_id, outcome, duration_ms = elapsed.num_milliseconds(), "Submission finished");
    }
}

fn items_failure_message(error: &ApiError, order_id: &OrderId, compensation: &Compensation) -> String {
    match compensation {
        Compensation::NotAttempted => error.to_string(),
        Compensation::HeaderDeleted => format!("{} (order {} was removed)", error, order_id),
        Compensation::Failed(reason) => {
            format!("{} (order {} could not be removed: {})", error, order_id, reason)
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiCall, Endpoint, InMemoryApi};
    use crate::config::AdminConfig;
    use crate::domain::order::{CustomerInfo, OrderDraftCommand};
    use crate::domain::product::{ProductDraftCommand, ProductInfo};
    use crate::domain::variants::LineInput;
    use crate::metrics::Metrics;
    use crate::models::{Category, Color, Money, Size};
    use crate::notify::{NoticeLevel, NoticeLog};
    use std::sync::Arc;

    fn context(config: AdminConfig) -> (AdminContext, Arc<InMemoryApi>, NoticeLog) {
        let api = Arc::new(InMemoryApi::new());
        let log = NoticeLog::new();
        let ctx = AdminContext::new(api.clone(), Arc::new(log.clone()), Arc::new(Metrics::new().unwrap()), config);
        (ctx, api, log)
    }

    fn order_draft() -> OrderDraft {
        let mut draft = OrderDraft::new();
        draft
            .execute(OrderDraftCommand::SetCustomer(CustomerInfo::new("Jane Doe", "0900000000", "1 Main St")))
            .unwrap();
        draft
            .execute(OrderDraftCommand::AddLine(LineInput::new(
                Color::new("c-red", "Red"),
                Size::new("s-m", "M"),
                2,
                Money::new(10),
            )))
            .unwrap();
        draft
            .execute(OrderDraftCommand::AddLine(LineInput::new(
                Color::new("c-red", "Red"),
                Size::new("s-l", "L"),
                1,
                Money::new(12),
            )))
            .unwrap();
        draft
    }

    fn product_draft() -> ProductDraft {
        let mut draft = ProductDraft::new();
        draft
            .execute(ProductDraftCommand::SetInfo(
                ProductInfo::new("Tee", Money::new(100)).with_category(Category::new("cat-1", "Shirts")),
            ))
            .unwrap();
        draft
            .execute(ProductDraftCommand::AddVariant {
                color: Some(Color::new("c-red", "Red")),
                size: Some(Size::new("s-m", "M")),
                quantity: 4,
            })
            .unwrap();
        draft
    }

    #[tokio::test]
    async fn test_header_failure_halts_before_line_items() {
        let (ctx, api, log) = context(AdminConfig::default());
        api.fail(Endpoint::CreateOrder, "order error").await;
        let orchestrator = SubmissionOrchestrator::new(ctx);

        let result = orchestrator.submit_order(&order_draft()).await;

        let err = result.unwrap_err();
        assert!(matches!(err, SubmissionError::HeaderRejected(ApiError::Rejected(_))));
        assert_eq!(err.to_string(), "order error");
        assert_eq!(log.last().unwrap(), Notice::error("order error"));
        assert!(api.calls_to(Endpoint::CreateLineItems).await.is_empty());
        assert!(!orchestrator.is_submitting());
    }

    #[tokio::test]
    async fn test_line_items_carry_returned_order_id() {
        let (ctx, api, log) = context(AdminConfig::default());
        let orchestrator = SubmissionOrchestrator::new(ctx.clone());

        let submitted = orchestrator.submit_order(&order_draft()).await.unwrap();

        assert_eq!(submitted.id, "order-1");
        assert_eq!(submitted.route, Route::OrderList);

        let calls = api.calls().await;
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].endpoint(), Endpoint::CreateOrder);
        match &calls[1] {
            ApiCall::CreateLineItems { order_id, items } => {
                assert_eq!(order_id.as_str(), "order-1");
                assert_eq!(items.len(), 2);
                assert!(items.iter().all(|i| i.order_id.as_str() == "order-1"));
            }
            other => panic!("unexpected call {:?}", other),
        }

        assert_eq!(log.last().unwrap(), Notice::success(ORDER_CREATED));
        assert_eq!(
            ctx.metrics.submissions.with_label_values(&["order", "success"]).get(),
            1
        );
    }

    #[tokio::test]
    async fn test_header_carries_computed_totals() {
        let (ctx, api, _) = context(AdminConfig::default());
        let orchestrator = SubmissionOrchestrator::new(ctx);
        let mut draft = order_draft();
        draft.execute(OrderDraftCommand::SetShippingCost(Money::new(5))).unwrap();

        orchestrator.submit_order(&draft).await.unwrap();

        match &api.calls_to(Endpoint::CreateOrder).await[0] {
            ApiCall::CreateOrder(header) => {
                assert_eq!(header.subtotal, Money::new(32));
                assert_eq!(header.total, Money::new(37));
            }
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_items_failure_leaves_header_without_compensation() {
        let (ctx, api, log) = context(AdminConfig::default());
        api.fail(Endpoint::CreateLineItems, "stock unavailable").await;
        let orchestrator = SubmissionOrchestrator::new(ctx);

        let err = orchestrator.submit_order(&order_draft()).await.unwrap_err();

        match err {
            SubmissionError::ItemsRejected { parent_id, compensation, .. } => {
                assert_eq!(parent_id, "order-1");
                assert_eq!(compensation, Compensation::NotAttempted);
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(log.last().unwrap(), Notice::error("stock unavailable"));
        assert_eq!(api.order_count().await, 1);
        assert!(api.calls_to(Endpoint::DeleteOrder).await.is_empty());
    }

    #[tokio::test]
    async fn test_items_failure_deletes_header_when_compensating() {
        let config = AdminConfig { compensate_failed_orders: true, ..AdminConfig::default() };
        let (ctx, api, log) = context(config);
        api.fail(Endpoint::CreateLineItems, "stock unavailable").await;
        let orchestrator = SubmissionOrchestrator::new(ctx.clone());
        assert_eq!(orchestrator.compensation(), CompensationPolicy::DeleteHeader);

        let err = orchestrator.submit_order(&order_draft()).await.unwrap_err();

        assert!(matches!(
            err,
            SubmissionError::ItemsRejected { compensation: Compensation::HeaderDeleted, .. }
        ));
        assert_eq!(api.order_count().await, 0);
        assert_eq!(api.calls_to(Endpoint::DeleteOrder).await.len(), 1);
        assert!(log.last().unwrap().message.starts_with("stock unavailable"));
        assert_eq!(ctx.metrics.compensations.with_label_values(&["deleted"]).get(), 1);
    }

    #[tokio::test]
    async fn test_failed_compensation_is_reported() {
        let (ctx, api, _) = context(AdminConfig::default());
        api.fail(Endpoint::CreateLineItems, "stock unavailable").await;
        api.fail(Endpoint::DeleteOrder, "cannot delete").await;
        let orchestrator =
            SubmissionOrchestrator::new(ctx).with_compensation(CompensationPolicy::DeleteHeader);

        let err = orchestrator.submit_order(&order_draft()).await.unwrap_err();

        assert!(matches!(
            err,
            SubmissionError::ItemsRejected { compensation: Compensation::Failed(ref reason), .. } if reason == "cannot delete"
        ));
        assert_eq!(api.order_count().await, 1);
    }

    #[tokio::test]
    async fn test_incomplete_draft_makes_no_calls() {
        let (ctx, api, log) = context(AdminConfig::default());
        let orchestrator = SubmissionOrchestrator::new(ctx);

        let err = orchestrator.submit_order(&OrderDraft::new()).await.unwrap_err();

        assert!(matches!(err, SubmissionError::Incomplete(_)));
        assert!(api.calls().await.is_empty());
        assert_eq!(log.last().unwrap().level, NoticeLevel::Warning);
    }

    #[tokio::test]
    async fn test_concurrent_submit_rejected_while_in_flight() {
        let (ctx, api, log) = context(AdminConfig::default());
        let gate = api.gate(Endpoint::CreateOrder).await;
        let orchestrator = Arc::new(SubmissionOrchestrator::new(ctx));
        let draft = order_draft();

        let first = {
            let orchestrator = orchestrator.clone();
            let draft = draft.clone();
            tokio::spawn(async move { orchestrator.submit_order(&draft).await })
        };

        while api.calls_to(Endpoint::CreateOrder).await.is_empty() {
            tokio::task::yield_now().await;
        }
        assert!(orchestrator.is_submitting());

        let second = orchestrator.submit_order(&draft).await;
        assert!(matches!(second, Err(SubmissionError::InFlight)));
        assert_eq!(api.calls().await.len(), 1);

        gate.notify_one();
        let submitted = first.await.unwrap().unwrap();
        assert_eq!(submitted.id, "order-1");
        assert!(!orchestrator.is_submitting());
        assert_eq!(log.last().unwrap(), Notice::success(ORDER_CREATED));

        gate.notify_one();
        let third = orchestrator.submit_order(&draft).await.unwrap();
        assert_eq!(third.id, "order-2");
    }

    #[tokio::test]
    async fn test_product_submission_flow() {
        let (ctx, api, log) = context(AdminConfig::default());
        let orchestrator = SubmissionOrchestrator::new(ctx);

        let submitted = orchestrator.submit_product(&product_draft()).await.unwrap();

        assert_eq!(submitted.id, "product-1");
        assert_eq!(submitted.route, Route::ProductList);
        let variants = api.product_variants().await;
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].product_id.as_str(), "product-1");
        assert_eq!(variants[0].quantity, 4);
        assert_eq!(log.last().unwrap(), Notice::success(PRODUCT_CREATED));
    }

    #[tokio::test]
    async fn test_product_header_failure_halts() {
        let (ctx, api, log) = context(AdminConfig::default());
        api.fail(Endpoint::CreateProduct, "duplicate product name").await;
        let orchestrator = SubmissionOrchestrator::new(ctx);

        let err = orchestrator.submit_product(&product_draft()).await.unwrap_err();

        assert!(matches!(err, SubmissionError::HeaderRejected(_)));
        assert_eq!(log.last().unwrap(), Notice::error("duplicate product name"));
        assert!(api.calls_to(Endpoint::CreateProductVariants).await.is_empty());
    }
}
