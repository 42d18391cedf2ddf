use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::context::AdminContext;
use crate::metrics::Metrics;
use crate::notify::{Notice, Notifier};
use crate::submission::{Route, SubmissionError, SubmissionOrchestrator, Submitted};

// ============================================================================
// Multi-Step Wizard Controller
// ============================================================================
//
// States:
//   Information -> Variants -> Preview -> Submitted
//
// - next() advances one step after the draft passes the current step's check
// - back() is always allowed before submission
// - Preview only leaves forward through submit(), which enters Submitted
//   once the orchestrator reports full success
//
// The draft lives only inside the wizard. Dropping the wizard (abandon)
// discards it.
//
// ============================================================================

mod errors;

pub use errors::WizardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WizardStep {
    Information,
    Variants,
    Preview,
    Submitted,
}

impl WizardStep {
    pub fn next(self) -> Option<WizardStep> {
        match self {
            WizardStep::Information => Some(WizardStep::Variants),
            WizardStep::Variants => Some(WizardStep::Preview),
            WizardStep::Preview | WizardStep::Submitted => None,
        }
    }

    pub fn previous(self) -> Option<WizardStep> {
        match self {
            WizardStep::Information | WizardStep::Submitted => None,
            WizardStep::Variants => Some(WizardStep::Information),
            WizardStep::Preview => Some(WizardStep::Variants),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WizardStep::Information => "information",
            WizardStep::Variants => "variants",
            WizardStep::Preview => "preview",
            WizardStep::Submitted => "submitted",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An in-progress aggregate a wizard can drive
#[async_trait]
pub trait Draft: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Label used in logs and metrics
    const KIND: &'static str;

    /// Completeness check gating the forward move out of `step`
    fn check_step(&self, step: WizardStep) -> Result<(), Self::Error>;

    /// Run the ordered backend calls that persist this draft
    async fn submit(&self, orchestrator: &SubmissionOrchestrator) -> Result<Submitted, SubmissionError>;
}

pub struct Wizard<D: Draft> {
    step: WizardStep,
    draft: D,
    submitted: Option<Submitted>,
    notifier: Arc<dyn Notifier>,
    metrics: Arc<Metrics>,
}

impl<D: Draft> Wizard<D> {
    pub fn new(draft: D, ctx: &AdminContext) -> Self {
        Self {
            step: WizardStep::Information,
            draft,
            submitted: None,
            notifier: ctx.notifier.clone(),
            metrics: ctx.metrics.clone(),
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn draft(&self) -> &D {
        &self.draft
    }

    /// Mutable access for the current step's form. Closed after submission.
    pub fn draft_mut(&mut self) -> Result<&mut D, WizardError> {
        if self.step == WizardStep::Submitted {
            return Err(WizardError::AlreadySubmitted);
        }
        Ok(&mut self.draft)
    }

    pub fn submitted(&self) -> Option<&Submitted> {
        self.submitted.as_ref()
    }

    /// Where the caller should navigate after a successful submit
    pub fn redirect(&self) -> Option<Route> {
        self.submitted.as_ref().map(|s| s.route)
    }

    pub fn can_go_next(&self) -> bool {
        self.step.next().is_some() && self.draft.check_step(self.step).is_ok()
    }

    pub fn next(&mut self) -> Result<WizardStep, WizardError> {
        let target = match self.step {
            WizardStep::Submitted => return Err(WizardError::AlreadySubmitted),
            WizardStep::Preview => return Err(WizardError::SubmitRequired),
            step => step.next().ok_or(WizardError::SubmitRequired)?,
        };

        self.check(self.step)?;

        tracing::debug!(kind = D::KIND, from = %self.step, to = %target, "Wizard advanced");
        self.step = target;
        Ok(target)
    }

    pub fn back(&mut self) -> Result<WizardStep, WizardError> {
        if self.step == WizardStep::Submitted {
            return Err(WizardError::AlreadySubmitted);
        }
        if let Some(previous) = self.step.previous() {
            tracing::debug!(kind = D::KIND, from = %self.step, to = %previous, "Wizard went back");
            self.step = previous;
        }
        Ok(self.step)
    }

    /// Submit from Preview. The step only becomes Submitted on full success.
    pub async fn submit(&mut self, orchestrator: &SubmissionOrchestrator) -> Result<Route, WizardError> {
        match self.step {
            WizardStep::Preview => {}
            WizardStep::Submitted => return Err(WizardError::AlreadySubmitted),
            step => return Err(WizardError::NotAtPreview(step)),
        }

        self.check(WizardStep::Preview)?;

        let submitted = self.draft.submit(orchestrator).await?;
        let route = submitted.route;
        tracing::info!(kind = D::KIND, id = %submitted.id, route = ?route, "Wizard submitted");
        self.submitted = Some(submitted);
        self.step = WizardStep::Submitted;
        Ok(route)
    }

    /// Discard the wizard and its draft
    pub fn abandon(self) {
        tracing::debug!(kind = D::KIND, step = %self.step, "Wizard abandoned");
    }

    fn check(&self, step: WizardStep) -> Result<(), WizardError> {
        if let Err(e) = self.draft.check_step(step) {
            tracing::debug!(kind = D::KIND, step = %step, reason = %e, "Wizard step incomplete");
            self.metrics.record_blocked_transition(D::KIND, step.as_str());
            self.notifier.notify(Notice::warning(e.to_string()));
            return Err(WizardError::Incomplete { step, source: Box::new(e) });
        }
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Endpoint, InMemoryApi};
    use crate::config::AdminConfig;
    use crate::domain::order::{CustomerInfo, OrderDraft, OrderDraftCommand};
    use crate::domain::product::{ProductDraft, ProductDraftCommand, ProductInfo};
    use crate::domain::variants::LineInput;
    use crate::models::{Category, Color, Money, Size};
    use crate::notify::{NoticeLevel, NoticeLog};

    fn context() -> (AdminContext, Arc<InMemoryApi>, NoticeLog) {
        let api = Arc::new(InMemoryApi::new());
        let log = NoticeLog::new();
        let ctx = AdminContext::new(
            api.clone(),
            Arc::new(log.clone()),
            Arc::new(Metrics::new().unwrap()),
            AdminConfig::default(),
        );
        (ctx, api, log)
    }

    fn fill_customer(wizard: &mut Wizard<OrderDraft>) {
        wizard
            .draft_mut()
            .unwrap()
            .execute(OrderDraftCommand::SetCustomer(CustomerInfo::new("Jane", "090", "1 Main St")))
            .unwrap();
    }

    fn add_line(wizard: &mut Wizard<OrderDraft>) {
        wizard
            .draft_mut()
            .unwrap()
            .execute(OrderDraftCommand::AddLine(LineInput::new(
                Color::new("c-red", "Red"),
                Size::new("s-m", "M"),
                1,
                Money::new(10),
            )))
            .unwrap();
    }

    #[test]
    fn test_step_sequence() {
        assert_eq!(WizardStep::Information.next(), Some(WizardStep::Variants));
        assert_eq!(WizardStep::Variants.next(), Some(WizardStep::Preview));
        assert_eq!(WizardStep::Preview.next(), None);
        assert_eq!(WizardStep::Information.previous(), None);
        assert_eq!(WizardStep::Submitted.previous(), None);
    }

    #[test]
    fn test_next_blocked_until_information_complete() {
        let (ctx, _, log) = context();
        let mut wizard = Wizard::new(OrderDraft::new(), &ctx);

        let result = wizard.next();

        assert!(matches!(
            result,
            Err(WizardError::Incomplete { step: WizardStep::Information, .. })
        ));
        assert_eq!(wizard.step(), WizardStep::Information);
        assert!(!wizard.can_go_next());
        assert_eq!(log.last().unwrap().level, NoticeLevel::Warning);
        assert_eq!(log.last().unwrap().message, "Customer name cannot be empty");
        assert_eq!(
            ctx.metrics
                .wizard_blocked_transitions
                .with_label_values(&["order", "information"])
                .get(),
            1
        );

        fill_customer(&mut wizard);
        assert_eq!(wizard.next().unwrap(), WizardStep::Variants);
    }

    #[test]
    fn test_variants_step_requires_items_and_back_is_free() {
        let (ctx, _, _) = context();
        let mut wizard = Wizard::new(OrderDraft::new(), &ctx);
        fill_customer(&mut wizard);
        wizard.next().unwrap();

        assert!(wizard.next().is_err());
        assert_eq!(wizard.back().unwrap(), WizardStep::Information);
        assert_eq!(wizard.back().unwrap(), WizardStep::Information);

        wizard.next().unwrap();
        add_line(&mut wizard);
        assert_eq!(wizard.next().unwrap(), WizardStep::Preview);
        assert!(matches!(wizard.next(), Err(WizardError::SubmitRequired)));
    }

    #[test]
    fn test_draft_persists_across_back_and_forth() {
        let (ctx, _, _) = context();
        let mut wizard = Wizard::new(OrderDraft::new(), &ctx);
        fill_customer(&mut wizard);
        wizard.next().unwrap();
        add_line(&mut wizard);
        wizard.next().unwrap();

        wizard.back().unwrap();
        wizard.back().unwrap();
        wizard.next().unwrap();

        assert_eq!(wizard.draft().lines().len(), 1);
        assert_eq!(wizard.draft().customer().name, "Jane");
    }

    #[tokio::test]
    async fn test_submit_only_from_preview() {
        let (ctx, api, _) = context();
        let orchestrator = SubmissionOrchestrator::new(ctx.clone());
        let mut wizard = Wizard::new(OrderDraft::new(), &ctx);
        fill_customer(&mut wizard);

        let result = wizard.submit(&orchestrator).await;

        assert!(matches!(result, Err(WizardError::NotAtPreview(WizardStep::Information))));
        assert!(api.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_successful_submit_enters_submitted() {
        let (ctx, _, _) = context();
        let orchestrator = SubmissionOrchestrator::new(ctx.clone());
        let mut wizard = Wizard::new(OrderDraft::new(), &ctx);
        fill_customer(&mut wizard);
        wizard.next().unwrap();
        add_line(&mut wizard);
        wizard.next().unwrap();

        let route = wizard.submit(&orchestrator).await.unwrap();

        assert_eq!(route, Route::OrderList);
        assert_eq!(wizard.step(), WizardStep::Submitted);
        assert_eq!(wizard.redirect(), Some(Route::OrderList));
        assert!(matches!(wizard.back(), Err(WizardError::AlreadySubmitted)));
        assert!(matches!(wizard.draft_mut(), Err(WizardError::AlreadySubmitted)));
    }

    #[tokio::test]
    async fn test_failed_submit_stays_on_preview() {
        let (ctx, api, _) = context();
        api.fail(Endpoint::CreateOrder, "order error").await;
        let orchestrator = SubmissionOrchestrator::new(ctx.clone());
        let mut wizard = Wizard::new(OrderDraft::new(), &ctx);
        fill_customer(&mut wizard);
        wizard.next().unwrap();
        add_line(&mut wizard);
        wizard.next().unwrap();

        let result = wizard.submit(&orchestrator).await;

        assert!(matches!(
            result,
            Err(WizardError::Submission(SubmissionError::HeaderRejected(_)))
        ));
        assert_eq!(wizard.step(), WizardStep::Preview);
        assert_eq!(wizard.redirect(), None);
    }

    #[tokio::test]
    async fn test_product_wizard_end_to_end() {
        let (ctx, api, _) = context();
        let orchestrator = SubmissionOrchestrator::new(ctx.clone());
        let mut wizard = Wizard::new(ProductDraft::new(), &ctx);

        wizard
            .draft_mut()
            .unwrap()
            .execute(ProductDraftCommand::SetInfo(
                ProductInfo::new("Tee", Money::new(100)).with_category(Category::new("cat-1", "Shirts")),
            ))
            .unwrap();
        wizard.next().unwrap();
        wizard
            .draft_mut()
            .unwrap()
            .execute(ProductDraftCommand::AddVariant {
                color: Some(Color::new("c-red", "Red")),
                size: Some(Size::new("s-m", "M")),
                quantity: 5,
            })
            .unwrap();
        wizard.next().unwrap();

        let route = wizard.submit(&orchestrator).await.unwrap();

        assert_eq!(route, Route::ProductList);
        assert_eq!(api.product_variants().await.len(), 1);
    }
}
