use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::{NewOrderLine, OrderHeader};
use crate::domain::variants::{DuplicatePolicy, LineItem, VariantError, VariantStore};
use crate::models::{Money, OrderId};
use crate::submission::{SubmissionError, SubmissionOrchestrator, Submitted};
use crate::wizard::{Draft, WizardStep};
use super::commands::OrderDraftCommand;
use super::errors::OrderDraftError;
use super::value_objects::{CustomerInfo, OrderStatus, PaymentMethod};

// ============================================================================
// Order Draft - the order-in-progress aggregate
// ============================================================================
//
// Invariant: totals == compute_totals(lines, shipping_cost, discount) after
// every successful command. Fields are private so the only way to change a
// draft is through apply()/execute(), which always recompute.
//
// Duplicate (product, color, size) picks merge into the existing line.
//
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub total: Money,
}

/// Pure total computation: subtotal of line totals, plus shipping, minus
/// discount, floored at zero. `None` if the sum does not fit in `Money`.
pub fn compute_totals(lines: &[LineItem], shipping_cost: Money, discount: Money) -> Option<OrderTotals> {
    let subtotal = lines
        .iter()
        .try_fold(Money::ZERO, |acc, l| acc.checked_add(l.total))?;
    let total = subtotal.checked_add(shipping_cost)?.saturating_sub(discount);
    Some(OrderTotals { subtotal, total })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    customer: CustomerInfo,
    payment_method: PaymentMethod,
    status: OrderStatus,
    shipping_cost: Money,
    discount: Money,
    note: String,
    lines: VariantStore,
    totals: OrderTotals,
}

impl Default for OrderDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderDraft {
    pub fn new() -> Self {
        Self {
            customer: CustomerInfo::default(),
            payment_method: PaymentMethod::default(),
            status: OrderStatus::default(),
            shipping_cost: Money::ZERO,
            discount: Money::ZERO,
            note: String::new(),
            lines: VariantStore::new(DuplicatePolicy::Merge),
            totals: OrderTotals::default(),
        }
    }

    pub fn customer(&self) -> &CustomerInfo {
        &self.customer
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn shipping_cost(&self) -> Money {
        self.shipping_cost
    }

    pub fn discount(&self) -> Money {
        self.discount
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn lines(&self) -> &VariantStore {
        &self.lines
    }

    pub fn subtotal(&self) -> Money {
        self.totals.subtotal
    }

    pub fn total(&self) -> Money {
        self.totals.total
    }

    pub fn totals(&self) -> OrderTotals {
        self.totals
    }

    /// Apply a command and return the resulting snapshot; `self` is untouched
    pub fn apply(&self, command: OrderDraftCommand) -> Result<Self, OrderDraftError> {
        let mut next = self.clone();
        next.mutate(command)?;
        next.totals = compute_totals(next.lines.entries(), next.shipping_cost, next.discount)
            .ok_or(VariantError::AmountOverflow)?;
        Ok(next)
    }

    /// Apply a command in place. On error the draft is unchanged.
    pub fn execute(&mut self, command: OrderDraftCommand) -> Result<(), OrderDraftError> {
        *self = self.apply(command)?;
        Ok(())
    }

    fn mutate(&mut self, command: OrderDraftCommand) -> Result<(), OrderDraftError> {
        match command {
            OrderDraftCommand::SetCustomer(customer) => {
                self.customer = customer;
            }
            OrderDraftCommand::SetPaymentMethod(method) => {
                self.payment_method = method;
            }
            OrderDraftCommand::SetStatus(status) => {
                self.status = status;
            }
            OrderDraftCommand::SetShippingCost(cost) => {
                if cost.amount() < 0 {
                    return Err(OrderDraftError::NegativeShippingCost);
                }
                self.shipping_cost = cost;
            }
            OrderDraftCommand::SetDiscount(discount) => {
                if discount.amount() < 0 {
                    return Err(OrderDraftError::NegativeDiscount);
                }
                self.discount = discount;
            }
            OrderDraftCommand::SetNote(note) => {
                self.note = note;
            }
            OrderDraftCommand::SelectColor(color) => self.lines.select_color(color),
            OrderDraftCommand::SelectSize(size) => self.lines.select_size(size),
            OrderDraftCommand::ClearSelection => self.lines.clear_selection(),
            OrderDraftCommand::AddLine(line) => {
                self.lines.add_variant(line)?;
            }
            OrderDraftCommand::AddSelected { quantity, unit_price } => {
                self.lines.add_selected(quantity, unit_price)?;
            }
            OrderDraftCommand::EditLine { index, line } => {
                self.lines.edit_variant(index, line)?;
            }
            OrderDraftCommand::RemoveLine(key) => {
                self.lines.remove_variant(&key)?;
            }
            OrderDraftCommand::AdjustQuantity { key, change } => {
                self.lines.adjust_quantity(&key, change)?;
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Step checks
    // ------------------------------------------------------------------

    pub fn validate_information(&self) -> Result<(), OrderDraftError> {
        let customer = &self.customer;
        if customer.name.trim().is_empty() {
            return Err(OrderDraftError::EmptyCustomerName);
        }
        if customer.phone.trim().is_empty() {
            return Err(OrderDraftError::EmptyPhone);
        }
        let email = customer.email.trim();
        if !email.is_empty() && !is_plausible_email(email) {
            return Err(OrderDraftError::InvalidEmail(email.to_string()));
        }
        if customer.address.trim().is_empty() {
            return Err(OrderDraftError::EmptyAddress);
        }
        Ok(())
    }

    pub fn validate_items(&self) -> Result<(), OrderDraftError> {
        if self.lines.is_empty() {
            return Err(OrderDraftError::NoItems);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Request payloads
    // ------------------------------------------------------------------

    pub fn header(&self) -> OrderHeader {
        let email = self.customer.email.trim();
        OrderHeader {
            customer_name: self.customer.name.trim().to_string(),
            phone: self.customer.phone.trim().to_string(),
            email: (!email.is_empty()).then(|| email.to_string()),
            address: self.customer.address.trim().to_string(),
            payment_method: self.payment_method,
            status: self.status,
            shipping_cost: self.shipping_cost,
            discount: self.discount,
            subtotal: self.totals.subtotal,
            total: self.totals.total,
            note: (!self.note.is_empty()).then(|| self.note.clone()),
            ordered_at: Utc::now(),
        }
    }

    /// Line items stamped with the order id returned by the header request
    pub fn line_payloads(&self, order_id: &OrderId) -> Vec<NewOrderLine> {
        self.lines
            .entries()
            .iter()
            .map(|line| NewOrderLine {
                order_id: order_id.clone(),
                product_id: line.product.as_ref().map(|p| p.id.clone()),
                color_id: line.color.id.clone(),
                size_id: line.size.id.clone(),
                quantity: line.quantity,
                unit_price: line.unit_price,
                total: line.total,
            })
            .collect()
    }
}

fn is_plausible_email(email: &str) -> bool {
    email.contains('@')
}

#[async_trait]
impl Draft for OrderDraft {
    type Error = OrderDraftError;

    const KIND: &'static str = "order";

    fn check_step(&self, step: WizardStep) -> Result<(), Self::Error> {
        match step {
            WizardStep::Information => self.validate_information(),
            WizardStep::Variants => self.validate_items(),
            WizardStep::Preview => {
                self.validate_information()?;
                self.validate_items()
            }
            WizardStep::Submitted => Ok(()),
        }
    }

    async fn submit(&self, orchestrator: &SubmissionOrchestrator) -> Result<Submitted, SubmissionError> {
        orchestrator.submit_order(self).await
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
