use async_trait::async_trait;

use crate::api::{NewProductVariant, ProductHeader};
use crate::domain::variants::{DuplicatePolicy, LineInput, VariantError, VariantStore};
use crate::models::{CategoryId, Color, Money, ProductId, Size};
use crate::submission::{SubmissionError, SubmissionOrchestrator, Submitted};
use crate::wizard::{Draft, WizardStep};
use super::commands::ProductDraftCommand;
use super::errors::ProductDraftError;
use super::value_objects::ProductInfo;

// ============================================================================
// Product Draft - the product-in-progress aggregate
// ============================================================================
//
// Variants are (color, size, stock) tuples priced from the product's
// effective price. A (color, size) pair can be added once; picking it again
// is rejected rather than merged.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    info: ProductInfo,
    variants: VariantStore,
    stock_value: Money,
}

impl Default for ProductDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductDraft {
    pub fn new() -> Self {
        Self {
            info: ProductInfo::default(),
            variants: VariantStore::new(DuplicatePolicy::Reject),
            stock_value: Money::ZERO,
        }
    }

    pub fn info(&self) -> &ProductInfo {
        &self.info
    }

    pub fn variants(&self) -> &VariantStore {
        &self.variants
    }

    /// Units across all variants
    pub fn total_stock(&self) -> u64 {
        self.variants.total_quantity()
    }

    /// Sum of variant totals at the effective price
    pub fn stock_value(&self) -> Money {
        self.stock_value
    }

    pub fn apply(&self, command: ProductDraftCommand) -> Result<Self, ProductDraftError> {
        let mut next = self.clone();
        next.mutate(command)?;
        next.stock_value = next.variants.checked_subtotal().ok_or(VariantError::AmountOverflow)?;
        Ok(next)
    }

    pub fn execute(&mut self, command: ProductDraftCommand) -> Result<(), ProductDraftError> {
        *self = self.apply(command)?;
        Ok(())
    }

    fn mutate(&mut self, command: ProductDraftCommand) -> Result<(), ProductDraftError> {
        match command {
            ProductDraftCommand::SetInfo(info) => {
                let repriced = info.effective_price() != self.info.effective_price();
                self.info = info;
                if repriced {
                    self.variants.reprice(self.info.effective_price())?;
                }
            }
            ProductDraftCommand::SelectColor(color) => self.variants.select_color(color),
            ProductDraftCommand::SelectSize(size) => self.variants.select_size(size),
            ProductDraftCommand::ClearSelection => self.variants.clear_selection(),
            ProductDraftCommand::AddVariant { color, size, quantity } => {
                let input = self.variant_input(color, size, quantity);
                self.variants.add_variant(input)?;
            }
            ProductDraftCommand::AddSelected { quantity } => {
                self.variants.add_selected(quantity, self.info.effective_price())?;
            }
            ProductDraftCommand::EditVariant { index, color, size, quantity } => {
                let input = self.variant_input(color, size, quantity);
                self.variants.edit_variant(index, input)?;
            }
            ProductDraftCommand::RemoveVariant(key) => {
                self.variants.remove_variant(&key)?;
            }
            ProductDraftCommand::AdjustQuantity { key, change } => {
                self.variants.adjust_quantity(&key, change)?;
            }
        }
        Ok(())
    }

    fn variant_input(&self, color: Option<Color>, size: Option<Size>, quantity: i64) -> LineInput {
        LineInput {
            product: None,
            color,
            size,
            quantity,
            unit_price: self.info.effective_price(),
        }
    }

    pub fn validate_information(&self) -> Result<(), ProductDraftError> {
        if self.info.name.trim().is_empty() {
            return Err(ProductDraftError::EmptyName);
        }
        if !self.info.price.is_positive() {
            return Err(ProductDraftError::InvalidPrice);
        }
        if let Some(sale) = self.info.sale_price {
            if sale > self.info.price {
                return Err(ProductDraftError::SalePriceAbovePrice { sale, price: self.info.price });
            }
        }
        if self.info.category.is_none() {
            return Err(ProductDraftError::MissingCategory);
        }
        Ok(())
    }

    pub fn validate_variants(&self) -> Result<(), ProductDraftError> {
        if self.variants.is_empty() {
            return Err(ProductDraftError::NoVariants);
        }
        Ok(())
    }

    pub fn header(&self) -> ProductHeader {
        ProductHeader {
            name: self.info.name.trim().to_string(),
            description: self.info.description.clone(),
            price: self.info.price,
            sale_price: self.info.sale_price,
            category_id: self
                .info
                .category
                .as_ref()
                .map(|c| c.id.clone())
                .unwrap_or_else(|| CategoryId::new("")),
        }
    }

    pub fn variant_payloads(&self, product_id: &ProductId) -> Vec<NewProductVariant> {
        self.variants
            .entries()
            .iter()
            .map(|v| NewProductVariant {
                product_id: product_id.clone(),
                color_id: v.color.id.clone(),
                size_id: v.size.id.clone(),
                quantity: v.quantity,
                price: v.unit_price,
            })
            .collect()
    }
}

#[async_trait]
impl Draft for ProductDraft {
    type Error = ProductDraftError;

    const KIND: &'static str = "product";

    fn check_step(&self, step: WizardStep) -> Result<(), Self::Error> {
        match step {
            WizardStep::Information => self.validate_information(),
            WizardStep::Variants => self.validate_variants(),
            WizardStep::Preview => {
                self.validate_information()?;
                self.validate_variants()
            }
            WizardStep::Submitted => Ok(()),
        }
    }

    async fn submit(&self, orchestrator: &SubmissionOrchestrator) -> Result<Submitted, SubmissionError> {
        orchestrator.submit_product(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::variants::VariantKey;
    use crate::models::Category;

    fn tee() -> ProductInfo {
        ProductInfo::new("Basic Tee", Money::new(200)).with_category(Category::new("cat-1", "Shirts"))
    }

    fn add(color: &str, size: &str, quantity: i64) -> ProductDraftCommand {
        ProductDraftCommand::AddVariant {
            color: Some(Color::new(color, color)),
            size: Some(Size::new(size, size)),
            quantity,
        }
    }

    #[test]
    fn test_variants_priced_from_effective_price() {
        let mut draft = ProductDraft::new();
        draft.execute(ProductDraftCommand::SetInfo(tee())).unwrap();
        draft.execute(add("red", "m", 3)).unwrap();

        assert_eq!(draft.variants().entries()[0].unit_price, Money::new(200));
        assert_eq!(draft.stock_value(), Money::new(600));

        draft
            .execute(ProductDraftCommand::SetInfo(tee().with_sale_price(Money::new(150))))
            .unwrap();
        assert_eq!(draft.stock_value(), Money::new(450));
    }

    #[test]
    fn test_price_change_that_overflows_stock_value_is_rejected() {
        let mut draft = ProductDraft::new();
        draft.execute(ProductDraftCommand::SetInfo(tee())).unwrap();
        draft.execute(add("red", "m", 3)).unwrap();
        let before = draft.clone();

        let result = draft.execute(ProductDraftCommand::SetInfo(
            ProductInfo::new("Basic Tee", Money::new(i64::MAX)).with_category(Category::new("cat-1", "Shirts")),
        ));

        assert_eq!(result, Err(ProductDraftError::Variant(VariantError::AmountOverflow)));
        assert_eq!(draft, before);
    }

    #[test]
    fn test_duplicate_pair_rejected() {
        let mut draft = ProductDraft::new();
        draft.execute(ProductDraftCommand::SetInfo(tee())).unwrap();
        draft.execute(add("red", "m", 3)).unwrap();

        let result = draft.execute(add("red", "m", 1));

        assert!(matches!(
            result,
            Err(ProductDraftError::Variant(VariantError::Duplicate(_)))
        ));
        assert_eq!(draft.total_stock(), 3);
    }

    #[test]
    fn test_missing_size_rejected() {
        let mut draft = ProductDraft::new();
        let result = draft.execute(ProductDraftCommand::AddVariant {
            color: Some(Color::new("red", "Red")),
            size: None,
            quantity: 1,
        });

        assert_eq!(result, Err(ProductDraftError::Variant(VariantError::MissingSize)));
    }

    #[test]
    fn test_information_checks() {
        let mut draft = ProductDraft::new();
        assert_eq!(draft.check_step(WizardStep::Information), Err(ProductDraftError::EmptyName));

        draft
            .execute(ProductDraftCommand::SetInfo(ProductInfo::new("Tee", Money::ZERO)))
            .unwrap();
        assert_eq!(draft.check_step(WizardStep::Information), Err(ProductDraftError::InvalidPrice));

        draft
            .execute(ProductDraftCommand::SetInfo(
                ProductInfo::new("Tee", Money::new(100)).with_sale_price(Money::new(120)),
            ))
            .unwrap();
        assert!(matches!(
            draft.check_step(WizardStep::Information),
            Err(ProductDraftError::SalePriceAbovePrice { .. })
        ));

        draft
            .execute(ProductDraftCommand::SetInfo(ProductInfo::new("Tee", Money::new(100))))
            .unwrap();
        assert_eq!(draft.check_step(WizardStep::Information), Err(ProductDraftError::MissingCategory));

        draft.execute(ProductDraftCommand::SetInfo(tee())).unwrap();
        assert!(draft.check_step(WizardStep::Information).is_ok());
        assert_eq!(draft.check_step(WizardStep::Preview), Err(ProductDraftError::NoVariants));
    }

    #[test]
    fn test_add_selected_pair_priced_from_info() {
        let mut draft = ProductDraft::new();
        draft.execute(ProductDraftCommand::SetInfo(tee())).unwrap();
        draft.execute(ProductDraftCommand::SelectColor(Color::new("red", "Red"))).unwrap();
        draft.execute(ProductDraftCommand::SelectSize(Size::new("m", "M"))).unwrap();

        draft.execute(ProductDraftCommand::AddSelected { quantity: 5 }).unwrap();

        assert_eq!(draft.total_stock(), 5);
        assert_eq!(draft.stock_value(), Money::new(1000));
        assert!(draft.variants().active().is_empty());
    }

    #[test]
    fn test_remove_active_color_clears_it() {
        let mut draft = ProductDraft::new();
        draft.execute(ProductDraftCommand::SetInfo(tee())).unwrap();
        draft.execute(add("red", "m", 1)).unwrap();
        draft
            .execute(ProductDraftCommand::SelectColor(Color::new("red", "red")))
            .unwrap();

        draft
            .execute(ProductDraftCommand::RemoveVariant(VariantKey::new(
                Color::new("red", "red").id,
                Size::new("m", "m").id,
            )))
            .unwrap();

        assert!(draft.variants().active().color.is_none());
        assert_eq!(draft.stock_value(), Money::ZERO);
    }

    #[test]
    fn test_variant_payloads_carry_product_id() {
        let mut draft = ProductDraft::new();
        draft.execute(ProductDraftCommand::SetInfo(tee())).unwrap();
        draft.execute(add("red", "m", 2)).unwrap();
        draft.execute(add("red", "l", 1)).unwrap();

        let product_id = ProductId::new("product-1");
        let payloads = draft.variant_payloads(&product_id);

        assert_eq!(payloads.len(), 2);
        assert!(payloads.iter().all(|p| p.product_id == product_id));
        assert_eq!(draft.header().category_id, CategoryId::new("cat-1"));
    }
}
