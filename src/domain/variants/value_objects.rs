use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{Color, ColorId, Money, ProductRef, ProductId, Size, SizeId};
use super::errors::VariantError;

// ============================================================================
// Variant Value Objects
// ============================================================================

/// Identity of a line item inside one draft.
///
/// Product drafts never carry a product reference, so their identity is the
/// bare (color, size) pair. Order drafts may mix products, so the product id
/// takes part in the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantKey {
    pub product_id: Option<ProductId>,
    pub color_id: ColorId,
    pub size_id: SizeId,
}

impl VariantKey {
    pub fn new(color_id: ColorId, size_id: SizeId) -> Self {
        Self { product_id: None, color_id, size_id }
    }

    pub fn for_product(product_id: ProductId, color_id: ColorId, size_id: SizeId) -> Self {
        Self { product_id: Some(product_id), color_id, size_id }
    }
}

impl fmt::Display for VariantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.product_id {
            Some(product) => write!(f, "{}/{}/{}", product, self.color_id, self.size_id),
            None => write!(f, "{}/{}", self.color_id, self.size_id),
        }
    }
}

/// A (color, size, quantity) tuple with its derived price
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product: Option<ProductRef>,
    pub color: Color,
    pub size: Size,
    pub quantity: u32,
    pub unit_price: Money,
    pub total: Money,
}

impl LineItem {
    pub fn key(&self) -> VariantKey {
        VariantKey {
            product_id: self.product.as_ref().map(|p| p.id.clone()),
            color_id: self.color.id.clone(),
            size_id: self.size.id.clone(),
        }
    }

    /// Leaves the entry untouched when the total does not fit
    pub(crate) fn recompute_total(&mut self) -> Result<(), VariantError> {
        self.total = self
            .unit_price
            .checked_mul(self.quantity)
            .ok_or(VariantError::AmountOverflow)?;
        Ok(())
    }
}

/// Raw form values for adding or editing a line item.
///
/// Color and size are optional because the form can be submitted before the
/// pickers have completed a pair; the store rejects that case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineInput {
    pub product: Option<ProductRef>,
    pub color: Option<Color>,
    pub size: Option<Size>,
    pub quantity: i64,
    pub unit_price: Money,
}

impl LineInput {
    pub fn new(color: Color, size: Size, quantity: i64, unit_price: Money) -> Self {
        Self {
            product: None,
            color: Some(color),
            size: Some(size),
            quantity,
            unit_price,
        }
    }

    pub fn with_product(mut self, product: ProductRef) -> Self {
        self.product = Some(product);
        self
    }
}

/// How a quantity adjustment is expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    Delta(i64),
    Absolute(i64),
}

/// What the store does when an added entry's key already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DuplicatePolicy {
    /// Add the quantity onto the existing entry (order flow)
    Merge,
    /// Refuse the add (product flow)
    Reject,
}

/// Result of a successful add
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Inserted(usize),
    Merged(usize),
}

impl AddOutcome {
    pub fn index(self) -> usize {
        match self {
            AddOutcome::Inserted(i) | AddOutcome::Merged(i) => i,
        }
    }
}

/// Color and size currently chosen in the pickers but not yet added
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSelection {
    pub color: Option<Color>,
    pub size: Option<Size>,
}

impl ActiveSelection {
    pub fn is_complete(&self) -> bool {
        self.color.is_some() && self.size.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.color.is_none() && self.size.is_none()
    }

    pub fn clear(&mut self) {
        self.color = None;
        self.size = None;
    }
}
