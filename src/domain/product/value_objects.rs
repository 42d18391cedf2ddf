use serde::{Deserialize, Serialize};

use crate::models::{Category, Money};

// ============================================================================
// Product Value Objects
// ============================================================================

/// Product details captured on the Information step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub name: String,
    pub description: String,
    pub price: Money,
    pub sale_price: Option<Money>,
    pub category: Option<Category>,
}

impl ProductInfo {
    pub fn new(name: impl Into<String>, price: Money) -> Self {
        Self {
            name: name.into(),
            price,
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_sale_price(mut self, sale_price: Money) -> Self {
        self.sale_price = Some(sale_price);
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Price every variant is sold at: the sale price when set, else the base price
    pub fn effective_price(&self) -> Money {
        self.sale_price.unwrap_or(self.price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_price_prefers_sale_price() {
        let info = ProductInfo::new("Tee", Money::new(200));
        assert_eq!(info.effective_price(), Money::new(200));

        let info = info.with_sale_price(Money::new(150));
        assert_eq!(info.effective_price(), Money::new(150));
    }
}
