use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};

// ============================================================================
// Reference Models
// ============================================================================
//
// Entities fetched from the backend and selected by id. The workflow never
// mutates them; drafts hold clones of whatever the pickers returned.
//
// ============================================================================

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(ColorId);
string_id!(SizeId);
string_id!(CategoryId);
string_id!(ProductId);
string_id!(OrderId);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub id: ColorId,
    pub name: String,
    /// Hex swatch, e.g. `#ff0000`.
    #[serde(default)]
    pub code: String,
}

impl Color {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ColorId::new(id),
            name: name.into(),
            code: String::new(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub id: SizeId,
    pub code: String,
}

impl Size {
    pub fn new(id: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            id: SizeId::new(id),
            code: code.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

impl Category {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: CategoryId::new(id),
            name: name.into(),
        }
    }
}

/// Product as referenced from an order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    pub id: ProductId,
    pub name: String,
}

// ============================================================================
// Money
// ============================================================================

/// Amount in the smallest currency unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(pub i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn new(amount: i64) -> Self {
        Self(amount)
    }

    pub fn amount(self) -> i64 {
        self.0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Subtraction that floors at zero; totals never go negative.
    pub fn saturating_sub(self, other: Money) -> Money {
        Money(self.0.saturating_sub(other.0).max(0))
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Line total for `quantity` units, or `None` if it does not fit
    pub fn checked_mul(self, quantity: u32) -> Option<Money> {
        self.0.checked_mul(i64::from(quantity)).map(Money)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl Mul<u32> for Money {
    type Output = Money;

    fn mul(self, rhs: u32) -> Money {
        Money(self.0.saturating_mul(i64::from(rhs)))
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Pagination
// ============================================================================

/// One page of a backend listing. Pages are 1-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(rename = "totalPages")]
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_pages: 0,
        }
    }

    /// Slice `all` into the requested page. Used by the in-memory backend.
    pub fn slice(all: &[T], page: u32, page_size: u32) -> Self
    where
        T: Clone,
    {
        let page_size = page_size.max(1) as usize;
        let total_pages = all.len().div_ceil(page_size) as u32;
        let start = (page.saturating_sub(1) as usize).saturating_mul(page_size);
        let items = all.iter().skip(start).take(page_size).cloned().collect();
        Self { items, total_pages }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_arithmetic() {
        let unit = Money::new(250);
        assert_eq!(unit * 3, Money::new(750));
        assert_eq!(Money::new(10) + Money::new(5), Money::new(15));
        assert_eq!(Money::new(10).saturating_sub(Money::new(25)), Money::ZERO);

        let sum: Money = vec![Money::new(1), Money::new(2), Money::new(3)].into_iter().sum();
        assert_eq!(sum, Money::new(6));
    }

    #[test]
    fn test_money_overflow_is_detected_not_wrapped() {
        let price = Money::new(3_000_000_000);
        assert_eq!(price.checked_mul(3_000_000_000), Some(Money::new(9_000_000_000_000_000_000)));
        assert_eq!(price.checked_mul(4_000_000_000), None);
        assert_eq!(Money::new(i64::MAX).checked_add(Money::new(1)), None);

        assert_eq!(price * 4_000_000_000, Money::new(i64::MAX));
        assert_eq!(Money::new(i64::MAX) + Money::new(1), Money::new(i64::MAX));
        assert_eq!(Money::new(i64::MIN).saturating_sub(Money::new(1)), Money::ZERO);
    }

    #[test]
    fn test_page_slice() {
        let all: Vec<u32> = (1..=10).collect();

        let first = Page::slice(&all, 1, 8);
        assert_eq!(first.items, (1..=8).collect::<Vec<_>>());
        assert_eq!(first.total_pages, 2);

        let second = Page::slice(&all, 2, 8);
        assert_eq!(second.items, vec![9, 10]);

        let beyond = Page::slice(&all, 3, 8);
        assert!(beyond.items.is_empty());
    }

    #[test]
    fn test_page_deserializes_camel_case_total() {
        let json = r##"{"items":[{"id":"c1","name":"Red","code":"#f00"}],"totalPages":3}"##;
        let page: Page<Color> = serde_json::from_str(json).unwrap();

        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items[0].id, ColorId::new("c1"));
    }
}
