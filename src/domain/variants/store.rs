use std::collections::{HashMap, HashSet};

use crate::models::{Color, ColorId, Money, Size, SizeId};
use super::errors::VariantError;
use super::value_objects::{
    ActiveSelection, AddOutcome, DuplicatePolicy, LineInput, LineItem, QuantityChange, VariantKey,
};

// ============================================================================
// Variant Reconciliation Store
// ============================================================================
//
// Ordered collection of line items keyed by VariantKey. Entries keep their
// insertion order for display; the key index makes duplicates impossible
// rather than something a caller has to scan for.
//
// The store does not know about draft totals. Drafts own a store and
// recompute their totals after every call that returns Ok.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantStore {
    policy: DuplicatePolicy,
    entries: Vec<LineItem>,
    index: HashMap<VariantKey, usize>,
    active: ActiveSelection,
}

impl VariantStore {
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self {
            policy,
            entries: Vec::new(),
            index: HashMap::new(),
            active: ActiveSelection::default(),
        }
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[LineItem] {
        &self.entries
    }

    pub fn get(&self, key: &VariantKey) -> Option<&LineItem> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, key: &VariantKey) -> bool {
        self.index.contains_key(key)
    }

    pub fn subtotal(&self) -> Money {
        self.entries.iter().map(|e| e.total).sum()
    }

    /// Sum of line totals, or `None` if it does not fit in `Money`
    pub fn checked_subtotal(&self) -> Option<Money> {
        self.entries
            .iter()
            .try_fold(Money::ZERO, |acc, e| acc.checked_add(e.total))
    }

    pub fn total_quantity(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.quantity)).sum()
    }

    // ------------------------------------------------------------------
    // Active picker selection
    // ------------------------------------------------------------------

    pub fn active(&self) -> &ActiveSelection {
        &self.active
    }

    pub fn select_color(&mut self, color: Color) {
        self.active.color = Some(color);
    }

    pub fn select_size(&mut self, size: Size) {
        self.active.size = Some(size);
    }

    pub fn clear_selection(&mut self) {
        self.active.clear();
    }

    /// Take the active (color, size) pair once both halves are chosen
    pub fn take_pair(&mut self) -> Option<(Color, Size)> {
        if !self.active.is_complete() {
            return None;
        }
        let color = self.active.color.take()?;
        let size = self.active.size.take()?;
        Some((color, size))
    }

    /// Colors already present in the store, for the color picker's exclusion set
    pub fn used_colors(&self) -> HashSet<ColorId> {
        self.entries.iter().map(|e| e.color.id.clone()).collect()
    }

    pub fn used_sizes(&self) -> HashSet<SizeId> {
        self.entries.iter().map(|e| e.size.id.clone()).collect()
    }

    /// Sizes already combined with `color_id`, for the size picker's exclusion set
    pub fn sizes_used_with(&self, color_id: &ColorId) -> HashSet<SizeId> {
        self.entries
            .iter()
            .filter(|e| &e.color.id == color_id)
            .map(|e| e.size.id.clone())
            .collect()
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Add an entry, applying the store's duplicate policy on key collision
    pub fn add_variant(&mut self, input: LineInput) -> Result<AddOutcome, VariantError> {
        let item = Self::build(input)?;
        let key = item.key();

        let outcome = match self.index.get(&key) {
            Some(&i) => match self.policy {
                DuplicatePolicy::Reject => return Err(VariantError::Duplicate(key)),
                DuplicatePolicy::Merge => {
                    let mut merged = self.entries[i].clone();
                    merged.quantity = merged.quantity.saturating_add(item.quantity);
                    merged.recompute_total()?;
                    tracing::debug!(key = %key, quantity = merged.quantity, "Merged duplicate variant");
                    self.entries[i] = merged;
                    AddOutcome::Merged(i)
                }
            },
            None => {
                self.entries.push(item);
                let i = self.entries.len() - 1;
                self.index.insert(key.clone(), i);
                tracing::debug!(key = %key, index = i, "Added variant");
                AddOutcome::Inserted(i)
            }
        };

        // The picked pair has been consumed
        let entry = &self.entries[outcome.index()];
        if self.active.color.as_ref() == Some(&entry.color) && self.active.size.as_ref() == Some(&entry.size) {
            self.active.clear();
        }

        Ok(outcome)
    }

    /// Add the active pair with `quantity`. The selection is kept when the
    /// add fails so the user can correct the quantity.
    pub fn add_selected(&mut self, quantity: i64, unit_price: Money) -> Result<AddOutcome, VariantError> {
        let color = self.active.color.clone().ok_or(VariantError::MissingColor)?;
        let size = self.active.size.clone().ok_or(VariantError::MissingSize)?;
        self.add_variant(LineInput::new(color, size, quantity, unit_price))
    }

    /// Replace the entry at `index` in place, keeping its position
    pub fn edit_variant(&mut self, index: usize, input: LineInput) -> Result<&LineItem, VariantError> {
        let len = self.entries.len();
        if index >= len {
            return Err(VariantError::IndexOutOfRange { index, len });
        }

        let item = Self::build(input)?;
        let new_key = item.key();
        let old_key = self.entries[index].key();

        if new_key != old_key {
            if self.index.contains_key(&new_key) {
                return Err(VariantError::Duplicate(new_key));
            }
            self.index.remove(&old_key);
            self.index.insert(new_key, index);
        }

        self.entries[index] = item;
        Ok(&self.entries[index])
    }

    /// Remove the entry with `key`.
    ///
    /// The active selection is cleared only when every chosen half of it
    /// matches the removed entry. A selection that shares just the color
    /// or just the size with it is kept.
    pub fn remove_variant(&mut self, key: &VariantKey) -> Result<LineItem, VariantError> {
        let i = self
            .index
            .remove(key)
            .ok_or_else(|| VariantError::NotFound(key.clone()))?;

        let removed = self.entries.remove(i);
        self.reindex();

        let color_matches = self.active.color.as_ref().map_or(true, |c| c.id == removed.color.id);
        let size_matches = self.active.size.as_ref().map_or(true, |s| s.id == removed.size.id);
        if !self.active.is_empty() && color_matches && size_matches {
            self.active.clear();
        }

        tracing::debug!(key = %key, remaining = self.entries.len(), "Removed variant");
        Ok(removed)
    }

    /// Change an entry's quantity, clamped to a minimum of 1. The entry is
    /// left unchanged if the new total would overflow.
    pub fn adjust_quantity(&mut self, key: &VariantKey, change: QuantityChange) -> Result<&LineItem, VariantError> {
        let i = *self
            .index
            .get(key)
            .ok_or_else(|| VariantError::NotFound(key.clone()))?;

        let entry = &mut self.entries[i];
        let requested = match change {
            QuantityChange::Delta(delta) => i64::from(entry.quantity).saturating_add(delta),
            QuantityChange::Absolute(value) => value,
        };
        let previous = entry.quantity;
        entry.quantity = clamp_quantity(requested);
        if let Err(e) = entry.recompute_total() {
            entry.quantity = previous;
            return Err(e);
        }

        Ok(&self.entries[i])
    }

    /// Set every entry's unit price, e.g. after the product price changed.
    /// Nothing changes if any resulting total would overflow.
    pub fn reprice(&mut self, unit_price: Money) -> Result<(), VariantError> {
        let totals = self
            .entries
            .iter()
            .map(|e| unit_price.checked_mul(e.quantity).ok_or(VariantError::AmountOverflow))
            .collect::<Result<Vec<_>, _>>()?;
        for (entry, total) in self.entries.iter_mut().zip(totals) {
            entry.unit_price = unit_price;
            entry.total = total;
        }
        Ok(())
    }

    fn reindex(&mut self) {
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.key(), i))
            .collect();
    }

    fn build(input: LineInput) -> Result<LineItem, VariantError> {
        let color = input.color.ok_or(VariantError::MissingColor)?;
        let size = input.size.ok_or(VariantError::MissingSize)?;
        let quantity = match u32::try_from(input.quantity) {
            Ok(q) if q > 0 => q,
            _ => return Err(VariantError::InvalidQuantity(input.quantity)),
        };
        if input.unit_price.amount() < 0 {
            return Err(VariantError::NegativePrice);
        }

        let mut item = LineItem {
            product: input.product,
            color,
            size,
            quantity,
            unit_price: input.unit_price,
            total: Money::ZERO,
        };
        item.recompute_total()?;
        Ok(item)
    }
}

fn clamp_quantity(requested: i64) -> u32 {
    requested.clamp(1, i64::from(u32::MAX)) as u32
}

// ============================================================================
// Unit Tests
// ============================================================================
