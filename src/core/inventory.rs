//! Thread-safe in-memory inventory
//!
//! This module provides the `MemoryInventory` struct, the `InventoryStore`
//! used by the server. Items live in a `DashMap`, so sessions touching
//! different items never contend, while operations on the same item are
//! serialized by the map's per-shard locks.
//!
//! # Atomic stock adjustment
//!
//! `adjust_stock` performs the availability check and the write while holding
//! the item's entry lock. Two purchases racing for the last unit therefore
//! always produce one success and one `InsufficientStock`, never a negative
//! stock. No lock is held outside a single method call, in particular not
//! across the bank round trip of a purchase.

use crate::core::traits::InventoryStore;
use crate::types::{Item, ItemId, StoreError};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rust_decimal::Decimal;
use tracing::warn;

/// Concurrent inventory keyed by item ID
#[derive(Debug, Default)]
pub struct MemoryInventory {
    /// Item records by ID
    items: DashMap<ItemId, Item>,

    /// Name index enforcing name uniqueness
    names: DashMap<String, ItemId>,
}

impl MemoryInventory {
    /// Create an empty inventory
    pub fn new() -> Self {
        Self {
            items: DashMap::new(),
            names: DashMap::new(),
        }
    }

    /// Create an inventory from seed items
    ///
    /// Items whose name or ID is already taken are skipped with a warning;
    /// the first occurrence wins.
    pub fn with_items(items: impl IntoIterator<Item = Item>) -> Self {
        let inventory = Self::new();
        for item in items {
            let rejected = StoreError::duplicate_item(&item.id, &item.name);
            if !inventory.insert(item) {
                warn!(error = %rejected, "Skipping inventory item");
            }
        }
        inventory
    }

    /// Number of items in the store
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl InventoryStore for MemoryInventory {
    fn get(&self, id: &str) -> Option<Item> {
        self.items.get(id).map(|entry| entry.value().clone())
    }

    fn list(&self) -> Vec<Item> {
        let mut items: Vec<Item> = self
            .items
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        items
    }

    fn adjust_stock(&self, id: &str, delta: i64) -> Result<u32, StoreError> {
        // The entry lock is held until `item` drops, covering check and write
        let mut item = self
            .items
            .get_mut(id)
            .ok_or_else(|| StoreError::item_not_found(id))?;

        let next = i64::from(item.stock)
            .checked_add(delta)
            .ok_or_else(|| StoreError::stock_overflow(id))?;
        if next < 0 {
            return Err(StoreError::insufficient_stock(
                id,
                item.stock,
                delta.unsigned_abs(),
            ));
        }
        let next = u32::try_from(next).map_err(|_| StoreError::stock_overflow(id))?;

        item.stock = next;
        Ok(next)
    }

    fn set_price(&self, id: &str, price: Decimal) -> Result<(), StoreError> {
        if price.is_sign_negative() && !price.is_zero() {
            return Err(StoreError::invalid_price(id, price));
        }

        let mut item = self
            .items
            .get_mut(id)
            .ok_or_else(|| StoreError::item_not_found(id))?;
        item.unit_price = price;
        Ok(())
    }

    fn insert(&self, item: Item) -> bool {
        // Name slot stays locked until the item itself is in place
        match self.names.entry(item.name.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(name_slot) => match self.items.entry(item.id.clone()) {
                Entry::Occupied(_) => false,
                Entry::Vacant(item_slot) => {
                    name_slot.insert(item.id.clone());
                    item_slot.insert(item);
                    true
                }
            },
        }
    }

    fn remove(&self, id: &str) -> Option<Item> {
        let (_, item) = self.items.remove(id)?;
        self.names.remove_if(&item.name, |_, owner| owner == id);
        Some(item)
    }
}
