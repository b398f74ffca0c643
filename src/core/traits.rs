//! Core traits for inventory storage
//!
//! The session and purchase logic only ever talk to the inventory through
//! this trait, so the backing store can be swapped without touching them.

use crate::types::{Item, StoreError};
use rust_decimal::Decimal;

/// Key-value style inventory store
///
/// Implementations must be safe to share between sessions. Every method is a
/// single atomic operation; callers never compose a read and a write
/// themselves.
pub trait InventoryStore: Send + Sync {
    /// Get a snapshot of an item by ID
    fn get(&self, id: &str) -> Option<Item>;

    /// Snapshot of every item, sorted by name
    fn list(&self) -> Vec<Item>;

    /// Atomically add `delta` to an item's stock
    ///
    /// Concurrent adjustments of the same item are serialized: no delta is
    /// lost and stock never goes below zero.
    ///
    /// # Returns
    ///
    /// * `Ok(stock)` - the stock after the adjustment
    /// * `Err(StoreError::ItemNotFound)` - unknown ID
    /// * `Err(StoreError::InsufficientStock)` - the adjustment would go negative
    /// * `Err(StoreError::StockOverflow)` - the adjustment would overflow
    fn adjust_stock(&self, id: &str, delta: i64) -> Result<u32, StoreError>;

    /// Set an item's unit price
    fn set_price(&self, id: &str, price: Decimal) -> Result<(), StoreError>;

    /// Insert a new item
    ///
    /// Returns `false` and leaves the store unchanged when an item with the
    /// same name or ID already exists.
    fn insert(&self, item: Item) -> bool;

    /// Administrative delete
    fn remove(&self, id: &str) -> Option<Item>;
}
