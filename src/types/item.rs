//! Inventory item types for the liquor store
//!
//! This module defines the Item record held by the inventory store and the
//! identifier type used to address it from the line protocol.

use rust_decimal::Decimal;
use serde::ser::{Serialize, SerializeTuple, Serializer};

/// Item identifier
///
/// Opaque unique string. Seeded items use a UUID v4, but any token without
/// whitespace is a valid identifier on the wire.
pub type ItemId = String;

/// A single inventory record
///
/// Items are created by seeding or the administrative `insert` operation and
/// afterwards only mutated through stock adjustments and price changes.
///
/// # Invariants
///
/// - `stock` never drops below zero (enforced by the unsigned type and by
///   `InventoryStore::adjust_stock`)
/// - `name` is unique across the store
///
/// # Wire form
///
/// In LIST payloads an item is a positional JSON array
/// `[id, name, origin_code, stock, unit_price]` with the price as a number.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    /// Unique identifier
    pub id: ItemId,

    /// Commercial name, unique across the store
    pub name: String,

    /// Short country-of-origin code (e.g. "jp")
    pub origin_code: String,

    /// Units currently in stock
    pub stock: u32,

    /// Price of a single unit
    pub unit_price: Decimal,
}

impl Item {
    /// Create a new item record
    pub fn new(
        id: impl Into<ItemId>,
        name: impl Into<String>,
        origin_code: impl Into<String>,
        stock: u32,
        unit_price: Decimal,
    ) -> Self {
        Item {
            id: id.into(),
            name: name.into(),
            origin_code: origin_code.into(),
            stock,
            unit_price,
        }
    }

    /// Whether at least one unit can be sold
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Unit price in the form quoted to clients
    ///
    /// Trailing fractional zeros are dropped, so `100.00` is quoted as `100`.
    pub fn quoted_price(&self) -> String {
        self.unit_price.normalize().to_string()
    }
}

/// Unit price written as a float
struct FloatPrice(Decimal);

impl Serialize for FloatPrice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl Serialize for Item {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut row = serializer.serialize_tuple(5)?;
        row.serialize_element(&self.id)?;
        row.serialize_element(&self.name)?;
        row.serialize_element(&self.origin_code)?;
        row.serialize_element(&self.stock)?;
        row.serialize_element(&FloatPrice(self.unit_price))?;
        row.end()
    }
}
