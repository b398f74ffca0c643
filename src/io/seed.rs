//! Default inventory seeding
//!
//! A fresh store (no snapshot on disk yet) starts with a fixed catalogue.
//! Every seeded item gets a new UUID v4 identifier.

use crate::core::MemoryInventory;
use crate::io::csv_format::load_inventory;
use crate::types::{Item, StoreError};
use rust_decimal::Decimal;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

/// (name, origin code, stock, unit price)
const DEFAULT_CATALOGUE: [(&str, &str, u32, i64); 5] = [
    ("Vodka", "ru", 6, 114_900),
    ("Soju", "kr", 5, 98_900),
    ("Sake", "jp", 7, 325_800),
    ("Aguardiente", "co", 3, 40_700),
    ("Beer", "de", 10, 3_500),
];

/// The default catalogue with freshly generated identifiers
pub fn default_items() -> Vec<Item> {
    DEFAULT_CATALOGUE
        .iter()
        .map(|&(name, origin_code, stock, price)| {
            Item::new(
                Uuid::new_v4().to_string(),
                name,
                origin_code,
                stock,
                Decimal::from(price),
            )
        })
        .collect()
}

/// Build the inventory the server starts with
///
/// Loads `snapshot` when it names an existing file, otherwise seeds the
/// default catalogue.
pub fn open_inventory(snapshot: Option<&Path>) -> Result<MemoryInventory, StoreError> {
    match snapshot {
        Some(path) if path.exists() => Ok(MemoryInventory::with_items(load_inventory(path)?)),
        _ => {
            info!("Seeding default inventory");
            Ok(MemoryInventory::with_items(default_items()))
        }
    }
}
