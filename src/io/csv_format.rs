//! CSV format handling for the inventory snapshot
//!
//! The inventory is persisted as a CSV file with columns
//! `id,name,origin_code,stock,unit_price`. This module provides:
//! - CsvItem structure for deserialization
//! - Conversion from CSV rows to `Item`
//! - Snapshot reading and writing, plus path-based load/save helpers
//!
//! Malformed rows are skipped with a warning rather than failing the load.

use crate::types::{Item, StoreError};
use csv::{ReaderBuilder, Trim, Writer};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use std::str::FromStr;
use tracing::{info, warn};

/// CSV row as stored on disk
///
/// The price stays a string so it can be parsed as an exact decimal.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvItem {
    pub id: String,
    pub name: String,
    pub origin_code: String,
    pub stock: u32,
    pub unit_price: String,
}

/// Convert a CsvItem to an Item
///
/// # Returns
///
/// Result containing either:
/// - Ok(Item) - Successfully converted row
/// - Err(String) - Error message describing the conversion failure
pub fn convert_csv_item(csv_item: CsvItem) -> Result<Item, String> {
    if csv_item.id.is_empty() || csv_item.id.contains(char::is_whitespace) {
        return Err(format!("Invalid item id '{}'", csv_item.id));
    }
    if csv_item.name.is_empty() {
        return Err(format!("Item {} has an empty name", csv_item.id));
    }

    let unit_price = Decimal::from_str(csv_item.unit_price.trim()).map_err(|_| {
        format!(
            "Invalid price '{}' for item {}",
            csv_item.unit_price, csv_item.id
        )
    })?;
    if unit_price.is_sign_negative() && !unit_price.is_zero() {
        return Err(format!(
            "Negative price '{}' for item {}",
            csv_item.unit_price, csv_item.id
        ));
    }

    Ok(Item::new(
        csv_item.id,
        csv_item.name,
        csv_item.origin_code,
        csv_item.stock,
        unit_price,
    ))
}

/// Read every valid item from a CSV snapshot
///
/// Rows that fail to deserialize or convert are logged and skipped.
pub fn read_inventory_csv<R: Read>(input: R) -> Result<Vec<Item>, StoreError> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(input);
    let mut items = Vec::new();

    for result in reader.deserialize::<CsvItem>() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                let error = StoreError::from(e);
                warn!(error = %error, "Skipping inventory row");
                continue;
            }
        };
        match convert_csv_item(row) {
            Ok(item) => items.push(item),
            Err(message) => warn!(error = %message, "Skipping inventory row"),
        }
    }

    Ok(items)
}

/// Write items in CSV format, sorted by name for deterministic output
pub fn write_inventory_csv(items: &[Item], output: &mut dyn Write) -> Result<(), StoreError> {
    let mut writer = Writer::from_writer(output);

    writer.write_record(["id", "name", "origin_code", "stock", "unit_price"])?;

    let mut sorted_items = items.to_vec();
    sorted_items.sort_by(|a, b| a.name.cmp(&b.name));

    for item in sorted_items {
        writer.write_record(&[
            item.id,
            item.name,
            item.origin_code,
            item.stock.to_string(),
            item.unit_price.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Load a snapshot file
pub fn load_inventory(path: &Path) -> Result<Vec<Item>, StoreError> {
    let file = File::open(path).map_err(|e| StoreError::Io {
        message: format!("Failed to open '{}': {}", path.display(), e),
    })?;
    let items = read_inventory_csv(file)?;
    info!(path = %path.display(), items = items.len(), "Inventory loaded");
    Ok(items)
}

/// Save a snapshot file
///
/// The snapshot is written next to `path` first and renamed over it, so a
/// crash mid-write never leaves a truncated inventory behind.
pub fn save_inventory(items: &[Item], path: &Path) -> Result<(), StoreError> {
    let staging = path.with_extension("csv.tmp");
    {
        let mut file = File::create(&staging)?;
        write_inventory_csv(items, &mut file)?;
        file.sync_all()?;
    }
    fs::rename(&staging, path)?;
    info!(path = %path.display(), items = items.len(), "Inventory saved");
    Ok(())
}
