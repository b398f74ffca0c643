//! I/O module
//!
//! Handles everything that crosses a process boundary besides the bank.
//!
//! # Components
//!
//! - `lines` - line framing of client connections
//! - `csv_format` - inventory snapshot format (load/save)
//! - `seed` - default catalogue and startup inventory

pub mod csv_format;
pub mod lines;
pub mod seed;

pub use csv_format::{load_inventory, save_inventory, write_inventory_csv, CsvItem};
pub use lines::{client_connection, ClientConnection};
pub use seed::{default_items, open_inventory};
