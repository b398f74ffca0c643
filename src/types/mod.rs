//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `item`: Inventory item record and identifier
//! - `transaction`: Purchase transaction and its lifecycle states
//! - `reply`: Protocol result codes and replies
//! - `error`: Error types for the store

pub mod error;
pub mod item;
pub mod reply;
pub mod transaction;

pub use error::StoreError;
pub use item::{Item, ItemId};
pub use reply::{Reply, ResultCode};
pub use transaction::{Transaction, TransactionState};
