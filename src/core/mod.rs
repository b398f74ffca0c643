//! Core business logic module
//!
//! This module contains the store's protocol and transaction components:
//! - `traits` - the `InventoryStore` abstraction
//! - `inventory` - concurrent in-memory inventory
//! - `dispatcher` - command parsing and simple command execution
//! - `coordinator` - the multi-step BUY transaction

pub mod coordinator;
pub mod dispatcher;
pub mod inventory;
pub mod traits;

pub use coordinator::{PurchaseCoordinator, PurchaseOutcome};
pub use dispatcher::{Command, Dispatch, Dispatcher};
pub use inventory::MemoryInventory;
pub use traits::InventoryStore;
