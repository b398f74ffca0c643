//! Liquor Store Server Library
//! # Overview
//!
//! A TCP server selling liquor over a line-oriented text protocol. Purchases
//! are settled with an external bank over UDP using an obfuscated message
//! format.
//!
//! # Architecture
//!
//! - [`types`] - Core data types (Item, Transaction, Reply, StoreError)
//! - [`cli`] - CLI arguments parsing
//! - [`core`] - Business logic components:
//!   - [`core::inventory`] - Concurrent inventory with atomic stock adjustment
//!   - [`core::dispatcher`] - Command parsing for HI, LIST and BUY
//!   - [`core::coordinator`] - The BUY transaction from quote to commit
//! - [`bank`] - Rotation codec and the UDP bank channel
//! - [`io`] - Line framing, inventory snapshots and default seeding
//! - [`server`] - Listener, sessions and configuration
//! - [`logging`] - tracing subscriber setup
//!
//! # Protocol
//!
//! Each request is one line; each reply is one line starting with `OK` or
//! `ERR <code>`. The end of a purchase is different: the bank's decoded
//! message is relayed as is, and an approval is followed by a second line
//! naming the item.
//!
//! - **HI**: handshake, answered with the store name
//! - **LIST**: JSON array of item rows `[id, name, origin, stock, price]`,
//!   then the connected count, then the owner id
//! - **BUY <item_id>**: quote, payment line from the client, bank round trip,
//!   then the bank's approval followed by `Here, enjoy your <name>`, or the
//!   bank's decline
//!
//! # Stock
//!
//! Stock is only decremented after the bank approves, through one atomic
//! check-and-decrement. Two sessions racing for the last unit can both be
//! quoted, but only one of them commits.

// Module declarations
pub mod bank;
pub mod cli;
pub mod core;
pub mod io;
pub mod logging;
pub mod server;
pub mod types;

pub use bank::{BankChannel, UdpBankChannel};
pub use crate::core::{Dispatcher, InventoryStore, MemoryInventory, PurchaseCoordinator};
pub use server::{ServerConfig, SessionContext, StoreServer};
pub use types::{Item, ItemId, Reply, ResultCode, StoreError, Transaction, TransactionState};
