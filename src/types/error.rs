//! Error types for the liquor store server
//!
//! This module defines every error that can occur while serving a client.
//! Each variant knows which protocol `ResultCode` it maps to and whether it
//! ends the session that raised it.
//!
//! # Error Categories
//!
//! - **Protocol Errors**: unknown verb, wrong number of arguments. Reported to
//!   the client, the session continues.
//! - **Domain Errors**: unknown item, empty stock, commit conflicts. Reported
//!   to the client, the session continues.
//! - **Transport Errors**: disconnects, timeouts, malformed bank replies, I/O.
//!   Fatal to the current session only.
//! - **Storage Errors**: snapshot parsing and administrative misuse of the store.

use super::reply::ResultCode;
use super::transaction::TransactionState;
use rust_decimal::Decimal;
use thiserror::Error;
use tokio_util::codec::LinesCodecError;

/// Main error type for the store
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// The verb is not part of the protocol
    #[error("Unknown command '{verb}'")]
    UnknownCommand {
        /// The unrecognized verb
        verb: String,
    },

    /// A known verb received the wrong number of arguments
    #[error("{verb} expects {expected} argument(s), got {actual}")]
    BadArguments {
        /// The verb that was issued
        verb: String,
        /// Arguments the verb requires
        expected: usize,
        /// Arguments actually supplied
        actual: usize,
    },

    /// No item exists with the given identifier
    #[error("Item {id} not found")]
    ItemNotFound {
        /// The identifier that was looked up
        id: String,
    },

    /// The item has no stock left, or an adjustment would drive it negative
    #[error("Insufficient stock for item {id}: available {available}, requested {requested}")]
    InsufficientStock {
        /// Item identifier
        id: String,
        /// Units in stock at the time of the check
        available: u32,
        /// Units requested
        requested: u64,
    },

    /// The bank approved a payment but the stock decrement lost the race
    /// against a concurrent purchase
    ///
    /// Needs manual reconciliation with the bank; reported to the client with
    /// the insufficient stock code.
    #[error("Payment approved but item {id} sold out before commit")]
    StockCommitConflict {
        /// Item identifier
        id: String,
    },

    /// An adjustment would push stock past its representable maximum
    #[error("Stock overflow for item {id}")]
    StockOverflow {
        /// Item identifier
        id: String,
    },

    /// Prices cannot be negative
    #[error("Invalid price {price} for item {id}")]
    InvalidPrice {
        /// Item identifier
        id: String,
        /// The rejected price
        price: Decimal,
    },

    /// An item with the same name or identifier already exists
    #[error("Duplicate item '{name}' ({id})")]
    DuplicateItem {
        /// Identifier of the rejected item
        id: String,
        /// Name of the rejected item
        name: String,
    },

    /// A transaction was asked to make a transition its lifecycle forbids
    #[error("Invalid transaction transition from {from} to {to}")]
    InvalidTransition {
        from: TransactionState,
        to: TransactionState,
    },

    /// The bank reply was empty or lacked a numeric rotation trailer
    #[error("Malformed bank reply: '{reply}'")]
    MalformedBankReply {
        /// The raw reply text
        reply: String,
    },

    /// A remote party did not answer in time
    #[error("Timed out waiting for {party}")]
    Timeout {
        /// "client" or "bank"
        party: String,
    },

    /// The client closed the connection in the middle of a purchase
    #[error("Client disconnected")]
    ClientDisconnected,

    /// I/O error on a socket or file
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
    },

    /// The client sent a line the framing layer rejected
    #[error("Line framing error: {message}")]
    Codec {
        /// Description of the framing error
        message: String,
    },

    /// Inventory snapshot parsing error
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },
}

impl StoreError {
    /// Result code reported to the client for this error
    pub fn code(&self) -> ResultCode {
        match self {
            StoreError::UnknownCommand { .. } => ResultCode::UnknownCommand,
            StoreError::BadArguments { .. } => ResultCode::BadArguments,
            StoreError::ItemNotFound { .. } => ResultCode::NotFound,
            StoreError::InsufficientStock { .. } | StoreError::StockCommitConflict { .. } => {
                ResultCode::InsufficientStock
            }
            StoreError::InvalidPrice { .. } => ResultCode::BadArguments,
            StoreError::StockOverflow { .. }
            | StoreError::DuplicateItem { .. }
            | StoreError::InvalidTransition { .. }
            | StoreError::MalformedBankReply { .. }
            | StoreError::Timeout { .. }
            | StoreError::ClientDisconnected
            | StoreError::Io { .. }
            | StoreError::Codec { .. }
            | StoreError::ParseError { .. } => ResultCode::Unknown,
        }
    }

    /// Whether the error ends the session that raised it
    ///
    /// Transport failures are fatal; protocol and domain failures are
    /// reported to the client and the session keeps reading commands.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            StoreError::MalformedBankReply { .. }
                | StoreError::Timeout { .. }
                | StoreError::ClientDisconnected
                | StoreError::Io { .. }
                | StoreError::Codec { .. }
        )
    }
}

// Conversion from io::Error to StoreError
impl From<std::io::Error> for StoreError {
    fn from(error: std::io::Error) -> Self {
        StoreError::Io {
            message: error.to_string(),
        }
    }
}

impl From<LinesCodecError> for StoreError {
    fn from(error: LinesCodecError) -> Self {
        match error {
            LinesCodecError::Io(e) => e.into(),
            other => StoreError::Codec {
                message: other.to_string(),
            },
        }
    }
}

// Conversion from csv::Error to StoreError
impl From<csv::Error> for StoreError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        StoreError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl StoreError {
    /// Create an UnknownCommand error
    pub fn unknown_command(verb: &str) -> Self {
        StoreError::UnknownCommand {
            verb: verb.to_string(),
        }
    }

    /// Create a BadArguments error
    pub fn bad_arguments(verb: &str, expected: usize, actual: usize) -> Self {
        StoreError::BadArguments {
            verb: verb.to_string(),
            expected,
            actual,
        }
    }

    /// Create an ItemNotFound error
    pub fn item_not_found(id: &str) -> Self {
        StoreError::ItemNotFound { id: id.to_string() }
    }

    /// Create an InsufficientStock error
    pub fn insufficient_stock(id: &str, available: u32, requested: u64) -> Self {
        StoreError::InsufficientStock {
            id: id.to_string(),
            available,
            requested,
        }
    }

    /// Create a StockCommitConflict error
    pub fn stock_commit_conflict(id: &str) -> Self {
        StoreError::StockCommitConflict { id: id.to_string() }
    }

    /// Create a StockOverflow error
    pub fn stock_overflow(id: &str) -> Self {
        StoreError::StockOverflow { id: id.to_string() }
    }

    /// Create an InvalidPrice error
    pub fn invalid_price(id: &str, price: Decimal) -> Self {
        StoreError::InvalidPrice {
            id: id.to_string(),
            price,
        }
    }

    /// Create a DuplicateItem error
    pub fn duplicate_item(id: &str, name: &str) -> Self {
        StoreError::DuplicateItem {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    /// Create an InvalidTransition error
    pub fn invalid_transition(from: TransactionState, to: TransactionState) -> Self {
        StoreError::InvalidTransition { from, to }
    }

    /// Create a MalformedBankReply error
    pub fn malformed_bank_reply(reply: &str) -> Self {
        StoreError::MalformedBankReply {
            reply: reply.to_string(),
        }
    }

    /// Create a Timeout error
    pub fn timeout(party: &str) -> Self {
        StoreError::Timeout {
            party: party.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::unknown_command(
        StoreError::unknown_command("FOO"),
        "Unknown command 'FOO'"
    )]
    #[case::bad_arguments(
        StoreError::bad_arguments("BUY", 1, 2),
        "BUY expects 1 argument(s), got 2"
    )]
    #[case::item_not_found(
        StoreError::item_not_found("abc"),
        "Item abc not found"
    )]
    #[case::insufficient_stock(
        StoreError::insufficient_stock("abc", 0, 1),
        "Insufficient stock for item abc: available 0, requested 1"
    )]
    #[case::commit_conflict(
        StoreError::stock_commit_conflict("abc"),
        "Payment approved but item abc sold out before commit"
    )]
    #[case::invalid_transition(
        StoreError::invalid_transition(TransactionState::Committed, TransactionState::Aborted),
        "Invalid transaction transition from committed to aborted"
    )]
    #[case::duplicate_item(
        StoreError::duplicate_item("abc", "Sake"),
        "Duplicate item 'Sake' (abc)"
    )]
    #[case::timeout(StoreError::timeout("bank"), "Timed out waiting for bank")]
    #[case::parse_error_with_line(
        StoreError::ParseError { line: Some(3), message: "Invalid field".to_string() },
        "CSV parse error at line 3: Invalid field"
    )]
    #[case::parse_error_without_line(
        StoreError::ParseError { line: None, message: "Invalid field".to_string() },
        "CSV parse error: Invalid field"
    )]
    fn test_error_display(#[case] error: StoreError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::unknown_command(StoreError::unknown_command("FOO"), ResultCode::UnknownCommand)]
    #[case::bad_arguments(StoreError::bad_arguments("BUY", 1, 0), ResultCode::BadArguments)]
    #[case::not_found(StoreError::item_not_found("x"), ResultCode::NotFound)]
    #[case::zero_stock(StoreError::insufficient_stock("x", 0, 1), ResultCode::InsufficientStock)]
    #[case::commit_conflict(StoreError::stock_commit_conflict("x"), ResultCode::InsufficientStock)]
    #[case::timeout(StoreError::timeout("client"), ResultCode::Unknown)]
    fn test_error_codes(#[case] error: StoreError, #[case] expected: ResultCode) {
        assert_eq!(error.code(), expected);
    }

    #[rstest]
    #[case::unknown_command(StoreError::unknown_command("FOO"), false)]
    #[case::not_found(StoreError::item_not_found("x"), false)]
    #[case::commit_conflict(StoreError::stock_commit_conflict("x"), false)]
    #[case::malformed_bank_reply(StoreError::malformed_bank_reply(""), true)]
    #[case::timeout(StoreError::timeout("bank"), true)]
    #[case::disconnected(StoreError::ClientDisconnected, true)]
    fn test_fatality(#[case] error: StoreError, #[case] fatal: bool) {
        assert_eq!(error.is_fatal(), fatal);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error =
            std::io::Error::new(std::io::ErrorKind::ConnectionReset, "Connection reset");
        let error: StoreError = io_error.into();
        assert!(matches!(error, StoreError::Io { .. }));
        assert!(error.is_fatal());
        assert_eq!(error.to_string(), "I/O error: Connection reset");
    }

    #[test]
    fn test_line_length_error_conversion() {
        let error: StoreError = LinesCodecError::MaxLineLengthExceeded.into();
        assert!(matches!(error, StoreError::Codec { .. }));
    }
}
