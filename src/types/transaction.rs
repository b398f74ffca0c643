//! Purchase transaction types
//!
//! A Transaction exists for exactly one in-flight BUY. It is owned by the
//! coordinator driving that purchase and discarded once it reaches a
//! terminal state.

use super::error::StoreError;
use super::item::ItemId;
use rust_decimal::Decimal;
use std::fmt;

/// Lifecycle state of a purchase
///
/// ```text
/// Pending ──> AwaitingPayment ──> Committed
///    │               │
///    └───────────────┴──────────> Aborted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// Item found and in stock, price not yet quoted
    Pending,

    /// Price quoted, waiting for the client's payment and the bank's answer
    AwaitingPayment,

    /// Bank approved and one unit was taken from stock
    Committed,

    /// Purchase ended without any stock mutation
    Aborted,
}

impl TransactionState {
    /// Whether no further transition is possible
    pub fn is_terminal(self) -> bool {
        matches!(self, TransactionState::Committed | TransactionState::Aborted)
    }

    fn can_transition_to(self, next: TransactionState) -> bool {
        use TransactionState::*;
        matches!(
            (self, next),
            (Pending, AwaitingPayment) | (Pending, Aborted) | (AwaitingPayment, Committed) | (AwaitingPayment, Aborted)
        )
    }
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionState::Pending => "pending",
            TransactionState::AwaitingPayment => "awaiting_payment",
            TransactionState::Committed => "committed",
            TransactionState::Aborted => "aborted",
        };
        f.write_str(label)
    }
}

/// One in-flight purchase
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// Item being bought
    pub item_id: ItemId,

    /// Price quoted to the client when the transaction was opened
    pub price_quoted: Decimal,

    state: TransactionState,
}

impl Transaction {
    /// Open a transaction in the `Pending` state
    pub fn new(item_id: impl Into<ItemId>, price_quoted: Decimal) -> Self {
        Transaction {
            item_id: item_id.into(),
            price_quoted,
            state: TransactionState::Pending,
        }
    }

    /// Current state
    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Move to `next`, rejecting transitions the lifecycle does not allow
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidTransition` when `next` is not reachable
    /// from the current state. The state is left unchanged in that case.
    pub fn transition(&mut self, next: TransactionState) -> Result<(), StoreError> {
        if !self.state.can_transition_to(next) {
            return Err(StoreError::invalid_transition(self.state, next));
        }
        self.state = next;
        Ok(())
    }

    /// Abort the transaction unless it already finished
    ///
    /// Used on every failure path, so it never fails.
    pub fn abort(&mut self) {
        if !self.state.is_terminal() {
            self.state = TransactionState::Aborted;
        }
    }
}
