//! Purchase transaction coordinator
//!
//! Drives one BUY from price quote to commit or abort:
//!
//! ```text
//! get item ──> quote "OK <price>" ──> read payment ──> bank exchange
//!                                                          │
//!                    decline: reply verbatim <── decode ───┤
//!                    approve: adjust_stock(-1) <───────────┘
//! ```
//!
//! An approved purchase is answered with two lines: the bank's decoded
//! approval, then `Here, enjoy your <name>`.
//!
//! Stock is never reserved at quote time. The authoritative check is the
//! atomic `adjust_stock` at commit, so a purchase that loses the race for the
//! last unit after the bank already approved is reported as
//! `StoreError::StockCommitConflict` instead of silently succeeding.
//!
//! Every wait on the client or the bank is bounded by the coordinator's
//! timeout. While the bank is consulted the client connection is still
//! watched, so a client hanging up at any point before the commit aborts the
//! transaction. On any failure the transaction is aborted without touching
//! stock.

use crate::bank::{codec, BankChannel};
use crate::core::traits::InventoryStore;
use crate::io::lines::{read_line, write_line, ClientConnection};
use crate::types::{Item, Reply, StoreError, Transaction, TransactionState};
use futures::StreamExt;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, error, info};

/// Terminal result of a purchase that reached the bank
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseOutcome {
    /// Payment approved and one unit taken from stock
    Committed {
        /// The bank's decoded approval
        approval: String,
        item_name: String,
        remaining: u32,
    },

    /// The bank declined; `message` is its decoded reply
    Declined { message: String },
}

impl PurchaseOutcome {
    /// Final lines sent to the client
    pub fn reply_lines(&self) -> Vec<String> {
        match self {
            PurchaseOutcome::Committed {
                approval,
                item_name,
                ..
            } => vec![approval.clone(), format!("Here, enjoy your {}", item_name)],
            PurchaseOutcome::Declined { message } => vec![message.clone()],
        }
    }
}

/// Runs purchase transactions against a store and a bank
pub struct PurchaseCoordinator<'a> {
    store: &'a dyn InventoryStore,
    bank: &'a dyn BankChannel,
    timeout: Duration,
}

impl<'a> PurchaseCoordinator<'a> {
    /// Create a coordinator
    ///
    /// `timeout` bounds the wait for the client's payment and, separately,
    /// the wait for the bank's reply.
    pub fn new(store: &'a dyn InventoryStore, bank: &'a dyn BankChannel, timeout: Duration) -> Self {
        Self {
            store,
            bank,
            timeout,
        }
    }

    /// Run a BUY of one unit of `item_id` over `conn`
    ///
    /// # Returns
    ///
    /// * `Ok(outcome)` - the bank answered; the caller writes `outcome.reply_lines()`
    /// * `Err(e)` with `!e.is_fatal()` - domain failure, the caller replies `ERR <code>`
    /// * `Err(e)` with `e.is_fatal()` - transport failure, the session must end
    ///
    /// # Errors
    ///
    /// - `ItemNotFound` / `InsufficientStock` before anything is quoted
    /// - `StockCommitConflict` when the bank approved but the unit was gone
    /// - `ClientDisconnected`, `Timeout`, `MalformedBankReply`, `Io` on transport failures
    pub async fn run<T>(
        &self,
        item_id: &str,
        conn: &mut ClientConnection<T>,
    ) -> Result<PurchaseOutcome, StoreError>
    where
        T: AsyncRead + AsyncWrite + Unpin,
    {
        let item = self
            .store
            .get(item_id)
            .ok_or_else(|| StoreError::item_not_found(item_id))?;
        if !item.in_stock() {
            return Err(StoreError::insufficient_stock(item_id, item.stock, 1));
        }

        let mut tx = Transaction::new(item.id.as_str(), item.unit_price);
        let result = self.settle(&mut tx, &item, conn).await;
        if result.is_err() {
            tx.abort();
        }

        info!(
            item = %tx.item_id,
            price = %tx.price_quoted,
            state = %tx.state(),
            "Transaction finished"
        );
        result
    }

    async fn settle<T>(
        &self,
        tx: &mut Transaction,
        item: &Item,
        conn: &mut ClientConnection<T>,
    ) -> Result<PurchaseOutcome, StoreError>
    where
        T: AsyncRead + AsyncWrite + Unpin,
    {
        write_line(conn, &Reply::ok(item.quoted_price()).to_string()).await?;
        tx.transition(TransactionState::AwaitingPayment)?;

        let payment = read_line(conn, self.timeout)
            .await?
            .ok_or(StoreError::ClientDisconnected)?;

        let raw = self.consult_bank(&payment, conn).await?;
        debug!(reply = %raw.trim_end(), "Encoded bank reply");

        let (rotation, message) = codec::open(&raw)?;
        debug!(rotation, message = %message, "Decoded bank reply");

        if !codec::is_approval(&message) {
            tx.transition(TransactionState::Aborted)?;
            return Ok(PurchaseOutcome::Declined { message });
        }

        match self.store.adjust_stock(&tx.item_id, -1) {
            Ok(remaining) => {
                tx.transition(TransactionState::Committed)?;
                Ok(PurchaseOutcome::Committed {
                    approval: message,
                    item_name: item.name.clone(),
                    remaining,
                })
            }
            Err(StoreError::InsufficientStock { .. }) => {
                error!(
                    item = %tx.item_id,
                    price = %tx.price_quoted,
                    "Payment approved by bank but item sold out before commit"
                );
                Err(StoreError::stock_commit_conflict(&tx.item_id))
            }
            Err(e) => {
                error!(item = %tx.item_id, error = %e, "Payment approved by bank but commit failed");
                Err(e)
            }
        }
    }

    /// Relay the payment and wait for the bank's raw reply
    ///
    /// The client connection is polled alongside the bank so a hang-up is
    /// noticed before anything is committed. Lines the client sends in the
    /// meantime are discarded.
    async fn consult_bank<T>(
        &self,
        payment: &str,
        conn: &mut ClientConnection<T>,
    ) -> Result<String, StoreError>
    where
        T: AsyncRead + AsyncWrite + Unpin,
    {
        let exchange = tokio::time::timeout(self.timeout, self.bank.exchange(payment));
        tokio::pin!(exchange);

        loop {
            tokio::select! {
                biased;

                incoming = conn.next() => match incoming {
                    Some(Ok(line)) => debug!(line = %line, "Discarding input while waiting for the bank"),
                    Some(Err(e)) => {
                        debug!(error = %e, "Client connection failed while waiting for the bank");
                        return Err(StoreError::ClientDisconnected);
                    }
                    None => return Err(StoreError::ClientDisconnected),
                },
                reply = &mut exchange => {
                    return reply.map_err(|_| StoreError::timeout("bank"))?;
                }
            }
        }
    }
}
