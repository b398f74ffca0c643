//! Client sessions
//!
//! One `Session` exists per accepted connection. It reads commands line by
//! line, answers HI and LIST through the `Dispatcher` and hands BUY to a
//! fresh `PurchaseCoordinator`.
//!
//! # Connected count
//!
//! `SessionTracker` is the process-wide count of connected sessions. Opening
//! a session registers it and yields a `SessionGuard`; the guard decrements
//! the count exactly once when the session is dropped, whether it ended
//! cleanly, on a fatal error, or because its task was cancelled.
//!
//! # Failure isolation
//!
//! Protocol and domain errors are answered with `ERR <code>` and the session
//! keeps reading. Transport errors end the session; they are logged with the
//! peer's identity and never leave the session's task.

use crate::bank::BankChannel;
use crate::core::{Dispatch, Dispatcher, InventoryStore, PurchaseCoordinator};
use crate::io::lines::{client_connection, read_line, write_line, ClientConnection};
use crate::server::config::ServerConfig;
use crate::types::{Reply, StoreError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, error, info, info_span, warn, Instrument};

/// Process-wide count of connected sessions
#[derive(Debug, Clone, Default)]
pub struct SessionTracker {
    connected: Arc<AtomicUsize>,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more session; the count drops again when the guard drops
    pub fn register(&self) -> SessionGuard {
        self.connected.fetch_add(1, Ordering::SeqCst);
        SessionGuard {
            connected: Arc::clone(&self.connected),
        }
    }

    /// Sessions currently connected
    pub fn connected(&self) -> usize {
        self.connected.load(Ordering::SeqCst)
    }
}

/// Registration of one live session in a `SessionTracker`
#[derive(Debug)]
pub struct SessionGuard {
    connected: Arc<AtomicUsize>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.connected.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Everything sessions share
pub struct SessionContext {
    pub store: Arc<dyn InventoryStore>,
    pub bank: Arc<dyn BankChannel>,
    pub dispatcher: Dispatcher,
    pub tracker: SessionTracker,
    pub transaction_timeout: Duration,
    pub idle_timeout: Duration,
}

impl SessionContext {
    /// Build the shared context from the server configuration
    pub fn new(
        store: Arc<dyn InventoryStore>,
        bank: Arc<dyn BankChannel>,
        config: &ServerConfig,
    ) -> Self {
        let dispatcher = Dispatcher::new(
            Arc::clone(&store),
            config.store_name.as_str(),
            config.owner_id.as_str(),
        );
        Self {
            store,
            bank,
            dispatcher,
            tracker: SessionTracker::new(),
            transaction_timeout: config.transaction_timeout,
            idle_timeout: config.idle_timeout,
        }
    }
}

/// One client connection
#[derive(Debug)]
pub struct Session {
    pub peer: String,
    pub connected_at: Instant,
    _registration: SessionGuard,
}

impl Session {
    /// Register a new session for `peer`
    pub fn open(tracker: &SessionTracker, peer: impl Into<String>) -> Self {
        Self {
            peer: peer.into(),
            connected_at: Instant::now(),
            _registration: tracker.register(),
        }
    }

    /// Serve commands until the client leaves or a fatal error occurs
    pub async fn run<T>(
        &self,
        ctx: &SessionContext,
        conn: &mut ClientConnection<T>,
    ) -> Result<(), StoreError>
    where
        T: AsyncRead + AsyncWrite + Unpin,
    {
        loop {
            let line = match read_line(conn, ctx.idle_timeout).await? {
                Some(line) => line,
                None => return Ok(()),
            };

            if line.trim().is_empty() {
                warn!("Empty message");
                continue;
            }
            debug!(line = %line, "Command received");

            match ctx.dispatcher.dispatch(&line, ctx.tracker.connected()) {
                Dispatch::Reply(reply) => send_reply(conn, &reply).await?,
                Dispatch::Purchase(item_id) => {
                    let coordinator = PurchaseCoordinator::new(
                        ctx.store.as_ref(),
                        ctx.bank.as_ref(),
                        ctx.transaction_timeout,
                    );
                    match coordinator.run(&item_id, conn).await {
                        Ok(outcome) => {
                            for line in outcome.reply_lines() {
                                write_line(conn, &line).await?;
                            }
                        }
                        Err(e) if e.is_fatal() => return Err(e),
                        Err(e) => {
                            debug!(error = %e, "Purchase failed");
                            send_reply(conn, &Reply::err(e.code())).await?
                        }
                    }
                }
            }
        }
    }
}

async fn send_reply<T>(conn: &mut ClientConnection<T>, reply: &Reply) -> Result<(), StoreError>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    if !reply.is_success() {
        warn!(code = reply.code().as_u8(), "{}", reply.code());
    }
    write_line(conn, &reply.to_string()).await
}

/// Serve one accepted connection to completion
///
/// Never returns an error: whatever happens is logged under a span carrying
/// the peer address, and the session is unregistered before returning.
pub async fn serve_connection<T>(ctx: Arc<SessionContext>, stream: T, peer: String)
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    let span = info_span!("session", peer = %peer);
    async move {
        let session = Session::open(&ctx.tracker, peer);
        info!(connected = ctx.tracker.connected(), "Accepted connection");

        let mut conn = client_connection(stream);
        let result = session.run(&ctx, &mut conn).await;
        let elapsed_ms = session.connected_at.elapsed().as_millis() as u64;
        drop(session);

        match result {
            Ok(()) => info!(elapsed_ms, "Finished connection"),
            Err(e @ (StoreError::ClientDisconnected | StoreError::Timeout { .. })) => {
                info!(elapsed_ms, reason = %e, "Connection dropped")
            }
            Err(e @ StoreError::MalformedBankReply { .. }) => {
                warn!(elapsed_ms, error = %e, "Connection terminated")
            }
            Err(e) => error!(elapsed_ms, error = %e, "Connection terminated"),
        }
    }
    .instrument(span)
    .await
}
