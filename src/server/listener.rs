//! TCP listener
//!
//! Accepts client connections and spawns one task per session. Accept
//! failures are logged and the loop keeps going; only a shutdown signal ends
//! it.

use crate::server::session::{serve_connection, SessionContext};
use crate::types::StoreError;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{error, info};

/// The store's client-facing server
pub struct StoreServer {
    listener: TcpListener,
    ctx: Arc<SessionContext>,
    shutdown_tx: broadcast::Sender<()>,
}

impl StoreServer {
    /// Bind the listener
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the address cannot be bound.
    pub async fn bind(addr: &str, ctx: Arc<SessionContext>) -> Result<Self, StoreError> {
        let listener = TcpListener::bind(addr).await.map_err(|e| StoreError::Io {
            message: format!("Failed to bind '{}': {}", addr, e),
        })?;
        let (shutdown_tx, _) = broadcast::channel(1);

        Ok(Self {
            listener,
            ctx,
            shutdown_tx,
        })
    }

    /// Address actually bound (useful when binding port 0)
    pub fn local_addr(&self) -> Result<SocketAddr, StoreError> {
        Ok(self.listener.local_addr()?)
    }

    /// Sender that stops the accept loop when signalled
    pub fn shutdown_sender(&self) -> broadcast::Sender<()> {
        self.shutdown_tx.clone()
    }

    /// Shared session state, e.g. for reading the connected count
    pub fn context(&self) -> Arc<SessionContext> {
        Arc::clone(&self.ctx)
    }

    /// Accept connections until shutdown is signalled
    ///
    /// Sessions already running are left to finish on their own tasks.
    pub async fn run(self) -> Result<(), StoreError> {
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        info!(addr = %self.local_addr()?, "Listening");

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("Shutdown requested, no longer accepting connections");
                    return Ok(());
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let ctx = Arc::clone(&self.ctx);
                        tokio::spawn(serve_connection(ctx, stream, peer.to_string()));
                    }
                    Err(e) => error!(error = %e, "Failed to accept connection"),
                },
            }
        }
    }
}
