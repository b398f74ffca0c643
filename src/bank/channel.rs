//! Secondary channel to the bank endpoint
//!
//! The purchase coordinator relays the client's payment blob to the bank and
//! waits for a single sealed reply. `BankChannel` is the seam; the server
//! uses `UdpBankChannel`, tests substitute scripted banks.

use crate::types::StoreError;
use async_trait::async_trait;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::net::UdpSocket;
use tracing::{debug, warn};

/// Largest bank datagram accepted
pub const MAX_DATAGRAM: usize = 4096;

/// One request/reply exchange with the bank
#[async_trait]
pub trait BankChannel: Send + Sync {
    /// Forward `payment` verbatim and return the bank's raw reply text
    ///
    /// Callers bound the wait with their own timeout; dropping the returned
    /// future releases everything the exchange holds.
    async fn exchange(&self, payment: &str) -> Result<String, StoreError>;
}

/// Bank reached over UDP
///
/// Every exchange binds its own ephemeral socket, so a reply can only ever
/// reach the purchase that asked for it. Replies are accepted from any
/// source address.
#[derive(Debug, Clone)]
pub struct UdpBankChannel {
    bank_addr: String,
}

impl UdpBankChannel {
    /// Create a channel towards `bank_addr` (`host:port`)
    pub fn new(bank_addr: impl Into<String>) -> Self {
        Self {
            bank_addr: bank_addr.into(),
        }
    }

    /// Resolve the bank endpoint, preferring IPv4 when the name has both
    async fn resolve(&self) -> Result<SocketAddr, StoreError> {
        let candidates: Vec<SocketAddr> = tokio::net::lookup_host(&self.bank_addr)
            .await?
            .collect();

        candidates
            .iter()
            .find(|addr| addr.is_ipv4())
            .or_else(|| candidates.first())
            .copied()
            .ok_or_else(|| StoreError::Io {
                message: format!("Bank address '{}' did not resolve", self.bank_addr),
            })
    }
}

#[async_trait]
impl BankChannel for UdpBankChannel {
    async fn exchange(&self, payment: &str) -> Result<String, StoreError> {
        let target = self.resolve().await?;
        let local: SocketAddr = match target {
            SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
            SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
        };
        let socket = UdpSocket::bind(local).await?;

        socket.send_to(payment.as_bytes(), target).await?;
        debug!(bank = %target, bytes = payment.len(), "Payment relayed to bank");

        let mut buf = vec![0u8; MAX_DATAGRAM];
        let (len, from) = socket.recv_from(&mut buf).await?;
        if from != target {
            debug!(bank = %target, from = %from, "Bank answered from another address");
        }
        if len == MAX_DATAGRAM {
            warn!(
                bank = %target,
                limit = MAX_DATAGRAM,
                "Bank reply filled the whole datagram buffer and may be truncated"
            );
        }
        Ok(String::from_utf8_lossy(&buf[..len]).into_owned())
    }
}
