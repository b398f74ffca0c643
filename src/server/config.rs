//! Server configuration
//!
//! `ServerConfig` gathers every process input the server needs. It is built
//! from the command line (see `cli`) but can be constructed directly, which
//! is what the integration tests do.

use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Store owner's identifier appended to LIST payloads
pub const DEFAULT_OWNER_ID: &str = "4e0d3bbc-fac8-4a28-909a-752f65cf9c6c";

/// Name returned by the HI handshake
pub const DEFAULT_STORE_NAME: &str = "liquor_store";

/// Bound on each payment and bank wait, in seconds
pub const DEFAULT_TRANSACTION_TIMEOUT_SECS: u64 = 30;

/// Bound on the wait for the next command, in seconds
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 300;

/// Runtime configuration of the store server
#[derive(Clone, Debug, PartialEq)]
pub struct ServerConfig {
    /// Address the client listener binds to (`host:port`)
    pub listen_addr: String,

    /// Bank endpoint (`host:port`)
    pub bank_addr: String,

    /// Inventory snapshot; `None` keeps the inventory in memory only
    pub inventory_path: Option<PathBuf>,

    pub store_name: String,

    pub owner_id: String,

    /// Bound on the client's payment and on the bank's reply
    pub transaction_timeout: Duration,

    /// Bound on the wait for the next command
    pub idle_timeout: Duration,

    /// Tokio worker threads
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8000".to_string(),
            bank_addr: "127.0.0.1:9000".to_string(),
            inventory_path: None,
            store_name: DEFAULT_STORE_NAME.to_string(),
            owner_id: DEFAULT_OWNER_ID.to_string(),
            transaction_timeout: Duration::from_secs(DEFAULT_TRANSACTION_TIMEOUT_SECS),
            idle_timeout: Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS),
            workers: num_cpus::get(),
        }
    }
}

impl ServerConfig {
    /// Create a configuration for the given endpoints with default tunables
    pub fn new(listen_addr: impl Into<String>, bank_addr: impl Into<String>) -> Self {
        Self {
            listen_addr: listen_addr.into(),
            bank_addr: bank_addr.into(),
            ..Self::default()
        }
    }

    /// Override the tunables, falling back to defaults for zero values
    ///
    /// A zero timeout or worker count would make the server unusable, so it
    /// is replaced by the default with a warning.
    pub fn with_tunables(
        mut self,
        transaction_timeout_secs: u64,
        idle_timeout_secs: u64,
        workers: usize,
    ) -> Self {
        let default = Self::default();

        self.transaction_timeout = if transaction_timeout_secs == 0 {
            warn!(
                default = DEFAULT_TRANSACTION_TIMEOUT_SECS,
                "Invalid transaction timeout (0), using default"
            );
            default.transaction_timeout
        } else {
            Duration::from_secs(transaction_timeout_secs)
        };

        self.idle_timeout = if idle_timeout_secs == 0 {
            warn!(
                default = DEFAULT_IDLE_TIMEOUT_SECS,
                "Invalid idle timeout (0), using default"
            );
            default.idle_timeout
        } else {
            Duration::from_secs(idle_timeout_secs)
        };

        self.workers = if workers == 0 {
            warn!(default = default.workers, "Invalid worker count (0), using default");
            default.workers
        } else {
            workers
        };

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_new_keeps_defaults() {
        let config = ServerConfig::new("0.0.0.0:7000", "10.0.0.2:7001");

        assert_eq!(config.listen_addr, "0.0.0.0:7000");
        assert_eq!(config.bank_addr, "10.0.0.2:7001");
        assert_eq!(config.owner_id, DEFAULT_OWNER_ID);
        assert_eq!(config.store_name, DEFAULT_STORE_NAME);
        assert_eq!(config.inventory_path, None);
        assert_eq!(config.workers, num_cpus::get());
    }

    #[rstest]
    #[case::custom(10, 60, 4, 10, 60, 4)]
    #[case::zero_transaction_timeout(0, 60, 4, DEFAULT_TRANSACTION_TIMEOUT_SECS, 60, 4)]
    #[case::zero_idle_timeout(10, 0, 4, 10, DEFAULT_IDLE_TIMEOUT_SECS, 4)]
    #[case::zero_workers(10, 60, 0, 10, 60, num_cpus::get())]
    fn test_with_tunables(
        #[case] transaction_secs: u64,
        #[case] idle_secs: u64,
        #[case] workers: usize,
        #[case] expected_transaction_secs: u64,
        #[case] expected_idle_secs: u64,
        #[case] expected_workers: usize,
    ) {
        let config = ServerConfig::default().with_tunables(transaction_secs, idle_secs, workers);

        assert_eq!(
            config.transaction_timeout,
            Duration::from_secs(expected_transaction_secs)
        );
        assert_eq!(config.idle_timeout, Duration::from_secs(expected_idle_secs));
        assert_eq!(config.workers, expected_workers);
    }
}
