use crate::server::config::{
    ServerConfig, DEFAULT_IDLE_TIMEOUT_SECS, DEFAULT_OWNER_ID, DEFAULT_STORE_NAME,
    DEFAULT_TRANSACTION_TIMEOUT_SECS,
};
use clap::Parser;
use std::net::{Ipv6Addr, SocketAddr};
use std::path::PathBuf;

/// Liquor store server settling purchases with an external bank
#[derive(Parser, Debug)]
#[command(name = "liquor-store-server")]
#[command(about = "Liquor store server settling purchases with an external bank", long_about = None)]
pub struct CliArgs {
    /// Host the client listener binds to
    #[arg(value_name = "HOST")]
    pub host: String,

    /// Port the client listener binds to
    #[arg(value_name = "PORT")]
    pub port: u16,

    /// Bank host
    #[arg(value_name = "BANK_HOST")]
    pub bank_host: String,

    /// Bank UDP port
    #[arg(value_name = "BANK_PORT")]
    pub bank_port: u16,

    /// Inventory snapshot, loaded at start and saved on shutdown
    #[arg(
        long = "inventory",
        value_name = "FILE",
        help = "CSV inventory snapshot (default catalogue when missing)"
    )]
    pub inventory: Option<PathBuf>,

    /// Owner identifier appended to LIST replies
    #[arg(long = "owner-id", value_name = "ID", default_value = DEFAULT_OWNER_ID)]
    pub owner_id: String,

    /// Name returned by the HI handshake
    #[arg(long = "store-name", value_name = "NAME", default_value = DEFAULT_STORE_NAME)]
    pub store_name: String,

    /// Seconds to wait for the payment and for the bank
    #[arg(
        long = "transaction-timeout",
        value_name = "SECS",
        default_value_t = DEFAULT_TRANSACTION_TIMEOUT_SECS
    )]
    pub transaction_timeout: u64,

    /// Seconds an idle client is kept connected
    #[arg(
        long = "idle-timeout",
        value_name = "SECS",
        default_value_t = DEFAULT_IDLE_TIMEOUT_SECS
    )]
    pub idle_timeout: u64,

    /// Runtime worker threads
    #[arg(
        long = "workers",
        value_name = "COUNT",
        help = "Runtime worker threads (default: CPU cores)"
    )]
    pub workers: Option<usize>,
}

impl CliArgs {
    /// Build the server configuration
    ///
    /// Zero timeouts or worker counts fall back to defaults with a warning
    /// (see `ServerConfig::with_tunables`).
    pub fn to_server_config(&self) -> ServerConfig {
        let mut config = ServerConfig::new(
            endpoint(&self.host, self.port),
            endpoint(&self.bank_host, self.bank_port),
        )
        .with_tunables(
            self.transaction_timeout,
            self.idle_timeout,
            self.workers.unwrap_or_else(num_cpus::get),
        );
        config.inventory_path = self.inventory.clone();
        config.owner_id = self.owner_id.clone();
        config.store_name = self.store_name.clone();
        config
    }
}

/// Join a host and a port into a `host:port` address
///
/// IPv6 literals are bracketed (`::1` becomes `[::1]:8000`); host names and
/// IPv4 addresses are joined as they are.
fn endpoint(host: &str, port: u16) -> String {
    match host.parse::<Ipv6Addr>() {
        Ok(ip) => SocketAddr::from((ip, port)).to_string(),
        Err(_) => format!("{}:{}", host, port),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::time::Duration;

    #[test]
    fn test_positional_endpoints() {
        let parsed =
            CliArgs::try_parse_from(["program", "0.0.0.0", "8000", "bank.local", "9000"]).unwrap();
        let config = parsed.to_server_config();

        assert_eq!(config.listen_addr, "0.0.0.0:8000");
        assert_eq!(config.bank_addr, "bank.local:9000");
        assert_eq!(config.inventory_path, None);
        assert_eq!(config.owner_id, DEFAULT_OWNER_ID);
        assert_eq!(config.store_name, DEFAULT_STORE_NAME);
        assert_eq!(
            config.transaction_timeout,
            Duration::from_secs(DEFAULT_TRANSACTION_TIMEOUT_SECS)
        );
        assert_eq!(config.workers, num_cpus::get());
    }

    #[test]
    fn test_all_options() {
        let parsed = CliArgs::try_parse_from([
            "program",
            "--inventory",
            "stock.csv",
            "--owner-id",
            "owner-1",
            "--store-name",
            "corner_shop",
            "--transaction-timeout",
            "5",
            "--idle-timeout",
            "60",
            "--workers",
            "2",
            "127.0.0.1",
            "8000",
            "127.0.0.1",
            "9000",
        ])
        .unwrap();
        let config = parsed.to_server_config();

        assert_eq!(config.inventory_path, Some(PathBuf::from("stock.csv")));
        assert_eq!(config.owner_id, "owner-1");
        assert_eq!(config.store_name, "corner_shop");
        assert_eq!(config.transaction_timeout, Duration::from_secs(5));
        assert_eq!(config.idle_timeout, Duration::from_secs(60));
        assert_eq!(config.workers, 2);
    }

    #[rstest]
    #[case::ipv4("127.0.0.1", 8000, "127.0.0.1:8000")]
    #[case::host_name("bank.local", 9000, "bank.local:9000")]
    #[case::ipv6_loopback("::1", 8000, "[::1]:8000")]
    #[case::ipv6_unspecified("::", 9000, "[::]:9000")]
    #[case::bracketed_ipv6("[::1]", 8000, "[::1]:8000")]
    fn test_endpoint(#[case] host: &str, #[case] port: u16, #[case] expected: &str) {
        assert_eq!(endpoint(host, port), expected);
    }

    #[test]
    fn test_ipv6_endpoints_parse_as_socket_addresses() {
        let config = CliArgs::try_parse_from(["program", "::", "8000", "::1", "9000"])
            .unwrap()
            .to_server_config();

        assert_eq!(
            config.listen_addr.parse::<SocketAddr>().unwrap(),
            "[::]:8000".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(config.bank_addr, "[::1]:9000");
    }

    #[rstest]
    #[case::zero_transaction_timeout(&["program", "--transaction-timeout", "0", "h", "1", "b", "2"])]
    #[case::zero_idle_timeout(&["program", "--idle-timeout", "0", "h", "1", "b", "2"])]
    #[case::zero_workers(&["program", "--workers", "0", "h", "1", "b", "2"])]
    fn test_zero_values_fall_back(#[case] args: &[&str]) {
        let config = CliArgs::try_parse_from(args).unwrap().to_server_config();

        assert!(config.transaction_timeout > Duration::ZERO);
        assert!(config.idle_timeout > Duration::ZERO);
        assert!(config.workers > 0);
    }

    #[rstest]
    #[case::missing_bank(&["program", "127.0.0.1", "8000"])]
    #[case::missing_all(&["program"])]
    #[case::bad_port(&["program", "127.0.0.1", "eight", "127.0.0.1", "9000"])]
    #[case::port_out_of_range(&["program", "127.0.0.1", "8000", "127.0.0.1", "70000"])]
    #[case::negative_timeout(&["program", "--transaction-timeout", "-1", "h", "1", "b", "2"])]
    fn test_parsing_errors(#[case] args: &[&str]) {
        assert!(CliArgs::try_parse_from(args).is_err());
    }
}
