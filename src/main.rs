//! Liquor Store Server
//!
//! # Usage
//!
//! ```bash
//! cargo run -- 127.0.0.1 8000 127.0.0.1 9000
//! cargo run -- --inventory stock.csv 0.0.0.0 8000 bank.local 9000
//! RUST_LOG=debug cargo run -- --transaction-timeout 10 127.0.0.1 8000 127.0.0.1 9000
//! ```
//!
//! The server accepts clients until Ctrl-C. When `--inventory` is given the
//! snapshot is loaded at start (the default catalogue is used if the file does
//! not exist yet) and written back on shutdown.
//!
//! # Exit Codes
//!
//! - 0: Clean shutdown
//! - 1: Error (bad arguments, address in use, unreadable snapshot, etc.)

use liquor_store::bank::UdpBankChannel;
use liquor_store::io::{open_inventory, save_inventory};
use liquor_store::server::{ServerConfig, SessionContext, StoreServer};
use liquor_store::{cli, logging, InventoryStore, StoreError};
use std::process;
use std::sync::Arc;
use tracing::{error, info};

fn main() {
    logging::setup_tracing();
    let config = cli::parse_args().to_server_config();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.workers)
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to start runtime");
            process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run(config)) {
        error!(error = %e, "Server stopped");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(config: ServerConfig) -> Result<(), StoreError> {
    let store = Arc::new(open_inventory(config.inventory_path.as_deref())?);
    let bank = Arc::new(UdpBankChannel::new(config.bank_addr.as_str()));

    let ctx = Arc::new(SessionContext::new(store.clone(), bank, &config));
    let server = StoreServer::bind(&config.listen_addr, ctx).await?;
    info!(
        bank = %config.bank_addr,
        items = store.len(),
        workers = config.workers,
        "Store open"
    );

    let shutdown = server.shutdown_sender();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown.send(());
        }
    });

    server.run().await?;

    if let Some(path) = config.inventory_path.as_deref() {
        save_inventory(&store.list(), path)?;
    }
    info!("Store closed");
    Ok(())
}
