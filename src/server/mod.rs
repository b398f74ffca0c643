//! Server module
//!
//! - `config` - process configuration
//! - `session` - per-connection command loop and the connected count
//! - `listener` - TCP accept loop

pub mod config;
pub mod listener;
pub mod session;

pub use config::ServerConfig;
pub use listener::StoreServer;
pub use session::{serve_connection, Session, SessionContext, SessionGuard, SessionTracker};
