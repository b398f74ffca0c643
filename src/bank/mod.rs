//! Bank module
//!
//! Everything needed to settle a payment with the external bank:
//! - `codec` - rotation codec and the sealed message format
//! - `channel` - the `BankChannel` seam and its UDP implementation

pub mod channel;
pub mod codec;

pub use channel::{BankChannel, UdpBankChannel};
