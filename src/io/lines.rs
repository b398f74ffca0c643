//! Line framing of the client connection
//!
//! Clients speak a line-oriented text protocol. The connection is wrapped in
//! a `Framed` stream using `LinesCodec`, which strips `\n` / `\r\n`
//! terminators on read and appends `\n` on write. Every read goes through
//! [`read_line`] so no wait on the client is ever unbounded.

use crate::types::StoreError;
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{Framed, LinesCodec};

/// Longest line accepted from a client
pub const MAX_LINE_LENGTH: usize = 4096;

/// A client connection speaking the line protocol
pub type ClientConnection<T> = Framed<T, LinesCodec>;

/// Wrap a byte stream in the line codec
pub fn client_connection<T>(stream: T) -> ClientConnection<T>
where
    T: AsyncRead + AsyncWrite,
{
    Framed::new(stream, LinesCodec::new_with_max_length(MAX_LINE_LENGTH))
}

/// Read the next line, waiting at most `limit`
///
/// # Returns
///
/// * `Ok(Some(line))` - a complete line, terminator removed
/// * `Ok(None)` - the peer closed the connection
/// * `Err(StoreError::Timeout)` - nothing arrived within `limit`
/// * `Err(_)` - I/O or framing failure
pub async fn read_line<T>(
    conn: &mut ClientConnection<T>,
    limit: Duration,
) -> Result<Option<String>, StoreError>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    match tokio::time::timeout(limit, conn.next()).await {
        Err(_) => Err(StoreError::timeout("client")),
        Ok(None) => Ok(None),
        Ok(Some(line)) => Ok(Some(line?)),
    }
}

/// Write one line and flush it
pub async fn write_line<T>(conn: &mut ClientConnection<T>, line: &str) -> Result<(), StoreError>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    conn.send(line).await?;
    Ok(())
}
