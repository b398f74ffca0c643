//! Bank channel codec
//!
//! Messages exchanged with the bank are obfuscated with a fixed rotation:
//! ASCII letters rotate within their case by `rotation mod 26`, decimal digits
//! rotate by `rotation mod 10`, everything else passes through. This is a wire
//! convention shared with the bank, not a security mechanism.
//!
//! On the wire the rotation travels in clear as the last whitespace-delimited
//! token:
//!
//! ```text
//! <rotated payload tokens...> <rotation>
//! ```

use crate::types::StoreError;

/// Marker leading a decoded bank reply that approves the payment
pub const SUCCESS_MARKER: &str = "OK";

/// Rotate every alphanumeric character of `message` by `rotation`
pub fn encode(message: &str, rotation: i64) -> String {
    let letter_shift = rotation.rem_euclid(26) as u8;
    let digit_shift = rotation.rem_euclid(10) as u8;

    message
        .chars()
        .map(|c| match c {
            'a'..='z' => rotate(c, b'a', 26, letter_shift),
            'A'..='Z' => rotate(c, b'A', 26, letter_shift),
            '0'..='9' => rotate(c, b'0', 10, digit_shift),
            other => other,
        })
        .collect()
}

/// Inverse of [`encode`] for the same rotation
pub fn decode(text: &str, rotation: i64) -> String {
    // Negating i64::MIN overflows; 260 is a multiple of both alphabet sizes
    encode(text, -(rotation % 260))
}

fn rotate(c: char, base: u8, span: u8, shift: u8) -> char {
    let offset = (c as u8 - base + shift) % span;
    (base + offset) as char
}

/// Encode `message` and append the rotation trailer
pub fn seal(message: &str, rotation: i64) -> String {
    format!("{} {}", encode(message, rotation), rotation)
}

/// Split a sealed message into its rotation and decoded payload
///
/// The payload tokens are re-joined with single spaces.
///
/// # Errors
///
/// Returns `StoreError::MalformedBankReply` when the text is blank, its last
/// token is not an integer, or nothing precedes the rotation.
pub fn open(text: &str) -> Result<(i64, String), StoreError> {
    let mut tokens: Vec<&str> = text.split_whitespace().collect();
    let trailer = tokens
        .pop()
        .ok_or_else(|| StoreError::malformed_bank_reply(text))?;
    let rotation: i64 = trailer
        .parse()
        .map_err(|_| StoreError::malformed_bank_reply(text))?;
    if tokens.is_empty() {
        return Err(StoreError::malformed_bank_reply(text));
    }

    Ok((rotation, decode(&tokens.join(" "), rotation)))
}

/// Whether a decoded bank message approves the payment
pub fn is_approval(message: &str) -> bool {
    message.split_whitespace().next() == Some(SUCCESS_MARKER)
}
