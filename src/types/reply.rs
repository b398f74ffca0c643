//! Result codes and replies of the client line protocol
//!
//! Every command produces a `Reply`: a `ResultCode` plus a payload that is
//! only ever non-empty on success. On the wire a reply is rendered as
//! `OK <payload>` or `ERR <code>`.

use std::fmt;

/// Numeric result codes shared with clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ResultCode {
    Success = 0,
    InvalidLogin = 1,
    InvalidRegistration = 2,
    InsufficientFunds = 3,
    InsufficientStock = 4,
    Unauthorized = 251,
    NotFound = 252,
    BadArguments = 253,
    UnknownCommand = 254,
    Unknown = 255,
}

impl ResultCode {
    /// Numeric value sent after `ERR`
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Human-readable label used in log lines
    pub fn label(self) -> &'static str {
        match self {
            ResultCode::Success => "Success",
            ResultCode::InvalidLogin => "Invalid login",
            ResultCode::InvalidRegistration => "Invalid registration",
            ResultCode::InsufficientFunds => "Insufficient funds",
            ResultCode::InsufficientStock => "Insufficient liquor",
            ResultCode::Unauthorized => "Unauthorized access",
            ResultCode::NotFound => "UUID not found",
            ResultCode::BadArguments => "Bad arguments",
            ResultCode::UnknownCommand => "Unknown command",
            ResultCode::Unknown => "Unknown error",
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error {}: {}", self.as_u8(), self.label())
    }
}

/// Outcome of a dispatched command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    code: ResultCode,
    payload: String,
}

impl Reply {
    /// Successful reply carrying `payload`
    pub fn ok(payload: impl Into<String>) -> Self {
        Reply {
            code: ResultCode::Success,
            payload: payload.into(),
        }
    }

    /// Failure reply; failures never carry a payload
    pub fn err(code: ResultCode) -> Self {
        Reply {
            code,
            payload: String::new(),
        }
    }

    pub fn code(&self) -> ResultCode {
        self.code
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn is_success(&self) -> bool {
        self.code == ResultCode::Success
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_success() {
            write!(f, "OK {}", self.payload)
        } else {
            write!(f, "ERR {}", self.code.as_u8())
        }
    }
}
