//! RPC status codes and the error status returned instead of a reply.
//!
//! Numeric values follow the canonical RPC code table so that statuses stay
//! meaningful to any client that knows it.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Canonical status code subset used by this service and its transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Code {
    Ok,
    InvalidArgument,
    NotFound,
    Unimplemented,
    Internal,
    Unavailable,
}

impl Code {
    /// Canonical numeric value.
    pub fn as_i32(self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::InvalidArgument => 3,
            Self::NotFound => 5,
            Self::Unimplemented => 12,
            Self::Internal => 13,
            Self::Unavailable => 14,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::NotFound => "NOT_FOUND",
            Self::Unimplemented => "UNIMPLEMENTED",
            Self::Internal => "INTERNAL",
            Self::Unavailable => "UNAVAILABLE",
        }
    }
}

impl Display for Code {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured RPC failure: a code plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{code}: {message}")]
pub struct Status {
    pub code: Code,
    pub message: String,
}

impl Status {
    pub fn new(code: Code, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(Code::InvalidArgument, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(Code::NotFound, message)
    }

    pub fn unimplemented(message: impl Into<String>) -> Self {
        Self::new(Code::Unimplemented, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(Code::Internal, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(Code::Unavailable, message)
    }
}

#[cfg(test)]
mod tests {
    use super::{Code, Status};

    #[test]
    fn codes_use_canonical_numbers() {
        assert_eq!(Code::InvalidArgument.as_i32(), 3);
        assert_eq!(Code::NotFound.as_i32(), 5);
        assert_eq!(Code::Unavailable.as_i32(), 14);
    }

    #[test]
    fn status_serializes_code_by_name() {
        let status = Status::not_found("List with id \"4\" not found.");
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(
            json,
            r#"{"code":"NOT_FOUND","message":"List with id \"4\" not found."}"#
        );
    }

    #[test]
    fn status_display_includes_code_and_message() {
        let status = Status::invalid_argument("bad name");
        assert_eq!(status.to_string(), "INVALID_ARGUMENT: bad name");
    }
}
