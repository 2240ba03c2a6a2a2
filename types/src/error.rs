//! Decoding errors raised while turning caller arguments into typed values.

use thiserror::Error;

/// A caller handed us an argument that cannot be decoded.
///
/// These are contract violations on the caller's side, distinct from
/// business-rule failures, and are always reported before any validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("malformed share value {0:?}: expected a non-negative integer")]
    MalformedShareValue(String),

    #[error("malformed amount {0:?}: expected a decimal with at most 8 fractional digits")]
    MalformedAmount(String),

    #[error("malformed address {0:?}: expected 0x followed by up to 16 hex digits")]
    MalformedAddress(String),

    #[error("malformed receiver path {0:?}")]
    MalformedReceiverPath(String),
}
