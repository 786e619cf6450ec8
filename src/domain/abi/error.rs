//! Decode failure taxonomy

use serde::Serialize;
use thiserror::Error;

use super::serialize_hex;

/// Why a byte span could not be decoded as a call
///
/// These are ordinary values: callers fall back to showing the raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecodeFailure {
    #[error("calldata too short: {len} bytes, need at least 4 for the selector")]
    TooShort { len: usize },

    #[error("unknown method: no function for selector 0x{}", hex::encode(.selector))]
    UnknownMethod {
        #[serde(serialize_with = "serialize_hex")]
        selector: [u8; 4],
    },

    #[error(
        "selector mismatch: got 0x{}, expected 0x{}",
        hex::encode(.found),
        hex::encode(.expected)
    )]
    SelectorMismatch {
        #[serde(serialize_with = "serialize_hex")]
        found: [u8; 4],
        #[serde(serialize_with = "serialize_hex")]
        expected: [u8; 4],
    },

    #[error("malformed arguments for {method}: {reason}")]
    MalformedArguments { method: String, reason: String },

    #[error("nesting depth limit of {limit} exceeded")]
    DepthExceeded { limit: usize },

    #[error("expansion limit of {limit} nested calls exceeded")]
    ExpansionLimit { limit: usize },
}

impl DecodeFailure {
    /// Stable machine-readable name of the failure kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TooShort { .. } => "too_short",
            Self::UnknownMethod { .. } => "unknown_method",
            Self::SelectorMismatch { .. } => "selector_mismatch",
            Self::MalformedArguments { .. } => "malformed_arguments",
            Self::DepthExceeded { .. } => "depth_exceeded",
            Self::ExpansionLimit { .. } => "expansion_limit",
        }
    }

    /// True when the bytes named a known method but could not be expanded.
    ///
    /// Short input and unknown selectors just mean "plain data".
    pub fn is_opaque(&self) -> bool {
        matches!(
            self,
            Self::MalformedArguments { .. }
                | Self::DepthExceeded { .. }
                | Self::ExpansionLimit { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let failure = DecodeFailure::UnknownMethod {
            selector: [0xde, 0xad, 0xbe, 0xef],
        };
        assert_eq!(
            failure.to_string(),
            "unknown method: no function for selector 0xdeadbeef"
        );
        assert_eq!(failure.kind(), "unknown_method");
        assert!(!failure.is_opaque());

        let failure = DecodeFailure::MalformedArguments {
            method: "transfer(address,uint256)".to_string(),
            reason: "buffer overrun".to_string(),
        };
        assert!(failure.to_string().starts_with("malformed arguments"));
        assert!(failure.is_opaque());
    }

    #[test]
    fn test_serialize_tagged() {
        let failure = DecodeFailure::UnknownMethod {
            selector: [0xa9, 0x05, 0x9c, 0xbb],
        };
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["kind"], "unknown_method");
        assert_eq!(json["selector"], "0xa9059cbb");

        let json = serde_json::to_value(DecodeFailure::DepthExceeded { limit: 3 }).unwrap();
        assert_eq!(json["kind"], "depth_exceeded");
        assert_eq!(json["limit"], 3);

        let failure = DecodeFailure::ExpansionLimit { limit: 256 };
        assert_eq!(serde_json::to_value(&failure).unwrap()["kind"], "expansion_limit");
        assert!(failure.is_opaque());
    }
}
