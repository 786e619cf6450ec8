//! ABI domain models and contracts
//!
//! This module defines the traits and types for calldata decoding,
//! independent of the underlying implementation (alloy-dyn-abi).

mod call;
mod decoder;
mod error;
mod registry;

pub use call::{CallNode, DecodeOutcome, DecodedValue, ParameterNode};
pub use decoder::AbiDecoder;
pub use error::DecodeFailure;
pub use registry::{AbiRegistry, FunctionSignature, ParamSpec};

/// Serialize raw bytes as a `0x`-prefixed hex string
pub(crate) fn serialize_hex<S, T>(bytes: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
    T: AsRef<[u8]>,
{
    serializer.serialize_str(&format!("0x{}", hex::encode(bytes.as_ref())))
}
