//! Decoded call tree

use std::fmt;

use alloy_primitives::{Address, I256, U256};
use serde::{Serialize, Serializer};

use super::{serialize_hex, DecodeFailure};

/// A single decoded ABI value
///
/// Integers keep their full width; nothing is narrowed to a native type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DecodedValue {
    Address {
        #[serde(serialize_with = "serialize_address")]
        value: Address,
    },
    Bool {
        value: bool,
    },
    Int {
        #[serde(serialize_with = "serialize_display")]
        value: I256,
        bits: usize,
    },
    Uint {
        #[serde(serialize_with = "serialize_display")]
        value: U256,
        bits: usize,
    },
    FixedBytes {
        #[serde(serialize_with = "serialize_hex")]
        value: Vec<u8>,
    },
    Bytes {
        #[serde(serialize_with = "serialize_hex")]
        value: Vec<u8>,
    },
    String {
        value: String,
    },
    Function {
        #[serde(serialize_with = "serialize_hex")]
        value: Vec<u8>,
    },
    Array {
        items: Vec<DecodedValue>,
    },
    FixedArray {
        items: Vec<DecodedValue>,
    },
    Tuple {
        items: Vec<DecodedValue>,
    },
}

impl DecodedValue {
    /// Raw payload of a `bytes` or `bytesN` value
    pub fn byte_payload(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes { value } | Self::FixedBytes { value } => Some(value),
            _ => None,
        }
    }
}

fn serialize_address<S: Serializer>(value: &Address, serializer: S) -> Result<S::Ok, S::Error> {
    serialize_hex(&value.as_slice(), serializer)
}

fn serialize_display<S, T>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: fmt::Display,
{
    serializer.collect_str(value)
}

/// One argument of a decoded call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterNode {
    /// Parameter name (or "arg{n}" if unnamed)
    pub name: String,
    /// Declared Solidity type
    pub kind: String,
    pub value: DecodedValue,
    /// Set when `value` is `bytes`/`bytesN` that itself decoded as a call
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nested: Option<Box<CallNode>>,
    /// Set when `value` named a known method but could not be expanded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opaque: Option<DecodeFailure>,
}

/// A decoded method call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallNode {
    /// The call data span this node was decoded from
    #[serde(serialize_with = "serialize_hex")]
    pub calldata: Vec<u8>,
    /// Function name
    pub name: String,
    /// Full function signature (e.g., "transfer(address,uint256)")
    pub signature: String,
    pub parameters: Vec<ParameterNode>,
}

impl CallNode {
    /// Look up a parameter by name
    pub fn parameter(&self, name: &str) -> Option<&ParameterNode> {
        self.parameters.iter().find(|param| param.name == name)
    }

    /// Whether any branch of the tree was left unexpanded because of a failure
    pub fn has_opaque_leaves(&self) -> bool {
        self.parameters.iter().any(|param| {
            param.opaque.is_some()
                || param
                    .nested
                    .as_deref()
                    .is_some_and(CallNode::has_opaque_leaves)
        })
    }

    /// Number of call levels in the tree, counting this node
    pub fn depth(&self) -> usize {
        1 + self
            .parameters
            .iter()
            .filter_map(|param| param.nested.as_deref())
            .map(CallNode::depth)
            .max()
            .unwrap_or(0)
    }
}

/// How much of an input could be decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeOutcome {
    /// Every recognised payload was expanded
    Complete,
    /// Decoded, with one or more opaque leaves
    Partial,
    /// Nothing decoded; show raw bytes
    Undecodable,
}

impl DecodeOutcome {
    pub fn of(result: &Result<CallNode, DecodeFailure>) -> Self {
        match result {
            Ok(node) if node.has_opaque_leaves() => Self::Partial,
            Ok(_) => Self::Complete,
            Err(_) => Self::Undecodable,
        }
    }
}
