//! ABI decoder implementation using alloy-dyn-abi

use std::cell::Cell;

use alloy_dyn_abi::{DynSolType, DynSolValue};
use tracing::{debug, trace};

use crate::domain::abi::{
    AbiDecoder, AbiRegistry, CallNode, DecodeFailure, DecodedValue, FunctionSignature,
    ParameterNode,
};

/// ABI decoder implementation using alloy-dyn-abi
///
/// `bytes` and `bytesN` arguments are decoded again against the same
/// registry, so a multisig `submitTransaction(.., bytes data)` whose `data`
/// is another known call comes back as a nested [`CallNode`].
///
/// Two limits bound the work per decode: `max_depth` caps how deep nesting
/// goes, `max_nested_calls` caps how many nested calls are expanded in the
/// whole tree. ABI offsets may alias, so sibling arguments can point at the
/// same payload and only the second limit keeps fan-out in check.
#[derive(Debug, Clone)]
pub struct AlloyAbiDecoder {
    registry: AbiRegistry,
    max_depth: usize,
    max_nested_calls: usize,
}

/// Nested expansions still allowed for the decode in progress
struct Budget {
    remaining: Cell<usize>,
}

impl Budget {
    fn new(limit: usize) -> Self {
        Self {
            remaining: Cell::new(limit),
        }
    }

    fn try_take(&self) -> bool {
        match self.remaining.get() {
            0 => false,
            n => {
                self.remaining.set(n - 1);
                true
            }
        }
    }
}

impl AlloyAbiDecoder {
    /// Nesting levels expanded below the root call by default
    pub const DEFAULT_MAX_DEPTH: usize = 8;

    /// Nested calls expanded per decode by default, across all branches
    pub const DEFAULT_MAX_NESTED_CALLS: usize = 256;

    /// Create a new decoder with the given registry
    pub fn new(registry: AbiRegistry) -> Self {
        Self {
            registry,
            max_depth: Self::DEFAULT_MAX_DEPTH,
            max_nested_calls: Self::DEFAULT_MAX_NESTED_CALLS,
        }
    }

    /// Limit how many nested calls below the root are expanded
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Limit how many nested calls one decode expands in total
    pub fn with_max_nested_calls(mut self, max_nested_calls: usize) -> Self {
        self.max_nested_calls = max_nested_calls;
        self
    }

    /// Get the underlying registry
    pub fn registry(&self) -> &AbiRegistry {
        &self.registry
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn max_nested_calls(&self) -> usize {
        self.max_nested_calls
    }

    fn decode_at(
        &self,
        data: &[u8],
        depth: usize,
        budget: &Budget,
    ) -> Result<CallNode, DecodeFailure> {
        let selector = selector_of(data)?;
        let Some(function) = self.registry.lookup(selector) else {
            debug!(selector = %hex::encode(selector), depth, "no function for selector");
            return Err(DecodeFailure::UnknownMethod { selector });
        };

        if depth > self.max_depth {
            debug!(function = %function.signature, depth, "nesting limit reached");
            return Err(DecodeFailure::DepthExceeded {
                limit: self.max_depth,
            });
        }

        if depth > 0 && !budget.try_take() {
            debug!(function = %function.signature, depth, "expansion budget spent");
            return Err(DecodeFailure::ExpansionLimit {
                limit: self.max_nested_calls,
            });
        }

        self.decode_with(function, data, depth, budget)
    }

    fn decode_with(
        &self,
        function: &FunctionSignature,
        data: &[u8],
        depth: usize,
        budget: &Budget,
    ) -> Result<CallNode, DecodeFailure> {
        let values = decode_arguments(function, &data[4..])?;

        let parameters = function
            .inputs
            .iter()
            .zip(values)
            .enumerate()
            .map(|(idx, (param, value))| {
                let name = if param.name.trim().is_empty() {
                    format!("arg{}", idx)
                } else {
                    param.name.clone()
                };

                let value = DecodedValue::from(value);
                let (nested, opaque) = match value.byte_payload() {
                    Some(payload) => self.expand(payload, depth + 1, budget),
                    None => (None, None),
                };

                ParameterNode {
                    name,
                    kind: param.kind.clone(),
                    value,
                    nested,
                    opaque,
                }
            })
            .collect();

        Ok(CallNode {
            calldata: data.to_vec(),
            name: function.name.clone(),
            signature: function.signature.clone(),
            parameters,
        })
    }

    /// Best-effort decode of a byte argument as a nested call
    fn expand(
        &self,
        payload: &[u8],
        depth: usize,
        budget: &Budget,
    ) -> (Option<Box<CallNode>>, Option<DecodeFailure>) {
        match self.decode_at(payload, depth, budget) {
            Ok(node) => {
                trace!(function = %node.signature, depth, "expanded nested call");
                (Some(Box::new(node)), None)
            }
            Err(failure) if failure.is_opaque() => {
                debug!(%failure, depth, "nested call left opaque");
                (None, Some(failure))
            }
            Err(_) => (None, None),
        }
    }
}

impl AbiDecoder for AlloyAbiDecoder {
    fn decode(&self, calldata: &[u8]) -> Result<CallNode, DecodeFailure> {
        self.decode_at(calldata, 0, &Budget::new(self.max_nested_calls))
    }

    fn decode_calldata(
        &self,
        function: &FunctionSignature,
        data: &[u8],
    ) -> Result<CallNode, DecodeFailure> {
        let selector = selector_of(data)?;
        if selector != function.selector {
            return Err(DecodeFailure::SelectorMismatch {
                found: selector,
                expected: function.selector,
            });
        }

        self.decode_with(function, data, 0, &Budget::new(self.max_nested_calls))
    }

    fn decode_by_selector(
        &self,
        selector: [u8; 4],
        data: &[u8],
    ) -> Result<Option<CallNode>, DecodeFailure> {
        match self.registry.lookup(selector) {
            Some(function) => self.decode_calldata(function, data).map(Some),
            None => Ok(None),
        }
    }
}

fn selector_of(data: &[u8]) -> Result<[u8; 4], DecodeFailure> {
    data.get(..4)
        .and_then(|prefix| <[u8; 4]>::try_from(prefix).ok())
        .ok_or(DecodeFailure::TooShort { len: data.len() })
}

/// Decode the argument section (everything after the selector)
fn decode_arguments(
    function: &FunctionSignature,
    args_data: &[u8],
) -> Result<Vec<DynSolValue>, DecodeFailure> {
    let malformed = |reason: String| DecodeFailure::MalformedArguments {
        method: function.signature.clone(),
        reason,
    };

    // Parse types from function inputs
    let types = function
        .inputs
        .iter()
        .map(|param| {
            param.kind.parse::<DynSolType>().map_err(|err| {
                malformed(format!(
                    "unsupported type '{}' for param '{}': {}",
                    param.kind, param.name, err
                ))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if types.is_empty() {
        return Ok(Vec::new());
    }

    // Arguments are encoded as a parameter sequence, not as one wrapped tuple
    let decoded = DynSolType::Tuple(types)
        .abi_decode_params(args_data)
        .map_err(|err| malformed(err.to_string()))?;

    match decoded {
        DynSolValue::Tuple(values) => Ok(values),
        other => Ok(vec![other]),
    }
}

impl From<DynSolValue> for DecodedValue {
    fn from(value: DynSolValue) -> Self {
        let items = |values: Vec<DynSolValue>| values.into_iter().map(Self::from).collect();

        match value {
            DynSolValue::Bool(value) => Self::Bool { value },
            DynSolValue::Int(value, bits) => Self::Int { value, bits },
            DynSolValue::Uint(value, bits) => Self::Uint { value, bits },
            DynSolValue::FixedBytes(word, size) => Self::FixedBytes {
                value: word.as_slice()[..size.min(32)].to_vec(),
            },
            DynSolValue::Address(value) => Self::Address { value },
            DynSolValue::Function(func) => Self::Function {
                value: func.as_slice().to_vec(),
            },
            DynSolValue::Bytes(value) => Self::Bytes { value },
            DynSolValue::String(value) => Self::String { value },
            DynSolValue::Array(values) => Self::Array {
                items: items(values),
            },
            DynSolValue::FixedArray(values) => Self::FixedArray {
                items: items(values),
            },
            DynSolValue::Tuple(values) => Self::Tuple {
                items: items(values),
            },
        }
    }
}
