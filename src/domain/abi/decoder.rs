//! ABI decoder trait

use super::{CallNode, DecodeFailure, FunctionSignature};

/// Trait for ABI decoding implementations
///
/// This trait abstracts over the actual ABI decoding implementation,
/// allowing us to swap out alloy-dyn-abi for a different library if needed.
/// Every method is pure: the same input always yields the same tree.
pub trait AbiDecoder: Send + Sync {
    /// Decode calldata, recursing into `bytes` arguments that are
    /// themselves calls known to this decoder
    ///
    /// # Arguments
    /// * `calldata` - The calldata bytes (including the 4-byte selector)
    ///
    /// # Returns
    /// * `Ok(CallNode)` - The decoded call tree
    /// * `Err(DecodeFailure)` - Unknown selector, malformed arguments, too short
    fn decode(&self, calldata: &[u8]) -> Result<CallNode, DecodeFailure>;

    /// Decode calldata against one explicit function signature
    ///
    /// The selector in `data` must match `function.selector`.
    fn decode_calldata(
        &self,
        function: &FunctionSignature,
        data: &[u8],
    ) -> Result<CallNode, DecodeFailure>;

    /// Decode calldata by looking up the selector
    ///
    /// # Returns
    /// * `Ok(Some(CallNode))` - If the selector was found and decoding succeeded
    /// * `Ok(None)` - If the selector was not found
    /// * `Err(...)` - If decoding fails
    fn decode_by_selector(
        &self,
        selector: [u8; 4],
        data: &[u8],
    ) -> Result<Option<CallNode>, DecodeFailure>;
}
