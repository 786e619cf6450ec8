//! ABI registry - the interface description, function signatures by selector

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A function parameter specification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Parameter name (may be empty)
    pub name: String,
    /// Solidity type (e.g., "address", "uint256", "(uint256,address)")
    pub kind: String,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
        }
    }
}

/// A function signature with its metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSignature {
    /// 4-byte function selector
    pub selector: [u8; 4],
    /// Function name
    pub name: String,
    /// Full signature string (e.g., "transfer(address,uint256)")
    pub signature: String,
    /// "pure", "view", "nonpayable" or "payable"
    pub state_mutability: String,
    /// Input parameters
    pub inputs: Vec<ParamSpec>,
    /// Where this signature came from (file path, "<signature>", "<bundled:...>")
    pub source: String,
}

impl FunctionSignature {
    /// Get selector as hex string
    pub fn selector_hex(&self) -> String {
        format!("0x{}", hex::encode(self.selector))
    }
}

/// Registry of function signatures indexed by selector
#[derive(Debug, Default, Clone)]
pub struct AbiRegistry {
    /// Functions indexed by 4-byte selector
    functions: HashMap<[u8; 4], FunctionSignature>,
    /// Number of files read while loading
    pub scanned_files: usize,
    /// Load errors, one line per failing source
    pub errors: Vec<String>,
}

impl AbiRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a function signature
    ///
    /// Note: First function for a given selector wins (no overwrite)
    pub fn insert(&mut self, function: FunctionSignature) {
        self.functions.entry(function.selector).or_insert(function);
    }

    /// Look up a function by selector
    pub fn lookup(&self, selector: [u8; 4]) -> Option<&FunctionSignature> {
        self.functions.get(&selector)
    }

    /// Look up a function by selector hex string (e.g., "0xa9059cbb")
    pub fn lookup_hex(&self, selector_hex: &str) -> Option<&FunctionSignature> {
        let normalized = selector_hex
            .strip_prefix("0x")
            .or_else(|| selector_hex.strip_prefix("0X"))
            .unwrap_or(selector_hex);

        if normalized.len() != 8 {
            return None;
        }

        let bytes = hex::decode(normalized).ok()?;
        let selector: [u8; 4] = bytes.try_into().ok()?;
        self.lookup(selector)
    }

    /// Get the number of registered functions
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Merge another registry into this one
    ///
    /// Functions from the other registry are only added if their
    /// selector is not already present (first wins).
    pub fn merge(&mut self, other: Self) {
        self.scanned_files = self.scanned_files.saturating_add(other.scanned_files);
        self.errors.extend(other.errors);
        for (selector, function) in other.functions {
            self.functions.entry(selector).or_insert(function);
        }
    }

    /// Get all functions, ordered by signature
    pub fn functions(&self) -> Vec<&FunctionSignature> {
        let mut functions: Vec<_> = self.functions.values().collect();
        functions.sort_by(|a, b| a.signature.cmp(&b.signature));
        functions
    }
}
