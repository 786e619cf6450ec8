//! Infrastructure layer - concrete implementations of the domain contracts
//!
//! This layer contains:
//! - ABI loading from JSON files, artifact directories and signatures
//! - Recursive calldata decoding using alloy-dyn-abi

pub mod abi;

pub use abi::{AbiLoader, AlloyAbiDecoder};
