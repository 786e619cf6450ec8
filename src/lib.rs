//! Recursive EVM calldata decoding
//!
//! Decodes ABI-encoded call data into a [`CallNode`] tree, expanding any
//! `bytes` argument that is itself a call known to the same interface
//! description, and renders that tree as nested text.
//!
//! ```no_run
//! use calltree::{AbiLoader, AlloyAbiDecoder, ui};
//!
//! let registry = AbiLoader::bundled_multisig()?;
//! let decoder = AlloyAbiDecoder::new(registry);
//! println!("{}", ui::render_input(&decoder, "0xc6427474...").to_text());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logging;
pub mod ui;

pub use domain::abi::{
    AbiDecoder, AbiRegistry, CallNode, DecodeFailure, DecodeOutcome, DecodedValue,
    FunctionSignature, ParamSpec, ParameterNode,
};
pub use infrastructure::abi::{AbiLoader, AlloyAbiDecoder};
