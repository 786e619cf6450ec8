//! ABI infrastructure - Alloy-based ABI loading and decoding

mod decoder;
mod loader;

pub use decoder::AlloyAbiDecoder;
pub use loader::AbiLoader;
