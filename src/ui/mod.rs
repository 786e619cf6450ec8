//! Presentation of decoded calls

pub mod call_tree;

pub use call_tree::{render, render_input, render_result, Rendered, RenderedCall, TreeLine};
