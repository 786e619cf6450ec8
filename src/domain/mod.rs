//! Domain layer - decoder contracts and the decoded call tree
//!
//! Nothing in here depends on how call data is actually decoded; the
//! alloy-backed implementation lives in `infrastructure`.

pub mod abi;
