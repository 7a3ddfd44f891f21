//! Stack Tower (workspace facade crate).
//!
//! This package exposes `stack_tower::{core,store,types}` while the
//! implementation lives in dedicated crates under `crates/`.

pub use stack_tower_core as core;
pub use stack_tower_store as store;
pub use stack_tower_types as types;
