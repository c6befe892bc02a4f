//! Search orchestration module.

pub mod core;

pub use core::{MemorySearcher, SearchBackends};
