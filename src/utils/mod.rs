//! Shared utilities
//!
//! - [`fs`] - Tolerant reads, basenames, directory creation and atomic writes
//! - [`object`] - Shallow merge/extend of JSON objects used as rendering contexts

pub mod fs;
pub mod object;

pub use fs::{ensure_dir, name_of, read_or_none, safe_write};
pub use object::{extend, merge};
