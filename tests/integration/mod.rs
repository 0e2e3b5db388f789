//! Integration test suite for Stencil
//!
//! These tests drive the compiled `stencil` binary against throwaway projects.
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **run**: Rendering, compiling and concatenation through `stencil run`
//! - **client**: Client bundle assembly, from a target and from `stencil client`
//! - **list**: Target listing
//! - **errors**: Failure reporting and exit codes

#[path = "../common/mod.rs"]
mod common;

mod client;
mod errors;
mod list;
mod run;
