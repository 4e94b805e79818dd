//! # boxengine-common
//!
//! Shared error definitions, configuration models, domain primitives, and
//! constants used across the BoxEngine workspace.
//!
//! This crate is the leaf of the dependency graph. It depends on no other
//! internal crate and performs no privileged work of its own.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
