//! # Configuration Module
//!
//! Centralizes the compile-time constants of the encoding layer. Runtime
//! builder configuration (default timezone, per-column timestamp options)
//! lives with the setter factory in [`crate::dynamic`].
//!
//! ## Module Organization
//!
//! - [`constants`]: All numeric and string constants with dependency
//!   documentation

pub mod constants;
pub use constants::*;
