//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`output`] - Messages, annotations and step outputs
//!
//! # Design
//!
//! All user-facing output goes through [`output::Reporter`] so that quiet
//! mode, debug mode and GitHub Actions formatting are handled in one place.
//! Diagnostics for developers go through `tracing` instead.

pub mod output;
