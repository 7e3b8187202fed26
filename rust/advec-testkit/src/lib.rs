//! Test utilities and helpers for the advec crates.
//!
//! This crate provides:
//! - Instrumented element types that count constructions and drops and can be
//!   told to fail on a given construction
//! - Seeded random operation scripts for model-based testing of containers
//!
//! # Usage
//!
//! This crate is primarily intended for use within the advec test suites.

pub mod ops;
pub mod tracked;
