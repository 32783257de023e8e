//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! claim fraud engine test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built test data for common values
//! - `builders`: Builder patterns for claims, policies and histories
//! - `stubs`: Collaborator stubs (fixed, failing, slow, counting)
//! - `assertions`: Custom assertion helpers for decisions and findings
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod stubs;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use stubs::*;
pub use assertions::*;
pub use generators::*;
