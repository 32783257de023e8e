//! Core Kernel - Foundational types shared by the fraud engine crates
//!
//! This crate provides the building blocks used by the scoring engine and
//! its collaborator adapters:
//! - Money types with precise decimal arithmetic and ratio helpers
//! - Date windows for policy terms and rolling history lookups
//! - Strongly typed identifiers
//! - The error type shared by all collaborator ports

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod ports;

pub use money::{Money, Currency, MoneyError};
pub use temporal::{DateWindow, TemporalError, days_between};
pub use identifiers::{ClaimId, ClaimantId};
pub use ports::{PortError, DomainPort};
