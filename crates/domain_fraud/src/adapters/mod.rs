//! Collaborator adapters shipped with the engine
//!
//! - [`CatalogueValuationService`]: offline make/model price table with age depreciation
//! - [`InMemoryPolicyService`] and [`InMemoryClaimsHistoryService`]: map-backed
//!   lookups for batch evaluation and tests

pub mod catalogue;
pub mod in_memory;

pub use catalogue::CatalogueValuationService;
pub use in_memory::{InMemoryClaimsHistoryService, InMemoryPolicyService};
