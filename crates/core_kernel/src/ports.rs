//! Collaborator port infrastructure
//!
//! The engine reads policy, valuation and claims-history data through narrow
//! port traits. Each domain crate defines its own trait extending
//! [`DomainPort`]; adapters (in-memory, catalogue, remote) implement them and
//! report failures with the shared [`PortError`].
//!
//! ```text
//!   ClaimEvaluator ──► PolicyService / VehicleValuationService / ClaimsHistoryService
//!                                  ▲                 ▲
//!                        in-memory adapter     remote adapter
//! ```

use std::fmt;
use thiserror::Error;

/// Error type for port operations
///
/// Every adapter reports failures through this type so the engine can tell
/// a missing record from an unavailable dependency.
#[derive(Debug, Error)]
pub enum PortError {
    /// The requested entity was not found
    #[error("Not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: String,
        id: String,
    },

    /// The operation timed out
    #[error("Timeout after {duration_ms}ms: {operation}")]
    Timeout {
        operation: String,
        duration_ms: u64,
    },

    /// The external system is unavailable
    #[error("Service unavailable: {service}")]
    ServiceUnavailable {
        service: String,
    },

    /// The request could not be served with the data given
    #[error("Invalid request: {message}")]
    InvalidRequest {
        message: String,
    },

    /// An internal error occurred
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PortError {
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    pub fn timeout(operation: impl Into<String>, duration_ms: u64) -> Self {
        PortError::Timeout {
            operation: operation.into(),
            duration_ms,
        }
    }

    pub fn unavailable(service: impl Into<String>) -> Self {
        PortError::ServiceUnavailable {
            service: service.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        PortError::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
            source: None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, PortError::Timeout { .. })
    }
}

/// Marker trait for all collaborator ports
///
/// Ports are shared across concurrently running analysis tasks, so they must
/// be thread-safe and `'static`.
pub trait DomainPort: Send + Sync + 'static {}
