//! Error types raised by the reconciliation engine itself.
//!
//! Failures reported by specification implementations are opaque
//! `anyhow::Error` values and pass through the engine unchanged. The
//! variants below cover what the engine decides on its own: missing
//! capabilities, registry misses, deferred resolution and configuration
//! payloads that do not fit a spec kind.

use thiserror::Error;

/// Optional capability a mode wrapper may require from its inner specification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// `exists` / `remove`
    Removal,
    /// `equals` / `replace`
    Replacement,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::Removal => write!(f, "removal"),
            Capability::Replacement => write!(f, "replacement"),
        }
    }
}

/// Errors produced by the reconciliation engine.
#[derive(Debug, Error)]
pub enum Error {
    /// A Remove or Replace apply hit a specification without the capability
    #[error("spec type {spec_type} does not support {capability}")]
    CapabilityMissing {
        /// The capability the wrapper needed
        capability: Capability,
        /// Concrete type of the inner specification
        spec_type: &'static str,
    },

    /// No factory is registered under this name
    #[error("specification {0} not found")]
    SpecNotFound(String),

    /// No blueprint is registered under this name
    #[error("blueprint {0} not found")]
    BlueprintNotFound(String),

    /// A deferred specification's factory produced nothing
    #[error("deferred spec {spec_type} failed to initialize")]
    DeferredInit {
        /// Label of the deferred spec, its type name unless one was given
        spec_type: String,
    },

    /// A configuration payload did not match the spec kind's schema
    #[error("invalid configuration for specification {kind}: {source}")]
    InvalidConfig {
        /// Registered name of the spec kind
        kind: String,
        /// Deserialization failure
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// Whether this error comes from a registry lookup
    pub fn is_lookup(&self) -> bool {
        matches!(self, Self::SpecNotFound(_) | Self::BlueprintNotFound(_))
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
