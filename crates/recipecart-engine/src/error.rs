//! # Engine Error Types
//!
//! Error types for orchestration runs and collaborator calls.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Engine Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Collaborator   │  │   Resolution    │  │     Configuration       │ │
//! │  │  (recoverable)  │  │   (fatal)       │  │     (fatal)             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Transport      │  │  NoInputs       │  │  InvalidConfig          │ │
//! │  │  Unauthorized   │  │  Exhausted      │  │  ConfigLoadFailed       │ │
//! │  │  InvalidResponse│  │                 │  │                         │ │
//! │  └────────┬────────┘  └────────┬────────┘  └────────────┬────────────┘ │
//! │           │                    │                        │              │
//! │           ▼                    ▼                        ▼              │
//! │  search: Unmatched     run ends in FAILED         process exits 1      │
//! │  cart:   outcome flag  (no ShoppingResult)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use recipecart_core::{CoreError, ValidationError};
use thiserror::Error;

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

// =============================================================================
// Collaborator Errors
// =============================================================================

/// Failure reported by an external collaborator.
///
/// Never fatal to a run on its own. One call is one attempt; any retry
/// policy belongs to the collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// Network or transport failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Credentials were missing or rejected.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The service answered with something we could not use.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

// =============================================================================
// Resolution Errors
// =============================================================================

/// No store location could be resolved. Fatal to the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// None of explicit id, postal code, or preferred id was given.
    #[error(
        "No store location given: provide a location id, a postal code, or a preferred location"
    )]
    NoInputs,

    /// Inputs were given but none produced a location.
    #[error("Could not resolve a store location: {}", attempts.join("; "))]
    Exhausted { attempts: Vec<String> },
}

// =============================================================================
// Engine Error
// =============================================================================

/// Run- and process-level failures.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Invalid engine configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config or fixture file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<toml::de::Error> for EngineError {
    fn from(err: toml::de::Error) -> Self {
        EngineError::ConfigLoadFailed(err.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::ConfigLoadFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl EngineError {
    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidConfig(_) | EngineError::ConfigLoadFailed(_)
        )
    }

    /// Returns true if the run failed because no store could be resolved.
    pub fn is_resolution_error(&self) -> bool {
        matches!(self, EngineError::Resolution(_))
    }
}
