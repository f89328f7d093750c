//! # Location Resolver
//!
//! Picks the store every search in a run is scoped to.
//!
//! ## Precedence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Location Resolution                                 │
//! │                                                                         │
//! │  1. explicit location id ─────────────────────► Explicit (no lookup)   │
//! │          │ absent                                                       │
//! │          ▼                                                              │
//! │  2. postal code ──► LocationService lookup                             │
//! │          │            ├── Some(id) ───────────► PostalCode             │
//! │          │            └── None / error ──┐                              │
//! │          ▼ absent                        ▼                              │
//! │  3. preferred location id ────────────────────► Preferred              │
//! │          │ absent                                                       │
//! │          ▼                                                              │
//! │  ResolutionError (NoInputs if nothing was given, else Exhausted)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A resolver lives for one run. Postal code lookups are cached inside it,
//! so a second resolve in the same run does not call the service again.
//! The cache lock is never held across the lookup call.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use ts_rs::TS;

use recipecart_core::validation::validate_postal_code;

use crate::error::{ResolutionError, ServiceError};
use crate::services::LocationService;

// =============================================================================
// Inputs & Outputs
// =============================================================================

/// Store inputs for one run. Blank strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationInputs {
    pub location_id: Option<String>,
    pub postal_code: Option<String>,
    pub preferred_location_id: Option<String>,
}

impl LocationInputs {
    pub fn explicit(location_id: impl Into<String>) -> Self {
        LocationInputs {
            location_id: Some(location_id.into()),
            ..Default::default()
        }
    }

    pub fn postal(postal_code: impl Into<String>) -> Self {
        LocationInputs {
            postal_code: Some(postal_code.into()),
            ..Default::default()
        }
    }

    /// Field-wise: values present in `other` replace ours.
    pub fn overridden_by(&self, other: &LocationInputs) -> LocationInputs {
        LocationInputs {
            location_id: present(&other.location_id).or_else(|| present(&self.location_id)),
            postal_code: present(&other.postal_code).or_else(|| present(&self.postal_code)),
            preferred_location_id: present(&other.preferred_location_id)
                .or_else(|| present(&self.preferred_location_id)),
        }
    }

    pub fn is_empty(&self) -> bool {
        present(&self.location_id).is_none()
            && present(&self.postal_code).is_none()
            && present(&self.preferred_location_id).is_none()
    }
}

fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Which input produced the location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum LocationSource {
    Explicit,
    PostalCode,
    Preferred,
}

impl fmt::Display for LocationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationSource::Explicit => write!(f, "explicit"),
            LocationSource::PostalCode => write!(f, "postal_code"),
            LocationSource::Preferred => write!(f, "preferred"),
        }
    }
}

/// A resolved store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedLocation {
    pub location_id: String,
    pub source: LocationSource,
}

// =============================================================================
// Resolver
// =============================================================================

/// Resolves store inputs to a location id. One instance per run.
pub struct LocationResolver {
    service: Arc<dyn LocationService>,
    postal_cache: Mutex<HashMap<String, Option<String>>>,
}

impl LocationResolver {
    pub fn new(service: Arc<dyn LocationService>) -> Self {
        LocationResolver {
            service,
            postal_cache: Mutex::new(HashMap::new()),
        }
    }

    /// Applies explicit → postal code → preferred precedence.
    ///
    /// Only the postal code is checked for format, since it is the only input
    /// sent to the location service. A malformed code counts as a failed
    /// attempt and resolution moves on to the preferred location.
    pub async fn resolve(
        &self,
        inputs: &LocationInputs,
    ) -> Result<ResolvedLocation, ResolutionError> {
        if inputs.is_empty() {
            warn!("No store inputs given");
            return Err(ResolutionError::NoInputs);
        }

        if let Some(location_id) = present(&inputs.location_id) {
            debug!(location_id = %location_id, "Using explicit location");
            return Ok(ResolvedLocation {
                location_id,
                source: LocationSource::Explicit,
            });
        }

        let mut attempts = Vec::new();

        if let Some(code) = present(&inputs.postal_code) {
            if let Some(location_id) = self.resolve_postal_code(&code, &mut attempts).await {
                return Ok(ResolvedLocation {
                    location_id,
                    source: LocationSource::PostalCode,
                });
            }
        }

        if let Some(location_id) = present(&inputs.preferred_location_id) {
            debug!(location_id = %location_id, "Falling back to preferred location");
            return Ok(ResolvedLocation {
                location_id,
                source: LocationSource::Preferred,
            });
        }

        attempts.push("preferred location: not set".to_string());
        Err(ResolutionError::Exhausted { attempts })
    }

    /// One postal code attempt. Failures are recorded in `attempts`.
    async fn resolve_postal_code(&self, raw: &str, attempts: &mut Vec<String>) -> Option<String> {
        let code = match validate_postal_code(raw) {
            Ok(code) => code,
            Err(e) => {
                warn!(postal_code = %raw, error = %e, "Skipping malformed postal code");
                attempts.push(format!("postal code {}: {}", raw, e));
                return None;
            }
        };

        match self.lookup_postal_code(&code).await {
            Ok(Some(location_id)) => {
                info!(
                    postal_code = %code,
                    location_id = %location_id,
                    "Resolved store from postal code"
                );
                Some(location_id)
            }
            Ok(None) => {
                debug!(postal_code = %code, "No store found for postal code");
                attempts.push(format!("postal code {}: no store found", code));
                None
            }
            Err(e) => {
                warn!(postal_code = %code, error = %e, "Postal code lookup failed");
                attempts.push(format!("postal code {}: {}", code, e));
                None
            }
        }
    }

    /// Cached lookup. Errors are not cached.
    async fn lookup_postal_code(
        &self,
        code: &str,
    ) -> Result<Option<String>, ServiceError> {
        let cached = self.postal_cache.lock().await.get(code).cloned();
        if let Some(cached) = cached {
            debug!(postal_code = %code, "Postal code lookup served from run cache");
            return Ok(cached);
        }

        let found = self.service.search_by_postal_code(code).await?;
        self.postal_cache
            .lock()
            .await
            .insert(code.to_string(), found.clone());
        Ok(found)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
