//! # Engine Configuration
//!
//! Configuration management for RecipeCart runs.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Command line flags (highest priority, store inputs only)           │
//! │     --location-id 01400441                                             │
//! │                                                                         │
//! │  2. Environment Variables                                              │
//! │     RECIPECART_POSTAL_CODE=45202                                       │
//! │     RECIPECART_MAX_CONCURRENCY=8                                       │
//! │                                                                         │
//! │  3. TOML Config File                                                   │
//! │     ~/.config/recipecart/config.toml (Linux)                           │
//! │     ~/Library/Application Support/com.recipecart.recipecart/... (macOS)│
//! │                                                                         │
//! │  4. Default Values (lowest priority)                                   │
//! │     search limit 2, 4 concurrent searches, pickup, submit cart         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # config.toml
//! [store]
//! location_id = "01400441"
//! postal_code = "45202"
//! preferred_location_id = "01400943"
//!
//! [search]
//! limit = 2            # 1..=50
//! max_concurrency = 4  # 1..=16
//!
//! [cart]
//! modality = "pickup"  # pickup | delivery
//! submit = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use recipecart_core::validation::{validate_max_concurrency, validate_search_limit};
use recipecart_core::{Modality, DEFAULT_CONCURRENCY, DEFAULT_SEARCH_LIMIT};

use crate::error::{EngineError, EngineResult};
use crate::location::LocationInputs;

// =============================================================================
// Store Configuration
// =============================================================================

/// Default store inputs, used when a run does not name a store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Explicit store location id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,

    /// Postal code used to look up the nearest store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,

    /// Store used when the other two are absent or fail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_location_id: Option<String>,
}

impl StoreConfig {
    pub fn inputs(&self) -> LocationInputs {
        LocationInputs {
            location_id: self.location_id.clone(),
            postal_code: self.postal_code.clone(),
            preferred_location_id: self.preferred_location_id.clone(),
        }
    }
}

// =============================================================================
// Search Settings
// =============================================================================

/// Catalog search behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Products requested per ingredient. Only the first one is used.
    #[serde(default = "default_search_limit")]
    pub limit: usize,

    /// Ingredient searches allowed in flight at once.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

fn default_search_limit() -> usize {
    DEFAULT_SEARCH_LIMIT
}

fn default_max_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

impl Default for SearchSettings {
    fn default() -> Self {
        SearchSettings {
            limit: default_search_limit(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

// =============================================================================
// Cart Settings
// =============================================================================

/// Cart submission behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSettings {
    /// Fulfillment modality for every cart line.
    #[serde(default, with = "modality_text")]
    pub modality: Modality,

    /// Whether runs submit the assembled cart at all.
    #[serde(default = "default_true")]
    pub submit: bool,
}

fn default_true() -> bool {
    true
}

impl Default for CartSettings {
    fn default() -> Self {
        CartSettings {
            modality: Modality::default(),
            submit: true,
        }
    }
}

/// Lower-case modality names in TOML ("pickup", "delivery").
mod modality_text {
    use recipecart_core::Modality;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(modality: &Modality, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&modality.to_string().to_lowercase())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Modality, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Main Engine Configuration
// =============================================================================

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub search: SearchSettings,

    #[serde(default)]
    pub cart: CartSettings,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (config.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> EngineResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides_from(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Parses one TOML file without applying overrides.
    pub fn from_file(path: &Path) -> EngineResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| EngineError::ConfigLoadFailed(format!("{}: {}", path.display(), e)))?;
        Ok(toml::from_str(&contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> EngineResult<()> {
        let invalid =
            |e: recipecart_core::ValidationError| EngineError::InvalidConfig(e.to_string());

        validate_search_limit(self.search.limit).map_err(invalid)?;
        validate_max_concurrency(self.search.max_concurrency).map_err(invalid)?;

        Ok(())
    }

    /// Applies `RECIPECART_*` overrides read through `lookup`.
    ///
    /// Unparsable numbers and modalities are logged and ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(id) = lookup("RECIPECART_LOCATION_ID") {
            debug!(location_id = %id, "Overriding location id from environment");
            self.store.location_id = Some(id);
        }

        if let Some(code) = lookup("RECIPECART_POSTAL_CODE") {
            debug!(postal_code = %code, "Overriding postal code from environment");
            self.store.postal_code = Some(code);
        }

        if let Some(id) = lookup("RECIPECART_PREFERRED_LOCATION_ID") {
            self.store.preferred_location_id = Some(id);
        }

        if let Some(limit) = lookup("RECIPECART_SEARCH_LIMIT") {
            match limit.trim().parse::<usize>() {
                Ok(n) => self.search.limit = n,
                Err(_) => warn!(value = %limit, "Ignoring invalid RECIPECART_SEARCH_LIMIT"),
            }
        }

        if let Some(concurrency) = lookup("RECIPECART_MAX_CONCURRENCY") {
            match concurrency.trim().parse::<usize>() {
                Ok(n) => {
                    debug!(max_concurrency = n, "Overriding concurrency from environment");
                    self.search.max_concurrency = n;
                }
                Err(_) => warn!(
                    value = %concurrency,
                    "Ignoring invalid RECIPECART_MAX_CONCURRENCY"
                ),
            }
        }

        if let Some(modality) = lookup("RECIPECART_MODALITY") {
            match modality.parse() {
                Ok(parsed) => self.cart.modality = parsed,
                Err(e) => warn!(
                    value = %modality,
                    error = %e,
                    "Ignoring invalid RECIPECART_MODALITY"
                ),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "recipecart", "recipecart")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Store inputs from configuration.
    pub fn store_inputs(&self) -> LocationInputs {
        self.store.inputs()
    }

    pub fn modality(&self) -> Modality {
        self.cart.modality
    }
}
