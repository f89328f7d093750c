//! # In-Memory Collaborators
//!
//! Fixture-backed implementations of the collaborator traits. The CLI runs
//! against these, and the tests use their knobs (failures, delays, call
//! counters) to drive the orchestrator through every path.
//!
//! ## Fixture Format
//! ```json
//! {
//!   "locations": { "45202": "01400441" },
//!   "products": [
//!     {
//!       "id": "0001111060903",
//!       "description": "Kroger Large White Eggs 12ct",
//!       "regular_price": 399,
//!       "promo_price": 299,
//!       "aisle": "Aisle 18",
//!       "keywords": ["eggs"],
//!       "locations": ["01400441"]
//!     }
//!   ]
//! }
//! ```
//!
//! Prices are integer cents. A product matches a search term when the term
//! equals one of its keywords or appears in its description (both
//! case-insensitive). An empty `locations` list means "carried everywhere".

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

use recipecart_core::{CartRequest, Product};

use crate::error::{EngineResult, ServiceError};
use crate::services::{BulkAddOutcome, CartService, CatalogSearchAdapter, LocationService};

// =============================================================================
// Fixture
// =============================================================================

/// One product row of a catalog fixture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub product: Product,

    #[serde(default)]
    pub keywords: Vec<String>,

    /// Stores carrying this product. Empty means all stores.
    #[serde(default)]
    pub locations: Vec<String>,
}

impl CatalogEntry {
    pub fn new(product: Product) -> Self {
        CatalogEntry {
            product,
            keywords: Vec::new(),
            locations: Vec::new(),
        }
    }

    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keywords.push(keyword.into());
        self
    }

    pub fn only_at(mut self, location_id: impl Into<String>) -> Self {
        self.locations.push(location_id.into());
        self
    }

    fn carried_at(&self, location_id: &str) -> bool {
        self.locations.is_empty() || self.locations.iter().any(|l| l == location_id)
    }

    /// `term` must already be trimmed and lower-cased.
    fn matches(&self, term: &str) -> bool {
        if term.is_empty() {
            return false;
        }
        self.keywords.iter().any(|k| k.to_lowercase() == term)
            || self.product.description.to_lowercase().contains(term)
    }
}

/// A catalog fixture file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFixture {
    /// Postal code → location id.
    #[serde(default)]
    pub locations: HashMap<String, String>,

    #[serde(default)]
    pub products: Vec<CatalogEntry>,
}

impl CatalogFixture {
    /// Reads a JSON fixture from disk.
    pub fn load(path: &Path) -> EngineResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let fixture: CatalogFixture = serde_json::from_str(&contents)?;
        info!(
            ?path,
            products = fixture.products.len(),
            locations = fixture.locations.len(),
            "Loaded catalog fixture"
        );
        Ok(fixture)
    }

    /// Splits the fixture into its catalog and location halves.
    pub fn into_services(self) -> (InMemoryCatalog, InMemoryLocations) {
        (
            InMemoryCatalog::new(self.products),
            InMemoryLocations::new(self.locations),
        )
    }
}

// =============================================================================
// In-Memory Catalog
// =============================================================================

/// Catalog search over a fixed product list.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    entries: Vec<CatalogEntry>,
    failing_terms: HashSet<String>,
    delays: HashMap<String, Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl InMemoryCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        InMemoryCatalog {
            entries,
            ..Default::default()
        }
    }

    /// Searches for `term` fail with a transport error.
    pub fn fail_term(mut self, term: &str) -> Self {
        self.failing_terms.insert(term.trim().to_lowercase());
        self
    }

    /// Searches for `term` take at least `delay`.
    pub fn delay_term(mut self, term: &str, delay: Duration) -> Self {
        self.delays.insert(term.trim().to_lowercase(), delay);
        self
    }

    /// Searches for every term take at least `delay`.
    pub fn delay_all(mut self, delay: Duration) -> Self {
        self.delays.insert(String::new(), delay);
        self
    }

    /// Total number of `search` calls.
    pub fn search_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of searches observed running at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn delay_for(&self, term: &str) -> Option<Duration> {
        self.delays
            .get(term)
            .or_else(|| self.delays.get(""))
            .copied()
    }
}

#[async_trait]
impl CatalogSearchAdapter for InMemoryCatalog {
    async fn search(
        &self,
        term: &str,
        location_id: &str,
        limit: usize,
    ) -> Result<Vec<Product>, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        let term = term.trim().to_lowercase();
        if let Some(delay) = self.delay_for(&term) {
            tokio::time::sleep(delay).await;
        }

        let outcome = if self.failing_terms.contains(&term) {
            Err(ServiceError::Transport(format!(
                "catalog unavailable while searching '{}'",
                term
            )))
        } else {
            Ok(self
                .entries
                .iter()
                .filter(|entry| entry.carried_at(location_id) && entry.matches(&term))
                .take(limit)
                .map(|entry| entry.product.clone())
                .collect::<Vec<_>>())
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        if let Ok(products) = &outcome {
            debug!(term = %term, location_id, found = products.len(), "In-memory catalog search");
        }
        outcome
    }
}

// =============================================================================
// In-Memory Locations
// =============================================================================

/// Postal code → location id table.
#[derive(Debug, Default)]
pub struct InMemoryLocations {
    by_postal_code: HashMap<String, String>,
    failing: bool,
    calls: AtomicUsize,
}

impl InMemoryLocations {
    pub fn new(by_postal_code: HashMap<String, String>) -> Self {
        InMemoryLocations {
            by_postal_code,
            ..Default::default()
        }
    }

    pub fn with(mut self, postal_code: &str, location_id: &str) -> Self {
        self.by_postal_code
            .insert(postal_code.to_string(), location_id.to_string());
        self
    }

    /// Every lookup fails with a transport error.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn lookup_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocationService for InMemoryLocations {
    async fn search_by_postal_code(&self, code: &str) -> Result<Option<String>, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(ServiceError::Transport("location service unreachable".into()));
        }
        Ok(self.by_postal_code.get(code.trim()).cloned())
    }
}

// =============================================================================
// Recording Cart
// =============================================================================

/// Cart that records every request it receives.
#[derive(Debug, Default)]
pub struct RecordingCart {
    requests: Mutex<Vec<CartRequest>>,
    failure: Option<ServiceError>,
    rejected_products: HashSet<String>,
}

impl RecordingCart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `bulk_add` fails with `error`.
    pub fn failing(error: ServiceError) -> Self {
        RecordingCart {
            failure: Some(error),
            ..Default::default()
        }
    }

    /// Lines for `product_id` are reported as per-item errors.
    pub fn reject_product(mut self, product_id: &str) -> Self {
        self.rejected_products.insert(product_id.to_string());
        self
    }

    /// Requests received so far, in order.
    pub async fn requests(&self) -> Vec<CartRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl CartService for RecordingCart {
    async fn bulk_add(&self, request: &CartRequest) -> Result<BulkAddOutcome, ServiceError> {
        self.requests.lock().await.push(request.clone());

        if let Some(error) = &self.failure {
            return Err(error.clone());
        }

        let mut outcome = BulkAddOutcome::default();
        for line in &request.items {
            if self.rejected_products.contains(&line.product_id) {
                outcome
                    .errors
                    .push(format!("product {} is unavailable", line.product_id));
            } else {
                outcome.added_count += 1;
            }
        }
        Ok(outcome)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
