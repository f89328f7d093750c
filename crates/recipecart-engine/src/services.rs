//! # External Collaborators
//!
//! Trait seams for everything the engine does not own: the product catalog,
//! store location lookup, and the customer's cart.
//!
//! ## Collaborator Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     ShoppingOrchestrator                                │
//! │                                                                         │
//! │   LocationResolver ──────► LocationService::search_by_postal_code      │
//! │        (once per run, cached within the run)                           │
//! │                                                                         │
//! │   ingredient workers ────► CatalogSearchAdapter::search                │
//! │        (concurrently, bounded)                                         │
//! │                                                                         │
//! │   after AGGREGATED ──────► CartService::bulk_add                       │
//! │        (at most once)                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Implementations must be `Send + Sync`: the orchestrator holds them as
//! `Arc<dyn …>` and calls the catalog from several tasks at once.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use recipecart_core::{CartRequest, Product};

use crate::error::ServiceError;

/// Product search at one store.
#[async_trait]
pub trait CatalogSearchAdapter: Send + Sync {
    /// Up to `limit` products for `term` at `location_id`, in catalog order.
    ///
    /// An empty vector means "not carried here" and is not an error.
    async fn search(
        &self,
        term: &str,
        location_id: &str,
        limit: usize,
    ) -> Result<Vec<Product>, ServiceError>;
}

/// Store lookup by postal code.
#[async_trait]
pub trait LocationService: Send + Sync {
    /// The nearest store's location id, or `None` if no store serves `code`.
    async fn search_by_postal_code(&self, code: &str) -> Result<Option<String>, ServiceError>;
}

/// Result of a bulk cart addition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkAddOutcome {
    pub added_count: usize,
    /// Per-item failures reported by the cart service.
    #[serde(default)]
    pub errors: Vec<String>,
}

impl BulkAddOutcome {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// The customer's cart.
#[async_trait]
pub trait CartService: Send + Sync {
    async fn bulk_add(&self, request: &CartRequest) -> Result<BulkAddOutcome, ServiceError>;
}
