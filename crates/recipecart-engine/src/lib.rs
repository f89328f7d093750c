//! # recipecart-engine: Recipe-to-Cart Orchestration
//!
//! This crate runs the async half of RecipeCart: it resolves a store, fans
//! ingredient searches out to the catalog, prices the results, and hands the
//! assembled cart to the cart service. Every external system sits behind a
//! trait, so the same orchestrator runs against live clients or the
//! in-memory fixtures in [`memory`].
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Engine Architecture                                │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │              ShoppingOrchestrator (one run per query)            │  │
//! │  │                                                                  │  │
//! │  │  recipe lookup ─► LocationResolver ─► bounded searches ─► cart  │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │ CatalogSearch  │  │ LocationService│  │  CartService           │    │
//! │  │ Adapter        │  │                │  │                        │    │
//! │  │ term + store   │  │ postal code    │  │ bulk add, outcome flag │    │
//! │  │ → products     │  │ → location id  │  │ never affects totals   │    │
//! │  └────────────────┘  └────────────────┘  └────────────────────────┘    │
//! │                                                                         │
//! │  SUPPLEMENTAL: sale finder (sales), store path planner (store_path)    │
//! │  OUTPUT:       ShoppingReport (JSON + TypeScript bindings, text)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use recipecart_engine::{
//!     CatalogFixture, LocationInputs, RecordingCart, ShoppingOrchestratorBuilder,
//! };
//!
//! # async fn example() -> recipecart_engine::EngineResult<()> {
//! let (catalog, locations) = CatalogFixture::load("demos/catalog.json".as_ref())?.into_services();
//!
//! let orchestrator = ShoppingOrchestratorBuilder::new()
//!     .with_catalog(Arc::new(catalog))
//!     .with_locations(Arc::new(locations))
//!     .with_cart(Arc::new(RecordingCart::new()))
//!     .build()?;
//!
//! let outcome = orchestrator.run("apple pie", &LocationInputs::postal("45202")).await?;
//! println!("{}", outcome.result.total_cost);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod location;
pub mod memory;
pub mod orchestrator;
pub mod report;
pub mod sales;
pub mod services;
pub mod store_path;
pub mod workers;

pub use config::EngineConfig;
pub use error::{EngineError, EngineResult, ResolutionError, ServiceError};
pub use location::{LocationInputs, LocationResolver, LocationSource, ResolvedLocation};
pub use memory::{CatalogEntry, CatalogFixture, InMemoryCatalog, InMemoryLocations, RecordingCart};
pub use orchestrator::{
    CartSubmission, NoOpObserver, RunObserver, RunPhase, RunSettings, ShoppingOrchestrator,
    ShoppingOrchestratorBuilder, ShoppingOutcome,
};
pub use report::ShoppingReport;
pub use sales::SaleReport;
pub use services::{BulkAddOutcome, CartService, CatalogSearchAdapter, LocationService};
pub use store_path::StorePath;
