//! # recipecart-core: Pure Recipe-to-Cart Logic
//!
//! This crate is the **heart** of RecipeCart. It contains the translation
//! from cooking recipes to priced store carts as pure functions with zero
//! I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        RecipeCart Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    recipecart CLI (apps/cli)                    │   │
//! │  │    recipe ──► sales ──► path ──► report rendering              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    recipecart-engine (async)                    │   │
//! │  │    LocationResolver, ShoppingOrchestrator, collaborator traits  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ recipecart-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  recipe   │  │ normalize │  │  pricing  │  │   cart    │  │   │
//! │  │   │  Catalog  │  │ RuleTable │  │  select   │  │ Assembler │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO CLOCK • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Recipe, Product, MatchResult, CartRequest, ...)
//! - [`money`] - Money type with integer arithmetic
//! - [`recipe`] - RecipeCatalog with default fallback
//! - [`normalize`] - QuantityNormalizer rule table
//! - [`pricing`] - Effective price selection
//! - [`cart`] - CartAssembler and result aggregation
//! - [`sales`] - Sale item filtering and ranking
//! - [`grocery_list`] - Grocery list parsing and aisle ordering
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use recipecart_core::{QuantityNormalizer, RecipeCatalog};
//!
//! let catalog = RecipeCatalog::builtin();
//! let recipe = catalog.lookup("apple pie recipe").recipe;
//!
//! let normalizer = QuantityNormalizer::standard();
//! let packages: Vec<u32> = recipe
//!     .ingredients
//!     .iter()
//!     .map(|i| normalizer.normalize(i))
//!     .collect();
//!
//! assert_eq!(packages.len(), 8);
//! assert!(packages.iter().all(|&p| p >= 1));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod grocery_list;
pub mod money;
pub mod normalize;
pub mod pricing;
pub mod recipe;
pub mod sales;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::CartAssembler;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use normalize::{Category, QuantityNormalizer};
pub use pricing::select_price;
pub use recipe::RecipeCatalog;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Products requested per ingredient search. Only the first is used.
pub const DEFAULT_SEARCH_LIMIT: usize = 2;

/// Upper bound of any single catalog search.
pub const MAX_SEARCH_LIMIT: usize = 50;

/// Default number of concurrent ingredient searches.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Upper bound for concurrent ingredient searches.
pub const MAX_CONCURRENCY: usize = 16;

/// Maximum packages of one product on a single cart line.
///
/// Guards against runaway counts from bad recipe data.
pub const MAX_PACKAGE_COUNT: u32 = 999;

/// Maximum recipe query length in characters.
pub const MAX_QUERY_LENGTH: usize = 100;

/// Sale items returned when no limit is given.
pub const DEFAULT_SALE_LIMIT: usize = 20;

/// Search terms used by the sale finder without a category.
pub const DEFAULT_SALE_TERMS: &[&str] = &["sale", "promo", "discount", "special"];

/// Maximum searches issued by one sale finder call.
pub const MAX_SALE_SEARCHES: usize = 3;

/// Grocery list items searched by the store path planner.
pub const STORE_PATH_MAX_ITEMS: usize = 10;

/// Products requested per grocery list item.
pub const STORE_PATH_SEARCH_LIMIT: usize = 3;
