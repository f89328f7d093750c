//! # Shopping Orchestrator
//!
//! Runs one recipe query end to end: resolve a store, find and price every
//! ingredient, assemble the cart, and submit it.
//!
//! ## Run State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Orchestration Run                                │
//! │                                                                         │
//! │  START                                                                 │
//! │    │  LocationResolver::resolve                                        │
//! │    ├──────── ResolutionError ──────────────────────────► FAILED        │
//! │    ▼                                                    (no result)    │
//! │  LOCATION_RESOLVED                     ◄── barrier 1                   │
//! │    │                                                                    │
//! │    ▼                                                                    │
//! │  SEARCHING   ┌────────┐ ┌────────┐ ┌────────┐                          │
//! │    (bounded) │ ingr 0 │ │ ingr 1 │ │ ingr 2 │ ...  normalize, search,  │
//! │              └───┬────┘ └───┬────┘ └───┬────┘      first result, price │
//! │                  ▼          ▼          ▼                                │
//! │              PRICED | UNMATCHED per ingredient (own slot each)         │
//! │    │                                                                    │
//! │    ▼                                   ◄── barrier 2 (all joined)      │
//! │  AGGREGATED  partition, total, CartRequest                             │
//! │    │  CartService::bulk_add (outcome flag only)                        │
//! │    ▼                                                                    │
//! │  DONE        ShoppingOutcome                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Runs share no mutable state. Two runs may execute at the same time
//! against different recipes without interfering.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use recipecart_core::validation::{
    validate_cart_request, validate_max_concurrency, validate_recipe_query, validate_search_limit,
};
use recipecart_core::{
    CartAssembler, CartRequest, Ingredient, MatchResult, MatchedLine, NormalizedLineItem,
    QuantityNormalizer, RecipeCatalog, ShoppingResult, UnmatchedReason, ValidationError,
};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::location::{LocationInputs, LocationResolver, ResolvedLocation};
use crate::sales::{self, SaleReport};
use crate::services::{CartService, CatalogSearchAdapter, LocationService};
use crate::store_path::{self, StorePath};
use crate::workers::join_bounded;

// =============================================================================
// Run Phase
// =============================================================================

/// Phases of one orchestration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunPhase {
    Start,
    LocationResolved,
    Searching,
    Aggregated,
    Done,
    Failed,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunPhase::Start => "START",
            RunPhase::LocationResolved => "LOCATION_RESOLVED",
            RunPhase::Searching => "SEARCHING",
            RunPhase::Aggregated => "AGGREGATED",
            RunPhase::Done => "DONE",
            RunPhase::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Run Observer Trait
// =============================================================================

/// Receives run progress (implemented by front ends that show progress).
pub trait RunObserver: Send + Sync {
    /// Called on every phase transition.
    fn on_phase(&self, run_id: Uuid, phase: RunPhase);

    /// Called once per ingredient as soon as its search finishes.
    fn on_ingredient(&self, run_id: Uuid, result: &MatchResult);
}

/// No-op observer.
pub struct NoOpObserver;

impl RunObserver for NoOpObserver {
    fn on_phase(&self, _run_id: Uuid, _phase: RunPhase) {}
    fn on_ingredient(&self, _run_id: Uuid, _result: &MatchResult) {}
}

// =============================================================================
// Run Settings & Outcome
// =============================================================================

/// Per-orchestrator knobs, normally taken from `EngineConfig`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub search_limit: usize,
    pub max_concurrency: usize,
    pub assembler: CartAssembler,
    pub submit_cart: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

impl From<&EngineConfig> for RunSettings {
    fn from(config: &EngineConfig) -> Self {
        RunSettings {
            search_limit: config.search.limit,
            max_concurrency: config.search.max_concurrency,
            assembler: CartAssembler::new(config.cart.modality),
            submit_cart: config.cart.submit,
        }
    }
}

/// Result of handing the cart request to the cart service.
///
/// Reported next to the `ShoppingResult`; it never changes the totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSubmission {
    pub attempted: bool,
    pub success: bool,
    pub added_count: usize,
    pub detail: String,
}

impl CartSubmission {
    fn skipped(success: bool, detail: impl Into<String>) -> Self {
        CartSubmission {
            attempted: false,
            success,
            added_count: 0,
            detail: detail.into(),
        }
    }
}

/// Everything one successful run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ShoppingOutcome {
    pub run_id: Uuid,
    /// True when the query matched no recipe and the default was used.
    pub used_default_recipe: bool,
    pub location: ResolvedLocation,
    pub result: ShoppingResult,
    pub cart_request: CartRequest,
    pub submission: CartSubmission,
}

// =============================================================================
// Shopping Orchestrator
// =============================================================================

/// Coordinates recipe lookup, location resolution, catalog search, pricing,
/// and cart assembly.
pub struct ShoppingOrchestrator {
    catalog: Arc<dyn CatalogSearchAdapter>,
    locations: Arc<dyn LocationService>,
    cart: Arc<dyn CartService>,
    recipes: Arc<RecipeCatalog>,
    normalizer: Arc<QuantityNormalizer>,
    observer: Arc<dyn RunObserver>,
    settings: RunSettings,
}

impl ShoppingOrchestrator {
    /// Creates an orchestrator with the built-in recipes and default rules.
    pub fn new(
        catalog: Arc<dyn CatalogSearchAdapter>,
        locations: Arc<dyn LocationService>,
        cart: Arc<dyn CartService>,
    ) -> Self {
        ShoppingOrchestrator {
            catalog,
            locations,
            cart,
            recipes: Arc::new(RecipeCatalog::builtin()),
            normalizer: Arc::new(QuantityNormalizer::standard()),
            observer: Arc::new(NoOpObserver),
            settings: RunSettings::default(),
        }
    }

    pub fn recipes(&self) -> &RecipeCatalog {
        &self.recipes
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// Runs one recipe query.
    ///
    /// Fails only when no store can be resolved; every other problem is
    /// reported inside the outcome. A query that matches nothing, including
    /// one too long to be a recipe name, runs the default recipe.
    pub async fn run(
        &self,
        query: &str,
        inputs: &LocationInputs,
    ) -> EngineResult<ShoppingOutcome> {
        let query = match validate_recipe_query(query) {
            Ok(query) => query,
            Err(e) => {
                warn!(error = %e, "Ignoring unusable recipe query");
                String::new()
            }
        };

        let run_id = Uuid::new_v4();
        let lookup = self.recipes.lookup(&query);
        let recipe = lookup.recipe;
        let span = info_span!("shopping_run", run_id = %run_id, recipe = %recipe.name);

        async {
            if lookup.used_default {
                info!(query = %query, "No recipe matched query, using default");
            }
            self.execute(
                run_id,
                lookup.used_default,
                recipe.name.clone(),
                recipe.ingredients.clone(),
                inputs,
            )
            .await
        }
        .instrument(span)
        .await
    }

    async fn execute(
        &self,
        run_id: Uuid,
        used_default_recipe: bool,
        recipe_name: String,
        ingredients: Vec<Ingredient>,
        inputs: &LocationInputs,
    ) -> EngineResult<ShoppingOutcome> {
        self.enter(run_id, RunPhase::Start);

        // Barrier 1: nothing is searched before the store is known.
        let resolver = LocationResolver::new(self.locations.clone());
        let location = match resolver.resolve(inputs).await {
            Ok(location) => location,
            Err(e) => {
                warn!(error = %e, "Run failed: no store location");
                self.enter(run_id, RunPhase::Failed);
                return Err(e.into());
            }
        };
        self.enter(run_id, RunPhase::LocationResolved);
        info!(
            location_id = %location.location_id,
            source = %location.source,
            ingredients = ingredients.len(),
            "Store resolved"
        );

        self.enter(run_id, RunPhase::Searching);
        let results = self
            .search_ingredients(run_id, &ingredients, &location.location_id)
            .await;

        // Barrier 2: every slot is terminal here.
        let result =
            ShoppingResult::from_results(recipe_name, location.location_id.clone(), results);
        let cart_request = self.settings.assembler.assemble(&result.matched);
        self.enter(run_id, RunPhase::Aggregated);

        let submission = self.submit(&cart_request).await;

        info!(
            matched = result.matched.len(),
            unmatched = result.unmatched.len(),
            total = %result.total_cost,
            cart_success = submission.success,
            "Shopping run complete"
        );
        self.enter(run_id, RunPhase::Done);

        Ok(ShoppingOutcome {
            run_id,
            used_default_recipe,
            location,
            result,
            cart_request,
            submission,
        })
    }

    /// One MatchResult per ingredient, in ingredient order.
    async fn search_ingredients(
        &self,
        run_id: Uuid,
        ingredients: &[Ingredient],
        location_id: &str,
    ) -> Vec<MatchResult> {
        let items: Vec<NormalizedLineItem> = ingredients
            .iter()
            .map(|ingredient| {
                let normalized = self.normalizer.evaluate(ingredient);
                debug!(
                    ingredient = %ingredient,
                    packages = normalized.package_count,
                    rule = ?normalized.category,
                    "Normalized ingredient"
                );
                NormalizedLineItem::new(ingredient.clone(), normalized.package_count)
            })
            .collect();

        let limit = self.settings.search_limit;
        let slots = join_bounded(items, self.settings.max_concurrency, |item| {
            let catalog = self.catalog.clone();
            let observer = self.observer.clone();
            let location_id = location_id.to_string();
            async move {
                let result = search_one(catalog.as_ref(), item, &location_id, limit).await;
                observer.on_ingredient(run_id, &result);
                result
            }
        })
        .await;

        slots
            .into_iter()
            .zip(ingredients)
            .map(|(slot, ingredient)| {
                slot.unwrap_or_else(|| {
                    let result =
                        MatchResult::unmatched(ingredient.clone(), UnmatchedReason::WorkerFailed);
                    self.observer.on_ingredient(run_id, &result);
                    result
                })
            })
            .collect()
    }

    async fn submit(&self, request: &CartRequest) -> CartSubmission {
        if !self.settings.submit_cart {
            debug!("Cart submission disabled");
            return CartSubmission::skipped(false, "cart submission disabled");
        }

        if request.is_empty() {
            debug!("No matched items, nothing to submit");
            return CartSubmission::skipped(true, "nothing to submit");
        }

        if let Err(e) = validate_cart_request(request) {
            warn!(error = %e, "Cart request rejected before submission");
            return CartSubmission::skipped(false, e.to_string());
        }

        match self.cart.bulk_add(request).await {
            Ok(outcome) if outcome.is_clean() => CartSubmission {
                attempted: true,
                success: true,
                added_count: outcome.added_count,
                detail: format!("added {} item(s) to cart", outcome.added_count),
            },
            Ok(outcome) => {
                warn!(errors = outcome.errors.len(), "Cart accepted some items with errors");
                CartSubmission {
                    attempted: true,
                    success: false,
                    added_count: outcome.added_count,
                    detail: outcome.errors.join("; "),
                }
            }
            Err(e) => {
                warn!(error = %e, "Cart submission failed");
                CartSubmission {
                    attempted: true,
                    success: false,
                    added_count: 0,
                    detail: e.to_string(),
                }
            }
        }
    }

    fn enter(&self, run_id: Uuid, phase: RunPhase) {
        debug!(phase = %phase, "Run phase");
        self.observer.on_phase(run_id, phase);
    }

    // =========================================================================
    // Supplemental Operations
    // =========================================================================

    /// Discounted products at the resolved store, highest savings first.
    pub async fn find_items_on_sale(
        &self,
        inputs: &LocationInputs,
        category: Option<&str>,
        limit: usize,
    ) -> EngineResult<SaleReport> {
        let location = LocationResolver::new(self.locations.clone()).resolve(inputs).await?;
        Ok(sales::find_items_on_sale(self.catalog.as_ref(), location, category, limit).await)
    }

    /// Aisle-ordered route for a free-form grocery list. No cart changes.
    pub async fn grocery_list_store_path(
        &self,
        inputs: &LocationInputs,
        grocery_list: &str,
    ) -> EngineResult<StorePath> {
        let location = LocationResolver::new(self.locations.clone()).resolve(inputs).await?;
        Ok(store_path::plan_store_path(
            self.catalog.clone(),
            location,
            grocery_list,
            self.settings.max_concurrency,
        )
        .await)
    }
}

/// Searches one ingredient. First result wins; errors become Unmatched.
async fn search_one(
    catalog: &dyn CatalogSearchAdapter,
    item: NormalizedLineItem,
    location_id: &str,
    limit: usize,
) -> MatchResult {
    let term = item.ingredient.name.clone();

    match catalog.search(&term, location_id, limit).await {
        Ok(products) => match products.into_iter().next() {
            Some(product) => {
                let line = MatchedLine::new(item, product);
                debug!(
                    ingredient = %term,
                    product_id = %line.product.id,
                    price = %line.effective_price,
                    packages = line.line_item.package_count(),
                    "Ingredient matched"
                );
                MatchResult::Matched(line)
            }
            None => {
                debug!(ingredient = %term, "Not carried at this location");
                MatchResult::unmatched(item.ingredient, UnmatchedReason::NotCarried)
            }
        },
        Err(e) => {
            warn!(ingredient = %term, error = %e, "Catalog search failed");
            MatchResult::unmatched(item.ingredient, UnmatchedReason::SearchFailed(e.to_string()))
        }
    }
}

// =============================================================================
// Builder Pattern
// =============================================================================

/// Builder for creating a ShoppingOrchestrator with options.
#[derive(Default)]
pub struct ShoppingOrchestratorBuilder {
    catalog: Option<Arc<dyn CatalogSearchAdapter>>,
    locations: Option<Arc<dyn LocationService>>,
    cart: Option<Arc<dyn CartService>>,
    recipes: Option<RecipeCatalog>,
    normalizer: Option<QuantityNormalizer>,
    observer: Option<Arc<dyn RunObserver>>,
    settings: Option<RunSettings>,
}

impl ShoppingOrchestratorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(mut self, catalog: Arc<dyn CatalogSearchAdapter>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn with_locations(mut self, locations: Arc<dyn LocationService>) -> Self {
        self.locations = Some(locations);
        self
    }

    pub fn with_cart(mut self, cart: Arc<dyn CartService>) -> Self {
        self.cart = Some(cart);
        self
    }

    pub fn with_recipes(mut self, recipes: RecipeCatalog) -> Self {
        self.recipes = Some(recipes);
        self
    }

    pub fn with_normalizer(mut self, normalizer: QuantityNormalizer) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Takes search and cart settings from configuration.
    pub fn with_config(mut self, config: &EngineConfig) -> Self {
        self.settings = Some(RunSettings::from(config));
        self
    }

    pub fn with_settings(mut self, settings: RunSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Builds the orchestrator. All three collaborators are required.
    pub fn build(self) -> EngineResult<ShoppingOrchestrator> {
        let catalog = self
            .catalog
            .ok_or_else(|| EngineError::InvalidConfig("Catalog search adapter required".into()))?;
        let locations = self
            .locations
            .ok_or_else(|| EngineError::InvalidConfig("Location service required".into()))?;
        let cart = self
            .cart
            .ok_or_else(|| EngineError::InvalidConfig("Cart service required".into()))?;

        let settings = self.settings.unwrap_or_default();
        let invalid = |e: ValidationError| EngineError::InvalidConfig(e.to_string());
        validate_search_limit(settings.search_limit).map_err(invalid)?;
        validate_max_concurrency(settings.max_concurrency).map_err(invalid)?;

        Ok(ShoppingOrchestrator {
            catalog,
            locations,
            cart,
            recipes: Arc::new(self.recipes.unwrap_or_default()),
            normalizer: Arc::new(self.normalizer.unwrap_or_default()),
            observer: self.observer.unwrap_or_else(|| Arc::new(NoOpObserver)),
            settings,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ResolutionError, ServiceError};
    use crate::location::LocationSource;
    use crate::memory::{CatalogEntry, InMemoryCatalog, InMemoryLocations, RecordingCart};
    use async_trait::async_trait;
    use recipecart_core::{Modality, Money, Product, Recipe};
    use std::sync::Mutex;
    use std::time::Duration;

    fn product(id: &str, description: &str, regular: i64, promo: Option<i64>) -> Product {
        Product {
            id: id.to_string(),
            description: description.to_string(),
            regular_price: Money::from_cents(regular),
            promo_price: promo.map(Money::from_cents),
            aisle: None,
        }
    }

    /// Everything in the Apple Pie recipe except lemon juice.
    fn pie_catalog() -> InMemoryCatalog {
        let apples = product("apples", "Honeycrisp Apples 3lb", 599, Some(499));
        let flour = product("flour", "All Purpose Flour 5lb", 349, None);
        let sugar = product("sugar", "Granulated Sugar 4lb", 329, None);
        let butter = product("butter", "Sweet Cream Butter 4 Sticks", 549, Some(449));
        let salt = product("salt", "Iodized Salt 26oz", 129, None);
        let cinnamon = product("cinnamon", "Ground Cinnamon 2.37oz", 289, None);
        let eggs = product("eggs", "Large Eggs 12ct", 399, None);

        InMemoryCatalog::new(vec![
            CatalogEntry::new(apples).keyword("apples"),
            CatalogEntry::new(flour).keyword("all-purpose flour"),
            CatalogEntry::new(sugar).keyword("granulated sugar"),
            CatalogEntry::new(butter).keyword("butter"),
            CatalogEntry::new(salt).keyword("salt"),
            CatalogEntry::new(cinnamon).keyword("ground cinnamon"),
            CatalogEntry::new(eggs).keyword("eggs"),
        ])
    }

    struct Harness {
        catalog: Arc<InMemoryCatalog>,
        locations: Arc<InMemoryLocations>,
        cart: Arc<RecordingCart>,
    }

    impl Harness {
        fn new(catalog: InMemoryCatalog) -> Self {
            Self::with(catalog, RecordingCart::new())
        }

        fn with(catalog: InMemoryCatalog, cart: RecordingCart) -> Self {
            Harness {
                catalog: Arc::new(catalog),
                locations: Arc::new(InMemoryLocations::default().with("45202", "01400441")),
                cart: Arc::new(cart),
            }
        }

        fn builder(&self) -> ShoppingOrchestratorBuilder {
            ShoppingOrchestratorBuilder::new()
                .with_catalog(self.catalog.clone())
                .with_locations(self.locations.clone())
                .with_cart(self.cart.clone())
        }

        fn orchestrator(&self) -> ShoppingOrchestrator {
            self.builder().build().unwrap()
        }
    }

    #[derive(Default)]
    struct RecordingObserver {
        phases: Mutex<Vec<RunPhase>>,
        ingredients: Mutex<Vec<String>>,
    }

    impl RunObserver for RecordingObserver {
        fn on_phase(&self, _run_id: Uuid, phase: RunPhase) {
            self.phases.lock().unwrap().push(phase);
        }

        fn on_ingredient(&self, _run_id: Uuid, result: &MatchResult) {
            self.ingredients.lock().unwrap().push(result.ingredient().name.clone());
        }
    }

    #[tokio::test]
    async fn test_one_missing_ingredient_of_eight() {
        let harness = Harness::new(pie_catalog());
        let outcome = harness
            .orchestrator()
            .run("apple pie recipe", &LocationInputs::explicit("01400441"))
            .await
            .unwrap();

        let result = &outcome.result;
        assert_eq!(result.recipe_name, "Apple Pie");
        assert_eq!(result.matched.len(), 7);
        assert_eq!(result.unmatched.len(), 1);
        assert_eq!(result.unmatched[0].ingredient.name, "lemon juice");
        assert_eq!(result.unmatched[0].reason, UnmatchedReason::NotCarried);

        // apples 499 + flour 349 + sugar 329 + butter 449 + salt 129 + cinnamon 289 + eggs 399
        assert_eq!(result.total_cost, Money::from_cents(2443));
        let recomputed: Money = result
            .matched
            .iter()
            .map(|m| m.effective_price * m.line_item.package_count())
            .sum();
        assert_eq!(result.total_cost, recomputed);
    }

    #[tokio::test]
    async fn test_partition_is_exhaustive_and_ordered() {
        let harness = Harness::new(pie_catalog());
        let outcome = harness
            .orchestrator()
            .run("Apple Pie", &LocationInputs::explicit("01400441"))
            .await
            .unwrap();

        let recipe = RecipeCatalog::builtin();
        let expected: Vec<&str> = recipe
            .lookup("apple pie")
            .recipe
            .ingredients
            .iter()
            .map(|i| i.name.as_str())
            .collect();

        let matched: Vec<&str> = outcome
            .result
            .matched
            .iter()
            .map(|m| m.ingredient_name())
            .collect();
        let unmatched = outcome.result.unmatched_names();

        assert_eq!(matched.len() + unmatched.len(), expected.len());
        for name in &expected {
            let hits = matched.iter().filter(|m| *m == name).count()
                + unmatched.iter().filter(|u| *u == name).count();
            assert_eq!(hits, 1, "{} should appear exactly once", name);
        }

        // matched lines keep recipe order
        let positions: Vec<usize> = matched
            .iter()
            .map(|m| expected.iter().position(|e| e == m).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn test_order_preserved_when_searches_finish_out_of_order() {
        let catalog = pie_catalog()
            .delay_term("apples", Duration::from_millis(40))
            .delay_term("all-purpose flour", Duration::from_millis(20));
        let harness = Harness::new(catalog);
        let orchestrator = harness
            .builder()
            .with_settings(RunSettings {
                max_concurrency: 8,
                ..RunSettings::default()
            })
            .build()
            .unwrap();

        let outcome = orchestrator
            .run("apple pie", &LocationInputs::explicit("01400441"))
            .await
            .unwrap();

        let ids: Vec<&str> = outcome
            .cart_request
            .items
            .iter()
            .map(|l| l.product_id.as_str())
            .collect();
        assert_eq!(ids, vec!["apples", "flour", "sugar", "butter", "salt", "cinnamon", "eggs"]);
    }

    #[tokio::test]
    async fn test_concurrency_bound_respected() {
        let harness = Harness::new(pie_catalog().delay_all(Duration::from_millis(10)));
        let orchestrator = harness
            .builder()
            .with_settings(RunSettings {
                max_concurrency: 2,
                ..RunSettings::default()
            })
            .build()
            .unwrap();

        orchestrator
            .run("apple pie", &LocationInputs::explicit("01400441"))
            .await
            .unwrap();

        assert_eq!(harness.catalog.search_count(), 8);
        assert!(harness.catalog.max_in_flight() <= 2);
    }

    #[tokio::test]
    async fn test_search_failure_marks_unmatched_and_continues() {
        let harness = Harness::new(pie_catalog().fail_term("butter"));
        let outcome = harness
            .orchestrator()
            .run("apple pie", &LocationInputs::explicit("01400441"))
            .await
            .unwrap();

        assert_eq!(outcome.result.matched.len(), 6);
        let butter = outcome
            .result
            .unmatched
            .iter()
            .find(|u| u.ingredient.name == "butter")
            .unwrap();
        assert!(matches!(butter.reason, UnmatchedReason::SearchFailed(_)));
    }

    #[tokio::test]
    async fn test_no_location_inputs_fails_without_result() {
        let harness = Harness::new(pie_catalog());
        let observer = Arc::new(RecordingObserver::default());
        let orchestrator = harness.builder().with_observer(observer.clone()).build().unwrap();

        let err = orchestrator
            .run("apple pie", &LocationInputs::default())
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::Resolution(ResolutionError::NoInputs)));
        assert_eq!(harness.catalog.search_count(), 0);
        assert!(harness.cart.requests().await.is_empty());
        assert_eq!(*observer.phases.lock().unwrap(), vec![RunPhase::Start, RunPhase::Failed]);
    }

    #[tokio::test]
    async fn test_phase_sequence() {
        let harness = Harness::new(pie_catalog());
        let observer = Arc::new(RecordingObserver::default());
        let orchestrator = harness.builder().with_observer(observer.clone()).build().unwrap();

        orchestrator
            .run("apple pie", &LocationInputs::explicit("01400441"))
            .await
            .unwrap();

        assert_eq!(
            *observer.phases.lock().unwrap(),
            vec![
                RunPhase::Start,
                RunPhase::LocationResolved,
                RunPhase::Searching,
                RunPhase::Aggregated,
                RunPhase::Done,
            ]
        );
        assert_eq!(observer.ingredients.lock().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_postal_code_looked_up_once_per_run() {
        let harness = Harness::new(pie_catalog());
        let orchestrator = harness.orchestrator();
        let inputs = LocationInputs::postal("45202");

        let outcome = orchestrator.run("apple pie", &inputs).await.unwrap();
        assert_eq!(outcome.location.location_id, "01400441");
        assert_eq!(harness.locations.lookup_count(), 1);

        // 8 ingredient searches, still one lookup
        assert_eq!(harness.catalog.search_count(), 8);

        orchestrator.run("apple pie", &inputs).await.unwrap();
        assert_eq!(harness.locations.lookup_count(), 2);
    }

    #[tokio::test]
    async fn test_cart_failure_keeps_totals() {
        let ok = Harness::new(pie_catalog());
        let failing = Harness::with(
            pie_catalog(),
            RecordingCart::failing(ServiceError::Unauthorized("token expired".into())),
        );
        let inputs = LocationInputs::explicit("01400441");

        let good = ok.orchestrator().run("apple pie", &inputs).await.unwrap();
        let bad = failing.orchestrator().run("apple pie", &inputs).await.unwrap();

        assert!(good.submission.success);
        assert_eq!(good.submission.added_count, 7);
        assert!(bad.submission.attempted);
        assert!(!bad.submission.success);
        assert!(bad.submission.detail.contains("token expired"));

        assert_eq!(good.result.total_cost, bad.result.total_cost);
        assert_eq!(good.result.matched, bad.result.matched);
        assert_eq!(good.result.unmatched, bad.result.unmatched);
        assert_eq!(good.cart_request, bad.cart_request);
    }

    #[tokio::test]
    async fn test_cart_request_sent_once_with_modality() {
        let harness = Harness::new(pie_catalog());
        let config = EngineConfig {
            cart: crate::config::CartSettings {
                modality: Modality::Delivery,
                submit: true,
            },
            ..EngineConfig::default()
        };
        let orchestrator = harness.builder().with_config(&config).build().unwrap();

        let outcome = orchestrator
            .run("apple pie", &LocationInputs::explicit("01400441"))
            .await
            .unwrap();

        let sent = harness.cart.requests().await;
        assert_eq!(sent, vec![outcome.cart_request.clone()]);
        assert!(sent[0].items.iter().all(|l| l.modality == Modality::Delivery));
    }

    #[tokio::test]
    async fn test_submission_disabled_and_empty_cart() {
        let harness = Harness::new(InMemoryCatalog::default());
        let orchestrator = harness.orchestrator();
        let inputs = LocationInputs::explicit("01400441");

        let empty = orchestrator.run("brownies", &inputs).await.unwrap();
        assert!(empty.result.matched.is_empty());
        assert!(empty.result.total_cost.is_zero());
        assert!(!empty.submission.attempted);
        assert!(empty.submission.success);
        assert_eq!(empty.submission.detail, "nothing to submit");

        let disabled = Harness::new(pie_catalog());
        let orchestrator = disabled
            .builder()
            .with_settings(RunSettings {
                submit_cart: false,
                ..RunSettings::default()
            })
            .build()
            .unwrap();
        let outcome = orchestrator.run("apple pie", &inputs).await.unwrap();
        assert!(!outcome.submission.attempted);
        assert!(!outcome.submission.success);
        assert!(disabled.cart.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_query_uses_default_recipe() {
        let harness = Harness::new(pie_catalog());
        let outcome = harness
            .orchestrator()
            .run("xyz", &LocationInputs::explicit("01400441"))
            .await
            .unwrap();

        assert!(outcome.used_default_recipe);
        assert_eq!(outcome.result.recipe_name, "Chocolate Chip Cookies");
        assert_eq!(outcome.result.ingredient_count(), 9);
    }

    #[tokio::test]
    async fn test_malformed_postal_code_is_a_resolution_failure() {
        let harness = Harness::new(pie_catalog());
        let err = harness
            .orchestrator()
            .run("apple pie", &LocationInputs::postal("not-a-zip"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            EngineError::Resolution(ResolutionError::Exhausted { .. })
        ));
        assert_eq!(harness.locations.lookup_count(), 0);
        assert_eq!(harness.catalog.search_count(), 0);
    }

    #[tokio::test]
    async fn test_malformed_postal_code_falls_back_to_preferred() {
        let harness = Harness::new(pie_catalog());
        let inputs = LocationInputs {
            location_id: None,
            postal_code: Some("abc".into()),
            preferred_location_id: Some("01400441".into()),
        };

        let outcome = harness.orchestrator().run("apple pie", &inputs).await.unwrap();
        assert_eq!(outcome.location.location_id, "01400441");
        assert_eq!(outcome.location.source, LocationSource::Preferred);
        assert_eq!(outcome.result.ingredient_count(), 8);
    }

    #[tokio::test]
    async fn test_overlong_query_runs_default_recipe() {
        let harness = Harness::new(pie_catalog());
        let outcome = harness
            .orchestrator()
            .run(&"a".repeat(101), &LocationInputs::explicit("01400441"))
            .await
            .unwrap();

        assert!(outcome.used_default_recipe);
        assert_eq!(outcome.result.recipe_name, "Chocolate Chip Cookies");
        assert_eq!(outcome.result.ingredient_count(), 9);
    }

    #[tokio::test]
    async fn test_bad_inputs_only_fail_with_resolution_error() {
        let long_query = "apple pie ".repeat(20);
        let cases = vec![
            ("", LocationInputs::default()),
            (long_query.as_str(), LocationInputs::postal("abc")),
            ("apple pie", LocationInputs::postal("1234567")),
            (
                "xyz",
                LocationInputs {
                    location_id: Some("   ".into()),
                    postal_code: Some("99999".into()),
                    preferred_location_id: None,
                },
            ),
        ];

        for (query, inputs) in cases {
            let harness = Harness::new(pie_catalog());
            let observer = Arc::new(RecordingObserver::default());
            let orchestrator = harness.builder().with_observer(observer.clone()).build().unwrap();

            let err = orchestrator.run(query, &inputs).await.unwrap_err();
            assert!(err.is_resolution_error(), "{:?} gave {}", inputs, err);
            assert_eq!(
                *observer.phases.lock().unwrap(),
                vec![RunPhase::Start, RunPhase::Failed],
                "phases for {:?}",
                inputs
            );
            assert_eq!(harness.catalog.search_count(), 0);
        }
    }

    struct PanickingCatalog;

    #[async_trait]
    impl CatalogSearchAdapter for PanickingCatalog {
        async fn search(
            &self,
            term: &str,
            _location_id: &str,
            _limit: usize,
        ) -> Result<Vec<Product>, ServiceError> {
            if term == "eggs" {
                panic!("catalog client crashed");
            }
            Ok(vec![product(term, term, 100, None)])
        }
    }

    #[tokio::test]
    async fn test_worker_panic_becomes_unmatched() {
        let orchestrator = ShoppingOrchestrator::new(
            Arc::new(PanickingCatalog),
            Arc::new(InMemoryLocations::default()),
            Arc::new(RecordingCart::new()),
        );

        let outcome = orchestrator
            .run("apple pie", &LocationInputs::explicit("01400441"))
            .await
            .unwrap();

        assert_eq!(outcome.result.matched.len(), 7);
        assert_eq!(outcome.result.unmatched[0].ingredient.name, "eggs");
        assert_eq!(outcome.result.unmatched[0].reason, UnmatchedReason::WorkerFailed);
    }

    #[tokio::test]
    async fn test_custom_recipes_and_package_counts() {
        let recipes = RecipeCatalog::new(
            vec![Recipe {
                name: "Breakfast".into(),
                ingredients: vec![Ingredient::new("eggs", 30.0, "count")],
            }],
            "Breakfast",
        )
        .unwrap();
        let harness = Harness::new(pie_catalog());
        let orchestrator = harness.builder().with_recipes(recipes).build().unwrap();

        let outcome = orchestrator
            .run("breakfast", &LocationInputs::explicit("01400441"))
            .await
            .unwrap();

        assert_eq!(outcome.cart_request.items[0].quantity, 3);
        assert_eq!(outcome.result.total_cost, Money::from_cents(3 * 399));
    }

    #[test]
    fn test_builder_requires_collaborators() {
        let err = ShoppingOrchestratorBuilder::new().build().err().unwrap();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_builder_rejects_out_of_range_settings() {
        let harness = Harness::new(InMemoryCatalog::default());
        let build = |search_limit: usize, max_concurrency: usize| {
            harness
                .builder()
                .with_settings(RunSettings {
                    search_limit,
                    max_concurrency,
                    ..RunSettings::default()
                })
                .build()
        };

        assert!(build(10_000, 4).err().unwrap().is_config_error());
        assert!(build(2, 10_000).err().unwrap().is_config_error());
        assert!(build(0, 4).is_err());
        assert!(build(2, 0).is_err());
        assert!(build(50, 16).is_ok());
        assert!(build(1, 1).is_ok());
    }
}
