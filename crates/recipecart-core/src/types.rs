//! # Domain Types
//!
//! Core domain types used throughout RecipeCart.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌──────────────────────┐   ┌─────────────────┐  │
//! │  │     Recipe      │   │  NormalizedLineItem  │   │    Product      │  │
//! │  │  ─────────────  │   │  ──────────────────  │   │  ─────────────  │  │
//! │  │  name           │──►│  ingredient          │   │  id             │  │
//! │  │  ingredients[]  │   │  package_count (≥1)  │   │  description    │  │
//! │  └─────────────────┘   └──────────┬───────────┘   │  regular_price  │  │
//! │                                   │               │  promo_price?   │  │
//! │                                   ▼               │  aisle?         │  │
//! │                        ┌──────────────────────┐   └────────┬────────┘  │
//! │                        │     MatchResult      │◄───────────┘           │
//! │                        │  Matched(line)       │                        │
//! │                        │  Unmatched(reason)   │                        │
//! │                        └──────────┬───────────┘                        │
//! │                                   ▼                                     │
//! │             CartRequest (matched only)   ShoppingResult (all)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every ingredient of a recipe produces exactly one `MatchResult`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::pricing;

// =============================================================================
// Unit of Measure
// =============================================================================

/// Cooking unit attached to a recipe quantity.
///
/// Parsing is case-insensitive and never fails: unrecognized text is kept
/// as `Other` so that normalization can fall through to the default rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Unit {
    Cup,
    Tablespoon,
    Teaspoon,
    Stick,
    Count,
    Egg,
    /// No unit given ("2 apples").
    Unitless,
    Other(String),
}

impl Unit {
    /// Canonical spelling, as used in the built-in recipes.
    pub fn as_str(&self) -> &str {
        match self {
            Unit::Cup => "cups",
            Unit::Tablespoon => "tbsp",
            Unit::Teaspoon => "tsp",
            Unit::Stick => "sticks",
            Unit::Count => "count",
            Unit::Egg => "eggs",
            Unit::Unitless => "",
            Unit::Other(text) => text,
        }
    }

    /// Teaspoons and tablespoons.
    pub fn is_small_volume(&self) -> bool {
        matches!(self, Unit::Teaspoon | Unit::Tablespoon)
    }
}

impl From<&str> for Unit {
    fn from(raw: &str) -> Self {
        let unit = raw.trim().to_lowercase();
        match unit.as_str() {
            "cup" | "cups" | "c" => Unit::Cup,
            "tbsp" | "tablespoon" | "tablespoons" => Unit::Tablespoon,
            "tsp" | "teaspoon" | "teaspoons" => Unit::Teaspoon,
            "stick" | "sticks" => Unit::Stick,
            "count" => Unit::Count,
            "egg" | "eggs" => Unit::Egg,
            "" => Unit::Unitless,
            _ => Unit::Other(unit),
        }
    }
}

impl From<String> for Unit {
    fn from(raw: String) -> Self {
        Unit::from(raw.as_str())
    }
}

impl From<Unit> for String {
    fn from(unit: Unit) -> Self {
        unit.as_str().to_string()
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Recipe & Ingredient
// =============================================================================

/// A cooking-recipe requirement, not a purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub quantity: f64,
    pub unit: Unit,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, quantity: f64, unit: impl Into<Unit>) -> Self {
        Ingredient {
            name: name.into(),
            quantity,
            unit: unit.into(),
        }
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit == Unit::Unitless {
            write!(f, "{}: {}", self.name, self.quantity)
        } else {
            write!(f, "{}: {} {}", self.name, self.quantity, self.unit)
        }
    }
}

/// A named, ordered list of ingredients. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub name: String,
    pub ingredients: Vec<Ingredient>,
}

// =============================================================================
// Normalized Line Item
// =============================================================================

/// An ingredient with its purchasable package count.
///
/// ## Invariant
/// `package_count >= 1`. The only constructor enforces it, so a required
/// ingredient can never be silently dropped by a zero count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedLineItem {
    pub ingredient: Ingredient,
    package_count: u32,
}

impl NormalizedLineItem {
    pub fn new(ingredient: Ingredient, package_count: u32) -> Self {
        NormalizedLineItem {
            ingredient,
            package_count: package_count.max(1),
        }
    }

    #[inline]
    pub fn package_count(&self) -> u32 {
        self.package_count
    }
}

// =============================================================================
// Product
// =============================================================================

/// One catalog search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog product identifier.
    pub id: String,

    /// Display name from the catalog.
    pub description: String,

    /// Everyday shelf price.
    pub regular_price: Money,

    /// Promotional price, when the item is on promotion.
    #[serde(default)]
    pub promo_price: Option<Money>,

    /// Aisle label ("Aisle 12", "12").
    #[serde(default)]
    pub aisle: Option<String>,
}

impl Product {
    /// The price actually paid per package.
    #[inline]
    pub fn effective_price(&self) -> Money {
        pricing::select_price(self)
    }

    /// True when the promo price is strictly lower than the regular price.
    pub fn is_on_sale(&self) -> bool {
        matches!(self.promo_price, Some(promo) if promo < self.regular_price)
    }
}

// =============================================================================
// Match Result
// =============================================================================

/// An ingredient that was found in the catalog and priced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedLine {
    pub line_item: NormalizedLineItem,
    pub product: Product,
    pub effective_price: Money,
}

impl MatchedLine {
    /// Pairs a line item with its product, applying the price policy.
    pub fn new(line_item: NormalizedLineItem, product: Product) -> Self {
        let effective_price = pricing::select_price(&product);
        MatchedLine {
            line_item,
            product,
            effective_price,
        }
    }

    /// effective price × package count.
    pub fn line_total(&self) -> Money {
        self.effective_price * self.line_item.package_count()
    }

    pub fn ingredient_name(&self) -> &str {
        &self.line_item.ingredient.name
    }
}

/// Why an ingredient ended up unmatched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum UnmatchedReason {
    /// The catalog returned no products for this location.
    NotCarried,
    /// The catalog call failed; one call is one attempt.
    SearchFailed(String),
    /// The search worker panicked or was cancelled.
    WorkerFailed,
}

impl fmt::Display for UnmatchedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnmatchedReason::NotCarried => write!(f, "not carried at this location"),
            UnmatchedReason::SearchFailed(message) => write!(f, "search failed: {}", message),
            UnmatchedReason::WorkerFailed => write!(f, "search worker did not complete"),
        }
    }
}

/// An ingredient no product could be found for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnmatchedIngredient {
    pub ingredient: Ingredient,
    pub reason: UnmatchedReason,
}

/// Outcome tag for one ingredient.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchResult {
    Matched(MatchedLine),
    Unmatched(UnmatchedIngredient),
}

impl MatchResult {
    pub fn unmatched(ingredient: Ingredient, reason: UnmatchedReason) -> Self {
        MatchResult::Unmatched(UnmatchedIngredient { ingredient, reason })
    }

    pub fn ingredient(&self) -> &Ingredient {
        match self {
            MatchResult::Matched(line) => &line.line_item.ingredient,
            MatchResult::Unmatched(miss) => &miss.ingredient,
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, MatchResult::Matched(_))
    }
}

// =============================================================================
// Cart Request
// =============================================================================

/// Fulfillment modality for cart lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Modality {
    #[default]
    Pickup,
    Delivery,
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modality::Pickup => write!(f, "PICKUP"),
            Modality::Delivery => write!(f, "DELIVERY"),
        }
    }
}

impl FromStr for Modality {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pickup" | "csp" => Ok(Modality::Pickup),
            "delivery" => Ok(Modality::Delivery),
            other => Err(ValidationError::InvalidFormat {
                field: "modality".to_string(),
                reason: format!("unknown modality '{}', expected pickup or delivery", other),
            }),
        }
    }
}

/// One cart addition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: String,
    pub quantity: u32,
    pub modality: Modality,
}

/// Cart-addition request built only from matched ingredients.
///
/// Lines follow ingredient order and are not merged: the same product
/// matched for two ingredients appears twice.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CartRequest {
    pub items: Vec<CartLine>,
}

impl CartRequest {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities over all lines.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|line| line.quantity as u64).sum()
    }
}

// =============================================================================
// Shopping Result
// =============================================================================

/// Terminal output of one orchestration run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShoppingResult {
    pub recipe_name: String,
    pub location_id: String,
    pub matched: Vec<MatchedLine>,
    pub unmatched: Vec<UnmatchedIngredient>,
    pub total_cost: Money,
}

// =============================================================================
// Unit Tests
// =============================================================================
