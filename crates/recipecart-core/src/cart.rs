//! # Cart Assembly
//!
//! Turns per-ingredient match results into the cart-addition request and
//! the priced shopping summary.
//!
//! ## Aggregation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Assembly                                        │
//! │                                                                         │
//! │  MatchResult[] (ingredient order)                                      │
//! │       │                                                                 │
//! │       ├── Matched   ──► matched[]   ──► assemble() ──► CartRequest      │
//! │       │                     │                                           │
//! │       │                     └──────► total_cost() = Σ price × packages  │
//! │       │                                                                 │
//! │       └── Unmatched ──► unmatched[] (contributes nothing to the total) │
//! │                                                                         │
//! │  NOTE: No merging. Same product for two ingredients = two lines.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::money::Money;
use crate::types::{CartLine, CartRequest, MatchResult, MatchedLine, Modality, ShoppingResult};

/// Builds cart requests for one fulfillment modality.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CartAssembler {
    modality: Modality,
}

impl CartAssembler {
    pub fn new(modality: Modality) -> Self {
        CartAssembler { modality }
    }

    pub fn modality(&self) -> Modality {
        self.modality
    }

    /// One `(product_id, package_count)` line per matched ingredient, in
    /// ingredient order.
    ///
    /// ```rust
    /// use recipecart_core::cart::CartAssembler;
    /// use recipecart_core::money::Money;
    /// use recipecart_core::types::*;
    ///
    /// let butter = Product {
    ///     id: "0001111089308".to_string(),
    ///     description: "Unsalted Butter".to_string(),
    ///     regular_price: Money::from_cents(499),
    ///     promo_price: None,
    ///     aisle: None,
    /// };
    /// let line = MatchedLine::new(
    ///     NormalizedLineItem::new(Ingredient::new("butter", 8.0, "sticks"), 2),
    ///     butter,
    /// );
    ///
    /// let request = CartAssembler::default().assemble(&[line]);
    /// assert_eq!(request.items[0].product_id, "0001111089308");
    /// assert_eq!(request.items[0].quantity, 2);
    /// assert_eq!(request.items[0].modality, Modality::Pickup);
    /// ```
    pub fn assemble(&self, matched: &[MatchedLine]) -> CartRequest {
        CartRequest {
            items: matched
                .iter()
                .map(|line| CartLine {
                    product_id: line.product.id.clone(),
                    quantity: line.line_item.package_count(),
                    modality: self.modality,
                })
                .collect(),
        }
    }
}

/// Σ effective price × package count over matched lines.
pub fn total_cost(matched: &[MatchedLine]) -> Money {
    matched.iter().map(MatchedLine::line_total).sum()
}

impl ShoppingResult {
    /// Partitions match results into matched and unmatched, keeping
    /// ingredient order within each side, and computes the total.
    pub fn from_results(
        recipe_name: impl Into<String>,
        location_id: impl Into<String>,
        results: Vec<MatchResult>,
    ) -> Self {
        let mut matched = Vec::new();
        let mut unmatched = Vec::new();

        for result in results {
            match result {
                MatchResult::Matched(line) => matched.push(line),
                MatchResult::Unmatched(miss) => unmatched.push(miss),
            }
        }

        let total_cost = total_cost(&matched);

        ShoppingResult {
            recipe_name: recipe_name.into(),
            location_id: location_id.into(),
            matched,
            unmatched,
            total_cost,
        }
    }

    /// Number of ingredients covered by this result.
    pub fn ingredient_count(&self) -> usize {
        self.matched.len() + self.unmatched.len()
    }

    pub fn unmatched_names(&self) -> Vec<&str> {
        self.unmatched
            .iter()
            .map(|miss| miss.ingredient.name.as_str())
            .collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
