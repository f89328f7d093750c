//! # Quantity Normalizer
//!
//! Converts a cooking-unit quantity ("2.25 cups flour") into the number of
//! store packages to buy ("1 bag").
//!
//! ## Rule Table
//! ```text
//! ┌────┬──────────────────┬───────────────────────────┬───────────────────────┐
//! │ #  │ Category         │ Applies when              │ Packages              │
//! ├────┼──────────────────┼───────────────────────────┼───────────────────────┤
//! │ 1  │ SpiceExtract     │ spice keyword, tsp/tbsp   │ 1                     │
//! │ 2  │ FlourSugar       │ flour/sugar, cups         │ round(q / 3)          │
//! │ 3a │ Butter           │ butter, sticks            │ round(q / 4)          │
//! │ 3b │ Butter           │ butter, cups              │ round(q × 2 / 4)      │
//! │ 4  │ Egg              │ egg, count/egg(s)         │ round(q / 12)         │
//! │ 5  │ Produce          │ produce keyword, count/"" │ 1                     │
//! │ 6  │ ChocolateNut     │ chocolate/nut, cups       │ round(q / 1.5)        │
//! │ -  │ (none)           │ nothing matched           │ 1                     │
//! └────┴──────────────────┴───────────────────────────┴───────────────────────┘
//! ```
//!
//! Rules are evaluated top to bottom and the first match wins. Name matching
//! is a case-insensitive substring test; unit matching is on the parsed
//! [`Unit`].
//!
//! ## Rounding
//! Round half away from zero (`f64::round`), then clamp to at least 1. So
//! `30 eggs / 12 = 2.5 → 3` and `2.5 cups flour / 3 = 0.83 → 1`. A
//! non-finite or non-positive quantity also yields 1.

use serde::Serialize;
use std::fmt;

use crate::types::{Ingredient, NormalizedLineItem, Unit};
use crate::MAX_PACKAGE_COUNT;

// =============================================================================
// Keyword Sets
// =============================================================================

const SPICE_KEYWORDS: &[&str] = &[
    "cinnamon", "vanilla", "extract", "salt", "baking", "soda", "powder", "nutmeg", "ginger",
];

const FLOUR_SUGAR_KEYWORDS: &[&str] = &["flour", "sugar", "granulated"];

const PRODUCE_KEYWORDS: &[&str] = &[
    "apple", "banana", "tomato", "pepper", "lettuce", "onion", "garlic", "juice", "lemon", "lime",
    "orange",
];

const CHOCOLATE_NUT_KEYWORDS: &[&str] = &["chocolate", "chip", "nut", "peanut", "walnut"];

// =============================================================================
// Rule Types
// =============================================================================

/// Ingredient category that decided a package count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    SpiceExtract,
    FlourSugar,
    Butter,
    Egg,
    Produce,
    ChocolateNut,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Category::SpiceExtract => "spice/extract",
            Category::FlourSugar => "flour/sugar",
            Category::Butter => "butter",
            Category::Egg => "egg",
            Category::Produce => "produce",
            Category::ChocolateNut => "chocolate/nut",
        };
        f.write_str(label)
    }
}

/// How a matching rule turns a quantity into packages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PackageRule {
    /// Always this many packages.
    Fixed(u32),
    /// `round(quantity × multiplier / per_package)`.
    Divide { multiplier: f64, per_package: f64 },
}

impl PackageRule {
    fn per(per_package: f64) -> Self {
        PackageRule::Divide {
            multiplier: 1.0,
            per_package,
        }
    }

    fn apply(&self, quantity: f64) -> u32 {
        match *self {
            PackageRule::Fixed(count) => count.max(1),
            PackageRule::Divide {
                multiplier,
                per_package,
            } => round_packages(quantity * multiplier / per_package),
        }
    }
}

/// Lower-cased ingredient name and parsed unit.
pub type Predicate = fn(&str, &Unit) -> bool;

/// One row of the rule table.
#[derive(Clone, Copy)]
pub struct Rule {
    pub category: Category,
    pub applies: Predicate,
    pub packages: PackageRule,
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("category", &self.category)
            .field("packages", &self.packages)
            .finish_non_exhaustive()
    }
}

/// Outcome of normalizing one ingredient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Normalization {
    pub package_count: u32,
    /// None when the default rule applied.
    pub category: Option<Category>,
}

// =============================================================================
// Normalizer
// =============================================================================

/// Ordered `(predicate, rule)` table, first match wins.
#[derive(Debug, Clone)]
pub struct QuantityNormalizer {
    rules: Vec<Rule>,
}

impl QuantityNormalizer {
    /// The standard grocery heuristics.
    pub fn standard() -> Self {
        QuantityNormalizer {
            rules: vec![
                Rule {
                    category: Category::SpiceExtract,
                    applies: |name, unit| {
                        unit.is_small_volume() && contains_any(name, SPICE_KEYWORDS)
                    },
                    packages: PackageRule::Fixed(1),
                },
                Rule {
                    category: Category::FlourSugar,
                    applies: |name, unit| {
                        *unit == Unit::Cup && contains_any(name, FLOUR_SUGAR_KEYWORDS)
                    },
                    packages: PackageRule::per(3.0),
                },
                Rule {
                    category: Category::Butter,
                    applies: |name, unit| *unit == Unit::Stick && name.contains("butter"),
                    packages: PackageRule::per(4.0),
                },
                Rule {
                    category: Category::Butter,
                    // 2 sticks per cup
                    applies: |name, unit| *unit == Unit::Cup && name.contains("butter"),
                    packages: PackageRule::Divide {
                        multiplier: 2.0,
                        per_package: 4.0,
                    },
                },
                Rule {
                    category: Category::Egg,
                    applies: |name, unit| {
                        matches!(unit, Unit::Count | Unit::Egg) && name.contains("egg")
                    },
                    packages: PackageRule::per(12.0),
                },
                Rule {
                    category: Category::Produce,
                    applies: |name, unit| {
                        matches!(unit, Unit::Count | Unit::Unitless)
                            && contains_any(name, PRODUCE_KEYWORDS)
                    },
                    packages: PackageRule::Fixed(1),
                },
                Rule {
                    category: Category::ChocolateNut,
                    applies: |name, unit| {
                        *unit == Unit::Cup && contains_any(name, CHOCOLATE_NUT_KEYWORDS)
                    },
                    packages: PackageRule::per(1.5),
                },
            ],
        }
    }

    /// Builds a normalizer from a custom rule table.
    pub fn with_rules(rules: Vec<Rule>) -> Self {
        QuantityNormalizer { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Package count for an ingredient. Always at least 1.
    ///
    /// ```rust
    /// use recipecart_core::normalize::QuantityNormalizer;
    /// use recipecart_core::types::Ingredient;
    ///
    /// let normalizer = QuantityNormalizer::standard();
    /// assert_eq!(normalizer.normalize(&Ingredient::new("Eggs", 30.0, "count")), 3);
    /// assert_eq!(normalizer.normalize(&Ingredient::new("All-Purpose Flour", 2.5, "cups")), 1);
    /// ```
    pub fn normalize(&self, ingredient: &Ingredient) -> u32 {
        self.evaluate(ingredient).package_count
    }

    /// The category of the first matching rule, if any.
    pub fn explain(&self, ingredient: &Ingredient) -> Option<Category> {
        self.evaluate(ingredient).category
    }

    /// Count and deciding category in one pass.
    pub fn evaluate(&self, ingredient: &Ingredient) -> Normalization {
        let name = ingredient.name.to_lowercase();

        match self.rules.iter().find(|rule| (rule.applies)(&name, &ingredient.unit)) {
            Some(rule) => Normalization {
                package_count: rule.packages.apply(ingredient.quantity),
                category: Some(rule.category),
            },
            None => Normalization {
                package_count: 1,
                category: None,
            },
        }
    }

    /// Normalizes into a line item.
    pub fn line_item(&self, ingredient: Ingredient) -> NormalizedLineItem {
        let count = self.normalize(&ingredient);
        NormalizedLineItem::new(ingredient, count)
    }
}

impl Default for QuantityNormalizer {
    fn default() -> Self {
        Self::standard()
    }
}

fn contains_any(name: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| name.contains(keyword))
}

/// Round half away from zero, clamp to 1..=MAX_PACKAGE_COUNT. NaN and
/// negatives become 1.
fn round_packages(raw: f64) -> u32 {
    let rounded = raw.round();
    if rounded.is_nan() || rounded < 1.0 {
        1
    } else if rounded >= MAX_PACKAGE_COUNT as f64 {
        MAX_PACKAGE_COUNT
    } else {
        rounded as u32
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn count(name: &str, qty: f64, unit: &str) -> u32 {
        QuantityNormalizer::standard().normalize(&Ingredient::new(name, qty, unit))
    }

    #[test]
    fn test_egg_scenarios() {
        assert_eq!(count("Eggs", 12.0, "count"), 1);
        assert_eq!(count("Eggs", 13.0, "count"), 1);
        assert_eq!(count("Eggs", 30.0, "count"), 3);
        assert_eq!(count("eggs", 2.0, "eggs"), 1);
        assert_eq!(count("Large Eggs", 24.0, "egg"), 2);
    }

    #[test]
    fn test_flour_sugar() {
        assert_eq!(count("All-Purpose Flour", 2.5, "cups"), 1);
        assert_eq!(count("granulated sugar", 6.0, "cups"), 2);
        assert_eq!(count("brown sugar", 0.75, "cups"), 1);
        // 4.5 / 3 = 1.5, half rounds up
        assert_eq!(count("bread flour", 4.5, "cups"), 2);
    }

    #[test]
    fn test_butter_sticks_and_cups() {
        assert_eq!(count("butter", 1.0, "sticks"), 1);
        assert_eq!(count("butter", 8.0, "sticks"), 2);
        assert_eq!(count("unsalted butter", 4.0, "cups"), 2);
        assert_eq!(count("butter", 0.5, "cups"), 1);
    }

    #[test]
    fn test_spice_extract_is_one_package() {
        assert_eq!(count("vanilla extract", 3.0, "tbsp"), 1);
        assert_eq!(count("salt", 0.25, "tsp"), 1);
        assert_eq!(count("baking soda", 1.0, "tsp"), 1);
    }

    #[test]
    fn test_produce_is_one_package() {
        assert_eq!(count("apples", 6.0, "count"), 1);
        assert_eq!(count("onion", 3.0, ""), 1);
    }

    #[test]
    fn test_chocolate_nut() {
        assert_eq!(count("chocolate chips", 2.0, "cups"), 1);
        assert_eq!(count("chopped walnuts", 3.0, "cups"), 2);
    }

    #[test]
    fn test_first_rule_wins() {
        let normalizer = QuantityNormalizer::standard();

        // "peanut butter" hits butter before chocolate/nut
        let pb = Ingredient::new("peanut butter", 4.0, "cups");
        assert_eq!(normalizer.explain(&pb), Some(Category::Butter));

        // "lemon juice" in tbsp: not a spice keyword, produce needs count
        let juice = Ingredient::new("lemon juice", 1.0, "tbsp");
        assert_eq!(normalizer.explain(&juice), None);

        // powder in cups skips the spice rule
        let powder = Ingredient::new("cocoa powder", 0.75, "cups");
        assert_eq!(normalizer.explain(&powder), None);
        assert_eq!(normalizer.normalize(&powder), 1);
    }

    #[test]
    fn test_unknown_defaults_to_one() {
        assert_eq!(count("saffron threads", 40.0, "pinch"), 1);
    }

    #[test]
    fn test_never_below_one() {
        for qty in [0.0, -5.0, 0.0001, f64::NAN, f64::NEG_INFINITY] {
            assert_eq!(count("flour", qty, "cups"), 1);
            assert_eq!(count("eggs", qty, "count"), 1);
            assert_eq!(count("butter", qty, "sticks"), 1);
        }
    }

    #[test]
    fn test_huge_quantities_capped() {
        assert_eq!(count("Eggs", 1.0e12, "count"), MAX_PACKAGE_COUNT);
        assert_eq!(count("Eggs", f64::INFINITY, "count"), MAX_PACKAGE_COUNT);
        assert_eq!(count("granulated sugar", 2997.0, "cups"), 999);
        assert_eq!(count("granulated sugar", 2994.0, "cups"), 998);
    }

    #[test]
    fn test_deterministic() {
        let normalizer = QuantityNormalizer::standard();
        let ingredient = Ingredient::new("Chocolate Chips", 2.25, "Cups");
        let first = normalizer.evaluate(&ingredient);
        for _ in 0..10 {
            assert_eq!(normalizer.evaluate(&ingredient), first);
        }
    }

    #[test]
    fn test_custom_rule_table() {
        let normalizer = QuantityNormalizer::with_rules(vec![Rule {
            category: Category::Produce,
            applies: |name, _| name.contains("berry"),
            packages: PackageRule::Fixed(0),
        }]);
        // Fixed(0) is still clamped
        assert_eq!(normalizer.normalize(&Ingredient::new("Blueberry", 1.0, "cups")), 1);
        assert_eq!(normalizer.rules().len(), 1);
    }

    #[test]
    fn test_line_item() {
        let item = QuantityNormalizer::standard().line_item(Ingredient::new("eggs", 30.0, "count"));
        assert_eq!(item.package_count(), 3);
    }
}
