//! # Recipe Catalog
//!
//! A fixed, ordered list of recipes with one designated default.
//!
//! ## Lookup Policy
//! ```text
//! query = "apple pie recipe"
//!      │
//!      ▼  lower-case, trim
//! for recipe in catalog (in order):
//!      name ⊆ query  OR  query ⊆ name ? ──► return recipe
//!      │
//!      ▼  no entry matched (or query blank)
//! return default recipe
//! ```
//!
//! Absence of a match is a policy decision (default substitution), never an
//! error. `lookup` reports whether the default was substituted so callers
//! can tell the user.

use crate::error::{CoreError, CoreResult};
use crate::types::{Ingredient, Recipe};

/// Name of the default recipe in the built-in catalog.
pub const DEFAULT_RECIPE_NAME: &str = "Chocolate Chip Cookies";

/// Result of a catalog lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecipeLookup<'a> {
    pub recipe: &'a Recipe,
    /// True when no entry matched and the default was returned.
    pub used_default: bool,
}

/// Ordered recipe records with a default-fallback record.
#[derive(Debug, Clone)]
pub struct RecipeCatalog {
    recipes: Vec<Recipe>,
    default_index: usize,
}

impl RecipeCatalog {
    /// Builds a catalog. `default_name` must match one of the recipes
    /// (case-insensitive).
    pub fn new(recipes: Vec<Recipe>, default_name: &str) -> CoreResult<Self> {
        if recipes.is_empty() {
            return Err(CoreError::EmptyCatalog);
        }

        let wanted = default_name.trim().to_lowercase();
        let default_index = recipes
            .iter()
            .position(|r| r.name.to_lowercase() == wanted)
            .ok_or_else(|| CoreError::RecipeNotFound(default_name.to_string()))?;

        Ok(RecipeCatalog {
            recipes,
            default_index,
        })
    }

    /// The built-in dessert catalog.
    pub fn builtin() -> Self {
        RecipeCatalog {
            recipes: builtin_recipes(),
            default_index: 1,
        }
    }

    /// Finds a recipe by case-insensitive substring match in either
    /// direction, falling back to the default.
    ///
    /// ```rust
    /// use recipecart_core::recipe::RecipeCatalog;
    ///
    /// let catalog = RecipeCatalog::builtin();
    /// assert_eq!(catalog.lookup("apple pie recipe").recipe.name, "Apple Pie");
    ///
    /// let fallback = catalog.lookup("xyz");
    /// assert!(fallback.used_default);
    /// assert_eq!(fallback.recipe.name, "Chocolate Chip Cookies");
    /// ```
    pub fn lookup(&self, query: &str) -> RecipeLookup<'_> {
        let query = query.trim().to_lowercase();

        if !query.is_empty() {
            let found = self.recipes.iter().find(|recipe| {
                let name = recipe.name.to_lowercase();
                query.contains(&name) || name.contains(&query)
            });
            if let Some(recipe) = found {
                return RecipeLookup {
                    recipe,
                    used_default: false,
                };
            }
        }

        RecipeLookup {
            recipe: self.default_recipe(),
            used_default: true,
        }
    }

    pub fn default_recipe(&self) -> &Recipe {
        &self.recipes[self.default_index]
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.recipes.iter().map(|r| r.name.as_str())
    }
}

impl Default for RecipeCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn recipe(name: &str, ingredients: &[(&str, f64, &str)]) -> Recipe {
    Recipe {
        name: name.to_string(),
        ingredients: ingredients
            .iter()
            .map(|&(ingredient, qty, unit)| Ingredient::new(ingredient, qty, unit))
            .collect(),
    }
}

fn builtin_recipes() -> Vec<Recipe> {
    vec![
        recipe(
            "Apple Pie",
            &[
                ("apples", 6.0, "count"),
                ("all-purpose flour", 2.0, "cups"),
                ("granulated sugar", 1.0, "cups"),
                ("butter", 1.0, "sticks"),
                ("salt", 0.25, "tsp"),
                ("ground cinnamon", 1.0, "tsp"),
                ("lemon juice", 1.0, "tbsp"),
                ("eggs", 1.0, "count"),
            ],
        ),
        recipe(
            DEFAULT_RECIPE_NAME,
            &[
                ("all-purpose flour", 2.25, "cups"),
                ("granulated sugar", 0.75, "cups"),
                ("brown sugar", 0.75, "cups"),
                ("butter", 1.0, "sticks"),
                ("eggs", 2.0, "count"),
                ("vanilla extract", 1.0, "tsp"),
                ("baking soda", 1.0, "tsp"),
                ("salt", 0.5, "tsp"),
                ("chocolate chips", 2.0, "cups"),
            ],
        ),
        recipe(
            "Brownies",
            &[
                ("all-purpose flour", 0.75, "cups"),
                ("granulated sugar", 1.5, "cups"),
                ("butter", 0.5, "sticks"),
                ("cocoa powder", 0.75, "cups"),
                ("eggs", 2.0, "count"),
                ("vanilla extract", 1.0, "tsp"),
                ("salt", 0.25, "tsp"),
                ("baking powder", 0.5, "tsp"),
            ],
        ),
    ]
}
