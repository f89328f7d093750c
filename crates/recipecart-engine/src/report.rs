//! # Shopping Report
//!
//! The serializable view of a `ShoppingOutcome`, shared with UI front ends
//! through generated TypeScript bindings, plus a plain-text rendering for
//! terminals.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use ts_rs::TS;
use uuid::Uuid;

use recipecart_core::{MatchedLine, Money, UnmatchedIngredient};

use crate::location::LocationSource;
use crate::orchestrator::{CartSubmission, ShoppingOutcome};

/// One priced ingredient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReportLine {
    pub ingredient_name: String,
    pub package_count: u32,
    pub product_id: String,
    pub product_description: String,
    pub unit_price: Money,
    pub line_total: Money,
    pub on_sale: bool,
}

impl From<&MatchedLine> for ReportLine {
    fn from(line: &MatchedLine) -> Self {
        ReportLine {
            ingredient_name: line.ingredient_name().to_string(),
            package_count: line.line_item.package_count(),
            product_id: line.product.id.clone(),
            product_description: line.product.description.clone(),
            unit_price: line.effective_price,
            line_total: line.line_total(),
            on_sale: line.product.is_on_sale(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReportMiss {
    pub ingredient_name: String,
    pub reason: String,
}

impl From<&UnmatchedIngredient> for ReportMiss {
    fn from(miss: &UnmatchedIngredient) -> Self {
        ReportMiss {
            ingredient_name: miss.ingredient.name.clone(),
            reason: miss.reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReportCartSubmission {
    pub attempted: bool,
    pub success: bool,
    pub added_count: u32,
    pub detail: String,
}

impl From<&CartSubmission> for ReportCartSubmission {
    fn from(submission: &CartSubmission) -> Self {
        ReportCartSubmission {
            attempted: submission.attempted,
            success: submission.success,
            added_count: u32::try_from(submission.added_count).unwrap_or(u32::MAX),
            detail: submission.detail.clone(),
        }
    }
}

/// Result of one orchestration run, ready for JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingReport {
    #[ts(as = "String")]
    pub run_id: Uuid,
    pub recipe: String,
    pub used_default_recipe: bool,
    pub location_id: String,
    pub location_source: LocationSource,
    pub matched: Vec<ReportLine>,
    pub unmatched: Vec<ReportMiss>,
    pub total_cost: Money,
    pub cart_submission: ReportCartSubmission,
    #[ts(as = "String")]
    pub generated_at: DateTime<Utc>,
}

impl ShoppingReport {
    /// Builds a report stamped with the current time.
    pub fn from_outcome(outcome: &ShoppingOutcome) -> Self {
        Self::at(outcome, Utc::now())
    }

    fn at(outcome: &ShoppingOutcome, generated_at: DateTime<Utc>) -> Self {
        let result = &outcome.result;
        ShoppingReport {
            run_id: outcome.run_id,
            recipe: result.recipe_name.clone(),
            used_default_recipe: outcome.used_default_recipe,
            location_id: outcome.location.location_id.clone(),
            location_source: outcome.location.source,
            matched: result.matched.iter().map(ReportLine::from).collect(),
            unmatched: result.unmatched.iter().map(ReportMiss::from).collect(),
            total_cost: result.total_cost,
            cart_submission: ReportCartSubmission::from(&outcome.submission),
            generated_at,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Terminal rendering: one line per matched ingredient, the total, and
    /// what could not be found.
    pub fn render_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ShoppingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Recipe: {}", self.recipe)?;
        if self.used_default_recipe {
            writeln!(f, "  (no recipe matched the query, showing the default)")?;
        }
        writeln!(f, "Store:  {} ({})", self.location_id, self.location_source)?;
        writeln!(f)?;

        if self.matched.is_empty() {
            writeln!(f, "No ingredients found at this store.")?;
        }
        for line in &self.matched {
            let sale = if line.on_sale { " [sale]" } else { "" };
            writeln!(
                f,
                "  {:<24} {} × {} = {}{}",
                line.ingredient_name, line.package_count, line.unit_price, line.line_total, sale
            )?;
            writeln!(f, "  {:<24} {}", "", line.product_description)?;
        }

        writeln!(f)?;
        writeln!(f, "Estimated total: {}", self.total_cost)?;

        if !self.unmatched.is_empty() {
            let names: Vec<&str> = self
                .unmatched
                .iter()
                .map(|m| m.ingredient_name.as_str())
                .collect();
            writeln!(f, "Not found: {}", names.join(", "))?;
        }

        let cart = &self.cart_submission;
        let status = match (cart.attempted, cart.success) {
            (true, true) => "submitted",
            (true, false) => "failed",
            (false, true) => "skipped",
            (false, false) => "not submitted",
        };
        writeln!(f, "Cart: {} ({})", status, cart.detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::ResolvedLocation;
    use recipecart_core::{
        CartRequest, Ingredient, MatchResult, NormalizedLineItem, Product, ShoppingResult,
        UnmatchedReason,
    };

    fn outcome() -> ShoppingOutcome {
        let butter = Product {
            id: "butter-1".into(),
            description: "Sweet Cream Butter".into(),
            regular_price: Money::from_cents(549),
            promo_price: Some(Money::from_cents(449)),
            aisle: None,
        };
        let results = vec![
            MatchResult::Matched(MatchedLine::new(
                NormalizedLineItem::new(Ingredient::new("butter", 8.0, "sticks"), 2),
                butter,
            )),
            MatchResult::unmatched(
                Ingredient::new("lemon juice", 1.0, "tbsp"),
                UnmatchedReason::NotCarried,
            ),
        ];

        ShoppingOutcome {
            run_id: Uuid::nil(),
            used_default_recipe: false,
            location: ResolvedLocation {
                location_id: "01400441".into(),
                source: LocationSource::PostalCode,
            },
            result: ShoppingResult::from_results("Apple Pie", "01400441", results),
            cart_request: CartRequest::default(),
            submission: CartSubmission {
                attempted: true,
                success: true,
                added_count: 1,
                detail: "added 1 item(s) to cart".into(),
            },
        }
    }

    #[test]
    fn test_report_fields() {
        let report = ShoppingReport::from_outcome(&outcome());

        assert_eq!(report.matched.len(), 1);
        let line = &report.matched[0];
        assert_eq!(line.package_count, 2);
        assert_eq!(line.unit_price, Money::from_cents(449));
        assert_eq!(line.line_total, Money::from_cents(898));
        assert!(line.on_sale);

        assert_eq!(report.unmatched[0].reason, "not carried at this location");
        let summed: Money = report.matched.iter().map(|l| l.line_total).sum();
        assert_eq!(report.total_cost, summed);
    }

    #[test]
    fn test_json_is_camel_case() {
        let report = ShoppingReport::from_outcome(&outcome());
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        assert_eq!(json["locationSource"], "postal_code");
        assert_eq!(json["totalCost"], 898);
        assert_eq!(json["matched"][0]["ingredientName"], "butter");
        assert_eq!(json["cartSubmission"]["addedCount"], 1);
        assert!(json["generatedAt"].is_string());
    }

    #[test]
    fn test_render_text() {
        let text = ShoppingReport::from_outcome(&outcome()).render_text();

        assert!(text.contains("Recipe: Apple Pie"));
        assert!(text.contains("2 × $4.49 = $8.98 [sale]"));
        assert!(text.contains("Estimated total: $8.98"));
        assert!(text.contains("Not found: lemon juice"));
        assert!(text.contains("Cart: submitted"));
    }
}
