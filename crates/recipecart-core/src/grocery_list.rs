//! # Grocery List Parsing & Aisle Ordering
//!
//! Pure half of the store path planner.
//!
//! ## Input Format
//! ```text
//! # weekly list          ← ignored
//! - Milk                 ← bullet stripped
//! • Bread
//! * Eggs
//! bananas, peanut butter ← a single line like this is split on commas
//! ```

use serde::Serialize;
use std::cmp::Ordering;

use crate::types::Product;

/// Parses a free-form grocery list into item names, in list order.
///
/// ```rust
/// use recipecart_core::grocery_list::parse_grocery_list;
///
/// let items = parse_grocery_list("# list\n- Milk\n• Bread\n\n* Eggs\n");
/// assert_eq!(items, vec!["Milk", "Bread", "Eggs"]);
///
/// assert_eq!(parse_grocery_list("milk, bread ,eggs"), vec!["milk", "bread", "eggs"]);
/// ```
pub fn parse_grocery_list(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect();

    if let [only] = lines.as_slice() {
        if only.contains(',') {
            return only
                .split(',')
                .filter_map(clean_item)
                .collect();
        }
    }

    lines.into_iter().filter_map(clean_item).collect()
}

fn clean_item(raw: &str) -> Option<String> {
    let item = raw
        .trim()
        .trim_start_matches(|c: char| matches!(c, '-' | '•' | '*') || c.is_whitespace())
        .trim();
    (!item.is_empty()).then(|| item.to_string())
}

/// First number in an aisle label: `"Aisle 12"` → 12.
///
/// ```rust
/// use recipecart_core::grocery_list::aisle_number;
///
/// assert_eq!(aisle_number("Aisle 12"), Some(12));
/// assert_eq!(aisle_number("7"), Some(7));
/// assert_eq!(aisle_number("Produce"), None);
/// ```
pub fn aisle_number(label: &str) -> Option<u32> {
    let digits: String = label
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// One grocery list item located in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathStop {
    pub item: String,
    pub product_id: String,
    pub product_description: String,
    pub aisle: Option<String>,
}

impl PathStop {
    pub fn new(item: impl Into<String>, product: &Product) -> Self {
        PathStop {
            item: item.into(),
            product_id: product.id.clone(),
            product_description: product.description.clone(),
            aisle: product.aisle.clone(),
        }
    }

    fn sort_key(&self) -> Option<u32> {
        self.aisle.as_deref().and_then(aisle_number)
    }
}

/// Orders stops by numeric aisle. Stops without a numeric aisle go last;
/// ties keep list order.
pub fn order_by_aisle(stops: &mut [PathStop]) {
    stops.sort_by(|a, b| match (a.sort_key(), b.sort_key()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(item: &str, aisle: Option<&str>) -> PathStop {
        PathStop {
            item: item.to_string(),
            product_id: format!("id-{}", item),
            product_description: item.to_uppercase(),
            aisle: aisle.map(str::to_string),
        }
    }

    #[test]
    fn test_parse_strips_bullets_and_comments() {
        let text = "- Milk\n  •  Bread\n*Eggs\n# produce\n-\nBananas\n";
        assert_eq!(parse_grocery_list(text), vec!["Milk", "Bread", "Eggs", "Bananas"]);
    }

    #[test]
    fn test_parse_commas_only_on_single_line() {
        // multi-line lists keep commas inside items
        let text = "cheese, shredded\nmilk";
        assert_eq!(parse_grocery_list(text), vec!["cheese, shredded", "milk"]);
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse_grocery_list("").is_empty());
        assert!(parse_grocery_list("# only a comment\n\n").is_empty());
    }

    #[test]
    fn test_order_by_aisle() {
        let mut stops = vec![
            stop("milk", Some("Aisle 22")),
            stop("bananas", Some("Produce")),
            stop("bread", Some("Aisle 4")),
            stop("eggs", None),
            stop("cereal", Some("Aisle 4")),
        ];
        order_by_aisle(&mut stops);

        let order: Vec<&str> = stops.iter().map(|s| s.item.as_str()).collect();
        assert_eq!(order, vec!["bread", "cereal", "milk", "bananas", "eggs"]);
    }
}
