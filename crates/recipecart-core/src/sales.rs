//! # Sale Item Analysis
//!
//! Pure half of the sale finder: filter search results down to products
//! that are actually discounted, then rank them by savings.
//!
//! ```text
//! products (all search terms) ──► promo < regular? ──► dedupe by id
//!                                                          │
//!                                                          ▼
//!                                 sort by savings desc ──► truncate(limit)
//! ```

use serde::Serialize;
use std::collections::HashSet;

use crate::money::Money;
use crate::types::Product;
use crate::{DEFAULT_SALE_LIMIT, MAX_SEARCH_LIMIT};

/// A discounted product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub product_id: String,
    pub description: String,
    pub regular_price: Money,
    pub sale_price: Money,
    pub savings: Money,
    /// Discount in basis points (2500 = 25%).
    pub discount_bps: u32,
    pub aisle: Option<String>,
}

impl SaleItem {
    /// None unless the promo price is strictly below a positive regular price.
    pub fn from_product(product: &Product) -> Option<Self> {
        let sale_price = product.promo_price?;
        if !product.regular_price.is_positive() || sale_price >= product.regular_price {
            return None;
        }

        Some(SaleItem {
            product_id: product.id.clone(),
            description: product.description.clone(),
            regular_price: product.regular_price,
            sale_price,
            savings: product.regular_price - sale_price,
            discount_bps: Money::discount_bps(product.regular_price, sale_price),
            aisle: product.aisle.clone(),
        })
    }

    /// Discount as a percentage with one decimal, e.g. `"25.1"`.
    pub fn discount_percent(&self) -> String {
        format!("{}.{}", self.discount_bps / 100, (self.discount_bps % 100) / 10)
    }
}

/// Discounted products, highest savings first, at most `limit`.
///
/// Products seen more than once (same id from different search terms) are
/// kept only the first time. Equal savings keep their input order.
///
/// ```rust
/// use recipecart_core::money::Money;
/// use recipecart_core::sales::find_sale_items;
/// use recipecart_core::types::Product;
///
/// let milk = Product {
///     id: "milk".to_string(),
///     description: "2% Milk".to_string(),
///     regular_price: Money::from_cents(389),
///     promo_price: Some(Money::from_cents(289)),
///     aisle: Some("Aisle 1".to_string()),
/// };
/// let items = find_sale_items(vec![milk.clone(), milk], 20);
/// assert_eq!(items.len(), 1);
/// assert_eq!(items[0].savings.cents(), 100);
/// ```
pub fn find_sale_items<I>(products: I, limit: usize) -> Vec<SaleItem>
where
    I: IntoIterator<Item = Product>,
{
    let mut seen = HashSet::new();
    let mut items: Vec<SaleItem> = products
        .into_iter()
        .filter_map(|product| SaleItem::from_product(&product))
        .filter(|item| seen.insert(item.product_id.clone()))
        .collect();

    // stable
    items.sort_by(|a, b| b.savings.cmp(&a.savings));
    items.truncate(limit);
    items
}

/// Parses a textual result limit, clamped to 1..=50, default 20.
///
/// ```rust
/// use recipecart_core::sales::parse_sale_limit;
///
/// assert_eq!(parse_sale_limit(None), 20);
/// assert_eq!(parse_sale_limit(Some("5")), 5);
/// assert_eq!(parse_sale_limit(Some("500")), 50);
/// assert_eq!(parse_sale_limit(Some("lots")), 20);
/// ```
pub fn parse_sale_limit(raw: Option<&str>) -> usize {
    match raw.map(|s| s.trim().parse::<i64>()) {
        Some(Ok(n)) => n.clamp(1, MAX_SEARCH_LIMIT as i64) as usize,
        _ => DEFAULT_SALE_LIMIT,
    }
}
