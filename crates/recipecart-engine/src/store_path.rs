//! # Store Path Planner
//!
//! Turns a free-form grocery list into a walking order through the store.
//!
//! ```text
//! "- Milk\n- Bread\n- Eggs"
//!        │ parse_grocery_list (first 10 items)
//!        ▼
//!  search each item (limit 3) ──► first product's aisle
//!        │
//!        ├── found ────► order_by_aisle ──► stops
//!        ├── empty ────────────────────────► not_found
//!        └── error ────────────────────────► failed
//! ```
//!
//! Read-only: nothing is added to a cart.

use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use recipecart_core::grocery_list::{order_by_aisle, parse_grocery_list, PathStop};
use recipecart_core::{STORE_PATH_MAX_ITEMS, STORE_PATH_SEARCH_LIMIT};

use crate::location::ResolvedLocation;
use crate::services::CatalogSearchAdapter;
use crate::workers::join_bounded;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorePath {
    pub location: ResolvedLocation,
    /// Located items in aisle order.
    pub stops: Vec<PathStop>,
    /// Items the store returned nothing for.
    pub not_found: Vec<String>,
    /// Items whose search failed.
    pub failed: Vec<String>,
}

enum ItemLookup {
    Found(PathStop),
    NotFound(String),
    Failed(String),
}

pub async fn plan_store_path(
    catalog: Arc<dyn CatalogSearchAdapter>,
    location: ResolvedLocation,
    grocery_list: &str,
    concurrency: usize,
) -> StorePath {
    let items: Vec<String> = parse_grocery_list(grocery_list)
        .into_iter()
        .take(STORE_PATH_MAX_ITEMS)
        .collect();

    let slots = join_bounded(items.clone(), concurrency, |item| {
        let catalog = catalog.clone();
        let location_id = location.location_id.clone();
        async move {
            match catalog.search(&item, &location_id, STORE_PATH_SEARCH_LIMIT).await {
                Ok(products) => match products.first() {
                    Some(product) => ItemLookup::Found(PathStop::new(item, product)),
                    None => ItemLookup::NotFound(item),
                },
                Err(e) => {
                    warn!(item = %item, error = %e, "Grocery item search failed");
                    ItemLookup::Failed(item)
                }
            }
        }
    })
    .await;

    let mut path = StorePath {
        location,
        stops: Vec::new(),
        not_found: Vec::new(),
        failed: Vec::new(),
    };

    for (slot, item) in slots.into_iter().zip(items) {
        match slot {
            Some(ItemLookup::Found(stop)) => path.stops.push(stop),
            Some(ItemLookup::NotFound(item)) => path.not_found.push(item),
            Some(ItemLookup::Failed(item)) => path.failed.push(item),
            None => path.failed.push(item),
        }
    }

    order_by_aisle(&mut path.stops);
    info!(
        location_id = %path.location.location_id,
        stops = path.stops.len(),
        not_found = path.not_found.len(),
        "Store path planned"
    );
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::LocationSource;
    use crate::memory::{CatalogEntry, InMemoryCatalog};
    use recipecart_core::{Money, Product};

    fn entry(id: &str, description: &str, aisle: Option<&str>) -> CatalogEntry {
        CatalogEntry::new(Product {
            id: id.to_string(),
            description: description.to_string(),
            regular_price: Money::from_cents(250),
            promo_price: None,
            aisle: aisle.map(str::to_string),
        })
    }

    fn store() -> ResolvedLocation {
        ResolvedLocation {
            location_id: "01400441".into(),
            source: LocationSource::Preferred,
        }
    }

    fn catalog() -> Arc<InMemoryCatalog> {
        Arc::new(InMemoryCatalog::new(vec![
            entry("milk", "2% Milk Gallon", Some("Aisle 12")),
            entry("bread", "Whole Wheat Bread", Some("Aisle 3")),
            entry("bananas", "Bananas", Some("Produce")),
            entry("eggs", "Large Eggs 12ct", Some("Aisle 12")),
        ]))
    }

    #[tokio::test]
    async fn test_orders_by_aisle() {
        let text = "# weekly\n- milk\n• bananas\n* bread\n- saffron\n- eggs\n";
        let path = plan_store_path(catalog(), store(), text, 4).await;

        let order: Vec<&str> = path.stops.iter().map(|s| s.item.as_str()).collect();
        assert_eq!(order, vec!["bread", "milk", "eggs", "bananas"]);
        assert_eq!(path.not_found, vec!["saffron"]);
        assert!(path.failed.is_empty());
    }

    #[tokio::test]
    async fn test_comma_list_and_item_cap() {
        let many: Vec<String> = (0..15).map(|i| format!("item{}", i)).collect();
        let catalog = catalog();
        let path = plan_store_path(catalog.clone(), store(), &many.join(", "), 3).await;

        assert_eq!(catalog.search_count(), STORE_PATH_MAX_ITEMS);
        assert_eq!(path.not_found.len(), STORE_PATH_MAX_ITEMS);
        assert_eq!(path.not_found[0], "item0");
    }

    #[tokio::test]
    async fn test_failed_search_listed_separately() {
        let catalog = Arc::new(
            InMemoryCatalog::new(vec![entry("milk", "Milk", Some("Aisle 1"))]).fail_term("bread"),
        );
        let path = plan_store_path(catalog, store(), "milk\nbread", 2).await;

        assert_eq!(path.stops.len(), 1);
        assert_eq!(path.failed, vec!["bread"]);
    }
}
