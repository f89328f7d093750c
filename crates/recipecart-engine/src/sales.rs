//! Sale finder: searches a few promotional terms at the resolved store and
//! ranks whatever is actually discounted.

use serde::Serialize;
use tracing::{debug, info, warn};

use recipecart_core::sales::{find_sale_items, SaleItem};
use recipecart_core::{DEFAULT_SALE_TERMS, MAX_SALE_SEARCHES, MAX_SEARCH_LIMIT};

use crate::location::ResolvedLocation;
use crate::services::CatalogSearchAdapter;

/// Discounted products at one store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleReport {
    pub location: ResolvedLocation,
    pub items: Vec<SaleItem>,
    /// Search terms that failed and were skipped.
    pub failed_terms: Vec<String>,
}

/// Terms searched for a category, or the default promotional terms.
pub fn sale_terms(category: Option<&str>) -> Vec<String> {
    match category.map(str::trim).filter(|c| !c.is_empty()) {
        Some(category) => vec![category.to_string()],
        None => DEFAULT_SALE_TERMS
            .iter()
            .take(MAX_SALE_SEARCHES)
            .map(|t| t.to_string())
            .collect(),
    }
}

/// Searches sequentially; one failing term does not stop the others.
pub async fn find_items_on_sale(
    catalog: &dyn CatalogSearchAdapter,
    location: ResolvedLocation,
    category: Option<&str>,
    limit: usize,
) -> SaleReport {
    let mut products = Vec::new();
    let mut failed_terms = Vec::new();

    for term in sale_terms(category) {
        match catalog.search(&term, &location.location_id, MAX_SEARCH_LIMIT).await {
            Ok(found) => {
                debug!(term = %term, found = found.len(), "Sale search");
                products.extend(found);
            }
            Err(e) => {
                warn!(term = %term, error = %e, "Sale search failed, skipping term");
                failed_terms.push(term);
            }
        }
    }

    let items = find_sale_items(products, limit.clamp(1, MAX_SEARCH_LIMIT));
    info!(
        location_id = %location.location_id,
        items = items.len(),
        "Sale items found"
    );

    SaleReport {
        location,
        items,
        failed_terms,
    }
}
