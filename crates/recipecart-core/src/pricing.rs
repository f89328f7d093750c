//! # Price Selection
//!
//! Picks the effective unit price of a catalog product.
//!
//! ```text
//! promo present AND promo < regular ──► promo
//! otherwise                         ──► regular
//! ```
//!
//! A promo price equal to or above the regular price is ignored, so the
//! effective price is never greater than the regular price.

use crate::money::Money;
use crate::types::Product;

/// Returns the effective price of a product.
///
/// ```rust
/// use recipecart_core::money::Money;
/// use recipecart_core::pricing::select_price;
/// use recipecart_core::types::Product;
///
/// let product = Product {
///     id: "0001111041700".to_string(),
///     description: "Salted Butter Sticks".to_string(),
///     regular_price: Money::from_cents(549),
///     promo_price: Some(Money::from_cents(449)),
///     aisle: None,
/// };
/// assert_eq!(select_price(&product).cents(), 449);
/// ```
pub fn select_price(product: &Product) -> Money {
    match product.promo_price {
        Some(promo) if promo < product.regular_price => promo,
        _ => product.regular_price,
    }
}

/// Amount saved per package when buying at the effective price.
pub fn savings(product: &Product) -> Money {
    product.regular_price - select_price(product)
}
