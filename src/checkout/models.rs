use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::product::models::Product;
use crate::utils::AppError;

#[derive(Deserialize, Validate)]
pub struct CheckoutRequest {
    /// Absent for guest checkout.
    pub customer_id: Option<Uuid>,
    #[validate(length(min = 1, message = "cart is empty"))]
    pub items: Vec<CheckoutItem>,
}

#[derive(Serialize, Deserialize, Clone, Copy)]
pub struct CheckoutItem {
    pub product_id: i32,
    pub quantity: i32,
}

#[derive(Serialize)]
pub struct CheckoutResponse {
    pub url: Option<String>,
    pub session_id: String,
    pub order_id: i32,
}

/// A cart line priced from the catalog row, never from the client.
pub struct PricedLine {
    pub product_id: i32,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub unit_price: f64,
    pub unit_weight: f64,
    pub quantity: i32,
}

impl PricedLine {
    pub fn line_total(&self) -> f64 {
        self.unit_price * self.quantity as f64
    }

    pub fn line_weight(&self) -> f64 {
        self.unit_weight * self.quantity as f64
    }
}

pub struct PricedCart {
    pub lines: Vec<PricedLine>,
    pub subtotal: f64,
    pub total_weight: f64,
}

/// Resolves requested items against catalog rows. Duplicate product ids
/// are merged, unknown or unavailable products and non-positive
/// quantities are rejected.
pub fn price_cart(products: &[Product], items: &[CheckoutItem]) -> Result<PricedCart, AppError> {
    let by_id: BTreeMap<i32, &Product> = products.iter().map(|p| (p.id, p)).collect();

    let mut quantities: BTreeMap<i32, i32> = BTreeMap::new();
    for item in items {
        if item.quantity < 1 {
            return Err(AppError::Validation(format!(
                "invalid quantity for product {}",
                item.product_id
            )));
        }
        let merged = quantities.entry(item.product_id).or_insert(0);
        *merged = merged.checked_add(item.quantity).ok_or_else(|| {
            AppError::Validation(format!(
                "quantity too large for product {}",
                item.product_id
            ))
        })?;
    }

    let mut lines = Vec::with_capacity(quantities.len());
    for (product_id, quantity) in quantities {
        let product = by_id
            .get(&product_id)
            .ok_or_else(|| AppError::Validation(format!("unknown product {product_id}")))?;
        if !product.is_available {
            return Err(AppError::Validation(format!(
                "'{}' is no longer available",
                product.name
            )));
        }

        lines.push(PricedLine {
            product_id,
            name: product.name.clone(),
            description: product.description.clone(),
            image_url: product.image_url.clone(),
            unit_price: product.price,
            unit_weight: product.weight,
            quantity,
        });
    }

    let subtotal = lines.iter().map(PricedLine::line_total).sum();
    let total_weight = lines.iter().map(PricedLine::line_weight).sum();

    Ok(PricedCart {
        lines,
        subtotal,
        total_weight,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn product(id: i32, price: f64, weight: f64, available: bool) -> Product {
        Product {
            id,
            name: format!("Snack {id}"),
            description: String::new(),
            price,
            weight,
            image_url: None,
            stock_quantity: 10,
            is_available: available,
            brand: None,
            category_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn item(product_id: i32, quantity: i32) -> CheckoutItem {
        CheckoutItem {
            product_id,
            quantity,
        }
    }

    #[test]
    fn prices_come_from_the_catalog() {
        let products = vec![product(1, 4.50, 0.5, true), product(2, 2.00, 0.25, true)];
        let cart = price_cart(&products, &[item(1, 2), item(2, 1)]).unwrap();

        assert_eq!(cart.lines.len(), 2);
        assert_eq!(cart.subtotal, 11.0);
        assert_eq!(cart.total_weight, 1.25);
    }

    #[test]
    fn duplicate_lines_are_merged() {
        let products = vec![product(1, 3.0, 0.1, true)];
        let cart = price_cart(&products, &[item(1, 1), item(1, 2)]).unwrap();

        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.lines[0].quantity, 3);
        assert_eq!(cart.subtotal, 9.0);
    }

    #[test]
    fn unknown_product_is_rejected() {
        let products = vec![product(1, 3.0, 0.1, true)];
        assert!(matches!(
            price_cart(&products, &[item(99, 1)]),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn unavailable_product_is_rejected() {
        let products = vec![product(1, 3.0, 0.1, false)];
        assert!(matches!(
            price_cart(&products, &[item(1, 1)]),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn non_positive_quantity_is_rejected() {
        let products = vec![product(1, 3.0, 0.1, true)];
        assert!(matches!(
            price_cart(&products, &[item(1, 0)]),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn merged_quantity_overflow_is_rejected() {
        let products = vec![product(1, 3.0, 0.1, true)];
        assert!(matches!(
            price_cart(&products, &[item(1, i32::MAX), item(1, 1)]),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn empty_checkout_fails_validation() {
        use validator::Validate;

        let request = CheckoutRequest {
            customer_id: None,
            items: vec![],
        };
        assert!(request.validate().is_err());

        let request = CheckoutRequest {
            customer_id: None,
            items: vec![item(1, 1)],
        };
        assert!(request.validate().is_ok());
    }
}
