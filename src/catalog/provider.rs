//! Catalog Provider
//!
//! Builds the fixed product catalog once at startup and hands out read-only
//! views of it. The catalog is cheap to clone: every clone shares the same
//! product slice.

use super::models::{Category, Product};
use serde::Serialize;
use std::{collections::HashSet, sync::Arc};

/// Reasons a catalog can be rejected at construction time
#[derive(Debug, thiserror::Error, PartialEq)]
#[non_exhaustive]
pub enum CatalogError {
    /// Two products share the same identifier.
    #[error("duplicate product id {0}")]
    DuplicateId(u32),

    /// A product price is negative, NaN or infinite.
    #[error("product {id} has invalid price {price}")]
    InvalidPrice { id: u32, price: f64 },
}

/// The immutable, ordered product list served by the API
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    products: Arc<[Product]>,
}

impl Catalog {
    /// Validates `products` and freezes them into a catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when ids collide or a price is not a finite,
    /// non-negative number.
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(products.len());
        for product in &products {
            if !seen.insert(product.id) {
                return Err(CatalogError::DuplicateId(product.id));
            }
            if !product.price.is_finite() || product.price < 0.0 {
                return Err(CatalogError::InvalidPrice {
                    id: product.id,
                    price: product.price,
                });
            }
        }

        Ok(Self {
            products: products.into(),
        })
    }

    /// The InventoryHub demo catalog: three categories, twelve products.
    ///
    /// # Errors
    ///
    /// Propagates [`CatalogError`] from [`Catalog::new`].
    pub fn seeded() -> Result<Self, CatalogError> {
        let electronics = Arc::new(Category::new(101, "Electronics"));
        let accessories = Arc::new(Category::new(102, "Accessories"));
        let office_supplies = Arc::new(Category::new(103, "Office Supplies"));

        Self::new(vec![
            Product::new(1, "Laptop", 1200.50, 25, &electronics),
            Product::new(2, "Headphones", 50.00, 100, &accessories),
            Product::new(3, "Smartphone", 799.99, 40, &electronics),
            Product::new(4, "Wireless Mouse", 25.50, 150, &accessories),
            Product::new(5, "Mechanical Keyboard", 89.99, 60, &accessories),
            Product::new(6, "Monitor", 199.99, 30, &electronics),
            Product::new(7, "USB-C Cable", 9.99, 300, &accessories),
            Product::new(8, "Webcam", 49.99, 80, &electronics),
            Product::new(9, "Bluetooth Speaker", 59.99, 70, &electronics),
            Product::new(10, "External Hard Drive", 120.00, 45, &electronics),
            Product::new(11, "Desk Lamp", 35.00, 90, &office_supplies),
            Product::new(12, "Notebook", 3.50, 500, &office_supplies),
        ])
    }

    /// Returns every product, in catalog order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
