//! # Inventory Adapter
//!
//! Checkout emits one [`StockMove`] per non-service account line. Whoever
//! owns the catalog applies it; the core never checks that enough stock
//! exists, so stock can go negative when a product is oversold.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::Product;

/// A stock decrement emitted by checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockMove {
    pub product_id: String,
    pub quantity: i64,
}

/// Read prices and write stock on the product catalog.
pub trait Inventory {
    fn product(&self, product_id: &str) -> Option<&Product>;

    /// Lowers stock by `quantity`. Unknown products, services and products
    /// without inventory management are left alone.
    fn decrement_stock(&mut self, product_id: &str, quantity: i64);
}

/// In-memory catalog that remembers which products changed.
#[derive(Debug, Clone, Default)]
pub struct StockBook {
    products: BTreeMap<String, Product>,
    touched: BTreeSet<String>,
}

impl StockBook {
    pub fn new() -> Self {
        StockBook::default()
    }

    pub fn from_products(products: impl IntoIterator<Item = Product>) -> Self {
        StockBook {
            products: products.into_iter().map(|p| (p.id.clone(), p)).collect(),
            touched: BTreeSet::new(),
        }
    }

    pub fn insert(&mut self, product: Product) {
        self.products.insert(product.id.clone(), product);
    }

    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    /// Finds a product by exact barcode.
    pub fn by_barcode(&self, barcode: &str) -> Option<&Product> {
        self.products
            .values()
            .find(|p| p.barcode.as_deref() == Some(barcode))
    }

    /// Drains the products whose stock changed since the last call.
    pub fn take_touched(&mut self) -> Vec<Product> {
        let touched = std::mem::take(&mut self.touched);
        touched
            .into_iter()
            .filter_map(|id| self.products.get(&id).cloned())
            .collect()
    }
}

impl Inventory for StockBook {
    fn product(&self, product_id: &str) -> Option<&Product> {
        self.products.get(product_id)
    }

    fn decrement_stock(&mut self, product_id: &str, quantity: i64) {
        if let Some(product) = self.products.get_mut(product_id) {
            if product.tracks_stock() {
                product.stock -= quantity;
                self.touched.insert(product_id.to_string());
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
