//! In-memory cart storage.
//!
//! Carts are session-scoped and ephemeral: the id travels in a browser
//! cookie and the contents live only as long as the process. All access
//! goes through [`CartStore`], which guards the map with a mutex so two
//! concurrent requests for the same cart id cannot corrupt line items.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use uuid::Uuid;

use crate::catalog;
use crate::error::{AppError, Result};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Line item id.
    pub id: String,
    pub product_id: String,
    /// The identifier the client added with (product id or slug).
    pub variant_id: String,
    pub name: String,
    /// Unit price in cents. Discounted price when the product is on sale.
    pub price: i64,
    pub quantity: u32,
    pub image: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: String,
    pub items: Vec<CartItem>,
    pub currency: String,
    /// Sum of price * quantity over items, in cents.
    pub subtotal: i64,
    /// Equals subtotal; shipping is added at payment time, not in the cart.
    pub total: i64,
}

impl Cart {
    fn new(id: String) -> Self {
        Self {
            id,
            items: Vec::new(),
            currency: "CAD".to_string(),
            subtotal: 0,
            total: 0,
        }
    }

    fn recompute(&mut self) {
        let subtotal: i64 = self
            .items
            .iter()
            .map(|it| it.price * it.quantity as i64)
            .sum();
        self.subtotal = subtotal;
        self.total = subtotal;
    }
}

fn new_cart_id() -> String {
    format!("cart_{}", Uuid::new_v4().simple())
}

fn new_line_id() -> String {
    format!("li_{}", Uuid::new_v4().simple())
}

/// Keyed cart store. Cloning shares the underlying map.
#[derive(Clone, Default)]
pub struct CartStore {
    carts: Arc<Mutex<HashMap<String, Cart>>>,
}

impl CartStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Cart>> {
        // A poisoned mutex means a panic mid-mutation; carts are ephemeral,
        // so continuing with the recovered map is fine.
        self.carts.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Snapshot of a cart, if it exists.
    pub fn get(&self, cart_id: &str) -> Option<Cart> {
        self.lock().get(cart_id).cloned()
    }

    /// Add `quantity` of a product (by id or slug) to the cart, creating the
    /// cart when no id is supplied or the id is unknown. Existing lines for
    /// the same product merge quantities.
    pub fn add(&self, cart_id: Option<&str>, variant_id: &str, quantity: u32) -> Result<Cart> {
        let product = catalog::find(variant_id)
            .ok_or_else(|| AppError::NotFound("Product not found".into()))?;
        let quantity = quantity.max(1);

        let mut carts = self.lock();
        let id = cart_id
            .map(str::to_string)
            .unwrap_or_else(new_cart_id);
        let cart = carts
            .entry(id.clone())
            .or_insert_with(|| Cart::new(id.clone()));

        if let Some(existing) = cart.items.iter_mut().find(|i| i.product_id == product.id) {
            existing.quantity += quantity;
        } else {
            cart.items.push(CartItem {
                id: new_line_id(),
                product_id: product.id.to_string(),
                variant_id: variant_id.to_string(),
                name: product.name.to_string(),
                price: product.effective_price(),
                quantity,
                image: product.image.to_string(),
            });
        }

        cart.recompute();
        Ok(cart.clone())
    }

    /// Set the quantity of an existing line. A quantity of zero (or less)
    /// removes the line.
    pub fn update(&self, cart_id: &str, variant_id: &str, quantity: i64) -> Result<Cart> {
        let product_id = catalog::find(variant_id).map(|p| p.id).unwrap_or(variant_id);

        let mut carts = self.lock();
        let cart = carts
            .get_mut(cart_id)
            .ok_or_else(|| AppError::NotFound("Cart not found".into()))?;

        let pos = cart
            .items
            .iter()
            .position(|i| i.product_id == product_id)
            .ok_or_else(|| AppError::NotFound("Item not found".into()))?;

        if quantity <= 0 {
            cart.items.remove(pos);
        } else {
            cart.items[pos].quantity = quantity as u32;
        }

        cart.recompute();
        Ok(cart.clone())
    }

    /// Remove a line by product id or slug.
    pub fn remove(&self, cart_id: &str, variant_id: &str) -> Result<Cart> {
        let product_id = catalog::find(variant_id).map(|p| p.id).unwrap_or(variant_id);

        let mut carts = self.lock();
        let cart = carts
            .get_mut(cart_id)
            .ok_or_else(|| AppError::NotFound("Cart not found".into()))?;

        cart.items.retain(|i| i.product_id != product_id);
        cart.recompute();
        Ok(cart.clone())
    }

    /// Empty the cart (after successful payment).
    pub fn clear(&self, cart_id: &str) -> Result<Cart> {
        let mut carts = self.lock();
        let cart = carts
            .get_mut(cart_id)
            .ok_or_else(|| AppError::NotFound("Cart not found".into()))?;

        cart.items.clear();
        cart.recompute();
        Ok(cart.clone())
    }
}
