//! Static product catalog.
//!
//! Products are compiled in: the store carries a handful of SKUs and the
//! catalog changes with deploys, not at runtime. Prices are integer cents.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: &'static str,
    pub name: &'static str,
    pub slug: &'static str,
    /// List price in cents.
    pub price: i64,
    /// Sale price in cents, if the product is discounted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discounted_price: Option<i64>,
    pub currency: &'static str,
    pub image: &'static str,
    pub category: &'static str,
    pub description: &'static str,
    pub best_seller: bool,
    pub in_stock: bool,
    pub active: bool,
}

impl Product {
    /// The price a buyer actually pays for one unit, in cents.
    pub fn effective_price(&self) -> i64 {
        self.discounted_price.unwrap_or(self.price)
    }
}

const CATALOG: &[Product] = &[
    Product {
        id: "p_1001",
        name: "Sourdough Starter",
        slug: "sourdough-starter",
        price: 4999,
        discounted_price: Some(1499),
        currency: "CAD",
        image: "/Starter.jpg",
        category: "products",
        description: "Premium sourdough starter for making artisan bread.",
        best_seller: true,
        in_stock: true,
        active: true,
    },
    Product {
        id: "p_1002",
        name: "Basic Sourdough Guide",
        slug: "basic-sourdough-guide",
        price: 1999,
        discounted_price: None,
        currency: "CAD",
        image: "/Starter.jpg",
        category: "products",
        description: "Complete step-by-step guide for sourdough beginners.",
        best_seller: false,
        in_stock: true,
        active: true,
    },
    Product {
        id: "p_1003",
        name: "Advanced Techniques Manual",
        slug: "advanced-techniques-manual",
        price: 2999,
        discounted_price: None,
        currency: "CAD",
        image: "/Starter.jpg",
        category: "products",
        description: "Master advanced sourdough techniques and troubleshooting.",
        best_seller: false,
        in_stock: true,
        active: true,
    },
    Product {
        id: "p_1004",
        name: "Pizza Dough Kit",
        slug: "pizza-dough-kit",
        price: 3999,
        discounted_price: None,
        currency: "CAD",
        image: "/Starter.jpg",
        category: "products",
        description: "Everything you need for perfect sourdough pizza.",
        best_seller: false,
        in_stock: true,
        active: true,
    },
];

/// All active products.
pub fn all() -> impl Iterator<Item = &'static Product> {
    CATALOG.iter().filter(|p| p.active)
}

/// Look a product up by id or slug (cart requests pass either).
pub fn find(id_or_slug: &str) -> Option<&'static Product> {
    all().find(|p| p.id == id_or_slug || p.slug == id_or_slug)
}

/// Products filtered by category, capped at `limit`.
pub fn list(category: Option<&str>, limit: usize) -> Vec<&'static Product> {
    all()
        .filter(|p| category.map_or(true, |c| p.category == c))
        .take(limit)
        .collect()
}

/// Distinct category slugs, in catalog order.
pub fn categories() -> Vec<&'static str> {
    let mut seen = Vec::new();
    for p in all() {
        if !seen.contains(&p.category) {
            seen.push(p.category);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_by_id_and_slug() {
        assert_eq!(find("p_1001").unwrap().slug, "sourdough-starter");
        assert_eq!(find("sourdough-starter").unwrap().id, "p_1001");
        assert!(find("nope").is_none());
    }

    #[test]
    fn discounted_price_wins() {
        let starter = find("p_1001").unwrap();
        assert_eq!(starter.effective_price(), 1499);

        let guide = find("p_1002").unwrap();
        assert_eq!(guide.effective_price(), 1999);
    }

    #[test]
    fn list_respects_limit() {
        assert_eq!(list(None, 2).len(), 2);
        assert_eq!(list(Some("products"), 10).len(), 4);
        assert!(list(Some("nonexistent"), 10).is_empty());
    }
}
