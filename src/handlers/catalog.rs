//! Read-only catalog views.

use axum::extract::Path;
use serde::Deserialize;

use crate::catalog::{self, Product};
use crate::error::{AppError, Result};
use crate::extractors::{Json, Query};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    6
}

/// GET /api/products?category=&limit=
pub async fn list_products(Query(query): Query<ListQuery>) -> Json<Vec<&'static Product>> {
    Json(catalog::list(query.category.as_deref(), query.limit))
}

/// GET /api/products/{slug} - by slug or id.
pub async fn get_product(Path(slug): Path<String>) -> Result<Json<&'static Product>> {
    catalog::find(&slug)
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Product not found".into()))
}

/// GET /api/categories
pub async fn list_categories() -> Json<Vec<&'static str>> {
    Json(catalog::categories())
}
