//! Product model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use storefront_core::types::{DbId, Timestamp};

use super::category::CategoryPathNode;
use super::product_characteristic::ProductCharacteristicView;

/// A row from the `products` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
    pub id: DbId,
    pub name: String,
    pub price: f64,
    pub category_id: DbId,
    pub is_new: bool,
    pub image_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A product enriched with its category path and characteristic list.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    /// Root-first path of the product's category.
    pub category_path: Vec<CategoryPathNode>,
    pub characteristics: Vec<ProductCharacteristicView>,
}

/// A page of products plus the unpaged total, for admin listings.
#[derive(Debug, Clone, Serialize)]
pub struct ProductPage {
    pub items: Vec<Product>,
    pub total: i64,
}

/// DTO for creating a new product.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProduct {
    pub name: String,
    pub price: f64,
    pub category_id: DbId,
    pub is_new: Option<bool>,
    pub image_url: Option<String>,
}

/// DTO for partially updating a product.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub category_id: Option<DbId>,
    pub is_new: Option<bool>,
    pub image_url: Option<String>,
}
