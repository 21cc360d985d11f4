//! Category tree model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use storefront_core::types::{DbId, Timestamp};

/// A row from the `categories` table.
///
/// `level` is maintained by [`CategoryRepo`](crate::repositories::CategoryRepo):
/// 0 for roots, otherwise the parent's level plus one, for every node at all
/// times.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Category {
    pub id: DbId,
    pub name: String,
    pub parent_id: Option<DbId>,
    pub level: i32,
    pub image_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// One step of a root-first category path.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct CategoryPathNode {
    pub id: DbId,
    pub name: String,
    pub image_url: Option<String>,
}

/// A category enriched with its root-first path.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryWithPath {
    #[serde(flatten)]
    pub category: Category,
    pub path: Vec<CategoryPathNode>,
}

/// DTO for creating a new category.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategory {
    pub name: String,
    pub parent_id: Option<DbId>,
    pub image_url: Option<String>,
}

/// DTO for partially updating a category.
///
/// `parent_id` uses `Option<Option<DbId>>`: outer `None` leaves the parent
/// unchanged, `Some(None)` detaches the node to root, `Some(Some(id))`
/// re-parents under `id`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub parent_id: Option<Option<DbId>>,
    pub image_url: Option<String>,
}
