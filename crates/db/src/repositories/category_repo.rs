//! Repository for the `categories` table: tree maintenance, level
//! consistency, and root-first path resolution.

use std::collections::HashSet;

use sqlx::PgPool;
use storefront_core::error::CoreError;
use storefront_core::types::DbId;

use crate::error::DbError;
use crate::models::category::{
    Category, CategoryPathNode, CategoryWithPath, CreateCategory, UpdateCategory,
};

/// Column list for categories queries.
const COLUMNS: &str = "id, name, parent_id, level, image_url, created_at, updated_at";

/// Entity label used in `NotFound` errors.
const ENTITY: &str = "category";

/// Provides tree operations for categories.
///
/// `level` is derived state (0 for roots, otherwise the parent's level plus
/// one) and is maintained here for every node, including whole subtrees when
/// a node is re-parented.
pub struct CategoryRepo;

impl CategoryRepo {
    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Find a category by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Category>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE id = $1");
        let category = sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(category)
    }

    /// Find a category by ID through the caller's transaction.
    pub async fn find_by_id_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<Option<Category>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE id = $1");
        let category = sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;
        Ok(category)
    }

    /// List all categories, ordered by level then name.
    ///
    /// The ordering renders a tree top-down: roots first, alphabetic within
    /// each level.
    pub async fn list(pool: &PgPool) -> Result<Vec<Category>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM categories ORDER BY level ASC, name ASC");
        let categories = sqlx::query_as::<_, Category>(&query).fetch_all(pool).await?;
        Ok(categories)
    }

    /// List root categories ordered by name, up to `limit`.
    pub async fn list_roots(pool: &PgPool, limit: i64) -> Result<Vec<Category>, DbError> {
        let query = format!(
            "SELECT {COLUMNS} FROM categories \
             WHERE parent_id IS NULL \
             ORDER BY name ASC \
             LIMIT $1"
        );
        let categories = sqlx::query_as::<_, Category>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await?;
        Ok(categories)
    }

    /// Resolve the root-first path for a category.
    ///
    /// Walks parent references iteratively, one point read per ancestor
    /// level. Fails `NotFound` if `id` is unknown or the chain is broken,
    /// and `CycleDetected` if an id repeats instead of looping forever.
    pub async fn find_path(pool: &PgPool, id: DbId) -> Result<Vec<CategoryPathNode>, DbError> {
        let mut path: Vec<CategoryPathNode> = Vec::new();
        let mut visited: HashSet<DbId> = HashSet::new();
        let mut cursor = Some(id);

        while let Some(current) = cursor {
            if !visited.insert(current) {
                return Err(DbError::Core(CoreError::CycleDetected { at: current }));
            }
            let node = Self::find_by_id(pool, current)
                .await?
                .ok_or_else(|| DbError::not_found(ENTITY, current))?;
            path.push(CategoryPathNode {
                id: node.id,
                name: node.name,
                image_url: node.image_url,
            });
            cursor = node.parent_id;
        }

        // collected leaf-to-root
        path.reverse();
        Ok(path)
    }

    /// Fetch a category together with its root-first path.
    pub async fn get_with_path(pool: &PgPool, id: DbId) -> Result<CategoryWithPath, DbError> {
        let category = Self::find_by_id(pool, id)
            .await?
            .ok_or_else(|| DbError::not_found(ENTITY, id))?;
        let path = Self::find_path(pool, id).await?;
        Ok(CategoryWithPath { category, path })
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Create a category, deriving its level from the parent.
    ///
    /// Fails `NotFound` if `parent_id` is given but does not resolve.
    pub async fn create_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        input: &CreateCategory,
    ) -> Result<Category, DbError> {
        let level = match input.parent_id {
            Some(parent_id) => {
                let parent = Self::find_by_id_tx(tx, parent_id)
                    .await?
                    .ok_or_else(|| DbError::not_found(ENTITY, parent_id))?;
                parent.level + 1
            }
            None => 0,
        };

        let query = format!(
            "INSERT INTO categories (name, parent_id, level, image_url) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        let category = sqlx::query_as::<_, Category>(&query)
            .bind(&input.name)
            .bind(input.parent_id)
            .bind(level)
            .bind(&input.image_url)
            .fetch_one(&mut **tx)
            .await?;
        Ok(category)
    }

    /// Create a category in a standalone transaction.
    pub async fn create(pool: &PgPool, input: &CreateCategory) -> Result<Category, DbError> {
        let mut tx = pool.begin().await?;
        let category = Self::create_tx(&mut tx, input).await?;
        tx.commit().await?;
        Ok(category)
    }

    /// Update a category. Only supplied fields change.
    ///
    /// `parent_id` is three-state (see [`UpdateCategory`]). Re-parenting
    /// resolves the new parent, refuses cycles, recomputes the node's level,
    /// and rewrites the levels of its whole subtree in the same transaction.
    pub async fn update_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
        input: &UpdateCategory,
    ) -> Result<Category, DbError> {
        let existing = Self::find_by_id_tx(tx, id)
            .await?
            .ok_or_else(|| DbError::not_found(ENTITY, id))?;

        let (parent_id, level) = match input.parent_id {
            None => (existing.parent_id, existing.level),
            Some(None) => (None, 0),
            Some(Some(new_parent_id)) => {
                let parent = Self::find_by_id_tx(tx, new_parent_id)
                    .await?
                    .ok_or_else(|| DbError::not_found(ENTITY, new_parent_id))?;
                Self::ensure_no_cycle_tx(tx, id, &parent).await?;
                (Some(new_parent_id), parent.level + 1)
            }
        };

        let query = format!(
            "UPDATE categories SET \
                name = COALESCE($2, name), \
                image_url = COALESCE($3, image_url), \
                parent_id = $4, \
                level = $5 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let category = sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.image_url)
            .bind(parent_id)
            .bind(level)
            .fetch_one(&mut **tx)
            .await?;

        if category.level != existing.level {
            Self::recompute_subtree_levels_tx(tx, category.id, category.level).await?;
        }

        Ok(category)
    }

    /// Update a category in a standalone transaction.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCategory,
    ) -> Result<Category, DbError> {
        let mut tx = pool.begin().await?;
        let category = Self::update_tx(&mut tx, id, input).await?;
        tx.commit().await?;
        Ok(category)
    }

    /// Delete a category.
    ///
    /// Fails `NotFound` if unknown, and `Conflict` while child categories or
    /// products still reference it.
    pub async fn delete_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<(), DbError> {
        Self::find_by_id_tx(tx, id)
            .await?
            .ok_or_else(|| DbError::not_found(ENTITY, id))?;

        let child_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE parent_id = $1")
                .bind(id)
                .fetch_one(&mut **tx)
                .await?;
        if child_count > 0 {
            return Err(DbError::conflict(format!(
                "category {id} still has {child_count} child categories"
            )));
        }

        let product_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE category_id = $1")
                .bind(id)
                .fetch_one(&mut **tx)
                .await?;
        if product_count > 0 {
            return Err(DbError::conflict(format!(
                "category {id} is still referenced by {product_count} products"
            )));
        }

        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Delete a category in a standalone transaction.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<(), DbError> {
        let mut tx = pool.begin().await?;
        Self::delete_tx(&mut tx, id).await?;
        tx.commit().await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Refuse a re-parent that would make `moving_id` its own ancestor.
    async fn ensure_no_cycle_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        moving_id: DbId,
        new_parent: &Category,
    ) -> Result<(), DbError> {
        if new_parent.id == moving_id {
            return Err(DbError::Core(CoreError::CycleDetected { at: moving_id }));
        }

        let mut visited: HashSet<DbId> = HashSet::from([new_parent.id]);
        let mut cursor = new_parent.parent_id;
        while let Some(current) = cursor {
            if current == moving_id {
                return Err(DbError::Core(CoreError::CycleDetected { at: moving_id }));
            }
            if !visited.insert(current) {
                // pre-existing corruption, not caused by this call
                return Err(DbError::Core(CoreError::CycleDetected { at: current }));
            }
            let parent_id: Option<Option<DbId>> =
                sqlx::query_scalar("SELECT parent_id FROM categories WHERE id = $1")
                    .bind(current)
                    .fetch_optional(&mut **tx)
                    .await?;
            cursor = parent_id.ok_or_else(|| DbError::not_found(ENTITY, current))?;
        }
        Ok(())
    }

    /// Rewrite the levels of every descendant of `root_id`, breadth-first.
    async fn recompute_subtree_levels_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        root_id: DbId,
        root_level: i32,
    ) -> Result<(), DbError> {
        let mut visited: HashSet<DbId> = HashSet::from([root_id]);
        let mut frontier: Vec<(DbId, i32)> = vec![(root_id, root_level)];

        while let Some((parent_id, parent_level)) = frontier.pop() {
            let child_ids: Vec<DbId> =
                sqlx::query_scalar("UPDATE categories SET level = $2 WHERE parent_id = $1 RETURNING id")
                    .bind(parent_id)
                    .bind(parent_level + 1)
                    .fetch_all(&mut **tx)
                    .await?;

            for child_id in child_ids {
                if !visited.insert(child_id) {
                    return Err(DbError::Core(CoreError::CycleDetected { at: child_id }));
                }
                frontier.push((child_id, parent_level + 1));
            }
        }
        Ok(())
    }
}
