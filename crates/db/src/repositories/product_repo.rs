//! Repository for the `products` table and the lifecycle flows that keep a
//! product and its characteristic set consistent.

use sqlx::PgPool;
use storefront_core::types::DbId;

use crate::error::DbError;
use crate::models::product::{CreateProduct, Product, ProductDetail, ProductPage, UpdateProduct};
use crate::models::product_characteristic::{CharacteristicDiff, NewCharacteristic};
use crate::repositories::category_repo::CategoryRepo;
use crate::repositories::product_characteristic_repo::ProductCharacteristicRepo;

/// Column list for products queries.
const COLUMNS: &str = "id, name, price, category_id, is_new, image_url, created_at, updated_at";

/// Entity label used in `NotFound` errors.
const ENTITY: &str = "product";

/// Provides product CRUD plus the transactional create/update flows that
/// delegate characteristic changes to reconciliation.
pub struct ProductRepo;

impl ProductRepo {
    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Find a product by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Product>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE id = $1");
        let product = sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(product)
    }

    /// Find a product by ID through the caller's transaction.
    pub async fn find_by_id_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<Option<Product>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE id = $1");
        let product = sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;
        Ok(product)
    }

    /// List one page of products, newest first, plus the unpaged total.
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<ProductPage, DbError> {
        let query = format!("SELECT {COLUMNS} FROM products ORDER BY id DESC LIMIT $1 OFFSET $2");
        let items = sqlx::query_as::<_, Product>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(pool)
            .await?;
        Ok(ProductPage { items, total })
    }

    /// List products flagged as new, newest first, up to `limit`.
    pub async fn list_new(pool: &PgPool, limit: i64) -> Result<Vec<Product>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE is_new ORDER BY id DESC LIMIT $1");
        let products = sqlx::query_as::<_, Product>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await?;
        Ok(products)
    }

    /// Fetch a product with its category path and characteristic list.
    pub async fn get_with_detail(pool: &PgPool, id: DbId) -> Result<ProductDetail, DbError> {
        let product = Self::find_by_id(pool, id)
            .await?
            .ok_or_else(|| DbError::not_found(ENTITY, id))?;
        let category_path = CategoryRepo::find_path(pool, product.category_id).await?;
        let characteristics = ProductCharacteristicRepo::list_for_product(pool, id).await?;
        Ok(ProductDetail {
            product,
            category_path,
            characteristics,
        })
    }

    // -----------------------------------------------------------------------
    // Lifecycle mutations
    // -----------------------------------------------------------------------

    /// Create a product and its initial characteristics.
    ///
    /// The category is resolved first (`NotFound` if absent); each
    /// characteristic goes through the catalog-name resolution path. Any
    /// failure aborts the whole creation.
    pub async fn create_with_characteristics_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        input: &CreateProduct,
        characteristics: &[NewCharacteristic],
    ) -> Result<Product, DbError> {
        CategoryRepo::find_by_id_tx(tx, input.category_id)
            .await?
            .ok_or_else(|| DbError::not_found("category", input.category_id))?;

        let query = format!(
            "INSERT INTO products (name, price, category_id, is_new, image_url) \
             VALUES ($1, $2, $3, COALESCE($4, false), $5) \
             RETURNING {COLUMNS}"
        );
        let product = sqlx::query_as::<_, Product>(&query)
            .bind(&input.name)
            .bind(input.price)
            .bind(input.category_id)
            .bind(input.is_new)
            .bind(&input.image_url)
            .fetch_one(&mut **tx)
            .await?;

        for item in characteristics {
            ProductCharacteristicRepo::add_tx(tx, product.id, item).await?;
        }

        tracing::debug!(
            product_id = product.id,
            characteristics = characteristics.len(),
            "Created product"
        );
        Ok(product)
    }

    /// Create a product with characteristics in a standalone transaction.
    pub async fn create_with_characteristics(
        pool: &PgPool,
        input: &CreateProduct,
        characteristics: &[NewCharacteristic],
    ) -> Result<Product, DbError> {
        let mut tx = pool.begin().await?;
        let product = Self::create_with_characteristics_tx(&mut tx, input, characteristics).await?;
        tx.commit().await?;
        Ok(product)
    }

    /// Update a product and optionally reconcile its characteristics in the
    /// same transaction.
    ///
    /// Fails `NotFound` if the product does not exist; only supplied fields
    /// change. A supplied `category_id` is resolved first.
    pub async fn update_with_characteristics_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
        input: &UpdateProduct,
        diff: Option<&CharacteristicDiff>,
    ) -> Result<Product, DbError> {
        Self::find_by_id_tx(tx, id)
            .await?
            .ok_or_else(|| DbError::not_found(ENTITY, id))?;

        if let Some(category_id) = input.category_id {
            CategoryRepo::find_by_id_tx(tx, category_id)
                .await?
                .ok_or_else(|| DbError::not_found("category", category_id))?;
        }

        let query = format!(
            "UPDATE products SET \
                name = COALESCE($2, name), \
                price = COALESCE($3, price), \
                category_id = COALESCE($4, category_id), \
                is_new = COALESCE($5, is_new), \
                image_url = COALESCE($6, image_url) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let product = sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.price)
            .bind(input.category_id)
            .bind(input.is_new)
            .bind(&input.image_url)
            .fetch_one(&mut **tx)
            .await?;

        if let Some(diff) = diff {
            if !diff.is_empty() {
                ProductCharacteristicRepo::reconcile_tx(tx, id, diff).await?;
            }
        }

        Ok(product)
    }

    /// Update a product (and apply a diff) in a standalone transaction.
    pub async fn update_with_characteristics(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProduct,
        diff: Option<&CharacteristicDiff>,
    ) -> Result<Product, DbError> {
        let mut tx = pool.begin().await?;
        let product = Self::update_with_characteristics_tx(&mut tx, id, input, diff).await?;
        tx.commit().await?;
        Ok(product)
    }

    /// Delete a product and its characteristic rows as one atomic step.
    pub async fn delete_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<(), DbError> {
        Self::find_by_id_tx(tx, id)
            .await?
            .ok_or_else(|| DbError::not_found(ENTITY, id))?;

        let removed = sqlx::query("DELETE FROM product_characteristics WHERE product_id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;

        tracing::debug!(product_id = id, characteristics_removed = removed, "Deleted product");
        Ok(())
    }

    /// Delete a product in a standalone transaction.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<(), DbError> {
        let mut tx = pool.begin().await?;
        Self::delete_tx(&mut tx, id).await?;
        tx.commit().await?;
        Ok(())
    }
}
