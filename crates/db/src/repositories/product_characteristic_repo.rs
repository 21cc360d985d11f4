//! Repository for the `product_characteristics` table, including the
//! reconciliation routine that applies a delete/update/add diff atomically.

use sqlx::PgPool;
use storefront_core::error::CoreError;
use storefront_core::types::DbId;
use storefront_core::value::ValueType;

use crate::error::{conflict_on_unique, DbError};
use crate::models::product_characteristic::{
    CharacteristicDiff, NewCharacteristic, ProductCharacteristic, ProductCharacteristicView,
};
use crate::repositories::characteristic_name_repo::CharacteristicNameRepo;

/// Column list for product_characteristics queries.
const COLUMNS: &str =
    "id, product_id, characteristic_name_id, value, value_type, created_at, updated_at";

/// Entity label used in `NotFound` errors.
const ENTITY: &str = "product characteristic";

/// Conflict message for the per-product uniqueness constraint.
const DUPLICATE_BINDING: &str = "product already has a characteristic for this name";

/// Owns the per-product characteristic rows and the reconciliation policy
/// that keeps them consistent with the shared catalog.
pub struct ProductCharacteristicRepo;

impl ProductCharacteristicRepo {
    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// List a product's characteristics with display names, id ascending.
    pub async fn list_for_product(
        pool: &PgPool,
        product_id: DbId,
    ) -> Result<Vec<ProductCharacteristicView>, DbError> {
        let views = sqlx::query_as::<_, ProductCharacteristicView>(
            "SELECT pc.id, cn.name, pc.value, pc.value_type \
             FROM product_characteristics pc \
             JOIN characteristic_names cn ON cn.id = pc.characteristic_name_id \
             WHERE pc.product_id = $1 \
             ORDER BY pc.id ASC",
        )
        .bind(product_id)
        .fetch_all(pool)
        .await?;
        Ok(views)
    }

    /// Same as [`Self::list_for_product`], through the caller's transaction.
    ///
    /// Reconciliation re-reads the set this way so the returned post-state
    /// includes the rows it just wrote.
    pub async fn list_for_product_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        product_id: DbId,
    ) -> Result<Vec<ProductCharacteristicView>, DbError> {
        let views = sqlx::query_as::<_, ProductCharacteristicView>(
            "SELECT pc.id, cn.name, pc.value, pc.value_type \
             FROM product_characteristics pc \
             JOIN characteristic_names cn ON cn.id = pc.characteristic_name_id \
             WHERE pc.product_id = $1 \
             ORDER BY pc.id ASC",
        )
        .bind(product_id)
        .fetch_all(&mut **tx)
        .await?;
        Ok(views)
    }

    // -----------------------------------------------------------------------
    // Row primitives
    // -----------------------------------------------------------------------

    /// Insert one characteristic row.
    ///
    /// A duplicate (product, name) pair fails `Conflict`.
    pub async fn insert_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        product_id: DbId,
        characteristic_name_id: DbId,
        value: &str,
        value_type: ValueType,
    ) -> Result<ProductCharacteristic, DbError> {
        let query = format!(
            "INSERT INTO product_characteristics \
                (product_id, characteristic_name_id, value, value_type) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProductCharacteristic>(&query)
            .bind(product_id)
            .bind(characteristic_name_id)
            .bind(value)
            .bind(value_type.as_str())
            .fetch_one(&mut **tx)
            .await
            .map_err(|e| conflict_on_unique(e, DUPLICATE_BINDING))
    }

    /// Overwrite the value (and the type it classified to) of a row.
    ///
    /// Fails `NotFound` if `id` does not exist.
    pub async fn update_value_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
        value: &str,
        value_type: ValueType,
    ) -> Result<ProductCharacteristic, DbError> {
        let query = format!(
            "UPDATE product_characteristics SET value = $2, value_type = $3 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, ProductCharacteristic>(&query)
            .bind(id)
            .bind(value)
            .bind(value_type.as_str())
            .fetch_optional(&mut **tx)
            .await?;
        row.ok_or_else(|| DbError::not_found(ENTITY, id))
    }

    /// Delete the given ids, scoped to `product_id`.
    ///
    /// The product scope prevents cross-product deletion via a mismatched
    /// id; foreign or unknown ids are silently skipped. Returns the number
    /// of rows removed.
    pub async fn delete_many_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        product_id: DbId,
        ids: &[DbId],
    ) -> Result<u64, DbError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            "DELETE FROM product_characteristics WHERE product_id = $1 AND id = ANY($2)",
        )
        .bind(product_id)
        .bind(ids)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete a single characteristic row, scoped to `product_id`.
    ///
    /// Unlike the bulk path, an unknown or foreign id fails `NotFound`.
    pub async fn delete_one_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        product_id: DbId,
        id: DbId,
    ) -> Result<(), DbError> {
        let result =
            sqlx::query("DELETE FROM product_characteristics WHERE product_id = $1 AND id = $2")
                .bind(product_id)
                .bind(id)
                .execute(&mut **tx)
                .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::not_found(ENTITY, id));
        }
        Ok(())
    }

    /// Delete a single characteristic row in a standalone transaction.
    pub async fn delete_one(pool: &PgPool, product_id: DbId, id: DbId) -> Result<(), DbError> {
        let mut tx = pool.begin().await?;
        Self::delete_one_tx(&mut tx, product_id, id).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Resolve `input.name` through the catalog and insert the row.
    ///
    /// Catalog names are never auto-created here: an unknown name fails
    /// `NotFound` and aborts the caller's transaction. The value type is
    /// classified from the literal.
    pub async fn add_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        product_id: DbId,
        input: &NewCharacteristic,
    ) -> Result<ProductCharacteristic, DbError> {
        let catalog_entry = CharacteristicNameRepo::find_by_name_tx(tx, &input.name)
            .await?
            .ok_or_else(|| {
                DbError::Core(CoreError::NotFound {
                    entity: "characteristic name",
                    key: input.name.trim().to_string(),
                })
            })?;

        Self::insert_tx(
            tx,
            product_id,
            catalog_entry.id,
            &input.value.to_text(),
            input.value.value_type(),
        )
        .await
    }

    /// Resolve and insert one characteristic in a standalone transaction.
    pub async fn add_one(
        pool: &PgPool,
        product_id: DbId,
        input: &NewCharacteristic,
    ) -> Result<ProductCharacteristic, DbError> {
        let mut tx = pool.begin().await?;
        let row = Self::add_tx(&mut tx, product_id, input).await?;
        tx.commit().await?;
        Ok(row)
    }

    // -----------------------------------------------------------------------
    // Reconciliation
    // -----------------------------------------------------------------------

    /// Apply a delete → update → add diff for one product, returning the
    /// canonical post-state list.
    ///
    /// Runs inside the caller's transaction, so either every phase commits
    /// or none do. The phase order is deliberate: a single diff can drop a
    /// binding and re-add a different value for the same name without
    /// tripping `uq_product_characteristics_product_name`.
    pub async fn reconcile_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        product_id: DbId,
        diff: &CharacteristicDiff,
    ) -> Result<Vec<ProductCharacteristicView>, DbError> {
        let deleted = Self::delete_many_tx(tx, product_id, &diff.delete).await?;

        for patch in &diff.update {
            Self::update_value_tx(tx, patch.id, &patch.value.to_text(), patch.value.value_type())
                .await?;
        }

        for item in &diff.add {
            Self::add_tx(tx, product_id, item).await?;
        }

        tracing::debug!(
            product_id,
            deleted,
            updated = diff.update.len(),
            added = diff.add.len(),
            "Reconciled product characteristics"
        );

        Self::list_for_product_tx(tx, product_id).await
    }

    /// Apply a diff in a standalone transaction.
    pub async fn reconcile(
        pool: &PgPool,
        product_id: DbId,
        diff: &CharacteristicDiff,
    ) -> Result<Vec<ProductCharacteristicView>, DbError> {
        let mut tx = pool.begin().await?;
        let views = Self::reconcile_tx(&mut tx, product_id, diff).await?;
        tx.commit().await?;
        Ok(views)
    }
}
