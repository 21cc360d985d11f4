//! Repository for the `characteristic_names` catalog table.

use sqlx::PgPool;
use storefront_core::types::DbId;

use crate::error::{conflict_on_unique, DbError};
use crate::models::characteristic_name::{
    CharacteristicName, CreateCharacteristicName, UpdateCharacteristicName,
};

/// Column list for characteristic_names queries.
const COLUMNS: &str = "id, name, value_type, created_at, updated_at";

/// Entity label used in `NotFound` errors.
const ENTITY: &str = "characteristic name";

/// Provides CRUD operations for the shared characteristic catalog.
///
/// Names are stored trimmed and compared case-folded; uniqueness is enforced
/// by the `uq_characteristic_names_name` index on `lower(name)`, never
/// pre-checked.
pub struct CharacteristicNameRepo;

impl CharacteristicNameRepo {
    /// List all catalog entries, ordered by name ascending.
    pub async fn list(pool: &PgPool) -> Result<Vec<CharacteristicName>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM characteristic_names ORDER BY name ASC");
        let entries = sqlx::query_as::<_, CharacteristicName>(&query)
            .fetch_all(pool)
            .await?;
        Ok(entries)
    }

    /// Find a catalog entry by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<CharacteristicName>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM characteristic_names WHERE id = $1");
        let entry = sqlx::query_as::<_, CharacteristicName>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(entry)
    }

    /// Find a catalog entry by normalized (trimmed, case-folded) name.
    pub async fn find_by_name(
        pool: &PgPool,
        name: &str,
    ) -> Result<Option<CharacteristicName>, DbError> {
        let query =
            format!("SELECT {COLUMNS} FROM characteristic_names WHERE lower(name) = lower($1)");
        let entry = sqlx::query_as::<_, CharacteristicName>(&query)
            .bind(name.trim())
            .fetch_optional(pool)
            .await?;
        Ok(entry)
    }

    /// Find by normalized name through the caller's transaction.
    ///
    /// Reconciliation resolves names this way so it observes rows created
    /// earlier in the same unit of work.
    pub async fn find_by_name_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        name: &str,
    ) -> Result<Option<CharacteristicName>, DbError> {
        let query =
            format!("SELECT {COLUMNS} FROM characteristic_names WHERE lower(name) = lower($1)");
        let entry = sqlx::query_as::<_, CharacteristicName>(&query)
            .bind(name.trim())
            .fetch_optional(&mut **tx)
            .await?;
        Ok(entry)
    }

    /// Create a catalog entry. A duplicate normalized name fails `Conflict`.
    pub async fn create_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        input: &CreateCharacteristicName,
    ) -> Result<CharacteristicName, DbError> {
        let query = format!(
            "INSERT INTO characteristic_names (name, value_type) \
             VALUES ($1, $2) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CharacteristicName>(&query)
            .bind(input.name.trim())
            .bind(input.value_type.as_str())
            .fetch_one(&mut **tx)
            .await
            .map_err(|e| conflict_on_unique(e, "characteristic name already exists"))
    }

    /// Create a catalog entry in a standalone transaction.
    pub async fn create(
        pool: &PgPool,
        input: &CreateCharacteristicName,
    ) -> Result<CharacteristicName, DbError> {
        let mut tx = pool.begin().await?;
        let entry = Self::create_tx(&mut tx, input).await?;
        tx.commit().await?;
        Ok(entry)
    }

    /// Update a catalog entry. Only supplied fields change.
    ///
    /// A supplied name is trimmed; colliding with another entry (the row
    /// itself excluded by the index semantics) fails `Conflict`.
    pub async fn update_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
        input: &UpdateCharacteristicName,
    ) -> Result<CharacteristicName, DbError> {
        let query = format!(
            "UPDATE characteristic_names SET \
                name = COALESCE($2, name), \
                value_type = COALESCE($3, value_type) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let entry = sqlx::query_as::<_, CharacteristicName>(&query)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(input.value_type.map(|v| v.as_str()))
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| conflict_on_unique(e, "characteristic name already exists"))?;
        entry.ok_or_else(|| DbError::not_found(ENTITY, id))
    }

    /// Update a catalog entry in a standalone transaction.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCharacteristicName,
    ) -> Result<CharacteristicName, DbError> {
        let mut tx = pool.begin().await?;
        let entry = Self::update_tx(&mut tx, id, input).await?;
        tx.commit().await?;
        Ok(entry)
    }

    /// Delete a catalog entry.
    ///
    /// Fails `NotFound` if unknown, and `Conflict` while product
    /// characteristics still reference it.
    pub async fn delete_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<(), DbError> {
        let usage: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM product_characteristics WHERE characteristic_name_id = $1",
        )
        .bind(id)
        .fetch_one(&mut **tx)
        .await?;
        if usage > 0 {
            return Err(DbError::conflict(format!(
                "characteristic name {id} is still used by {usage} product characteristics"
            )));
        }

        let result = sqlx::query("DELETE FROM characteristic_names WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::not_found(ENTITY, id));
        }
        Ok(())
    }

    /// Delete a catalog entry in a standalone transaction.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<(), DbError> {
        let mut tx = pool.begin().await?;
        Self::delete_tx(&mut tx, id).await?;
        tx.commit().await?;
        Ok(())
    }
}
