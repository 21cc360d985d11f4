//! Product characteristic model, list view, and reconciliation diff DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use storefront_core::types::{DbId, Timestamp};
use storefront_core::value::{CharacteristicValue, ValueType};

/// A row from the `product_characteristics` table.
///
/// `value` is text-encoded; `value_type` records how the literal classified
/// when the row was written.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductCharacteristic {
    pub id: DbId,
    pub product_id: DbId,
    pub characteristic_name_id: DbId,
    pub value: String,
    #[sqlx(try_from = "String")]
    pub value_type: ValueType,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A characteristic as listed for a product: joined with the catalog to
/// surface the display name, ordered by id ascending.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductCharacteristicView {
    pub id: DbId,
    pub name: String,
    pub value: String,
    #[sqlx(try_from = "String")]
    pub value_type: ValueType,
}

/// DTO for binding one catalog name to a product.
///
/// `name` is resolved through the catalog at apply time; the value type is
/// classified from the literal.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCharacteristic {
    pub name: String,
    pub value: CharacteristicValue,
}

/// DTO for overwriting the value of an existing characteristic row.
#[derive(Debug, Clone, Deserialize)]
pub struct CharacteristicValuePatch {
    pub id: DbId,
    pub value: CharacteristicValue,
}

/// Desired change set for one product's characteristics.
///
/// Applied as delete, then update, then add, so a single diff can drop a
/// binding and re-add a different value for the same name without tripping
/// the per-product uniqueness constraint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CharacteristicDiff {
    #[serde(default)]
    pub add: Vec<NewCharacteristic>,
    #[serde(default)]
    pub update: Vec<CharacteristicValuePatch>,
    #[serde(default)]
    pub delete: Vec<DbId>,
}

impl CharacteristicDiff {
    /// True when no phase has any work to do.
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.update.is_empty() && self.delete.is_empty()
    }
}
