//! Characteristic catalog model and DTOs.
//!
//! The catalog is the global, de-duplicated set of characteristic names.
//! Product characteristics reference entries here and never own them.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use storefront_core::types::{DbId, Timestamp};
use storefront_core::value::ValueType;

/// A row from the `characteristic_names` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CharacteristicName {
    pub id: DbId,
    pub name: String,
    #[sqlx(try_from = "String")]
    pub value_type: ValueType,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new catalog entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCharacteristicName {
    pub name: String,
    pub value_type: ValueType,
}

/// DTO for updating a catalog entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCharacteristicName {
    pub name: Option<String>,
    pub value_type: Option<ValueType>,
}
