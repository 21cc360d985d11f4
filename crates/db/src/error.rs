//! Persistence-layer error type and constraint-violation classification.

use storefront_core::error::CoreError;
use storefront_core::types::DbId;

/// PostgreSQL error code for unique constraint violations.
const PG_UNIQUE_VIOLATION: &str = "23505";

/// Prefix marking intentional unique constraints/indexes in the schema.
const UNIQUE_CONSTRAINT_PREFIX: &str = "uq_";

/// Error type returned by every repository operation.
///
/// Domain failures (`NotFound`, `Conflict`, ...) travel as `Core`;
/// everything the store itself raises stays `Database`.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl DbError {
    /// `NotFound` shorthand for an id-keyed entity.
    pub fn not_found(entity: &'static str, id: DbId) -> Self {
        DbError::Core(CoreError::not_found(entity, id))
    }

    /// `Conflict` shorthand.
    pub fn conflict(message: impl Into<String>) -> Self {
        DbError::Core(CoreError::Conflict(message.into()))
    }
}

/// Translate a unique-key violation into a domain `Conflict`.
///
/// Uniqueness is never pre-checked: inserts and updates run against the
/// `uq_`-prefixed constraints and a violation is rewritten here, at the
/// point of detection (error code 23505). Anything else passes through as
/// a `Database` error.
pub(crate) fn conflict_on_unique(err: sqlx::Error, message: &str) -> DbError {
    if let sqlx::Error::Database(ref db_err) = err {
        let is_unique = db_err.code().as_deref() == Some(PG_UNIQUE_VIOLATION);
        let is_marked = db_err
            .constraint()
            .map(|c| c.starts_with(UNIQUE_CONSTRAINT_PREFIX))
            .unwrap_or(false);
        if is_unique && is_marked {
            return DbError::Core(CoreError::Conflict(message.to_string()));
        }
    }
    DbError::Database(err)
}
