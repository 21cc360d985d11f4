use crate::types::DbId;

/// Domain failure taxonomy shared by every engine operation.
///
/// `NotFound` keys are strings because lookups happen both by id and by
/// normalized catalog name.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with key {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Cycle detected in category tree at id {at}")]
    CycleDetected { at: DbId },
}

impl CoreError {
    /// `NotFound` for an id-keyed entity.
    pub fn not_found(entity: &'static str, id: DbId) -> Self {
        CoreError::NotFound {
            entity,
            key: id.to_string(),
        }
    }
}
