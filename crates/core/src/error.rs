use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// No row with this id has ever existed.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    /// The target row does not exist or has been soft-deleted.
    ///
    /// Callers cannot distinguish the two cases and are not expected
    /// to; the message deliberately names both.
    #[error("{entity} not found or has been deleted")]
    NotFoundOrDeleted { entity: &'static str },
}
