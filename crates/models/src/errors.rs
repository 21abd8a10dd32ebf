use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(String),
    /// A unique index rejected the write.
    #[error("duplicate record: {0}")]
    Duplicate(String),
    #[error("database error: {0}")]
    Db(String),
}

/// Whether the driver reported a unique-constraint violation.
pub fn is_unique_violation(e: &DbErr) -> bool {
    matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

impl From<DbErr> for ModelError {
    fn from(e: DbErr) -> Self {
        if is_unique_violation(&e) {
            ModelError::Duplicate(e.to_string())
        } else {
            ModelError::Db(e.to_string())
        }
    }
}
