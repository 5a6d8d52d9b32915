//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`NotFound`] thrown when a [`Document`] does not exist.
//! - [`DetailNotFound`] thrown when a detail is not owned by an existing document.
//! - [`DuplicateKey`] thrown when a document number is already taken.
//! - [`Validation`] thrown when an input would break an invariant.
//!
//!  [`NotFound`]: EngineError::NotFound
//!  [`DetailNotFound`]: EngineError::DetailNotFound
//!  [`DuplicateKey`]: EngineError::DuplicateKey
//!  [`Validation`]: EngineError::Validation
//!  [`Document`]: crate::Document
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

use crate::ErrorCategory;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Document not found: {0}")]
    NotFound(String),
    #[error("Detail not found: {0}")]
    DetailNotFound(String),
    #[error("Document with number {0} already exists")]
    DuplicateKey(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error(transparent)]
    Database(DbErr),
}

impl EngineError {
    /// Category under which the failure is written to the error log.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound(_) => ErrorCategory::DocNotFound,
            Self::DetailNotFound(_) => ErrorCategory::DetailNotFound,
            Self::DuplicateKey(_) => ErrorCategory::DocNumberDuplicate,
            Self::Validation(_) => ErrorCategory::Validation,
            Self::Database(_) => ErrorCategory::General,
        }
    }
}

impl From<DbErr> for EngineError {
    /// Fallback for unique violations outside a document write, where the
    /// number is unknown: the store's message is kept as the key.
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => Self::DuplicateKey(detail),
            _ => Self::Database(err),
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::DetailNotFound(a), Self::DetailNotFound(b)) => a == b,
            (Self::DuplicateKey(a), Self::DuplicateKey(b)) => a == b,
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
