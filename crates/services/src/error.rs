//! Shared error types for the services crate.

use thiserror::Error;

use lms_core::model::{CatalogError, ContentId, QuizError};
use storage::sqlite::SqliteInitError;

/// Why an intent was ignored. The catalog and session are left untouched.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PortalError {
    #[error("only trainers can change the catalog")]
    TrainerOnly,
    #[error("content {0} is not open in the player")]
    NotInPlayer(ContentId),
    #[error(transparent)]
    Rejected(#[from] lms_core::Error),
}

impl From<CatalogError> for PortalError {
    fn from(err: CatalogError) -> Self {
        Self::Rejected(err.into())
    }
}

impl From<QuizError> for PortalError {
    fn from(err: QuizError) -> Self {
        Self::Rejected(err.into())
    }
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error("could not prepare database file {path}: {source}")]
    DatabaseFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
