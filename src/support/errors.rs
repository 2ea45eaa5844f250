use thiserror::Error;

/// Failures surfaced by the location store and its repositories.
///
/// Storage-layer errors are passed through unchanged.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error(transparent)]
    Database(#[from] sea_orm::DbErr),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MainContextError {
    #[error("Main context has shut down")]
    Closed,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ObservableError {
    #[error("Observable can only be mutated on its main context")]
    NotOnMainContext,
}
