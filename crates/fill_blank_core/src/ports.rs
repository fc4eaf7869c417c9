//! crates/fill_blank_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! The quiz controller, the REST layer and every storage backend meet at the
//! `ProblemRepository` trait, so none of them depends on a concrete store.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Problem, ProblemInput};
use crate::validation::ValidationError;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// Any failure reported by the backing store.
    #[error("{0}")]
    Storage(String),
    /// The identifier could not be parsed into the store's key format.
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),
    #[error("{0}")]
    Validation(#[from] ValidationError),
    /// Transport failure or non-success response while talking to a remote repository.
    #[error("{0}")]
    Network(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// CRUD access to the problem collection.
///
/// `update_problem` and `delete_problem` succeed even when no problem matches `id`.
#[async_trait]
pub trait ProblemRepository: Send + Sync {
    async fn list_problems(&self) -> PortResult<Vec<Problem>>;

    async fn create_problem(&self, input: ProblemInput) -> PortResult<Problem>;

    async fn update_problem(&self, id: Uuid, input: ProblemInput) -> PortResult<()>;

    async fn delete_problem(&self, id: Uuid) -> PortResult<()>;
}
