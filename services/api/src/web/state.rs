//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use fill_blank_core::ports::ProblemRepository;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn ProblemRepository>,
}

impl AppState {
    pub fn new(repo: Arc<dyn ProblemRepository>) -> Self {
        Self { repo }
    }
}
