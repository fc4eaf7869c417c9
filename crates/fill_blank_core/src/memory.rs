//! crates/fill_blank_core/src/memory.rs
//!
//! An in-process implementation of the `ProblemRepository` port. The API server
//! falls back to it when no database is configured, and tests use it in place
//! of a real store.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::domain::{Problem, ProblemInput};
use crate::ports::{PortError, PortResult, ProblemRepository};

/// Keeps problems in insertion order behind a mutex.
#[derive(Debug, Default)]
pub struct InMemoryProblemRepository {
    problems: Mutex<Vec<Problem>>,
}

impl InMemoryProblemRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> PortResult<MutexGuard<'_, Vec<Problem>>> {
        self.problems
            .lock()
            .map_err(|e| PortError::Storage(format!("problem store lock poisoned: {}", e)))
    }
}

#[async_trait]
impl ProblemRepository for InMemoryProblemRepository {
    async fn list_problems(&self) -> PortResult<Vec<Problem>> {
        Ok(self.lock()?.clone())
    }

    async fn create_problem(&self, input: ProblemInput) -> PortResult<Problem> {
        let problem = Problem::new(Uuid::new_v4(), input, Utc::now());
        self.lock()?.push(problem.clone());
        Ok(problem)
    }

    async fn update_problem(&self, id: Uuid, input: ProblemInput) -> PortResult<()> {
        if let Some(problem) = self.lock()?.iter_mut().find(|p| p.id == id) {
            problem.apply(input, Utc::now());
        }
        Ok(())
    }

    async fn delete_problem(&self, id: Uuid) -> PortResult<()> {
        self.lock()?.retain(|p| p.id != id);
        Ok(())
    }
}
