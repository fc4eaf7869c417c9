//! crates/fill_blank_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::ports::{PortError, PortResult};

/// A stored fill-in-the-blank exercise.
///
/// `blanks` is the marker count cached when the problem was last written; it is
/// trusted as-is on read and never re-derived from `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub id: Uuid,
    pub text: String,
    pub answers: Vec<String>,
    pub blanks: usize,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// The writable part of a `Problem`, used for both create and update.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProblemInput {
    pub text: String,
    pub answers: Vec<String>,
    pub blanks: usize,
}

impl Problem {
    /// Builds a freshly created problem from its input.
    pub fn new(id: Uuid, input: ProblemInput, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            text: input.text,
            answers: input.answers,
            blanks: input.blanks,
            created_at: Some(created_at),
            updated_at: None,
        }
    }

    /// Overwrites the writable fields in place; `id` and `created_at` are kept.
    pub fn apply(&mut self, input: ProblemInput, updated_at: DateTime<Utc>) {
        self.text = input.text;
        self.answers = input.answers;
        self.blanks = input.blanks;
        self.updated_at = Some(updated_at);
    }
}

/// Parses a raw identifier (e.g. a URL path segment) into the store's key format.
pub fn parse_problem_id(raw: &str) -> PortResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|e| {
        PortError::InvalidIdentifier(format!("'{}' is not a valid problem id: {}", raw, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_keeps_identity_and_creation_time() {
        let created = Utc::now();
        let id = Uuid::new_v4();
        let mut problem = Problem::new(
            id,
            ProblemInput {
                text: "___ is blue.".to_string(),
                answers: vec!["Sky".to_string()],
                blanks: 1,
            },
            created,
        );
        assert_eq!(problem.updated_at, None);

        let later = created + chrono::Duration::seconds(5);
        problem.apply(
            ProblemInput {
                text: "The ___ is ___.".to_string(),
                answers: vec!["sky".to_string(), "blue".to_string()],
                blanks: 2,
            },
            later,
        );

        assert_eq!(problem.id, id);
        assert_eq!(problem.created_at, Some(created));
        assert_eq!(problem.updated_at, Some(later));
        assert_eq!(problem.blanks, 2);
        assert_eq!(problem.answers, vec!["sky", "blue"]);
    }

    #[test]
    fn parse_problem_id_rejects_garbage() {
        let id = Uuid::new_v4();
        assert_eq!(parse_problem_id(&id.to_string()).unwrap(), id);
        assert!(matches!(
            parse_problem_id("not-an-id"),
            Err(PortError::InvalidIdentifier(_))
        ));
    }
}
