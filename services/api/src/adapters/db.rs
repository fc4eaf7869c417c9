//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `ProblemRepository` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fill_blank_core::domain::{Problem, ProblemInput};
use fill_blank_core::ports::{PortError, PortResult, ProblemRepository};
use sqlx::{FromRow, PgPool};
use tracing::debug;
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `ProblemRepository` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

const PROBLEM_COLUMNS: &str = "id, text, answers, blanks, created_at, updated_at";

#[derive(FromRow)]
struct ProblemRecord {
    id: Uuid,
    text: String,
    answers: Vec<String>,
    blanks: i32,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}
impl ProblemRecord {
    fn to_domain(self) -> Problem {
        Problem {
            id: self.id,
            text: self.text,
            answers: self.answers,
            // A negative count can only come from a write outside this service.
            blanks: usize::try_from(self.blanks).unwrap_or(0),
            created_at: Some(self.created_at),
            updated_at: self.updated_at,
        }
    }
}

fn blanks_column(blanks: usize) -> PortResult<i32> {
    i32::try_from(blanks)
        .map_err(|_| PortError::Storage(format!("blank count {} does not fit the store", blanks)))
}

fn storage_error(e: sqlx::Error) -> PortError {
    PortError::Storage(e.to_string())
}

//=========================================================================================
// `ProblemRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl ProblemRepository for DbAdapter {
    async fn list_problems(&self) -> PortResult<Vec<Problem>> {
        let records = sqlx::query_as::<_, ProblemRecord>(&format!(
            "SELECT {} FROM problems ORDER BY created_at ASC",
            PROBLEM_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn create_problem(&self, input: ProblemInput) -> PortResult<Problem> {
        let blanks = blanks_column(input.blanks)?;
        let record = sqlx::query_as::<_, ProblemRecord>(&format!(
            "INSERT INTO problems (id, text, answers, blanks, created_at) VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            PROBLEM_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(input.text)
        .bind(input.answers)
        .bind(blanks)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(record.to_domain())
    }

    async fn update_problem(&self, id: Uuid, input: ProblemInput) -> PortResult<()> {
        let blanks = blanks_column(input.blanks)?;
        let result = sqlx::query(
            "UPDATE problems SET text = $1, answers = $2, blanks = $3, updated_at = $4 WHERE id = $5",
        )
        .bind(input.text)
        .bind(input.answers)
        .bind(blanks)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        // A missing row is not an error for this operation.
        debug!("Update of problem {} touched {} row(s)", id, result.rows_affected());
        Ok(())
    }

    async fn delete_problem(&self, id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM problems WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        debug!("Delete of problem {} touched {} row(s)", id, result.rows_affected());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(blanks: i32) -> ProblemRecord {
        ProblemRecord {
            id: Uuid::new_v4(),
            text: "___".to_string(),
            answers: vec!["a".to_string()],
            blanks,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn record_maps_to_domain() {
        let rec = record(1);
        let (id, created_at) = (rec.id, rec.created_at);
        let problem = rec.to_domain();
        assert_eq!(problem.id, id);
        assert_eq!(problem.blanks, 1);
        assert_eq!(problem.created_at, Some(created_at));
        assert_eq!(problem.updated_at, None);
    }

    #[test]
    fn negative_blank_count_reads_as_zero() {
        assert_eq!(record(-3).to_domain().blanks, 0);
    }

    #[test]
    fn oversized_blank_count_is_a_storage_error() {
        assert!(matches!(
            blanks_column(usize::MAX),
            Err(PortError::Storage(_))
        ));
        assert_eq!(blanks_column(4).unwrap(), 4);
    }
}
