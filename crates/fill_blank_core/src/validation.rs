//! crates/fill_blank_core/src/validation.rs
//!
//! Blank-marker counting, the authoring rule that ties markers to answers, and
//! answer grading. Everything here is pure.

use crate::domain::ProblemInput;

/// The token that marks a fill-in position inside a problem's text.
pub const BLANK_MARKER: &str = "___";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("The sentence needs at least one ___ blank and at least one answer")]
    MissingBlanksOrAnswers,
    #[error("The number of blanks ({blanks}) must match the number of answers ({answers})")]
    CountMismatch { blanks: usize, answers: usize },
}

/// Counts non-overlapping blank markers, scanning left to right.
pub fn count_blanks(text: &str) -> usize {
    text.matches(BLANK_MARKER).count()
}

/// Splits `text` around its blank markers. Blank `k` sits between
/// `segments[k]` and `segments[k + 1]`.
pub fn split_segments(text: &str) -> Vec<&str> {
    text.split(BLANK_MARKER).collect()
}

/// Checks an authored problem and returns the input that should be stored.
///
/// Answers that are empty once trimmed are dropped; the survivors are kept
/// verbatim and `blanks` is set to the marker count.
pub fn validate_problem(text: &str, answers: &[String]) -> Result<ProblemInput, ValidationError> {
    let blanks = count_blanks(text);
    let filtered: Vec<String> = answers
        .iter()
        .filter(|a| !a.trim().is_empty())
        .cloned()
        .collect();

    if blanks == 0 || filtered.is_empty() {
        return Err(ValidationError::MissingBlanksOrAnswers);
    }
    if blanks != filtered.len() {
        return Err(ValidationError::CountMismatch {
            blanks,
            answers: filtered.len(),
        });
    }

    Ok(ProblemInput {
        text: text.to_string(),
        answers: filtered,
        blanks,
    })
}

/// Grades one blank: the given answer is trimmed, both sides are lowercased.
pub fn is_correct(given: &str, expected: &str) -> bool {
    given.trim().to_lowercase() == expected.to_lowercase()
}
