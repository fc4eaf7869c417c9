//! crates/fill_blank_core/src/quiz.rs
//!
//! The quiz controller: the client-side state machine that browses problems,
//! collects and grades answers, and runs the create/edit/delete flows against a
//! `ProblemRepository`.
//!
//! The controller keeps a full copy of the problem list and replaces it wholesale
//! after every successful mutation.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::Problem;
use crate::ports::{PortError, ProblemRepository};
use crate::validation::{count_blanks, is_correct, validate_problem, ValidationError};

//=========================================================================================
// State
//=========================================================================================

/// Whether the edit form creates a new problem or rewrites an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    New,
    Existing(Uuid),
}

/// The in-progress edit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditForm {
    pub mode: EditMode,
    pub text: String,
    pub answers: Vec<String>,
    /// Where `cancel` goes back to.
    return_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizState {
    Loading,
    Error(String),
    /// No problems stored; only adding one is possible.
    Empty,
    Browsing {
        index: usize,
        answers_given: BTreeMap<usize, String>,
        result_shown: bool,
    },
    Editing(EditForm),
}

/// The outcome of checking the current problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grade {
    /// One entry per blank position, `true` when that blank is correct.
    pub blanks: Vec<bool>,
    pub all_correct: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum QuizError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] PortError),
    /// The write went through but the list could not be fetched again.
    #[error("The change was saved, but reloading the problems failed: {0}")]
    Reload(PortError),
}

//=========================================================================================
// Controller
//=========================================================================================

pub struct QuizController {
    repo: Arc<dyn ProblemRepository>,
    problems: Vec<Problem>,
    state: QuizState,
}

impl QuizController {
    /// Creates a controller in the `Loading` state. Call `load` to fetch problems.
    pub fn new(repo: Arc<dyn ProblemRepository>) -> Self {
        Self {
            repo,
            problems: Vec::new(),
            state: QuizState::Loading,
        }
    }

    pub fn state(&self) -> &QuizState {
        &self.state
    }

    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    /// The problem being answered, if browsing.
    pub fn current_problem(&self) -> Option<&Problem> {
        match &self.state {
            QuizState::Browsing { index, .. } => self.problems.get(*index),
            _ => None,
        }
    }

    /// The 1-based position of the current problem and the total count.
    pub fn position(&self) -> Option<(usize, usize)> {
        match &self.state {
            QuizState::Browsing { index, .. } => Some((index + 1, self.problems.len())),
            _ => None,
        }
    }

    pub fn form(&self) -> Option<&EditForm> {
        match &self.state {
            QuizState::Editing(form) => Some(form),
            _ => None,
        }
    }

    // --- Loading ---

    /// Fetches the full problem list and starts browsing at the first problem.
    pub async fn load(&mut self) {
        self.state = QuizState::Loading;
        // The error is already recorded in `QuizState::Error`.
        let _ = self.reload(None, 0).await;
    }

    /// Reloads after a failed load. Does nothing in any other state.
    pub async fn retry(&mut self) {
        if matches!(self.state, QuizState::Error(_)) {
            self.load().await;
        }
    }

    // --- Answering ---

    /// Records the answer typed into blank `blank` (0-based).
    pub fn set_answer(&mut self, blank: usize, value: impl Into<String>) {
        if let QuizState::Browsing { answers_given, .. } = &mut self.state {
            answers_given.insert(blank, value.into());
        }
    }

    pub fn check_answers(&mut self) {
        if let QuizState::Browsing { result_shown, .. } = &mut self.state {
            *result_shown = true;
        }
    }

    pub fn reset_answers(&mut self) {
        if let QuizState::Browsing {
            answers_given,
            result_shown,
            ..
        } = &mut self.state
        {
            answers_given.clear();
            *result_shown = false;
        }
    }

    /// Grades the current problem. Only available once answers were checked.
    ///
    /// Positions run over every blank in the text and every stored answer, so a
    /// record whose `answers` and markers disagree grades the unmatched positions
    /// as wrong.
    pub fn grade(&self) -> Option<Grade> {
        let QuizState::Browsing {
            answers_given,
            result_shown: true,
            ..
        } = &self.state
        else {
            return None;
        };
        let problem = self.current_problem()?;

        let positions = count_blanks(&problem.text).max(problem.answers.len());
        let blanks: Vec<bool> = (0..positions)
            .map(|k| {
                let given = answers_given.get(&k).map(String::as_str).unwrap_or("");
                problem
                    .answers
                    .get(k)
                    .is_some_and(|expected| is_correct(given, expected))
            })
            .collect();
        let all_correct = blanks.iter().all(|correct| *correct);

        Some(Grade { blanks, all_correct })
    }

    // --- Navigation ---

    pub fn next(&mut self) {
        if let QuizState::Browsing { index, .. } = self.state {
            if index + 1 < self.problems.len() {
                self.state = self.browse_at(index + 1);
            }
        }
    }

    pub fn prev(&mut self) {
        if let QuizState::Browsing { index, .. } = self.state {
            if index > 0 {
                self.state = self.browse_at(index - 1);
            }
        }
    }

    // --- Editing ---

    /// Opens an empty form for a new problem.
    pub fn add_problem(&mut self) {
        let return_index = match self.state {
            QuizState::Browsing { index, .. } => index,
            QuizState::Empty => 0,
            _ => return,
        };
        self.state = QuizState::Editing(EditForm {
            mode: EditMode::New,
            text: String::new(),
            answers: vec![String::new()],
            return_index,
        });
    }

    /// Opens the form pre-filled with the problem `id`.
    pub fn edit_problem(&mut self, id: Uuid) {
        let QuizState::Browsing { index, .. } = self.state else {
            return;
        };
        let Some(problem) = self.problems.iter().find(|p| p.id == id) else {
            warn!("Cannot edit unknown problem {}", id);
            return;
        };
        self.state = QuizState::Editing(EditForm {
            mode: EditMode::Existing(problem.id),
            text: problem.text.clone(),
            answers: problem.answers.clone(),
            return_index: index,
        });
    }

    pub fn edit_current(&mut self) {
        if let Some(id) = self.current_problem().map(|p| p.id) {
            self.edit_problem(id);
        }
    }

    pub fn set_edit_text(&mut self, text: impl Into<String>) {
        if let QuizState::Editing(form) = &mut self.state {
            form.text = text.into();
        }
    }

    pub fn set_edit_answer(&mut self, field: usize, value: impl Into<String>) {
        if let QuizState::Editing(form) = &mut self.state {
            if let Some(slot) = form.answers.get_mut(field) {
                *slot = value.into();
            }
        }
    }

    pub fn add_answer_field(&mut self) {
        if let QuizState::Editing(form) = &mut self.state {
            form.answers.push(String::new());
        }
    }

    /// Removes answer field `field`. The last remaining field cannot be removed.
    pub fn remove_answer_field(&mut self, field: usize) {
        if let QuizState::Editing(form) = &mut self.state {
            if form.answers.len() > 1 && field < form.answers.len() {
                form.answers.remove(field);
            }
        }
    }

    /// Validates the form and writes it through the repository.
    ///
    /// On a validation or repository failure the form stays open and untouched.
    /// On success the list is reloaded and the saved problem becomes current.
    pub async fn save(&mut self) -> Result<(), QuizError> {
        let QuizState::Editing(form) = &self.state else {
            return Ok(());
        };
        let input = validate_problem(&form.text, &form.answers)?;
        let mode = form.mode;
        let return_index = form.return_index;

        let saved_id = match mode {
            EditMode::New => {
                let created = self.repo.create_problem(input).await?;
                info!("Created problem {}", created.id);
                created.id
            }
            EditMode::Existing(id) => {
                self.repo.update_problem(id, input).await?;
                info!("Updated problem {}", id);
                id
            }
        };

        self.reload(Some(saved_id), return_index)
            .await
            .map_err(QuizError::Reload)
    }

    /// Leaves the form without saving and without reloading.
    pub fn cancel(&mut self) {
        if let QuizState::Editing(form) = &self.state {
            self.state = self.browse_at(form.return_index);
        }
    }

    // --- Deleting ---

    /// Deletes the current problem once `confirm` agrees.
    ///
    /// Returns `Ok(false)` when nothing was deleted (declined, or not browsing).
    /// A failed delete leaves the state unchanged.
    pub async fn delete_current<F>(&mut self, confirm: F) -> Result<bool, QuizError>
    where
        F: FnOnce(&Problem) -> bool,
    {
        let Some(problem) = self.current_problem() else {
            return Ok(false);
        };
        if !confirm(problem) {
            debug!("Delete of problem {} declined", problem.id);
            return Ok(false);
        }
        let id = problem.id;
        let index = self.position().map(|(pos, _)| pos - 1).unwrap_or(0);

        self.repo.delete_problem(id).await?;
        info!("Deleted problem {}", id);

        self.reload(None, index).await.map_err(QuizError::Reload)?;
        Ok(true)
    }

    //=====================================================================================
    // Helpers
    //=====================================================================================

    /// Replaces the problem list and browses to `select` if present, otherwise
    /// to `fallback` clamped into range. A failed list moves to `Error`.
    async fn reload(&mut self, select: Option<Uuid>, fallback: usize) -> Result<(), PortError> {
        match self.repo.list_problems().await {
            Ok(problems) => {
                self.problems = problems;
                let index = select
                    .and_then(|id| self.problems.iter().position(|p| p.id == id))
                    .unwrap_or(fallback);
                self.state = self.browse_at(index);
                Ok(())
            }
            Err(e) => {
                warn!("Failed to load problems: {}", e);
                self.state = QuizState::Error(e.to_string());
                Err(e)
            }
        }
    }

    /// A fresh browsing state at `index` (clamped), or `Empty` with no problems.
    fn browse_at(&self, index: usize) -> QuizState {
        if self.problems.is_empty() {
            return QuizState::Empty;
        }
        QuizState::Browsing {
            index: index.min(self.problems.len() - 1),
            answers_given: BTreeMap::new(),
            result_shown: false,
        }
    }
}
