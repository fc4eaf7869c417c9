//! services/api/src/terminal.rs
//!
//! The line-oriented quiz front end: parses commands typed by the user, applies
//! them to a `QuizController`, and renders the controller's state as text.

use fill_blank_core::quiz::{EditMode, QuizController, QuizError, QuizState};
use fill_blank_core::validation::split_segments;
use std::fmt::Write;

//=========================================================================================
// Commands
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Fill blank `blank` (0-based) with `value`.
    Answer { blank: usize, value: String },
    Check,
    Reset,
    Next,
    Prev,
    Add,
    Edit,
    /// `confirmed` is filled in by the caller after asking the user.
    Delete { confirmed: bool },
    Text(String),
    /// Set answer field `field` (0-based) of the edit form.
    EditAnswer { field: usize, value: String },
    AddField,
    RemoveField(usize),
    Save,
    Cancel,
    Retry,
    Help,
    Quit,
}

/// Parses one input line. Positions typed by the user are 1-based.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    if let Ok(position) = head.parse::<usize>() {
        return Ok(Command::Answer {
            blank: to_index(position)?,
            value: rest.to_string(),
        });
    }

    let command = match head.to_lowercase().as_str() {
        "check" => Command::Check,
        "reset" => Command::Reset,
        "next" | "n" => Command::Next,
        "prev" | "p" => Command::Prev,
        "add" => Command::Add,
        "edit" => Command::Edit,
        "delete" => Command::Delete { confirmed: false },
        "text" => Command::Text(rest.to_string()),
        "answer" => {
            let (position, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            let position = position
                .parse::<usize>()
                .map_err(|_| format!("'{}' is not an answer number", position))?;
            Command::EditAnswer {
                field: to_index(position)?,
                value: value.trim().to_string(),
            }
        }
        "+" => Command::AddField,
        "-" => {
            let position = rest
                .parse::<usize>()
                .map_err(|_| format!("'{}' is not an answer number", rest))?;
            Command::RemoveField(to_index(position)?)
        }
        "save" => Command::Save,
        "cancel" => Command::Cancel,
        "retry" => Command::Retry,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        "" => return Err("Type a command, or 'help'".to_string()),
        other => return Err(format!("Unknown command '{}', type 'help'", other)),
    };
    Ok(command)
}

fn to_index(position: usize) -> Result<usize, String> {
    position
        .checked_sub(1)
        .ok_or_else(|| "Positions start at 1".to_string())
}

/// Whether a confirmation prompt was answered with yes.
pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Applies `command` to the controller and returns a message for the user, if any.
pub async fn dispatch(quiz: &mut QuizController, command: Command) -> Option<String> {
    match command {
        Command::Answer { blank, value } => quiz.set_answer(blank, value),
        Command::Check => quiz.check_answers(),
        Command::Reset => quiz.reset_answers(),
        Command::Next => quiz.next(),
        Command::Prev => quiz.prev(),
        Command::Add => quiz.add_problem(),
        Command::Edit => quiz.edit_current(),
        Command::Delete { confirmed } => {
            return match quiz.delete_current(|_| confirmed).await {
                Ok(true) => Some("Problem deleted.".to_string()),
                Ok(false) => None,
                Err(e) => Some(failure("Delete failed", e)),
            };
        }
        Command::Text(text) => quiz.set_edit_text(text),
        Command::EditAnswer { field, value } => quiz.set_edit_answer(field, value),
        Command::AddField => quiz.add_answer_field(),
        Command::RemoveField(field) => quiz.remove_answer_field(field),
        Command::Save => {
            return quiz
                .save()
                .await
                .err()
                .map(|e| failure("Save failed", e));
        }
        Command::Cancel => quiz.cancel(),
        Command::Retry => quiz.retry().await,
        Command::Help => return Some(help(quiz.state()).to_string()),
        Command::Quit => {}
    }
    None
}

fn failure(action: &str, e: QuizError) -> String {
    match e {
        QuizError::Validation(e) => e.to_string(),
        QuizError::Repository(e) => format!("{}: {}", action, e),
        reload @ QuizError::Reload(_) => reload.to_string(),
    }
}

fn help(state: &QuizState) -> &'static str {
    match state {
        QuizState::Browsing { .. } => {
            "<n> <answer>  fill blank n | check | reset | next | prev | add | edit | delete | quit"
        }
        QuizState::Editing(_) => {
            "text <sentence> | answer <n> <value> | + (add field) | - <n> (remove field) | save | cancel"
        }
        QuizState::Empty => "add | quit",
        QuizState::Error(_) => "retry | quit",
        QuizState::Loading => "quit",
    }
}

//=========================================================================================
// Rendering
//=========================================================================================

/// Renders the whole screen for the controller's current state.
pub fn render(quiz: &QuizController) -> String {
    let mut out = String::new();
    match quiz.state() {
        QuizState::Loading => out.push_str("Loading..."),
        QuizState::Error(message) => {
            let _ = write!(out, "Error: {}\nType 'retry' to try again.", message);
        }
        QuizState::Empty => {
            out.push_str("No problems yet.\nType 'add' to add your first problem.");
        }
        QuizState::Browsing {
            answers_given,
            result_shown,
            ..
        } => {
            let Some(problem) = quiz.current_problem() else {
                return out;
            };
            let grade = quiz.grade();

            if let Some((position, total)) = quiz.position() {
                let _ = writeln!(out, "Problem {} / {}", position, total);
            }

            let segments = split_segments(&problem.text);
            for (k, segment) in segments.iter().enumerate() {
                out.push_str(segment);
                if k + 1 == segments.len() {
                    break;
                }
                let given = answers_given.get(&k).map(String::as_str).unwrap_or("");
                let shown = if given.is_empty() { "____" } else { given };
                let _ = write!(out, "[{}: {}]", k + 1, shown);
                if let Some(grade) = &grade {
                    let correct = grade.blanks.get(k).copied().unwrap_or(false);
                    out.push_str(if correct { "✓" } else { "✗" });
                }
            }
            out.push('\n');

            if *result_shown {
                let all_correct = grade.map(|g| g.all_correct).unwrap_or(false);
                out.push_str(if all_correct { "Correct!\n" } else { "Check again.\n" });
                let _ = writeln!(out, "Answers: {}", problem.answers.join(", "));
            }
        }
        QuizState::Editing(form) => {
            let title = match form.mode {
                EditMode::New => "New problem",
                EditMode::Existing(_) => "Edit problem",
            };
            let _ = writeln!(out, "{} (mark blanks with ___)", title);
            let _ = writeln!(out, "Text: {}", form.text);
            let _ = writeln!(out, "Answers ({}):", form.answers.len());
            for (i, answer) in form.answers.iter().enumerate() {
                let _ = writeln!(out, "  {}. {}", i + 1, answer);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use fill_blank_core::domain::ProblemInput;
    use fill_blank_core::memory::InMemoryProblemRepository;
    use fill_blank_core::ports::{PortError, ProblemRepository};
    use std::sync::Arc;

    async fn quiz_with(problems: &[(&str, &str)]) -> QuizController {
        let repo = Arc::new(InMemoryProblemRepository::new());
        for (text, answer) in problems {
            repo.create_problem(ProblemInput {
                text: text.to_string(),
                answers: vec![answer.to_string()],
                blanks: 1,
            })
            .await
            .unwrap();
        }
        let mut quiz = QuizController::new(repo);
        quiz.load().await;
        quiz
    }

    #[test]
    fn parses_commands_with_one_based_positions() {
        assert_eq!(
            parse_command("1  paris "),
            Ok(Command::Answer {
                blank: 0,
                value: "paris".to_string()
            })
        );
        assert_eq!(parse_command("CHECK"), Ok(Command::Check));
        assert_eq!(
            parse_command("delete"),
            Ok(Command::Delete { confirmed: false })
        );
        assert_eq!(
            parse_command("text The ___ is blue."),
            Ok(Command::Text("The ___ is blue.".to_string()))
        );
        assert_eq!(
            parse_command("answer 2 sky"),
            Ok(Command::EditAnswer {
                field: 1,
                value: "sky".to_string()
            })
        );
        assert_eq!(parse_command("- 1"), Ok(Command::RemoveField(0)));
        assert!(parse_command("0 x").is_err());
        assert!(parse_command("answer x y").is_err());
        assert!(parse_command("dance").is_err());
    }

    #[test]
    fn confirmation_accepts_only_yes() {
        assert!(is_yes(" Y "));
        assert!(is_yes("yes"));
        assert!(!is_yes(""));
        assert!(!is_yes("no"));
    }

    #[tokio::test]
    async fn empty_list_offers_only_adding() {
        let quiz = quiz_with(&[]).await;
        let screen = render(&quiz);
        assert!(screen.contains("add your first problem"));
        assert!(!screen.contains("Problem 1"));
    }

    #[tokio::test]
    async fn browsing_shows_blanks_and_results() {
        let mut quiz = quiz_with(&[("The capital of France is ___.", "Paris")]).await;
        assert_eq!(
            render(&quiz),
            "Problem 1 / 1\nThe capital of France is [1: ____].\n"
        );

        dispatch(&mut quiz, parse_command("1 paris").unwrap()).await;
        dispatch(&mut quiz, Command::Check).await;
        assert_eq!(
            render(&quiz),
            "Problem 1 / 1\nThe capital of France is [1: paris]✓.\nCorrect!\nAnswers: Paris\n"
        );

        dispatch(&mut quiz, parse_command("1 Paris.").unwrap()).await;
        let screen = render(&quiz);
        assert!(screen.contains("[1: Paris.]✗"));
        assert!(screen.contains("Check again."));
    }

    #[tokio::test]
    async fn editing_flow_reports_validation_errors() {
        let mut quiz = quiz_with(&[]).await;
        dispatch(&mut quiz, Command::Add).await;
        dispatch(&mut quiz, Command::Text("___ and ___".to_string())).await;
        dispatch(&mut quiz, parse_command("answer 1 salt").unwrap()).await;
        assert!(render(&quiz).starts_with("New problem"));

        let message = dispatch(&mut quiz, Command::Save).await.unwrap();
        assert!(message.contains("(2)") && message.contains("(1)"));

        dispatch(&mut quiz, Command::AddField).await;
        dispatch(&mut quiz, parse_command("answer 2 pepper").unwrap()).await;
        assert_eq!(dispatch(&mut quiz, Command::Save).await, None);
        assert!(render(&quiz).contains("[1: ____] and [2: ____]"));
    }

    #[tokio::test]
    async fn delete_needs_confirmation() {
        let mut quiz = quiz_with(&[("___", "a")]).await;
        assert_eq!(
            dispatch(&mut quiz, Command::Delete { confirmed: false }).await,
            None
        );
        assert_eq!(quiz.problems().len(), 1);

        let message = dispatch(&mut quiz, Command::Delete { confirmed: true }).await;
        assert_eq!(message.as_deref(), Some("Problem deleted."));
        assert_eq!(quiz.state(), &QuizState::Empty);
    }

    #[test]
    fn reload_failures_are_not_reported_as_failed_writes() {
        let message = failure(
            "Save failed",
            QuizError::Reload(PortError::Network("connection reset".to_string())),
        );
        assert!(!message.starts_with("Save failed"));
        assert!(message.contains("was saved"));
        assert!(message.contains("connection reset"));
    }
}
