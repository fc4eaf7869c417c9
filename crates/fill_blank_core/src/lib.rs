pub mod domain;
pub mod memory;
pub mod ports;
pub mod quiz;
pub mod validation;

pub use domain::{parse_problem_id, Problem, ProblemInput};
pub use memory::InMemoryProblemRepository;
pub use ports::{PortError, PortResult, ProblemRepository};
pub use quiz::{EditForm, EditMode, Grade, QuizController, QuizError, QuizState};
pub use validation::{
    count_blanks, is_correct, split_segments, validate_problem, ValidationError, BLANK_MARKER,
};
