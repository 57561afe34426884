//! API-friendly types.

mod game_question;
pub use game_question::{AnswerOutcome, AnswerRequest, GameQuestionView, NewGameQuestionSpec};
