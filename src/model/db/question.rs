use serde::{Deserialize, Serialize};

use crate::model::common::slot::Position;

/// A question from the question bank. Read-only once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Question text.
    pub text: String,
    /// Difficulty level.
    pub level: u32,
    /// Answer texts by position; the first one is correct.
    answers: [String; 4],
}

impl Question {
    pub fn new(text: String, level: u32, answers: [String; 4]) -> Self {
        Self {
            text,
            level,
            answers,
        }
    }

    /// The answer text at the given position.
    pub fn answer(&self, position: Position) -> &str {
        &self.answers[position.index()]
    }

    pub fn correct_answer(&self) -> &str {
        self.answer(Position::CORRECT)
    }

    pub fn answers(&self) -> &[String; 4] {
        &self.answers
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl Question {
        pub fn example() -> Self {
            Self::new(
                "Which planet is closest to the Sun?".to_string(),
                3,
                [
                    "Mercury".to_string(),
                    "Venus".to_string(),
                    "Mars".to_string(),
                    "Earth".to_string(),
                ],
            )
        }
    }
}
