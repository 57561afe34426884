use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{
    common::{hint::HelpState, slot::SlotKey},
    db::{GameQuestion, Question},
};

/// What the player gets to see of a game question.
/// Never carries the correct key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameQuestionView {
    pub id: String,
    pub game_id: String,
    pub text: String,
    pub level: u32,
    pub variants: BTreeMap<SlotKey, String>,
    pub help: HelpState,
}

impl From<&GameQuestion> for GameQuestionView {
    fn from(question: &GameQuestion) -> Self {
        Self {
            id: question.id.to_string(),
            game_id: question.game_id.to_string(),
            text: question.text().to_string(),
            level: question.level(),
            variants: question
                .variants()
                .into_iter()
                .map(|(key, text)| (key, text.to_string()))
                .collect(),
            help: question.help().clone(),
        }
    }
}

/// A question to be asked in a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGameQuestionSpec {
    pub text: String,
    pub level: u32,
    /// The correct answer first, then the three wrong ones.
    pub answers: [String; 4],
}

impl From<NewGameQuestionSpec> for Question {
    fn from(spec: NewGameQuestionSpec) -> Self {
        Question::new(spec.text, spec.level, spec.answers)
    }
}

/// The player's pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRequest {
    /// Left as a raw string so that bad keys are reported as such.
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOutcome {
    pub correct: bool,
    /// Absent only for a broken record.
    pub correct_key: Option<SlotKey>,
}
