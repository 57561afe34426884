use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use log::{debug, error};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    common::{
        generator,
        hint::{HelpState, HintKind, HintOdds, HintResult},
        slot::{Position, SlotKey, SlotMapping},
    },
    mongodb::Id,
};

use super::Question;

/// Core game question data, as stored in the database.
///
/// Wraps a bank [`Question`] for one particular game: the question's answers
/// are dealt onto the public slot keys by a permutation drawn once at creation,
/// and the results of any hints the player used are kept alongside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameQuestionCore {
    /// The game this question was asked in.
    pub game_id: Id,
    /// The underlying question. Shared, never modified.
    question: Arc<Question>,
    /// Which answer position sits behind each slot key.
    slots: SlotMapping,
    /// Results of the hints used so far.
    #[serde(default)]
    help: HelpState,
}

impl GameQuestionCore {
    /// Create a game question with a freshly shuffled slot mapping.
    pub fn new(game_id: Id, question: Arc<Question>, rng: &mut impl Rng) -> Self {
        Self::with_slots(game_id, question, SlotMapping::shuffled(rng))
    }

    /// Create a game question with a known slot mapping.
    pub fn with_slots(game_id: Id, question: Arc<Question>, slots: SlotMapping) -> Self {
        Self {
            game_id,
            question,
            slots,
            help: HelpState::default(),
        }
    }

    pub fn question(&self) -> &Arc<Question> {
        &self.question
    }

    pub fn slots(&self) -> &SlotMapping {
        &self.slots
    }

    pub fn help(&self) -> &HelpState {
        &self.help
    }

    pub fn text(&self) -> &str {
        &self.question.text
    }

    pub fn level(&self) -> u32 {
        self.question.level
    }

    /// The answer text shown under each slot key.
    pub fn variants(&self) -> BTreeMap<SlotKey, &str> {
        self.slots
            .iter()
            .map(|(key, position)| (key, self.question.answer(position)))
            .collect()
    }

    /// Does the given slot key hold the correct answer?
    pub fn answer_correct(&self, key: &str) -> Result<bool> {
        let key: SlotKey = key.parse()?;
        Ok(self.slots.position(key) == Position::CORRECT)
    }

    /// The slot key holding the correct answer.
    ///
    /// `None` means the stored slot mapping never assigns the correct
    /// position, i.e. the record is broken.
    pub fn correct_answer_key(&self) -> Option<SlotKey> {
        self.slots.key_for(Position::CORRECT)
    }

    /// The keys a hint may reason about: all four, or the two left standing
    /// after a fifty-fifty.
    pub fn eligible_keys(&self) -> Vec<SlotKey> {
        match self.help.fifty_fifty() {
            Some(kept) => kept.to_vec(),
            None => SlotKey::ALL.to_vec(),
        }
    }

    /// Does a recorded fifty-fifty keep the correct key and one other key?
    ///
    /// Trivially true when no fifty-fifty was used or the mapping has no
    /// correct key to compare against.
    pub fn fifty_fifty_is_consistent(&self) -> bool {
        match (self.help.fifty_fifty(), self.correct_answer_key()) {
            (Some([first, second]), Some(correct)) => {
                first != second && (first == correct || second == correct)
            }
            _ => true,
        }
    }

    /// Remove two wrong answers, keeping the correct one and a random decoy.
    pub fn add_fifty_fifty(&mut self, rng: &mut impl Rng) -> Result<[SlotKey; 2]> {
        self.help.ensure_unused(HintKind::FiftyFifty)?;
        let (eligible, correct) = self.hint_inputs()?;
        let kept = generator::fifty_fifty(&eligible, correct, rng)
            .ok_or_else(|| Error::Integrity("no decoy left for fifty-fifty".to_string()))?;
        debug!("Fifty-fifty kept {} and {}", kept[0], kept[1]);
        self.help.insert(HintResult::FiftyFifty(kept))?;
        Ok(kept)
    }

    /// Poll the audience over the eligible keys.
    pub fn add_audience_help(
        &mut self,
        odds: &HintOdds,
        rng: &mut impl Rng,
    ) -> Result<BTreeMap<SlotKey, u8>> {
        self.help.ensure_unused(HintKind::AudienceHelp)?;
        let (eligible, correct) = self.hint_inputs()?;
        let votes = generator::audience_votes(&eligible, correct, odds, rng);
        debug!("Audience voted {votes:?}");
        self.help.insert(HintResult::AudienceHelp(votes.clone()))?;
        Ok(votes)
    }

    /// Phone a friend, who names one of the eligible keys.
    pub fn add_friend_call(&mut self, odds: &HintOdds, rng: &mut impl Rng) -> Result<String> {
        self.help.ensure_unused(HintKind::FriendCall)?;
        let (eligible, correct) = self.hint_inputs()?;
        let (named, message) = generator::friend_call(&eligible, correct, odds, rng);
        debug!("Friend named {named}");
        self.help.insert(HintResult::FriendCall(message.clone()))?;
        Ok(message)
    }

    /// Apply the named hint.
    pub fn use_hint(&mut self, kind: HintKind, odds: &HintOdds, rng: &mut impl Rng) -> Result<()> {
        match kind {
            HintKind::FiftyFifty => self.add_fifty_fifty(rng).map(|_| ()),
            HintKind::AudienceHelp => self.add_audience_help(odds, rng).map(|_| ()),
            HintKind::FriendCall => self.add_friend_call(odds, rng).map(|_| ()),
        }
    }

    /// The keys a hint may consider and the correct key among them.
    fn hint_inputs(&self) -> Result<(Vec<SlotKey>, SlotKey)> {
        let correct = self.correct_answer_key().ok_or_else(|| {
            error!("Slot mapping {:?} has no correct key", self.slots);
            Error::Integrity("slot mapping has no correct key".to_string())
        })?;
        if !self.fifty_fifty_is_consistent() {
            error!(
                "Fifty-fifty result {:?} does not keep {correct} and one other key",
                self.help.fifty_fifty()
            );
            return Err(Error::Integrity(
                "fifty-fifty result does not keep the correct key".to_string(),
            ));
        }
        Ok((self.eligible_keys(), correct))
    }
}

/// A game question without an ID.
pub type NewGameQuestion = GameQuestionCore;

/// A game question from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameQuestion {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub question: GameQuestionCore,
}

impl Deref for GameQuestion {
    type Target = GameQuestionCore;

    fn deref(&self) -> &Self::Target {
        &self.question
    }
}

impl DerefMut for GameQuestion {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.question
    }
}
