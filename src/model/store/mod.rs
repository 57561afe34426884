//! Loading and saving game questions.
//!
//! Route handlers only ever see a [`Store`]. Production uses [`MongoStore`];
//! [`MemoryStore`] keeps documents in memory and is what the tests run against.

use std::sync::Arc;

use log::warn;

use crate::error::{Error, Result};
use crate::model::{
    common::hint::HelpState,
    db::{GameQuestion, NewGameQuestion},
    mongodb::Id,
};

mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// Persistence for game questions.
///
/// Every operation is a single round trip. Concurrent load-mutate-save cycles
/// on one question are resolved by [`GameQuestionStore::save`], which refuses
/// to overwrite hints it was not shown.
#[rocket::async_trait]
pub trait GameQuestionStore: Send + Sync {
    /// Store a new game question, assigning it an ID.
    async fn insert(&self, question: NewGameQuestion) -> Result<GameQuestion>;

    /// Fetch a game question, failing with a not-found error if it doesn't exist.
    async fn load(&self, id: Id) -> Result<GameQuestion>;

    /// Overwrite a previously inserted game question.
    ///
    /// `loaded_help` is the help state the question had when it was loaded.
    /// If the stored question has since recorded any hint missing from it,
    /// nothing is written and [`Error::Conflict`] is returned.
    async fn save(&self, question: &GameQuestion, loaded_help: &HelpState) -> Result<()>;

    /// Remove every question belonging to the given game, returning how many went.
    async fn delete_for_game(&self, game_id: Id) -> Result<u64>;
}

/// The store as held in managed state.
pub type Store = Arc<dyn GameQuestionStore>;

/// Log records whose slot mapping or hint results cannot be trusted.
fn check_loaded(question: &GameQuestion) {
    if !question.slots().is_bijective() {
        warn!(
            "Game question {} has a malformed slot mapping: {:?}",
            question.id,
            question.slots()
        );
    }
    if !question.fifty_fifty_is_consistent() {
        warn!(
            "Game question {} has a malformed fifty-fifty result: {:?}",
            question.id,
            question.help().fifty_fifty()
        );
    }
}

/// Has nothing been recorded in `stored` beyond what `loaded` already had?
fn unchanged_since(stored: &HelpState, loaded: &HelpState) -> bool {
    stored.used().all(|kind| loaded.contains(kind))
}

fn not_found(id: Id) -> Error {
    Error::not_found(format!("Game question with ID '{id}'"))
}

fn conflict(id: Id) -> Error {
    warn!("Refusing to overwrite hints recorded concurrently on game question {id}");
    Error::Conflict(format!("Game question with ID '{id}'"))
}
