use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::info;
use mongodb::bson::{self, Document};

use crate::error::Result;
use crate::model::{
    common::hint::HelpState,
    db::{GameQuestion, NewGameQuestion},
    mongodb::Id,
};

use super::{check_loaded, conflict, not_found, unchanged_since, GameQuestionStore};

/// Game questions held in memory as BSON documents.
///
/// Documents go through the same serialisation as the MongoDB store, so what
/// comes back out of [`MemoryStore::load`] is exactly what a database would
/// have returned.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<Id, Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a raw document under the given ID, bypassing serialisation.
    pub fn insert_document(&self, id: Id, document: Document) {
        self.documents().insert(id, document);
    }

    pub fn len(&self) -> usize {
        self.documents().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn documents(&self) -> MutexGuard<'_, HashMap<Id, Document>> {
        // A panic mid-update cannot leave a half-written document behind.
        self.documents.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[rocket::async_trait]
impl GameQuestionStore for MemoryStore {
    async fn insert(&self, question: NewGameQuestion) -> Result<GameQuestion> {
        let question = GameQuestion {
            id: Id::new(),
            question,
        };
        let document = bson::to_document(&question)?;
        self.documents().insert(question.id, document);
        info!("Created game question {} for game {}", question.id, question.game_id);
        Ok(question)
    }

    async fn load(&self, id: Id) -> Result<GameQuestion> {
        let document = self.documents().get(&id).cloned().ok_or_else(|| not_found(id))?;
        let question: GameQuestion = bson::from_document(document)?;
        check_loaded(&question);
        Ok(question)
    }

    async fn save(&self, question: &GameQuestion, loaded_help: &HelpState) -> Result<()> {
        let document = bson::to_document(question)?;
        // Hold the lock across the check and the write.
        let mut documents = self.documents();
        let existing = documents
            .get_mut(&question.id)
            .ok_or_else(|| not_found(question.id))?;
        let stored: GameQuestion = bson::from_document(existing.clone())?;
        if !unchanged_since(stored.help(), loaded_help) {
            return Err(conflict(question.id));
        }
        *existing = document;
        Ok(())
    }

    async fn delete_for_game(&self, game_id: Id) -> Result<u64> {
        let mut documents = self.documents();
        let before = documents.len();
        documents.retain(|_, document| {
            document.get_object_id("game_id").ok() != Some(game_id.into())
        });
        let deleted = (before - documents.len()) as u64;
        info!("Archived {deleted} question(s) of game {game_id}");
        Ok(deleted)
    }
}
