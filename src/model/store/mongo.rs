use log::info;
use mongodb::{
    bson::{doc, Document},
    Database,
};

use crate::error::{Error, Result};
use crate::model::{
    common::hint::{HelpState, HintKind},
    db::{GameQuestion, NewGameQuestion},
    mongodb::{Coll, Id},
};

use super::{check_loaded, conflict, not_found, GameQuestionStore};

/// Game questions kept in the `game_questions` collection.
#[derive(Clone)]
pub struct MongoStore {
    questions: Coll<GameQuestion>,
    new_questions: Coll<NewGameQuestion>,
}

impl MongoStore {
    pub fn from_db(db: &Database) -> Self {
        Self {
            questions: Coll::from_db(db),
            new_questions: Coll::from_db(db),
        }
    }
}

#[rocket::async_trait]
impl GameQuestionStore for MongoStore {
    async fn insert(&self, question: NewGameQuestion) -> Result<GameQuestion> {
        let id: Id = self
            .new_questions
            .insert_one(&question, None)
            .await?
            .inserted_id
            .as_object_id()
            .ok_or_else(|| Error::Integrity("inserted ID is not an ObjectId".to_string()))?
            .into();
        info!("Created game question {id} for game {}", question.game_id);
        Ok(GameQuestion { id, question })
    }

    async fn load(&self, id: Id) -> Result<GameQuestion> {
        let question = self
            .questions
            .find_one(id.as_doc(), None)
            .await?
            .ok_or_else(|| not_found(id))?;
        check_loaded(&question);
        Ok(question)
    }

    async fn save(&self, question: &GameQuestion, loaded_help: &HelpState) -> Result<()> {
        let filter = unchanged_filter(question.id, loaded_help);
        let result = self.questions.replace_one(filter, question, None).await?;
        if result.matched_count == 0 {
            // Either the question is gone, or another request recorded a hint first.
            return match self.questions.find_one(question.id.as_doc(), None).await? {
                Some(_) => Err(conflict(question.id)),
                None => Err(not_found(question.id)),
            };
        }
        Ok(())
    }

    async fn delete_for_game(&self, game_id: Id) -> Result<u64> {
        let filter = doc! { "game_id": *game_id };
        let result = self.questions.delete_many(filter, None).await?;
        info!(
            "Archived {} question(s) of game {game_id}",
            result.deleted_count
        );
        Ok(result.deleted_count)
    }
}

/// Match the question only while every hint missing from `loaded_help` is
/// still missing from the stored document, in either spelling.
fn unchanged_filter(id: Id, loaded_help: &HelpState) -> Document {
    let mut filter = id.as_doc();
    for kind in HintKind::ALL.into_iter().filter(|kind| !loaded_help.contains(*kind)) {
        for field in [format!("help.{kind}"), format!("help.:{kind}")] {
            filter.insert(field, doc! { "$exists": false });
        }
    }
    filter
}
