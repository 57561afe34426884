use std::ops::Deref;

use log::debug;
use mongodb::{bson::doc, error::Error as DbError, Collection, Database, IndexModel};

use crate::model::db::{GameQuestion, NewGameQuestion};

/// A type that can be directly inserted/read to/from the database.
pub trait MongoCollection {
    /// The name of the collection.
    const NAME: &'static str;
}

/// A database collection of the given type.
pub struct Coll<T>(Collection<T>);

impl<T> Coll<T>
where
    T: MongoCollection,
{
    /// Get a handle on this collection in the given database.
    pub fn from_db(db: &Database) -> Self {
        Self(db.collection(T::NAME))
    }
}

// `Derive(Clone)` would only derive if `T: Clone`, but we don't need that bound.
impl<T> Clone for Coll<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Deref for Coll<T> {
    type Target = Collection<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

// Game question collections
const GAME_QUESTIONS: &str = "game_questions";
impl MongoCollection for GameQuestion {
    const NAME: &'static str = GAME_QUESTIONS;
}
impl MongoCollection for NewGameQuestion {
    const NAME: &'static str = GAME_QUESTIONS;
}

/// Ensure that all the required indexes exist on the given database.
///
/// This operation is idempotent.
pub async fn ensure_indexes_exist(db: &Database) -> Result<(), DbError> {
    debug!("Ensuring collection indexes exist");

    // Questions are looked up and archived by their owning game.
    let game_index = IndexModel::builder().keys(doc! {"game_id": 1}).build();
    Coll::<GameQuestion>::from_db(db)
        .create_index(game_index, None)
        .await?;

    Ok(())
}
