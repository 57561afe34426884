//! DB-compatible (e.g. de/serialisable) types.
//!
//! The types in this module are serialised in a DB-friendly way, e.g.:
//!
//! - IDs are serialised in MongoDB's own format.
//! - Slot keys and hint names are written in their canonical literal form.

mod game_question;
pub use game_question::{GameQuestion, GameQuestionCore, NewGameQuestion};

mod question;
pub use question::Question;
