use std::sync::Arc;

use log::info;
use rocket::{serde::json::Json, Route, State};

use crate::error::Result;
use crate::model::{
    api::{AnswerOutcome, AnswerRequest, GameQuestionView, NewGameQuestionSpec},
    db::NewGameQuestion,
    mongodb::Id,
    store::Store,
};

pub fn routes() -> Vec<Route> {
    routes![create_question, get_question, answer_question, archive_game_questions]
}

#[post("/games/<game_id>/questions", data = "<spec>", format = "json")]
async fn create_question(
    game_id: Id,
    spec: Json<NewGameQuestionSpec>,
    store: &State<Store>,
) -> Result<Json<GameQuestionView>> {
    // The scoped block is needed to force `rng` to be dropped before the next `await`.
    let new_question = {
        let mut rng = rand::thread_rng();
        NewGameQuestion::new(game_id, Arc::new(spec.0.into()), &mut rng)
    };
    let question = store.insert(new_question).await?;
    Ok(Json((&question).into()))
}

#[get("/questions/<id>")]
async fn get_question(id: Id, store: &State<Store>) -> Result<Json<GameQuestionView>> {
    let question = store.load(id).await?;
    Ok(Json((&question).into()))
}

#[post("/questions/<id>/answer", data = "<answer>", format = "json")]
async fn answer_question(
    id: Id,
    answer: Json<AnswerRequest>,
    store: &State<Store>,
) -> Result<Json<AnswerOutcome>> {
    let question = store.load(id).await?;
    let correct = question.answer_correct(&answer.key)?;
    info!(
        "Answer '{}' to question {id} is {}",
        answer.key,
        if correct { "right" } else { "wrong" }
    );
    Ok(Json(AnswerOutcome {
        correct,
        correct_key: question.correct_answer_key(),
    }))
}

#[delete("/games/<game_id>/questions")]
async fn archive_game_questions(game_id: Id, store: &State<Store>) -> Result<Json<u64>> {
    let deleted = store.delete_for_game(game_id).await?;
    Ok(Json(deleted))
}
