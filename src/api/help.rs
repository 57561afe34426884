use log::{info, warn};
use rocket::{serde::json::Json, Route, State};

use crate::error::{Error, Result};
use crate::model::{
    api::GameQuestionView, common::hint::HintKind, mongodb::Id, store::Store,
};
use crate::Config;

/// How many times a hint is retried when other requests keep getting in first.
const SAVE_ATTEMPTS: usize = 3;

pub fn routes() -> Vec<Route> {
    routes![use_hint]
}

/// Apply a hint and return the question with its updated help state.
///
/// If another request records a hint on the same question between our load
/// and save, the question is reloaded and the hint applied again. A repeat of
/// the same hint then fails as already used.
#[post("/questions/<id>/help/<hint>")]
async fn use_hint(
    id: Id,
    hint: HintKind,
    store: &State<Store>,
    config: &State<Config>,
) -> Result<Json<GameQuestionView>> {
    let odds = config.hint_odds();
    let mut attempt = 1;
    loop {
        let mut question = store.load(id).await?;
        let loaded_help = question.help().clone();
        {
            let mut rng = rand::thread_rng();
            question.use_hint(hint, &odds, &mut rng)?;
        }
        match store.save(&question, &loaded_help).await {
            Ok(()) => {
                info!("Used {hint} on question {id}");
                return Ok(Json((&question).into()));
            }
            Err(Error::Conflict(_)) if attempt < SAVE_ATTEMPTS => {
                warn!("Retrying {hint} on question {id} (attempt {attempt})");
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use rocket::{
        http::{Status, StatusClass},
        local::asynchronous::Client,
    };

    use crate::model::{
        common::slot::SlotKey,
        db::GameQuestionCore,
        store::{GameQuestionStore, MemoryStore},
    };

    use super::*;

    async fn client_with_question(config: Config) -> (Client, Arc<MemoryStore>, Id) {
        let store = Arc::new(MemoryStore::new());
        let question = store.insert(GameQuestionCore::example()).await.unwrap();
        let rocket = crate::rocket_for_store(store.clone(), config);
        (Client::tracked(rocket).await.unwrap(), store, question.id)
    }

    async fn help(client: &Client, id: Id, hint: HintKind) -> (Status, Option<GameQuestionView>) {
        let response = client
            .post(format!("/questions/{id}/help/{hint}"))
            .dispatch()
            .await;
        let status = response.status();
        (status, response.into_json().await)
    }

    #[rocket::async_test]
    async fn fifty_fifty_then_others() {
        let (client, store, id) = client_with_question(Config::default()).await;

        let (status, view) = help(&client, id, HintKind::FiftyFifty).await;
        assert_eq!(Status::Ok, status);
        let kept = view.unwrap().help.fifty_fifty().unwrap();
        assert!(kept.contains(&SlotKey::B));

        let (status, view) = help(&client, id, HintKind::AudienceHelp).await;
        assert_eq!(Status::Ok, status);
        let view = view.unwrap();
        let voted: BTreeSet<SlotKey> = view.help.audience_help().unwrap().keys().copied().collect();
        assert_eq!(voted, BTreeSet::from(kept));

        let (status, view) = help(&client, id, HintKind::FriendCall).await;
        assert_eq!(Status::Ok, status);
        let view = view.unwrap();
        let message = view.help.friend_call().unwrap();
        assert!(kept
            .iter()
            .any(|key| message.ends_with(&key.as_str().to_uppercase())));

        // Everything was persisted.
        let stored = store.load(id).await.unwrap();
        assert_eq!(stored.help(), &view.help);
    }

    #[rocket::async_test]
    async fn hints_are_single_use() {
        let (client, store, id) = client_with_question(Config::default()).await;
        for hint in HintKind::ALL {
            let (status, _) = help(&client, id, hint).await;
            assert_eq!(Status::Ok, status);
        }
        let before = store.load(id).await.unwrap();
        for hint in HintKind::ALL {
            let (status, _) = help(&client, id, hint).await;
            assert_eq!(Status::UnprocessableEntity, status);
        }
        assert_eq!(store.load(id).await.unwrap(), before);
    }

    #[rocket::async_test]
    async fn overlapping_requests() {
        let (client, store, id) = client_with_question(Config::default()).await;

        // Two fifty-fifty requests racing: exactly one is recorded.
        let (first, second) = rocket::tokio::join!(
            help(&client, id, HintKind::FiftyFifty),
            help(&client, id, HintKind::FiftyFifty),
        );
        let mut statuses = [first.0, second.0];
        statuses.sort_by_key(|status| status.code);
        assert_eq!(statuses, [Status::Ok, Status::UnprocessableEntity]);
        let kept = [first.1, second.1]
            .into_iter()
            .flatten()
            .map(|view| view.help.fifty_fifty().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(kept.len(), 1);

        // Two different hints racing: both survive alongside the first.
        let (audience, friend) = rocket::tokio::join!(
            help(&client, id, HintKind::AudienceHelp),
            help(&client, id, HintKind::FriendCall),
        );
        assert_eq!(audience.0, Status::Ok);
        assert_eq!(friend.0, Status::Ok);

        let stored = store.load(id).await.unwrap();
        assert_eq!(stored.help().fifty_fifty(), Some(kept[0]));
        assert_eq!(stored.help().used().count(), 3);
    }

    #[rocket::async_test]
    async fn configured_odds_are_used() {
        let (client, _store, id) = client_with_question(Config::new(1.0, 1.0)).await;
        let (_, view) = help(&client, id, HintKind::FriendCall).await;
        let view = view.unwrap();
        assert!(view.help.friend_call().unwrap().ends_with("the answer is B"));
    }

    #[rocket::async_test]
    async fn unknown_hint() {
        let (client, _store, id) = client_with_question(Config::default()).await;
        let response = client
            .post(format!("/questions/{id}/help/ask_the_host"))
            .dispatch()
            .await;
        assert_eq!(StatusClass::ClientError, response.status().class());
    }

    #[rocket::async_test]
    async fn broken_question() {
        log4rs_test_utils::test_logging::init_logging_once_for(
            ["millionaire_backend"],
            None,
            None,
        );
        let store = Arc::new(MemoryStore::new());
        let question = store
            .insert(GameQuestionCore::broken_example())
            .await
            .unwrap();
        let rocket = crate::rocket_for_store(store.clone(), Config::default());
        let client = Client::tracked(rocket).await.unwrap();

        let (status, _) = help(&client, question.id, HintKind::FiftyFifty).await;
        assert_eq!(Status::InternalServerError, status);
        assert!(store.load(question.id).await.unwrap().help().is_empty());
    }
}
