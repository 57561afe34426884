use std::sync::Arc;

use log::{error, info};
use mongodb::Client as MongoClient;
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::model::{
    common::hint::HintOdds,
    mongodb::ensure_indexes_exist,
    store::{MongoStore, Store},
};

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_friend_accuracy")]
    friend_accuracy: f64,
    #[serde(default = "default_audience_accuracy")]
    audience_accuracy: f64,
}

impl Config {
    pub fn new(friend_accuracy: f64, audience_accuracy: f64) -> Self {
        Self {
            friend_accuracy,
            audience_accuracy,
        }
    }

    /// How often the friend and the audience point at the correct answer.
    /// Configured via `FRIEND_ACCURACY` and `AUDIENCE_ACCURACY`.
    pub fn hint_odds(&self) -> HintOdds {
        HintOdds::new(self.friend_accuracy, self.audience_accuracy)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(default_friend_accuracy(), default_audience_accuracy())
    }
}

fn default_friend_accuracy() -> f64 {
    HintOdds::DEFAULT_FRIEND_ACCURACY
}

fn default_audience_accuracy() -> f64 {
    HintOdds::DEFAULT_AUDIENCE_ACCURACY
}

/// A fairing that loads the application config and puts it in managed state.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        info!("Hint odds: {:?}", config.hint_odds());

        // Manage the state.
        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// Configuration for the database.
#[derive(Deserialize)]
struct DbConfig {
    // secrets
    db_uri: String,
}

/// A fairing that loads the MongoDB config, connects to the database,
/// ensures the indexes exist, and places the `Client` and the game question
/// [`Store`] into managed state.
pub struct DatabaseFairing;

#[rocket::async_trait]
impl Fairing for DatabaseFairing {
    fn info(&self) -> Info {
        Info {
            name: "MongoDB",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<DbConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load database config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        info!("Loaded database config, connecting...");
        // Construct the connection.
        let client = match MongoClient::with_uri_str(config.db_uri).await {
            Ok(client) => client,
            Err(e) => {
                error!("Failed to connect to database: {e}");
                return Err(rocket);
            }
        };
        let db = client.database(&get_database_name());

        // Ensure the required indexes exist.
        if let Err(e) = ensure_indexes_exist(&db).await {
            error!("Failed to connect to database: {e}");
            return Err(rocket);
        }
        info!("...database connection online!");

        // Manage the state.
        let store: Store = Arc::new(MongoStore::from_db(&db));
        rocket = rocket.manage(client).manage(store);
        Ok(rocket)
    }
}

/// Get the name of the database to use (production version).
#[cfg(not(test))]
fn get_database_name() -> String {
    "millionaire".to_string()
}

/// Get the name of the database to use (test version).
/// Use a random name to avoid collisions between tests.
#[cfg(test)]
fn get_database_name() -> String {
    let random: u32 = rand::random();
    let db = format!("test{random}");
    info!("Using database {db}");
    db
}

#[cfg(test)]
mod tests {
    use rocket::figment::{providers::Serialized, Figment};

    use super::*;

    #[test]
    fn odds_default_when_unset() {
        let config: Config = Figment::new().extract().unwrap();
        assert_eq!(config.hint_odds(), HintOdds::default());
    }

    #[test]
    fn odds_from_figment() {
        let figment = Figment::new()
            .merge(Serialized::default("friend_accuracy", 0.5))
            .merge(Serialized::default("audience_accuracy", 3.0));
        let config: Config = figment.extract().unwrap();
        let odds = config.hint_odds();
        assert_eq!(odds.friend_accuracy(), 0.5);
        assert_eq!(odds.audience_accuracy(), 1.0);
    }
}
