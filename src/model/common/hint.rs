use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use rocket::request::FromParam;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{Error, Result};

use super::slot::SlotKey;

/// The three single-use hints a player can ask for.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HintKind {
    FiftyFifty,
    AudienceHelp,
    FriendCall,
}

impl HintKind {
    pub const ALL: [HintKind; 3] = [Self::FiftyFifty, Self::AudienceHelp, Self::FriendCall];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::FiftyFifty => "fifty_fifty",
            Self::AudienceHelp => "audience_help",
            Self::FriendCall => "friend_call",
        }
    }
}

impl Display for HintKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown hint: {0}")]
pub struct UnknownHint(String);

impl FromStr for HintKind {
    type Err = UnknownHint;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownHint(s.to_string()))
    }
}

impl<'a> FromParam<'a> for HintKind {
    type Error = UnknownHint;

    fn from_param(param: &'a str) -> std::result::Result<Self, Self::Error> {
        param.parse()
    }
}

/// The outcome of a single hint, tagged by the hint that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HintResult {
    /// The two keys left standing; always contains the correct key.
    FiftyFifty([SlotKey; 2]),
    /// Audience votes per eligible key, in percentage points summing to 100.
    AudienceHelp(BTreeMap<SlotKey, u8>),
    /// What the friend said on the phone.
    FriendCall(String),
}

impl HintResult {
    pub fn kind(&self) -> HintKind {
        match self {
            Self::FiftyFifty(_) => HintKind::FiftyFifty,
            Self::AudienceHelp(_) => HintKind::AudienceHelp,
            Self::FriendCall(_) => HintKind::FriendCall,
        }
    }
}

/// Results of the hints used so far on one game question.
///
/// Persisted as a map from hint name to payload. Entries are only ever added.
/// Older records may spell the hint names in symbolic form (`:fifty_fifty`),
/// which is accepted on load and rewritten in the literal form on save.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HelpState {
    #[serde(alias = ":fifty_fifty", skip_serializing_if = "Option::is_none")]
    fifty_fifty: Option<[SlotKey; 2]>,
    #[serde(alias = ":audience_help", skip_serializing_if = "Option::is_none")]
    audience_help: Option<BTreeMap<SlotKey, u8>>,
    #[serde(alias = ":friend_call", skip_serializing_if = "Option::is_none")]
    friend_call: Option<String>,
}

impl HelpState {
    pub fn is_empty(&self) -> bool {
        self.used().next().is_none()
    }

    pub fn contains(&self, kind: HintKind) -> bool {
        match kind {
            HintKind::FiftyFifty => self.fifty_fifty.is_some(),
            HintKind::AudienceHelp => self.audience_help.is_some(),
            HintKind::FriendCall => self.friend_call.is_some(),
        }
    }

    /// The hints used so far.
    pub fn used(&self) -> impl Iterator<Item = HintKind> + '_ {
        HintKind::ALL.into_iter().filter(|kind| self.contains(*kind))
    }

    pub fn get(&self, kind: HintKind) -> Option<HintResult> {
        match kind {
            HintKind::FiftyFifty => self.fifty_fifty.map(HintResult::FiftyFifty),
            HintKind::AudienceHelp => self.audience_help.clone().map(HintResult::AudienceHelp),
            HintKind::FriendCall => self.friend_call.clone().map(HintResult::FriendCall),
        }
    }

    pub fn fifty_fifty(&self) -> Option<[SlotKey; 2]> {
        self.fifty_fifty
    }

    pub fn audience_help(&self) -> Option<&BTreeMap<SlotKey, u8>> {
        self.audience_help.as_ref()
    }

    pub fn friend_call(&self) -> Option<&str> {
        self.friend_call.as_deref()
    }

    /// Fail with [`Error::HintAlreadyUsed`] if `kind` has a recorded result.
    pub fn ensure_unused(&self, kind: HintKind) -> Result<()> {
        if self.contains(kind) {
            Err(Error::HintAlreadyUsed(kind))
        } else {
            Ok(())
        }
    }

    /// Record a hint result. Each hint can be recorded once.
    pub fn insert(&mut self, result: HintResult) -> Result<()> {
        self.ensure_unused(result.kind())?;
        match result {
            HintResult::FiftyFifty(mut keys) => {
                keys.sort();
                self.fifty_fifty = Some(keys);
            }
            HintResult::AudienceHelp(votes) => self.audience_help = Some(votes),
            HintResult::FriendCall(message) => self.friend_call = Some(message),
        }
        Ok(())
    }
}

/// How far the audience and the friend can be trusted.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct HintOdds {
    friend_accuracy: f64,
    audience_accuracy: f64,
}

impl HintOdds {
    pub const DEFAULT_FRIEND_ACCURACY: f64 = 0.8;
    pub const DEFAULT_AUDIENCE_ACCURACY: f64 = 0.85;

    /// Both values are probabilities; anything outside `0.0..=1.0` is clamped
    /// and NaN falls back to the default.
    pub fn new(friend_accuracy: f64, audience_accuracy: f64) -> Self {
        Self {
            friend_accuracy: probability(friend_accuracy, Self::DEFAULT_FRIEND_ACCURACY),
            audience_accuracy: probability(audience_accuracy, Self::DEFAULT_AUDIENCE_ACCURACY),
        }
    }

    /// Probability that the friend names the correct key.
    pub fn friend_accuracy(&self) -> f64 {
        self.friend_accuracy
    }

    /// Probability that the audience favours the correct key.
    pub fn audience_accuracy(&self) -> f64 {
        self.audience_accuracy
    }
}

impl Default for HintOdds {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_FRIEND_ACCURACY,
            Self::DEFAULT_AUDIENCE_ACCURACY,
        )
    }
}

fn probability(value: f64, fallback: f64) -> f64 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use rocket::serde::json::{json, serde_json};

    use super::*;

    #[test]
    fn hint_names() {
        for kind in HintKind::ALL {
            assert_eq!(kind.as_str().parse::<HintKind>().unwrap(), kind);
            assert_eq!(
                serde_json::to_value(kind).unwrap(),
                json!(kind.as_str())
            );
        }
        assert!("fiftyFifty".parse::<HintKind>().is_err());
        assert!(HintKind::from_param("phone_a_friend").is_err());
    }

    #[test]
    fn each_hint_recorded_once() {
        let mut help = HelpState::default();
        assert!(help.is_empty());

        help.insert(HintResult::FiftyFifty([SlotKey::D, SlotKey::A]))
            .unwrap();
        assert_eq!(help.fifty_fifty(), Some([SlotKey::A, SlotKey::D]));
        assert!(help.contains(HintKind::FiftyFifty));
        assert!(!help.contains(HintKind::FriendCall));

        let again = help.insert(HintResult::FiftyFifty([SlotKey::B, SlotKey::C]));
        assert!(matches!(again, Err(Error::HintAlreadyUsed(HintKind::FiftyFifty))));
        assert_eq!(help.fifty_fifty(), Some([SlotKey::A, SlotKey::D]));

        help.insert(HintResult::FriendCall("Bob thinks the answer is A".into()))
            .unwrap();
        assert_eq!(
            help.used().collect::<Vec<_>>(),
            vec![HintKind::FiftyFifty, HintKind::FriendCall]
        );
        assert_eq!(
            help.get(HintKind::FriendCall),
            Some(HintResult::FriendCall("Bob thinks the answer is A".into()))
        );
        assert_eq!(help.get(HintKind::AudienceHelp), None);
    }

    #[test]
    fn canonical_form_is_literal() {
        let mut help = HelpState::default();
        help.insert(HintResult::AudienceHelp(BTreeMap::from([
            (SlotKey::A, 60),
            (SlotKey::B, 40),
        ])))
        .unwrap();

        assert_eq!(
            serde_json::to_value(&help).unwrap(),
            json!({ "audience_help": { "a": 60, "b": 40 } })
        );
        assert_eq!(serde_json::to_value(HelpState::default()).unwrap(), json!({}));
    }

    #[test]
    fn symbolic_form_is_normalised() {
        let stored = json!({
            ":fifty_fifty": [":b", "c"],
            "audience_help": { ":b": 70, "c": 30 },
            ":friend_call": "Bob thinks the answer is B",
        });
        let help: HelpState = serde_json::from_value(stored).unwrap();

        assert_eq!(help.fifty_fifty(), Some([SlotKey::B, SlotKey::C]));
        assert_eq!(help.audience_help().unwrap()[&SlotKey::B], 70);
        assert_eq!(help.friend_call(), Some("Bob thinks the answer is B"));
        assert_eq!(
            serde_json::to_value(&help).unwrap(),
            json!({
                "fifty_fifty": ["b", "c"],
                "audience_help": { "b": 70, "c": 30 },
                "friend_call": "Bob thinks the answer is B",
            })
        );
    }

    #[test]
    fn odds_are_probabilities() {
        let odds = HintOdds::new(1.5, -0.2);
        assert_eq!(odds.friend_accuracy(), 1.0);
        assert_eq!(odds.audience_accuracy(), 0.0);

        let odds = HintOdds::new(f64::NAN, 0.5);
        assert_eq!(odds.friend_accuracy(), HintOdds::DEFAULT_FRIEND_ACCURACY);
        assert_eq!(odds.audience_accuracy(), 0.5);
    }
}
