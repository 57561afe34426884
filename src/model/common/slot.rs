use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use rand::{seq::SliceRandom, Rng};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::error::Error;

/// One of the four public answer labels shown to the player.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum SlotKey {
    A,
    B,
    C,
    D,
}

impl SlotKey {
    pub const ALL: [SlotKey; 4] = [SlotKey::A, SlotKey::B, SlotKey::C, SlotKey::D];

    /// The canonical (persisted) form of this key.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "a",
            Self::B => "b",
            Self::C => "c",
            Self::D => "d",
        }
    }

    /// Parse a key as found in storage, where it may have been written in
    /// symbolic or upper-case form (`:a`, `A`) as well as the literal form (`a`).
    pub fn from_stored(s: &str) -> Result<Self, Error> {
        s.strip_prefix(':').unwrap_or(s).to_ascii_lowercase().parse()
    }
}

impl Display for SlotKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SlotKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "a" => Ok(Self::A),
            "b" => Ok(Self::B),
            "c" => Ok(Self::C),
            "d" => Ok(Self::D),
            _ => Err(Error::InvalidKey(s.to_string())),
        }
    }
}

impl Serialize for SlotKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SlotKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        SlotKey::from_stored(&raw).map_err(de::Error::custom)
    }
}

#[derive(Debug, Error)]
#[error("answer position must be within 1..=4, got {0}")]
pub struct InvalidPosition(u8);

/// One of the four fixed answer positions of a question.
/// Position 1 always holds the correct answer.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Position(u8);

impl Position {
    pub const CORRECT: Position = Position(1);
    pub const ALL: [Position; 4] = [Position(1), Position(2), Position(3), Position(4)];

    pub fn get(self) -> u8 {
        self.0
    }

    /// Zero-based index into a question's answers.
    pub(crate) fn index(self) -> usize {
        usize::from(self.0 - 1)
    }
}

impl TryFrom<u8> for Position {
    type Error = InvalidPosition;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (1..=4).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidPosition(value))
        }
    }
}

impl From<Position> for u8 {
    fn from(position: Position) -> Self {
        position.0
    }
}

/// Assignment of the public slot keys onto the question's fixed positions.
///
/// A freshly drawn mapping is always a bijection. Mappings read back from
/// storage are kept verbatim even when they are not, so that a broken record
/// can be detected rather than silently repaired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotMapping {
    a: Position,
    b: Position,
    c: Position,
    d: Position,
}

impl SlotMapping {
    /// Draw a uniformly random permutation.
    pub fn shuffled(rng: &mut impl Rng) -> Self {
        let mut positions = Position::ALL;
        positions.shuffle(rng);
        Self::from_positions(positions)
    }

    /// Build a mapping from the positions assigned to `a`, `b`, `c` and `d`, in that order.
    pub fn from_positions([a, b, c, d]: [Position; 4]) -> Self {
        Self { a, b, c, d }
    }

    pub fn position(&self, key: SlotKey) -> Position {
        match key {
            SlotKey::A => self.a,
            SlotKey::B => self.b,
            SlotKey::C => self.c,
            SlotKey::D => self.d,
        }
    }

    /// The key assigned to the given position, if any.
    pub fn key_for(&self, position: Position) -> Option<SlotKey> {
        self.iter()
            .find(|(_, assigned)| *assigned == position)
            .map(|(key, _)| key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotKey, Position)> + '_ {
        SlotKey::ALL.into_iter().map(|key| (key, self.position(key)))
    }

    /// True iff every position is assigned to exactly one key.
    pub fn is_bijective(&self) -> bool {
        self.iter()
            .map(|(_, position)| position)
            .collect::<BTreeSet<_>>()
            .len()
            == Position::ALL.len()
    }
}
