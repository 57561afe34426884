//! Random generation of hint results.
//!
//! Every generator works on the keys a hint is allowed to consider and the
//! key that holds the correct answer, and never looks at the question itself.

use std::collections::BTreeMap;

use rand::{
    seq::{IteratorRandom, SliceRandom},
    Rng,
};

use super::{hint::HintOdds, slot::SlotKey};

/// Friends the player may phone.
const FRIENDS: [&str; 6] = [
    "Vasily Petrovich",
    "Your old maths teacher",
    "Grandma Olga",
    "Your neighbour Sam",
    "Professor Hartley",
    "Your cousin Mira",
];

/// Keep the correct key plus one decoy drawn uniformly from the other eligible keys.
///
/// Returns `None` if there is no decoy to keep, which cannot happen while all
/// four keys are eligible.
pub fn fifty_fifty(
    eligible: &[SlotKey],
    correct: SlotKey,
    rng: &mut impl Rng,
) -> Option<[SlotKey; 2]> {
    let decoy = decoys(eligible, correct).choose(rng)?;
    let mut kept = [correct, decoy];
    kept.sort();
    Some(kept)
}

/// Spread 100 percentage points over the eligible keys.
///
/// The audience usually rallies behind the correct key, but with probability
/// `1 - audience_accuracy` it rallies behind a decoy instead. The favourite
/// always gets strictly more votes than any other key.
pub fn audience_votes(
    eligible: &[SlotKey],
    correct: SlotKey,
    odds: &HintOdds,
    rng: &mut impl Rng,
) -> BTreeMap<SlotKey, u8> {
    let favourite = if rng.gen_bool(odds.audience_accuracy()) {
        correct
    } else {
        decoys(eligible, correct).choose(rng).unwrap_or(correct)
    };

    let mut others: Vec<SlotKey> = eligible
        .iter()
        .copied()
        .filter(|key| *key != favourite)
        .collect();
    if others.is_empty() {
        return BTreeMap::from([(favourite, 100)]);
    }
    others.shuffle(rng);

    // With two keys left the favourite needs a clear majority to stand out.
    let lead: u8 = if others.len() == 1 {
        rng.gen_range(55..=85)
    } else {
        rng.gen_range(40..=75)
    };

    let mut votes = BTreeMap::new();
    let mut remaining = 100 - lead;
    while let Some(key) = others.pop() {
        // Nobody may draw level with the favourite. The last key takes what
        // is left up to that cap.
        let cap = remaining.min(lead - 1);
        let share = if others.is_empty() {
            cap
        } else {
            rng.gen_range(0..=cap)
        };
        votes.insert(key, share);
        remaining -= share;
    }
    // Whatever the cap held back goes to the favourite, keeping the total at 100.
    votes.insert(favourite, lead + remaining);
    votes
}

/// Pick the key the friend will vouch for and phrase it as they would.
pub fn friend_call(
    eligible: &[SlotKey],
    correct: SlotKey,
    odds: &HintOdds,
    rng: &mut impl Rng,
) -> (SlotKey, String) {
    let named = if rng.gen_bool(odds.friend_accuracy()) {
        correct
    } else {
        decoys(eligible, correct).choose(rng).unwrap_or(correct)
    };
    let friend = FRIENDS.choose(rng).copied().unwrap_or("Your friend");
    let message = format!(
        "{friend} thinks the answer is {}",
        named.as_str().to_uppercase()
    );
    (named, message)
}

fn decoys(eligible: &[SlotKey], correct: SlotKey) -> impl Iterator<Item = SlotKey> + '_ {
    eligible.iter().copied().filter(move |key| *key != correct)
}
