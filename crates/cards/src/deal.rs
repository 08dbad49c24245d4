use super::card::Card;
use super::hand::Hand;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Deal the 40-card deck into four 10-card hands using a Fisher-Yates
/// shuffle drawn from `rng`.
///
/// A match deals once per round from the same continuing generator (the
/// way a long-lived `Random` instance would be threaded through a whole
/// game), so this takes the generator itself rather than a seed — reseeding
/// per round would deal the same hands every round.
pub fn deal_random_hands_with(rng: &mut impl Rng) -> [Hand; 4] {
    let mut deck: Vec<Card> = Card::ALL.to_vec();
    deck.shuffle(rng);

    let mut hands = [Hand::empty(); 4];
    for (i, card) in deck.into_iter().enumerate() {
        hands[i / 10].insert(card);
    }
    hands
}

/// Convenience one-shot deal seeded from a single `u64`, for tests and
/// callers that only need a single round's hands from a fresh generator.
pub fn deal_random_hands(seed: u64) -> [Hand; 4] {
    let mut rng = SmallRng::seed_from_u64(seed);
    deal_random_hands_with(&mut rng)
}
