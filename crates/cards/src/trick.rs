use super::card::Card;
use super::hand::Hand;

/// An ordered sequence of up to 4 played cards. The first card fixes the
/// follow suit for the trick.
#[derive(Debug, Clone, Default)]
pub struct Trick(Vec<Card>);

impl Trick {
    pub fn empty() -> Self {
        Self(Vec::with_capacity(4))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, card: Card) {
        self.0.push(card);
    }

    pub fn follow_suit(&self) -> Option<super::suit::Suit> {
        self.0.first().map(|c| c.suit)
    }

    pub fn cards(&self) -> &[Card] {
        &self.0
    }

    /// Total points in the trick and the index of the card that won it,
    /// under the given trump suit (the follow suit is the trick's own
    /// first card).
    pub fn score(&self, trump: Option<super::suit::Suit>) -> (i32, usize) {
        let follow = self.follow_suit();
        let total: i32 = self.0.iter().map(Card::points).sum();
        let (winner, _) = self
            .0
            .iter()
            .enumerate()
            .max_by_key(|(_, c)| c.force_key(follow, trump))
            .expect("trick must have at least one card to be scored");
        (total, winner)
    }
}

/// The subset of `hand` legal to play onto `trick`: if the trick is empty,
/// the whole hand; otherwise cards following suit, or the whole hand again
/// if none can follow.
pub fn playable_cards(trick: &Trick, hand: Hand) -> Hand {
    let Some(follow) = trick.follow_suit() else {
        return hand;
    };
    let subset = hand.of_suit(follow);
    if subset.is_empty() {
        hand
    } else {
        subset
    }
}
