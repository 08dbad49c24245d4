use super::card::Card;
use super::suit::Suit;
use std::fmt::{Display, Formatter, Result};

/// An unordered set of cards, stored as a 40-bit mask (one bit per card of
/// the deck). Cheap to copy, cheap to diff, zero heap allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Hand(u64);

impl Hand {
    const MASK: u64 = (1u64 << 40) - 1;

    pub fn empty() -> Self {
        Self(0)
    }

    pub fn size(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn contains(&self, card: Card) -> bool {
        self.0 & (1 << card.to_bit()) != 0
    }

    pub fn insert(&mut self, card: Card) {
        self.0 |= 1 << card.to_bit();
    }

    pub fn remove(&mut self, card: Card) {
        self.0 &= !(1 << card.to_bit());
    }

    /// Cards in canonical (follow=none, trump=none) force order, matching
    /// the wire codec's serialization order for a hand.
    pub fn cards(&self) -> Vec<Card> {
        self.cards_ordered_by(None, None)
    }

    /// Cards in force order under an arbitrary follow/trump suit.
    pub fn cards_ordered_by(&self, follow: Option<Suit>, trump: Option<Suit>) -> Vec<Card> {
        let mut cards: Vec<Card> = Card::ALL.iter().copied().filter(|c| self.contains(*c)).collect();
        cards.sort_by_key(|c| c.force_key(follow, trump));
        cards
    }

    /// The subset of this hand matching `suit`.
    pub fn of_suit(&self, suit: Suit) -> Hand {
        self.cards()
            .into_iter()
            .filter(|c| c.suit == suit)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = Card> + '_ {
        self.cards().into_iter()
    }
}

impl dix_core::Arbitrary for Hand {
    /// A random 10-card hand, the size every hand in a round actually has.
    fn random() -> Self {
        use rand::seq::SliceRandom;
        Card::ALL
            .choose_multiple(&mut rand::rng(), 10)
            .copied()
            .collect()
    }
}

impl FromIterator<Card> for Hand {
    fn from_iter<I: IntoIterator<Item = Card>>(iter: I) -> Self {
        let mut hand = Hand::empty();
        for card in iter {
            hand.insert(card);
        }
        hand
    }
}

impl IntoIterator for Hand {
    type Item = Card;
    type IntoIter = std::vec::IntoIter<Card>;
    fn into_iter(self) -> Self::IntoIter {
        self.cards().into_iter()
    }
}

impl Display for Hand {
    fn fmt(&self, f: &mut Formatter) -> Result {
        let tokens: Vec<String> = self.cards().iter().map(Card::to_string).collect();
        write!(f, "{}", tokens.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_remove_roundtrip() {
        let mut hand = Hand::empty();
        let card = Card::parse("SA").unwrap();
        assert!(!hand.contains(card));
        hand.insert(card);
        assert!(hand.contains(card));
        assert_eq!(hand.size(), 1);
        hand.remove(card);
        assert!(!hand.contains(card));
        assert!(hand.is_empty());
    }

    #[test]
    fn canonical_display_order() {
        let hand: Hand = ["CT", "C9", "C5", "SA"]
            .iter()
            .map(|s| Card::parse(s).unwrap())
            .collect();
        assert_eq!(hand.to_string(), "C5 C9 CT SA");
    }

    #[test]
    fn of_suit_filters() {
        let hand: Hand = ["CT", "C9", "D5", "SA"]
            .iter()
            .map(|s| Card::parse(s).unwrap())
            .collect();
        assert_eq!(hand.of_suit(Suit::Club).size(), 2);
        assert_eq!(hand.of_suit(Suit::Heart).size(), 0);
    }

    #[test]
    fn force_order_never_lets_a_lower_class_outrank_a_higher_one() {
        use dix_core::Arbitrary;
        for _ in 0..200 {
            let hand = Hand::random();
            let follow = Suit::random();
            let trump = Suit::random();
            let cards = hand.cards_ordered_by(Some(follow), Some(trump));
            for window in cards.windows(2) {
                let (a, b) = (window[0], window[1]);
                assert!(a.force_key(Some(follow), Some(trump)) <= b.force_key(Some(follow), Some(trump)));
                if a.suit != b.suit {
                    let class_of = |c: Card| -> u32 {
                        if c.suit == trump {
                            5
                        } else if c.suit == follow {
                            4
                        } else {
                            c.suit.index() as u32
                        }
                    };
                    assert!(class_of(a) <= class_of(b));
                }
            }
        }
    }
}
