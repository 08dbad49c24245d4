use super::rank::Rank;
use super::suit::Suit;
use std::fmt::{Display, Formatter, Result};

/// A single playing card. Equality and hashing are by (suit, rank) content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
}

impl Card {
    pub const ALL: [Card; 40] = build_deck();

    pub fn new(suit: Suit, rank: Rank) -> Self {
        Self { suit, rank }
    }

    /// Index into the 40-card deck bitset, `rank * 4 + suit`.
    pub fn to_bit(&self) -> u8 {
        self.rank.index() * 4 + self.suit.index()
    }

    pub fn from_bit(n: u8) -> Self {
        Self {
            rank: Rank::from(n / 4),
            suit: Suit::from(n % 4),
        }
    }

    pub fn points(&self) -> i32 {
        self.rank.points()
    }

    /// Force-ordering key under the given follow suit and trump suit: trump
    /// outranks follow, which outranks the fixed per-suit class C<D<H<S.
    pub fn force_key(&self, follow: Option<Suit>, trump: Option<Suit>) -> u32 {
        let class = if trump.is_some_and(|t| t == self.suit) {
            5
        } else if follow.is_some_and(|f| f == self.suit) {
            4
        } else {
            self.suit.index() as u32
        };
        10 * class + self.rank.index() as u32
    }

    /// Parse a two-character wire token like "CT" or "D5". Returns `None`
    /// for anything that isn't a recognized suit+rank pair.
    pub fn parse(token: &str) -> Option<Self> {
        let mut chars = token.chars();
        let suit = Suit::from_char(chars.next()?)?;
        let rank = Rank::from_char(chars.next()?)?;
        if chars.next().is_some() {
            return None;
        }
        Some(Self { suit, rank })
    }
}

impl dix_core::Arbitrary for Card {
    fn random() -> Self {
        Card::ALL[rand::random_range(0..40)]
    }
}

const fn build_deck() -> [Card; 40] {
    let suits = [Suit::Club, Suit::Diamond, Suit::Heart, Suit::Spade];
    let ranks = [
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];
    let mut deck = [Card {
        suit: Suit::Club,
        rank: Rank::Five,
    }; 40];
    let mut i = 0;
    while i < 10 {
        let mut j = 0;
        while j < 4 {
            deck[i * 4 + j] = Card {
                suit: suits[j],
                rank: ranks[i],
            };
            j += 1;
        }
        i += 1;
    }
    deck
}

impl Display for Card {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "{}{}", self.suit, self.rank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deck_has_40_unique_cards() {
        let mut seen = std::collections::HashSet::new();
        for card in Card::ALL {
            assert!(seen.insert(card));
        }
        assert_eq!(seen.len(), 40);
    }

    #[test]
    fn bit_roundtrip() {
        for card in Card::ALL {
            assert_eq!(Card::from_bit(card.to_bit()), card);
        }
    }

    #[test]
    fn parse_and_display() {
        assert_eq!(Card::parse("CT").unwrap().to_string(), "CT");
        assert_eq!(Card::parse("D5").unwrap().to_string(), "D5");
        assert_eq!(Card::parse("HJ").unwrap().to_string(), "HJ");
        assert_eq!(Card::parse("SA").unwrap().to_string(), "SA");
        assert_eq!(Card::parse(""), None);
        assert_eq!(Card::parse("Z9"), None);
        assert_eq!(Card::parse("C9X"), None);
    }

    #[test]
    fn force_key_orders_trump_above_follow_above_rest() {
        let trump_five = Card::parse("D5").unwrap();
        let off_ace = Card::parse("SA").unwrap();
        let follow_six = Card::parse("C6").unwrap();

        let follow = Some(Suit::Club);
        let trump = Some(Suit::Diamond);

        assert!(trump_five.force_key(follow, trump) > follow_six.force_key(follow, trump));
        assert!(follow_six.force_key(follow, trump) > off_ace.force_key(follow, trump));
    }
}
