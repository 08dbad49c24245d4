use std::fmt::{Display, Formatter, Result};

/// One of the four French suits. Discriminant doubles as the fixed
/// non-trump, non-follow ordering class (C < D < H < S).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Suit {
    Club = 0,
    Diamond = 1,
    Heart = 2,
    Spade = 3,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Club, Suit::Diamond, Suit::Heart, Suit::Spade];

    pub fn index(&self) -> u8 {
        *self as u8
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'C' => Some(Suit::Club),
            'D' => Some(Suit::Diamond),
            'H' => Some(Suit::Heart),
            'S' => Some(Suit::Spade),
            _ => None,
        }
    }
}

impl From<u8> for Suit {
    fn from(n: u8) -> Self {
        match n % 4 {
            0 => Suit::Club,
            1 => Suit::Diamond,
            2 => Suit::Heart,
            _ => Suit::Spade,
        }
    }
}

impl dix_core::Arbitrary for Suit {
    fn random() -> Self {
        Suit::ALL[rand::random_range(0..4)]
    }
}

impl Display for Suit {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(
            f,
            "{}",
            match self {
                Suit::Club => "C",
                Suit::Diamond => "D",
                Suit::Heart => "H",
                Suit::Spade => "S",
            }
        )
    }
}
