use std::fmt::{Display, Formatter, Result};

/// A Dix rank. The deck drops 2-4, so the discriminant starts at Five and
/// doubles as the rank's force-ordering index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rank {
    Five = 0,
    Six = 1,
    Seven = 2,
    Eight = 3,
    Nine = 4,
    Ten = 5,
    Jack = 6,
    Queen = 7,
    King = 8,
    Ace = 9,
}

impl Rank {
    pub const ALL: [Rank; 10] = [
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

    pub fn index(&self) -> u8 {
        *self as u8
    }

    /// Point value toward the 100-point deck: 5s and Tens/Aces carry weight,
    /// everything else is worth nothing.
    pub fn points(&self) -> i32 {
        match self {
            Rank::Five => 5,
            Rank::Ten => 10,
            Rank::Ace => 10,
            _ => 0,
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '5' => Some(Rank::Five),
            '6' => Some(Rank::Six),
            '7' => Some(Rank::Seven),
            '8' => Some(Rank::Eight),
            '9' => Some(Rank::Nine),
            'T' => Some(Rank::Ten),
            'J' => Some(Rank::Jack),
            'Q' => Some(Rank::Queen),
            'K' => Some(Rank::King),
            'A' => Some(Rank::Ace),
            _ => None,
        }
    }
}

impl From<u8> for Rank {
    fn from(n: u8) -> Self {
        Self::ALL[(n % 10) as usize]
    }
}

impl Display for Rank {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(
            f,
            "{}",
            match self {
                Rank::Five => "5",
                Rank::Six => "6",
                Rank::Seven => "7",
                Rank::Eight => "8",
                Rank::Nine => "9",
                Rank::Ten => "T",
                Rank::Jack => "J",
                Rank::Queen => "Q",
                Rank::King => "K",
                Rank::Ace => "A",
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deck_points_to_100() {
        let total: i32 = Rank::ALL.iter().map(Rank::points).sum::<i32>() * 4;
        assert_eq!(total, 100);
    }

    #[test]
    fn char_roundtrip() {
        for rank in Rank::ALL {
            let c = rank.to_string().chars().next().unwrap();
            assert_eq!(Rank::from_char(c), Some(rank));
        }
    }
}
