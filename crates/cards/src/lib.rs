//! Card, Hand, and Trick primitives for Dix: suits, ranks, force-ordering,
//! and fair dealing.

pub mod card;
pub mod deal;
pub mod hand;
pub mod rank;
pub mod suit;
pub mod trick;

pub use card::Card;
pub use deal::{deal_random_hands, deal_random_hands_with};
pub use hand::Hand;
pub use rank::Rank;
pub use suit::Suit;
pub use trick::{playable_cards, Trick};
