//! Bidding ladder, trick-play, and multi-round scoring state machines.
//!
//! Every state machine here is parametric over a small async I/O trait (no
//! dependency on `dix-table` or any particular seat transport), which is
//! what makes each one trivially testable with scripted moves — see the
//! `#[cfg(test)]` modules colocated with `bid`, `round`, and `play_match`.
pub mod bid;
pub mod game;
pub mod round;

pub use bid::{bid, BidIo};
pub use game::{play_match, RoundIo, FOR_THE_GAME, NON_DECLARER_CEILING};
pub use round::{round, CardIo};
