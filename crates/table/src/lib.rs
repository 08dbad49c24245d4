//! Seat multiplexer: wraps a terminal seat or a (optionally sandboxed) bot
//! subprocess behind one send/receive/communicate interface, and groups
//! four seats into a `Table` the game engine drives without caring which
//! kind of seat it's talking to.
mod seat;
mod table;

pub use seat::{Seat, SubprocessSeat, TerminalSeat};
pub use table::Table;
