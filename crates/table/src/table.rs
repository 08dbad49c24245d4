use std::io;

use dix_core::PlayerIndex;
use dix_wire::Command;

use crate::seat::Seat;

/// The four seats around a Dix table, addressable by player index.
pub struct Table {
    seats: [Seat; 4],
}

impl Table {
    pub fn new(seats: [Seat; 4]) -> Self {
        Table { seats }
    }

    pub async fn broadcast(&mut self, command: &Command) {
        log::debug!("[table] broadcast: {}", command.write());
        let sends = self
            .seats
            .iter_mut()
            .map(|seat| seat.send(command));
        let results = futures::future::join_all(sends).await;
        for (player, result) in results.into_iter().enumerate() {
            if let Err(err) = result {
                log::warn!("[table] broadcast to P{player} failed: {err}");
            }
        }
    }

    pub async fn send(&mut self, player: PlayerIndex, command: &Command) -> io::Result<()> {
        log::debug!("[table] unicast to P{player}: {}", command.write());
        match self.seats.get_mut(player) {
            Some(seat) => seat.send(command).await,
            None => {
                log::warn!("[table] unicast to P{player}: no such seat");
                Err(io::Error::new(io::ErrorKind::NotFound, "no such seat"))
            }
        }
    }

    pub async fn receive(&mut self, player: PlayerIndex) -> io::Result<String> {
        match self.seats.get_mut(player) {
            Some(seat) => seat.receive().await,
            None => {
                log::warn!("[table] receive from P{player}: no such seat");
                Err(io::Error::new(io::ErrorKind::NotFound, "no such seat"))
            }
        }
    }

    pub async fn communicate(&mut self, player: PlayerIndex, command: &Command) -> io::Result<String> {
        let start = std::time::Instant::now();
        let result = match self.seats.get_mut(player) {
            Some(seat) => seat.communicate(command).await,
            None => {
                log::warn!("[table] communicate with P{player}: no such seat");
                return Err(io::Error::new(io::ErrorKind::NotFound, "no such seat"));
            }
        };
        log::debug!(
            "[table] communicate with P{player} took {:?}: {result:?}",
            start.elapsed()
        );
        result
    }

    pub async fn close(&mut self) {
        let closes = self.seats.iter_mut().map(|seat| seat.close());
        futures::future::join_all(closes).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seat::TerminalSeat;

    #[test]
    fn table_holds_four_seats() {
        let seats = [
            Seat::Terminal(TerminalSeat::new(0)),
            Seat::Terminal(TerminalSeat::new(1)),
            Seat::Terminal(TerminalSeat::new(2)),
            Seat::Terminal(TerminalSeat::new(3)),
        ];
        let table = Table::new(seats);
        assert_eq!(table.seats.len(), 4);
    }
}
