//! Line-delimited wire grammar exchanged between the judge and each seat.
//!
//! Grammar: `player <N>`, `hand <C...>`, `bid ?`, `bid <N> <V>`, `card ?`,
//! `card <N> <C>`, `end`. A bot's replies to `bid ?`/`card ?` are raw lines
//! (a bare integer, a bare card token) rather than full `Command`s; parsing
//! those replies is the engine's job (see `dix-engine`), not this crate's.
#![allow(dead_code)]

use dix_cards::{Card, Hand};
use dix_core::PlayerIndex;

pub fn write_card(card: Card) -> String {
    card.to_string()
}

pub fn read_card(token: &str) -> Option<Card> {
    Card::parse(token)
}

pub fn write_trick(cards: &[Card]) -> String {
    cards
        .iter()
        .map(Card::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn read_trick(data: &str) -> Vec<Card> {
    data.split_whitespace().filter_map(Card::parse).collect()
}

pub fn write_hand(hand: Hand) -> String {
    hand.to_string()
}

pub fn read_hand(data: &str) -> Hand {
    read_trick(data).into_iter().collect()
}

/// A single line of the judge-to-bot protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Player(PlayerIndex),
    Hand(Hand),
    QueryBid,
    ReplyBid(PlayerIndex, i32),
    QueryCard,
    ReplyCard(PlayerIndex, Card),
    End,
    /// A line that didn't match any known command shape. Never produced by
    /// `write`; only ever returned by `parse`.
    Malformed(String),
}

impl Command {
    pub fn write(&self) -> String {
        match self {
            Command::Player(player) => format!("player {player}"),
            Command::Hand(hand) => format!("hand {}", write_hand(*hand)),
            Command::QueryBid => "bid ?".to_string(),
            Command::ReplyBid(player, bid) => format!("bid {player} {bid}"),
            Command::QueryCard => "card ?".to_string(),
            Command::ReplyCard(player, card) => format!("card {player} {}", write_card(*card)),
            Command::End => "end".to_string(),
            Command::Malformed(line) => line.clone(),
        }
    }

    pub fn parse(line: &str) -> Command {
        let parts: Vec<&str> = line.split(' ').collect();
        match parts.as_slice() {
            ["player", n] => match n.parse() {
                Ok(player) => Command::Player(player),
                Err(_) => Command::Malformed(line.to_string()),
            },
            ["hand", rest @ ..] => Command::Hand(read_hand(&rest.join(" "))),
            ["bid", "?"] => Command::QueryBid,
            ["bid", n, v] => match (n.parse(), v.parse()) {
                (Ok(player), Ok(bid)) => Command::ReplyBid(player, bid),
                _ => Command::Malformed(line.to_string()),
            },
            ["card", "?"] => Command::QueryCard,
            ["card", n, c] => match (n.parse(), read_card(c)) {
                (Ok(player), Some(card)) => Command::ReplyCard(player, card),
                _ => Command::Malformed(line.to_string()),
            },
            ["end"] => Command::End,
            _ => Command::Malformed(line.to_string()),
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.write())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(s: &str) -> Card {
        Card::parse(s).unwrap()
    }

    #[test]
    fn card_roundtrip() {
        assert_eq!(write_card(card("CT")), "CT");
        assert_eq!(read_card("D5"), Some(card("D5")));
    }

    #[test]
    fn trick_roundtrip() {
        let trick = vec![card("CT"), card("C9"), card("C5"), card("SA")];
        let line = write_trick(&trick);
        assert_eq!(line, "CT C9 C5 SA");
        assert_eq!(read_trick(&line), trick);
    }

    #[test]
    fn hand_roundtrip() {
        let hand: Hand = [card("CT"), card("C9"), card("C5"), card("SA")]
            .into_iter()
            .collect();
        let line = write_hand(hand);
        assert_eq!(line, "C5 C9 CT SA");
        assert_eq!(read_hand(&line), hand);
    }

    #[test]
    fn command_roundtrip() {
        let commands = vec![
            Command::Player(1),
            Command::Hand(
                [card("CT"), card("C5"), card("SQ"), card("S5"), card("DK")]
                    .into_iter()
                    .collect(),
            ),
            Command::QueryBid,
            Command::ReplyBid(2, 80),
            Command::QueryCard,
            Command::ReplyCard(3, card("HQ")),
            Command::End,
        ];
        for command in commands {
            let line = command.write();
            assert_eq!(Command::parse(&line), command);
        }
    }

    #[test]
    fn write_command_matches_grammar() {
        assert_eq!(Command::Player(1).write(), "player 1");
        assert_eq!(
            Command::Hand(
                [card("CT"), card("C5"), card("SQ"), card("S5"), card("DK")]
                    .into_iter()
                    .collect()
            )
            .write(),
            "hand C5 CT DK S5 SQ"
        );
        assert_eq!(Command::QueryBid.write(), "bid ?");
        assert_eq!(Command::ReplyBid(2, 80).write(), "bid 2 80");
        assert_eq!(Command::QueryCard.write(), "card ?");
        assert_eq!(Command::End.write(), "end");
    }

    #[test]
    fn parse_command_matches_grammar() {
        assert_eq!(Command::parse("player 1"), Command::Player(1));
        assert_eq!(
            Command::parse("hand CT C5 SQ S5 DK"),
            Command::Hand(
                [card("CT"), card("C5"), card("SQ"), card("S5"), card("DK")]
                    .into_iter()
                    .collect()
            )
        );
        assert_eq!(Command::parse("bid ?"), Command::QueryBid);
        assert_eq!(Command::parse("bid 2 80"), Command::ReplyBid(2, 80));
        assert_eq!(Command::parse("card ?"), Command::QueryCard);
        assert_eq!(Command::parse("card 3 HQ"), Command::ReplyCard(3, card("HQ")));
        assert_eq!(Command::parse("end"), Command::End);
    }

    #[test]
    fn malformed_line_is_never_a_known_variant() {
        match Command::parse("invalid") {
            Command::Malformed(line) => assert_eq!(line, "invalid"),
            other => panic!("expected Malformed, got {other:?}"),
        }
    }
}
