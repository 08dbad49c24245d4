use std::future::Future;

use dix_cards::{playable_cards, Card, Hand, Trick};
use dix_core::{PlayerIndex, Score, TeamIndex};

/// Trick-play I/O: ask the current player for a card and confirm what was
/// actually played — the requested card if legal, otherwise the
/// silently-substituted minimum-force legal card.
pub trait CardIo {
    fn query_card(&mut self, player: PlayerIndex, playable: Hand) -> impl Future<Output = Card>;
    fn reply_card(&mut self, player: PlayerIndex, card: Card) -> impl Future<Output = ()>;
}

/// Run trick play for one round starting from `starter` (the bid winner)
/// and return each team's points for the round.
///
/// `query_card` is asked for a card from the current player; if it isn't
/// actually legal to play, it's silently replaced by the minimum card of
/// the legal set under default force-ordering before `reply_card` confirms
/// what was actually played.
pub async fn round<IO: CardIo>(starter: PlayerIndex, mut hands: [Hand; 4], io: &mut IO) -> [Score; 2] {
    let mut player = starter;
    let mut trick = Trick::empty();
    let mut trump = None;
    let mut team_scores: [Score; 2] = [0, 0];

    while !hands[player].is_empty() {
        let playable = playable_cards(&trick, hands[player]);
        let requested = io.query_card(player, playable).await;
        let card = if playable.contains(requested) {
            requested
        } else {
            playable
                .cards()
                .into_iter()
                .next()
                .expect("playable is never empty while the player still holds cards")
        };
        io.reply_card(player, card).await;

        if trump.is_none() {
            trump = Some(card.suit);
        }

        trick.push(card);
        hands[player].remove(card);
        player = (player + 1) % 4;

        if trick.len() == 4 {
            let (points, offset) = trick.score(trump);
            let winner = (player + offset) % 4;
            let team: TeamIndex = dix_core::team_of(winner);
            team_scores[team] += points;

            player = winner;
            trick = Trick::empty();
        }
    }

    team_scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use dix_cards::Suit;

    fn hand(tokens: &[&str]) -> Hand {
        tokens.iter().map(|t| Card::parse(t).unwrap()).collect()
    }

    fn card(token: &str) -> Card {
        Card::parse(token).unwrap()
    }

    struct Move {
        player: PlayerIndex,
        query: &'static str,
        reply: &'static str,
    }

    /// Drives `round` through a scripted sequence of (query, reply) pairs,
    /// asserting seat order and the confirmed card at every play.
    struct ScriptedPlays<'a> {
        moves: &'a [Move],
        step: usize,
    }

    impl CardIo for ScriptedPlays<'_> {
        async fn query_card(&mut self, player: PlayerIndex, _playable: Hand) -> Card {
            let mv = &self.moves[self.step];
            assert_eq!(player, mv.player, "query_card seat order mismatch at step {}", self.step);
            card(mv.query)
        }

        async fn reply_card(&mut self, player: PlayerIndex, played: Card) {
            let mv = &self.moves[self.step];
            assert_eq!(player, mv.player, "reply_card seat order mismatch at step {}", self.step);
            assert_eq!(played, card(mv.reply), "reply_card value mismatch at step {}", self.step);
            self.step += 1;
        }
    }

    #[tokio::test]
    async fn full_forty_card_round_matches_reference_scores() {
        let hands = [
            hand(&["C8", "C9", "CA", "D5", "D6", "H9", "HT", "S5", "S7", "SJ"]),
            hand(&["D7", "D8", "DK", "H6", "H7", "H8", "HJ", "HK", "S9", "ST"]),
            hand(&["C5", "C7", "DA", "DJ", "H5", "HA", "S6", "S8", "SA", "SQ"]),
            hand(&["C6", "CJ", "CK", "CQ", "CT", "D9", "DQ", "DT", "HQ", "SK"]),
        ];

        // (player, queried card, expected confirmed reply). A mismatch
        // between query and reply marks the trick-2 player-0 substitution:
        // they're void-following onto their own opening suit query ("C7",
        // no longer held) and the engine silently replaces it with their
        // lowest club, "C8".
        let moves = [
            Move { player: 0, query: "CA", reply: "CA" },
            Move { player: 1, query: "D7", reply: "D7" },
            Move { player: 2, query: "C5", reply: "C5" },
            Move { player: 3, query: "C6", reply: "C6" },
            Move { player: 0, query: "C7", reply: "C8" },
            Move { player: 1, query: "ST", reply: "ST" },
            Move { player: 2, query: "C7", reply: "C7" },
            Move { player: 3, query: "CT", reply: "CT" },
            Move { player: 3, query: "SK", reply: "SK" },
            Move { player: 0, query: "S5", reply: "S5" },
            Move { player: 1, query: "S9", reply: "S9" },
            Move { player: 2, query: "SA", reply: "SA" },
            Move { player: 2, query: "SQ", reply: "SQ" },
            Move { player: 3, query: "CJ", reply: "CJ" },
            Move { player: 0, query: "S7", reply: "S7" },
            Move { player: 1, query: "D8", reply: "D8" },
            Move { player: 3, query: "HQ", reply: "HQ" },
            Move { player: 0, query: "HT", reply: "HT" },
            Move { player: 1, query: "H6", reply: "H6" },
            Move { player: 2, query: "HA", reply: "HA" },
            Move { player: 2, query: "S8", reply: "S8" },
            Move { player: 3, query: "CK", reply: "CK" },
            Move { player: 0, query: "SJ", reply: "SJ" },
            Move { player: 1, query: "H7", reply: "H7" },
            Move { player: 3, query: "DT", reply: "DT" },
            Move { player: 0, query: "D6", reply: "D6" },
            Move { player: 1, query: "DK", reply: "DK" },
            Move { player: 2, query: "DA", reply: "DA" },
            Move { player: 2, query: "DJ", reply: "DJ" },
            Move { player: 3, query: "DQ", reply: "DQ" },
            Move { player: 0, query: "D5", reply: "D5" },
            Move { player: 1, query: "H8", reply: "H8" },
            Move { player: 3, query: "D9", reply: "D9" },
            Move { player: 0, query: "H9", reply: "H9" },
            Move { player: 1, query: "HJ", reply: "HJ" },
            Move { player: 2, query: "S6", reply: "S6" },
            Move { player: 3, query: "CQ", reply: "CQ" },
            Move { player: 0, query: "C9", reply: "C9" },
            Move { player: 1, query: "HK", reply: "HK" },
            Move { player: 2, query: "H5", reply: "H5" },
        ];

        let mut io = ScriptedPlays { moves: &moves, step: 0 };
        let scores = round(0, hands, &mut io).await;

        assert_eq!(scores, [70, 30]);
        assert_eq!(scores[0] + scores[1], 100);
    }

    #[tokio::test]
    async fn trump_is_fixed_by_first_card_of_round() {
        let hands = [
            hand(&["C5", "C6", "C7", "C8", "C9", "CT", "CJ", "CQ", "CK", "CA"]),
            hand(&["D5", "D6", "D7", "D8", "D9", "DT", "DJ", "DQ", "DK", "DA"]),
            hand(&["H5", "H6", "H7", "H8", "H9", "HT", "HJ", "HQ", "HK", "HA"]),
            hand(&["S5", "S6", "S7", "S8", "S9", "ST", "SJ", "SQ", "SK", "SA"]),
        ];

        struct LowestCardLeader {
            first_play: Option<Suit>,
        }

        impl CardIo for LowestCardLeader {
            async fn query_card(&mut self, _player: PlayerIndex, playable: Hand) -> Card {
                let lowest = playable.cards()[0];
                if self.first_play.is_none() {
                    self.first_play = Some(lowest.suit);
                }
                lowest
            }

            async fn reply_card(&mut self, _player: PlayerIndex, _card: Card) {}
        }

        let mut io = LowestCardLeader { first_play: None };
        let _ = round(0, hands, &mut io).await;

        // Player 0 always leads with clubs in this hand, so clubs are trump
        // for the whole round; spade never overtakes a club lead.
        assert_eq!(io.first_play, Some(Suit::Club));
    }
}
