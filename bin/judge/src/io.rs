use dix_cards::{Card, Hand};
use dix_core::PlayerIndex;
use dix_engine::{BidIo, CardIo, RoundIo};
use dix_table::Table;
use dix_wire::Command;
use rand::rngs::SmallRng;

/// Wires the engine's `RoundIo` callbacks onto a live `Table`: deals from
/// one continuing RNG for the whole match, asks each seat in turn, and
/// broadcasts every accepted (or silently replaced) reply to the table so
/// every seat sees the same ground truth.
pub struct TableIo<'a> {
    table: &'a mut Table,
    rng: SmallRng,
}

impl<'a> TableIo<'a> {
    pub fn new(table: &'a mut Table, rng: SmallRng) -> Self {
        TableIo { table, rng }
    }
}

impl BidIo for TableIo<'_> {
    async fn query_bid(&mut self, player: PlayerIndex) -> i32 {
        match self.table.communicate(player, &Command::QueryBid).await {
            Ok(line) => line.trim().parse().unwrap_or(0),
            Err(err) => {
                log::warn!("[judge] P{player} produced no bid reply ({err}), treating as pass");
                0
            }
        }
    }

    async fn reply_bid(&mut self, player: PlayerIndex, bid: i32) {
        self.table.broadcast(&Command::ReplyBid(player, bid)).await;
        log::info!("[judge] player {player} bids {bid}");
    }
}

impl CardIo for TableIo<'_> {
    async fn query_card(&mut self, player: PlayerIndex, playable: Hand) -> Card {
        match self.table.communicate(player, &Command::QueryCard).await {
            Ok(line) => dix_wire::read_card(line.trim()).unwrap_or_else(|| {
                log::warn!("[judge] P{player} sent an unparseable card token {line:?}");
                fallback_card(playable)
            }),
            Err(err) => {
                log::warn!("[judge] P{player} produced no card reply ({err})");
                fallback_card(playable)
            }
        }
    }

    async fn reply_card(&mut self, player: PlayerIndex, card: Card) {
        self.table.broadcast(&Command::ReplyCard(player, card)).await;
        log::info!("[judge] player {player} plays {card}");
    }
}

impl RoundIo for TableIo<'_> {
    async fn deal_hands(&mut self) -> [Hand; 4] {
        let hands = dix_cards::deal_random_hands_with(&mut self.rng);
        for (player, hand) in hands.iter().enumerate() {
            if let Err(err) = self.table.send(player, &Command::Hand(*hand)).await {
                log::error!("[judge] failed to send hand to P{player}: {err}");
            }
            log::info!("[judge] player {player} hand={hand}");
        }
        hands
    }
}

/// Any card at all; `dix_engine::round` only consults this when the
/// requested card wasn't in `playable`, and replaces it with the minimum
/// legal card regardless of what's returned here.
fn fallback_card(playable: Hand) -> Card {
    playable
        .cards()
        .into_iter()
        .next()
        .unwrap_or(Card::ALL[0])
}
