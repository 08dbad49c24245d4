use std::future::Future;

use dix_core::PlayerIndex;

const DEFAULT_BID: i32 = 50;
const MAX_BID: i32 = 105;

/// Bidding-phase I/O: offer the current bidder a turn and confirm what was
/// actually recorded for it (`0` for a pass, the accepted value otherwise),
/// the same asymmetry the wire protocol exposes to the other seats via
/// broadcast.
pub trait BidIo {
    fn query_bid(&mut self, player: PlayerIndex) -> impl Future<Output = i32>;
    fn reply_bid(&mut self, player: PlayerIndex, bid: i32) -> impl Future<Output = ()>;
}

/// Run a bidding round starting from `starter` and return the winning
/// bidder and its final bid.
pub async fn bid<IO: BidIo>(starter: PlayerIndex, io: &mut IO) -> (PlayerIndex, i32) {
    let mut pending: [Option<i32>; 4] = [Some(0); 4];
    let mut bidder = starter;
    let mut min_bid = DEFAULT_BID;

    while pending.iter().filter(|b| b.is_some()).count() > 1 {
        let value = io.query_bid(bidder).await;
        let accepted = value % 5 == 0 && value >= min_bid && value <= MAX_BID;

        let confirmed = if accepted {
            pending[bidder] = Some(value);
            min_bid = value + 5;
            value
        } else {
            pending[bidder] = None;
            0
        };
        io.reply_bid(bidder, confirmed).await;

        bidder = (bidder + 1) % 4;
        while pending[bidder].is_none() {
            bidder = (bidder + 1) % 4;
        }
    }

    let (winner, value) = pending
        .iter()
        .enumerate()
        .find_map(|(player, value)| value.map(|v| (player, v)))
        .expect("at least one bidder always remains");

    if value == 0 {
        io.reply_bid(winner, DEFAULT_BID).await;
        return (winner, DEFAULT_BID);
    }

    (winner, value)
}
