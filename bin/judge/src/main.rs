//! Dix judge binary.
//!
//! Deals cards, runs bidding and trick play, and broadcasts ground truth
//! to four seats — each a human at the terminal or a bot subprocess,
//! optionally namespaced and cgroup-limited via `dix-box`.
mod cli;
mod io;

use std::path::PathBuf;

use clap::Parser;
use dix_box::{BoxConfig, Mount};
use dix_table::{Seat, SubprocessSeat, Table, TerminalSeat};
use dix_wire::Command;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use cli::{parse_unbounded, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dix_core::init_logging();

    let cli = Cli::parse();
    cli.validate()?;

    let seed = cli.seed.unwrap_or_else(|| rand::rng().random());
    log::info!("[judge] seed={seed}");

    let max_rounds = parse_unbounded::<u32>(&cli.max_rounds)?;
    let winning_score = parse_unbounded::<i32>(&cli.winning_score)?;
    let seat_specs = cli.seats();

    let mut table = setup_table(&cli, &seat_specs).await?;

    let rng = SmallRng::seed_from_u64(seed);
    let engine_io = io::TableIo::new(&mut table, rng);

    let shutdown = tokio::spawn(dix_core::shutdown_signal());

    let results = tokio::select! {
        results = dix_engine::play_match(0, engine_io, max_rounds, winning_score) => results,
        _ = shutdown => {
            log::warn!("[judge] interrupted before the match finished");
            table.close().await;
            return Ok(());
        }
    };

    log::info!("[judge] results={results:?}");

    table.broadcast(&Command::End).await;
    table.close().await;

    Ok(())
}

async fn setup_table(cli: &Cli, seat_specs: &[String]) -> anyhow::Result<Table> {
    let mut seats: Vec<Seat> = Vec::with_capacity(4);

    for player in 0..4 {
        let path = &seat_specs[player % seat_specs.len()];

        let mut seat = if path == "terminal" {
            Seat::Terminal(TerminalSeat::new(player))
        } else {
            let (box_config, cwd): (Option<BoxConfig>, PathBuf) = match &cli.r#box {
                Some(root) => {
                    let config = BoxConfig::new(root.clone())
                        .with_mount(Mount::ro_bind("/bot", path))
                        .with_tasks_limit(cli.box_tasks_limit)
                        .with_ram_limit(cli.box_ram_limit)
                        .with_swap_limit(cli.box_swap_limit);
                    (Some(config), PathBuf::from("/bot"))
                }
                None => (None, PathBuf::from(path)),
            };

            let subprocess = SubprocessSeat::create(
                player,
                vec!["./run".to_string()],
                box_config.as_ref(),
                Some(&cwd),
                None,
            )
            .await?;
            Seat::Subprocess(subprocess)
        };

        log::info!("[judge] seat {player} is {seat}");
        seat.send(&Command::Player(player)).await?;
        seats.push(seat);
    }

    let seats: [Seat; 4] = seats
        .try_into()
        .unwrap_or_else(|_| unreachable!("exactly 4 seats were pushed"));
    Ok(Table::new(seats))
}
