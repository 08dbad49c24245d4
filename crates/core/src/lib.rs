//! Core type aliases, traits, and runtime plumbing shared by every Dix crate.
#![allow(dead_code)]

/// Index of a seat around the table, always in `0..4`.
pub type PlayerIndex = usize;
/// Index of a partnership, always `0` (players 0,2) or `1` (players 1,3).
pub type TeamIndex = usize;
/// A committed or cumulative score. Can go negative after a failed bid.
pub type Score = i32;

pub const PLAYERS: usize = 4;

/// Maps a player index to its partnership.
pub fn team_of(player: PlayerIndex) -> TeamIndex {
    player % 2
}

/// Random instance generation, mainly for property tests.
pub trait Arbitrary {
    fn random() -> Self;
}

/// Initialize dual logging (terminal + file) with timestamped log files.
///
/// Creates `logs/` in the current directory and writes DEBUG level to file,
/// INFO level to the terminal.
pub fn init_logging() {
    let _ = std::fs::create_dir_all("logs");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves forward")
        .as_secs();
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    let loggers: Vec<Box<dyn simplelog::SharedLogger>> =
        match std::fs::File::create(format!("logs/{}.log", time)) {
            Ok(file) => vec![
                term,
                simplelog::WriteLogger::new(log::LevelFilter::Debug, config, file),
            ],
            Err(_) => vec![term],
        };
    let _ = simplelog::CombinedLogger::init(loggers);
}

/// Resolves once the first Ctrl-C arrives, having already armed a second
/// handler that force-exits the process immediately. Callers should use the
/// first signal to drive an orderly `Table::close`, reserving the second,
/// hammered interrupt for an immediate hard exit.
pub async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    log::warn!("interrupt received, closing table");
    tokio::spawn(async {
        let _ = tokio::signal::ctrl_c().await;
        log::warn!("second interrupt, forcing exit");
        std::process::exit(130);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn team_of_partitions_players() {
        assert_eq!(team_of(0), 0);
        assert_eq!(team_of(1), 1);
        assert_eq!(team_of(2), 0);
        assert_eq!(team_of(3), 1);
    }
}
