use std::path::PathBuf;

use clap::Parser;

/// Run games of Dix opposing computer programs and/or humans.
#[derive(Parser, Debug)]
#[command(name = "dix-judge", author, version, about, long_about = None)]
pub struct Cli {
    /// Fix the seed of the pseudo-random number generator used for dealing
    /// cards (default: a fresh seed drawn from OS entropy).
    #[arg(short = 'g', long)]
    pub seed: Option<u64>,

    /// Maximum number of rounds to play, or "inf" to play until
    /// `--winning-score` is reached.
    #[arg(short = 'r', long = "max-rounds", default_value = "inf")]
    pub max_rounds: String,

    /// Stop the game when any team reaches this score, or "inf" to play
    /// until `--max-rounds` is reached.
    #[arg(short = 'w', long = "winning-score", default_value = "500")]
    pub winning_score: String,

    /// Configure a player seat: "terminal" for an interactive human, or a
    /// path to a bot directory containing a "run" script. May be given up
    /// to 4 times; a single seat fills all 4 if the others are omitted the
    /// way the underlying loop indexes `seat[player % seat.len()]` does.
    #[arg(short = 's', long = "seat")]
    pub seat: Vec<String>,

    /// Path to a folder that becomes the root filesystem for every
    /// non-terminal seat, sandboxed in its own namespaces and cgroup.
    #[arg(short = 'b', long = "box")]
    pub r#box: Option<PathBuf>,

    /// Maximum number of processes/threads per boxed seat (requires
    /// --box).
    #[arg(long = "box-tasks-limit", default_value_t = -1)]
    pub box_tasks_limit: i64,

    /// Maximum RAM usage in bytes per boxed seat (requires --box).
    #[arg(long = "box-ram-limit", default_value_t = -1)]
    pub box_ram_limit: i64,

    /// Maximum swap usage in bytes per boxed seat (requires --box).
    #[arg(long = "box-swap-limit", default_value_t = -1)]
    pub box_swap_limit: i64,
}

/// "inf" or a bare non-negative integer; used for both `--max-rounds` and
/// `--winning-score`, which share the same "inf means unbounded" grammar.
pub fn parse_unbounded<T: std::str::FromStr>(raw: &str) -> anyhow::Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    if raw == "inf" {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|err| anyhow::anyhow!("expected \"inf\" or an integer, got {raw:?}: {err}"))
}

impl Cli {
    /// Validates cross-field constraints argparse would reject at parse
    /// time: a `--box-*` limit is a configuration error without `--box`.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.r#box.is_none()
            && (self.box_tasks_limit != -1 || self.box_ram_limit != -1 || self.box_swap_limit != -1)
        {
            anyhow::bail!("cannot specify --box-* flags without specifying --box");
        }
        Ok(())
    }

    /// The seats in table order, defaulting to an all-terminal table when
    /// none are given.
    pub fn seats(&self) -> Vec<String> {
        if self.seat.is_empty() {
            vec!["terminal".to_string()]
        } else {
            self.seat.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_unbounded_accepts_inf() {
        assert_eq!(parse_unbounded::<u32>("inf").unwrap(), None);
    }

    #[test]
    fn parse_unbounded_accepts_integer() {
        assert_eq!(parse_unbounded::<u32>("12").unwrap(), Some(12));
    }

    #[test]
    fn parse_unbounded_rejects_garbage() {
        assert!(parse_unbounded::<u32>("twelve").is_err());
    }

    #[test]
    fn box_limit_without_box_is_rejected() {
        let cli = Cli {
            seed: None,
            max_rounds: "inf".to_string(),
            winning_score: "500".to_string(),
            seat: vec![],
            r#box: None,
            box_tasks_limit: 8,
            box_ram_limit: -1,
            box_swap_limit: -1,
        };
        assert!(cli.validate().is_err());
    }

    #[test]
    fn default_seat_list_is_all_terminal() {
        let cli = Cli {
            seed: None,
            max_rounds: "inf".to_string(),
            winning_score: "500".to_string(),
            seat: vec![],
            r#box: None,
            box_tasks_limit: -1,
            box_ram_limit: -1,
            box_swap_limit: -1,
        };
        assert_eq!(cli.seats(), vec!["terminal".to_string()]);
    }
}
