use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use self::{auto_play::AutoPlayArg, levels::LevelsArg, replay::ReplayArg};

mod auto_play;
mod levels;
mod replay;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Log engine events to stderr (`-vv` for every gravity step)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play a session with a bot choosing the taps
    #[command(name = "auto-play")]
    AutoPlay(#[clap(flatten)] AutoPlayArg),
    /// List the built-in levels
    Levels(#[clap(flatten)] LevelsArg),
    /// Replay a recording and check that it reproduces the same game
    Replay(#[clap(flatten)] ReplayArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    init_logging(args.verbose);
    match args.mode.unwrap_or(Mode::Levels(LevelsArg::default())) {
        Mode::AutoPlay(arg) => auto_play::run(&arg)?,
        Mode::Levels(arg) => levels::run(&arg)?,
        Mode::Replay(arg) => replay::run(&arg)?,
    }
    Ok(())
}

/// Installs the stderr subscriber. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn test_command_args_are_consistent() {
        CommandArgs::command().debug_assert();
    }

    #[test]
    fn test_verbose_is_global() {
        let args = CommandArgs::try_parse_from(["match2", "levels", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
        assert!(matches!(args.mode, Some(Mode::Levels(_))));
    }

    #[test]
    fn test_no_mode_parses() {
        let args = CommandArgs::try_parse_from(["match2"]).unwrap();
        assert!(args.mode.is_none());
    }
}
