use std::path::PathBuf;

use anyhow::{Context, ensure};
use match2_engine::{GameSession, PlainTiles};

use crate::{record::board_rows, schema::record::RecordedSession, util};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct ReplayArg {
    /// Path to the recording file (JSON format)
    recording_path: PathBuf,
    /// Print the board after every turn
    #[clap(long)]
    show_boards: bool,
}

pub(crate) fn run(arg: &ReplayArg) -> anyhow::Result<()> {
    let ReplayArg {
        recording_path,
        show_boards,
    } = arg;

    let recorded = util::read_recording_file(recording_path)?;
    let session = replay(&recorded, *show_boards)
        .with_context(|| format!("Replay of {} diverged", recording_path.display()))?;

    eprintln!(
        "Replay matches the recording: {:?} after {} turns, {} points",
        session.session_state(),
        session.stats().turns(),
        session.stats().points(),
    );
    Ok(())
}

/// Rebuilds the recorded session from its seed and replays every tap.
///
/// Fails as soon as a board, a turn score or the final statistics differ
/// from the recording.
fn replay(recorded: &RecordedSession, show_boards: bool) -> anyhow::Result<GameSession> {
    if let Some(first) = recorded.turns.first() {
        ensure!(
            first.turn == 0,
            "recording starts at turn {}, earlier turns were discarded",
            first.turn
        );
    }

    let mut session = match &recorded.level {
        Some(level) => {
            GameSession::from_level(level, &recorded.config, recorded.seed, PlainTiles)?
        }
        None => GameSession::with_seed(recorded.config, recorded.seed)?,
    };

    for turn in &recorded.turns {
        ensure!(
            board_rows(&session) == turn.board_before,
            "board before turn {} differs",
            turn.turn
        );
        let outcome = session
            .play_turn(turn.tap)
            .with_context(|| format!("tap at {} on turn {} was refused", turn.tap, turn.turn))?;
        ensure!(
            outcome.points == turn.points,
            "turn {} earned {} points, recorded {}",
            turn.turn,
            outcome.points,
            turn.points
        );
        if show_boards {
            eprintln!("turn {}: tap {} +{}", turn.turn, turn.tap, outcome.points);
            eprintln!("{}", session.board());
        }
    }

    ensure!(
        *session.stats() == recorded.final_stats,
        "final statistics differ"
    );
    ensure!(
        session.session_state() == recorded.final_state,
        "final state is {:?}, recorded {:?}",
        session.session_state(),
        recorded.final_state
    );
    Ok(session)
}

#[cfg(test)]
mod tests {
    use match2_engine::{BoardSeed, GameConfig, Level, Position};

    use super::*;
    use crate::record::RecordingSession;

    fn recorded_game() -> RecordedSession {
        let level = Level {
            name: "rows".to_owned(),
            width: 3,
            height: 3,
            count_colors: 3,
            field: vec![vec![1, 1, 2], vec![3, 3, 3], vec![2, 1, 2]],
            drop_queues: Vec::new(),
        };
        let config = GameConfig {
            turns_limit: 10,
            score_goal: Some(100_000),
            ..GameConfig::default()
        };
        let session =
            GameSession::from_level(&level, &config, BoardSeed::from_bytes([4; 16]), PlainTiles)
                .unwrap();
        let mut recording = RecordingSession::new(session, Some(level), 100);
        recording.play_turn(Position::new(0, 1)).unwrap();
        recording.play_turn(Position::new(0, 1)).unwrap();
        recording.into_history().to_recorded()
    }

    #[test]
    fn test_replay_reproduces_recording() {
        let recorded = recorded_game();
        let session = replay(&recorded, false).unwrap();
        assert_eq!(session.stats().turns(), 2);
        assert_eq!(*session.stats(), recorded.final_stats);
    }

    #[test]
    fn test_replay_detects_wrong_points() {
        let mut recorded = recorded_game();
        recorded.turns[1].points += 1;
        let err = replay(&recorded, false).unwrap_err();
        assert!(err.to_string().contains("turn 1"));
    }

    #[test]
    fn test_replay_detects_other_layout() {
        let mut recorded = recorded_game();
        if let Some(level) = &mut recorded.level {
            level.field[2][0] = 3;
        }
        let err = replay(&recorded, false).unwrap_err();
        assert!(err.to_string().contains("board before turn 0"));
    }

    #[test]
    fn test_replay_rejects_truncated_recording() {
        let mut recorded = recorded_game();
        recorded.turns.remove(0);
        let err = replay(&recorded, false).unwrap_err();
        assert!(err.to_string().contains("discarded"));
    }
}
