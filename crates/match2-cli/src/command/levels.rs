use std::path::PathBuf;

use match2_engine::{CellCode, Level};

use crate::util::Output;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct LevelsArg {
    /// Write the levels as JSON instead of drawing them
    #[clap(long)]
    json: bool,
    /// Output file for `--json` (stdout when omitted)
    #[clap(long, requires = "json")]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &LevelsArg) -> anyhow::Result<()> {
    let LevelsArg { json, output } = arg;

    let levels = Level::builtin();
    if *json {
        return Output::save_json(&levels, output.clone());
    }

    for level in &levels {
        println!(
            "{} ({}x{}, {} colors)",
            level.name, level.width, level.height, level.count_colors
        );
        for line in render_field(level) {
            println!("  {line}");
        }
        println!();
    }
    Ok(())
}

/// Draws a level layout: color digits, `?` for random colors, `*` for
/// bombs, `#` for blocked cells and `.` for empty ones.
fn render_field(level: &Level) -> Vec<String> {
    level
        .field
        .iter()
        .map(|row| {
            row.iter()
                .map(|&code| match CellCode::from_code(code) {
                    Some(CellCode::Empty) => '.',
                    Some(CellCode::Simple(color)) => {
                        char::from_digit(u32::from(color.get()), 36).unwrap_or('?')
                    }
                    Some(CellCode::AnyColor) => '?',
                    Some(CellCode::Blocked) => '#',
                    Some(CellCode::Bomb) => '*',
                    None => '!',
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use match2_engine::{ANY_COLOR as A, BLOCKED_CELL as BB, BOMB_TAG as BM, EMPTY_CELL as E};

    use super::*;

    #[test]
    fn test_render_field() {
        let level = Level {
            name: "mixed".to_owned(),
            width: 3,
            height: 2,
            count_colors: 3,
            field: vec![vec![A, BB, 3], vec![E, BM, -9]],
            drop_queues: Vec::new(),
        };
        assert_eq!(render_field(&level), vec!["?#3".to_owned(), ".*!".to_owned()]);
    }

    #[test]
    fn test_render_builtin_levels() {
        for level in Level::builtin() {
            let lines = render_field(&level);
            assert_eq!(lines.len(), level.height, "{}", level.name);
            assert!(lines.iter().all(|line| line.chars().count() == level.width));
            assert!(lines.iter().all(|line| !line.contains('!')));
        }
    }
}
