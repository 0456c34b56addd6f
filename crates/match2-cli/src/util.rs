use std::{
    fs::File,
    io::{self, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use match2_engine::{GameConfig, Level};

use crate::schema::record::RecordedSession;

#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: StdoutLock<'static>,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    pub fn save_json<T>(value: &T, output_path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = Output::from_output_path(output_path)?;
        output.write_json(value)
    }

    pub fn from_output_path(output_path: Option<PathBuf>) -> anyhow::Result<Self> {
        match output_path {
            Some(path) => Output::open(path),
            None => Ok(Output::stdout()),
        }
    }

    pub fn stdout() -> Self {
        Output::Stdout {
            writer: io::stdout().lock(),
        }
    }

    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn display_path(&self) -> String {
        match self {
            Output::Stdout { .. } => "stdout".to_string(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    pub fn write_json<T>(&mut self, value: T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut *self, &value)
            .with_context(|| format!("Failed to write JSON to {}", self.display_path()))?;
        writeln!(&mut *self).with_context(|| {
            format!(
                "Failed to write newline after JSON to {}",
                self.display_path()
            )
        })?;
        self.flush()
            .with_context(|| format!("Failed to flush output to {}", self.display_path()))?;
        Ok(())
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout { writer } => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout { writer } => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Read game options from a JSON file.
///
/// Missing fields take their default values.
pub fn read_config_file<P>(path: P) -> anyhow::Result<GameConfig>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let config: GameConfig = read_json_file("config", path)?;
    config
        .validate()
        .with_context(|| format!("Invalid config file: {}", path.display()))?;
    Ok(config)
}

pub fn read_level_file<P>(path: P) -> anyhow::Result<Level>
where
    P: AsRef<Path>,
{
    read_json_file("level", path)
}

pub fn read_recording_file<P>(path: P) -> anyhow::Result<RecordedSession>
where
    P: AsRef<Path>,
{
    read_json_file("recording", path)
}

/// Resolves a level by built-in name or JSON file path.
pub fn resolve_level(name: Option<&str>, file: Option<&Path>) -> anyhow::Result<Option<Level>> {
    match (name, file) {
        (Some(name), _) => {
            let level = Level::builtin_named(name).with_context(|| {
                let known = Level::builtin()
                    .into_iter()
                    .map(|level| level.name)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("Unknown level: {name} (built-in levels: {known})")
            })?;
            Ok(Some(level))
        }
        (None, Some(path)) => read_level_file(path).map(Some),
        (None, None) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use std::{env, fs, process};

    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(format!("match2-util-{}-{name}", process::id()))
    }

    #[test]
    fn test_resolve_builtin_level() {
        let level = resolve_level(Some("tiny"), None).unwrap().unwrap();
        assert_eq!(level.name, "tiny");
        assert_eq!((level.width, level.height), (2, 2));
    }

    #[test]
    fn test_resolve_unknown_level_lists_builtins() {
        let err = resolve_level(Some("nope"), None).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("nope"));
        assert!(message.contains("diagonal-fallings"));
    }

    #[test]
    fn test_resolve_no_level() {
        assert!(resolve_level(None, None).unwrap().is_none());
    }

    #[test]
    fn test_read_config_file_fills_defaults() {
        let path = temp_path("config.json");
        fs::write(&path, r#"{ "width": 5, "turns_limit": 3 }"#).unwrap();
        let config = read_config_file(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(config.width, 5);
        assert_eq!(config.turns_limit, 3);
        assert_eq!(config.height, GameConfig::default().height);
    }

    #[test]
    fn test_read_config_file_rejects_out_of_range() {
        let path = temp_path("bad-config.json");
        fs::write(&path, r#"{ "width": 1 }"#).unwrap();
        let result = read_config_file(&path);
        fs::remove_file(&path).unwrap();

        assert!(result.is_err());
    }

    #[test]
    fn test_read_missing_file_names_kind() {
        let err = read_level_file(temp_path("missing.json")).unwrap_err();
        assert!(err.to_string().contains("level"));
    }
}
