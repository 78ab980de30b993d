use std::borrow::Cow;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use compio::fs;
use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use strata::BestEffortPathExt;
use tracing::debug;

const CONFIG_FILE_NAME: &str = "strata.yaml";
const DEFAULT_INPUT: &str = "input";
const DEFAULT_STATE: &str = ".strata/input.snapshot";

fn get_config_file_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

/// Locations used by the binary, relative to the project root until
/// [`Config::resolve`] anchors them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub input: PathBuf,
    pub state: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            state: PathBuf::from(DEFAULT_STATE),
        }
    }
}

impl Config {
    /// Reads `strata.yaml` under `root`. A missing file means defaults.
    pub async fn read(root: &Path) -> Result<Self, ConfigError> {
        let path = get_config_file_path(root);
        debug!("Opening config file: {}", path.best_effort_path_display());

        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                debug!("No config file found, using defaults");
                return Ok(Self::default().resolve(root));
            }
            Err(error) => {
                return Err(error).context(ReadSnafu {
                    file_path: path.best_effort_path_display(),
                });
            }
        };
        debug!("Successfully read config file: {} bytes", bytes.len());

        let contents = String::from_utf8(bytes).context(EncodingSnafu {
            file_path: path.best_effort_path_display(),
        })?;
        let config: Self = contents.as_str().try_into()?;
        Ok(config.resolve(root))
    }

    /// Anchors relative locations at `root`.
    pub fn resolve(self, root: &Path) -> Self {
        Self {
            input: root.join(self.input),
            state: root.join(self.state),
        }
    }

    fn path_value(
        top_level: &LinkedHashMap<Yaml, Yaml>,
        key: &'static str,
        default: &str,
    ) -> Result<PathBuf, ConfigError> {
        match top_level.get(&Yaml::Value(Scalar::String(Cow::Borrowed(key)))) {
            None => Ok(PathBuf::from(default)),
            Some(value) => value
                .as_str()
                .map(PathBuf::from)
                .ok_or(ConfigError::NotAPath { key }),
        }
    }
}

impl TryFrom<&str> for Config {
    type Error = ConfigError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let contents_vec = Yaml::load_from_str(contents).context(ParseSnafu)?;
        let contents = contents_vec.first().ok_or(ConfigError::MalformedConfig)?;

        let top_level = contents
            .as_mapping()
            .ok_or(ConfigError::TopLevelNotMap)?;

        Ok(Config {
            input: Self::path_value(top_level, "input", DEFAULT_INPUT)?,
            state: Self::path_value(top_level, "state", DEFAULT_STATE)?,
        })
    }
}

#[derive(Debug, Snafu)]
pub enum ConfigError {
    #[snafu(display("Failed to read the config file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Config file {} is not valid UTF-8", file_path))]
    EncodingError {
        file_path: String,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Failed to parse the config file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Improperly formatted config file"))]
    MalformedConfig,
    #[snafu(display("Top level of config should be a map"))]
    TopLevelNotMap,
    #[snafu(display("'{}' should be a path", key))]
    NotAPath { key: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[compio::test]
    async fn missing_file_means_defaults() {
        let root = TempDir::new().expect("Failed to create temp directory");

        let config = Config::read(root.path()).await.expect("Failed to read config");

        assert_eq!(config, Config::default().resolve(root.path()));
        assert_eq!(config.input, root.path().join("input"));
        assert_eq!(config.state, root.path().join(DEFAULT_STATE));
    }

    #[compio::test]
    async fn file_values_are_anchored_at_root() {
        let root = TempDir::new().expect("Failed to create temp directory");
        std::fs::write(
            root.path().join(CONFIG_FILE_NAME),
            "input: dist/stage-1\nstate: cache/input.snapshot\n",
        )
        .expect("Failed to write config");

        let config = Config::read(root.path()).await.expect("Failed to read config");

        assert_eq!(config.input, root.path().join("dist/stage-1"));
        assert_eq!(config.state, root.path().join("cache/input.snapshot"));
    }

    #[test]
    fn invalid_yaml_is_a_parse_error() {
        let result: Result<Config, _> = "invalid: yaml: content: [unclosed".try_into();
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn empty_file_is_malformed() {
        let result: Result<Config, _> = "".try_into();
        assert!(matches!(result, Err(ConfigError::MalformedConfig)));
    }

    #[test]
    fn top_level_must_be_a_map() {
        let result: Result<Config, _> = "- input\n- output".try_into();
        assert!(matches!(result, Err(ConfigError::TopLevelNotMap)));
    }

    #[test]
    fn values_must_be_strings() {
        let result: Result<Config, _> = "input:\n  nested: true".try_into();
        assert!(matches!(
            result,
            Err(ConfigError::NotAPath { key: "input" })
        ));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let result: Result<Config, _> = "other: value\nstate: cache/input.snapshot".try_into();
        let config = result.expect("Config should parse");
        assert_eq!(config.input, PathBuf::from(DEFAULT_INPUT));
        assert_eq!(config.state, PathBuf::from("cache/input.snapshot"));
    }
}
