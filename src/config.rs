use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

static DEFAULT_CONFIG: &str = include_str!("default_config.toml");

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub extensions: ExtensionsConfig,
    pub render: RenderConfig,
}

/// Which inline syntax extensions the parser is built with.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExtensionsConfig {
    pub strikethrough: bool,
    pub autolink: bool,
    pub spoiler: bool,
    pub colors: bool,
}

impl Default for ExtensionsConfig {
    fn default() -> Self {
        Self {
            strikethrough: true,
            autolink: true,
            spoiler: true,
            colors: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RenderConfig {
    /// Nesting depth past which subtrees are flattened to plain text.
    pub max_depth: usize,
    /// Prefix that marks inline code as a console command.
    pub command_prefix: String,
}

pub const DEFAULT_MAX_DEPTH: usize = 64;

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            command_prefix: "/".to_string(),
        }
    }
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: Some(path.to_path_buf()),
                source,
            },
            other => other,
        })
    }

    /// Load config from a TOML file, or return defaults if it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::compiled_default())
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse { path: None, source })
    }

    /// The bundled default config. Its syntax is checked by the build script.
    pub fn compiled_default() -> Self {
        Self::from_toml(DEFAULT_CONFIG).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn compiled_default_matches_default_impl() {
        assert_eq!(Config::compiled_default(), Config::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = Config::from_toml("[extensions]\ncolors = false\n").unwrap();
        assert!(!config.extensions.colors);
        assert!(config.extensions.spoiler);
        assert_eq!(config.render.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.render.command_prefix, "/");
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[render]\nmax_depth = 8\ncommand_prefix = \"!\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.render.max_depth, 8);
        assert_eq!(config.render.command_prefix, "!");
    }

    #[test]
    fn load_reports_invalid_toml_with_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[render\nmax_depth = ").unwrap();

        match Config::load(file.path()) {
            Err(ConfigError::Parse { path, .. }) => assert_eq!(path.as_deref(), Some(file.path())),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn load_or_default_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn load_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Config::load(&dir.path().join("missing.toml")),
            Err(ConfigError::Read { .. })
        ));
    }
}
