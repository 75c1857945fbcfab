//! Console configuration loaded from a TOML file.
//!
//! ```toml
//! [console]
//! prompt = ">>> "
//! continuation_prompt = "... "
//! history_file = "/home/me/.alias_console_history"
//! history_size = 1000
//!
//! [aliases]
//! plain = ["pos", "mv"]
//! vararg = ["scan"]
//! ```
//!
//! Every key is optional.

use crate::translator::Translator;
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid alias name '{0}': expected an identifier")]
    InvalidAliasName(String),

    #[error("alias '{0}' is listed as both plain and vararg")]
    DuplicateAlias(String),
}

/// Line editor settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConsoleConfig {
    pub prompt: String,
    pub continuation_prompt: String,
    pub history_file: Option<PathBuf>,
    pub history_size: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            prompt: ">>> ".into(),
            continuation_prompt: "... ".into(),
            history_file: None,
            history_size: 1000,
        }
    }
}

/// Alias names registered at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AliasConfig {
    pub plain: Vec<String>,
    pub vararg: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub console: ConsoleConfig,
    pub aliases: AliasConfig,
}

impl Config {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        let src = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::load_from_str(&src)?;
        info!(
            path = %path.display(),
            aliases = config.aliases.plain.len() + config.aliases.vararg.len(),
            "loaded config"
        );
        Ok(config)
    }

    pub fn load_from_str(src: &str) -> Result<Config, ConfigError> {
        let config: Config = toml::from_str(src)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for name in self.aliases.plain.iter().chain(&self.aliases.vararg) {
            validate_alias_name(name)?;
        }
        if let Some(name) = self
            .aliases
            .plain
            .iter()
            .find(|name| self.aliases.vararg.contains(*name))
        {
            return Err(ConfigError::DuplicateAlias(name.clone()));
        }
        Ok(())
    }

    /// Builds a translator with every configured alias registered.
    pub fn translator(&self) -> Translator {
        let mut translator = Translator::new();
        for name in &self.aliases.plain {
            translator.add_aliased_command(name.as_str());
        }
        for name in &self.aliases.vararg {
            translator.add_aliased_vararg_command(name.as_str());
        }
        translator
    }
}

static ALIAS_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier pattern"));

/// Alias names must be plain identifiers, otherwise the tokenizer never yields them as one word.
pub fn validate_alias_name(name: &str) -> Result<(), ConfigError> {
    if ALIAS_NAME.is_match(name) {
        Ok(())
    } else {
        Err(ConfigError::InvalidAliasName(name.to_string()))
    }
}
