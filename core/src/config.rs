//! Configuration for the cloning engine and the tools built on it.
//!
//! Sources are layered, lowest priority first: the embedded `default_config.toml`, the user's
//! config file (see [`user_config_dir`]), `astclone.toml` in the working directory, and finally
//! `NAME=VALUE` overrides.

use config::FileFormat::Toml;
use directories::ProjectDirs;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Deserialize, PartialEq)]
pub struct Config {
    /// `tracing-subscriber` filter directive used when `RUST_LOG` is not set.
    pub log_filter: String,

    pub clone: CloneConfig,

    pub rebind: RebindConfig,

    #[serde(flatten)]
    pub unknown: HashMap<String, Value>,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct CloneConfig {
    /// Re-point references whose target is already in the substitution map while cloning.
    pub remap_references: bool,

    #[serde(flatten)]
    pub unknown: HashMap<String, Value>,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct RebindConfig {
    /// Update a substituted reference's type when it differs from the new target's type.
    pub retype_substituted: bool,

    #[serde(flatten)]
    pub unknown: HashMap<String, Value>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: "warn".into(),
            clone: CloneConfig::default(),
            rebind: RebindConfig::default(),
            unknown: HashMap::new(),
        }
    }
}

impl Default for CloneConfig {
    fn default() -> Self {
        Self {
            remap_references: true,
            unknown: HashMap::new(),
        }
    }
}

impl Default for RebindConfig {
    fn default() -> Self {
        Self {
            retype_substituted: true,
            unknown: HashMap::new(),
        }
    }
}

impl Config {
    /// Warns about every key that did not match a known field.
    pub fn validate(&self) {
        unknown_field_warning("", &self.unknown);
        unknown_field_warning("clone", &self.clone.unknown);
        unknown_field_warning("rebind", &self.rebind.unknown);
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to parse config value {0:?}; no '=' found")]
    MissingEquals(String),
    #[error(transparent)]
    Config(#[from] config::ConfigError),
}

/// Prints out a warning message for every field in `unknown`.
///
/// `prefix` should be the path to this entry (e.g. `CloneConfig` should call this with a `prefix`
/// of `clone`).
pub fn unknown_field_warning(prefix: &str, unknown: &HashMap<String, Value>) {
    let mut entries: Vec<_> = unknown.keys().collect();
    entries.sort_unstable();
    entries.into_iter().for_each(|name| match prefix {
        "" => eprintln!("Warning: unknown config key {name}"),
        p => eprintln!("Warning: unknown config key {p}.{name}"),
    });
}

/// The directory holding the user's config file, if a home directory can be determined.
pub fn user_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "astclone").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Returns the config file path, given the config directory.
pub fn config_file(config_dir: &Path) -> PathBuf {
    [config_dir, "astclone.toml".as_ref()].iter().collect()
}

/// Loads the layered configuration and warns about unknown keys. `overrides` are `NAME=VALUE`
/// strings, e.g. `clone.remap_references=false`.
pub fn load(overrides: &[String]) -> Result<Config, LoadError> {
    let config = load_from(user_config_dir().as_deref(), overrides)?;
    config.validate();
    debug!(?config, "loaded configuration");
    Ok(config)
}

/// Like [`load`] with an explicit user config directory and without validation.
pub fn load_from(config_dir: Option<&Path>, overrides: &[String]) -> Result<Config, LoadError> {
    let mut settings = config::Config::builder().add_source(config::File::from_str(
        include_str!("../default_config.toml"),
        Toml,
    ));
    if let Some(dir) = config_dir {
        settings = settings.add_source(config::File::from(config_file(dir)).required(false));
    }
    settings = settings
        .add_source(config::File::from(PathBuf::from("astclone.toml")).required(false));
    for config_arg in overrides {
        let Some((name, value)) = config_arg.split_once('=') else {
            return Err(LoadError::MissingEquals(config_arg.clone()));
        };
        settings = settings.set_override(name, value)?;
    }
    Ok(settings.build()?.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg_attr(miri, ignore)]
    fn defaults_match_embedded_file() {
        let config = load_from(None, &[]).unwrap();
        assert_eq!(config, Config::default());
    }

    #[cfg(not(miri))]
    #[test]
    fn layering() {
        use crate::test_util::tempdir;
        use std::{fs, io::Write as _};
        let config_dir = tempdir().unwrap();

        fs::File::create(config_file(config_dir.path()))
            .unwrap()
            .write_all(
                br#"
                    log_filter = "debug"
                    [rebind]
                    retype_substituted = false
                "#,
            )
            .unwrap();
        let config = load_from(Some(config_dir.path()), &[]).unwrap();
        assert_eq!(config.log_filter, "debug");
        assert!(!config.rebind.retype_substituted);
        assert!(config.clone.remap_references);

        // Overrides beat the user's config file.
        let config = load_from(
            Some(config_dir.path()),
            &[
                "log_filter=trace".to_string(),
                "clone.remap_references=false".to_string(),
            ],
        )
        .unwrap();
        assert_eq!(config.log_filter, "trace");
        assert!(!config.clone.remap_references);
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn unknown_keys_are_collected() {
        let config = load_from(None, &["clone.depth=3".to_string()]).unwrap();
        assert!(config.unknown.is_empty());
        assert!(config.clone.unknown.contains_key("depth"));
    }

    #[test]
    fn override_without_equals() {
        assert!(matches!(
            load_from(None, &["log_filter".to_string()]),
            Err(LoadError::MissingEquals(s)) if s == "log_filter"
        ));
    }
}
