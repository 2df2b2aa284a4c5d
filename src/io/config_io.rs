use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::Config;

/// Directory holding the config and store, under the workspace root
pub const DATA_DIR: &str = ".topicflow";
pub const CONFIG_FILE: &str = "topicflow.toml";

/// Error type for config and data-directory operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("not a topicflow directory: no .topicflow/ found (run `tf init`)")]
    NotInitialized,
    #[error("already initialized: {0} exists")]
    AlreadyInitialized(PathBuf),
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse topicflow.toml: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Find the workspace root by walking up from `start`, looking for a
/// `.topicflow/topicflow.toml`.
pub fn discover_root(start: &Path) -> Result<PathBuf, ConfigError> {
    let mut current = start.to_path_buf();
    loop {
        if config_path(&current).is_file() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(ConfigError::NotInitialized);
        }
    }
}

pub fn data_dir(root: &Path) -> PathBuf {
    root.join(DATA_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    data_dir(root).join(CONFIG_FILE)
}

/// The store file named by `config`, resolved against the data directory
pub fn store_path(root: &Path, config: &Config) -> PathBuf {
    data_dir(root).join(&config.store.file)
}

pub fn load_config(root: &Path) -> Result<Config, ConfigError> {
    let path = config_path(root);
    let text = fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    let config: Config = toml::from_str(&text)?;
    Ok(config)
}

/// Create `.topicflow/` under `root` with the given config text. Refuses to
/// overwrite an existing config.
pub fn create_data_dir(root: &Path, config_text: &str) -> Result<PathBuf, ConfigError> {
    let dir = data_dir(root);
    let path = config_path(root);
    if path.exists() {
        return Err(ConfigError::AlreadyInitialized(path));
    }
    fs::create_dir_all(&dir).map_err(|e| ConfigError::WriteError {
        path: dir.clone(),
        source: e,
    })?;
    fs::write(&path, config_text).map_err(|e| ConfigError::WriteError {
        path: path.clone(),
        source: e,
    })?;
    Ok(dir)
}
