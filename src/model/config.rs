use serde::{Deserialize, Serialize};

/// Upper bound on any suggestion page
pub const MAX_SUGGESTIONS: usize = 10;

/// Configuration from topicflow.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub user: UserConfig,
    #[serde(default)]
    pub suggest: SuggestConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

/// The signed-in user. An empty `id` means nobody is signed in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub nickname: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestConfig {
    /// Default: see src/cli/handlers/init.rs
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        SuggestConfig {
            page_size: default_page_size(),
        }
    }
}

impl SuggestConfig {
    /// Page size clamped to `1..=MAX_SUGGESTIONS`
    pub fn limit(&self) -> usize {
        self.page_size.clamp(1, MAX_SUGGESTIONS)
    }
}

fn default_page_size() -> usize {
    MAX_SUGGESTIONS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Characters of stripped content shown in task previews
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            preview_chars: default_preview_chars(),
        }
    }
}

fn default_preview_chars() -> usize {
    100
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store file, relative to the data directory
    #[serde(default = "default_store_file")]
    pub file: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            file: default_store_file(),
        }
    }
}

fn default_store_file() -> String {
    "store.json".to_string()
}
