use std::collections::BTreeMap;

use pagebrief_models::SummaryType;
use pagebrief_models::providers::ProviderSettings;
use serde::{Deserialize, Serialize};

/// Default provider when none is configured.
pub const DEFAULT_PROVIDER: &str = "openai";

/// Default dispatch timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of summaries kept in history.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawPagebriefConfig {
    pub default_provider: Option<String>,

    pub summary_type: Option<SummaryType>,

    pub timeout_secs: Option<u64>,

    #[serde(default)]
    pub providers: BTreeMap<String, ProviderSettings>,

    #[serde(default)]
    pub history: RawHistoryConfig,
}

/// History config as stored in TOML (optional fields for proper merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawHistoryConfig {
    /// Maximum number of stored summaries
    pub limit: Option<usize>,

    /// Record summaries at all
    pub enabled: Option<bool>,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagebriefConfig {
    /// Provider used when `--provider` is not given
    pub default_provider: String,

    /// Summary type used when `--type` is not given
    pub summary_type: SummaryType,

    /// Dispatch timeout in seconds
    pub timeout_secs: u64,

    /// Per-provider model and endpoint overrides
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub providers: BTreeMap<String, ProviderSettings>,

    #[serde(default)]
    pub history: HistoryConfig,
}

impl Default for PagebriefConfig {
    fn default() -> Self {
        Self {
            default_provider: DEFAULT_PROVIDER.to_string(),
            summary_type: SummaryType::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            providers: BTreeMap::new(),
            history: HistoryConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum number of stored summaries
    pub limit: usize,

    /// Record summaries at all
    pub enabled: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_HISTORY_LIMIT,
            enabled: true,
        }
    }
}
