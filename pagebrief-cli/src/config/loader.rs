use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pagebrief_models::providers::ProviderSettings;

use super::types::{
    DEFAULT_HISTORY_LIMIT, DEFAULT_PROVIDER, DEFAULT_TIMEOUT_SECS, HistoryConfig,
    PagebriefConfig, RawHistoryConfig, RawPagebriefConfig,
};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project)
    pub fn load() -> Result<PagebriefConfig> {
        let mut raw = RawPagebriefConfig::default();

        // Layer 1: User config
        if let Some(user) = Self::read_raw(&Self::user_config_path())? {
            raw = Self::merge_raw(raw, user);
        }

        // Layer 2: Project config
        if let Some(project) = Self::read_raw(&Self::project_config_path())? {
            raw = Self::merge_raw(raw, project);
        }

        // Convert to final config with defaults applied
        Ok(Self::finalize(raw))
    }

    /// Get user config path (`$XDG_CONFIG_HOME/pagebrief/config.toml`)
    pub fn user_config_path() -> PathBuf {
        pagebrief_paths::config_dir().join("config.toml")
    }

    /// Get project config path
    /// Can be overridden with PAGEBRIEF_PROJECT_CONFIG_DIR env var (useful for isolated e2e tests)
    pub fn project_config_path() -> PathBuf {
        if let Ok(dir) = std::env::var("PAGEBRIEF_PROJECT_CONFIG_DIR") {
            PathBuf::from(dir).join("config.toml")
        } else {
            PathBuf::from(".pagebrief/config.toml")
        }
    }

    fn read_raw(path: &Path) -> Result<Option<RawPagebriefConfig>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let raw = toml::from_str(&contents)
            .with_context(|| format!("invalid configuration in {}", path.display()))?;
        Ok(Some(raw))
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawPagebriefConfig, overlay: RawPagebriefConfig) -> RawPagebriefConfig {
        RawPagebriefConfig {
            default_provider: overlay.default_provider.or(base.default_provider),
            summary_type: overlay.summary_type.or(base.summary_type),
            timeout_secs: overlay.timeout_secs.or(base.timeout_secs),
            providers: Self::merge_providers(base.providers, overlay.providers),
            history: RawHistoryConfig {
                limit: overlay.history.limit.or(base.history.limit),
                enabled: overlay.history.enabled.or(base.history.enabled),
            },
        }
    }

    /// Merge provider sections field by field, so a project file can change
    /// only the model while the user file keeps the endpoint.
    fn merge_providers(
        mut base: BTreeMap<String, ProviderSettings>,
        overlay: BTreeMap<String, ProviderSettings>,
    ) -> BTreeMap<String, ProviderSettings> {
        for (id, settings) in overlay {
            let entry = base.entry(id).or_default();
            entry.model = settings.model.or(entry.model.take());
            entry.base_url = settings.base_url.or(entry.base_url.take());
        }
        base
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawPagebriefConfig) -> PagebriefConfig {
        PagebriefConfig {
            default_provider: raw
                .default_provider
                .unwrap_or_else(|| DEFAULT_PROVIDER.to_string()),
            summary_type: raw.summary_type.unwrap_or_default(),
            timeout_secs: raw
                .timeout_secs
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            providers: raw.providers,
            history: HistoryConfig {
                limit: raw.history.limit.unwrap_or(DEFAULT_HISTORY_LIMIT),
                enabled: raw.history.enabled.unwrap_or(true),
            },
        }
    }

    /// Load config from a specific path (for testing)
    #[cfg(test)]
    pub fn load_from_path(path: &Path) -> Result<PagebriefConfig> {
        Ok(Self::finalize(Self::read_raw(path)?.unwrap_or_default()))
    }
}
