//! Configuration system for grounded.
//!
//! Uses `figment` for layered configuration: defaults -> user config file ->
//! workspace config file -> `GROUNDED_`-prefixed environment variables. The
//! documented `AZURE_*` variables are applied last as a convenience layer so
//! the tool works with nothing but environment variables set.
//!
//! Configuration is loaded from `~/.config/grounded/config.toml` and/or
//! `.grounded/config.toml` in the workspace directory.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Top-level configuration for grounded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub openai: OpenAiConfig,
    pub search: SearchConfig,
    pub indexer: IndexerConfig,
    /// Whether to print citation/context metadata alongside the answer.
    #[serde(default)]
    pub show_citations: bool,
}

/// Configuration for the Azure OpenAI chat deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Resource endpoint, e.g. "https://my-resource.openai.azure.com".
    pub endpoint: String,
    /// Deployment identifier of the target model.
    pub deployment: String,
    /// API version query parameter for chat completions.
    pub api_version: String,
    /// Environment variable name containing the API key.
    pub api_key_env: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            deployment: String::new(),
            api_version: "2024-02-01".to_string(),
            api_key_env: "AZURE_OAI_KEY".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Configuration for the search grounding data source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Search service endpoint, e.g. "https://my-service.search.windows.net".
    pub endpoint: String,
    /// Name of the search index to ground answers on.
    pub index: String,
    /// Environment variable name containing the query API key.
    pub api_key_env: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            index: String::new(),
            api_key_env: "AZURE_SEARCH_KEY".to_string(),
        }
    }
}

/// Configuration for the indexer trigger call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexerConfig {
    /// Search service name (the `{service}` in `{service}.search.windows.net`).
    pub service: String,
    /// Indexer name to run.
    pub name: String,
    /// API version query parameter for the indexer REST API.
    pub api_version: String,
    /// Environment variable name containing the admin API key.
    pub admin_key_env: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            service: String::new(),
            name: String::new(),
            api_version: "2023-10-01-Preview".to_string(),
            admin_key_env: "AZURE_SEARCH_ADMIN_KEY".to_string(),
            timeout_secs: 30,
        }
    }
}

impl AppConfig {
    /// Validate that every value required before a network call is non-empty.
    ///
    /// Returns the first missing setting, named together with the documented
    /// environment variable that can supply it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("openai.endpoint", &self.openai.endpoint, "AZURE_OAI_ENDPOINT"),
            (
                "openai.deployment",
                &self.openai.deployment,
                "AZURE_OAI_DEPLOYMENT",
            ),
            (
                "search.endpoint",
                &self.search.endpoint,
                "AZURE_SEARCH_ENDPOINT",
            ),
            ("search.index", &self.search.index, "AZURE_SEARCH_INDEX"),
            ("indexer.service", &self.indexer.service, "GROUNDED_INDEXER__SERVICE"),
            ("indexer.name", &self.indexer.name, "GROUNDED_INDEXER__NAME"),
        ];
        for (field, value, env_var) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingField {
                    field: field.to_string(),
                    env_var: env_var.to_string(),
                });
            }
        }
        if self.openai.api_version.trim().is_empty() || self.indexer.api_version.trim().is_empty()
        {
            return Err(ConfigError::Invalid {
                message: "api_version must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Resolve an API key from the environment variable named in the config.
///
/// The key itself never lives in a config file; only the variable name does.
pub fn resolve_key(env_var: &str) -> Result<String, ConfigError> {
    match std::env::var(env_var) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::EnvVarMissing {
            var: env_var.to_string(),
        }),
    }
}

/// Load configuration with the standard layering.
///
/// Layers (later wins): serialized defaults, user-level config file,
/// workspace-level config file, `GROUNDED_`-prefixed environment variables
/// (e.g. `GROUNDED_OPENAI__DEPLOYMENT`), explicit overrides, and finally the
/// documented `AZURE_*` variables.
pub fn load_config(
    workspace: Option<&Path>,
    overrides: Option<&AppConfig>,
) -> Result<AppConfig, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

    // User-level config
    if let Some(config_dir) = directories::ProjectDirs::from("dev", "grounded", "grounded") {
        let user_config = config_dir.config_dir().join("config.toml");
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    // Workspace-level config
    if let Some(ws) = workspace {
        let ws_config = ws.join(".grounded").join("config.toml");
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    // Environment variables (GROUNDED_OPENAI__ENDPOINT, GROUNDED_INDEXER__NAME, etc.)
    figment = figment.merge(Env::prefixed("GROUNDED_").split("__"));

    // Explicit overrides
    if let Some(overrides) = overrides {
        figment = figment.merge(Serialized::defaults(overrides));
    }

    let mut config: AppConfig = figment.extract().map_err(|e| ConfigError::ParseError {
        message: e.to_string(),
    })?;

    apply_env_overrides(&mut config);
    Ok(config)
}

/// Apply the documented `AZURE_*` environment variables on top of the merged
/// configuration. These names match the original workflow and always win.
fn apply_env_overrides(config: &mut AppConfig) {
    let overrides: [(&str, &mut String); 4] = [
        ("AZURE_OAI_ENDPOINT", &mut config.openai.endpoint),
        ("AZURE_OAI_DEPLOYMENT", &mut config.openai.deployment),
        ("AZURE_SEARCH_ENDPOINT", &mut config.search.endpoint),
        ("AZURE_SEARCH_INDEX", &mut config.search.index),
    ];
    for (var, slot) in overrides {
        if let Ok(value) = std::env::var(var)
            && !value.trim().is_empty()
        {
            *slot = value;
        }
    }
}

/// Check whether any grounded configuration file exists (user-level or
/// workspace-level).
pub fn config_exists(workspace: Option<&Path>) -> bool {
    if let Some(config_dir) = directories::ProjectDirs::from("dev", "grounded", "grounded")
        && config_dir.config_dir().join("config.toml").exists()
    {
        return true;
    }

    if let Some(ws) = workspace
        && ws.join(".grounded").join("config.toml").exists()
    {
        return true;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn populated_config() -> AppConfig {
        AppConfig {
            openai: OpenAiConfig {
                endpoint: "https://my-resource.openai.azure.com".into(),
                deployment: "gpt-4o".into(),
                ..OpenAiConfig::default()
            },
            search: SearchConfig {
                endpoint: "https://my-service.search.windows.net".into(),
                index: "margies-index".into(),
                ..SearchConfig::default()
            },
            indexer: IndexerConfig {
                service: "my-service".into(),
                name: "margies-indexer".into(),
                ..IndexerConfig::default()
            },
            show_citations: false,
        }
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.openai.api_version, "2024-02-01");
        assert_eq!(config.openai.api_key_env, "AZURE_OAI_KEY");
        assert_eq!(config.openai.timeout_secs, 30);
        assert_eq!(config.search.api_key_env, "AZURE_SEARCH_KEY");
        assert_eq!(config.indexer.api_version, "2023-10-01-Preview");
        assert_eq!(config.indexer.admin_key_env, "AZURE_SEARCH_ADMIN_KEY");
        assert!(!config.show_citations);
    }

    #[test]
    fn test_validate_complete_config() {
        assert!(populated_config().validate().is_ok());
    }

    #[test]
    fn test_validate_missing_endpoint() {
        let mut config = populated_config();
        config.openai.endpoint = String::new();
        match config.validate() {
            Err(ConfigError::MissingField { field, env_var }) => {
                assert_eq!(field, "openai.endpoint");
                assert_eq!(env_var, "AZURE_OAI_ENDPOINT");
            }
            other => panic!("Expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_blank_index_is_missing() {
        let mut config = populated_config();
        config.search.index = "   ".into();
        match config.validate() {
            Err(ConfigError::MissingField { field, .. }) => {
                assert_eq!(field, "search.index");
            }
            other => panic!("Expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_empty_api_version() {
        let mut config = populated_config();
        config.indexer.api_version = String::new();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_resolve_key_present() {
        // SAFETY: test-only env var manipulation
        unsafe { std::env::set_var("GROUNDED_TEST_RESOLVE_KEY", "secret-value") };
        assert_eq!(
            resolve_key("GROUNDED_TEST_RESOLVE_KEY").unwrap(),
            "secret-value"
        );
        // SAFETY: test-only env var manipulation
        unsafe { std::env::remove_var("GROUNDED_TEST_RESOLVE_KEY") };
    }

    #[test]
    fn test_resolve_key_missing() {
        // SAFETY: test-only env var manipulation
        unsafe { std::env::remove_var("GROUNDED_TEST_RESOLVE_KEY_MISSING") };
        match resolve_key("GROUNDED_TEST_RESOLVE_KEY_MISSING") {
            Err(ConfigError::EnvVarMissing { var }) => {
                assert_eq!(var, "GROUNDED_TEST_RESOLVE_KEY_MISSING");
            }
            other => panic!("Expected EnvVarMissing, got {:?}", other),
        }
    }

    #[test]
    fn test_load_config_workspace_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join(".grounded");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(
            config_dir.join("config.toml"),
            r#"
show_citations = true

[indexer]
service = "toml-service"
name = "toml-indexer"
"#,
        )
        .unwrap();

        let config = load_config(Some(dir.path()), None).unwrap();
        assert!(config.show_citations);
        assert_eq!(config.indexer.service, "toml-service");
        assert_eq!(config.indexer.name, "toml-indexer");
        // Untouched sections keep their defaults.
        assert_eq!(config.indexer.api_version, "2023-10-01-Preview");
    }

    #[test]
    fn test_load_config_explicit_overrides_win_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join(".grounded");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(
            config_dir.join("config.toml"),
            "[indexer]\nservice = \"from-file\"\nname = \"idx\"\n",
        )
        .unwrap();

        let mut overrides = AppConfig::default();
        overrides.indexer.service = "from-overrides".into();
        overrides.indexer.name = "idx".into();

        let config = load_config(Some(dir.path()), Some(&overrides)).unwrap();
        assert_eq!(config.indexer.service, "from-overrides");
    }

    #[test]
    fn test_config_exists() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!config_exists(Some(dir.path())));

        let config_dir = dir.path().join(".grounded");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(config_dir.join("config.toml"), "show_citations = false\n").unwrap();
        assert!(config_exists(Some(dir.path())));
    }

    #[test]
    fn test_config_toml_round_trip() {
        let config = populated_config();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.openai.endpoint, config.openai.endpoint);
        assert_eq!(parsed.indexer.name, config.indexer.name);
    }
}
