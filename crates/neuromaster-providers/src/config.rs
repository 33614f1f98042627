//! Configuration and provider factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use neuromaster_core::traits::ContentProvider;

use crate::gemini::GeminiProvider;
use crate::offline::OfflineProvider;

/// Configuration for a single content provider.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Gemini {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        text_model: Option<String>,
        #[serde(default)]
        image_model: Option<String>,
    },
    Offline,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Gemini {
                api_key: _,
                base_url,
                text_model,
                image_model,
            } => f
                .debug_struct("Gemini")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("text_model", text_model)
                .field("image_model", image_model)
                .finish(),
            ProviderConfig::Offline => f.debug_struct("Offline").finish(),
        }
    }
}

/// Top-level neuromaster configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeuromasterConfig {
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Provider used when none is requested explicitly.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Where per-mode stats are stored (platform data dir when unset).
    #[serde(default)]
    pub stats_dir: Option<PathBuf>,
    /// Where generated illustrations are written.
    #[serde(default = "default_image_dir")]
    pub image_dir: PathBuf,
}

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_image_dir() -> PathBuf {
    std::env::temp_dir().join("neuromaster-images")
}

impl Default for NeuromasterConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider(),
            stats_dir: None,
            image_dir: default_image_dir(),
        }
    }
}

impl NeuromasterConfig {
    /// Provider config for `name`, falling back to offline when the name is
    /// the default and nothing is configured for it.
    pub fn provider(&self, name: Option<&str>) -> Result<(String, ProviderConfig)> {
        let name = name.unwrap_or(&self.default_provider);
        match self.providers.get(name) {
            Some(config) => Ok((name.to_string(), config.clone())),
            None if name == self.default_provider || name == "offline" => {
                tracing::info!("provider '{name}' not configured, playing offline");
                Ok(("offline".to_string(), ProviderConfig::Offline))
            }
            None => anyhow::bail!(
                "provider '{}' not found in config. Available: {:?}",
                name,
                self.providers.keys().collect::<Vec<_>>()
            ),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + end];
        // Substituted values are not rescanned.
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

/// Resolve env vars in a provider config.
fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    match config {
        ProviderConfig::Gemini {
            api_key,
            base_url,
            text_model,
            image_model,
        } => ProviderConfig::Gemini {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
            text_model: text_model.clone(),
            image_model: image_model.clone(),
        },
        ProviderConfig::Offline => ProviderConfig::Offline,
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `neuromaster.toml` in the current directory
/// 2. `~/.config/neuromaster/config.toml`
///
/// Environment variable overrides: `NEUROMASTER_GEMINI_KEY`, then `GEMINI_API_KEY`.
pub fn load_config() -> Result<NeuromasterConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<NeuromasterConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("neuromaster.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<NeuromasterConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => NeuromasterConfig::default(),
    };

    // Apply env var overrides
    let env_key = std::env::var("NEUROMASTER_GEMINI_KEY")
        .or_else(|_| std::env::var("GEMINI_API_KEY"))
        .ok()
        .filter(|k| !k.is_empty());
    if let Some(key) = env_key {
        let entry = config
            .providers
            .entry("gemini".into())
            .or_insert(ProviderConfig::Gemini {
                api_key: String::new(),
                base_url: None,
                text_model: None,
                image_model: None,
            });
        if let ProviderConfig::Gemini { api_key, .. } = entry {
            *api_key = key;
        }
    }

    // Resolve env vars in all provider configs
    let resolved: HashMap<String, ProviderConfig> = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();
    config.providers = resolved;
    config.image_dir = PathBuf::from(resolve_env_vars(&config.image_dir.to_string_lossy()));
    if let Some(dir) = &config.stats_dir {
        config.stats_dir = Some(PathBuf::from(resolve_env_vars(&dir.to_string_lossy())));
    }

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("neuromaster"))
}

/// Create a provider instance from its configuration.
///
/// A Gemini entry without an API key degrades to the offline provider.
pub fn create_provider(name: &str, config: &ProviderConfig) -> Result<Box<dyn ContentProvider>> {
    match config {
        ProviderConfig::Gemini {
            api_key,
            base_url,
            text_model,
            image_model,
        } => {
            if api_key.is_empty() {
                tracing::warn!("provider '{name}' has no API key, playing offline");
                return Ok(Box::new(OfflineProvider));
            }
            let mut provider = GeminiProvider::new(api_key, base_url.clone())
                .with_context(|| format!("failed to create provider '{name}'"))?;
            if let Some(model) = text_model {
                provider = provider.with_text_model(model);
            }
            if let Some(model) = image_model {
                provider = provider.with_image_model(model);
            }
            Ok(Box::new(provider))
        }
        ProviderConfig::Offline => Ok(Box::new(OfflineProvider)),
    }
}
