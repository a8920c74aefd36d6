use std::path::{Path, PathBuf};

use corridor_core::{Result, RouterError};
use tracing::{info, warn};

use crate::schema::{default_output_schema, GuardrailsConfig, ModelsRegistry, RoutingConfig};

/// Loads the three configuration files plus the output schema from a config
/// root directory, applying environment overrides for provider credentials.
///
/// Layout under `config_dir`:
///   models/registry.yaml
///   routing.yaml
///   policies/guardrails.yaml
///   policies/output_schema.json
pub struct ConfigLoader {
    config_dir: PathBuf,
    registry: ModelsRegistry,
    routing: RoutingConfig,
    guardrails: GuardrailsConfig,
    output_schema: serde_json::Value,
}

/// Directory name used under the platform config dir (e.g.
/// `~/.config/corridor` on Linux, `~/Library/Application Support/corridor`
/// on macOS).
const CONFIG_DIR_NAME: &str = "corridor";

impl ConfigLoader {
    /// Resolve the config directory: explicit path > `CORRIDOR_CONFIG` env >
    /// platform-appropriate default directory > `./config`. The platform
    /// default is only used if it actually exists on disk, so a fresh
    /// install without `CORRIDOR_CONFIG` set still falls back to `./config`
    /// (and from there to built-in defaults) rather than silently reading
    /// nothing from an empty directory it just invented.
    pub fn resolve_dir(explicit: Option<&Path>) -> PathBuf {
        if let Some(p) = explicit {
            return p.to_path_buf();
        }
        if let Ok(p) = std::env::var("CORRIDOR_CONFIG") {
            return PathBuf::from(p);
        }
        if let Some(base) = dirs::config_dir() {
            let platform_default = base.join(CONFIG_DIR_NAME);
            if platform_default.exists() {
                return platform_default;
            }
        }
        PathBuf::from("config")
    }

    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config_dir = Self::resolve_dir(explicit);
        info!(?config_dir, "loading configuration");

        let registry = Self::load_yaml::<ModelsRegistry>(&config_dir.join("models/registry.yaml"))?
            .unwrap_or_default();
        let routing = Self::load_yaml::<RoutingConfig>(&config_dir.join("routing.yaml"))?
            .unwrap_or_default();
        let guardrails =
            Self::load_yaml::<GuardrailsConfig>(&config_dir.join("policies/guardrails.yaml"))?
                .unwrap_or_default();

        let output_schema_path = config_dir.join("policies/output_schema.json");
        let output_schema = if output_schema_path.exists() {
            let raw = std::fs::read_to_string(&output_schema_path)?;
            serde_json::from_str(&raw).map_err(|e| {
                RouterError::Config(format!(
                    "failed to parse {}: {}",
                    output_schema_path.display(),
                    e
                ))
            })?
        } else {
            warn!(?output_schema_path, "output schema not found, using built-in default");
            default_output_schema()
        };

        let loaded = Self {
            config_dir,
            registry,
            routing,
            guardrails,
            output_schema,
        };
        loaded.apply_env_overrides();
        Ok(loaded)
    }

    /// Layer environment-provided API keys over whatever the registry
    /// declares, without overwriting a key already present in the file.
    fn apply_env_overrides(&self) {
        for (name, spec) in &self.registry.providers {
            if spec.api_key_env.is_none() {
                continue;
            }
            let env_name = spec.api_key_env.as_deref().unwrap();
            if std::env::var(env_name).is_err() {
                warn!(provider = %name, env = %env_name, "provider declares an api_key_env that is not set");
            }
        }
    }

    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(path)?;
        let parsed = serde_yaml::from_str(&raw)
            .map_err(|e| RouterError::Config(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(Some(parsed))
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn registry(&self) -> &ModelsRegistry {
        &self.registry
    }

    pub fn routing(&self) -> &RoutingConfig {
        &self.routing
    }

    pub fn guardrails(&self) -> &GuardrailsConfig {
        &self.guardrails
    }

    pub fn output_schema(&self) -> &serde_json::Value {
        &self.output_schema
    }

    /// Re-read all configuration files from disk.
    pub fn reload(&mut self) -> Result<()> {
        let reloaded = Self::load(Some(&self.config_dir))?;
        *self = reloaded;
        info!("configuration reloaded");
        Ok(())
    }
}
