//! Configuration system for BullyGuard.
//!
//! Uses `figment` for layered configuration: defaults -> config files -> environment -> CLI args.
//! Configuration is loaded from the user config directory and/or `.bullyguard/config.toml`
//! in the workspace directory.

use crate::gateway::GatewayConfig;
use bullyguard_ml::MlConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
    /// Dataset, cleaning and training settings.
    #[serde(default)]
    pub ml: MlConfig,
}

/// Values given on the command line. Only the fields that are set take effect.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "bullyguard", "bullyguard")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

fn workspace_config_path(workspace: &Path) -> PathBuf {
    workspace.join(".bullyguard").join("config.toml")
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Explicit overrides (passed as argument)
/// 2. Environment variables (prefixed with `BULLYGUARD_`)
/// 3. An explicit config file (`--config`)
/// 4. Workspace-local config (`.bullyguard/config.toml`)
/// 5. User config (`~/.config/bullyguard/config.toml` or the platform equivalent)
/// 6. Built-in defaults
pub fn load_config(
    workspace: Option<&Path>,
    config_file: Option<&Path>,
    overrides: Option<&ConfigOverrides>,
) -> Result<AppConfig, Box<figment::Error>> {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

    if let Some(user_config) = user_config_path() {
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    if let Some(ws) = workspace {
        let ws_config = workspace_config_path(ws);
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    if let Some(path) = config_file {
        if !path.exists() {
            return Err(Box::new(figment::Error::from(format!(
                "config file not found: {}",
                path.display()
            ))));
        }
        figment = figment.merge(Toml::file(path));
    }

    // BULLYGUARD_GATEWAY__PORT, BULLYGUARD_ML__DATA__DATA_DIR, etc.
    figment = figment.merge(Env::prefixed("BULLYGUARD_").split("__"));

    if let Some(overrides) = overrides {
        figment = figment.merge(Serialized::default("gateway", overrides));
    }

    figment.extract().map_err(Box::new)
}

/// Check whether a user-level or workspace-level config file exists.
pub fn config_exists(workspace: Option<&Path>) -> bool {
    if user_config_path().is_some_and(|p| p.exists()) {
        return true;
    }
    workspace.is_some_and(|ws| workspace_config_path(ws).exists())
}
