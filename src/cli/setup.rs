use crate::core::config::AppConfig;
use anyhow::{Context, Result};
use std::path::Path;

const CONFIG_HEADER: &str = "# Example configuration file for fxboard\n\
# Every key is optional; removed keys take their default value.\n";

fn default_config_yaml() -> Result<String> {
    let body = serde_yaml::to_string(&AppConfig::default())
        .context("Failed to serialize default config")?;
    Ok(format!("{CONFIG_HEADER}{body}"))
}

/// Creates a default configuration file at the default location
pub fn setup() -> Result<()> {
    setup_at_path(AppConfig::default_config_path()?)
}

/// Creates a default configuration file at the specified path
pub fn setup_at_path<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    std::fs::write(path, default_config_yaml()?)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}
