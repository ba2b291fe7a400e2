use anyhow::Result;
use std::path::{Path, PathBuf};
use vigil_core::config::{default_config_path, CONFIG_KEYS};
use vigil_core::VigilConfig;

fn config_path(path: Option<&Path>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(path.to_path_buf()),
        None => default_config_path(),
    }
}

/// Print one config value
///
/// # Errors
///
/// Returns an error if the config cannot be loaded or the key is unknown
pub fn handle_config_get(path: Option<&Path>, key: &str) -> Result<()> {
    let config = VigilConfig::load(&config_path(path)?)?;
    println!("{}", config.get(key)?);
    Ok(())
}

/// Update one config value and save
///
/// # Errors
///
/// Returns an error if the value is invalid or the file cannot be written
pub fn handle_config_set(path: Option<&Path>, key: &str, value: &str) -> Result<()> {
    let path = config_path(path)?;
    let mut config = VigilConfig::load(&path)?;
    config.set(key, value)?;
    config.save(&path)?;
    println!("{key} = {}", config.get(key)?);
    Ok(())
}

/// Print every config value
///
/// # Errors
///
/// Returns an error if the config cannot be loaded
pub fn handle_config_list(path: Option<&Path>) -> Result<()> {
    let path = config_path(path)?;
    let config = VigilConfig::load(&path)?;
    println!("Configuration ({}):\n", path.display());
    for key in CONFIG_KEYS {
        println!("  {key:<38} {}", config.get(key)?);
    }
    Ok(())
}

/// Print where the config file lives
///
/// # Errors
///
/// Returns an error if the config directory cannot be determined
pub fn handle_config_path(path: Option<&Path>) -> Result<()> {
    println!("{}", config_path(path)?.display());
    Ok(())
}
