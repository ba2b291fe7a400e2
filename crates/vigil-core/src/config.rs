use crate::policy::Strictness;
use crate::session::SessionSettings;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Keys accepted by [`VigilConfig::get`] and [`VigilConfig::set`]
pub const CONFIG_KEYS: [&str; 6] = [
    "session.strictness",
    "session.smoothing_window",
    "session.thresholds.absent_after_secs",
    "session.thresholds.away_after_secs",
    "session.thresholds.drowsy_after_secs",
    "session.thresholds.unfocused_below",
];

/// Get the config directory for vigil.
///
/// # Errors
///
/// Returns an error if the config directory cannot be determined.
pub fn get_config_dir() -> Result<PathBuf> {
    let mut path = dirs::config_dir().ok_or_else(|| anyhow::anyhow!("Failed to get config dir"))?;
    path.push("vigil");
    Ok(path)
}

/// Default location of `config.toml`
///
/// # Errors
///
/// Returns an error if the config directory cannot be determined.
pub fn default_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.toml"))
}

/// On-disk configuration
///
/// Keys mirror the TOML layout; unknown top-level tables are rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VigilConfig {
    pub session: SessionSettings,
}

impl VigilConfig {
    /// Load from `path`; a missing file yields defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Write to `path`, creating parent directories
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be serialized or written
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let raw = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, raw).with_context(|| format!("Failed to write config {}", path.display()))?;
        log::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Read one value by dotted key
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown key
    pub fn get(&self, key: &str) -> Result<String> {
        let s = &self.session;
        let t = &s.thresholds;
        let value = match key {
            "session.strictness" => s.strictness.to_string(),
            "session.smoothing_window" => s.smoothing_window.to_string(),
            "session.thresholds.absent_after_secs" => t.absent_after_secs.to_string(),
            "session.thresholds.away_after_secs" => t.away_after_secs.to_string(),
            "session.thresholds.drowsy_after_secs" => t.drowsy_after_secs.to_string(),
            "session.thresholds.unfocused_below" => t.unfocused_below.to_string(),
            _ => anyhow::bail!("Unknown key '{key}'. Valid keys: {}", CONFIG_KEYS.join(", ")),
        };
        Ok(value)
    }

    /// Set one value by dotted key
    ///
    /// Strictness is clamped into range; the smoothing window must be at
    /// least 1 and thresholds must be non-negative.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown key or a value that does not parse
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let s = &mut self.session;
        match key {
            "session.strictness" => {
                let level: i64 = value
                    .trim()
                    .parse()
                    .with_context(|| format!("Invalid strictness '{value}'"))?;
                s.strictness = Strictness::new(level);
            }
            "session.smoothing_window" => {
                let window: usize = value
                    .trim()
                    .parse()
                    .with_context(|| format!("Invalid smoothing window '{value}'"))?;
                if window == 0 {
                    anyhow::bail!("Smoothing window must be at least 1");
                }
                s.smoothing_window = window;
            }
            "session.thresholds.absent_after_secs" => {
                s.thresholds.absent_after_secs = parse_threshold(value)?;
            }
            "session.thresholds.away_after_secs" => {
                s.thresholds.away_after_secs = parse_threshold(value)?;
            }
            "session.thresholds.drowsy_after_secs" => {
                s.thresholds.drowsy_after_secs = parse_threshold(value)?;
            }
            "session.thresholds.unfocused_below" => {
                s.thresholds.unfocused_below = parse_threshold(value)?;
            }
            _ => anyhow::bail!("Unknown key '{key}'. Valid keys: {}", CONFIG_KEYS.join(", ")),
        }
        Ok(())
    }
}

fn parse_threshold(value: &str) -> Result<f64> {
    let parsed: f64 = value
        .trim()
        .parse()
        .with_context(|| format!("Invalid number '{value}'"))?;
    if !parsed.is_finite() || parsed < 0.0 {
        anyhow::bail!("Threshold must be a non-negative number, got '{value}'");
    }
    Ok(parsed)
}
