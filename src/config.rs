//! Replay configuration parsed from environment variables.

use canvas::config::EngineConfig;

pub const DEFAULT_PAPER_ID: &str = "paper";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A numeric variable did not parse or was out of range.
    #[error("invalid {var}: {value:?} ({reason})")]
    InvalidNumber { var: String, value: String, reason: &'static str },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplayConfig {
    pub engine: EngineConfig,
    /// Paper id stamped on records saved by the in-memory backend.
    pub paper_id: String,
}

impl ReplayConfig {
    /// Build replay config from environment variables.
    ///
    /// Optional:
    /// - `EQMARK_DRAW_THRESHOLD_PX`: default 4
    /// - `EQMARK_HANDLE_RADIUS_PX`: default 8
    /// - `EQMARK_DEFAULT_ZOOM`: default 1.5
    /// - `EQMARK_PAPER_ID`: default `paper`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidNumber`] naming the first variable that is
    /// set but not a valid number.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_var)
    }

    /// Same as [`ReplayConfig::from_env`], reading variables through `lookup`.
    ///
    /// # Errors
    ///
    /// See [`ReplayConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = EngineConfig::default();
        let engine = EngineConfig {
            draw_threshold_px: parse_px(&lookup, "EQMARK_DRAW_THRESHOLD_PX", defaults.draw_threshold_px)?,
            handle_radius_px: parse_px(&lookup, "EQMARK_HANDLE_RADIUS_PX", defaults.handle_radius_px)?,
            default_zoom: parse_zoom(&lookup, "EQMARK_DEFAULT_ZOOM", defaults.default_zoom)?,
            ..defaults
        };
        let paper_id = lookup("EQMARK_PAPER_ID")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PAPER_ID.to_owned());

        Ok(Self { engine, paper_id })
    }
}

/// A set variable that is not valid unicode is treated as unset.
fn env_var(key: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(value) => Some(value),
        Err(std::env::VarError::NotPresent) => None,
        Err(err @ std::env::VarError::NotUnicode(_)) => {
            tracing::warn!(var = key, %err, "ignoring environment variable");
            None
        }
    }
}

fn parse_px(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: f64) -> Result<f64, ConfigError> {
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    let v = parse_finite(key, &raw)?;
    if v < 0.0 {
        return Err(invalid(key, &raw, "must not be negative"));
    }
    Ok(v)
}

fn parse_zoom(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: f64) -> Result<f64, ConfigError> {
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    let v = parse_finite(key, &raw)?;
    if v <= 0.0 {
        return Err(invalid(key, &raw, "must be positive"));
    }
    Ok(v)
}

fn parse_finite(key: &str, raw: &str) -> Result<f64, ConfigError> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(invalid(key, raw, "not a number")),
    }
}

fn invalid(key: &str, raw: &str, reason: &'static str) -> ConfigError {
    ConfigError::InvalidNumber { var: key.to_owned(), value: raw.to_owned(), reason }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
