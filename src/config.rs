//! Runtime settings: defaults, optional TOML file, environment.
//!
//! Layering order (later wins): built-in defaults, then an optional config
//! file, then `AQWATCH_*` environment variables. Command-line flags are
//! applied on top by the binary.

use std::path::Path;
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use config::{Config, Environment, File};
use reqwest::Url;
use serde::Deserialize;

use crate::extract::Profile;

/// Resolved runtime settings for one monitor process.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    /// Sensor status endpoint, e.g. `http://purpleair-1a9c/json`.
    pub url: String,
    /// Seconds to sleep between poll attempts.
    pub interval_secs: u64,
    /// Per-attempt HTTP timeout in seconds. Independent of the interval;
    /// a timed-out attempt still waits the full interval before retrying.
    pub timeout_secs: u64,
    /// Which extraction field table to use.
    pub profile: Profile,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            interval_secs: 5,
            timeout_secs: 5,
            profile: Profile::Curated,
        }
    }
}

const DEFAULT_URL: &str = "http://purpleair-1a9c/json";

impl Settings {
    /// Load settings from defaults, an optional TOML file, and the
    /// `AQWATCH_` environment.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("url", DEFAULT_URL)?
            .set_default("interval_secs", 5u64)?
            .set_default("timeout_secs", 5u64)?
            .set_default("profile", "curated")?;

        if let Some(path) = file {
            builder = builder.add_source(File::from(path));
        }

        let settings: Settings = builder
            .add_source(Environment::with_prefix("AQWATCH").try_parsing(true))
            .build()?
            .try_deserialize()
            .context("invalid configuration")?;

        settings.validate()?;
        Ok(settings)
    }

    /// Check invariants that file, environment, or CLI layers may break.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.interval_secs > 0, "poll interval must be at least 1 second");
        ensure!(self.timeout_secs > 0, "request timeout must be at least 1 second");
        self.target().map(|_| ())
    }

    /// Parse the configured URL.
    pub fn target(&self) -> Result<Url> {
        Url::parse(&self.url).with_context(|| format!("invalid sensor URL: {}", self.url))
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
