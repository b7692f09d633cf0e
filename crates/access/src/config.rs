//! Engine configuration.

use anyhow::{Context, bail};
use serde::Deserialize;

use crate::hierarchy::DEFAULT_MAX_DEPTH;

pub const MAX_INHERITANCE_DEPTH_ENV: &str = "REGULA_MAX_INHERITANCE_DEPTH";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    /// Hard cap on ancestor hops during inheritance walks.
    pub max_inheritance_depth: usize,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            max_inheritance_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl AccessConfig {
    /// Read overrides from the environment, falling back to defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(raw) = lookup(MAX_INHERITANCE_DEPTH_ENV) {
            config.max_inheritance_depth = raw
                .trim()
                .parse()
                .with_context(|| format!("{MAX_INHERITANCE_DEPTH_ENV} must be a positive integer, got '{raw}'"))?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_inheritance_depth == 0 {
            bail!("max_inheritance_depth must be at least 1");
        }
        Ok(())
    }
}
