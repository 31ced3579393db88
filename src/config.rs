//! Service configuration from the environment

use std::net::SocketAddr;

use anyhow::{bail, Context, Result};

pub const BIND_ADDR_VAR: &str = "TABSTAT_BIND_ADDR";
pub const IQR_FACTOR_VAR: &str = "TABSTAT_IQR_FACTOR";

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub bind_addr: SocketAddr,
    /// Used when an outlier request omits `factor`.
    pub default_iqr_factor: f64,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source; unset variables fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = lookup(BIND_ADDR_VAR) {
            config.bind_addr = addr
                .parse()
                .with_context(|| format!("{BIND_ADDR_VAR}={addr:?} is not a socket address"))?;
        }

        if let Some(factor) = lookup(IQR_FACTOR_VAR) {
            let factor: f64 = factor
                .parse()
                .with_context(|| format!("{IQR_FACTOR_VAR}={factor:?} is not a number"))?;
            if !factor.is_finite() || factor < 0.0 {
                bail!("{IQR_FACTOR_VAR} must be a finite non-negative number, got {factor}");
            }
            config.default_iqr_factor = factor;
        }

        Ok(config)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            default_iqr_factor: 1.5,
        }
    }
}
