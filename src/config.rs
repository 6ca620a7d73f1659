// src/config.rs

use anyhow::{Context, Result};
use std::env;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 256 * 1024 * 1024; // 256 MiB
pub const DEFAULT_BATCH_SIZE: usize = 8192;

/// Process-wide settings, read once at startup and shared read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub port: u16,
    pub log_level: String,
    /// Uploads larger than this are rejected before the body is buffered.
    pub max_upload_bytes: u64,
    /// Rows per record batch when decoding column data.
    pub batch_size: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl ServiceConfig {
    /// Read `PORT`, `LOG_LEVEL`, `MAX_UPLOAD_BYTES` and `BATCH_SIZE`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env`, but with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(port) = lookup("PORT") {
            cfg.port = port
                .trim()
                .parse()
                .with_context(|| format!("parsing PORT={:?}", port))?;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            if !level.trim().is_empty() {
                cfg.log_level = level.trim().to_string();
            }
        }
        if let Some(max) = lookup("MAX_UPLOAD_BYTES") {
            cfg.max_upload_bytes = max
                .trim()
                .parse()
                .with_context(|| format!("parsing MAX_UPLOAD_BYTES={:?}", max))?;
        }
        if let Some(size) = lookup("BATCH_SIZE") {
            cfg.batch_size = size
                .trim()
                .parse()
                .with_context(|| format!("parsing BATCH_SIZE={:?}", size))?;
        }

        if cfg.max_upload_bytes == 0 {
            anyhow::bail!("MAX_UPLOAD_BYTES must be greater than zero");
        }
        if cfg.batch_size == 0 {
            anyhow::bail!("BATCH_SIZE must be greater than zero");
        }
        Ok(cfg)
    }
}
