//! Evaluator configuration
//!
//! Defaults are layered with `NICKEL_BRIDGE_*` environment variables. The
//! lookup is injectable so overrides can be tested without touching the
//! process environment.

use crate::constants::{
    DEFAULT_EXECUTABLE, DEFAULT_MAX_DEPTH, EXECUTABLE_VAR, MAX_DEPTH_LIMIT, MAX_DEPTH_VAR,
    TRAILING_BYTES_VAR,
};
use crate::errors::{Error, Result};
use crate::wire::{DecodeOptions, TrailingBytes};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings shared by every backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Name or path of the evaluator executable for the subprocess backend
    pub executable: PathBuf,
    /// Maximum container nesting accepted by the decoder
    pub max_depth: usize,
    /// Policy for bytes left after the root value
    pub trailing_bytes: TrailingBytes,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            executable: PathBuf::from(DEFAULT_EXECUTABLE),
            max_depth: DEFAULT_MAX_DEPTH,
            trailing_bytes: TrailingBytes::Reject,
        }
    }
}

impl EvaluatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(exe) = lookup(EXECUTABLE_VAR).filter(|v| !v.trim().is_empty()) {
            config.executable = PathBuf::from(exe.trim());
        }

        if let Some(depth) = lookup(MAX_DEPTH_VAR) {
            let depth = depth.trim().parse::<usize>().map_err(|e| {
                Error::configuration(format!("{MAX_DEPTH_VAR}='{depth}' is not a number: {e}"))
            })?;
            config = config.max_depth(depth);
        }

        if let Some(policy) = lookup(TRAILING_BYTES_VAR) {
            config.trailing_bytes = match policy.trim().to_ascii_lowercase().as_str() {
                "reject" => TrailingBytes::Reject,
                "warn" => TrailingBytes::Warn,
                other => {
                    return Err(Error::configuration(format!(
                        "{TRAILING_BYTES_VAR}='{other}' must be 'reject' or 'warn'"
                    )))
                }
            };
        }

        config.validate()?;
        Ok(config)
    }

    /// Set the evaluator executable
    pub fn executable(mut self, exe: impl Into<PathBuf>) -> Self {
        self.executable = exe.into();
        self
    }

    /// Set the decoder depth bound
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set the trailing bytes policy
    pub fn trailing_bytes(mut self, policy: TrailingBytes) -> Self {
        self.trailing_bytes = policy;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(Error::configuration(
                "max_depth must be at least 1".to_string(),
            ));
        }
        if self.max_depth > MAX_DEPTH_LIMIT {
            return Err(Error::configuration(format!(
                "max_depth {} exceeds the limit of {MAX_DEPTH_LIMIT}",
                self.max_depth
            )));
        }
        if self.executable.as_os_str().is_empty() {
            return Err(Error::configuration(
                "evaluator executable cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            max_depth: self.max_depth,
            trailing_bytes: self.trailing_bytes,
        }
    }
}
