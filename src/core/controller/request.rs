//! What the user asked to scan.

use crate::error::InputError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Threshold used when the user doesn't pick one
pub const DEFAULT_THRESHOLD: f64 = 200.0;

/// CPU budget used when the user doesn't pick one
pub const DEFAULT_CPU_PERCENT: u32 = 100;

/// Parameters for one scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRequest {
    /// Root folder; `None` until the user picks one
    pub folder: Option<PathBuf>,
    /// Minimum focus score to keep a photo
    pub threshold: f64,
    /// Share of the machine to use; 100 leaves some headroom
    pub cpu_percent: u32,
}

impl Default for ScanRequest {
    fn default() -> Self {
        Self {
            folder: None,
            threshold: DEFAULT_THRESHOLD,
            cpu_percent: DEFAULT_CPU_PERCENT,
        }
    }
}

impl ScanRequest {
    /// Scan `folder` with the default threshold and CPU budget
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: Some(folder.into()),
            ..Default::default()
        }
    }

    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn cpu_percent(mut self, cpu_percent: u32) -> Self {
        self.cpu_percent = cpu_percent;
        self
    }

    /// Build a request from raw form values, the way a UI collects them.
    pub fn from_input(folder: &str, threshold: &str, cpu_percent: i64) -> Result<Self, InputError> {
        let folder = folder.trim();
        let folder = (!folder.is_empty()).then(|| PathBuf::from(folder));

        let cpu_percent = u32::try_from(cpu_percent)
            .ok()
            .filter(|&p| p > 0)
            .ok_or(InputError::InvalidCpuPercent { value: cpu_percent })?;

        Ok(Self {
            folder,
            threshold: parse_threshold(threshold)?,
            cpu_percent,
        })
    }

    /// Check everything that can be checked without touching the disk and
    /// return the folder.
    pub fn validate(&self) -> Result<&Path, InputError> {
        let folder = self
            .folder
            .as_deref()
            .filter(|f| !f.as_os_str().is_empty())
            .ok_or(InputError::FolderNotSet)?;

        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(InputError::InvalidThreshold {
                value: self.threshold.to_string(),
            });
        }

        if self.cpu_percent == 0 {
            return Err(InputError::InvalidCpuPercent { value: 0 });
        }

        Ok(folder)
    }
}

/// Parse a threshold typed by the user. Must be a finite number ≥ 0.
pub fn parse_threshold(input: &str) -> Result<f64, InputError> {
    let invalid = || InputError::InvalidThreshold {
        value: input.to_string(),
    };

    let value: f64 = input.trim().parse().map_err(|_| invalid())?;
    if !value.is_finite() || value < 0.0 {
        return Err(invalid());
    }
    Ok(value)
}
