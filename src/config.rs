//! Run configuration resolved from the environment.
//!
//! `.env` is loaded by the binary before this is read. Command line flags
//! override whatever is found here.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Result, bail};
use clap::ValueEnum;

pub const ENV_OUTPUT_DIR: &str = "EXAM_REPORT_OUTPUT_DIR";
pub const ENV_FORMAT: &str = "EXAM_REPORT_FORMAT";

/// File format for written reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Xlsx,
    Csv,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Csv => "csv",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xlsx" => Ok(OutputFormat::Xlsx),
            "csv" => Ok(OutputFormat::Csv),
            other => bail!("unknown report format '{other}' (expected xlsx or csv)"),
        }
    }
}

/// Where and how reports are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    pub output_dir: PathBuf,
    pub format: OutputFormat,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            format: OutputFormat::Xlsx,
        }
    }
}

impl ReportConfig {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset or blank keys fall back to
    /// the defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(dir) = get(ENV_OUTPUT_DIR) {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(format) = get(ENV_FORMAT) {
            config.format = format.parse()?;
        }

        Ok(config)
    }

    /// Applies command line overrides.
    pub fn with_overrides(mut self, output_dir: Option<PathBuf>, format: Option<OutputFormat>) -> Self {
        if let Some(dir) = output_dir {
            self.output_dir = dir;
        }
        if let Some(format) = format {
            self.format = format;
        }
        self
    }
}
