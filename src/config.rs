//! Configuration for the `mrw-meta` command-line tool.
//!
//! Options come from command-line arguments via clap, with environment
//! variable fallbacks using the `MRW_` prefix:
//!
//! - `MRW_FORMAT` - Output format, `text` or `json` (default: text)
//! - `MRW_MAX_SIZE` - Bytes read from each file (default: 400000)
//! - `MRW_JOBS` - Files decoded concurrently (default: 4)
//!
//! # Example
//!
//! ```ignore
//! use mrw_meta::config::Config;
//!
//! let config = Config::parse();
//! config.validate()?;
//! ```

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::io::MAX_RAW_SIZE;

// =============================================================================
// Default Values
// =============================================================================

/// Default number of files decoded at once.
pub const DEFAULT_JOBS: usize = 4;

/// Upper bound for `--jobs`.
pub const MAX_JOBS: usize = 256;

/// Smallest accepted `--max-size`: one block header.
pub const MIN_MAX_SIZE: usize = 8;

// =============================================================================
// CLI Arguments
// =============================================================================

/// How results are printed.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// `key = value` lines
    #[default]
    Text,
    /// One JSON document per file
    Json,
}

/// mrw-meta - Dump metadata from Minolta MRW raw files.
///
/// Decodes the PRD, WBG and RIF blocks and the embedded TIFF directories
/// (EXIF, maker note, camera settings) of each file.
#[derive(Parser, Debug, Clone)]
#[command(name = "mrw-meta")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// MRW files to decode.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, env = "MRW_FORMAT")]
    pub format: OutputFormat,

    /// Maximum number of bytes read from each file.
    #[arg(long, default_value_t = MAX_RAW_SIZE, env = "MRW_MAX_SIZE")]
    pub max_size: usize,

    /// Number of files decoded concurrently.
    #[arg(short, long, default_value_t = DEFAULT_JOBS, env = "MRW_JOBS")]
    pub jobs: usize,

    /// Treat decoding warnings as failures for the exit status.
    #[arg(long, default_value_t = false)]
    pub strict: bool,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.files.is_empty() {
            return Err("At least one file is required".to_string());
        }

        if self.jobs == 0 || self.jobs > MAX_JOBS {
            return Err(format!("jobs must be between 1 and {}", MAX_JOBS));
        }

        if self.max_size < MIN_MAX_SIZE {
            return Err(format!(
                "max_size must be at least {} bytes (one block header)",
                MIN_MAX_SIZE
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
