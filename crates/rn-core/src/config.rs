//! Application configuration types.
//!
//! The top-level [`Config`] struct carries the naming and report settings.
//! Every section defaults sensibly so a completely empty file is valid; the
//! binary decides where the file comes from and in which format.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Smallest zero-padding width for sequence indices.
pub const MIN_INDEX_WIDTH: usize = 2;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub naming: NamingConfig,
    pub report: ReportConfig,
}

impl Config {
    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.naming.min_index_width < MIN_INDEX_WIDTH {
            warnings.push(format!(
                "naming.min_index_width is {}; indices are always padded to at least {MIN_INDEX_WIDTH} digits",
                self.naming.min_index_width
            ));
        }
        if self.naming.min_index_width > 6 {
            warnings.push(format!(
                "naming.min_index_width is {}; filenames will carry long zero runs",
                self.naming.min_index_width
            ));
        }

        if let Some(ref path) = self.report.path {
            if path.is_dir() {
                warnings.push(format!(
                    "report.path {} is a directory; reports need a file path",
                    path.display()
                ));
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// How target filenames are built and compared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Minimum zero-padded width of the sequence index (never below 2).
    pub min_index_width: usize,
    /// Compare target paths case-insensitively when looking for collisions.
    #[serde(default = "default_case_insensitive")]
    pub case_insensitive_collisions: bool,
}

impl NamingConfig {
    /// The padding width to use for a batch of `count` unique media files.
    pub fn index_width(&self, count: usize) -> usize {
        let digits = count.max(1).to_string().len();
        self.min_index_width.max(MIN_INDEX_WIDTH).max(digits)
    }
}

fn default_case_insensitive() -> bool {
    cfg!(any(windows, target_os = "macos"))
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            min_index_width: MIN_INDEX_WIDTH,
            case_insensitive_collisions: default_case_insensitive(),
        }
    }
}

/// Where the batch report goes after an apply run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// JSON file the batch report is written to; no report when unset.
    pub path: Option<PathBuf>,
}
