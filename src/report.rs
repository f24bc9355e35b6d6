//! Structured run report for downstream tool consumption.
//!
//! Writes a JSON file alongside the outputs containing the metadata of the
//! conversion run: tool version, timestamp, paths, and counts.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::convert::ConversionSummary;
use crate::plink::PlinkPaths;

/// Complete report of a conversion run, serialized to `<base>_report.json`.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Tool version
    pub version: String,
    /// Timestamp of run (ISO 8601)
    pub timestamp: String,
    pub input: String,
    pub output: OutputInfo,
    pub family_id: String,
    pub statistics: Statistics,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutputInfo {
    pub bed: String,
    pub bim: String,
    pub fam: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Statistics {
    pub markers: u64,
    pub samples: usize,
}

impl RunReport {
    pub fn new(
        input: &Path,
        paths: &PlinkPaths,
        family_id: &str,
        summary: &ConversionSummary,
    ) -> Self {
        let timestamp = time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| String::from("unknown"));

        RunReport {
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp,
            input: input.display().to_string(),
            output: OutputInfo {
                bed: paths.bed.display().to_string(),
                bim: paths.bim.display().to_string(),
                fam: paths.fam.display().to_string(),
            },
            family_id: family_id.to_string(),
            statistics: Statistics {
                markers: summary.n_markers,
                samples: summary.n_samples,
            },
        }
    }

    /// Write the report as JSON next to the outputs, as `<base>_report.json`.
    pub fn write(&self, out_base: &Path) -> std::io::Result<()> {
        let mut name = out_base.as_os_str().to_os_string();
        name.push("_report.json");
        let report_path = PathBuf::from(name);

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(&report_path, json)?;
        tracing::info!("wrote run report to {}", report_path.display());

        Ok(())
    }
}
