use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::calls::{Genotype, Reader};
use crate::plink::{PlinkPaths, PlinkWriter};
use crate::smart_reader;

/// Configuration required to drive a conversion.
#[derive(Debug, Clone)]
pub struct ConversionConfig {
    /// Input calls file; `-` reads standard input.
    pub input: PathBuf,
    /// Basename the three output extensions are appended to.
    pub out_base: PathBuf,
    /// Family ID for the first column of every `.fam` row.
    pub family_id: String,
}

/// Counters reported after a completed conversion.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub struct ConversionSummary {
    pub n_markers: u64,
    pub n_samples: usize,
}

/// Convert a genotype calls table into the PLINK binary triplet.
///
/// Streams the input one line at a time: the header determines the sample
/// count and the `.fam` rows, then every data line becomes one `.bim` row
/// and one packed `.bed` row. Any failure is fatal; partially written
/// outputs are left behind and a rerun recreates all three.
pub fn convert_calls_file(config: &ConversionConfig) -> Result<ConversionSummary> {
    tracing::info!(
        input = %config.input.display(),
        out = %config.out_base.display(),
        family = %config.family_id,
        "starting conversion",
    );

    let input = smart_reader::open_input(&config.input)
        .with_context(|| format!("failed to open input {}", config.input.display()))?;
    let mut reader = Reader::new(input);

    let header = reader
        .read_header()
        .with_context(|| format!("failed to read header from {}", config.input.display()))?;
    let n_samples = header.sample_count();
    tracing::debug!(samples = n_samples, "parsed calls header");

    let paths = PlinkPaths::from_base(&config.out_base);
    let mut writer = PlinkWriter::create(&paths, n_samples)?;
    writer
        .write_fam(&config.family_id, header.samples())
        .with_context(|| format!("failed to write {}", paths.fam.display()))?;

    let mut genotypes: Vec<Genotype> = Vec::with_capacity(n_samples);
    while let Some(marker_id) = reader
        .next_marker(n_samples, &mut genotypes)
        .with_context(|| format!("failed to parse {}", config.input.display()))?
    {
        writer
            .write_marker(marker_id, &genotypes)
            .with_context(|| format!("failed to write marker to {}", paths.bed.display()))?;

        let converted = writer.markers_written();
        if converted % 1000 == 0 {
            tracing::info!(markers = converted, "converting");
        }
    }

    let n_markers = writer.markers_written();
    writer.finish().context("failed to flush plink outputs")?;

    tracing::info!(markers = n_markers, samples = n_samples, "conversion complete");

    Ok(ConversionSummary {
        n_markers,
        n_samples,
    })
}
