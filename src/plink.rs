//! PLINK 1.9 binary writer (.bed, .bim, .fam).
//!
//! The `.bed` container starts with a 3-byte header and then holds one row
//! per marker in SNP-major mode: 2 bits per sample, four samples per byte,
//! earlier samples in the lower bits, rows packed back-to-back with no
//! padding. Reference: https://www.cog-genomics.org/plink/1.9/formats#bed

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use crate::calls::Genotype;

/// BED magic number. Serialized big-endian so the bytes on disk read
/// `0x6C 0x1B`, the order fixed by the format.
const MAGIC: u16 = 0x6C1B;

/// Mode byte 1: SNP-major rows, one marker's genotypes per row.
const MODE_SNP_MAJOR: u8 = 0x01;

/// Primitive writes in the container header: one short, one byte.
const HEADER_WRITES: usize = 2;

/// The container header did not write the expected number of primitive units.
#[derive(Debug, Error)]
#[error("bed header wrote {written} units, expected {expected}")]
pub struct HeaderWriteMismatch {
    pub expected: usize,
    pub written: usize,
}

/// Output paths derived from a base name by appending the three extensions.
#[derive(Clone, Debug)]
pub struct PlinkPaths {
    pub bed: PathBuf,
    pub bim: PathBuf,
    pub fam: PathBuf,
}

impl PlinkPaths {
    pub fn from_base(base: &Path) -> Self {
        let with_suffix = |suffix: &str| {
            let mut name = base.as_os_str().to_os_string();
            name.push(suffix);
            PathBuf::from(name)
        };

        Self {
            bed: with_suffix(".bed"),
            bim: with_suffix(".bim"),
            fam: with_suffix(".fam"),
        }
    }
}

/// Pack genotype codes four to a byte, earlier samples in the low bits.
///
/// `row` must hold `genotypes.len().div_ceil(4)` bytes; it is fully
/// overwritten, so unused high bits of a trailing partial byte are zero.
pub fn pack_row(genotypes: &[Genotype], row: &mut [u8]) {
    row.fill(0);
    for (i, genotype) in genotypes.iter().enumerate() {
        row[i / 4] |= genotype.bits() << (2 * (i % 4));
    }
}

/// Unpack a `.bed` row back into genotype codes, in sample order.
pub fn unpack_row(row: &[u8], n_samples: usize) -> Vec<Genotype> {
    (0..n_samples)
        .map(|i| Genotype::from_bits(row[i / 4] >> (2 * (i % 4))))
        .collect()
}

/// Writer owning the three PLINK output handles for the process lifetime.
#[derive(Debug)]
pub struct PlinkWriter {
    bed: BufWriter<File>,
    bim: BufWriter<File>,
    fam: BufWriter<File>,
    n_samples: usize,
    /// Reused per-marker row buffer, sized once as ⌈N/4⌉ bytes.
    row: Vec<u8>,
    n_markers: u64,
}

impl PlinkWriter {
    /// Create the three output files and write the `.bed` header.
    pub fn create(paths: &PlinkPaths, n_samples: usize) -> Result<Self> {
        let mut bed = File::create(&paths.bed)
            .map(BufWriter::new)
            .with_context(|| format!("failed to create {}", paths.bed.display()))?;

        let written = write_bed_header(&mut bed).context("failed to write bed header")?;
        if written != HEADER_WRITES {
            return Err(HeaderWriteMismatch {
                expected: HEADER_WRITES,
                written,
            }
            .into());
        }

        let bim = File::create(&paths.bim)
            .map(BufWriter::new)
            .with_context(|| format!("failed to create {}", paths.bim.display()))?;
        let fam = File::create(&paths.fam)
            .map(BufWriter::new)
            .with_context(|| format!("failed to create {}", paths.fam.display()))?;

        Ok(Self {
            bed,
            bim,
            fam,
            n_samples,
            row: vec![0; n_samples.div_ceil(4)],
            n_markers: 0,
        })
    }

    /// Write one `.fam` row per sample.
    ///
    /// Paternal and maternal IDs, sex, and phenotype are unknown to the
    /// calls table and emitted as the conventional placeholders.
    pub fn write_fam(&mut self, family_id: &str, samples: &[String]) -> io::Result<()> {
        for sample in samples {
            writeln!(self.fam, "{family_id}\t{sample}\t0\t0\t0\t-9")?;
        }
        Ok(())
    }

    /// Write one marker: a `.bim` row and a packed `.bed` row.
    ///
    /// `genotypes` must hold exactly one code per sample, in header order.
    pub fn write_marker(&mut self, marker_id: &str, genotypes: &[Genotype]) -> io::Result<()> {
        debug_assert_eq!(genotypes.len(), self.n_samples);

        writeln!(self.bim, "0\t{marker_id}\t0\t0\t-\t-")?;

        pack_row(genotypes, &mut self.row);
        self.bed.write_all(&self.row)?;

        self.n_markers += 1;
        Ok(())
    }

    pub fn markers_written(&self) -> u64 {
        self.n_markers
    }

    pub fn bytes_per_marker(&self) -> usize {
        self.row.len()
    }

    /// Flush all three outputs.
    pub fn finish(mut self) -> io::Result<()> {
        self.bed.flush()?;
        self.bim.flush()?;
        self.fam.flush()
    }
}

/// Write the 3-byte container header, returning the number of primitive
/// write units performed (the magic short, then the mode byte).
fn write_bed_header<W: Write>(bed: &mut W) -> io::Result<usize> {
    let mut written = 0;
    bed.write_all(&MAGIC.to_be_bytes())?;
    written += 1;
    bed.write_all(&[MODE_SNP_MAJOR])?;
    written += 1;
    Ok(written)
}
