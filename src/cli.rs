use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use crate::convert::{ConversionConfig, ConversionSummary, convert_calls_file};
use crate::plink::PlinkPaths;
use crate::report::RunReport;

/// Upper bound on the basename and family name lengths.
const NAME_LIMIT: usize = 128;

#[derive(Debug, Parser)]
#[command(author, version, about = "Convert genotype calls tables to PLINK binary (.bed, .bim, .fam)", long_about = None)]
struct Cli {
    /// Input calls file (tab-delimited; `-` reads standard input)
    #[arg(value_name = "CALLS")]
    input: PathBuf,

    /// Basename for the PLINK output files
    #[arg(short, long, value_name = "BASENAME", default_value = "out")]
    out: PathBuf,

    /// Family ID for the first column of the .fam file
    #[arg(short, long, value_name = "FAMILY", default_value = "FAM")]
    fam: String,

    /// Logging verbosity (e.g. error, warn, info, debug)
    #[arg(long, default_value = "info")]
    log_level: String,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    if cli.out.as_os_str().len() > NAME_LIMIT {
        bail!("--out: BASENAME must be at most {NAME_LIMIT} characters");
    }
    if cli.fam.len() > NAME_LIMIT {
        bail!("--fam: family name must be at most {NAME_LIMIT} characters");
    }

    let config = ConversionConfig {
        input: cli.input,
        out_base: cli.out,
        family_id: cli.fam,
    };

    let summary = convert_calls_file(&config)?;

    let paths = PlinkPaths::from_base(&config.out_base);
    RunReport::new(&config.input, &paths, &config.family_id, &summary)
        .write(&config.out_base)
        .context("failed to write run report")?;

    print_summary(&summary, &paths);

    Ok(())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .ok();
}

fn print_summary(summary: &ConversionSummary, paths: &PlinkPaths) {
    println!("Genotypes [ {} ]", paths.bed.display());
    println!("{} markers [ {} ]", summary.n_markers, paths.bim.display());
    println!("{} samples [ {} ]", summary.n_samples, paths.fam.display());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parses_defaults() {
        let cli = Cli::parse_from(["calls2bed", "calls.txt"]);
        assert_eq!(cli.input, PathBuf::from("calls.txt"));
        assert_eq!(cli.out, PathBuf::from("out"));
        assert_eq!(cli.fam, "FAM");
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn parses_short_flags_and_stdin() {
        let cli = Cli::parse_from(["calls2bed", "-o", "myproject", "-f", "trio", "-"]);
        assert_eq!(cli.input, PathBuf::from("-"));
        assert_eq!(cli.out, PathBuf::from("myproject"));
        assert_eq!(cli.fam, "trio");
    }
}
