//! symfind - Catalog marker-prefixed symbols embedded in compiled binaries
//!
//! This tool streams binary files, extracts the zero-terminated symbol names
//! that follow a fixed marker, and records them alongside the file's content
//! digest, either next to each input or in one shared JSON catalog.

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use symfind_core::collection::is_sidecar;
use symfind_core::{
    sidecar_path, DigestAlgorithm, Extractor, ExtractorConfig, FileRecord, Marker,
    SymbolCollection, DEFAULT_CHUNK_SIZE,
};
use tracing::{debug, info, trace, Level};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

/// Catalog marker-prefixed symbols embedded in compiled binaries
#[derive(Parser, Debug)]
#[command(name = "symfind")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
struct Cli {
    /// Binary files to scan
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// Overwrite existing per-file symbol collections
    #[arg(long, visible_alias = "force")]
    clobber: bool,

    /// Merge all results into a single collection file
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Descend into directory arguments
    #[arg(short, long)]
    recursive: bool,

    /// Nominal read chunk size in bytes
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Marker token preceding each symbol
    #[arg(long, default_value = "OlPrEfIx")]
    marker: String,

    /// Content digest algorithm
    #[arg(long, value_enum, default_value = "sha256")]
    digest: DigestArg,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Digest algorithm selectable on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
enum DigestArg {
    /// SHA-256, compatible with existing catalogs
    Sha256,
    /// BLAKE3
    Blake3,
}

impl From<DigestArg> for DigestAlgorithm {
    fn from(arg: DigestArg) -> Self {
        match arg {
            DigestArg::Sha256 => DigestAlgorithm::Sha256,
            DigestArg::Blake3 => DigestAlgorithm::Blake3,
        }
    }
}

/// Where results are written
#[derive(Debug, Clone, PartialEq, Eq)]
enum OutputMode {
    /// One `<input>.symbols.json` per input
    PerFile {
        /// Replace existing outputs instead of skipping the input
        clobber: bool,
    },
    /// Every result merged into one collection
    Aggregate(PathBuf),
}

/// Immutable settings for one run
#[derive(Debug, Clone)]
struct RunConfig {
    inputs: Vec<PathBuf>,
    recursive: bool,
    output: OutputMode,
    extractor: ExtractorConfig,
}

impl RunConfig {
    fn from_cli(cli: &Cli) -> Result<Self> {
        let marker = Marker::new(cli.marker.as_bytes()).context("Invalid --marker")?;
        if cli.chunk_size == 0 {
            bail!("--chunk-size must be greater than zero");
        }

        let output = match &cli.output {
            Some(path) => OutputMode::Aggregate(path.clone()),
            None => OutputMode::PerFile {
                clobber: cli.clobber,
            },
        };

        Ok(Self {
            inputs: cli.files.clone(),
            recursive: cli.recursive,
            output,
            extractor: ExtractorConfig::new()
                .chunk_size(cli.chunk_size)
                .marker(marker)
                .algorithm(cli.digest.into()),
        })
    }
}

/// Outcome of processing one input
#[derive(Debug, Clone, PartialEq, Eq)]
enum FileOutcome {
    /// Symbols were extracted and written
    Written { symbols: usize },
    /// Per-file output already existed
    Skipped { existing: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = RunConfig::from_cli(&cli)?;
    run(&config)
}

/// Process every input in order, stopping at the first failure
fn run(config: &RunConfig) -> Result<()> {
    let inputs = collect_inputs(config)?;
    let extractor = Extractor::with_config(config.extractor.clone());

    match &config.output {
        OutputMode::PerFile { clobber } => {
            for input in &inputs {
                match process_per_file(&extractor, input, *clobber)? {
                    FileOutcome::Written { symbols } => {
                        println!("{}: {} symbols", input.display(), symbols)
                    }
                    FileOutcome::Skipped { existing } => {
                        println!("Skipping existing file: {}", existing.display())
                    }
                }
            }
        }
        OutputMode::Aggregate(path) => {
            // Load before scanning so a malformed catalog aborts early
            let mut collection = SymbolCollection::load(path)
                .with_context(|| format!("Failed to load collection: {}", path.display()))?;
            info!(
                "Aggregating into {} ({} existing records)",
                path.display(),
                collection.len()
            );

            for input in &inputs {
                let symbols = process_into_collection(&extractor, input, &mut collection)?;
                collection
                    .save(path)
                    .with_context(|| format!("Failed to write collection: {}", path.display()))?;
                println!("{}: {} symbols", input.display(), symbols);
            }
        }
    }

    Ok(())
}

/// Expand the positional arguments into the list of files to scan
fn collect_inputs(config: &RunConfig) -> Result<Vec<PathBuf>> {
    let aggregate = match &config.output {
        OutputMode::Aggregate(path) => Some(path.as_path()),
        OutputMode::PerFile { .. } => None,
    };

    let mut files = Vec::new();
    for input in &config.inputs {
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }
        if !config.recursive {
            bail!(
                "Input path is a directory: {} (use --recursive to descend)",
                input.display()
            );
        }

        info!("Scanning directory: {}", input.display());
        for entry in WalkDir::new(input)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
        {
            let entry = entry
                .with_context(|| format!("Failed to walk directory: {}", input.display()))?;
            let path = entry.path();
            if should_scan(path, aggregate) {
                files.push(path.to_path_buf());
            } else {
                trace!("Skipping {}", path.display());
            }
        }
    }

    Ok(files)
}

/// Filter for files discovered while walking a directory
fn should_scan(path: &Path, aggregate: Option<&Path>) -> bool {
    if !path.is_file() {
        return false;
    }

    // Skip hidden files
    if path
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
    {
        return false;
    }

    if is_sidecar(path) {
        return false;
    }

    aggregate.map_or(true, |output| !same_file(path, output))
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Scan one input and write its own single-record collection
fn process_per_file(extractor: &Extractor, input: &Path, clobber: bool) -> Result<FileOutcome> {
    let output = sidecar_path(input);
    if output.exists() && !clobber {
        debug!("Output exists, not clobbering: {}", output.display());
        return Ok(FileOutcome::Skipped { existing: output });
    }

    let record = scan(extractor, input)?;
    let symbols = record.symbols.len();
    SymbolCollection::from(record)
        .save(&output)
        .with_context(|| format!("Failed to write symbols: {}", output.display()))?;

    Ok(FileOutcome::Written { symbols })
}

/// Scan one input and upsert its record into `collection`
fn process_into_collection(
    extractor: &Extractor,
    input: &Path,
    collection: &mut SymbolCollection,
) -> Result<usize> {
    let record = scan(extractor, input)?;
    let symbols = record.symbols.len();
    collection.upsert(record);
    Ok(symbols)
}

fn scan(extractor: &Extractor, input: &Path) -> Result<FileRecord> {
    trace!("Reading {}", input.display());
    let extraction = extractor
        .extract_file(input)
        .with_context(|| format!("Failed to process file: {}", input.display()))?;

    debug!(
        "{}: {} bytes in {} chunks, digest {}",
        input.display(),
        extraction.bytes_scanned,
        extraction.chunks,
        extraction.digest
    );

    Ok(FileRecord::from_extraction(input, extraction))
}
