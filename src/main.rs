//! dirdigest - deterministic Merkle digests for directory trees.
//!
//! Usage:
//!   dirdigest [PATH]          Print the indented digest tree (PATH defaults to ./go)
//!   dirdigest --json [PATH]   Print one JSON record per node
//!   dirdigest --help          Show help
//!
//! The chosen projection goes to stdout; diagnostics go to stderr.

mod logging;

use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use color_eyre::eyre::{Context, Result};
use tracing::info;

use dirdigest_core::{
    Composition, DEFAULT_IGNORE_PATTERNS, DigestAlgorithm, DigestConfig, DigestTree,
};
use dirdigest_render::{ListingOptions, write_indented, write_json};
use dirdigest_scan::TreeBuilder;

use crate::logging::{LogFormat, LoggingConfig, init_logging};

const MIB: f64 = 1024.0 * 1024.0;

const COMMIT: &str = match option_env!("DIRDIGEST_COMMIT") {
    Some(commit) => commit,
    None => "feedbac",
};

const BUILD_DATE: &str = match option_env!("DIRDIGEST_BUILD_DATE") {
    Some(date) => date,
    None => "1970-01-01T00:00:00Z",
};

#[derive(Debug, Parser)]
#[command(
    name = "dirdigest",
    version,
    about = "Deterministic Merkle digests for directory trees",
    long_about = "dirdigest hashes every file under a root path and composes \
                  directory digests from their children, so a single root digest \
                  changes whenever any content or structure below it changes."
)]
struct Cli {
    /// Root path to digest
    #[arg(default_value = "./go")]
    path: PathBuf,

    /// Log every visited node to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Print the flattened record list as JSON instead of the indented tree
    #[arg(short, long)]
    json: bool,

    /// Abbreviate digests in the indented tree (first8..last8)
    #[arg(short, long, conflicts_with = "json")]
    short: bool,

    /// Digest function
    #[arg(short, long, default_value = "sha256")]
    algorithm: DigestAlgorithm,

    /// How child digests are combined into a directory digest
    #[arg(short, long, default_value = "raw-bytes")]
    composition: Composition,

    /// Extra entry-name glob pattern to ignore (repeatable)
    #[arg(short = 'i', long = "ignore", value_name = "PATTERN")]
    ignore: Vec<String>,

    /// Do not ignore .DS_Store and @eaDir entries
    #[arg(long)]
    no_default_ignores: bool,

    /// Follow symbolic links instead of recording them as leaves
    #[arg(short = 'L', long)]
    follow_symlinks: bool,

    /// Worker threads (0 = one per CPU, 1 = sequential)
    #[arg(short, long, default_value_t = 0)]
    threads: usize,

    /// Diagnostic line format (defaults to DIRDIGEST_LOG_FORMAT, then text)
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,
}

impl Cli {
    fn ignore_patterns(&self) -> Vec<String> {
        let defaults: &[&str] = if self.no_default_ignores {
            &[][..]
        } else {
            DEFAULT_IGNORE_PATTERNS
        };
        defaults
            .iter()
            .map(|p| (*p).to_string())
            .chain(self.ignore.iter().cloned())
            .collect()
    }

    fn digest_config(&self) -> Result<DigestConfig> {
        DigestConfig::builder()
            .root(self.path.clone())
            .algorithm(self.algorithm)
            .composition(self.composition)
            .ignore_patterns(self.ignore_patterns())
            .follow_symlinks(self.follow_symlinks)
            .threads(self.threads)
            .verbose(self.verbose)
            .build()
            .context("Invalid configuration")
    }

    fn listing_options(&self) -> ListingOptions {
        if self.short {
            ListingOptions::short()
        } else {
            ListingOptions::new()
        }
    }
}

fn build_logging_config(cli: &Cli) -> LoggingConfig {
    LoggingConfig {
        format: cli.log_format,
        ..LoggingConfig::default()
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(&build_logging_config(&cli))?;

    run(&cli)
}

fn run(cli: &Cli) -> Result<()> {
    log_startup(&cli.path);

    let config = cli.digest_config()?;
    let tree = TreeBuilder::new(config)?
        .build()
        .with_context(|| format!("Failed to digest {}", cli.path.display()))?;

    log_summary(&tree);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    emit(&mut out, &tree, cli)?;
    out.flush()?;

    Ok(())
}

/// Write the selected projection of a completed tree.
fn emit<W: Write>(out: &mut W, tree: &DigestTree, cli: &Cli) -> Result<()> {
    if cli.json {
        write_json(out, &tree.root).context("Failed to write JSON output")?;
    } else {
        write_indented(out, &tree.root, &cli.listing_options())
            .context("Failed to write listing")?;
    }
    Ok(())
}

fn log_startup(root: &Path) {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        commit = COMMIT,
        built = BUILD_DATE,
        os = std::env::consts::OS,
        arch = std::env::consts::ARCH,
        "dirdigest starting"
    );
    info!(root = %root.display(), "Digesting");
}

fn log_summary(tree: &DigestTree) {
    let secs = tree.build_duration.as_secs_f64();
    let size_mb = tree.total_size() as f64 / MIB;
    let rate = tree.bytes_per_second() / MIB;
    let digest = tree.root_digest().map(ToString::to_string).unwrap_or_default();

    info!(
        root = %tree.root_path.display(),
        digest = %digest,
        files = tree.total_files(),
        dirs = tree.total_dirs(),
        symlinks = tree.stats.total_symlinks,
        ignored = tree.stats.ignored_entries,
        size_mb = %format!("{size_mb:.2}"),
        size = %humansize::format_size(tree.total_size(), humansize::BINARY),
        elapsed_s = %format!("{secs:.2}"),
        rate_mb_s = %format!("{rate:.2}"),
        "Digest complete"
    );
}
