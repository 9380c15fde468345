//! Pagegroup CLI.
//!
//! One job: read a Stage 1 OCR artifact, group it, write the grouping
//! artifact. Exit code 0 on success (artifact written), 2 on any failure
//! (nothing written); failures print a single structured JSON error object
//! on stderr. Log verbosity comes from flags, never from the environment.

use clap::Parser;
use pagegroup::{run_to_path, GroupingConfig};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "pagegroup")]
#[command(about = "Deterministic structural grouping of OCR tokens into lines, blocks, and regions", long_about = None)]
struct Cli {
    /// Stage 1 OCR artifact (JSON)
    input: PathBuf,

    /// Output path for the grouping artifact (JSON)
    output: PathBuf,

    /// Drop tokens with confidence strictly below this floor
    #[arg(long, default_value_t = 0.0)]
    confidence_floor: f64,

    /// Retain tokens whose text is entirely whitespace
    #[arg(long)]
    keep_whitespace_tokens: bool,

    /// Swap inverted bbox endpoints instead of treating them as invalid
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set, value_name = "BOOL")]
    bbox_repair: bool,

    /// Minimum y-overlap ratio for a token to join an open line
    #[arg(long, default_value_t = 0.5)]
    line_y_overlap_threshold: f64,

    /// Line center tolerance as a multiple of median token height
    #[arg(long, default_value_t = 0.7)]
    line_y_center_k: f64,

    /// Floor for the line center tolerance, in pixels
    #[arg(long, default_value_t = 2)]
    min_line_y_tol_px: i64,

    /// Block gap threshold as a multiple of median token height
    #[arg(long, default_value_t = 1.5)]
    block_y_gap_k: f64,

    /// Floor for the block gap threshold, in pixels
    #[arg(long, default_value_t = 2)]
    min_block_gap_px: i64,

    /// Minimum x-overlap ratio for a line to extend the open block
    #[arg(long, default_value_t = 0.1)]
    block_x_overlap_threshold: f64,

    /// Minimum TITLE_BLOCK candidate area as a fraction of the page image
    #[arg(long, default_value_t = 0.0)]
    region_min_area_fraction: f64,

    /// Skip the region labeler entirely
    #[arg(long)]
    disable_regions: bool,

    /// Reserved: enable geometry-only cell candidate detection
    #[arg(long)]
    enable_cell_candidates: bool,

    /// Omit the joined text field from lines and blocks
    #[arg(long)]
    omit_text_fields: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Log errors only
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn grouping_config(&self) -> GroupingConfig {
        GroupingConfig {
            confidence_floor: self.confidence_floor,
            keep_whitespace_tokens: self.keep_whitespace_tokens,
            bbox_repair: self.bbox_repair,
            line_y_overlap_threshold: self.line_y_overlap_threshold,
            line_y_center_k: self.line_y_center_k,
            min_line_y_tol_px: self.min_line_y_tol_px,
            block_y_gap_k: self.block_y_gap_k,
            min_block_gap_px: self.min_block_gap_px,
            block_x_overlap_threshold: self.block_x_overlap_threshold,
            region_min_area_fraction: self.region_min_area_fraction,
            disable_regions: self.disable_regions,
            enable_cell_candidates: self.enable_cell_candidates,
            omit_text_fields: self.omit_text_fields,
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing::Level;

    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let config = cli.grouping_config();
    match run_to_path(&cli.input, &cli.output, &config) {
        Ok(summary) => {
            println!(
                "doc_id={} pages={} lines={} blocks={} dropped_tokens={} out={}",
                summary.doc_id,
                summary.n_pages,
                summary.n_lines,
                summary.n_blocks,
                summary.n_dropped_tokens,
                cli.output.display()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}", err.to_record());
            ExitCode::from(2)
        }
    }
}
