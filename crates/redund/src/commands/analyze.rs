//! Analyze command: repeated sentence and phrase detection.

use anyhow::{Context, bail};
use camino::Utf8PathBuf;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::{OwoColorize, Stream};
use tracing::{debug, instrument};

use redund_core::analysis::Repetition;
use redund_core::batch::{self, BatchInput, BatchItem, BatchOptions, BatchReport};
use redund_core::config::Config;

/// Arguments for the `analyze` subcommand.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Files to analyze (.txt, .md, .html, .docx, .rtf).
    pub files: Vec<Utf8PathBuf>,

    /// Inline text to analyze before any files.
    #[arg(long)]
    pub text: Option<String>,

    /// Show at most N entries per list.
    #[arg(long, value_name = "N", default_value_t = 10)]
    pub limit: usize,

    /// Fail when the total number of repetitions exceeds N.
    #[arg(long, value_name = "N")]
    pub max_repeats: Option<usize>,
}

/// Find repetitions in every input and report them.
#[instrument(name = "cmd_analyze", skip_all, fields(files = args.files.len()))]
pub fn cmd_analyze(
    args: AnalyzeArgs,
    global_json: bool,
    config: &Config,
    max_input_chars: Option<usize>,
) -> anyhow::Result<()> {
    debug!(
        inline = args.text.is_some(),
        limit = args.limit,
        max_repeats = ?args.max_repeats,
        "executing analyze command"
    );

    let inputs = args
        .text
        .iter()
        .map(BatchInput::inline)
        .chain(args.files.iter().map(BatchInput::file));
    let inputs = batch::prepare_inputs(inputs)?;
    let options = BatchOptions {
        settings: config.detector,
        max_input_chars,
    };

    let report = run_with_progress(&inputs, &options, global_json)?;

    if global_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for item in &report.results {
            print_item(item, args.limit);
        }
        println!(
            "\n{} {}",
            "Total repetitions:".if_supports_color(Stream::Stdout, |t| t.bold()),
            report.total_repetitions
        );
    }

    let max_repeats = args.max_repeats.or(config.max_repetitions);
    if let Some(max) = max_repeats
        && report.total_repetitions > max
    {
        bail!(
            "found {} repetitions (max: {max}). Rephrase the repeated passages.",
            report.total_repetitions,
        );
    }

    Ok(())
}

/// Analyze inputs one by one, ticking a progress bar on stderr.
fn run_with_progress(
    inputs: &[BatchInput],
    options: &BatchOptions,
    hidden: bool,
) -> anyhow::Result<BatchReport> {
    let pb = if hidden || inputs.len() < 2 {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(inputs.len() as u64)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  Analyzing [{bar:30}] {pos}/{len} {wide_msg}")
            .context("invalid progress bar template")?,
    );

    let mut items = Vec::with_capacity(inputs.len());
    for input in inputs {
        pb.set_message(input.source());
        items.push(batch::analyze_input(input, options));
        pb.inc(1);
    }
    pb.finish_and_clear();

    Ok(BatchReport::from_items(items))
}

fn print_item(item: &BatchItem, limit: usize) {
    let kind = format!("({})", item.kind);
    println!(
        "\n{} {}",
        item.source.if_supports_color(Stream::Stdout, |t| t.bold()),
        kind.if_supports_color(Stream::Stdout, |t| t.dimmed())
    );

    if let Some(ref err) = item.error {
        println!(
            "  {} {err}",
            "error:".if_supports_color(Stream::Stdout, |t| t.red())
        );
        return;
    }
    let Some(ref analysis) = item.analysis else {
        return;
    };
    if analysis.is_clean() {
        println!(
            "  {}",
            "No repetitions found.".if_supports_color(Stream::Stdout, |t| t.green())
        );
        return;
    }

    print_list("Repeated sentences", &analysis.sentences, limit);
    print_list("Repeated phrases", &analysis.phrases, limit);
}

fn print_list(label: &str, entries: &[Repetition], limit: usize) {
    if entries.is_empty() {
        return;
    }
    let heading = format!("{label}:");
    println!(
        "  {} {}",
        heading.if_supports_color(Stream::Stdout, |t| t.cyan()),
        entries.len()
    );
    for entry in entries.iter().take(limit) {
        let lines = format!("(lines {})", format_lines(&entry.lines));
        println!(
            "    {}x \"{}\" {}",
            entry.count.if_supports_color(Stream::Stdout, |t| t.yellow()),
            entry.text,
            lines.if_supports_color(Stream::Stdout, |t| t.dimmed()),
        );
    }
    if entries.len() > limit {
        let rest = format!("... and {} more", entries.len() - limit);
        println!("    {}", rest.if_supports_color(Stream::Stdout, |t| t.dimmed()));
    }
}

/// Render line numbers as `1, 3, 7`.
fn format_lines(lines: &[usize]) -> String {
    lines
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
