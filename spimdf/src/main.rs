use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use itertools::Itertools;

use spimcore::algorithm::verification::UPPER_THRESHOLD;
use spimcore::selection::resolver::{resolve, ResolvedSelection};
use spimdf::data::dataset::SpimDataset;
use spimdf::query::{suggested_patterns, SelectionArgs};
use spimdf::workflow::channels::choose_channel_processes;
use spimdf::workflow::histogram::{
    channel_histograms, ChannelHistogram, HistogramConfig, NeighborScope,
};
use spimdf::workflow::verification::{verify_detections, VerificationConfig};

#[derive(Parser, Debug)]
#[command(
    name = "spimdf",
    version,
    about = "View selection and interest point statistics for multi-view datasets"
)]
struct Cli {
    /// Dataset document (JSON)
    dataset: PathBuf,

    #[command(flatten)]
    selection: SelectionArgs,

    /// Print results as JSON instead of text
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the dataset and the resolved selection
    Summary,
    /// Nearest neighbor distance histogram per channel
    Histogram {
        /// Interest point label, defaults to the first label present in all views
        #[arg(long)]
        label: Option<String>,
        /// Use every n-th point on average
        #[arg(long, default_value_t = 1)]
        subsampling: usize,
        #[arg(long, default_value_t = 100)]
        bins: usize,
        /// Seed for sub-sampling, random if omitted
        #[arg(long)]
        seed: Option<u64>,
        /// Search neighbors per view or across the merged channel
        #[arg(long, default_value_t = NeighborScope::PerView)]
        scope: NeighborScope,
    },
    /// Flag views with zero or too many interest points
    Verify {
        #[arg(long, default_value_t = UPPER_THRESHOLD)]
        threshold: usize,
    },
    /// Report the largest number of registered transforms per view
    Registrations,
}

fn print_selection(dataset: &SpimDataset, selection: &ResolvedSelection) {
    println!("{}", dataset.sequence.summary());
    let channels = dataset.channels_of(&selection.views);
    println!("Channels: {}", channels.iter().map(|c| &c.name).join(", "));
    for message in &selection.diagnostics.messages {
        println!("{}", message);
    }
    for warning in &selection.diagnostics.unresolved {
        println!("{}", warning);
    }
    for view in &selection.views {
        println!("  {}", view);
    }
    println!("Range pattern examples:");
    for (flag, pattern) in suggested_patterns(&dataset.sequence) {
        println!("  {} {}", flag, pattern);
    }
}

fn print_histogram(result: &ChannelHistogram) {
    println!("{} label={} views={}", result.title(), result.label, result.views);
    println!("  {}", result.histogram);
    if result.histogram.is_empty() {
        return;
    }
    for (center, count) in result.histogram.bin_centers().iter().zip(&result.histogram.counts) {
        println!("  {:>12.4} {}", center, count);
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let dataset = SpimDataset::load(&cli.dataset)
        .with_context(|| format!("cannot load dataset '{}'", cli.dataset.display()))?;

    let specs = cli.selection.to_specs(&dataset.sequence).context("invalid selection")?;
    let selection = resolve(&dataset.sequence, &specs).context("cannot resolve selection")?;

    match cli.command {
        Command::Summary => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&selection)?);
            } else {
                print_selection(&dataset, &selection);
            }
        }
        Command::Histogram { label, subsampling, bins, seed, scope } => {
            let config = HistogramConfig {
                bin_count: bins,
                scope,
            };
            let views = &selection.views;
            let label = label.as_deref();
            let processes = choose_channel_processes(&dataset, views, label, subsampling)?;
            let histograms = channel_histograms(&dataset, views, &processes, &config, seed)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&histograms)?);
            } else {
                histograms.iter().for_each(print_histogram);
            }
        }
        Command::Verify { threshold } => {
            let config = VerificationConfig { upper_threshold: threshold };
            let report =
                verify_detections(&dataset, &selection.views, &selection.channels, &config)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else if report.is_reasonable() {
                println!("Your dataset seems reasonable ({} counts checked)", report.checked);
            } else {
                println!("Your dataset might have problems: {}", cli.dataset.display());
                for flag in &report.flagged {
                    println!(
                        "  {} at ch: {} angle: {} label: {}: {}",
                        flag.verdict, flag.channel, flag.angle, flag.label, flag.count
                    );
                }
            }

            if !report.is_reasonable() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Registrations => {
            let max = dataset.max_registration_count(&selection.views);
            if cli.json {
                println!("{}", serde_json::json!({ "max_registration_count": max }));
            } else {
                println!("max registrations per view: {}", max);
                let more = dataset.has_more_than_one_registration(&selection.views);
                println!("more than one registration: {}", more);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
