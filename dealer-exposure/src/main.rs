//! Dealer exposure CLI.
//!
//! # Usage
//!
//! ```bash
//! # Analyze the nearest expiry of a captured snapshot
//! dealer-exposure analyze --snapshot data/nifty.json
//!
//! # Next expiry, wider window, projected 12 hours ahead, exported to CSV
//! dealer-exposure analyze --snapshot data/nifty.json --expiry-index 1 \
//!     --strikes-range 20 --hours-forward 12 --csv out/nifty.csv
//!
//! # Gamma decay ladder
//! dealer-exposure project --snapshot data/nifty.json --hours 6,12,24,48
//! ```

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use dealer_exposure::analytics::{ChainAnalysis, FlowMetrics};
use dealer_exposure::data::SnapshotFile;
use dealer_exposure::exposure::{ChainOutcome, ExposureAggregator, ExposureConfig, ExposureTable};
use dealer_exposure::projection::project_ladder;

const SEPARATOR: &str = "============================================================";

#[derive(Parser)]
#[command(name = "dealer-exposure")]
#[command(about = "Dealer gamma and delta exposure analytics for option chains")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every subcommand.
#[derive(Args)]
struct ChainArgs {
    /// Path to a JSON option chain snapshot
    #[arg(short, long)]
    snapshot: PathBuf,

    /// Underlying symbol (defaults to the snapshot's symbol)
    #[arg(long)]
    symbol: Option<String>,

    /// Expiry to analyze, 0 = nearest
    #[arg(short, long, default_value = "0")]
    expiry_index: usize,

    /// Strike spacings kept on each side of the forward
    #[arg(long)]
    strikes_range: Option<u32>,

    /// Path to a JSON exposure configuration
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate a snapshot and print flow metrics, flip zones and key levels
    Analyze {
        #[command(flatten)]
        chain: ChainArgs,

        /// Project the table this many hours ahead before analyzing
        #[arg(long, default_value = "0")]
        hours_forward: f64,

        /// Write the exposure table to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Print the gamma decay ladder for several hour offsets
    Project {
        #[command(flatten)]
        chain: ChainArgs,

        /// Comma-separated hour offsets
        #[arg(long, default_value = "6,12,24", value_delimiter = ',')]
        hours: Vec<f64>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("dealer_exposure=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            chain,
            hours_forward,
            csv,
        } => {
            let Some(table) = load_table(&chain)? else {
                return Ok(());
            };
            let table = if hours_forward > 0.0 {
                let projected = table.project(hours_forward);
                println!(
                    "Projected {:.1}h ahead: {:.2} days to expiry, gamma decay {:.4}",
                    hours_forward,
                    projected.new_days(),
                    projected.gamma_decay()
                );
                projected.table
            } else {
                table
            };
            print_analysis(&table);
            if let Some(path) = csv {
                write_csv(&table, &path)?;
            }
        }
        Commands::Project { chain, hours } => {
            let Some(table) = load_table(&chain)? else {
                return Ok(());
            };
            print_ladder(&table, &hours);
        }
    }

    Ok(())
}

/// Aggregate the requested chain, printing a notice when nothing is available.
fn load_table(args: &ChainArgs) -> Result<Option<ExposureTable>> {
    let mut config = match &args.config {
        Some(path) => ExposureConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ExposureConfig::default(),
    };
    if let Some(range) = args.strikes_range {
        config = config.with_strikes_range(range);
    }

    let source = SnapshotFile::load(&args.snapshot)
        .with_context(|| format!("Failed to load snapshot {}", args.snapshot.display()))?;
    let symbol = match &args.symbol {
        Some(symbol) => symbol.clone(),
        None if !source.symbol.is_empty() => source.symbol.clone(),
        None => config.fallback_symbol.clone(),
    };

    let now = chrono::Local::now().naive_local();
    let aggregator = ExposureAggregator::new(config);
    match aggregator.process_chain(&source, &symbol, args.expiry_index, now) {
        ChainOutcome::NoData(reason) => {
            println!("{}: data unavailable ({})", symbol, reason.description());
            Ok(None)
        }
        outcome => match outcome.into_table() {
            Some(table) => Ok(Some(table)),
            None => {
                println!("{}: data unavailable (empty exposure table)", symbol);
                Ok(None)
            }
        },
    }
}

fn print_analysis(table: &ExposureTable) {
    let meta = &table.meta;
    let Some(analysis) = ChainAnalysis::from_table(table) else {
        println!("{}: data unavailable (empty exposure table)", meta.symbol);
        return;
    };
    let flow = &analysis.flow;

    println!("{}", SEPARATOR);
    println!(
        "{} {} ({:.2} days to expiry)",
        meta.symbol,
        meta.expiry,
        meta.effective_days_to_expiry()
    );
    println!("{}", SEPARATOR);
    println!("Spot:      {:>12.2}", meta.spot_price);
    println!("Forward:   {:>12.2}", meta.forward_price);
    println!("ATM:       {:>12.2}", meta.atm_strike);
    println!(
        "Straddle:  {:>12.2}  (BE {:.2} / {:.2})",
        analysis.straddle.premium, analysis.straddle.lower_breakeven, analysis.straddle.upper_breakeven
    );
    println!();
    println!(
        "Near GEX:  {:>12.4}  {} - {}",
        flow.gex_near_total,
        flow.gex_bias.label(),
        flow.gex_bias.description()
    );
    println!(
        "Near DEX:  {:>12.4}  {} - {}",
        flow.dex_near_total,
        flow.dex_bias.label(),
        flow.dex_bias.description()
    );
    println!(
        "Combined:  {:>12.4}  {} - {}",
        flow.combined_signal,
        flow.combined_bias.label(),
        flow.combined_bias.description()
    );
    println!(
        "Totals:    GEX {:.4} | DEX {:.4} | Vanna {:.4} | Charm {:.4}",
        flow.gex_total, flow.dex_total, flow.vanna_total, flow.charm_total
    );
    println!(
        "Flow:      GEX {:.4} | DEX {:.4}",
        flow.flow_gex_total, flow.flow_dex_total
    );

    println!();
    if analysis.flip_zones.is_empty() {
        println!("No gamma flip zones");
    }
    for (i, zone) in analysis.flip_zones.iter().enumerate() {
        println!(
            "Flip #{}: {:.2} between {:.2} and {:.2} ({}, {})",
            i + 1,
            zone.flip_strike,
            zone.lower_strike,
            zone.upper_strike,
            zone.direction.label(),
            zone.impact.label()
        );
    }

    let levels = &analysis.key_levels;
    println!();
    println!("Max pain:        {:.2}", levels.max_pain);
    println!("Highest call OI: {:.2}", levels.highest_call_oi);
    println!("Highest put OI:  {:.2}", levels.highest_put_oi);
    println!("Max +GEX strike: {:.2}", levels.max_positive_gex);
    println!("Max -GEX strike: {:.2}", levels.max_negative_gex);
    println!(
        "PCR:             {:.3} ({} puts / {} calls)",
        levels.pcr, levels.total_put_oi, levels.total_call_oi
    );

    println!();
    println!(
        "Regime: {} (premium selling {})",
        analysis.regime.regime.description(),
        if analysis.regime.regime.favors_premium_selling() {
            "favored"
        } else {
            "not favored"
        }
    );
    for suggestion in &analysis.regime.suggestions {
        println!("  - {}: {}", suggestion.name(), suggestion.rationale());
    }
}

fn print_ladder(table: &ExposureTable, hours: &[f64]) {
    println!("{}", SEPARATOR);
    println!(
        "{} {} gamma decay ladder ({:.2} days to expiry)",
        table.meta.symbol,
        table.meta.expiry,
        table.meta.effective_days_to_expiry()
    );
    println!("{}", SEPARATOR);
    println!("{:>8} {:>10} {:>8} {:>12}  Bias", "Hours", "Days", "Decay", "Near GEX");

    for projected in project_ladder(table, hours) {
        let flow = FlowMetrics::compute(projected.table.rows(), table.meta.forward_price);
        println!(
            "{:>8.1} {:>10.2} {:>8.4} {:>12.4}  {}",
            projected.projection.hours_forward,
            projected.new_days(),
            projected.gamma_decay(),
            flow.gex_near_total,
            flow.gex_bias.label()
        );
    }
}

fn write_csv(table: &ExposureTable, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    table.write_csv(&mut writer)?;
    info!(path = %path.display(), rows = table.len(), "Wrote exposure CSV");
    Ok(())
}
