//! Command-line interface components.

use crate::config::{ChargeConfig, CompressionAlgorithm, ExportFormat, PricingPaths};
use crate::dashboard::pricing::PricingData;
use crate::dashboard::{Dashboard, print_summary};
use crate::models::Province;
use crate::processor::StationPipeline;
use crate::telemetry::TracingObserver;
use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "chargecompare")]
#[command(about = "Classify Canadian EV charging stations and render province maps and dashboards")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Configuration file (TOML or JSON); defaults to <config dir>/chargecompare/config.toml
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase logging verbosity (-v: debug, -vv: trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only show warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render one marker map per province or territory
    Maps(MapsArgs),
    /// Render the province dashboard pages
    Dashboard(DashboardArgs),
    /// Print province figures to the terminal
    Summary(SummaryArgs),
    /// Export the classified stations as Parquet or CSV
    Export(ExportArgs),
}

/// Options shared by every command
#[derive(ClapArgs, Debug, Default)]
pub struct InputArgs {
    /// AFDC station export (latest alt_fuel_stations*.csv in the current directory if omitted)
    #[arg(short, long, value_name = "CSV")]
    pub input: Option<PathBuf>,

    /// Network lookup table override (TOML or JSON)
    #[arg(long, value_name = "FILE")]
    pub network_tables: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
pub struct MapsArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output directory for <CODE>_map.html files
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Initial zoom level of the maps
    #[arg(long)]
    pub zoom: Option<u8>,
}

#[derive(ClapArgs, Debug)]
pub struct DashboardArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Directory of previously rendered maps
    #[arg(long, value_name = "DIR")]
    pub maps_dir: Option<PathBuf>,

    /// Output directory for the dashboard pages
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Network pricing metadata sheet
    #[arg(long, value_name = "CSV")]
    pub pricing_metadata: Option<PathBuf>,

    /// Level 2 price ranges
    #[arg(long, value_name = "CSV")]
    pub l2_pricing: Option<PathBuf>,

    /// Level 3 price ranges
    #[arg(long, value_name = "CSV")]
    pub l3_pricing: Option<PathBuf>,

    /// Restrict to these provinces (code or name); repeatable
    #[arg(short, long = "province", value_name = "PROVINCE")]
    pub provinces: Vec<String>,
}

#[derive(ClapArgs, Debug)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Restrict to these provinces (code or name); repeatable
    #[arg(short, long = "province", value_name = "PROVINCE")]
    pub provinces: Vec<String>,
}

#[derive(ClapArgs, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output file; the format follows the extension unless --format is given
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Parquet compression algorithm (snappy, zstd, lz4, none)
    #[arg(long)]
    pub compression: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Parquet,
    Csv,
}

impl From<FormatArg> for ExportFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Parquet => ExportFormat::Parquet,
            FormatArg::Csv => ExportFormat::Csv,
        }
    }
}

impl Args {
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "warn";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

/// Set up structured logging on stderr
pub fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.log_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("chargecompare={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    debug!("Logging initialized at level: {}", log_level);
}

/// Parse province selectors; empty means every dashboard province
pub fn parse_provinces(values: &[String]) -> Result<Vec<Province>> {
    if values.is_empty() {
        return Ok(Province::DASHBOARD.to_vec());
    }
    values
        .iter()
        .map(|value| {
            Province::parse(value).with_context(|| format!("Unknown province '{}'", value))
        })
        .collect()
}

/// Layer defaults, config file and the shared input options
fn base_config(args: &Args, input: &InputArgs) -> Result<ChargeConfig> {
    let mut config = ChargeConfig::load_layered(args.config.as_deref())?;

    let input_path = match (&input.input, &config.input_path) {
        (Some(path), _) => path.clone(),
        (None, Some(path)) => path.clone(),
        (None, None) => input_discovery::find_latest_export(&std::env::current_dir()?)?,
    };
    config = config.with_input_path(input_path);

    if let Some(path) = &input.network_tables {
        config = config.with_network_tables(path.clone());
    }
    Ok(config)
}

/// Execute the selected command
pub async fn run(args: Args, cancel: CancellationToken) -> Result<()> {
    let Some(command) = &args.command else {
        return Ok(());
    };

    match command {
        Commands::Maps(maps) => {
            let mut config = base_config(&args, &maps.input)?;
            if let Some(dir) = &maps.output {
                config = config.with_maps_dir(dir.clone());
            }
            if let Some(zoom) = maps.zoom {
                config = config.with_zoom_start(zoom);
            }
            config.validate()?;

            let pipeline = StationPipeline::new(config)?.with_progress(!args.quiet);
            print_header(&pipeline);
            let records = pipeline.classify_input()?.records;
            pipeline.export_maps(&records, &cancel).await?;
        }
        Commands::Dashboard(dash) => {
            let mut config = base_config(&args, &dash.input)?;
            if let Some(dir) = &dash.maps_dir {
                config = config.with_maps_dir(dir.clone());
            }
            if let Some(dir) = &dash.output {
                config = config.with_dashboard_dir(dir.clone());
            }
            let defaults = config.pricing.clone();
            config = config.with_pricing(PricingPaths {
                metadata: dash.pricing_metadata.clone().unwrap_or(defaults.metadata),
                level2_ranges: dash.l2_pricing.clone().unwrap_or(defaults.level2_ranges),
                level3_ranges: dash.l3_pricing.clone().unwrap_or(defaults.level3_ranges),
            });
            config.validate()?;
            let provinces = parse_provinces(&dash.provinces)?;

            let pipeline = StationPipeline::new(config)?.with_progress(!args.quiet);
            print_header(&pipeline);
            let records = pipeline.classify_input()?.records;
            pipeline
                .build_dashboard(&records, &provinces, &TracingObserver)
                .await?;
        }
        Commands::Summary(summary) => {
            let config = base_config(&args, &summary.input)?;
            config.validate()?;
            let provinces = parse_provinces(&summary.provinces)?;

            let pipeline = StationPipeline::new(config)?;
            let records = pipeline.classify_input()?.records;
            let pricing = PricingData::default();
            let dashboard = Dashboard::new(&records, &pricing, pipeline.tables(), &TracingObserver);

            println!();
            for province in provinces {
                if cancel.is_cancelled() {
                    break;
                }
                print_summary(&dashboard.province_page(province, None));
            }
        }
        Commands::Export(export) => {
            let mut config = base_config(&args, &export.input)?;
            if let Some(path) = &export.output {
                config = config.with_export_path(path.clone());
            }
            if let Some(format) = export.format {
                config = config.with_export_format(format.into());
            }
            if let Some(compression) = &export.compression {
                config = config.with_compression(compression.parse::<CompressionAlgorithm>()?);
            }
            config.validate()?;

            let pipeline = StationPipeline::new(config)?;
            print_header(&pipeline);
            let records = pipeline.classify_input()?.records;
            pipeline.export_dataset(&records).await?;
        }
    }

    Ok(())
}

fn print_header(pipeline: &StationPipeline) {
    println!("{}", "ChargeCompare".bright_green().bold());
    println!(
        "  {} {}",
        "Input:".bright_cyan(),
        pipeline.input_path().display()
    );
    println!(
        "  {} v{}",
        "Network tables:".bright_cyan(),
        pipeline.tables().version
    );
}

/// Locating the station export when no path is given
pub mod input_discovery {
    use crate::constants::DEFAULT_INPUT_PREFIX;
    use anyhow::{Context, Result};
    use std::path::{Path, PathBuf};
    use std::time::SystemTime;

    /// Most recently modified `alt_fuel_stations*.csv` in `dir`
    pub fn find_latest_export(dir: &Path) -> Result<PathBuf> {
        let mut latest: Option<(SystemTime, PathBuf)> = None;

        for entry in std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read directory {}", dir.display()))?
        {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();
            if !is_station_export(&path) {
                continue;
            }

            let modified = entry
                .metadata()
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            if latest.as_ref().is_none_or(|(t, _)| modified > *t) {
                latest = Some((modified, path));
            }
        }

        latest.map(|(_, path)| path).with_context(|| {
            format!(
                "No {}*.csv file found in {}. Pass --input to select the station export.",
                DEFAULT_INPUT_PREFIX,
                dir.display()
            )
        })
    }

    fn is_station_export(path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        path.is_file()
            && name.starts_with(DEFAULT_INPUT_PREFIX)
            && path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_finds_export_and_ignores_others() {
            let dir = tempfile::tempdir().unwrap();
            std::fs::write(dir.path().join("L2_pricing.csv"), "").unwrap();
            std::fs::write(dir.path().join("alt_fuel_stations.txt"), "").unwrap();
            std::fs::write(dir.path().join("alt_fuel_stations (Jul 2025).csv"), "").unwrap();

            let found = find_latest_export(dir.path()).unwrap();
            assert_eq!(found.file_name().unwrap(), "alt_fuel_stations (Jul 2025).csv");
        }

        #[test]
        fn test_missing_export_is_an_error() {
            let dir = tempfile::tempdir().unwrap();
            let message = format!("{:#}", find_latest_export(dir.path()).unwrap_err());
            assert!(message.contains("--input"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        let args = Args::parse_from([
            "chargecompare",
            "-v",
            "dashboard",
            "--input",
            "stations.csv",
            "-p",
            "NB",
            "--province",
            "Quebec",
        ]);
        assert_eq!(args.log_level(), "debug");

        let Some(Commands::Dashboard(dash)) = &args.command else {
            panic!("expected dashboard command");
        };
        assert_eq!(dash.input.input, Some(PathBuf::from("stations.csv")));
        assert_eq!(
            parse_provinces(&dash.provinces).unwrap(),
            vec![Province::NewBrunswick, Province::Quebec]
        );
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Args::try_parse_from(["chargecompare", "-q", "-v", "maps"]).is_err());
        let args = Args::parse_from(["chargecompare", "maps", "-q"]);
        assert_eq!(args.log_level(), "warn");
    }

    #[test]
    fn test_default_provinces() {
        assert_eq!(parse_provinces(&[]).unwrap().len(), 10);
        assert!(parse_provinces(&["Atlantis".to_string()]).is_err());
    }

    #[test]
    fn test_export_args() {
        let args = Args::parse_from([
            "chargecompare",
            "export",
            "-o",
            "out.csv",
            "--compression",
            "zstd",
        ]);
        let Some(Commands::Export(export)) = &args.command else {
            panic!("expected export command");
        };
        assert_eq!(export.output, Some(PathBuf::from("out.csv")));
        assert!(export.format.is_none());
    }
}
