//! Processing pipeline.
//!
//! Orchestrates one run: load the station export, classify it once, then
//! fan the classified records out to the map renderer, the dashboard
//! presenter or the dataset exporter.

use crate::classifier::{Classification, classify};
use crate::config::ChargeConfig;
use crate::dashboard::Dashboard;
use crate::dashboard::pricing::PricingData;
use crate::error::{ChargeError, Result};
use crate::loader::{load_price_ranges, load_pricing_metadata, load_stations};
use crate::lookup::NetworkTables;
use crate::map::{ProvinceMap, jurisdictions, map_file_name};
use crate::models::{ClassificationStats, ProcessingStats, Province, StationRecord};
use crate::telemetry::SessionObserver;
use crate::writer::write_records;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::fs;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Pipeline over one station export
pub struct StationPipeline {
    input_path: PathBuf,
    config: ChargeConfig,
    tables: NetworkTables,
    show_progress: bool,
}

impl StationPipeline {
    /// Create a pipeline; the configuration must name an input file
    pub fn new(config: ChargeConfig) -> Result<Self> {
        let input_path = config
            .input_path
            .clone()
            .ok_or_else(|| ChargeError::configuration("No station input file configured"))?;

        if !input_path.exists() {
            return Err(ChargeError::InputNotFound { path: input_path });
        }

        let tables = NetworkTables::load(config.network_tables_path.as_deref())?;

        Ok(Self {
            input_path,
            config,
            tables,
            show_progress: true,
        })
    }

    /// Enable or disable the console progress bar
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn config(&self) -> &ChargeConfig {
        &self.config
    }

    pub fn tables(&self) -> &NetworkTables {
        &self.tables
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    /// Load and classify the station export
    pub fn classify_input(&self) -> Result<Classification> {
        let start = Instant::now();
        let stations = load_stations(&self.input_path)?;
        let classification = classify(&stations, &self.tables);

        log_classification(&classification.stats);
        debug!(
            "Classified {} stations from {} in {}ms",
            classification.stats.output_rows,
            self.input_path.display(),
            start.elapsed().as_millis()
        );

        Ok(classification)
    }

    /// Load the dashboard pricing sheets named by the configuration
    pub fn load_pricing(&self) -> Result<PricingData> {
        let paths = &self.config.pricing;
        let pricing = PricingData {
            metadata: load_pricing_metadata(&paths.metadata)?,
            level2_ranges: load_price_ranges(&paths.level2_ranges)?,
            level3_ranges: load_price_ranges(&paths.level3_ranges)?,
        };

        debug!(
            "Loaded pricing: {} metadata rows, {} L2 networks, {} L3 networks",
            pricing.metadata.len(),
            pricing.level2_ranges.network_count(),
            pricing.level3_ranges.network_count()
        );
        Ok(pricing)
    }

    /// Write `<CODE>_map.html` for every jurisdiction present in the records
    pub async fn export_maps(
        &self,
        records: &[StationRecord],
        cancel: &CancellationToken,
    ) -> Result<ProcessingStats> {
        let start = Instant::now();
        let output_dir = &self.config.maps_dir;

        println!("\n{}", "Rendering province maps...".bright_yellow());
        fs::create_dir_all(output_dir)
            .await
            .map_err(|e| ChargeError::output_failed(output_dir, e.to_string()))?;

        let codes = jurisdictions(records);
        let pb = self.progress_bar(codes.len() as u64);
        let mut stats = ProcessingStats {
            stations_loaded: records.len(),
            stations_classified: records.len(),
            output_path: output_dir.clone(),
            ..Default::default()
        };

        for code in &codes {
            if cancel.is_cancelled() {
                pb.abandon_with_message("Interrupted");
                return Err(ChargeError::Interrupted {
                    reason: format!("Map export stopped before {}", code),
                });
            }
            pb.set_message(code.clone());

            let Some(province) = Province::from_code(code) else {
                warn!("Unknown jurisdiction code {:?}, skipping map", code);
                pb.println(format!("  {} {}: not a Canadian jurisdiction", "Skipped".yellow(), code));
                stats.artifacts_skipped += 1;
                pb.inc(1);
                continue;
            };

            match ProvinceMap::build(records, code) {
                Some(map) => {
                    let path = output_dir.join(map_file_name(province));
                    let html = map.to_html(&self.config.map)?;
                    fs::write(&path, html)
                        .await
                        .map_err(|e| ChargeError::output_failed(&path, e.to_string()))?;
                    debug!(
                        "Wrote {} ({} L2, {} L3 markers)",
                        path.display(),
                        map.level2.len(),
                        map.level3.len()
                    );
                    stats.artifacts_written += 1;
                }
                None => {
                    info!("No valid coordinates for {}, skipping map", code);
                    pb.println(format!("  {} {}: no geocoded stations", "Skipped".yellow(), code));
                    stats.artifacts_skipped += 1;
                }
            }
            pb.inc(1);
        }
        pb.finish_and_clear();

        stats.processing_time_ms = start.elapsed().as_millis();
        print_stats("Map export complete", &stats);
        Ok(stats)
    }

    /// Render the dashboard pages for the given provinces
    pub async fn build_dashboard(
        &self,
        records: &[StationRecord],
        provinces: &[Province],
        observer: &dyn SessionObserver,
    ) -> Result<ProcessingStats> {
        let start = Instant::now();
        println!("\n{}", "Building dashboard...".bright_yellow());

        let pricing = self.load_pricing()?;
        let dashboard = Dashboard::new(records, &pricing, &self.tables, observer);
        let written = dashboard
            .write_site(provinces, &self.config.maps_dir, &self.config.dashboard_dir)
            .await?;

        let stats = ProcessingStats {
            stations_loaded: records.len(),
            stations_classified: records.len(),
            artifacts_written: written.len(),
            artifacts_skipped: 0,
            output_path: self.config.dashboard_dir.clone(),
            processing_time_ms: start.elapsed().as_millis(),
        };
        print_stats("Dashboard complete", &stats);
        Ok(stats)
    }

    /// Export the classified records as Parquet or CSV
    pub async fn export_dataset(&self, records: &[StationRecord]) -> Result<ProcessingStats> {
        let start = Instant::now();
        let settings = self.config.export.clone();
        println!(
            "\n{} {}",
            "Exporting classified stations to".bright_yellow(),
            settings.path.display()
        );

        let owned = records.to_vec();
        let export_settings = settings.clone();
        let rows = tokio::task::spawn_blocking(move || write_records(&owned, &export_settings))
            .await
            .map_err(|e| ChargeError::output_failed(&settings.path, e.to_string()))??;

        let stats = ProcessingStats {
            stations_loaded: records.len(),
            stations_classified: rows,
            artifacts_written: 1,
            artifacts_skipped: 0,
            output_path: settings.path,
            processing_time_ms: start.elapsed().as_millis(),
        };
        print_stats("Export complete", &stats);
        Ok(stats)
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb
    }
}

/// Report classification counters through tracing
pub fn log_classification(stats: &ClassificationStats) {
    info!(
        "Classified {} of {} stations ({} Tesla L2, {} Tesla L3, {} dual-port DC merged)",
        stats.output_rows, stats.input_rows, stats.tesla_l2, stats.tesla_l3, stats.dual_dc_merged
    );

    if stats.dropped_by_jurisdiction > 0 {
        info!(
            "Dropped {} stations of an Ontario-only network reported outside Ontario",
            stats.dropped_by_jurisdiction
        );
    }
    if stats.missing_jurisdiction > 0 {
        warn!(
            "{} stations have no State value and are excluded from province outputs",
            stats.missing_jurisdiction
        );
    }
    if !stats.unmapped_networks.is_empty() {
        warn!(
            "Networks without an operator bucket, treated as Non-Networked: {}",
            stats.unmapped_networks.join(", ")
        );
    }
}

fn print_stats(heading: &str, stats: &ProcessingStats) {
    println!("{}", heading.bright_green().bold());
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        stats.processing_time_ms.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Stations:".bright_cyan(),
        stats.stations_classified.to_string().bright_white().bold()
    );
    println!(
        "  {} {}",
        "Files written:".bright_cyan(),
        stats.artifacts_written.to_string().bright_white()
    );
    if stats.artifacts_skipped > 0 {
        println!(
            "  {} {}",
            "Skipped:".bright_yellow(),
            stats.artifacts_skipped.to_string().bright_yellow()
        );
    }
    println!(
        "  {} {}",
        "Output:".bright_cyan(),
        stats.output_path.display()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "Station Name,Street Address,City,State,Latitude,Longitude,EV Network,EV J1772 Connector Count,EV CCS Connector Count,EV CHAdeMO Connector Count,EV J3400 Connector Count,EV DC Fast Count";

    fn input() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        writeln!(file, "Hub,1 Main St,Toronto,ON,43.65,-79.38,IVY,2,,,,").unwrap();
        writeln!(file, "Rogue,2 Main St,Calgary,AB,51.04,-114.07,IVY,2,,,,").unwrap();
        writeln!(file, "Depot,3 Main St,Whitehorse,YT,,,FLO,1,,,,").unwrap();
        file
    }

    #[test]
    fn test_new_requires_input() {
        assert!(matches!(
            StationPipeline::new(ChargeConfig::default()),
            Err(ChargeError::Configuration { .. })
        ));
    }

    #[test]
    fn test_classify_input() {
        let file = input();
        let config = ChargeConfig::default().with_input_path(file.path().to_path_buf());
        let pipeline = StationPipeline::new(config).unwrap();

        let classification = pipeline.classify_input().unwrap();
        assert_eq!(classification.stats.input_rows, 3);
        assert_eq!(classification.stats.dropped_by_jurisdiction, 1);
        assert_eq!(classification.records.len(), 2);
    }

    #[tokio::test]
    async fn test_export_maps_skips_ungeocoded() {
        let file = input();
        let out = tempfile::tempdir().unwrap();
        let config = ChargeConfig::default()
            .with_input_path(file.path().to_path_buf())
            .with_maps_dir(out.path().join("maps"));
        let pipeline = StationPipeline::new(config).unwrap().with_progress(false);
        let records = pipeline.classify_input().unwrap().records;

        let stats = pipeline
            .export_maps(&records, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(stats.artifacts_written, 1);
        assert_eq!(stats.artifacts_skipped, 1);
        assert!(out.path().join("maps/ON_map.html").exists());
        assert!(!out.path().join("maps/YT_map.html").exists());
    }

    #[tokio::test]
    async fn test_export_maps_ignores_unknown_jurisdictions() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        writeln!(file, "Hub,1 Main St,Toronto,ON,43.65,-79.38,FLO,2,,,,").unwrap();
        writeln!(file, "Odd,2 Main St,Nowhere,../escaped,45.0,-75.0,FLO,2,,,,").unwrap();

        let out = tempfile::tempdir().unwrap();
        let config = ChargeConfig::default()
            .with_input_path(file.path().to_path_buf())
            .with_maps_dir(out.path().join("maps"));
        let pipeline = StationPipeline::new(config).unwrap().with_progress(false);
        let records = pipeline.classify_input().unwrap().records;

        let stats = pipeline
            .export_maps(&records, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(stats.artifacts_written, 1);
        assert_eq!(stats.artifacts_skipped, 1);
        assert!(out.path().join("maps/ON_map.html").exists());
        assert!(!out.path().join("escaped_map.html").exists());
        assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_export_maps_honours_cancellation() {
        let file = input();
        let out = tempfile::tempdir().unwrap();
        let config = ChargeConfig::default()
            .with_input_path(file.path().to_path_buf())
            .with_maps_dir(out.path().to_path_buf());
        let pipeline = StationPipeline::new(config).unwrap().with_progress(false);
        let records = pipeline.classify_input().unwrap().records;

        let cancel = CancellationToken::new();
        cancel.cancel();

        assert!(matches!(
            pipeline.export_maps(&records, &cancel).await,
            Err(ChargeError::Interrupted { .. })
        ));
    }
}
