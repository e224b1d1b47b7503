//! Province dashboard presenter.
//!
//! Turns the classified record set and the auxiliary pricing sheets into
//! per-province pages: port counts, operator distributions, insights,
//! pricing tables and the embedded province map.

pub mod pricing;
pub mod render;
pub mod summary;

use crate::error::{ChargeError, Result};
use crate::lookup::NetworkTables;
use crate::map::map_file_name;
use crate::models::{ChargingLevel, OperatorBucket, Province, StationRecord};
use crate::telemetry::{SessionInfo, SessionObserver};
use chrono::Local;
use colored::*;
use pricing::{PricingData, PricingTable, build_pricing_table};
use std::path::{Path, PathBuf};
use summary::{BucketDistribution, OperatorInsights, PortSummary, networks_by_bucket};
use tracing::{debug, info, warn};

/// Distribution, insights and pricing of one charging level
#[derive(Debug, Clone, PartialEq)]
pub struct LevelSection {
    pub level: ChargingLevel,
    pub distribution: BucketDistribution,
    pub insights: Option<OperatorInsights>,
    pub pricing: PricingTable,
}

/// Everything shown on one province page
#[derive(Debug, Clone, PartialEq)]
pub struct ProvincePage {
    pub province: Province,
    pub summary: PortSummary,
    pub operators: Vec<(OperatorBucket, Vec<String>)>,
    pub levels: Vec<LevelSection>,
    /// Pre-rendered map page, when one exists
    pub map_html: Option<String>,
}

pub struct Dashboard<'a> {
    records: &'a [StationRecord],
    pricing: &'a PricingData,
    tables: &'a NetworkTables,
    observer: &'a dyn SessionObserver,
    session: SessionInfo,
}

impl<'a> Dashboard<'a> {
    /// Start a presentation session and notify the observer
    pub fn new(
        records: &'a [StationRecord],
        pricing: &'a PricingData,
        tables: &'a NetworkTables,
        observer: &'a dyn SessionObserver,
    ) -> Self {
        let session = SessionInfo::new();
        observer.session_started(&session);
        Self {
            records,
            pricing,
            tables,
            observer,
            session,
        }
    }

    /// Compute the page of one province
    pub fn province_page(&self, province: Province, map_html: Option<String>) -> ProvincePage {
        let levels = ChargingLevel::ALL
            .into_iter()
            .map(|level| {
                let distribution = BucketDistribution::compute(self.records, province, level);
                let insights = OperatorInsights::from_distribution(&distribution);
                LevelSection {
                    level,
                    insights,
                    distribution,
                    pricing: build_pricing_table(self.records, province, level, self.pricing, self.tables),
                }
            })
            .collect();

        let page = ProvincePage {
            province,
            summary: PortSummary::compute(self.records, province),
            operators: networks_by_bucket(self.records, province),
            levels,
            map_html,
        };
        self.observer.province_viewed(&self.session, province);
        page
    }

    /// Render and write every page plus `index.html` into `output_dir`
    pub async fn write_site(
        &self,
        provinces: &[Province],
        maps_dir: &Path,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>> {
        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| ChargeError::output_failed(output_dir, e.to_string()))?;

        let generated_at = Local::now().format("%Y-%m-%d %H:%M").to_string();
        let mut written = Vec::with_capacity(provinces.len() + 1);
        let mut pages = Vec::with_capacity(provinces.len());

        for &province in provinces {
            let map_html = read_map(maps_dir, province).await?;
            if map_html.is_none() {
                warn!("Map for {} not found in {}", province.code(), maps_dir.display());
            }

            let page = self.province_page(province, map_html);
            let path = output_dir.join(render::page_file_name(province));
            write_page(&path, &render::province_page(&page, &generated_at)).await?;
            debug!("Wrote dashboard page {}", path.display());
            written.push(path);
            pages.push(page);
        }

        let index = output_dir.join("index.html");
        write_page(&index, &render::index_page(&pages, &generated_at)).await?;
        written.push(index);

        info!(
            session_id = %self.session.id,
            "Dashboard written: {} pages in {}",
            written.len(),
            output_dir.display()
        );
        Ok(written)
    }
}

async fn read_map(maps_dir: &Path, province: Province) -> Result<Option<String>> {
    match tokio::fs::read_to_string(maps_dir.join(map_file_name(province))).await {
        Ok(html) => Ok(Some(html)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn write_page(path: &Path, html: &str) -> Result<()> {
    tokio::fs::write(path, html)
        .await
        .map_err(|e| ChargeError::output_failed(path, e.to_string()))
}

/// Print the figures of a province page to the terminal
pub fn print_summary(page: &ProvincePage) {
    println!("{}", page.province.full_name().bold().blue());

    let summary = &page.summary;
    println!("  Total stations: {}", summary.total_stations.to_string().bold());
    println!("  Level 2 ports:  {}", summary.level2_ports);
    println!("  Level 3 ports:  {}", summary.level3_ports);
    match summary.level2_percent() {
        Some(percent) => println!("  Level 2 share:  {:.1}%", percent),
        None => println!("  {}", "No stations recorded".yellow()),
    }

    for section in &page.levels {
        println!("  {}", format!("{} operators", section.level.label()).bold());
        match &section.insights {
            Some(insights) => {
                for share in section.distribution.shares() {
                    println!(
                        "    {:<36} {:>6} {:>5.1}%",
                        share.bucket.label(),
                        share.count,
                        share.proportion * 100.0
                    );
                }
                println!(
                    "    Mostly {} ({}%), centralized {}%, non-centralized {}%",
                    insights.dominant.label().green(),
                    insights.dominant_percent,
                    insights.centralized_percent,
                    insights.non_centralized_percent
                );
            }
            None => println!(
                "    {}",
                format!(
                    "No {} port data available for {}.",
                    section.level.short(),
                    page.province.code()
                )
                .yellow()
            ),
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConnectorCounts, PortFlags};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingObserver {
        events: Mutex<Vec<String>>,
    }

    impl SessionObserver for RecordingObserver {
        fn session_started(&self, _session: &SessionInfo) {
            self.events.lock().unwrap().push("start".to_string());
        }

        fn province_viewed(&self, _session: &SessionInfo, province: Province) {
            self.events.lock().unwrap().push(province.code().to_string());
        }
    }

    fn record(state: &str, network: &str, bucket: OperatorBucket) -> StationRecord {
        StationRecord {
            name: Some("Station".to_string()),
            street_address: None,
            city: None,
            state: Some(state.to_string()),
            latitude: Some(45.0),
            longitude: Some(-75.0),
            network: Some(network.to_string()),
            display_name: None,
            operator_bucket: bucket,
            connectors: ConnectorCounts::default(),
            flags: PortFlags {
                has_l2: true,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_observer_notified() {
        let records = vec![record("ON", "FLO", OperatorBucket::SiteHost)];
        let pricing = PricingData::default();
        let tables = NetworkTables::default();
        let observer = RecordingObserver::default();

        let dashboard = Dashboard::new(&records, &pricing, &tables, &observer);
        let page = dashboard.province_page(Province::Ontario, None);

        assert_eq!(page.summary.total_stations, 1);
        assert_eq!(page.levels.len(), 2);
        assert!(page.levels[1].distribution.is_empty());
        assert_eq!(*observer.events.lock().unwrap(), vec!["start", "ON"]);
    }

    #[tokio::test]
    async fn test_write_site_embeds_existing_maps() {
        let maps = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        tokio::fs::write(maps.path().join("ON_map.html"), "<p>ontario map</p>")
            .await
            .unwrap();

        let records = vec![
            record("ON", "FLO", OperatorBucket::SiteHost),
            record("QC", "FLO", OperatorBucket::SiteHost),
        ];
        let pricing = PricingData::default();
        let tables = NetworkTables::default();
        let observer = crate::telemetry::NoopObserver;
        let dashboard = Dashboard::new(&records, &pricing, &tables, &observer);

        let written = dashboard
            .write_site(&[Province::Ontario, Province::Quebec], maps.path(), out.path())
            .await
            .unwrap();

        assert_eq!(written.len(), 3);
        let on = std::fs::read_to_string(out.path().join("ON.html")).unwrap();
        assert!(on.contains("&lt;p&gt;ontario map&lt;/p&gt;"));
        let qc = std::fs::read_to_string(out.path().join("QC.html")).unwrap();
        assert!(qc.contains("Map for QC not found"));
        assert!(out.path().join("index.html").exists());
    }
}
