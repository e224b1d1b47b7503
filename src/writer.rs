//! Export of the classified record set.
//!
//! Builds a polars DataFrame with one row per classified station and writes
//! it as Parquet or CSV.

use crate::config::{ExportFormat, ExportSettings};
use crate::error::{ChargeError, Result};
use crate::models::StationRecord;
use polars::prelude::*;
use std::path::Path;
use tracing::debug;

/// Build the export frame; column order is stable
pub fn records_to_frame(records: &[StationRecord]) -> Result<DataFrame> {
    let text = |name: &str, f: fn(&StationRecord) -> Option<&str>| {
        Column::new(name.into(), records.iter().map(f).collect::<Vec<_>>())
    };
    let float = |name: &str, f: fn(&StationRecord) -> Option<f64>| {
        Column::new(name.into(), records.iter().map(f).collect::<Vec<_>>())
    };
    let count = |name: &str, f: fn(&StationRecord) -> u32| {
        Column::new(name.into(), records.iter().map(f).collect::<Vec<_>>())
    };
    let flag = |name: &str, f: fn(&StationRecord) -> bool| {
        Column::new(name.into(), records.iter().map(f).collect::<Vec<_>>())
    };

    let df = DataFrame::new(vec![
        text("station_name", |r| r.name.as_deref()),
        text("street_address", |r| r.street_address.as_deref()),
        text("city", |r| r.city.as_deref()),
        text("state", |r| r.state.as_deref()),
        float("latitude", |r| r.latitude),
        float("longitude", |r| r.longitude),
        text("ev_network", |r| r.network.as_deref()),
        text("network_display_name", |r| r.display_name.as_deref()),
        text("operator_bucket", |r| Some(r.operator_bucket.label())),
        count("j1772_count", |r| r.connectors.j1772),
        count("ccs_count", |r| r.connectors.ccs),
        count("chademo_count", |r| r.connectors.chademo),
        count("j3400_count", |r| r.connectors.j3400),
        count("dc_fast_count", |r| r.connectors.dc_fast),
        flag("tesla_l2", |r| r.flags.tesla_l2),
        flag("tesla_l3", |r| r.flags.tesla_l3),
        flag("dual_dc", |r| r.flags.dual_dc),
        flag("has_l2", |r| r.flags.has_l2),
        flag("has_l3", |r| r.flags.has_l3),
    ])?;

    Ok(df)
}

/// Write the records to `settings.path`, returning the row count
pub fn write_records(records: &[StationRecord], settings: &ExportSettings) -> Result<usize> {
    let mut df = records_to_frame(records)?;
    let path = settings.path.as_path();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    match settings.format {
        ExportFormat::Parquet => write_parquet(&mut df, path, settings)?,
        ExportFormat::Csv => write_csv(&mut df, path)?,
    }

    debug!(
        "Exported {} rows to {} ({:?})",
        df.height(),
        path.display(),
        settings.format
    );
    Ok(df.height())
}

fn write_parquet(df: &mut DataFrame, path: &Path, settings: &ExportSettings) -> Result<()> {
    let file = std::fs::File::create(path)?;
    ParquetWriter::new(file)
        .with_compression(settings.compression.to_polars_compression())
        .finish(df)
        .map_err(|e| ChargeError::output_failed(path, format!("Failed to write parquet: {}", e)))?;
    Ok(())
}

fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .map_err(|e| ChargeError::output_failed(path, format!("Failed to write CSV: {}", e)))
}
