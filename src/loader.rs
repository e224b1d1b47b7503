//! CSV ingestion for station and pricing files.
//!
//! Reads the AFDC station export and the auxiliary pricing sheets with
//! Polars, validates the required column set, and converts rows into the
//! plain records consumed by the classifier and the dashboard.

use crate::constants::{SOURCE_NOT_AVAILABLE, columns, pricing_columns};
use crate::dashboard::pricing::{PriceRangeTable, PricingMetadata};
use crate::error::{ChargeError, Result};
use crate::models::{ChargingLevel, ConnectorCounts, RawStation};
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, warn};

/// Read a CSV file with every column kept as text.
///
/// Numeric parsing happens per field so that `"2"`, `"2.0"` and blanks are
/// all handled the same way regardless of what Polars would infer.
pub fn read_csv_as_text(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(ChargeError::InputNotFound {
            path: path.to_path_buf(),
        });
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_parse_options(CsvParseOptions::default().with_encoding(CsvEncoding::LossyUtf8))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
        .map_err(|e| ChargeError::InvalidInput {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    debug!(
        "Read {} rows x {} columns from {}",
        df.height(),
        df.width(),
        path.display()
    );
    Ok(df)
}

/// Read a Windows-1252 / ISO-8859-1 encoded CSV file with every column as text.
///
/// The bytes are transcoded to UTF-8 before Polars sees them, so accented
/// Latin-1 characters survive instead of becoming replacement characters.
pub fn read_latin1_csv_as_text(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(ChargeError::InputNotFound {
            path: path.to_path_buf(),
        });
    }

    let bytes = std::fs::read(path)?;
    let (decoded, _, had_errors) = encoding_rs::WINDOWS_1252.decode(&bytes);
    if had_errors {
        warn!("Undecodable bytes in {} were replaced", path.display());
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(decoded.into_owned().into_bytes()))
        .finish()
        .map_err(|e| ChargeError::InvalidInput {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    debug!(
        "Read {} rows x {} columns from {} (windows-1252)",
        df.height(),
        df.width(),
        path.display()
    );
    Ok(df)
}

/// Load raw station records from the AFDC export
pub fn load_stations(path: &Path) -> Result<Vec<RawStation>> {
    let df = read_csv_as_text(path)?;
    stations_from_frame(&df, path)
}

/// Convert a text frame into raw station records.
///
/// `State` and `EV Network` must be present as columns; every other column
/// is optional and defaults to absent/zero.
pub fn stations_from_frame(df: &DataFrame, path: &Path) -> Result<Vec<RawStation>> {
    for required in columns::REQUIRED {
        if df.get_column_index(required).is_none() {
            return Err(ChargeError::missing_column(path, *required));
        }
    }

    let height = df.height();
    let names = text_column(df, columns::STATION_NAME)?;
    let addresses = text_column(df, columns::STREET_ADDRESS)?;
    let cities = text_column(df, columns::CITY)?;
    let states = text_column(df, columns::STATE)?;
    let networks = text_column(df, columns::EV_NETWORK)?;
    let latitudes = text_column(df, columns::LATITUDE)?;
    let longitudes = text_column(df, columns::LONGITUDE)?;
    let j1772 = text_column(df, columns::J1772_COUNT)?;
    let ccs = text_column(df, columns::CCS_COUNT)?;
    let chademo = text_column(df, columns::CHADEMO_COUNT)?;
    let j3400 = text_column(df, columns::J3400_COUNT)?;
    let dc_fast = text_column(df, columns::DC_FAST_COUNT)?;

    for optional in [
        columns::LATITUDE,
        columns::LONGITUDE,
        columns::J1772_COUNT,
        columns::CCS_COUNT,
        columns::CHADEMO_COUNT,
        columns::J3400_COUNT,
        columns::DC_FAST_COUNT,
    ] {
        if df.get_column_index(optional).is_none() {
            warn!("Column '{}' not found; treating as empty", optional);
        }
    }

    let stations = (0..height)
        .map(|i| RawStation {
            name: cell(&names, i),
            street_address: cell(&addresses, i),
            city: cell(&cities, i),
            state: cell(&states, i),
            latitude: cell(&latitudes, i).and_then(|v| parse_coordinate(&v)),
            longitude: cell(&longitudes, i).and_then(|v| parse_coordinate(&v)),
            network: cell(&networks, i),
            connectors: ConnectorCounts {
                j1772: count_cell(&j1772, i),
                ccs: count_cell(&ccs, i),
                chademo: count_cell(&chademo, i),
                j3400: count_cell(&j3400, i),
                dc_fast: count_cell(&dc_fast, i),
            },
        })
        .collect();

    Ok(stations)
}

/// Load the network pricing metadata sheet
pub fn load_pricing_metadata(path: &Path) -> Result<Vec<PricingMetadata>> {
    let df = read_latin1_csv_as_text(path)?;

    for required in [pricing_columns::NETWORK, pricing_columns::LEVEL] {
        if df.get_column_index(required).is_none() {
            return Err(ChargeError::missing_column(path, required));
        }
    }

    let networks = text_column(&df, pricing_columns::NETWORK)?;
    let levels = text_column(&df, pricing_columns::LEVEL)?;
    let power = text_column(&df, pricing_columns::POWER_RANGE)?;
    let approach = text_column(&df, pricing_columns::PRICING_APPROACH)?;
    let kwh = text_column(&df, pricing_columns::KWH_PRICING)?;
    let time = text_column(&df, pricing_columns::TIME_PRICING)?;
    let tiered = text_column(&df, pricing_columns::TIERED_L3)?;
    let idle = text_column(&df, pricing_columns::IDLE_FEES)?;
    let roaming = text_column(&df, pricing_columns::ROAMING)?;

    let mut rows = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let Some(network) = cell(&networks, i) else {
            continue;
        };
        let level = match cell(&levels, i).as_deref().map(str::trim) {
            Some("L2") => ChargingLevel::Level2,
            Some("L3") => ChargingLevel::Level3,
            other => {
                warn!(
                    "Skipping pricing row for '{}' with unknown level {:?}",
                    network, other
                );
                continue;
            }
        };

        rows.push(PricingMetadata {
            network,
            level,
            power_range: available(cell(&power, i)),
            pricing_approach: available(cell(&approach, i)),
            kwh_based: available(cell(&kwh, i)),
            time_based: available(cell(&time, i)),
            tiered_l3: available(cell(&tiered, i)),
            idle_fees: available(cell(&idle, i)),
            roaming_partners: available(cell(&roaming, i)),
        });
    }

    debug!("Loaded {} pricing metadata rows", rows.len());
    Ok(rows)
}

/// Load a price-range sheet: one row per network, one column per province
pub fn load_price_ranges(path: &Path) -> Result<PriceRangeTable> {
    let df = read_csv_as_text(path)?;

    if df.get_column_index(pricing_columns::NETWORK).is_none() {
        return Err(ChargeError::missing_column(path, pricing_columns::NETWORK));
    }

    let networks = text_column(&df, pricing_columns::NETWORK)?;
    let mut table = PriceRangeTable::default();

    let province_columns: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .filter(|name| name != pricing_columns::NETWORK)
        .collect();

    for province in &province_columns {
        let values = text_column(&df, province)?;
        for i in 0..df.height() {
            if let (Some(network), Some(range)) = (cell(&networks, i), available(cell(&values, i)))
            {
                table.insert(&network, province, range);
            }
        }
    }

    debug!(
        "Loaded price ranges for {} networks across {} provinces from {}",
        table.network_count(),
        province_columns.len(),
        path.display()
    );
    Ok(table)
}

/// Column values as trimmed text; `None` when the column does not exist
fn text_column(df: &DataFrame, name: &str) -> Result<Option<Vec<Option<String>>>> {
    if df.get_column_index(name).is_none() {
        return Ok(None);
    }

    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::String)?;
    let values = series
        .str()?
        .into_iter()
        .map(|value| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        })
        .collect();

    Ok(Some(values))
}

fn cell(column: &Option<Vec<Option<String>>>, row: usize) -> Option<String> {
    column.as_ref().and_then(|values| values.get(row).cloned().flatten())
}

fn count_cell(column: &Option<Vec<Option<String>>>, row: usize) -> u32 {
    cell(column, row).map_or(0, |v| parse_count(&v))
}

/// Parse a connector count; negatives and garbage count as zero
pub fn parse_count(value: &str) -> u32 {
    let value = value.trim();
    if let Ok(n) = value.parse::<u32>() {
        return n;
    }
    match value.parse::<f64>() {
        Ok(n) if n.is_finite() && n > 0.0 => n.round() as u32,
        _ => 0,
    }
}

fn parse_coordinate(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Drop the sheets' own "N/A" placeholder
fn available(value: Option<String>) -> Option<String> {
    value.filter(|v| v != SOURCE_NOT_AVAILABLE)
}
