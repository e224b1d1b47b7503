//! Station classification rules.
//!
//! Derives Tesla, dual-standard DC and charging-level flags from connector
//! counts, attaches canonical network names and operator buckets, and
//! removes stations of the Ontario-only network reported outside Ontario.
//!
//! Classification is a pure function of the raw records and the lookup
//! tables: no I/O, no logging side channels, no telemetry.

use crate::constants::{NON_NETWORKED, ONTARIO_CODE, ONTARIO_ONLY_NETWORK, TESLA_DESTINATION};
use crate::lookup::NetworkTables;
use crate::models::{
    ClassificationStats, ConnectorCounts, OperatorBucket, PortFlags, RawStation, StationRecord,
};
use std::collections::BTreeSet;

/// Output of one classification run
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub records: Vec<StationRecord>,
    pub stats: ClassificationStats,
}

/// Classify every raw station and apply the jurisdiction filter.
///
/// Survivors keep their input order.
pub fn classify(stations: &[RawStation], tables: &NetworkTables) -> Classification {
    let mut stats = ClassificationStats {
        input_rows: stations.len(),
        ..Default::default()
    };
    let mut unmapped = BTreeSet::new();
    let mut records = Vec::with_capacity(stations.len());

    for raw in stations {
        let record = classify_station(raw, tables);

        if let Some(network) = record.network.as_deref() {
            if network != NON_NETWORKED && tables.bucket_of(network).is_none() {
                unmapped.insert(network.to_string());
            }
        }

        if is_outside_network_jurisdiction(&record) {
            stats.dropped_by_jurisdiction += 1;
            continue;
        }

        if record.state.is_none() {
            stats.missing_jurisdiction += 1;
        }
        if record.flags.tesla_l2 {
            stats.tesla_l2 += 1;
        }
        if record.flags.tesla_l3 {
            stats.tesla_l3 += 1;
        }
        if record.flags.dual_dc {
            stats.dual_dc_merged += 1;
        }

        records.push(record);
    }

    stats.output_rows = records.len();
    stats.unmapped_networks = unmapped.into_iter().collect();

    Classification { records, stats }
}

/// Apply the per-station rules (Tesla detection, dual-port merge, level
/// flags, naming and bucketing) to a single raw record.
pub fn classify_station(raw: &RawStation, tables: &NetworkTables) -> StationRecord {
    let network = raw.network.as_deref();
    let mut connectors = raw.connectors;

    let tesla_l2 = is_tesla_destination(network) && connectors.j1772 != 1;
    let tesla_l3 = connectors.j3400 == 1 && !tesla_l2;
    let dual_dc = merge_dual_standard_port(&mut connectors);

    let flags = PortFlags {
        tesla_l2,
        tesla_l3,
        dual_dc,
        has_l2: connectors.j1772 > 0 || tesla_l2,
        has_l3: connectors.ccs > 0 || connectors.chademo > 0 || dual_dc || tesla_l3,
    };

    let display_name = network
        .and_then(|n| tables.display_name(n))
        .map(str::to_string);
    let operator_bucket = network
        .and_then(|n| tables.bucket_of(n))
        .unwrap_or(OperatorBucket::NonNetworked);

    StationRecord {
        name: raw.name.clone(),
        street_address: raw.street_address.clone(),
        city: raw.city.clone(),
        state: raw.state.clone(),
        latitude: raw.latitude,
        longitude: raw.longitude,
        network: raw.network.clone(),
        display_name,
        operator_bucket,
        connectors,
        flags,
    }
}

fn is_tesla_destination(network: Option<&str>) -> bool {
    network.is_some_and(|n| n.contains(TESLA_DESTINATION))
}

/// One CHAdeMO plus one CCS on a DC fast station is a single head that
/// speaks both standards. Zeroes both counts and reports the merge.
fn merge_dual_standard_port(connectors: &mut ConnectorCounts) -> bool {
    if connectors.dc_fast > 0 && connectors.chademo == 1 && connectors.ccs == 1 {
        connectors.chademo = 0;
        connectors.ccs = 0;
        true
    } else {
        false
    }
}

/// Stations of the Ontario-only network reported anywhere else, including
/// stations with no jurisdiction at all.
fn is_outside_network_jurisdiction(record: &StationRecord) -> bool {
    record.network.as_deref() == Some(ONTARIO_ONLY_NETWORK)
        && record.state.as_deref() != Some(ONTARIO_CODE)
}
