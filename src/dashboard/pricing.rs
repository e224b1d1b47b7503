//! Pricing tables for centralized networks.
//!
//! Joins the network pricing metadata and the per-level price-range sheets
//! against the networks observed active in a province, applying the known
//! province-specific billing exceptions.

use crate::constants::{NOT_AVAILABLE, SHELL_TIME_BASED_PROVINCES, TESLA_TIME_BASED_PROVINCES};
use crate::lookup::NetworkTables;
use crate::models::{ChargingLevel, OperatorBucket, Province, StationRecord};
use std::collections::{BTreeSet, HashMap};

const TESLA: &str = "Tesla";
const SHELL_RECHARGE: &str = "Shell Recharge";

/// One row of the network pricing metadata sheet
#[derive(Debug, Clone, PartialEq)]
pub struct PricingMetadata {
    /// Display name of the network
    pub network: String,
    pub level: ChargingLevel,
    pub power_range: Option<String>,
    pub pricing_approach: Option<String>,
    pub kwh_based: Option<String>,
    pub time_based: Option<String>,
    pub tiered_l3: Option<String>,
    pub idle_fees: Option<String>,
    pub roaming_partners: Option<String>,
}

/// Price ranges keyed by network display name and province full name
#[derive(Debug, Clone, Default)]
pub struct PriceRangeTable {
    networks: BTreeSet<String>,
    ranges: HashMap<(String, String), String>,
}

impl PriceRangeTable {
    pub fn insert(&mut self, network: &str, province: &str, range: String) {
        self.networks.insert(network.to_string());
        self.ranges
            .insert((network.to_string(), province.to_string()), range);
    }

    pub fn range(&self, network: &str, province: &str) -> Option<&str> {
        self.ranges
            .get(&(network.to_string(), province.to_string()))
            .map(String::as_str)
    }

    pub fn network_count(&self) -> usize {
        self.networks.len()
    }
}

/// Auxiliary inputs of the dashboard
#[derive(Debug, Clone, Default)]
pub struct PricingData {
    pub metadata: Vec<PricingMetadata>,
    pub level2_ranges: PriceRangeTable,
    pub level3_ranges: PriceRangeTable,
}

impl PricingData {
    fn ranges(&self, level: ChargingLevel) -> &PriceRangeTable {
        match level {
            ChargingLevel::Level2 => &self.level2_ranges,
            ChargingLevel::Level3 => &self.level3_ranges,
        }
    }
}

/// A display-ready pricing row; absent values read "Not available"
#[derive(Debug, Clone, PartialEq)]
pub struct PricingRow {
    pub network: String,
    pub bucket: OperatorBucket,
    pub power_range: String,
    pub pricing_approach: String,
    pub pricing_range: String,
    pub kwh_based: String,
    pub time_based: String,
    pub tiered_l3: String,
    pub idle_fees: String,
    pub roaming_partners: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricingTable {
    pub province: Province,
    pub level: ChargingLevel,
    pub rows: Vec<PricingRow>,
}

impl PricingTable {
    /// Buckets present in the table, in display order
    pub fn used_buckets(&self) -> Vec<OperatorBucket> {
        OperatorBucket::DISPLAY_ORDER
            .into_iter()
            .filter(|bucket| self.rows.iter().any(|row| row.bucket == *bucket))
            .collect()
    }

    /// True when there is nothing centralized to show, including no rows at all
    pub fn is_all_non_centralized(&self) -> bool {
        self.rows.iter().all(|row| !row.bucket.is_centralized())
    }
}

/// Distinct display names of networks with at least one station at `level`
pub fn active_networks(
    records: &[StationRecord],
    province: Province,
    level: ChargingLevel,
) -> BTreeSet<String> {
    records
        .iter()
        .filter(|r| r.in_jurisdiction(province.code()) && r.has_level(level))
        .filter_map(|r| r.display_name.clone())
        .collect()
}

/// Build the pricing table of one province and level
pub fn build_pricing_table(
    records: &[StationRecord],
    province: Province,
    level: ChargingLevel,
    pricing: &PricingData,
    tables: &NetworkTables,
) -> PricingTable {
    let active = active_networks(records, province, level);
    let ranges = pricing.ranges(level);

    let rows = pricing
        .metadata
        .iter()
        .filter(|meta| meta.level == level && active.contains(&meta.network))
        .map(|meta| {
            let mut meta = meta.clone();
            apply_province_overrides(&mut meta, province);

            let pricing_range = ranges
                .range(&meta.network, province.full_name())
                .map(str::to_string);
            let bucket = tables
                .bucket_of_display_name(&meta.network)
                .unwrap_or(OperatorBucket::NonNetworked);

            PricingRow {
                bucket,
                power_range: or_not_available(meta.power_range),
                pricing_approach: or_not_available(meta.pricing_approach),
                pricing_range: or_not_available(pricing_range),
                kwh_based: or_not_available(meta.kwh_based),
                time_based: or_not_available(meta.time_based),
                tiered_l3: or_not_available(meta.tiered_l3),
                idle_fees: or_not_available(meta.idle_fees),
                roaming_partners: or_not_available(meta.roaming_partners),
                network: meta.network,
            }
        })
        .collect();

    PricingTable {
        province,
        level,
        rows,
    }
}

/// Tesla bills by time in some Atlantic provinces; Shell Recharge bills by
/// time in Manitoba.
fn apply_province_overrides(meta: &mut PricingMetadata, province: Province) {
    let yes = || Some("Yes".to_string());
    let no = || Some("No".to_string());

    if meta.network == TESLA {
        if TESLA_TIME_BASED_PROVINCES.contains(&province.code()) {
            meta.kwh_based = no();
            meta.time_based = yes();
            meta.tiered_l3 = yes();
            meta.pricing_approach = Some("Time-based".to_string());
        } else {
            meta.kwh_based = yes();
            meta.time_based = no();
            meta.tiered_l3 = no();
            meta.pricing_approach = Some("Energy-based".to_string());
        }
    } else if meta.network == SHELL_RECHARGE {
        if SHELL_TIME_BASED_PROVINCES.contains(&province.code()) {
            meta.kwh_based = no();
            meta.time_based = yes();
        } else {
            meta.kwh_based = yes();
            meta.time_based = no();
        }
    }
}

fn or_not_available(value: Option<String>) -> String {
    value.unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
