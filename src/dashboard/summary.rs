//! Per-province aggregates: port counts, operator distributions and the
//! derived operator insights.

use crate::models::{ChargingLevel, OperatorBucket, Province, StationRecord};
use std::collections::{BTreeMap, BTreeSet};

/// Station and port counts for one province
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortSummary {
    pub province: Province,
    pub total_stations: usize,
    pub level2_ports: usize,
    pub level3_ports: usize,
}

impl PortSummary {
    pub fn compute(records: &[StationRecord], province: Province) -> Self {
        let in_province = records.iter().filter(|r| r.in_jurisdiction(province.code()));

        let mut summary = Self {
            province,
            total_stations: 0,
            level2_ports: 0,
            level3_ports: 0,
        };
        for record in in_province {
            summary.total_stations += 1;
            summary.level2_ports += usize::from(record.flags.has_l2);
            summary.level3_ports += usize::from(record.flags.has_l3);
        }
        summary
    }

    /// Level 2 share of all stations in percent; `None` without stations
    pub fn level2_percent(&self) -> Option<f64> {
        (self.total_stations > 0)
            .then(|| self.level2_ports as f64 / self.total_stations as f64 * 100.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BucketShare {
    pub bucket: OperatorBucket,
    pub count: usize,
    pub proportion: f64,
}

/// Operator bucket distribution for one province and level
#[derive(Debug, Clone, PartialEq)]
pub enum BucketDistribution {
    /// No station in the province offers this level
    NoData {
        province: Province,
        level: ChargingLevel,
    },
    Shares {
        province: Province,
        level: ChargingLevel,
        total: usize,
        /// Present buckets only, in display order
        shares: Vec<BucketShare>,
    },
}

impl BucketDistribution {
    pub fn compute(records: &[StationRecord], province: Province, level: ChargingLevel) -> Self {
        let mut counts: BTreeMap<OperatorBucket, usize> = BTreeMap::new();
        for record in records
            .iter()
            .filter(|r| r.in_jurisdiction(province.code()) && r.has_level(level))
        {
            *counts.entry(record.operator_bucket).or_insert(0) += 1;
        }

        let total: usize = counts.values().sum();
        if total == 0 {
            return Self::NoData { province, level };
        }

        let shares = OperatorBucket::DISPLAY_ORDER
            .into_iter()
            .filter_map(|bucket| {
                counts.get(&bucket).map(|&count| BucketShare {
                    bucket,
                    count,
                    proportion: count as f64 / total as f64,
                })
            })
            .collect();

        Self::Shares {
            province,
            level,
            total,
            shares,
        }
    }

    pub fn shares(&self) -> &[BucketShare] {
        match self {
            Self::NoData { .. } => &[],
            Self::Shares { shares, .. } => shares,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::NoData { .. })
    }
}

/// Headline figures derived from a distribution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperatorInsights {
    pub level: ChargingLevel,
    pub dominant: OperatorBucket,
    pub dominant_percent: u32,
    pub centralized_percent: u32,
    pub non_centralized_percent: u32,
}

impl OperatorInsights {
    /// `None` when the distribution has no data
    pub fn from_distribution(distribution: &BucketDistribution) -> Option<Self> {
        let BucketDistribution::Shares {
            level,
            shares,
            total,
            ..
        } = distribution
        else {
            return None;
        };

        // First maximum in display order wins ties
        let dominant = shares.iter().fold(None::<&BucketShare>, |best, share| match best {
            Some(b) if b.count >= share.count => Some(b),
            _ => Some(share),
        })?;

        let centralized: usize = shares
            .iter()
            .filter(|s| s.bucket.is_centralized())
            .map(|s| s.count)
            .sum();
        let centralized_percent = percent(centralized as f64 / *total as f64);

        // The two halves always add up to 100
        Some(Self {
            level: *level,
            dominant: dominant.bucket,
            dominant_percent: percent(dominant.proportion),
            centralized_percent,
            non_centralized_percent: 100u32.saturating_sub(centralized_percent),
        })
    }
}

/// Whole percent, halves rounded to even
fn percent(proportion: f64) -> u32 {
    (proportion * 100.0).round_ties_even() as u32
}

/// Raw network identifiers grouped by bucket, for buckets with a description
pub fn networks_by_bucket(
    records: &[StationRecord],
    province: Province,
) -> Vec<(OperatorBucket, Vec<String>)> {
    let mut grouped: BTreeMap<OperatorBucket, BTreeSet<String>> = BTreeMap::new();
    for record in records.iter().filter(|r| r.in_jurisdiction(province.code())) {
        if let Some(network) = &record.network {
            grouped
                .entry(record.operator_bucket)
                .or_default()
                .insert(network.clone());
        }
    }

    OperatorBucket::DISPLAY_ORDER
        .into_iter()
        .filter(|bucket| bucket.description().is_some())
        .filter_map(|bucket| {
            grouped
                .remove(&bucket)
                .map(|networks| (bucket, networks.into_iter().collect()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConnectorCounts, PortFlags};

    fn record(state: &str, network: &str, bucket: OperatorBucket, l2: bool, l3: bool) -> StationRecord {
        StationRecord {
            name: None,
            street_address: None,
            city: None,
            state: Some(state.to_string()),
            latitude: None,
            longitude: None,
            network: Some(network.to_string()),
            display_name: None,
            operator_bucket: bucket,
            connectors: ConnectorCounts::default(),
            flags: PortFlags {
                has_l2: l2,
                has_l3: l3,
                ..Default::default()
            },
        }
    }

    fn sample() -> Vec<StationRecord> {
        vec![
            record("BC", "BCHYDRO", OperatorBucket::CentralizedUtility, false, true),
            record("BC", "BCHYDRO", OperatorBucket::CentralizedUtility, true, true),
            record("BC", "FLO", OperatorBucket::SiteHost, true, false),
            record("BC", "FLO", OperatorBucket::SiteHost, true, false),
            record("BC", "Non-Networked", OperatorBucket::NonNetworked, true, false),
            record("BC", "Tesla", OperatorBucket::CentralizedAutomaker, false, true),
            record("AB", "FLO", OperatorBucket::SiteHost, true, false),
        ]
    }

    #[test]
    fn test_port_summary() {
        let summary = PortSummary::compute(&sample(), Province::BritishColumbia);

        assert_eq!(summary.total_stations, 6);
        assert_eq!(summary.level2_ports, 4);
        assert_eq!(summary.level3_ports, 3);
        let percent = summary.level2_percent().unwrap();
        assert!((percent - 66.666).abs() < 0.01);
    }

    #[test]
    fn test_port_summary_without_stations() {
        let summary = PortSummary::compute(&sample(), Province::Yukon);
        assert_eq!(summary.total_stations, 0);
        assert_eq!(summary.level2_percent(), None);
    }

    #[test]
    fn test_distribution_sums_to_one() {
        for level in ChargingLevel::ALL {
            let distribution = BucketDistribution::compute(&sample(), Province::BritishColumbia, level);
            let total: f64 = distribution.shares().iter().map(|s| s.proportion).sum();
            assert!((total - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_distribution_order_and_counts() {
        let distribution =
            BucketDistribution::compute(&sample(), Province::BritishColumbia, ChargingLevel::Level2);

        let buckets: Vec<_> = distribution.shares().iter().map(|s| s.bucket).collect();
        assert_eq!(
            buckets,
            vec![
                OperatorBucket::CentralizedUtility,
                OperatorBucket::SiteHost,
                OperatorBucket::NonNetworked
            ]
        );
        assert_eq!(distribution.shares()[1].count, 2);
    }

    #[test]
    fn test_distribution_without_matches_is_no_data() {
        let distribution = BucketDistribution::compute(&sample(), Province::Alberta, ChargingLevel::Level3);
        assert!(distribution.is_empty());
        assert!(distribution.shares().is_empty());
        assert_eq!(OperatorInsights::from_distribution(&distribution), None);
    }

    #[test]
    fn test_operator_insights() {
        let distribution =
            BucketDistribution::compute(&sample(), Province::BritishColumbia, ChargingLevel::Level2);
        let insights = OperatorInsights::from_distribution(&distribution).unwrap();

        assert_eq!(insights.dominant, OperatorBucket::SiteHost);
        assert_eq!(insights.dominant_percent, 50);
        assert_eq!(insights.centralized_percent, 25);
        assert_eq!(insights.non_centralized_percent, 75);
    }

    #[test]
    fn test_insight_percentages_round_half_to_even() {
        let mut records = vec![record("ON", "IVY", OperatorBucket::CentralizedUtility, true, false)];
        records.extend((0..7).map(|_| record("ON", "FLO", OperatorBucket::SiteHost, true, false)));

        let distribution = BucketDistribution::compute(&records, Province::Ontario, ChargingLevel::Level2);
        let insights = OperatorInsights::from_distribution(&distribution).unwrap();

        assert_eq!(insights.dominant_percent, 88);
        assert_eq!(insights.centralized_percent, 12);
        assert_eq!(insights.non_centralized_percent, 88);
        assert_eq!(percent(0.375), 38);
    }

    #[test]
    fn test_networks_by_bucket_skips_non_networked() {
        let grouped = networks_by_bucket(&sample(), Province::BritishColumbia);

        assert_eq!(grouped.len(), 3);
        assert_eq!(grouped[0].0, OperatorBucket::CentralizedAutomaker);
        assert_eq!(grouped[1], (OperatorBucket::CentralizedUtility, vec!["BCHYDRO".to_string()]));
        assert_eq!(grouped[2], (OperatorBucket::SiteHost, vec!["FLO".to_string()]));
    }
}
