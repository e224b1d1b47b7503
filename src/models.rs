//! Core data structures for charging station processing.
//!
//! Defines jurisdictions, operator buckets, charging levels, raw and
//! classified station records, and the statistics objects reported by
//! the pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Canadian provinces and territories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Province {
    Alberta,
    BritishColumbia,
    Manitoba,
    NewBrunswick,
    NewfoundlandAndLabrador,
    NovaScotia,
    NorthwestTerritories,
    Nunavut,
    Ontario,
    PrinceEdwardIsland,
    Quebec,
    Saskatchewan,
    Yukon,
}

impl Province {
    pub const ALL: [Province; 13] = [
        Province::Alberta,
        Province::BritishColumbia,
        Province::Manitoba,
        Province::NewBrunswick,
        Province::NewfoundlandAndLabrador,
        Province::NovaScotia,
        Province::NorthwestTerritories,
        Province::Nunavut,
        Province::Ontario,
        Province::PrinceEdwardIsland,
        Province::Quebec,
        Province::Saskatchewan,
        Province::Yukon,
    ];

    /// Provinces offered by the dashboard selector
    pub const DASHBOARD: [Province; 10] = [
        Province::Alberta,
        Province::BritishColumbia,
        Province::Manitoba,
        Province::NewBrunswick,
        Province::NewfoundlandAndLabrador,
        Province::NovaScotia,
        Province::Ontario,
        Province::PrinceEdwardIsland,
        Province::Quebec,
        Province::Saskatchewan,
    ];

    /// Two-letter jurisdiction code as used in the `State` column
    pub fn code(&self) -> &'static str {
        match self {
            Province::Alberta => "AB",
            Province::BritishColumbia => "BC",
            Province::Manitoba => "MB",
            Province::NewBrunswick => "NB",
            Province::NewfoundlandAndLabrador => "NL",
            Province::NovaScotia => "NS",
            Province::NorthwestTerritories => "NT",
            Province::Nunavut => "NU",
            Province::Ontario => "ON",
            Province::PrinceEdwardIsland => "PE",
            Province::Quebec => "QC",
            Province::Saskatchewan => "SK",
            Province::Yukon => "YT",
        }
    }

    /// Full display name, also the column key of the price-range tables
    pub fn full_name(&self) -> &'static str {
        match self {
            Province::Alberta => "Alberta",
            Province::BritishColumbia => "British Columbia",
            Province::Manitoba => "Manitoba",
            Province::NewBrunswick => "New Brunswick",
            Province::NewfoundlandAndLabrador => "Newfoundland and Labrador",
            Province::NovaScotia => "Nova Scotia",
            Province::NorthwestTerritories => "Northwest Territories",
            Province::Nunavut => "Nunavut",
            Province::Ontario => "Ontario",
            Province::PrinceEdwardIsland => "Prince Edward Island",
            Province::Quebec => "Quebec",
            Province::Saskatchewan => "Saskatchewan",
            Province::Yukon => "Yukon",
        }
    }

    /// Look up a province by its two-letter code (case-insensitive)
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.code().eq_ignore_ascii_case(code))
    }

    /// Look up a province by code or by full name
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::from_code(value).or_else(|| {
            Self::ALL
                .into_iter()
                .find(|p| p.full_name().eq_ignore_ascii_case(value))
        })
    }
}

impl std::fmt::Display for Province {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.full_name())
    }
}

/// Ownership and management model of a charging network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OperatorBucket {
    #[serde(rename = "Centralized Fuel/Retail Integrated")]
    CentralizedFuelRetail,
    #[serde(rename = "Centralized Automaker-Backed")]
    CentralizedAutomaker,
    #[serde(rename = "Centralized Utility-Backed")]
    CentralizedUtility,
    #[serde(rename = "Non-Centralized Site-Host")]
    SiteHost,
    #[serde(rename = "Non-Networked")]
    NonNetworked,
}

impl OperatorBucket {
    /// Presentation order of buckets in charts and legends
    pub const DISPLAY_ORDER: [OperatorBucket; 5] = [
        OperatorBucket::CentralizedFuelRetail,
        OperatorBucket::CentralizedAutomaker,
        OperatorBucket::CentralizedUtility,
        OperatorBucket::SiteHost,
        OperatorBucket::NonNetworked,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            OperatorBucket::CentralizedFuelRetail => "Centralized Fuel/Retail Integrated",
            OperatorBucket::CentralizedAutomaker => "Centralized Automaker-Backed",
            OperatorBucket::CentralizedUtility => "Centralized Utility-Backed",
            OperatorBucket::SiteHost => "Non-Centralized Site-Host",
            OperatorBucket::NonNetworked => "Non-Networked",
        }
    }

    pub fn is_centralized(&self) -> bool {
        matches!(
            self,
            OperatorBucket::CentralizedFuelRetail
                | OperatorBucket::CentralizedAutomaker
                | OperatorBucket::CentralizedUtility
        )
    }

    /// Dashboard description; non-networked stations have none
    pub fn description(&self) -> Option<&'static str> {
        match self {
            OperatorBucket::CentralizedUtility => Some(
                "Operated by or in partnership with utilities, offering slow and/or fast charging.",
            ),
            OperatorBucket::CentralizedAutomaker => Some(
                "Backed by automakers, focused on slow and/or fast charging along travel corridors.",
            ),
            OperatorBucket::CentralizedFuelRetail => Some(
                "Installed at major fuel stations or retail sites to serve customers on the go, \
                 primarily offering Level 3 fast charging.",
            ),
            OperatorBucket::SiteHost => Some(
                "Owned by individual businesses (e.g., restaurants, hotels) or municipalities that \
                 use hardware and software platforms like FLO or ChargePoint. Pricing and service \
                 are typically managed locally.",
            ),
            OperatorBucket::NonNetworked => None,
        }
    }

    /// Bar colour in the operator distribution charts
    pub fn chart_colour(&self) -> &'static str {
        match self {
            OperatorBucket::CentralizedFuelRetail => "#E1B97C",
            OperatorBucket::CentralizedAutomaker => "#C08D87",
            OperatorBucket::CentralizedUtility => "#4A6484",
            OperatorBucket::SiteHost => "#6C8C78",
            OperatorBucket::NonNetworked => "#A0A9AB",
        }
    }

    /// Row highlight colour in the pricing tables
    pub fn table_colour(&self) -> &'static str {
        match self {
            OperatorBucket::CentralizedFuelRetail => "#E1B97C",
            OperatorBucket::CentralizedAutomaker => "#C08D87",
            OperatorBucket::CentralizedUtility => "#9BBBE6",
            OperatorBucket::SiteHost => "#6C8C78",
            OperatorBucket::NonNetworked => "#A0A9AB",
        }
    }

    pub fn legend_label(&self) -> &'static str {
        match self {
            OperatorBucket::CentralizedFuelRetail => "🟨 Centralized Fuel/Retail Integrated",
            OperatorBucket::CentralizedAutomaker => "🟫 Centralized Automaker-Backed",
            OperatorBucket::CentralizedUtility => "🟦 Centralized Utility-Backed",
            OperatorBucket::SiteHost => "🟩 Non-Centralized Site-Host",
            OperatorBucket::NonNetworked => "⬜️ Non-Networked",
        }
    }
}

impl std::fmt::Display for OperatorBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Charging service class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChargingLevel {
    Level2,
    Level3,
}

impl ChargingLevel {
    pub const ALL: [ChargingLevel; 2] = [ChargingLevel::Level2, ChargingLevel::Level3];

    pub fn label(&self) -> &'static str {
        match self {
            ChargingLevel::Level2 => "Level 2",
            ChargingLevel::Level3 => "Level 3",
        }
    }

    /// Short key used by the pricing metadata `Charging station level` column
    pub fn short(&self) -> &'static str {
        match self {
            ChargingLevel::Level2 => "L2",
            ChargingLevel::Level3 => "L3",
        }
    }
}

/// Connector counts reported for a station; missing values are zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorCounts {
    pub j1772: u32,
    pub ccs: u32,
    pub chademo: u32,
    pub j3400: u32,
    pub dc_fast: u32,
}

/// Station row as read from the source file, before classification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawStation {
    pub name: Option<String>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub network: Option<String>,
    pub connectors: ConnectorCounts,
}

/// Flags derived by the classifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortFlags {
    pub tesla_l2: bool,
    pub tesla_l3: bool,
    pub dual_dc: bool,
    pub has_l2: bool,
    pub has_l3: bool,
}

/// Classified station; immutable once produced by the classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationRecord {
    pub name: Option<String>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub network: Option<String>,
    pub display_name: Option<String>,
    pub operator_bucket: OperatorBucket,
    /// Counts after the dual-standard DC merge
    pub connectors: ConnectorCounts,
    pub flags: PortFlags,
}

impl StationRecord {
    /// Whether the record belongs to the given jurisdiction code
    pub fn in_jurisdiction(&self, code: &str) -> bool {
        self.state.as_deref() == Some(code)
    }

    /// Both coordinates, when present and finite
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => Some((lat, lon)),
            _ => None,
        }
    }

    pub fn has_level(&self, level: ChargingLevel) -> bool {
        match level {
            ChargingLevel::Level2 => self.flags.has_l2,
            ChargingLevel::Level3 => self.flags.has_l3,
        }
    }
}

/// Counters collected while classifying one input file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationStats {
    pub input_rows: usize,
    pub output_rows: usize,
    pub tesla_l2: usize,
    pub tesla_l3: usize,
    pub dual_dc_merged: usize,
    pub dropped_by_jurisdiction: usize,
    pub missing_jurisdiction: usize,
    /// Network identifiers with no operator bucket entry, sorted
    pub unmapped_networks: Vec<String>,
}

/// Processing statistics for a pipeline run
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub stations_loaded: usize,
    pub stations_classified: usize,
    pub artifacts_written: usize,
    pub artifacts_skipped: usize,
    pub output_path: PathBuf,
    pub processing_time_ms: u128,
}
