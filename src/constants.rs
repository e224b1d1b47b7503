//! Application constants for ChargeCompare
//!
//! This module contains source column names, network codes with special
//! handling, default file locations and presentation constants used
//! throughout the application.

// =============================================================================
// Source Columns
// =============================================================================

/// Exact column names of the AFDC charging-unit export
pub mod columns {
    pub const STATION_NAME: &str = "Station Name";
    pub const STREET_ADDRESS: &str = "Street Address";
    pub const CITY: &str = "City";
    pub const STATE: &str = "State";
    pub const LATITUDE: &str = "Latitude";
    pub const LONGITUDE: &str = "Longitude";
    pub const EV_NETWORK: &str = "EV Network";
    pub const J1772_COUNT: &str = "EV J1772 Connector Count";
    pub const CCS_COUNT: &str = "EV CCS Connector Count";
    pub const CHADEMO_COUNT: &str = "EV CHAdeMO Connector Count";
    pub const J3400_COUNT: &str = "EV J3400 Connector Count";
    pub const DC_FAST_COUNT: &str = "EV DC Fast Count";

    /// Columns whose absence makes the input unusable
    pub const REQUIRED: &[&str] = &[STATE, EV_NETWORK];
}

/// Column names of the auxiliary pricing tables
pub mod pricing_columns {
    pub const NETWORK: &str = "Network";
    pub const LEVEL: &str = "Charging station level";
    pub const POWER_RANGE: &str = "Station Power Level Range (kW)";
    pub const PRICING_APPROACH: &str = "Pricing Approach";
    pub const KWH_PRICING: &str = "kWh Based Pricing";
    pub const TIME_PRICING: &str = "Time Based Pricing";
    pub const TIERED_L3: &str = "Tiered Pricing for L3";
    pub const IDLE_FEES: &str = "Idle Fees Applied";
    pub const ROAMING: &str = "Network App and roaming partners";
}

// =============================================================================
// Network Codes
// =============================================================================

/// Network designation used by the feed for Tesla destination (Level 2) sites
pub const TESLA_DESTINATION: &str = "Tesla Destination";

/// Value the feed uses for stations that belong to no network
pub const NON_NETWORKED: &str = "Non-Networked";

/// Network code that only operates in Ontario
pub const ONTARIO_ONLY_NETWORK: &str = "IVY";

/// Jurisdiction code for Ontario
pub const ONTARIO_CODE: &str = "ON";

/// Version of the built-in network lookup tables
pub const NETWORK_TABLES_VERSION: u32 = 1;

// =============================================================================
// File Locations
// =============================================================================

/// Prefix of the monthly AFDC export file name
pub const DEFAULT_INPUT_PREFIX: &str = "alt_fuel_stations";

pub const DEFAULT_MAPS_DIR: &str = "maps";
pub const DEFAULT_DASHBOARD_DIR: &str = "dashboard";
pub const DEFAULT_PRICING_METADATA: &str = "Pricing_data_networks.csv";
pub const DEFAULT_L2_PRICING: &str = "L2_pricing.csv";
pub const DEFAULT_L3_PRICING: &str = "L3_pricing.csv";
pub const DEFAULT_EXPORT_FILE: &str = "classified_stations.parquet";

/// Application directory name under the user config directory
pub const CONFIG_DIR_NAME: &str = "chargecompare";
pub const CONFIG_FILE_NAME: &str = "config.toml";

// =============================================================================
// Map Rendering
// =============================================================================

pub const DEFAULT_ZOOM_START: u8 = 6;
pub const DEFAULT_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const DEFAULT_TILE_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";

pub const LEVEL2_LAYER_NAME: &str = "Level 2 Charging";
pub const LEVEL3_LAYER_NAME: &str = "Level 3 Charging";

// =============================================================================
// Dashboard Presentation
// =============================================================================

/// Placeholder for pricing cells without data
pub const NOT_AVAILABLE: &str = "Not available";

/// Placeholder used inside the source pricing sheets
pub const SOURCE_NOT_AVAILABLE: &str = "N/A";

pub const LEVEL2_BAR_COLOUR: &str = "#015A06";
pub const LEVEL3_BAR_COLOUR: &str = "#999999";

/// Provinces (by code) where Tesla bills by time rather than energy
pub const TESLA_TIME_BASED_PROVINCES: &[&str] = &["NB", "PE"];

/// Provinces (by code) where Shell Recharge bills by time rather than energy
pub const SHELL_TIME_BASED_PROVINCES: &[&str] = &["MB"];
