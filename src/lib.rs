//! ChargeCompare Library
//!
//! Classifies Canadian public EV charging stations from the AFDC station
//! export and renders the results as province marker maps, a static
//! pricing dashboard and a classified dataset export.
//!
//! This library provides tools for:
//! - Loading the station export and auxiliary pricing sheets with Polars
//! - Classifying stations (Tesla detection, dual-port DC merge, charging
//!   levels, network names and operator buckets)
//! - Rendering Leaflet marker maps per province or territory
//! - Building per-province dashboard pages with pricing tables
//! - Exporting the classified records to Parquet or CSV

pub mod classifier;
pub mod cli;
pub mod config;
pub mod constants;
pub mod dashboard;
pub mod error;
pub mod html;
pub mod loader;
pub mod lookup;
pub mod map;
pub mod models;
pub mod processor;
pub mod telemetry;
pub mod writer;

// Re-export commonly used types
pub use classifier::{Classification, classify, classify_station};
pub use config::{ChargeConfig, CompressionAlgorithm, ExportFormat, MapSettings};
pub use error::{ChargeError, Result};
pub use lookup::NetworkTables;
pub use models::{
    ChargingLevel, ClassificationStats, ConnectorCounts, OperatorBucket, PortFlags,
    ProcessingStats, Province, RawStation, StationRecord,
};
pub use processor::StationPipeline;
