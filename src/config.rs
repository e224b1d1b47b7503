//! Configuration management and validation.
//!
//! Provides the run configuration (input and output locations, pricing
//! sheets, map rendering and export settings), layered from built-in
//! defaults, an optional TOML or JSON file and command-line overrides.

use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_DASHBOARD_DIR, DEFAULT_EXPORT_FILE,
    DEFAULT_L2_PRICING, DEFAULT_L3_PRICING, DEFAULT_MAPS_DIR, DEFAULT_PRICING_METADATA,
    DEFAULT_TILE_ATTRIBUTION, DEFAULT_TILE_URL, DEFAULT_ZOOM_START,
};
use crate::error::{ChargeError, Result};
use polars::prelude::ParquetCompression;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Supported compression algorithms for parquet files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionAlgorithm {
    /// Snappy compression - good balance of speed and compression
    #[default]
    Snappy,
    /// ZSTD compression - better compression ratio, slower
    Zstd,
    /// LZ4 compression - fastest, lower compression ratio
    Lz4,
    /// No compression
    #[serde(alias = "none")]
    Uncompressed,
}

impl CompressionAlgorithm {
    /// Convert to polars ParquetCompression type
    pub fn to_polars_compression(&self) -> ParquetCompression {
        match self {
            CompressionAlgorithm::Snappy => ParquetCompression::Snappy,
            CompressionAlgorithm::Zstd => ParquetCompression::Zstd(None),
            CompressionAlgorithm::Lz4 => ParquetCompression::Lz4Raw,
            CompressionAlgorithm::Uncompressed => ParquetCompression::Uncompressed,
        }
    }
}

impl std::str::FromStr for CompressionAlgorithm {
    type Err = ChargeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "snappy" => Ok(Self::Snappy),
            "zstd" => Ok(Self::Zstd),
            "lz4" => Ok(Self::Lz4),
            "none" | "uncompressed" => Ok(Self::Uncompressed),
            other => Err(ChargeError::configuration(format!(
                "Invalid compression '{}'. Valid options: snappy, zstd, lz4, none",
                other
            ))),
        }
    }
}

/// Output format of the classified dataset export
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Parquet,
    Csv,
}

impl ExportFormat {
    /// Infer the format from a file extension, if recognised
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_lowercase().as_str() {
            "parquet" => Some(Self::Parquet),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }
}

/// Map rendering settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSettings {
    pub zoom_start: u8,
    pub tile_url: String,
    pub tile_attribution: String,
    /// Start locating the viewer as soon as the page loads
    pub locate_auto_start: bool,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            zoom_start: DEFAULT_ZOOM_START,
            tile_url: DEFAULT_TILE_URL.to_string(),
            tile_attribution: DEFAULT_TILE_ATTRIBUTION.to_string(),
            locate_auto_start: false,
        }
    }
}

/// Locations of the dashboard pricing sheets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingPaths {
    pub metadata: PathBuf,
    pub level2_ranges: PathBuf,
    pub level3_ranges: PathBuf,
}

impl Default for PricingPaths {
    fn default() -> Self {
        Self {
            metadata: PathBuf::from(DEFAULT_PRICING_METADATA),
            level2_ranges: PathBuf::from(DEFAULT_L2_PRICING),
            level3_ranges: PathBuf::from(DEFAULT_L3_PRICING),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub path: PathBuf,
    pub format: ExportFormat,
    pub compression: CompressionAlgorithm,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_EXPORT_FILE),
            format: ExportFormat::Parquet,
            compression: CompressionAlgorithm::Snappy,
        }
    }
}

/// Global configuration for a ChargeCompare run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChargeConfig {
    /// Station export; discovered in the working directory when unset
    pub input_path: Option<PathBuf>,

    pub maps_dir: PathBuf,

    pub dashboard_dir: PathBuf,

    pub pricing: PricingPaths,

    /// Override for the built-in network lookup tables
    pub network_tables_path: Option<PathBuf>,

    pub map: MapSettings,

    pub export: ExportSettings,
}

impl Default for ChargeConfig {
    fn default() -> Self {
        Self {
            input_path: None,
            maps_dir: PathBuf::from(DEFAULT_MAPS_DIR),
            dashboard_dir: PathBuf::from(DEFAULT_DASHBOARD_DIR),
            pricing: PricingPaths::default(),
            network_tables_path: None,
            map: MapSettings::default(),
            export: ExportSettings::default(),
        }
    }
}

impl ChargeConfig {
    /// Load configuration from a `.toml` or `.json` file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ChargeError::configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let config: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&contents).map_err(|e| {
                ChargeError::configuration(format!("Failed to parse {}: {}", path.display(), e))
            })?,
            Some("json") => serde_json::from_str(&contents).map_err(|e| {
                ChargeError::configuration(format!("Failed to parse {}: {}", path.display(), e))
            })?,
            other => {
                return Err(ChargeError::configuration(format!(
                    "Unsupported configuration file type: {}",
                    other.unwrap_or("<none>")
                )));
            }
        };

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Default location: `<config_dir>/chargecompare/config.toml`
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Explicit file if given, else the default file when it exists, else defaults
    pub fn load_layered(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match Self::default_config_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path),
                None => Ok(Self::default()),
            },
        }
    }

    pub fn with_input_path(mut self, path: PathBuf) -> Self {
        self.input_path = Some(path);
        self
    }

    pub fn with_maps_dir(mut self, dir: PathBuf) -> Self {
        self.maps_dir = dir;
        self
    }

    pub fn with_dashboard_dir(mut self, dir: PathBuf) -> Self {
        self.dashboard_dir = dir;
        self
    }

    pub fn with_pricing(mut self, pricing: PricingPaths) -> Self {
        self.pricing = pricing;
        self
    }

    pub fn with_network_tables(mut self, path: PathBuf) -> Self {
        self.network_tables_path = Some(path);
        self
    }

    pub fn with_zoom_start(mut self, zoom: u8) -> Self {
        self.map.zoom_start = zoom;
        self
    }

    /// Set the export target; the format follows the file extension when recognised
    pub fn with_export_path(mut self, path: PathBuf) -> Self {
        if let Some(format) = ExportFormat::from_path(&path) {
            self.export.format = format;
        }
        self.export.path = path;
        self
    }

    pub fn with_export_format(mut self, format: ExportFormat) -> Self {
        self.export.format = format;
        self
    }

    pub fn with_compression(mut self, compression: CompressionAlgorithm) -> Self {
        self.export.compression = compression;
        self
    }

    /// Check settings for consistency
    pub fn validate(&self) -> Result<()> {
        if !(1..=18).contains(&self.map.zoom_start) {
            return Err(ChargeError::configuration(format!(
                "Map zoom must be between 1 and 18, got {}",
                self.map.zoom_start
            )));
        }

        if self.map.tile_url.trim().is_empty() {
            return Err(ChargeError::configuration("Map tile URL cannot be empty"));
        }

        if self.maps_dir.as_os_str().is_empty() || self.dashboard_dir.as_os_str().is_empty() {
            return Err(ChargeError::configuration(
                "Output directories cannot be empty",
            ));
        }

        if let Some(path) = &self.input_path {
            if !path.is_file() {
                return Err(ChargeError::InputNotFound { path: path.clone() });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_defaults() {
        let config = ChargeConfig::default();
        assert_eq!(config.maps_dir, PathBuf::from("maps"));
        assert_eq!(config.map.zoom_start, 6);
        assert_eq!(config.export.format, ExportFormat::Parquet);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "maps_dir = \"out/maps\"\n\n[map]\nzoom_start = 8\n\n[export]\ncompression = \"zstd\""
        )
        .unwrap();

        let config = ChargeConfig::from_file(file.path()).unwrap();
        assert_eq!(config.maps_dir, PathBuf::from("out/maps"));
        assert_eq!(config.map.zoom_start, 8);
        assert_eq!(config.map.tile_url, DEFAULT_TILE_URL);
        assert_eq!(config.export.compression, CompressionAlgorithm::Zstd);
        assert_eq!(config.dashboard_dir, PathBuf::from("dashboard"));
    }

    #[test]
    fn test_json_config() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"export": {{"format": "csv", "compression": "none"}}}}"#).unwrap();

        let config = ChargeConfig::from_file(file.path()).unwrap();
        assert_eq!(config.export.format, ExportFormat::Csv);
        assert_eq!(config.export.compression, CompressionAlgorithm::Uncompressed);
    }

    #[test]
    fn test_unsupported_extension() {
        let file = Builder::new().suffix(".yaml").tempfile().unwrap();
        assert!(matches!(
            ChargeConfig::from_file(file.path()),
            Err(ChargeError::Configuration { .. })
        ));
    }

    #[test]
    fn test_validate_zoom_range() {
        assert!(ChargeConfig::default().with_zoom_start(0).validate().is_err());
        assert!(ChargeConfig::default().with_zoom_start(19).validate().is_err());
        assert!(ChargeConfig::default().with_zoom_start(18).validate().is_ok());
    }

    #[test]
    fn test_validate_missing_input() {
        let config = ChargeConfig::default().with_input_path(PathBuf::from("/no/such/stations.csv"));
        assert!(matches!(
            config.validate(),
            Err(ChargeError::InputNotFound { .. })
        ));
    }

    #[test]
    fn test_export_path_sets_format() {
        let config = ChargeConfig::default().with_export_path(PathBuf::from("stations.csv"));
        assert_eq!(config.export.format, ExportFormat::Csv);

        let config = ChargeConfig::default().with_export_path(PathBuf::from("stations.out"));
        assert_eq!(config.export.format, ExportFormat::Parquet);
    }

    #[test]
    fn test_compression_parsing() {
        assert_eq!("ZSTD".parse::<CompressionAlgorithm>().unwrap(), CompressionAlgorithm::Zstd);
        assert_eq!(
            "none".parse::<CompressionAlgorithm>().unwrap(),
            CompressionAlgorithm::Uncompressed
        );
        assert!("brotli".parse::<CompressionAlgorithm>().is_err());
    }
}
