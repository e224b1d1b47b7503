//! Versioned network lookup tables.
//!
//! Maps raw `EV Network` identifiers to canonical display names and to
//! operator buckets. A built-in table ships with the crate; an override
//! file in TOML or JSON can replace it without touching classifier code.

use crate::constants::NETWORK_TABLES_VERSION;
use crate::error::{ChargeError, Result};
use crate::models::OperatorBucket;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Lookup data consulted by the classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkTables {
    /// Table revision, bumped whenever a mapping changes
    pub version: u32,

    /// Raw network identifier -> display name
    pub display_names: BTreeMap<String, String>,

    /// Raw network identifier -> operator bucket
    pub operator_buckets: BTreeMap<String, OperatorBucket>,
}

impl Default for NetworkTables {
    fn default() -> Self {
        let display_names = [
            ("Tesla", "Tesla"),
            ("Tesla Destination", "Tesla"),
            ("Electrify Canada", "Electrify Canada"),
            ("SHELL_RECHARGE", "Shell Recharge"),
            ("PETROCAN", "Petro Canada"),
            ("COUCHE_TARD", "Couche Tard/CircleK"),
            ("CIRCLE_K", "Couche Tard/CircleK"),
            ("ON_THE_RUN_EV", "On The Run EV (Parkland)"),
            ("BCHYDRO", "BC Hydro"),
            ("Circuit électrique", "Electric Circuit (Hydro Quebec)"),
            ("IVY", "Ivy (OPG and Hydro One)"),
            ("eCharge Network", "eCharge (NB power)"),
            ("FORD_CHARGE", "Ford Blue Oval"),
        ]
        .into_iter()
        .map(|(raw, name)| (raw.to_string(), name.to_string()))
        .collect();

        use OperatorBucket::*;
        let operator_buckets = [
            ("BCHYDRO", CentralizedUtility),
            ("Circuit électrique", CentralizedUtility),
            ("IVY", CentralizedUtility),
            ("eCharge Network", CentralizedUtility),
            ("Tesla", CentralizedAutomaker),
            ("Tesla Destination", CentralizedAutomaker),
            ("Electrify Canada", CentralizedAutomaker),
            ("FORD_CHARGE", CentralizedAutomaker),
            ("PETROCAN", CentralizedFuelRetail),
            ("SHELL_RECHARGE", CentralizedFuelRetail),
            ("COUCHE_TARD", CentralizedFuelRetail),
            ("ON_THE_RUN_EV", CentralizedFuelRetail),
            ("7CHARGE", CentralizedFuelRetail),
            ("CIRCLE_K", CentralizedFuelRetail),
            ("AUTEL", SiteHost),
            ("LAKELAND_EV", SiteHost),
            ("ChargePoint Network", SiteHost),
            ("FLO", SiteHost),
            ("SWTCH", SiteHost),
            ("CHARGELAB", SiteHost),
            ("EV Connect", SiteHost),
            ("OpConnect", SiteHost),
            ("JULE", SiteHost),
            ("NOODOE", SiteHost),
            ("AMPUP", SiteHost),
            ("TURNONGREEN", SiteHost),
            ("EVBOLT", SiteHost),
            ("Hwisel", SiteHost),
            ("ZEFNET", SiteHost),
            ("EVGATEWAY", SiteHost),
            ("CHARGEUP", SiteHost),
            ("RED_E", SiteHost),
            ("HONEY_BADGER", SiteHost),
            ("Sun Country Highway", SiteHost),
        ]
        .into_iter()
        .map(|(raw, bucket)| (raw.to_string(), bucket))
        .collect();

        Self {
            version: NETWORK_TABLES_VERSION,
            display_names,
            operator_buckets,
        }
    }
}

impl NetworkTables {
    /// Load tables from a `.toml` or `.json` file
    pub fn from_file(path: &Path) -> Result<Self> {
        let invalid = |reason: String| ChargeError::InvalidNetworkTables {
            path: path.to_path_buf(),
            reason,
        };

        let contents = std::fs::read_to_string(path)
            .map_err(|e| invalid(format!("failure reading file: {e}")))?;

        let tables: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => {
                toml::from_str(&contents).map_err(|e| invalid(format!("failure decoding: {e}")))?
            }
            Some("json") => serde_json::from_str(&contents)
                .map_err(|e| invalid(format!("failure decoding: {e}")))?,
            other => {
                return Err(invalid(format!(
                    "unsupported file type: {}",
                    other.unwrap_or("<none>")
                )));
            }
        };

        if tables.operator_buckets.is_empty() {
            return Err(invalid("operator_buckets table is empty".to_string()));
        }

        debug!(
            "Loaded network tables v{} from {}: {} display names, {} buckets",
            tables.version,
            path.display(),
            tables.display_names.len(),
            tables.operator_buckets.len()
        );

        Ok(tables)
    }

    /// Load from the given override path, or fall back to the built-in table
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Canonical display name; unmapped identifiers yield `None`
    pub fn display_name(&self, network: &str) -> Option<&str> {
        self.display_names.get(network).map(String::as_str)
    }

    /// Operator bucket of a raw identifier, if mapped
    pub fn bucket_of(&self, network: &str) -> Option<OperatorBucket> {
        self.operator_buckets.get(network).copied()
    }

    /// Bucket of a display name, via any raw identifier that maps to it
    pub fn bucket_of_display_name(&self, display_name: &str) -> Option<OperatorBucket> {
        self.display_names
            .iter()
            .filter(|(_, name)| name.as_str() == display_name)
            .find_map(|(raw, _)| self.bucket_of(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_default_tables() {
        let tables = NetworkTables::default();

        assert_eq!(tables.version, NETWORK_TABLES_VERSION);
        assert_eq!(tables.display_names.len(), 13);
        assert_eq!(tables.display_name("BCHYDRO"), Some("BC Hydro"));
        assert_eq!(tables.display_name("FLO"), None);
        assert_eq!(
            tables.bucket_of("SHELL_RECHARGE"),
            Some(OperatorBucket::CentralizedFuelRetail)
        );
        assert_eq!(tables.bucket_of("Non-Networked"), None);
    }

    #[test]
    fn test_every_display_name_has_a_bucket() {
        let tables = NetworkTables::default();
        for raw in tables.display_names.keys() {
            assert!(tables.bucket_of(raw).is_some(), "{raw} has no bucket");
        }
    }

    #[test]
    fn test_bucket_of_display_name() {
        let tables = NetworkTables::default();
        assert_eq!(
            tables.bucket_of_display_name("Tesla"),
            Some(OperatorBucket::CentralizedAutomaker)
        );
        assert_eq!(
            tables.bucket_of_display_name("Electric Circuit (Hydro Quebec)"),
            Some(OperatorBucket::CentralizedUtility)
        );
        assert_eq!(tables.bucket_of_display_name("Unknown Network"), None);
    }

    #[test]
    fn test_load_toml_override() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "version = 2").unwrap();
        writeln!(file, "[display_names]").unwrap();
        writeln!(file, "\"NEW_NET\" = \"New Network\"").unwrap();
        writeln!(file, "[operator_buckets]").unwrap();
        writeln!(file, "\"NEW_NET\" = \"Centralized Utility-Backed\"").unwrap();
        writeln!(file, "\"Circuit électrique\" = \"Centralized Utility-Backed\"").unwrap();

        let tables = NetworkTables::from_file(file.path()).unwrap();

        assert_eq!(tables.version, 2);
        assert_eq!(tables.display_name("NEW_NET"), Some("New Network"));
        assert_eq!(
            tables.bucket_of("Circuit électrique"),
            Some(OperatorBucket::CentralizedUtility)
        );
        assert_eq!(tables.bucket_of("BCHYDRO"), None);
    }

    #[test]
    fn test_json_round_trip_of_defaults() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        let json = serde_json::to_string(&NetworkTables::default()).unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let tables = NetworkTables::from_file(file.path()).unwrap();
        assert_eq!(tables, NetworkTables::default());
    }

    #[test]
    fn test_rejects_unknown_bucket_and_extension() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "version = 1\n[display_names]\n[operator_buckets]\n\"X\" = \"Cooperative\"")
            .unwrap();
        assert!(matches!(
            NetworkTables::from_file(file.path()),
            Err(ChargeError::InvalidNetworkTables { .. })
        ));

        let other = Builder::new().suffix(".yaml").tempfile().unwrap();
        assert!(NetworkTables::from_file(other.path()).is_err());
    }
}
