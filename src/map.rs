//! Province marker maps.
//!
//! Builds one Leaflet map per jurisdiction with separate marker clusters
//! for Level 2 and Level 3 stations, centered on the mean station
//! coordinate, and renders it as a standalone HTML page.

use crate::config::MapSettings;
use crate::constants::{LEVEL2_LAYER_NAME, LEVEL3_LAYER_NAME};
use crate::error::Result;
use crate::models::{Province, StationRecord};
use html_escape::encode_text;
use serde::Serialize;
use std::collections::BTreeSet;

/// File name of the rendered map of a province or territory
pub fn map_file_name(province: Province) -> String {
    format!("{}_map.html", province.code())
}

/// Distinct jurisdiction codes present in the records, sorted
pub fn jurisdictions(records: &[StationRecord]) -> Vec<String> {
    records
        .iter()
        .filter_map(|r| r.state.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub lat: f64,
    pub lon: f64,
    /// Pre-escaped popup HTML
    pub popup: String,
}

impl MapMarker {
    fn from_record(record: &StationRecord, (lat, lon): (f64, f64)) -> Self {
        let field = |value: &Option<String>| encode_text(value.as_deref().unwrap_or("")).into_owned();
        Self {
            lat,
            lon,
            popup: format!(
                "{}<br>{}<br>{}",
                field(&record.name),
                field(&record.street_address),
                field(&record.city)
            ),
        }
    }
}

/// Renderable map of one jurisdiction
#[derive(Debug, Clone, PartialEq)]
pub struct ProvinceMap {
    pub code: String,
    pub center: (f64, f64),
    pub station_count: usize,
    pub level2: Vec<MapMarker>,
    pub level3: Vec<MapMarker>,
}

impl ProvinceMap {
    /// Build the map for `code`.
    ///
    /// Returns `None` when no station of the jurisdiction has coordinates.
    pub fn build(records: &[StationRecord], code: &str) -> Option<Self> {
        let located: Vec<(&StationRecord, (f64, f64))> = records
            .iter()
            .filter(|r| r.in_jurisdiction(code))
            .filter_map(|r| r.coordinates().map(|c| (r, c)))
            .collect();

        if located.is_empty() {
            return None;
        }

        let n = located.len() as f64;
        let center = (
            located.iter().map(|(_, (lat, _))| lat).sum::<f64>() / n,
            located.iter().map(|(_, (_, lon))| lon).sum::<f64>() / n,
        );

        let mut level2 = Vec::new();
        let mut level3 = Vec::new();
        for (record, coords) in &located {
            if record.flags.has_l2 {
                level2.push(MapMarker::from_record(record, *coords));
            }
            if record.flags.has_l3 {
                level3.push(MapMarker::from_record(record, *coords));
            }
        }

        Some(Self {
            code: code.to_string(),
            center,
            station_count: located.len(),
            level2,
            level3,
        })
    }

    /// Render as a standalone Leaflet page
    pub fn to_html(&self, settings: &MapSettings) -> Result<String> {
        let payload = MapPayload {
            center: [self.center.0, self.center.1],
            zoom: settings.zoom_start,
            tile_url: &settings.tile_url,
            tile_attribution: &settings.tile_attribution,
            locate_auto_start: settings.locate_auto_start,
            layers: vec![
                LayerPayload {
                    name: LEVEL2_LAYER_NAME,
                    color: "green",
                    icon: "flash",
                    markers: &self.level2,
                },
                LayerPayload {
                    name: LEVEL3_LAYER_NAME,
                    color: "red",
                    icon: "bolt",
                    markers: &self.level3,
                },
            ],
        };

        // "</" would close the script element early
        let data = serde_json::to_string(&payload)?.replace("</", "<\\/");

        Ok(MAP_TEMPLATE
            .replace("__TITLE__", &encode_text(&format!("{} charging stations", self.code)))
            .replace("__MAP_DATA__", &data))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MapPayload<'a> {
    center: [f64; 2],
    zoom: u8,
    tile_url: &'a str,
    tile_attribution: &'a str,
    locate_auto_start: bool,
    layers: Vec<LayerPayload<'a>>,
}

#[derive(Serialize)]
struct LayerPayload<'a> {
    name: &'a str,
    color: &'a str,
    icon: &'a str,
    markers: &'a [MapMarker],
}

const MAP_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>__TITLE__</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
<link rel="stylesheet" href="https://unpkg.com/leaflet.markercluster@1.5.3/dist/MarkerCluster.css">
<link rel="stylesheet" href="https://unpkg.com/leaflet.markercluster@1.5.3/dist/MarkerCluster.Default.css">
<link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/leaflet.locatecontrol@0.79.0/dist/L.Control.Locate.min.css">
<link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/Leaflet.awesome-markers/2.0.2/leaflet.awesome-markers.css">
<link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/font-awesome/4.7.0/css/font-awesome.min.css">
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<script src="https://unpkg.com/leaflet.markercluster@1.5.3/dist/leaflet.markercluster.js"></script>
<script src="https://cdn.jsdelivr.net/npm/leaflet.locatecontrol@0.79.0/dist/L.Control.Locate.min.js"></script>
<script src="https://cdnjs.cloudflare.com/ajax/libs/Leaflet.awesome-markers/2.0.2/leaflet.awesome-markers.js"></script>
<style>html, body, #map { height: 100%; width: 100%; margin: 0; padding: 0; }</style>
</head>
<body>
<div id="map"></div>
<script>
const data = __MAP_DATA__;
const map = L.map("map").setView(data.center, data.zoom);
L.tileLayer(data.tileUrl, { attribution: data.tileAttribution, maxZoom: 19 }).addTo(map);
const overlays = {};
for (const layer of data.layers) {
  const cluster = L.markerClusterGroup();
  const icon = L.AwesomeMarkers.icon({ icon: layer.icon, markerColor: layer.color, prefix: "fa" });
  for (const m of layer.markers) {
    L.marker([m.lat, m.lon], { icon: icon }).bindPopup(m.popup).addTo(cluster);
  }
  cluster.addTo(map);
  overlays[layer.name] = cluster;
}
const locate = L.control.locate().addTo(map);
if (data.locateAutoStart) { locate.start(); }
L.control.layers(null, overlays, { collapsed: false }).addTo(map);
</script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConnectorCounts, OperatorBucket, PortFlags};

    fn record(state: &str, coords: Option<(f64, f64)>, l2: bool, l3: bool) -> StationRecord {
        StationRecord {
            name: Some("Café <Central>".to_string()),
            street_address: Some("12 Rue Principale".to_string()),
            city: Some("Québec".to_string()),
            state: Some(state.to_string()),
            latitude: coords.map(|c| c.0),
            longitude: coords.map(|c| c.1),
            network: None,
            display_name: None,
            operator_bucket: OperatorBucket::NonNetworked,
            connectors: ConnectorCounts::default(),
            flags: PortFlags {
                has_l2: l2,
                has_l3: l3,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_build_centers_on_mean_coordinate() {
        let records = vec![
            record("QC", Some((46.0, -72.0)), true, false),
            record("QC", Some((48.0, -70.0)), false, true),
            record("QC", None, true, true),
            record("ON", Some((43.0, -79.0)), true, false),
        ];

        let map = ProvinceMap::build(&records, "QC").unwrap();

        assert_eq!(map.center, (47.0, -71.0));
        assert_eq!(map.station_count, 2);
        assert_eq!(map.level2.len(), 1);
        assert_eq!(map.level3.len(), 1);
    }

    #[test]
    fn test_station_with_both_levels_is_in_both_clusters() {
        let records = vec![record("BC", Some((49.0, -123.0)), true, true)];
        let map = ProvinceMap::build(&records, "BC").unwrap();

        assert_eq!(map.level2.len(), 1);
        assert_eq!(map.level3.len(), 1);
    }

    #[test]
    fn test_build_without_coordinates_is_none() {
        let records = vec![record("NU", None, true, false)];
        assert_eq!(ProvinceMap::build(&records, "NU"), None);
        assert_eq!(ProvinceMap::build(&records, "YT"), None);
    }

    #[test]
    fn test_popup_is_escaped() {
        let records = vec![record("QC", Some((46.8, -71.2)), true, false)];
        let map = ProvinceMap::build(&records, "QC").unwrap();

        assert_eq!(
            map.level2[0].popup,
            "Café &lt;Central&gt;<br>12 Rue Principale<br>Québec"
        );
    }

    #[test]
    fn test_html_contains_layers_and_payload() {
        let records = vec![record("QC", Some((46.8, -71.2)), true, true)];
        let html = ProvinceMap::build(&records, "QC")
            .unwrap()
            .to_html(&MapSettings::default())
            .unwrap();

        assert!(html.contains("Level 2 Charging"));
        assert!(html.contains("Level 3 Charging"));
        assert!(html.contains("\"zoom\":6"));
        assert!(!html.contains("__MAP_DATA__"));
        assert!(html.contains("<br>12 Rue Principale"));
    }

    #[test]
    fn test_jurisdictions_sorted_and_distinct() {
        let records = vec![
            record("QC", None, true, false),
            record("AB", None, true, false),
            record("QC", None, true, false),
        ];
        assert_eq!(jurisdictions(&records), vec!["AB", "QC"]);
        assert_eq!(map_file_name(Province::Alberta), "AB_map.html");
    }
}
