//! Static HTML rendering of the dashboard pages.

use super::pricing::PricingTable;
use super::summary::{BucketDistribution, OperatorInsights, PortSummary};
use super::{LevelSection, ProvincePage};
use crate::constants::{LEVEL2_BAR_COLOUR, LEVEL3_BAR_COLOUR};
use crate::html::format_count;
use crate::models::{ChargingLevel, OperatorBucket, Province};
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write;

const CHART_WIDTH: f64 = 420.0;
const CHART_HEIGHT: f64 = 240.0;
const BAR_AREA: f64 = 180.0;

/// File name of the dashboard page of a province
pub fn page_file_name(province: Province) -> String {
    format!("{}.html", province.code())
}

/// Two-bar chart of Level 2 and Level 3 port counts
pub fn port_chart_svg(summary: &PortSummary) -> String {
    let bars = [
        (ChargingLevel::Level2, summary.level2_ports, LEVEL2_BAR_COLOUR),
        (ChargingLevel::Level3, summary.level3_ports, LEVEL3_BAR_COLOUR),
    ];
    let max = bars.iter().map(|(_, n, _)| *n).max().unwrap_or(0).max(1) as f64;

    let mut svg = format!(
        r#"<svg class="chart" width="{w}" height="{h}" viewBox="0 0 {w} {h}" role="img" aria-label="Charging ports by level">"#,
        w = CHART_WIDTH,
        h = CHART_HEIGHT
    );
    for (i, (level, count, colour)) in bars.iter().enumerate() {
        let height = *count as f64 / max * BAR_AREA;
        let x = 60.0 + i as f64 * 180.0;
        let y = 20.0 + BAR_AREA - height;
        let _ = write!(
            svg,
            r#"<rect x="{x}" y="{y:.1}" width="120" height="{height:.1}" fill="{colour}"/><text x="{tx}" y="{ly:.1}" text-anchor="middle">{count}</text><text x="{tx}" y="{by}" text-anchor="middle">{label}</text>"#,
            tx = x + 60.0,
            ly = y - 4.0,
            by = CHART_HEIGHT - 18.0,
            count = format_count(*count),
            label = level.label(),
        );
    }
    svg.push_str("</svg>");
    svg
}

/// Horizontal bar chart of bucket proportions for one level
pub fn distribution_svg(distribution: &BucketDistribution) -> String {
    let shares = distribution.shares();
    let row_height = 28.0;
    let height = row_height * shares.len() as f64 + 10.0;

    let mut svg = format!(
        r#"<svg class="chart" width="{w}" height="{height}" viewBox="0 0 {w} {height}" role="img">"#,
        w = CHART_WIDTH + 200.0
    );
    for (i, share) in shares.iter().enumerate() {
        let y = 5.0 + i as f64 * row_height;
        let width = share.proportion * 300.0;
        let _ = write!(
            svg,
            r#"<text x="0" y="{ty:.1}">{label}</text><rect x="250" y="{y:.1}" width="{width:.1}" height="20" fill="{colour}"/><text x="{px:.1}" y="{ty:.1}">{percent:.1}% ({count})</text>"#,
            ty = y + 15.0,
            label = encode_text(share.bucket.label()),
            colour = share.bucket.chart_colour(),
            px = 256.0 + width,
            percent = share.proportion * 100.0,
            count = format_count(share.count),
        );
    }
    svg.push_str("</svg>");
    svg
}

pub fn summary_html(summary: &PortSummary) -> String {
    let share = match summary.level2_percent() {
        Some(percent) => format!("{:.1}% of stations offer Level 2 charging", percent),
        None => format!("No charging stations recorded for {}.", summary.province),
    };
    format!(
        r#"<div class="summary"><p><strong>Total stations:</strong> {}</p><p><strong>Level 2 ports:</strong> {}</p><p><strong>Level 3 ports:</strong> {}</p><p>{}</p></div>"#,
        format_count(summary.total_stations),
        format_count(summary.level2_ports),
        format_count(summary.level3_ports),
        share
    )
}

/// Bucket descriptions followed by the networks of each bucket in the province
pub fn operator_text_html(province: Province, operators: &[(OperatorBucket, Vec<String>)]) -> String {
    let mut html = String::from(r#"<div class="operators">"#);
    for (bucket, networks) in operators {
        let Some(description) = bucket.description() else {
            continue;
        };
        let _ = write!(
            html,
            "<p><strong>{}</strong>: {} In {}, this includes: {}.</p>",
            encode_text(bucket.label()),
            encode_text(description),
            encode_text(province.full_name()),
            encode_text(&networks.join(", "))
        );
    }
    html.push_str("</div>");
    html
}

pub fn insights_html(distribution: &BucketDistribution, insights: Option<&OperatorInsights>) -> String {
    match (distribution, insights) {
        (BucketDistribution::Shares { .. }, Some(insights)) => format!(
            r#"<div class="insights"><p><strong>{}</strong> stations are mostly <strong>{}</strong> ({}%).</p><p>Centralized networks: {}% &middot; Non-centralized: {}%</p></div>"#,
            insights.level.label(),
            encode_text(insights.dominant.label()),
            insights.dominant_percent,
            insights.centralized_percent,
            insights.non_centralized_percent
        ),
        (BucketDistribution::NoData { province, level }, _) | (BucketDistribution::Shares { province, level, .. }, None) => {
            format!(
                r#"<div class="insights"><p>No {} port data available for {}.</p></div>"#,
                level.short(),
                province.code()
            )
        }
    }
}

/// Pricing table with bucket highlighting, or the site-host notice
pub fn pricing_table_html(table: &PricingTable) -> String {
    let mut legend = String::new();
    if !table.rows.is_empty() {
        legend.push_str(r#"<ul class="legend">"#);
        for bucket in table.used_buckets() {
            let _ = write!(legend, "<li>{}</li>", encode_text(bucket.legend_label()));
        }
        legend.push_str("</ul>");
    }

    if table.is_all_non_centralized() {
        return format!(
            r#"{}<div class="notice">All {} stations in {} are operated by individual site hosts; pricing is set locally.</div>"#,
            legend,
            table.level.label(),
            encode_text(table.province.full_name())
        );
    }

    let mut headers = vec![
        "Network",
        "Station Power Level Range (kW)",
        "Pricing Approach",
        "Pricing Range",
    ];
    if table.level == ChargingLevel::Level3 {
        headers.push("Idle Fees Applied");
    }
    headers.push("Network App and roaming partners");

    let mut html = String::from(r#"<table class="pricing"><thead><tr>"#);
    for header in &headers {
        let _ = write!(html, "<th>{}</th>", header);
    }
    html.push_str("</tr></thead><tbody>");

    for row in &table.rows {
        let mut cells = vec![
            &row.network,
            &row.power_range,
            &row.pricing_approach,
            &row.pricing_range,
        ];
        if table.level == ChargingLevel::Level3 {
            cells.push(&row.idle_fees);
        }
        cells.push(&row.roaming_partners);

        let _ = write!(html, r#"<tr style="background-color: {}">"#, row.bucket.table_colour());
        for cell in cells {
            let _ = write!(html, "<td>{}</td>", encode_text(cell));
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");
    html.push_str(&legend);
    html
}

/// Embeds a rendered map page, or warns when it was not produced
pub fn map_section_html(code: &str, map_html: Option<&str>) -> String {
    match map_html {
        Some(map) => format!(
            r#"<iframe class="map" title="{} charging map" srcdoc="{}"></iframe>"#,
            encode_double_quoted_attribute(code),
            encode_double_quoted_attribute(map)
        ),
        None => format!(r#"<div class="warning">Map for {} not found</div>"#, encode_text(code)),
    }
}

fn level_section_html(section: &LevelSection) -> String {
    format!(
        r#"<section><h3>{level} operators</h3>{chart}{insights}<h3>{level} pricing</h3>{table}</section>"#,
        level = section.level.label(),
        chart = distribution_svg(&section.distribution),
        insights = insights_html(&section.distribution, section.insights.as_ref()),
        table = pricing_table_html(&section.pricing),
    )
}

fn province_selector(current: Option<Province>) -> String {
    let mut html = String::from(
        r#"<select onchange="if (this.value) { window.location.href = this.value; }"><option value="">Select a province</option>"#,
    );
    for province in Province::DASHBOARD {
        let selected = if Some(province) == current { " selected" } else { "" };
        let _ = write!(
            html,
            r#"<option value="{}"{}>{}</option>"#,
            page_file_name(province),
            selected,
            encode_text(province.full_name())
        );
    }
    html.push_str("</select>");
    html
}

pub fn province_page(page: &ProvincePage, generated_at: &str) -> String {
    let mut body = String::new();
    let _ = write!(
        body,
        "<h2>{}</h2>{}{}{}",
        encode_text(page.province.full_name()),
        summary_html(&page.summary),
        port_chart_svg(&page.summary),
        operator_text_html(page.province, &page.operators),
    );
    for section in &page.levels {
        body.push_str(&level_section_html(section));
    }
    body.push_str("<h3>Map</h3>");
    body.push_str(&map_section_html(page.province.code(), page.map_html.as_deref()));

    layout(
        &format!("EV charging in {}", page.province.full_name()),
        &province_selector(Some(page.province)),
        &body,
        generated_at,
    )
}

pub fn index_page(pages: &[ProvincePage], generated_at: &str) -> String {
    let mut body = String::from(
        r#"<table class="pricing"><thead><tr><th>Province</th><th>Stations</th><th>Level 2 ports</th><th>Level 3 ports</th></tr></thead><tbody>"#,
    );
    for page in pages {
        let _ = write!(
            body,
            r#"<tr><td><a href="{}">{}</a></td><td>{}</td><td>{}</td><td>{}</td></tr>"#,
            page_file_name(page.province),
            encode_text(page.province.full_name()),
            format_count(page.summary.total_stations),
            format_count(page.summary.level2_ports),
            format_count(page.summary.level3_ports)
        );
    }
    body.push_str("</tbody></table>");

    layout(
        "EV charging across Canada",
        &province_selector(None),
        &body,
        generated_at,
    )
}

fn layout(title: &str, selector: &str, body: &str, generated_at: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<style>{STYLE}</style>
</head>
<body>
<header><h1>{title}</h1>{selector}</header>
<main>{body}</main>
<footer>Generated {generated_at}</footer>
</body>
</html>
"#,
        title = encode_text(title),
        generated_at = encode_text(generated_at),
    )
}

const STYLE: &str = "body { font-family: sans-serif; margin: 0 auto; max-width: 1100px; padding: 1rem; } \
table.pricing { border-collapse: collapse; width: 100%; } \
table.pricing th, table.pricing td { border: 1px solid #ccc; padding: 4px 8px; text-align: left; } \
.notice { background: #eef4ee; padding: 0.75rem; } \
.warning { background: #fff3cd; padding: 0.75rem; } \
iframe.map { border: 0; height: 600px; width: 100%; } \
ul.legend { list-style: none; padding: 0; } \
footer { color: #666; font-size: 0.8rem; margin-top: 2rem; }";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::pricing::PricingRow;

    fn row(network: &str, bucket: OperatorBucket) -> PricingRow {
        PricingRow {
            network: network.to_string(),
            bucket,
            power_range: "7-19".to_string(),
            pricing_approach: "Time-based".to_string(),
            pricing_range: "Not available".to_string(),
            kwh_based: "No".to_string(),
            time_based: "Yes".to_string(),
            tiered_l3: "No".to_string(),
            idle_fees: "Yes".to_string(),
            roaming_partners: "App".to_string(),
        }
    }

    #[test]
    fn test_pricing_table_columns_by_level() {
        let mut table = PricingTable {
            province: Province::Ontario,
            level: ChargingLevel::Level2,
            rows: vec![row("Ivy", OperatorBucket::CentralizedUtility)],
        };
        let l2 = pricing_table_html(&table);
        assert!(!l2.contains("Idle Fees Applied"));
        assert!(l2.contains("#9BBBE6"));
        assert!(l2.contains("🟦 Centralized Utility-Backed"));

        table.level = ChargingLevel::Level3;
        assert!(pricing_table_html(&table).contains("Idle Fees Applied"));
    }

    #[test]
    fn test_site_host_notice_replaces_table() {
        let table = PricingTable {
            province: Province::Yukon,
            level: ChargingLevel::Level2,
            rows: vec![row("FLO", OperatorBucket::SiteHost)],
        };
        let html = pricing_table_html(&table);
        assert!(html.contains("individual site hosts"));
        assert!(!html.contains("<table"));
    }

    #[test]
    fn test_site_host_notice_keeps_legend_above_it() {
        let table = PricingTable {
            province: Province::Manitoba,
            level: ChargingLevel::Level3,
            rows: vec![
                row("FLO", OperatorBucket::SiteHost),
                row("Non-Networked", OperatorBucket::NonNetworked),
            ],
        };
        let html = pricing_table_html(&table);

        let legend = html.find("🟩 Non-Centralized Site-Host").unwrap();
        let notice = html.find("individual site hosts").unwrap();
        assert!(legend < notice);
        assert!(html.contains("⬜️ Non-Networked"));

        let empty = PricingTable {
            province: Province::Manitoba,
            level: ChargingLevel::Level3,
            rows: Vec::new(),
        };
        let html = pricing_table_html(&empty);
        assert!(html.contains("individual site hosts"));
        assert!(!html.contains("legend"));
    }

    #[test]
    fn test_insights_without_data() {
        let distribution = BucketDistribution::NoData {
            province: Province::NewBrunswick,
            level: ChargingLevel::Level2,
        };
        assert!(insights_html(&distribution, None).contains("No L2 port data available for NB."));
    }

    #[test]
    fn test_map_section() {
        assert!(map_section_html("PE", None).contains("Map for PE not found"));

        let embedded = map_section_html("PE", Some("<div id=\"map\"></div>"));
        assert!(embedded.contains("srcdoc=\"&lt;div id=&quot;map&quot;&gt;"));
    }

    #[test]
    fn test_map_section_attributes_cannot_break_out() {
        let embedded = map_section_html("P\"E", Some("<a title=\"x\">&</a>"));
        assert!(embedded.contains("title=\"P&quot;E charging map\""));
        assert!(embedded.contains("srcdoc=\"&lt;a title=&quot;x&quot;&gt;&amp;&lt;/a&gt;\""));
        assert!(!embedded.contains("title=\"x\""));

        assert!(map_section_html("<ZZ>", None).contains("Map for &lt;ZZ&gt; not found"));
    }

    #[test]
    fn test_operator_text() {
        let html = operator_text_html(
            Province::Quebec,
            &[(OperatorBucket::SiteHost, vec!["CHARGEPOINT".to_string(), "FLO".to_string()])],
        );
        assert!(html.contains("In Quebec, this includes: CHARGEPOINT, FLO."));
    }

    #[test]
    fn test_port_chart_uses_level_colours() {
        let summary = PortSummary {
            province: Province::Alberta,
            total_stations: 1500,
            level2_ports: 1200,
            level3_ports: 400,
        };
        let svg = port_chart_svg(&summary);
        assert!(svg.contains(LEVEL2_BAR_COLOUR));
        assert!(svg.contains(LEVEL3_BAR_COLOUR));
        assert!(svg.contains("1,200"));
    }
}
