//! Document assembly
//!
//! Narrative report (Markdown: title block, one heading per section,
//! financial table, cost breakdown) and a one-page HTML summary that embeds
//! the chart. Both consume the projection as given; nothing is recomputed.

use crate::models::{
    ContextData, FinancialMeta, FinancialProjection, ProjectBrief, ProjectType,
    SectionContentMap, PROJECTION_COLUMNS, YEAR_COLUMN,
};
use crate::Result;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;
use tracing::debug;

pub const FINANCIAL_TABLE_HEADING: &str = "Financial Projections (Summary)";

/// Title-block details that are not part of the brief
#[derive(Debug, Clone)]
pub struct NarrativeHeader<'a> {
    pub template_name: &'a str,
    pub project_type: ProjectType,
    pub context: &'a ContextData,
    pub generated_at: DateTime<Utc>,
}

/// Two decimals with thousands separators: `-81,600.00`
pub fn format_amount(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let grouped = group_digits(int_part);

    let is_zero = int_part.bytes().all(|b| b == b'0') && frac_part.bytes().all(|b| b == b'0');
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };

    format!("{}{}.{}", sign, grouped, frac_part)
}

fn group_digits(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Markdown table of every projection row
pub fn financial_table(projection: &FinancialProjection) -> String {
    let mut out = String::new();

    out.push_str(&format!("| {} | {} |\n", YEAR_COLUMN, PROJECTION_COLUMNS.join(" | ")));
    out.push_str("|------|");
    for _ in PROJECTION_COLUMNS {
        out.push_str("---:|");
    }
    out.push('\n');

    for row in projection.rows() {
        let cells: Vec<String> = row.values().iter().map(|v| format_amount(*v)).collect();
        out.push_str(&format!("| {} | {} |\n", row.label(), cells.join(" | ")));
    }

    out
}

/// Collapse runs of whitespace, line breaks included, to single spaces
fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn render_narrative(
    brief: &ProjectBrief,
    content: &SectionContentMap,
    projection: &FinancialProjection,
    meta: &FinancialMeta,
    header: &NarrativeHeader<'_>,
) -> String {
    let mut out = String::new();

    // ── Title block ──
    out.push_str(&format!("# {}\n\n", single_line(&brief.title)));
    out.push_str(&format!("- **Location:** {}\n", brief.location_or_na()));
    out.push_str(&format!("- **Currency:** {}\n", meta.currency));
    out.push_str(&format!(
        "- **Template:** {} ({})\n",
        header.template_name, header.project_type
    ));
    out.push_str(&format!(
        "- **Generated:** {}\n\n",
        header.generated_at.to_rfc3339()
    ));

    out.push_str("### Site Context\n\n");
    out.push_str(&format!(
        "- Population nearby: {}\n",
        group_digits(&header.context.population_nearby.to_string())
    ));
    out.push_str(&format!(
        "- Average power cost per kWh: {}\n",
        format_amount(header.context.avg_power_cost_per_kwh)
    ));
    out.push_str(&format!(
        "- Land rent per acre: {}\n\n",
        format_amount(header.context.land_rent_per_acre)
    ));
    out.push_str("---\n\n");

    // ── Sections ──
    for section in content.iter() {
        out.push_str(&format!("## {}\n\n", section.title));
        for para in section.body.split("\n\n") {
            let para = para.trim();
            if !para.is_empty() {
                out.push_str(para);
                out.push_str("\n\n");
            }
        }
    }

    // ── Financials ──
    out.push_str("---\n\n");
    out.push_str(&format!("## {}\n\n", FINANCIAL_TABLE_HEADING));
    out.push_str(&format!("All amounts in {}.\n\n", meta.currency));
    out.push_str(&financial_table(projection));
    out.push('\n');

    out.push_str("### Capital & Operating Costs\n\n");
    out.push_str(&format!("| Item | Amount ({}) |\n", meta.currency));
    out.push_str("|------|---:|\n");
    let opex = &meta.opex_breakdown;
    for (item, amount) in [
        ("CAPEX", meta.capex),
        ("Labor", opex.labor),
        ("Maintenance", opex.maintenance),
        ("Utilities", opex.utilities),
        ("Total OPEX", opex.total()),
    ] {
        out.push_str(&format!("| {} | {} |\n", item, format_amount(amount)));
    }

    out
}

/// Write the narrative document to `destination`
pub fn build_narrative(
    brief: &ProjectBrief,
    content: &SectionContentMap,
    projection: &FinancialProjection,
    meta: &FinancialMeta,
    header: &NarrativeHeader<'_>,
    destination: &Path,
) -> Result<()> {
    let document = render_narrative(brief, content, projection, meta, header);
    fs::write(destination, document)?;

    debug!(path = %destination.display(), "Narrative written");
    Ok(())
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// One-page summary: chart image plus a pointer to the narrative
pub fn render_summary(narrative_name: &str, narrative_stem: &str, chart_png: &[u8]) -> String {
    let title = escape_html(&format!("DPR - {}", narrative_stem));
    let name = escape_html(narrative_name);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
  @page {{ size: A4; margin: 15mm; }}
  body {{ font-family: Helvetica, Arial, sans-serif; max-width: 180mm; margin: 0 auto; }}
  h1 {{ font-size: 14pt; text-align: center; }}
  img {{ width: 100%; }}
  p.note {{ font-size: 10pt; }}
</style>
</head>
<body>
<h1>{title}</h1>
<img alt="Revenue &amp; EBITDA (projection)" src="data:image/png;base64,{image}">
<p class="note">Note: Full textual DPR is included in <a href="{name}">{name}</a>. This page contains the summary and charts.</p>
</body>
</html>
"#,
        title = title,
        image = BASE64.encode(chart_png),
        name = name,
    )
}

/// Write the summary page to `destination`, embedding `chart`
pub fn build_summary(narrative: &Path, chart: &Path, destination: &Path) -> Result<()> {
    let chart_png = fs::read(chart)?;

    let name = narrative
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = narrative
        .file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    fs::write(destination, render_summary(&name, &stem, &chart_png))?;

    debug!(path = %destination.display(), "Summary written");
    Ok(())
}
