//! Core data models for the report pipeline

use crate::error::DprError;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

/// Capacity used when the brief carries none (or an unusable one)
pub const DEFAULT_CAPACITY: f64 = 1000.0;
pub const DEFAULT_CURRENCY: &str = "INR";

//
// ================= Brief =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectBrief {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub capacity: Option<f64>,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default, alias = "additional")]
    pub assumptions: Assumptions,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

/// Per-brief overrides for the financial model. Unset fields use model defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Assumptions {
    #[serde(deserialize_with = "lenient_number")]
    pub price_per_unit: Option<f64>,
    #[serde(alias = "variable_cost_per_unit", deserialize_with = "lenient_number")]
    pub variable_cost: Option<f64>,
    #[serde(alias = "fixed_annual_overheads", deserialize_with = "lenient_number")]
    pub fixed_annual: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub capex: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub labor: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub maintenance: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub utilities: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub revenue_growth: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub variable_cost_growth: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub fixed_cost_growth: Option<f64>,
}

/// Accepts numbers and numeric strings; anything else becomes `None`.
fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }))
}

impl ProjectBrief {
    pub fn new(title: impl Into<String>, short_description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            short_description: short_description.into(),
            location: None,
            capacity: None,
            currency: default_currency(),
            assumptions: Assumptions::default(),
        }
    }

    /// Capacity actually fed to the model. Missing, zero and non-finite
    /// values fall back to the default; negatives are rejected by `validate`.
    pub fn effective_capacity(&self) -> f64 {
        match self.capacity {
            Some(c) if c.is_finite() && c > 0.0 => c,
            _ => DEFAULT_CAPACITY,
        }
    }

    pub fn location_or_na(&self) -> &str {
        match self.location.as_deref() {
            Some(l) if !l.trim().is_empty() => l,
            _ => "N/A",
        }
    }

    /// Fail fast on briefs the pipeline must not run with
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(DprError::InvalidBrief("title is required".to_string()));
        }

        if let Some(c) = self.capacity {
            if c < 0.0 {
                return Err(DprError::InvalidBrief(format!(
                    "capacity must be positive, got {}",
                    c
                )));
            }
        }

        if self.currency.trim().is_empty() {
            return Err(DprError::InvalidBrief("currency code is empty".to_string()));
        }

        let a = &self.assumptions;
        let amounts = [
            ("price_per_unit", a.price_per_unit),
            ("variable_cost", a.variable_cost),
            ("fixed_annual", a.fixed_annual),
            ("capex", a.capex),
            ("labor", a.labor),
            ("maintenance", a.maintenance),
            ("utilities", a.utilities),
        ];
        for (name, value) in amounts {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(DprError::InvalidBrief(format!(
                        "{} must be a non-negative number, got {}",
                        name, v
                    )));
                }
            }
        }

        let rates = [
            ("revenue_growth", a.revenue_growth),
            ("variable_cost_growth", a.variable_cost_growth),
            ("fixed_cost_growth", a.fixed_cost_growth),
        ];
        for (name, value) in rates {
            if let Some(v) = value {
                if !v.is_finite() || v <= -1.0 {
                    return Err(DprError::InvalidBrief(format!(
                        "{} must be greater than -1, got {}",
                        name, v
                    )));
                }
            }
        }

        Ok(())
    }
}

//
// ================= Classification =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    AgroProcessing,
    EvCharging,
    Default,
}

impl ProjectType {
    pub fn tag(&self) -> &'static str {
        match self {
            ProjectType::AgroProcessing => "agro_processing",
            ProjectType::EvCharging => "ev_charging",
            ProjectType::Default => "default",
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Named, ordered list of section titles for one project type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionOutline {
    pub name: &'static str,
    pub sections: &'static [&'static str],
}

//
// ================= Financials =================
//

/// Number of projected years
pub const PROJECTION_YEARS: usize = 5;

/// Column headers shared by every rendering of the projection table
pub const PROJECTION_COLUMNS: [&str; 4] = ["Revenue", "Variable Cost", "Fixed Cost", "EBITDA"];
pub const YEAR_COLUMN: &str = "Year";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearRow {
    pub year: u32,
    pub revenue: f64,
    pub variable_cost: f64,
    pub fixed_cost: f64,
    pub ebitda: f64,
}

impl YearRow {
    pub fn label(&self) -> String {
        format!("Year {}", self.year)
    }

    /// Values in `PROJECTION_COLUMNS` order
    pub fn values(&self) -> [f64; 4] {
        [self.revenue, self.variable_cost, self.fixed_cost, self.ebitda]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialProjection {
    pub rows: Vec<YearRow>,
}

impl FinancialProjection {
    pub fn rows(&self) -> &[YearRow] {
        &self.rows
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpexBreakdown {
    pub labor: f64,
    pub maintenance: f64,
    pub utilities: f64,
}

impl OpexBreakdown {
    pub fn total(&self) -> f64 {
        self.labor + self.maintenance + self.utilities
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialMeta {
    pub capex: f64,
    pub opex_breakdown: OpexBreakdown,
    pub currency: String,
}

//
// ================= External Context =================
//

/// Site data from the contextual lookup. Missing fields take the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextData {
    pub population_nearby: u64,
    pub avg_power_cost_per_kwh: f64,
    pub land_rent_per_acre: f64,
}

impl Default for ContextData {
    fn default() -> Self {
        Self {
            population_nearby: 120_000,
            avg_power_cost_per_kwh: 8.0,
            land_rent_per_acre: 150_000.0,
        }
    }
}

//
// ================= Section Content =================
//

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionContent {
    pub title: String,
    pub body: String,
}

/// Section bodies keyed by title, in outline order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionContentMap {
    entries: Vec<SectionContent>,
}

impl SectionContentMap {
    pub(crate) fn from_entries(entries: Vec<SectionContent>) -> Self {
        Self { entries }
    }

    pub fn get(&self, title: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.title == title)
            .map(|e| e.body.as_str())
    }

    pub fn titles(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.title.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SectionContent> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//
// ================= Output =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Chart,
    Spreadsheet,
    Narrative,
    Summary,
    Manifest,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
}

/// Everything produced for one brief
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportPackage {
    pub uid: String,
    pub project_type: ProjectType,
    pub template_name: String,
    pub narrative: PathBuf,
    pub summary: PathBuf,
    pub spreadsheet: PathBuf,
    pub chart: PathBuf,
    pub manifest: PathBuf,
    pub brief_hash: String,
    pub generated_at: DateTime<Utc>,
}
