//! Deterministic financial model
//!
//! Five-year Revenue / Variable Cost / Fixed Cost / EBITDA projection.
//! No I/O, no randomness: identical briefs give identical tables.

use crate::error::DprError;
use crate::models::{
    Assumptions, FinancialMeta, FinancialProjection, OpexBreakdown, ProjectBrief, YearRow,
    PROJECTION_COLUMNS, PROJECTION_YEARS,
};
use crate::Result;

pub const DEFAULT_PRICE_PER_UNIT: f64 = 100.0;
pub const DEFAULT_VARIABLE_COST_PER_UNIT: f64 = 40.0;
pub const DEFAULT_FIXED_ANNUAL_OVERHEADS: f64 = 200_000.0;
pub const DEFAULT_CAPEX: f64 = 5_000_000.0;
pub const DEFAULT_LABOR: f64 = 500_000.0;
pub const DEFAULT_MAINTENANCE: f64 = 200_000.0;
pub const DEFAULT_UTILITIES: f64 = 150_000.0;

pub const DEFAULT_REVENUE_GROWTH: f64 = 0.05;
pub const DEFAULT_VARIABLE_COST_GROWTH: f64 = 0.03;
pub const DEFAULT_FIXED_COST_GROWTH: f64 = 0.04;

/// Overrides merged over the named defaults
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelInputs {
    pub capacity: f64,
    pub price_per_unit: f64,
    pub variable_cost_per_unit: f64,
    pub fixed_annual_overheads: f64,
    pub revenue_growth: f64,
    pub variable_cost_growth: f64,
    pub fixed_cost_growth: f64,
    pub capex: f64,
    pub opex: OpexBreakdown,
}

impl ModelInputs {
    pub fn resolve(capacity: f64, overrides: &Assumptions) -> Self {
        Self {
            capacity,
            price_per_unit: overrides.price_per_unit.unwrap_or(DEFAULT_PRICE_PER_UNIT),
            variable_cost_per_unit: overrides
                .variable_cost
                .unwrap_or(DEFAULT_VARIABLE_COST_PER_UNIT),
            fixed_annual_overheads: overrides
                .fixed_annual
                .unwrap_or(DEFAULT_FIXED_ANNUAL_OVERHEADS),
            revenue_growth: overrides.revenue_growth.unwrap_or(DEFAULT_REVENUE_GROWTH),
            variable_cost_growth: overrides
                .variable_cost_growth
                .unwrap_or(DEFAULT_VARIABLE_COST_GROWTH),
            fixed_cost_growth: overrides
                .fixed_cost_growth
                .unwrap_or(DEFAULT_FIXED_COST_GROWTH),
            capex: overrides.capex.unwrap_or(DEFAULT_CAPEX),
            opex: OpexBreakdown {
                labor: overrides.labor.unwrap_or(DEFAULT_LABOR),
                maintenance: overrides.maintenance.unwrap_or(DEFAULT_MAINTENANCE),
                utilities: overrides.utilities.unwrap_or(DEFAULT_UTILITIES),
            },
        }
    }

    fn row(&self, i: usize) -> YearRow {
        let step = i as f64;
        let revenue = self.capacity * self.price_per_unit * (1.0 + self.revenue_growth * step);
        let variable_cost =
            self.capacity * self.variable_cost_per_unit * (1.0 + self.variable_cost_growth * step);
        let fixed_cost = self.fixed_annual_overheads * (1.0 + self.fixed_cost_growth * step);

        YearRow {
            year: (i + 1) as u32,
            revenue,
            variable_cost,
            fixed_cost,
            ebitda: revenue - variable_cost - fixed_cost,
        }
    }
}

/// Build the projection table and its CAPEX/OPEX metadata from one brief
pub fn project(brief: &ProjectBrief) -> (FinancialProjection, FinancialMeta) {
    let inputs = ModelInputs::resolve(brief.effective_capacity(), &brief.assumptions);

    let rows = (0..PROJECTION_YEARS).map(|i| inputs.row(i)).collect();

    let meta = FinancialMeta {
        capex: inputs.capex,
        opex_breakdown: inputs.opex,
        currency: brief.currency.clone(),
    };

    (FinancialProjection { rows }, meta)
}

/// Reject projections that overflowed; inputs can each be finite while their products are not
pub fn ensure_finite(projection: &FinancialProjection, meta: &FinancialMeta) -> Result<()> {
    for row in projection.rows() {
        for (column, value) in PROJECTION_COLUMNS.iter().zip(row.values()) {
            if !value.is_finite() {
                return Err(DprError::InvalidBrief(format!(
                    "{} for {} is out of range ({})",
                    column,
                    row.label(),
                    value
                )));
            }
        }
    }

    let totals = [
        ("CAPEX", meta.capex),
        ("Total OPEX", meta.opex_breakdown.total()),
    ];
    for (name, value) in totals {
        if !value.is_finite() {
            return Err(DprError::InvalidBrief(format!(
                "{} is out of range ({})",
                name, value
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    fn rice_mill() -> ProjectBrief {
        let mut brief = ProjectBrief::new("Rice Mill", "rice processing unit");
        brief.capacity = Some(2000.0);
        brief
    }

    #[test]
    fn test_rice_mill_scenario() {
        let (projection, meta) = project(&rice_mill());
        let rows = projection.rows();
        assert_eq!(rows.len(), 5);

        let y1 = rows[0];
        assert_eq!(y1.year, 1);
        assert!(approx(y1.revenue, 200_000.0));
        assert!(approx(y1.variable_cost, 80_000.0));
        assert!(approx(y1.fixed_cost, 200_000.0));
        assert!(approx(y1.ebitda, -80_000.0));

        let y5 = rows[4];
        assert_eq!(y5.year, 5);
        assert!(approx(y5.revenue, 240_000.0));
        assert!(approx(y5.variable_cost, 89_600.0));
        assert!(approx(y5.fixed_cost, 232_000.0));
        assert!(approx(y5.ebitda, -81_600.0));

        assert_eq!(meta.capex, DEFAULT_CAPEX);
        assert_eq!(meta.opex_breakdown.labor, DEFAULT_LABOR);
        assert_eq!(meta.currency, "INR");
    }

    #[test]
    fn test_ebitda_identity_holds_exactly() {
        let mut brief = rice_mill();
        brief.assumptions.price_per_unit = Some(137.35);
        brief.assumptions.variable_cost = Some(41.9);
        brief.assumptions.fixed_annual = Some(123_456.78);
        brief.assumptions.revenue_growth = Some(0.071);

        let (projection, _) = project(&brief);
        for row in projection.rows() {
            assert_eq!(row.ebitda, row.revenue - row.variable_cost - row.fixed_cost);
        }
    }

    #[test]
    fn test_monotonic_with_default_rates() {
        let (projection, _) = project(&rice_mill());
        for pair in projection.rows().windows(2) {
            assert!(pair[1].revenue >= pair[0].revenue);
            assert!(pair[1].variable_cost >= pair[0].variable_cost);
            assert!(pair[1].fixed_cost >= pair[0].fixed_cost);
        }
    }

    #[test]
    fn test_overrides_flow_into_meta() {
        let mut brief = ProjectBrief::new("Depot", "charging");
        brief.currency = "USD".to_string();
        brief.assumptions.capex = Some(750_000.0);
        brief.assumptions.utilities = Some(99.0);

        let (_, meta) = project(&brief);
        assert_eq!(meta.capex, 750_000.0);
        assert_eq!(meta.opex_breakdown.utilities, 99.0);
        assert_eq!(meta.opex_breakdown.maintenance, DEFAULT_MAINTENANCE);
        assert_eq!(meta.currency, "USD");
    }

    #[test]
    fn test_missing_capacity_uses_default() {
        let brief = ProjectBrief::new("Plant", "general");
        let (projection, _) = project(&brief);
        assert!(approx(projection.rows()[0].revenue, 1000.0 * DEFAULT_PRICE_PER_UNIT));
    }

    #[test]
    fn test_deterministic() {
        let brief = rice_mill();
        assert_eq!(project(&brief), project(&brief));
    }

    #[test]
    fn test_default_projection_is_finite() {
        let (projection, meta) = project(&rice_mill());
        assert!(ensure_finite(&projection, &meta).is_ok());
    }

    #[test]
    fn test_overflowing_capacity_rejected() {
        let mut brief = rice_mill();
        brief.capacity = Some(1e307);
        assert!(brief.validate().is_ok());

        let (projection, meta) = project(&brief);
        assert!(!projection.rows()[0].revenue.is_finite());

        let err = ensure_finite(&projection, &meta).unwrap_err();
        assert!(matches!(err, DprError::InvalidBrief(_)));
        assert!(err.to_string().contains("Revenue"));
    }

    #[test]
    fn test_overflowing_opex_rejected() {
        let mut brief = rice_mill();
        brief.assumptions.labor = Some(f64::MAX);
        brief.assumptions.maintenance = Some(f64::MAX);

        let (projection, meta) = project(&brief);
        let err = ensure_finite(&projection, &meta).unwrap_err();
        assert!(err.to_string().contains("Total OPEX"));
    }
}
