//! Section outlines per project type

use crate::models::{ProjectType, SectionOutline};

const AGRO_PROCESSING: SectionOutline = SectionOutline {
    name: "Agro Processing Plant",
    sections: &[
        "Executive Summary",
        "Project Background",
        "Technical Feasibility",
        "Market Analysis",
        "Operations Plan",
        "Financial Projections",
        "Risk & Mitigation",
        "Conclusion",
    ],
};

const EV_CHARGING: SectionOutline = SectionOutline {
    name: "EV Charging Station",
    sections: &[
        "Executive Summary",
        "Site Analysis",
        "Technology & Equipment",
        "Market & Demand",
        "Financial Model",
        "Operations",
        "Environmental Impact",
        "Annexures",
    ],
};

const GENERAL: SectionOutline = SectionOutline {
    name: "General Project",
    sections: &[
        "Executive Summary",
        "Project Description",
        "Market Analysis",
        "Implementation Plan",
        "Financials",
        "Annexures",
    ],
};

/// Static template registry
pub struct TemplateRegistry;

impl TemplateRegistry {
    /// Total over `ProjectType`; `Default` maps to the general outline
    pub fn lookup(project_type: ProjectType) -> SectionOutline {
        match project_type {
            ProjectType::AgroProcessing => AGRO_PROCESSING,
            ProjectType::EvCharging => EV_CHARGING,
            ProjectType::Default => Self::fallback(),
        }
    }

    fn fallback() -> SectionOutline {
        GENERAL
    }
}
