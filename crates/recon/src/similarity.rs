use crate::config::{OperatorConfig, SimilarityMetric};
use crate::model::Discrepancy;

/// Similarity of two strings on a 0-100 scale. Symmetric.
pub fn similarity(metric: SimilarityMetric, a: &str, b: &str) -> f64 {
    match metric {
        SimilarityMetric::Indel => indel_ratio(a, b),
        SimilarityMetric::Levenshtein => strsim::normalized_levenshtein(a, b) * 100.0,
        SimilarityMetric::JaroWinkler => strsim::jaro_winkler(a, b) * 100.0,
    }
}

/// `100 * (1 - indel_distance / (len_a + len_b))`, where the indel distance
/// counts insertions and deletions only. Two empty strings score 100.
pub fn indel_ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 100.0;
    }
    rapidfuzz::fuzz::ratio(a.chars(), b.chars()) * 100.0
}

/// Map the best operator score to a note. `None` means an exact match.
pub fn classify_operator_score(score: f64, config: &OperatorConfig) -> Option<Discrepancy> {
    if score >= config.exact_threshold {
        None
    } else if score >= config.close_threshold {
        Some(Discrepancy::OperatorClose)
    } else {
        Some(Discrepancy::OperatorNotMatched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_score(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-6, "{actual} != {expected}");
    }

    #[test]
    fn indel_identical_and_empty() {
        assert_score(indel_ratio("ACME OIL", "ACME OIL"), 100.0);
        assert_score(indel_ratio("", ""), 100.0);
        assert_score(indel_ratio("ACME", ""), 0.0);
    }

    #[test]
    fn indel_known_values() {
        // LCS 9 over 20 chars
        assert_score(indel_ratio("ABCDEFGHIJ", "ABCDEFGHIK"), 90.0);
        // LCS 3 over 8 chars
        assert_score(indel_ratio("ABCD", "ABCE"), 75.0);
        // LCS 12 over 31 chars
        assert_score(indel_ratio("ACME PROD CO", "ACME PRODUCTION CO."), 2400.0 / 31.0);
    }

    #[test]
    fn indel_is_symmetric() {
        let a = "PIONEER NATURAL RES USA";
        let b = "PIONEER NATURAL RESOURCES";
        assert_score(indel_ratio(a, b), indel_ratio(b, a));
    }

    #[test]
    fn other_metrics_scale_to_100() {
        assert_eq!(similarity(SimilarityMetric::Levenshtein, "ABC", "ABC"), 100.0);
        assert_eq!(similarity(SimilarityMetric::JaroWinkler, "ABC", "ABC"), 100.0);
        assert!(similarity(SimilarityMetric::Levenshtein, "ABC", "XYZ") < 1.0);
    }

    #[test]
    fn operator_thresholds() {
        let config = OperatorConfig::default();
        assert_eq!(classify_operator_score(100.0, &config), None);
        assert_eq!(classify_operator_score(90.0, &config), Some(Discrepancy::OperatorClose));
        assert_eq!(classify_operator_score(80.0, &config), Some(Discrepancy::OperatorClose));
        assert_eq!(classify_operator_score(99.99, &config), Some(Discrepancy::OperatorClose));
        assert_eq!(classify_operator_score(79.0, &config), Some(Discrepancy::OperatorNotMatched));
        assert_eq!(
            classify_operator_score(79.99, &config),
            Some(Discrepancy::OperatorNotMatched)
        );
    }
}
