use crate::model::{MatchResult, MatchStage, ReconSummary};

/// Running totals for one run. Created per run and passed through the
/// pipeline; nothing here outlives the run.
#[derive(Debug, Default)]
pub struct SummaryAccumulator {
    summary: ReconSummary,
}

impl SummaryAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, result: &MatchResult) {
        let s = &mut self.summary;
        s.total_records += 1;

        match result.stage {
            Some(MatchStage::Precise) => s.precise_matches += 1,
            Some(MatchStage::Coarse) => s.coarse_matches += 1,
            None => s.unmatched += 1,
        }
        if result.is_ambiguous() {
            s.ambiguous += 1;
        }
        if result.is_matched() && result.discrepancies.is_empty() {
            s.clean_matches += 1;
        }
        for note in &result.discrepancies {
            *s.discrepancy_counts.entry(note.kind().to_string()).or_insert(0) += 1;
        }
    }

    pub fn finish(self) -> ReconSummary {
        self.summary
    }
}
