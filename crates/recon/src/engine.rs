use crate::annotate::synthesize;
use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::evidence::SummaryAccumulator;
use crate::index::CanonicalIndex;
use crate::matcher::match_all;
use crate::model::{InputRecord, MatchResult, PropertyTokens, ReconMeta, ReconResult};
use crate::reconcile::reconcile;
use crate::table::{records_from_table, results_to_table, Table};
use crate::tokenize::tokenize_property;

/// Tag every record against the index. Total: each input record yields exactly
/// one result, in input order.
pub fn run(config: &ReconConfig, index: &CanonicalIndex, records: &[InputRecord]) -> ReconResult {
    let tokens: Vec<PropertyTokens> = records
        .iter()
        .map(|r| tokenize_property(r.property_text.as_deref()))
        .collect();

    let matches = match_all(records, &tokens, index, &config.well_name);

    let mut summary = SummaryAccumulator::new();
    let mut results = Vec::with_capacity(records.len());
    for ((record, tokens), candidate) in records.iter().zip(tokens).zip(matches) {
        let discrepancies = candidate
            .as_ref()
            .map(|c| reconcile(record, &tokens, c, config).into_notes())
            .unwrap_or_default();
        let notes = synthesize(&discrepancies, candidate.is_some());

        let result = MatchResult {
            row: record.row,
            registry_number: record.registry_number.clone(),
            tokens,
            stage: candidate.as_ref().map(|c| c.stage),
            canonical: candidate.map(|c| c.attributes),
            discrepancies,
            notes,
        };
        summary.record(&result);
        results.push(result);
    }

    let summary = summary.finish();
    log::info!(
        "{} records: {} precise, {} coarse, {} unmatched, {} clean",
        summary.total_records,
        summary.precise_matches,
        summary.coarse_matches,
        summary.unmatched,
        summary.clean_matches,
    );

    ReconResult {
        meta: ReconMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            registry_wells: index.len(),
        },
        summary,
        results,
    }
}

/// Tag one input table, returning the output table alongside the results.
pub fn process_table(
    config: &ReconConfig,
    index: &CanonicalIndex,
    input: &Table,
) -> Result<(Table, ReconResult), ReconError> {
    let records = records_from_table(input, &config.columns)?;
    let result = run(config, index, &records);
    let output = results_to_table(input, &config.columns, &result.results);
    Ok((output, result))
}
