use crate::config::WellNameConfig;
use crate::index::CanonicalIndex;
use crate::model::{InputRecord, MatchStage, MatchedAttributes, PropertyTokens};
use crate::tokenize::{composite_key, normalize_well_name};

/// Canonical rows matched to one input record, with their collapsed attributes.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub stage: MatchStage,
    pub wells: Vec<usize>,
    pub attributes: MatchedAttributes,
}

/// One composite key per extracted well number; the bare name when there is none.
pub fn exploded_keys(tokens: &PropertyTokens, names: &WellNameConfig) -> Vec<String> {
    let Some(name) = tokens.well_name.as_deref() else {
        return Vec::new();
    };
    let name = normalize_well_name(name, &names.strip_chars, &names.replacements);
    if tokens.well_numbers.is_empty() {
        return vec![name];
    }
    tokens
        .well_numbers
        .iter()
        .map(|number| composite_key(&name, Some(number)))
        .collect()
}

/// Stage 1: composite key plus registry number equality.
pub fn match_precise(
    record: &InputRecord,
    tokens: &PropertyTokens,
    index: &CanonicalIndex,
    names: &WellNameConfig,
) -> Option<Candidate> {
    let registry = record.registry_number.as_deref()?;

    let mut wells: Vec<usize> = Vec::new();
    for key in exploded_keys(tokens, names) {
        for &i in index.lookup_composite(&key, registry) {
            if !wells.contains(&i) {
                wells.push(i);
            }
        }
    }
    if wells.is_empty() {
        return None;
    }

    let attributes = MatchedAttributes::collapse(wells.iter().map(|&i| index.well(i)));
    Some(Candidate {
        stage: MatchStage::Precise,
        wells,
        attributes,
    })
}

/// Stage 2: registry number alone.
pub fn match_coarse(record: &InputRecord, index: &CanonicalIndex) -> Option<Candidate> {
    let registry = record.registry_number.as_deref()?;
    index.registry_group(registry).map(|group| Candidate {
        stage: MatchStage::Coarse,
        wells: group.wells.clone(),
        attributes: group.attributes.clone(),
    })
}

/// Run Stage 1 over every record, then Stage 2 over the records Stage 1 left
/// unmatched. Results are positional: `out[i]` belongs to `records[i]`.
pub fn match_all(
    records: &[InputRecord],
    tokens: &[PropertyTokens],
    index: &CanonicalIndex,
    names: &WellNameConfig,
) -> Vec<Option<Candidate>> {
    let mut matches: Vec<Option<Candidate>> = records
        .iter()
        .zip(tokens)
        .map(|(record, tokens)| match_precise(record, tokens, index, names))
        .collect();

    for (slot, record) in matches.iter_mut().zip(records) {
        if slot.is_none() {
            *slot = match_coarse(record, index);
        }
    }

    for (record, slot) in records.iter().zip(&matches) {
        match slot {
            Some(c) => log::debug!("row {}: {} match, {} well(s)", record.row, c.stage, c.wells.len()),
            None => log::debug!("row {}: no match", record.row),
        }
    }

    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CanonicalWell, FieldValue};
    use crate::tokenize::tokenize_property;

    fn well(id: &str, rrc: &str, name: &str, number: &str) -> CanonicalWell {
        CanonicalWell {
            well_id: id.into(),
            registry_number: Some(rrc.into()),
            well_name: Some(name.into()),
            well_number: Some(number.into()),
            operator_name: Some("ACME".into()),
            ..Default::default()
        }
    }

    fn index() -> CanonicalIndex {
        CanonicalIndex::from_wells(
            vec![
                well("1", "100", "SMITH UNIT", "1"),
                well("2", "100", "SMITH UNIT", "3"),
                well("3", "100", "OTHER", "9"),
                well("4", "200", "JONES", "2"),
            ],
            &WellNameConfig::default(),
        )
    }

    fn record(row: usize, property: &str, rrc: &str) -> InputRecord {
        InputRecord {
            row,
            property_text: Some(property.into()),
            registry_number: Some(rrc.into()),
            ..Default::default()
        }
    }

    #[test]
    fn explode_by_well_number() {
        let tokens = tokenize_property(Some("Smith Gas Unit 1/2"));
        let keys = exploded_keys(&tokens, &WellNameConfig::default());
        assert_eq!(keys, vec!["SMITH GU 1", "SMITH GU 2"]);

        let tokens = tokenize_property(Some("SMITH UNIT"));
        assert_eq!(exploded_keys(&tokens, &WellNameConfig::default()), vec!["SMITH UNIT"]);
        assert!(exploded_keys(&PropertyTokens::default(), &WellNameConfig::default()).is_empty());
    }

    #[test]
    fn precise_match_collapses_multiple_numbers() {
        let index = index();
        let rec = record(0, "SMITH UNIT #1, 3", "100");
        let tokens = tokenize_property(rec.property_text.as_deref());
        let c = match_precise(&rec, &tokens, &index, &WellNameConfig::default()).unwrap();
        assert_eq!(c.stage, MatchStage::Precise);
        assert_eq!(c.wells, vec![0, 1]);
        assert_eq!(c.attributes.well_number.joined().as_deref(), Some("1 | 3"));
        assert_eq!(c.attributes.operator_name, FieldValue::Single("ACME".into()));
    }

    #[test]
    fn precise_match_needs_same_registry_number() {
        let index = index();
        let rec = record(0, "JONES #2", "100");
        let tokens = tokenize_property(rec.property_text.as_deref());
        assert!(match_precise(&rec, &tokens, &index, &WellNameConfig::default()).is_none());
    }

    #[test]
    fn coarse_fallback_only_fills_gaps() {
        let index = index();
        let records = vec![
            record(0, "SMITH UNIT #3", "100"),
            record(1, "SOMETHING ELSE #5", "100"),
            record(2, "JONES #2", "999"),
        ];
        let tokens: Vec<_> = records
            .iter()
            .map(|r| tokenize_property(r.property_text.as_deref()))
            .collect();
        let matches = match_all(&records, &tokens, &index, &WellNameConfig::default());

        let first = matches[0].as_ref().unwrap();
        assert_eq!(first.stage, MatchStage::Precise);
        assert_eq!(first.attributes.well_id, FieldValue::Single("2".into()));

        let second = matches[1].as_ref().unwrap();
        assert_eq!(second.stage, MatchStage::Coarse);
        assert_eq!(second.attributes.well_id.joined().as_deref(), Some("1 | 2 | 3"));

        assert!(matches[2].is_none());
    }

    #[test]
    fn identical_keys_on_different_rows_stay_separate() {
        let index = index();
        let records = vec![record(0, "SMITH UNIT #1", "100"), record(1, "SMITH UNIT #1", "100")];
        let tokens: Vec<_> = records
            .iter()
            .map(|r| tokenize_property(r.property_text.as_deref()))
            .collect();
        let matches = match_all(&records, &tokens, &index, &WellNameConfig::default());
        for m in &matches {
            assert_eq!(m.as_ref().unwrap().wells, vec![0]);
        }
    }
}
