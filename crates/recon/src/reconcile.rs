//! Attribute checks between an input record and its matched canonical rows.
//!
//! Rules are evaluated in a fixed order and each appends at most one note to
//! a [`NoteTrail`]; the order is part of the output contract.

use crate::config::ReconConfig;
use crate::matcher::Candidate;
use crate::model::{
    Discrepancy, FieldValue, InputRecord, MatchStage, MatchedAttributes, PropertyTokens,
    WellNumbers, MULTI_VALUE_SEPARATOR,
};
use crate::similarity::{classify_operator_score, similarity};
use crate::tokenize::{clean_text, county_token, state_token};

/// Ordered, deduplicated discrepancy notes for one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteTrail(Vec<Discrepancy>);

impl NoteTrail {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, note: Option<Discrepancy>) -> Self {
        if let Some(note) = note {
            if !self.0.contains(&note) {
                self.0.push(note);
            }
        }
        self
    }

    pub fn notes(&self) -> &[Discrepancy] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_notes(self) -> Vec<Discrepancy> {
        self.0
    }
}

/// Run every rule against a matched record.
pub fn reconcile(
    record: &InputRecord,
    tokens: &PropertyTokens,
    candidate: &Candidate,
    config: &ReconConfig,
) -> NoteTrail {
    let attrs = &candidate.attributes;
    let numbers = match candidate.stage {
        MatchStage::Precise => &tokens.well_numbers,
        MatchStage::Coarse => &tokens.recursive_well_numbers,
    };

    let trail = NoteTrail::new()
        .with(empty_operator(attrs))
        .with(operator_similarity(record.operator_name.as_deref(), attrs, config))
        .with(county_containment(record.county.as_deref(), attrs))
        .with(state_containment(record.state.as_deref(), attrs))
        .with(missing_fields(attrs));

    let trail = match candidate.stage {
        MatchStage::Coarse => trail.with(well_number_mismatch(numbers, attrs)),
        MatchStage::Precise => trail,
    };

    trail.with(missing_well_numbers(numbers, attrs))
}

pub fn empty_operator(attrs: &MatchedAttributes) -> Option<Discrepancy> {
    attrs
        .operator_name
        .is_absent()
        .then_some(Discrepancy::EmptyOperator)
}

/// Best score over every collapsed canonical operator. Only the canonical
/// side is cleaned; the input operator is scored as typed, trimmed. Absent
/// canonical operators are left to [`empty_operator`].
pub fn operator_similarity(
    input_operator: Option<&str>,
    attrs: &MatchedAttributes,
    config: &ReconConfig,
) -> Option<Discrepancy> {
    let op = &config.operator;
    if attrs.operator_name.is_absent() {
        return None;
    }
    let input = input_operator.unwrap_or_default().trim();

    let best = attrs
        .operator_name
        .values()
        .into_iter()
        .map(|candidate| clean_text(candidate, &op.strip_chars, &op.replacements))
        .map(|candidate| similarity(op.metric, &candidate, input))
        .fold(0.0_f64, f64::max);

    classify_operator_score(best, op)
}

pub fn county_containment(input_county: Option<&str>, attrs: &MatchedAttributes) -> Option<Discrepancy> {
    let token = county_token(input_county);
    remaining_locations(token.as_deref(), &attrs.county).map(Discrepancy::FoundInCounty)
}

pub fn state_containment(input_state: Option<&str>, attrs: &MatchedAttributes) -> Option<Discrepancy> {
    let token = state_token(input_state);
    remaining_locations(token.as_deref(), &attrs.state).map(Discrepancy::FoundInState)
}

/// When the canonical location differs from the input token, the canonical
/// values other than the input token.
fn remaining_locations(token: Option<&str>, canonical: &FieldValue) -> Option<String> {
    let joined = canonical.joined()?;
    if token == Some(joined.as_str()) {
        return None;
    }
    let mut remaining = canonical.values();
    if let Some(pos) = token.and_then(|t| remaining.iter().position(|v| *v == t)) {
        remaining.remove(pos);
    }
    Some(remaining.join(MULTI_VALUE_SEPARATOR))
}

pub fn missing_fields(attrs: &MatchedAttributes) -> Option<Discrepancy> {
    let checked = [
        ("well_name", &attrs.well_name),
        ("well_number", &attrs.well_number),
        ("lease_name", &attrs.lease_name),
        ("operator", &attrs.operator_name),
        ("well_name_number", &attrs.well_name_number),
    ];
    let missing: Vec<&'static str> = checked
        .iter()
        .filter(|(_, value)| value.is_absent())
        .map(|(name, _)| *name)
        .collect();
    (!missing.is_empty()).then_some(Discrepancy::MissingFields(missing))
}

pub fn well_number_mismatch(numbers: &WellNumbers, attrs: &MatchedAttributes) -> Option<Discrepancy> {
    (!numbers.same_set(attrs.well_number.values())).then_some(Discrepancy::WellNumberMismatch)
}

/// Extracted numbers that no matched canonical row accounts for.
///
/// Every canonical number is taken out of the extracted set. The first one
/// the input never mentioned ends the check with no note.
pub fn missing_well_numbers(numbers: &WellNumbers, attrs: &MatchedAttributes) -> Option<Discrepancy> {
    if attrs.well_number.is_absent() {
        return None;
    }
    let mut remaining = numbers.clone();
    for canonical in attrs.well_number.values() {
        if !remaining.remove(canonical) {
            return None;
        }
    }
    if remaining.is_empty() {
        return None;
    }
    Some(Discrepancy::MissingWellNumbers(
        remaining.iter().map(String::from).collect(),
    ))
}
