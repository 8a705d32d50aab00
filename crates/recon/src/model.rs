use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

/// Separator used when several canonical values collapse into one cell.
pub const MULTI_VALUE_SEPARATOR: &str = " | ";

// ---------------------------------------------------------------------------
// Field values
// ---------------------------------------------------------------------------

/// A canonical attribute after collapsing one or more registry rows.
///
/// `Multiple` keeps first-seen order and never holds duplicates or fewer than
/// two values.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldValue {
    #[default]
    Absent,
    Single(String),
    Multiple(Vec<String>),
}

impl FieldValue {
    /// Collapse values into a deduplicated field. Absent and blank values are skipped.
    pub fn collect<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let mut seen: Vec<String> = Vec::new();
        for value in values.into_iter().flatten() {
            let value = value.trim();
            if value.is_empty() || seen.iter().any(|v| v == value) {
                continue;
            }
            seen.push(value.to_string());
        }
        match seen.len() {
            0 => Self::Absent,
            1 => Self::Single(seen.remove(0)),
            _ => Self::Multiple(seen),
        }
    }

    pub fn single(value: impl Into<String>) -> Self {
        Self::collect([Some(value.into().as_str())])
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn is_multiple(&self) -> bool {
        matches!(self, Self::Multiple(_))
    }

    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::Absent => Vec::new(),
            Self::Single(v) => vec![v.as_str()],
            Self::Multiple(vs) => vs.iter().map(String::as_str).collect(),
        }
    }

    /// Serialization form: `" | "`-joined, or `None` when absent.
    pub fn joined(&self) -> Option<String> {
        match self {
            Self::Absent => None,
            Self::Single(v) => Some(v.clone()),
            Self::Multiple(vs) => Some(vs.join(MULTI_VALUE_SEPARATOR)),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.joined() {
            Some(s) => serializer.serialize_str(&s),
            None => serializer.serialize_none(),
        }
    }
}

/// Ordered, deduplicated set of well numbers (first-seen order).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct WellNumbers(Vec<String>);

impl WellNumbers {
    pub fn insert(&mut self, number: &str) {
        if !self.contains(number) {
            self.0.push(number.to_string());
        }
    }

    /// Remove a number; returns false when it was not present.
    pub fn remove(&mut self, number: &str) -> bool {
        match self.0.iter().position(|n| n == number) {
            Some(i) => {
                self.0.remove(i);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, number: &str) -> bool {
        self.0.iter().any(|n| n == number)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Set equality, ignoring order.
    pub fn same_set<'a, I>(&self, other: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut other_set = WellNumbers::default();
        for n in other {
            other_set.insert(n);
        }
        self.len() == other_set.len() && self.iter().all(|n| other_set.contains(n))
    }
}

impl<'a> FromIterator<&'a str> for WellNumbers {
    fn from_iter<T: IntoIterator<Item = &'a str>>(iter: T) -> Self {
        let mut set = WellNumbers::default();
        for n in iter {
            set.insert(n);
        }
        set
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One analyst-supplied row.
#[derive(Debug, Clone, Default)]
pub struct InputRecord {
    /// Original row position; the only identity used when regrouping matches.
    pub row: usize,
    pub property_text: Option<String>,
    pub operator_name: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
    /// Already normalized (`"Permit #12345"` -> `"12345"`).
    pub registry_number: Option<String>,
}

/// One row of the canonical well registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalWell {
    pub well_id: String,
    pub api10: Option<String>,
    pub api14: Option<String>,
    pub registry_number: Option<String>,
    pub well_name: Option<String>,
    pub well_number: Option<String>,
    pub lease_name: Option<String>,
    pub operator_name: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
    pub status: Option<String>,
}

impl CanonicalWell {
    /// `"<well_name> <well_number>"`, absent unless both parts are present.
    pub fn well_name_number(&self) -> Option<String> {
        match (&self.well_name, &self.well_number) {
            (Some(name), Some(number)) => Some(format!("{name} {number}")),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStage {
    /// Composite (well name + number) key plus registry number.
    Precise,
    /// Registry number alone.
    Coarse,
}

impl fmt::Display for MatchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Precise => write!(f, "precise"),
            Self::Coarse => write!(f, "coarse"),
        }
    }
}

/// Canonical attributes collapsed over every matched registry row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchedAttributes {
    pub well_id: FieldValue,
    pub api10: FieldValue,
    pub api14: FieldValue,
    pub status: FieldValue,
    pub well_name: FieldValue,
    pub well_number: FieldValue,
    pub lease_name: FieldValue,
    pub operator_name: FieldValue,
    pub county: FieldValue,
    pub state: FieldValue,
    pub well_name_number: FieldValue,
}

impl MatchedAttributes {
    pub fn collapse<'a, I>(wells: I) -> Self
    where
        I: IntoIterator<Item = &'a CanonicalWell> + Clone,
    {
        let pick = |f: fn(&CanonicalWell) -> Option<&str>| {
            FieldValue::collect(wells.clone().into_iter().map(f))
        };
        let name_numbers: Vec<Option<String>> =
            wells.clone().into_iter().map(CanonicalWell::well_name_number).collect();

        Self {
            well_id: pick(|w| Some(w.well_id.as_str())),
            api10: pick(|w| w.api10.as_deref()),
            api14: pick(|w| w.api14.as_deref()),
            status: pick(|w| w.status.as_deref()),
            well_name: pick(|w| w.well_name.as_deref()),
            well_number: pick(|w| w.well_number.as_deref()),
            lease_name: pick(|w| w.lease_name.as_deref()),
            operator_name: pick(|w| w.operator_name.as_deref()),
            county: pick(|w| w.county.as_deref()),
            state: pick(|w| w.state.as_deref()),
            well_name_number: FieldValue::collect(name_numbers.iter().map(|v| v.as_deref())),
        }
    }

    /// True when any field collapsed to more than one distinct value.
    pub fn is_ambiguous(&self) -> bool {
        [
            &self.well_id,
            &self.api10,
            &self.api14,
            &self.status,
            &self.well_name,
            &self.well_number,
            &self.lease_name,
            &self.operator_name,
            &self.county,
            &self.state,
        ]
        .iter()
        .any(|f| f.is_multiple())
    }
}

// ---------------------------------------------------------------------------
// Notes
// ---------------------------------------------------------------------------

/// One reconciliation finding on a matched record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discrepancy {
    EmptyOperator,
    OperatorClose,
    OperatorNotMatched,
    FoundInCounty(String),
    FoundInState(String),
    MissingFields(Vec<&'static str>),
    WellNumberMismatch,
    MissingWellNumbers(Vec<String>),
}

impl Discrepancy {
    /// Stable key used for summary counts.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyOperator => "empty_operator",
            Self::OperatorClose => "operator_close",
            Self::OperatorNotMatched => "operator_not_matched",
            Self::FoundInCounty(_) => "county_mismatch",
            Self::FoundInState(_) => "state_mismatch",
            Self::MissingFields(_) => "missing_fields",
            Self::WellNumberMismatch => "well_number_mismatch",
            Self::MissingWellNumbers(_) => "missing_well_numbers",
        }
    }
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyOperator => write!(f, "Empty operator"),
            Self::OperatorClose => write!(f, "Operator name CLOSE match"),
            Self::OperatorNotMatched => write!(f, "Operator name NOT matched"),
            Self::FoundInCounty(rest) => write!(f, "Found in {rest} county"),
            Self::FoundInState(rest) => write!(f, "Found in {rest} state"),
            Self::MissingFields(fields) => write!(f, "Missing Fields: {}", fields.join(", ")),
            Self::WellNumberMismatch => write!(f, "Well Number Mismatch"),
            Self::MissingWellNumbers(numbers) => {
                write!(f, "Missing well number: {}", numbers.join(", "))
            }
        }
    }
}

impl Serialize for Discrepancy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

pub const NOTE_MATCHED: &str = "Well matched in DI";
pub const NOTE_NO_MATCH: &str = "No match found in DB Browser";

/// The single terminal note string of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalNote {
    Discrepancies(String),
    Matched,
    NoMatch,
}

impl fmt::Display for FinalNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discrepancies(joined) => f.write_str(joined),
            Self::Matched => f.write_str(NOTE_MATCHED),
            Self::NoMatch => f.write_str(NOTE_NO_MATCH),
        }
    }
}

impl Serialize for FinalNote {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Tokens extracted from `property_text`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PropertyTokens {
    pub well_name: Option<String>,
    /// Numbers extracted with the `#`-anchored rule (precise stage).
    pub well_numbers: WellNumbers,
    /// Numbers extracted with recursion after `#` (coarse stage).
    pub recursive_well_numbers: WellNumbers,
}

/// Terminal artifact for one input record.
#[derive(Debug, Clone, Serialize)]
pub struct MatchResult {
    pub row: usize,
    pub registry_number: Option<String>,
    pub tokens: PropertyTokens,
    pub stage: Option<MatchStage>,
    pub canonical: Option<MatchedAttributes>,
    pub discrepancies: Vec<Discrepancy>,
    pub notes: FinalNote,
}

impl MatchResult {
    pub fn is_matched(&self) -> bool {
        self.stage.is_some()
    }

    pub fn is_ambiguous(&self) -> bool {
        self.canonical.as_ref().is_some_and(MatchedAttributes::is_ambiguous)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconSummary {
    pub total_records: usize,
    pub precise_matches: usize,
    pub coarse_matches: usize,
    pub unmatched: usize,
    pub ambiguous: usize,
    pub clean_matches: usize,
    pub discrepancy_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub engine_version: String,
    pub run_at: String,
    pub registry_wells: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub results: Vec<MatchResult>,
}
