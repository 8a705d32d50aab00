use crate::model::{Discrepancy, FinalNote};

/// Separator between discrepancy notes in the final string.
pub const NOTE_SEPARATOR: &str = ", ";

/// Reduce a record's notes to its single terminal note. Total and idempotent.
pub fn synthesize(notes: &[Discrepancy], matched: bool) -> FinalNote {
    if !notes.is_empty() {
        let joined = notes
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(NOTE_SEPARATOR);
        FinalNote::Discrepancies(joined)
    } else if matched {
        FinalNote::Matched
    } else {
        FinalNote::NoMatch
    }
}
