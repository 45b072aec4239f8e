//! Column layout and type inference for loaded datasets.

use serde::Serialize;
use std::collections::HashSet;
use stroke_types::ColumnType;

/// Cell contents treated as a missing value.
///
/// Matches the default NA markers of common dataframe CSV readers, so that a
/// file exported by one of them round-trips without turning `N/A` into text.
pub const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Returns `true` if the (already trimmed) cell is a missing-value marker.
pub fn is_missing(cell: &str) -> bool {
    MISSING_MARKERS.contains(&cell)
}

/// A named non-id column with its inferred type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ColumnType,
}

/// Shape of every record in a store: the id column plus the ordered data columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    pub id_column: String,
    pub fields: Vec<Column>,
}

impl Schema {
    /// Number of non-id columns
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Position of a non-id column by name
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|column| column.name == name)
    }
}

/// Infer one column type from its cells, ignoring missing markers.
///
/// Missing cells cannot be held by an integer column, so a column with gaps is
/// widened to float, and a column with no present cell is typed as float. This
/// is how dataframe readers type NaN-bearing columns.
pub fn infer_column<'a>(cells: impl IntoIterator<Item = &'a str>) -> ColumnType {
    let mut has_missing = false;
    let kind = cells
        .into_iter()
        .filter(|cell| {
            let missing = is_missing(cell);
            has_missing |= missing;
            !missing
        })
        .map(ColumnType::infer)
        .reduce(ColumnType::widen)
        .unwrap_or(ColumnType::Float);

    if has_missing { kind.widen(ColumnType::Float) } else { kind }
}

/// Make header names unique by suffixing repeats with `.1`, `.2`, ...
pub fn dedupe_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for name in names {
        let mut candidate = name.to_string();
        let mut suffix = 0;
        while !seen.insert(candidate.clone()) {
            suffix += 1;
            candidate = format!("{name}.{suffix}");
        }
        out.push(candidate);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_markers_are_ignored_during_inference() {
        assert_eq!(infer_column(["36.6", "N/A", "28.1"]), ColumnType::Float);
        assert_eq!(infer_column(["Male", "NaN"]), ColumnType::String);
    }

    #[test]
    fn integer_column_with_gaps_widens_to_float() {
        assert_eq!(infer_column(["1", "0"]), ColumnType::Integer);
        assert_eq!(infer_column(["1", "", "0"]), ColumnType::Float);
        assert_eq!(infer_column(["3", "N/A"]), ColumnType::Float);
    }

    #[test]
    fn mixed_numeric_column_widens_to_float() {
        assert_eq!(infer_column(["67", "0.08", "45"]), ColumnType::Float);
    }

    #[test]
    fn any_text_makes_column_string() {
        assert_eq!(infer_column(["1", "2", "Unknown"]), ColumnType::String);
    }

    #[test]
    fn all_missing_column_is_float() {
        assert_eq!(infer_column(["", "NA", "null"]), ColumnType::Float);
    }

    #[test]
    fn duplicate_header_names_get_suffixes() {
        assert_eq!(
            dedupe_names(["id", "age", "age", "age"]),
            vec!["id", "age", "age.1", "age.2"]
        );
    }
}
