//! Lookup request validation and result assembly
//!
//! A lookup request carries a single query parameter, `ids`, holding a
//! comma-separated list of non-negative integers. Validation produces a
//! field-level error map instead of a single message, and resolution turns a
//! validated id list into a per-id result map keyed by id.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use stroke_store::{DatasetStore, RecordView};

/// Name of the only accepted query parameter
pub const IDS_FIELD: &str = "ids";
/// Error for a request without `ids`
pub const MISSING_FIELD_MESSAGE: &str = "Missing data for required field.";
/// Error for any query parameter other than `ids`
pub const UNKNOWN_FIELD_MESSAGE: &str = "Unknown field.";
/// Message attached to every id found in the store
pub const SUCCESS_MESSAGE: &str = "Success!";

/// Field name to error messages, serialized as `{"ids": ["..."]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    /// Errors for a request that omitted the required `field`
    pub fn missing(field: &str) -> Self {
        let mut errors = Self::default();
        errors.add(field, MISSING_FIELD_MESSAGE);
        errors
    }

    /// Append a message under `field`
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Field names with errors, sorted
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{field}: {}", messages.join(" "))?;
            first = false;
        }
        Ok(())
    }
}

/// Parse the comma-separated `ids` value into ids, or one message per bad token.
pub fn parse_ids(raw: &str, max_ids: usize) -> Result<Vec<i64>, Vec<String>> {
    let tokens: Vec<&str> = raw.split(',').map(str::trim).collect();
    if tokens.len() > max_ids {
        return Err(vec![format!("Longer than maximum length {max_ids}.")]);
    }

    let mut ids = Vec::with_capacity(tokens.len());
    let mut messages = Vec::new();
    for (index, token) in tokens.into_iter().enumerate() {
        match token.parse::<i64>() {
            Ok(id) if id >= 0 => ids.push(id),
            Ok(_) => messages.push(format!("Must be a non-negative integer at index {index}: {token:?}.")),
            Err(_) => messages.push(format!("Not a valid integer at index {index}: {token:?}.")),
        }
    }

    if messages.is_empty() { Ok(ids) } else { Err(messages) }
}

/// Validate decoded query parameters against the `{ids: [integer]}` shape.
///
/// When a parameter repeats, its first occurrence is used. Parameters other
/// than `ids` are rejected.
pub fn validate_query(params: &[(String, String)], max_ids: usize) -> Result<Vec<i64>, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let mut raw_ids = None;

    for (key, value) in params {
        if key == IDS_FIELD {
            raw_ids.get_or_insert(value.as_str());
        } else if errors.get(key).is_none() {
            errors.add(key, UNKNOWN_FIELD_MESSAGE);
        }
    }

    let ids = match raw_ids {
        Some(raw) => match parse_ids(raw, max_ids) {
            Ok(ids) => ids,
            Err(messages) => {
                for message in messages {
                    errors.add(IDS_FIELD, message);
                }
                Vec::new()
            }
        },
        None => {
            errors.add(IDS_FIELD, MISSING_FIELD_MESSAGE);
            Vec::new()
        }
    };

    if errors.is_empty() { Ok(ids) } else { Err(errors) }
}

/// Outcome for one requested id: the record's fields, or empty data and a failure message.
#[derive(Debug, Clone, Serialize)]
pub struct LookupOutcome<'a> {
    #[serde(rename = "data", serialize_with = "serialize_data")]
    pub record: Option<RecordView<'a>>,
    pub message: String,
}

fn serialize_data<S: Serializer>(record: &Option<RecordView<'_>>, serializer: S) -> Result<S::Ok, S::Error> {
    match record {
        Some(record) => record.serialize(serializer),
        None => serializer.serialize_map(Some(0))?.end(),
    }
}

impl<'a> LookupOutcome<'a> {
    /// Outcome for `id` given the store's answer for it
    pub fn new(id: i64, record: Option<RecordView<'a>>) -> Self {
        let message = match record {
            Some(_) => SUCCESS_MESSAGE.to_string(),
            None => failure_message(id),
        };
        Self { record, message }
    }

    pub fn is_found(&self) -> bool {
        self.record.is_some()
    }
}

/// Message attached to an id absent from the store
pub fn failure_message(id: i64) -> String {
    format!("Failure - {id} is not valid id!")
}

/// Per-id results keyed by id, in first-requested order.
///
/// Serializes as `{"id": {"<id>": {"data": {...}, "message": "..."}}}`.
#[derive(Debug, Clone, Default)]
pub struct LookupResponse<'a> {
    entries: Vec<(i64, LookupOutcome<'a>)>,
    positions: HashMap<i64, usize>,
}

impl<'a> LookupResponse<'a> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: Vec::with_capacity(capacity), positions: HashMap::with_capacity(capacity) }
    }

    /// Record an outcome; a repeated id replaces the earlier outcome in place.
    pub fn insert(&mut self, id: i64, outcome: LookupOutcome<'a>) {
        match self.positions.get(&id) {
            Some(&pos) => self.entries[pos].1 = outcome,
            None => {
                self.positions.insert(id, self.entries.len());
                self.entries.push((id, outcome));
            }
        }
    }

    pub fn get(&self, id: i64) -> Option<&LookupOutcome<'a>> {
        self.positions.get(&id).map(|&pos| &self.entries[pos].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of ids found in the store
    pub fn found(&self) -> usize {
        self.entries.iter().filter(|(_, outcome)| outcome.is_found()).count()
    }

    /// Number of ids absent from the store
    pub fn missing(&self) -> usize {
        self.len() - self.found()
    }

    /// Distinct ids in first-requested order
    pub fn ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.entries.iter().map(|(id, _)| *id)
    }
}

struct OutcomesById<'r, 'a>(&'r [(i64, LookupOutcome<'a>)]);

impl Serialize for OutcomesById<'_, '_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (id, outcome) in self.0 {
            map.serialize_entry(id, outcome)?;
        }
        map.end()
    }
}

impl Serialize for LookupResponse<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("id", &OutcomesById(&self.entries))?;
        map.end()
    }
}

/// Look up every id in request order.
pub fn resolve<'a>(store: &'a DatasetStore, ids: &[i64]) -> LookupResponse<'a> {
    let mut response = LookupResponse::with_capacity(ids.len());
    for &id in ids {
        response.insert(id, LookupOutcome::new(id, store.lookup(id)));
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;
    use stroke_store::LoadOptions;

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn sample_store() -> DatasetStore {
        DatasetStore::from_reader(
            "id,age,gender\n1,67,Male\n2,45,Female\n5,80,Male\n".as_bytes(),
            &LoadOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_parse_ids_keeps_order_and_duplicates() {
        assert_eq!(parse_ids("3,1,2,1", 10), Ok(vec![3, 1, 2, 1]));
        assert_eq!(parse_ids(" 7 , 8", 10), Ok(vec![7, 8]));
    }

    #[test]
    fn test_parse_ids_reports_each_bad_token() {
        let messages = parse_ids("1,x,-3,", 10).unwrap_err();
        assert_eq!(
            messages,
            vec![
                "Not a valid integer at index 1: \"x\".",
                "Must be a non-negative integer at index 2: \"-3\".",
                "Not a valid integer at index 3: \"\".",
            ]
        );
    }

    #[test]
    fn test_parse_ids_enforces_maximum() {
        assert_eq!(parse_ids("1,2,3", 2), Err(vec!["Longer than maximum length 2.".to_string()]));
    }

    #[test]
    fn test_missing_ids_parameter() {
        let errors = validate_query(&[], 10).unwrap_err();
        assert_eq!(errors, ValidationErrors::missing("ids"));
        assert_eq!(serde_json::to_value(&errors).unwrap(), json!({"ids": [MISSING_FIELD_MESSAGE]}));
    }

    #[test]
    fn test_unknown_parameters_are_rejected() {
        let errors = validate_query(&params(&[("ids", "1"), ("foo", "a"), ("foo", "b")]), 10).unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["foo"]);
        assert_eq!(errors.get("foo"), Some(&[UNKNOWN_FIELD_MESSAGE.to_string()][..]));
    }

    #[test]
    fn test_first_ids_parameter_wins() {
        assert_eq!(validate_query(&params(&[("ids", "1,2"), ("ids", "x")]), 10), Ok(vec![1, 2]));
    }

    #[test]
    fn test_errors_display() {
        let errors = validate_query(&params(&[("ids", "a")]), 10).unwrap_err();
        assert_eq!(errors.to_string(), "ids: Not a valid integer at index 0: \"a\".");
    }

    #[test]
    fn test_resolve_found_and_missing() {
        let store = sample_store();
        let response = resolve(&store, &[1, 2, 9]);

        assert_eq!(response.found(), 2);
        assert_eq!(response.missing(), 1);
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"id": {
                "1": {"data": {"age": 67, "gender": "Male"}, "message": "Success!"},
                "2": {"data": {"age": 45, "gender": "Female"}, "message": "Success!"},
                "9": {"data": {}, "message": "Failure - 9 is not valid id!"}
            }})
        );
    }

    #[test]
    fn test_resolve_keeps_first_request_order() {
        let store = sample_store();
        let response = resolve(&store, &[9, 1, 9]);
        assert_eq!(response.ids().collect::<Vec<_>>(), vec![9, 1]);
        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            r#"{"id":{"9":{"data":{},"message":"Failure - 9 is not valid id!"},"1":{"data":{"age":67,"gender":"Male"},"message":"Success!"}}}"#
        );
    }

    proptest! {
        #[test]
        fn prop_result_content_is_order_independent(ids in proptest::collection::vec(0i64..8, 0..20)) {
            let store = sample_store();
            let mut reversed = ids.clone();
            reversed.reverse();
            let mut sorted = ids.clone();
            sorted.sort_unstable();

            let forward = serde_json::to_value(resolve(&store, &ids)).unwrap();
            prop_assert_eq!(&forward, &serde_json::to_value(resolve(&store, &reversed)).unwrap());
            prop_assert_eq!(&forward, &serde_json::to_value(resolve(&store, &sorted)).unwrap());
        }

        #[test]
        fn prop_one_entry_per_distinct_id(ids in proptest::collection::vec(0i64..8, 1..20)) {
            let store = sample_store();
            let response = resolve(&store, &ids);
            let distinct: std::collections::HashSet<_> = ids.iter().copied().collect();
            prop_assert_eq!(response.len(), distinct.len());
            for id in distinct {
                let outcome = response.get(id).unwrap();
                prop_assert_eq!(outcome.is_found(), store.contains(id));
            }
        }
    }
}
