use crate::error::{LoadError, LoadResult};
use crate::schema::{self, Column, Schema};
use ahash::AHashMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use stroke_types::FieldValue;
use tracing::{debug, info, warn};

/// Options controlling how a delimited file is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Field delimiter byte
    pub delimiter: u8,
    /// Name of the id column; the first header column when `None`
    pub id_column: Option<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { delimiter: b',', id_column: None }
    }
}

/// One dataset row: its id plus the non-id values in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: i64,
    pub values: Vec<FieldValue>,
}

/// Borrowed view of a record together with the schema that names its values.
#[derive(Debug, Clone, Copy)]
pub struct RecordView<'a> {
    schema: &'a Schema,
    record: &'a Record,
}

impl<'a> RecordView<'a> {
    /// Value of a non-id column by name
    pub fn get(&self, name: &str) -> Option<&'a FieldValue> {
        self.schema.position(name).and_then(|idx| self.record.values.get(idx))
    }

    /// `(column name, value)` pairs in original column order
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a FieldValue)> + 'a {
        self.schema
            .fields
            .iter()
            .map(|column| column.name.as_str())
            .zip(self.record.values.iter())
    }
}

/// Serializes as a JSON object keyed by column name, preserving column order.
impl Serialize for RecordView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.record.values.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Immutable in-memory table indexed by record id.
///
/// Built once from a delimited file and never mutated afterwards, so a single
/// instance can be shared across request handlers without locking.
///
/// # Duplicate ids
/// Every row is kept in [`DatasetStore::records`], but the index points at the
/// last row loaded for each id; that is the row [`DatasetStore::lookup`] returns.
#[derive(Debug)]
pub struct DatasetStore {
    schema: Schema,
    records: Vec<Record>,
    index: AHashMap<i64, usize>,
}

impl DatasetStore {
    /// Load a dataset file from disk.
    ///
    /// A path that does not exist is [`LoadError::FileNotFound`]; one that
    /// cannot be opened, or is not a regular file, is [`LoadError::Io`].
    pub fn load(path: impl AsRef<Path>, options: &LoadOptions) -> LoadResult<Self> {
        let path = path.as_ref();
        let io_error = |source: io::Error| LoadError::Io { path: path.to_path_buf(), source };

        let file = File::open(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => LoadError::FileNotFound { path: path.to_path_buf() },
            _ => io_error(source),
        })?;
        if !file.metadata().map_err(io_error)?.is_file() {
            return Err(io_error(io::Error::new(io::ErrorKind::InvalidInput, "not a regular file")));
        }

        let store = Self::from_reader(file, options)?;

        info!(
            path = %path.display(),
            rows = store.len(),
            unique_ids = store.unique_ids(),
            fields = store.schema.field_count(),
            id_column = %store.schema.id_column,
            "Dataset loaded"
        );
        Ok(store)
    }

    /// Build a store from any reader producing delimited text with a header row.
    pub fn from_reader<R: Read>(reader: R, options: &LoadOptions) -> LoadResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        if headers.is_empty() || headers.iter().all(str::is_empty) {
            return Err(LoadError::EmptyHeader);
        }
        let names = schema::dedupe_names(headers.iter());

        let id_idx = match &options.id_column {
            Some(column) => names
                .iter()
                .position(|name| name == column)
                .ok_or_else(|| LoadError::MissingIdColumn { column: column.clone() })?,
            None => 0,
        };

        let mut rows = Vec::new();
        for result in csv_reader.records() {
            let row = result?;
            let line = row.position().map_or(0, |pos| pos.line());
            let raw_id = row.get(id_idx).unwrap_or_default();
            let id = raw_id
                .parse::<i64>()
                .map_err(|_| LoadError::InvalidId { line, value: raw_id.to_string() })?;
            rows.push((id, row));
        }

        let data_columns: Vec<usize> = (0..names.len()).filter(|&idx| idx != id_idx).collect();
        let fields: Vec<Column> = data_columns
            .iter()
            .map(|&idx| Column {
                name: names[idx].clone(),
                kind: schema::infer_column(rows.iter().map(|(_, row)| row.get(idx).unwrap_or_default())),
            })
            .collect();

        let records: Vec<Record> = rows
            .into_iter()
            .map(|(id, row)| {
                let values = data_columns
                    .iter()
                    .zip(&fields)
                    .map(|(&idx, column)| {
                        let cell = row.get(idx).unwrap_or_default();
                        if schema::is_missing(cell) {
                            FieldValue::Null
                        } else {
                            column.kind.convert(cell)
                        }
                    })
                    .collect();
                Record { id, values }
            })
            .collect();

        let mut index = AHashMap::with_capacity(records.len());
        for (pos, record) in records.iter().enumerate() {
            index.insert(record.id, pos);
        }

        let shadowed = records.len() - index.len();
        if shadowed > 0 {
            warn!(shadowed_rows = shadowed, "Duplicate ids in dataset; last row per id wins");
        }

        let schema = Schema { id_column: names[id_idx].clone(), fields };
        debug!(?schema, "Inferred dataset schema");

        Ok(Self { schema, records, index })
    }

    /// O(1) lookup of the record for `id`; `None` when the id is absent.
    pub fn lookup(&self, id: i64) -> Option<RecordView<'_>> {
        self.index
            .get(&id)
            .map(|&pos| RecordView { schema: &self.schema, record: &self.records[pos] })
    }

    pub fn contains(&self, id: i64) -> bool {
        self.index.contains_key(&id)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Number of rows loaded, duplicates included
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of distinct ids in the index
    pub fn unique_ids(&self) -> usize {
        self.index.len()
    }

    /// All rows in file order
    pub fn records(&self) -> impl Iterator<Item = RecordView<'_>> {
        self.records.iter().map(|record| RecordView { schema: &self.schema, record })
    }
}
