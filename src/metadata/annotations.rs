use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use super::{Dtype, MetadataError};

/// Column naming the replicate each annotation row belongs to
pub const REPLICATE_COLUMN: &str = "replicate";

/// Sample annotations from one source, keyed by replicate name.
///
/// Values are kept as raw text; typing happens per key through
/// [`SampleAnnotations::inferred_types`] and is reconciled with other sources by
/// [`consolidate`](super::consolidate).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleAnnotations {
    rows: BTreeMap<String, BTreeMap<String, String>>,
}

impl SampleAnnotations {
    /// Create an empty annotation set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one raw value, replacing any previous value for the same key.
    pub fn insert(&mut self, replicate: &str, key: &str, value: &str) {
        self.rows
            .entry(replicate.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
    }

    /// Parse annotations from a file.
    ///
    /// `.json` files are read as JSON, `.csv` files as comma separated and
    /// everything else as tab separated.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, MetadataError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        let reader = BufReader::new(File::open(path)?);
        match extension.as_deref() {
            Some("json") => Self::from_json_reader(reader),
            Some("csv") => Self::from_reader(reader, b','),
            _ => Self::from_reader(reader, b'\t'),
        }
    }

    /// Parse a delimited table whose `replicate` column names the replicate and
    /// whose remaining columns are annotation keys.
    pub fn from_reader<R: BufRead>(reader: R, delimiter: u8) -> Result<Self, MetadataError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|s| s.trim().to_string())
            .collect();

        let replicate_idx = headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(REPLICATE_COLUMN))
            .ok_or_else(|| MetadataError::MissingColumn(REPLICATE_COLUMN.to_string()))?;

        if let Some(i) = headers.iter().position(|h| h.is_empty()) {
            return Err(MetadataError::InvalidFormat(format!(
                "column {} has an empty annotation key",
                i + 1
            )));
        }

        let mut annotations = Self::new();
        for record in csv_reader.records() {
            let record = record?;
            let replicate = record.get(replicate_idx).unwrap_or("").trim();
            if replicate.is_empty() {
                continue;
            }
            if annotations.rows.contains_key(replicate) {
                return Err(MetadataError::DuplicateReplicate(replicate.to_string()));
            }

            let values = headers
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != replicate_idx)
                .map(|(i, key)| (key.clone(), record.get(i).unwrap_or("").trim().to_string()))
                .collect();
            annotations.rows.insert(replicate.to_string(), values);
        }

        Ok(annotations)
    }

    /// Parse JSON of the form `{"replicate": {"key": value, ...}, ...}`.
    pub fn from_json(json: &str) -> Result<Self, MetadataError> {
        Self::from_value(serde_json::from_str(json)?)
    }

    fn from_json_reader<R: Read>(reader: R) -> Result<Self, MetadataError> {
        Self::from_value(serde_json::from_reader(reader)?)
    }

    fn from_value(value: Value) -> Result<Self, MetadataError> {
        let Value::Object(replicates) = value else {
            return Err(MetadataError::InvalidFormat(
                "expected an object keyed by replicate".to_string(),
            ));
        };

        let mut annotations = Self::new();
        for (replicate, entries) in replicates {
            let Value::Object(entries) = entries else {
                return Err(MetadataError::InvalidFormat(format!(
                    "annotations for '{replicate}' are not an object"
                )));
            };
            for (key, value) in entries {
                let raw = match value {
                    Value::Null => String::new(),
                    Value::Bool(b) => b.to_string(),
                    Value::Number(n) => n.to_string(),
                    Value::String(s) => s,
                    Value::Array(_) | Value::Object(_) => {
                        return Err(MetadataError::InvalidFormat(format!(
                            "value of '{key}' for '{replicate}' is not a scalar"
                        )))
                    }
                };
                annotations.insert(&replicate, &key, &raw);
            }
        }
        Ok(annotations)
    }

    /// Number of annotated replicates
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when no replicate is annotated
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Annotated replicate names
    pub fn replicates(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    /// Raw values for one replicate
    pub fn values(&self, replicate: &str) -> Option<&BTreeMap<String, String>> {
        self.rows.get(replicate)
    }

    /// All (replicate, key, raw value) triples
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.rows.iter().flat_map(|(replicate, values)| {
            values
                .iter()
                .map(move |(key, value)| (replicate.as_str(), key.as_str(), value.as_str()))
        })
    }

    /// Type guess for every key: the lattice maximum over all of its values.
    pub fn inferred_types(&self) -> BTreeMap<String, Dtype> {
        let mut types: BTreeMap<String, Dtype> = BTreeMap::new();
        for (_, key, value) in self.iter() {
            let dtype = Dtype::infer(value);
            types
                .entry(key.to_string())
                .and_modify(|current| *current = (*current).max(dtype))
                .or_insert(dtype);
        }
        types
    }
}
