//! Row-indexed tabular data, used both for query results and write payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{escape_measurement, escape_tag_key, escape_tag_value, FieldValue, FluxTable};
use crate::{Error, Result};

/// A named, typed column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Cell values, one per index entry
    pub values: Vec<FieldValue>,
}

/// A two-dimensional labeled frame: a time index plus named columns.
///
/// Every column holds exactly one value per index entry. Column order is
/// insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataFrame {
    index: Vec<DateTime<Utc>>,
    columns: Vec<Column>,
}

impl DataFrame {
    /// Create an empty frame over the given time index
    pub fn new(index: Vec<DateTime<Utc>>) -> Self {
        Self {
            index,
            columns: Vec::new(),
        }
    }

    /// Number of rows
    pub fn num_rows(&self) -> usize {
        self.index.len()
    }

    /// Number of columns
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// True when the frame has no rows
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// The time index
    pub fn index(&self) -> &[DateTime<Utc>] {
        &self.index
    }

    /// All columns in insertion order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// Append a column. The value count must match the index length and the
    /// name must not already be taken.
    pub fn add_column(&mut self, name: impl Into<String>, values: Vec<FieldValue>) -> Result<()> {
        let name = name.into();
        if self.column(&name).is_some() {
            return Err(Error::Frame(format!("column {name:?} already exists")));
        }
        if values.len() != self.index.len() {
            return Err(Error::Frame(format!(
                "column {:?} has {} values but the frame has {} rows",
                name,
                values.len(),
                self.index.len()
            )));
        }
        self.columns.push(Column { name, values });
        Ok(())
    }

    /// Builder-style variant of [`add_column`](Self::add_column)
    pub fn with_column(
        mut self,
        name: impl Into<String>,
        values: Vec<FieldValue>,
    ) -> Result<Self> {
        self.add_column(name, values)?;
        Ok(self)
    }

    /// Append a constant text column, broadcasting one value over every row
    pub fn add_tag_column(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<()> {
        let value = value.into();
        let values = vec![FieldValue::Text(value); self.index.len()];
        self.add_column(name, values)
    }

    /// Produce an enriched copy of the frame plus the combined tag-column
    /// list. Each `(name, value)` pair in `additional_tags` appends `name` to
    /// a private copy of `tag_columns` and broadcasts `value` as a new
    /// constant column. The inputs are left untouched.
    pub fn with_additional_tags(
        &self,
        tag_columns: &[String],
        additional_tags: &[(String, String)],
    ) -> Result<(DataFrame, Vec<String>)> {
        let mut enriched = self.clone();
        let mut combined = tag_columns.to_vec();

        for (name, value) in additional_tags {
            combined.push(name.clone());
            enriched.add_tag_column(name.clone(), value.clone())?;
        }

        Ok((enriched, combined))
    }

    /// Encode every row as line protocol. Columns named in `tag_columns`
    /// become tags; all remaining columns become fields. At least one field
    /// column is required.
    pub fn to_line_protocol(&self, measurement: &str, tag_columns: &[String]) -> Result<String> {
        let mut tag_refs = Vec::with_capacity(tag_columns.len());
        for name in tag_columns {
            match self.column(name) {
                Some(column) => tag_refs.push(column),
                None => {
                    return Err(Error::Frame(format!(
                        "tag column {name:?} is not present in the frame"
                    )))
                }
            }
        }

        let field_refs: Vec<&Column> = self
            .columns
            .iter()
            .filter(|column| !tag_columns.contains(&column.name))
            .collect();
        if field_refs.is_empty() {
            return Err(Error::LineProtocol(
                "frame has no field columns to write".to_string(),
            ));
        }

        let mut lines = Vec::with_capacity(self.index.len());
        for (row, timestamp) in self.index.iter().enumerate() {
            let mut line = escape_measurement(measurement);

            for column in &tag_refs {
                line.push(',');
                line.push_str(&escape_tag_key(&column.name));
                line.push('=');
                line.push_str(&escape_tag_value(&column.values[row].as_tag_text()));
            }

            line.push(' ');
            for (position, column) in field_refs.iter().enumerate() {
                if position > 0 {
                    line.push(',');
                }
                line.push_str(&escape_tag_key(&column.name));
                line.push('=');
                line.push_str(&column.values[row].to_line_protocol());
            }

            let nanos = timestamp
                .timestamp_nanos_opt()
                .unwrap_or(timestamp.timestamp() * 1_000_000_000);
            line.push(' ');
            line.push_str(&nanos.to_string());

            lines.push(line);
        }

        Ok(lines.join("\n"))
    }

    /// Materialize raw query tables as a frame: the index comes from record
    /// times, `_value` becomes a float column (NaN for empty windows), and
    /// tag columns follow in first-seen order.
    pub fn from_tables(tables: &[FluxTable]) -> Self {
        let mut index = Vec::new();
        let mut values = Vec::new();
        let mut tag_names: Vec<String> = Vec::new();
        let mut rows: Vec<std::collections::HashMap<String, String>> = Vec::new();

        for table in tables {
            for record in &table.records {
                let Some(time) = record.time else { continue };
                index.push(time);
                values.push(FieldValue::Float(record.value.unwrap_or(f64::NAN)));

                // Sorted per record so the column order is deterministic
                let mut keys: Vec<&String> = record.tags.keys().collect();
                keys.sort();
                for key in keys {
                    if !tag_names.iter().any(|name| name == key) {
                        tag_names.push(key.clone());
                    }
                }
                rows.push(record.tags.clone());
            }
        }

        let mut columns = vec![Column {
            name: "_value".to_string(),
            values,
        }];
        for name in &tag_names {
            let cells = rows
                .iter()
                .map(|tags| FieldValue::Text(tags.get(name).cloned().unwrap_or_default()))
                .collect();
            columns.push(Column {
                name: name.clone(),
                values: cells,
            });
        }

        Self { index, columns }
    }
}
