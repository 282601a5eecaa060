//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Metrix.
//! The Metrix project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! # Metrix Table Module
//!
//! This module provides the data structures that flow through Metrix
//! pipelines.
//!
//! ## Design Principles
//!
//! - **Schema-less rows**: a row is a JSON object (`serde_json::Map`) kept in
//!   column insertion order. Rows of one table may carry different columns;
//!   a missing column reads as null.
//! - **Named table sets**: a pipeline run threads one [`MxTableSet`] through
//!   its steps. Keys keep insertion order, so "the first table" is well
//!   defined for presentation.
//! - **Owned state**: a table set is plain owned data. Cloning it yields a
//!   fully independent copy, which is what the pipeline does on entry.
//!
//! ## Usage Example
//!
//! ```rust
//! use metrix::table::{MxTableSet, MxRow};
//! use serde_json::json;
//!
//! let mut tables = MxTableSet::new();
//! tables.insert("direct", vec![json!({"campaign_id": "123", "cost": 1000})
//!     .as_object()
//!     .cloned()
//!     .unwrap()]);
//!
//! let preview = tables.preview("direct").unwrap();
//! assert_eq!(preview.columns, vec!["campaign_id", "cost"]);
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{MxError, Result};

/// A single row: column name to scalar value, in insertion order.
pub type MxRow = Map<String, Value>;

/// An ordered sequence of rows.
pub type MxTable = Vec<MxRow>;

/// Column list of a table: the keys of its first row.
pub fn table_columns(table: &[MxRow]) -> Vec<String> {
    table
        .first()
        .map(|row| row.keys().cloned().collect())
        .unwrap_or_default()
}

/// Mapping from table key to table, threaded through a pipeline run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MxTableSet {
    tables: IndexMap<String, MxTable>,
}

impl MxTableSet {
    /// Creates an empty table set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a table. A replaced key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, table: MxTable) -> Option<MxTable> {
        self.tables.insert(key.into(), table)
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_table(mut self, key: impl Into<String>, table: MxTable) -> Self {
        self.insert(key, table);
        self
    }

    pub fn get(&self, key: &str) -> Option<&MxTable> {
        self.tables.get(key)
    }

    /// Looks up a table, failing with the not-found contract message.
    pub fn require(&self, key: &str) -> Result<&MxTable> {
        self.tables
            .get(key)
            .ok_or_else(|| MxError::not_found(format!("Source '{key}' not found")))
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut MxTable> {
        self.tables.get_mut(key)
    }

    /// Mutable [`require`](Self::require).
    pub fn require_mut(&mut self, key: &str) -> Result<&mut MxTable> {
        self.tables
            .get_mut(key)
            .ok_or_else(|| MxError::not_found(format!("Source '{key}' not found")))
    }

    /// Parses a JSON object of `key -> [row, ...]`.
    pub fn from_json(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Removes a table, preserving the order of the remaining keys.
    pub fn remove(&mut self, key: &str) -> Option<MxTable> {
        self.tables.shift_remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.tables.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.tables.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MxTable)> {
        self.tables.iter()
    }

    pub fn first_key(&self) -> Option<&str> {
        self.tables.keys().next().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Sum of row counts over every table.
    pub fn total_rows(&self) -> usize {
        self.tables.values().map(Vec::len).sum()
    }

    /// Row count per table, in key order.
    pub fn row_counts(&self) -> Vec<(String, usize)> {
        self.tables
            .iter()
            .map(|(key, table)| (key.clone(), table.len()))
            .collect()
    }

    /// Presentation view of one table.
    pub fn preview(&self, key: &str) -> Result<MxTablePreview> {
        Ok(MxTablePreview::from_table(self.require(key)?))
    }

    /// Presentation view of the first table, or an empty preview.
    pub fn preview_first(&self) -> MxTablePreview {
        self.tables
            .values()
            .next()
            .map(|table| MxTablePreview::from_table(table))
            .unwrap_or_default()
    }
}

impl From<IndexMap<String, MxTable>> for MxTableSet {
    fn from(tables: IndexMap<String, MxTable>) -> Self {
        Self { tables }
    }
}

impl FromIterator<(String, MxTable)> for MxTableSet {
    fn from_iter<I: IntoIterator<Item = (String, MxTable)>>(iter: I) -> Self {
        Self {
            tables: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for MxTableSet {
    type Item = (String, MxTable);
    type IntoIter = indexmap::map::IntoIter<String, MxTable>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.into_iter()
    }
}

/// The table handed to the presentation and export layer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MxTablePreview {
    pub columns: Vec<String>,
    pub data: MxTable,
    pub row_count: usize,
}

impl MxTablePreview {
    pub fn from_table(table: &[MxRow]) -> Self {
        Self {
            columns: table_columns(table),
            data: table.to_vec(),
            row_count: table.len(),
        }
    }

    /// Header row followed by one row of cells per data row, in column order.
    ///
    /// Missing and null cells become `""`, numbers are kept, and every other
    /// value is written as its string view.
    pub fn sheet_values(&self) -> Vec<Vec<Value>> {
        let mut values = Vec::with_capacity(self.data.len() + 1);
        values.push(
            self.columns
                .iter()
                .map(|column| Value::String(column.clone()))
                .collect(),
        );
        for row in &self.data {
            values.push(
                self.columns
                    .iter()
                    .map(|column| match row.get(column) {
                        None | Some(Value::Null) => Value::String(String::new()),
                        Some(number @ Value::Number(_)) => number.clone(),
                        Some(other) => Value::String(crate::value::stringify(Some(other))),
                    })
                    .collect(),
            );
        }
        values
    }
}
