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

use std::cmp::Ordering;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{MxError, Result};
use crate::operator::MxOperator;
use crate::operators::{config_object, missing, required_str};
use crate::table::{MxRow, MxTable, MxTableSet};
use crate::value::{float_value, total_cmp, MxKey};

/// Aggregation applied to one column of each group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MxAggregation {
    Sum,
    Avg,
    Count,
    Min,
    Max,
    First,
    Last,
}

impl FromStr for MxAggregation {
    type Err = MxError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "sum" => MxAggregation::Sum,
            "avg" => MxAggregation::Avg,
            "count" => MxAggregation::Count,
            "min" => MxAggregation::Min,
            "max" => MxAggregation::Max,
            "first" => MxAggregation::First,
            "last" => MxAggregation::Last,
            other => {
                return Err(MxError::config(format!(
                    "Unknown aggregation function: {other}"
                )))
            }
        })
    }
}

impl MxAggregation {
    /// Aggregates the non-null values of `column` within one group.
    pub fn aggregate(&self, column: &str, values: &[&Value]) -> Result<Value> {
        match self {
            MxAggregation::Count => Ok(Value::from(values.len())),
            MxAggregation::First => Ok(values.first().map_or(Value::Null, |v| (*v).clone())),
            MxAggregation::Last => Ok(values.last().map_or(Value::Null, |v| (*v).clone())),
            MxAggregation::Sum => sum(column, values),
            MxAggregation::Avg => {
                if values.is_empty() {
                    return Ok(Value::from(0));
                }
                let total = sum(column, values)?.as_f64().unwrap_or(0.0);
                Ok(float_value(total / values.len() as f64))
            }
            MxAggregation::Min => extreme(column, values, Ordering::Less),
            MxAggregation::Max => extreme(column, values, Ordering::Greater),
        }
    }
}

fn sum(column: &str, values: &[&Value]) -> Result<Value> {
    let mut int_total: Option<i64> = Some(0);
    let mut float_total = 0.0;
    for value in values {
        // booleans count as 1 and 0
        let (int, float) = match value {
            Value::Number(n) => (n.as_i64(), n.as_f64().unwrap_or(0.0)),
            Value::Bool(b) => (Some(i64::from(*b)), f64::from(u8::from(*b))),
            _ => {
                return Err(MxError::value(format!(
                    "cannot sum non-numeric value {value} in column '{column}'"
                )))
            }
        };
        int_total = match (int_total, int) {
            (Some(total), Some(i)) => total.checked_add(i),
            _ => None,
        };
        float_total += float;
    }
    Ok(match int_total {
        Some(total) => Value::from(total),
        None => float_value(float_total),
    })
}

fn extreme(column: &str, values: &[&Value], wanted: Ordering) -> Result<Value> {
    let Some((first, rest)) = values.split_first() else {
        return Ok(Value::from(0));
    };
    let mut best = *first;
    for value in rest {
        let comparable = matches!(
            (best, value),
            (Value::Number(_), Value::Number(_))
                | (Value::String(_), Value::String(_))
                | (Value::Bool(_), Value::Bool(_))
        );
        if !comparable {
            return Err(MxError::value(format!(
                "cannot compare {best} and {value} in column '{column}'"
            )));
        }
        if total_cmp(value, best) == wanted {
            best = *value;
        }
    }
    Ok(best.clone())
}

/// Partitions rows by the tuple of `columns` and aggregates each group.
///
/// Groups are emitted in first-seen order. Each output row holds the
/// grouping columns followed by one field per aggregation.
#[derive(Debug)]
pub struct MxGroupBy {
    source: String,
    columns: Vec<String>,
    aggregations: Vec<(String, MxAggregation)>,
}

impl MxGroupBy {
    pub fn new(source: String, columns: Vec<String>, aggregations: Vec<(String, MxAggregation)>) -> Self {
        Self {
            source,
            columns,
            aggregations,
        }
    }

    fn group<'a>(&self, table: &'a [MxRow]) -> IndexMap<Vec<MxKey>, (Vec<Value>, Vec<&'a MxRow>)> {
        let mut groups: IndexMap<Vec<MxKey>, (Vec<Value>, Vec<&'a MxRow>)> = IndexMap::new();
        for row in table {
            let cells: Vec<Option<&Value>> = self.columns.iter().map(|c| row.get(c)).collect();
            let key = cells.iter().map(|cell| MxKey::from_cell(*cell)).collect();
            groups
                .entry(key)
                .or_insert_with(|| {
                    let values = cells
                        .iter()
                        .map(|cell| cell.cloned().unwrap_or_else(|| Value::String(String::new())))
                        .collect();
                    (values, Vec::new())
                })
                .1
                .push(row);
        }
        groups
    }
}

impl MxOperator for MxGroupBy {
    fn name(&self) -> &'static str {
        "group_by"
    }

    fn apply(&self, mut tables: MxTableSet) -> Result<MxTableSet> {
        let table = tables.require(&self.source)?;
        let mut result: MxTable = Vec::new();

        for (key_values, rows) in self.group(table).into_values() {
            let mut out = MxRow::new();
            for (column, value) in self.columns.iter().zip(key_values) {
                out.insert(column.clone(), value);
            }
            for (column, aggregation) in &self.aggregations {
                let values: Vec<&Value> = rows
                    .iter()
                    .filter_map(|row| row.get(column))
                    .filter(|value| !value.is_null())
                    .collect();
                out.insert(column.clone(), aggregation.aggregate(column, &values)?);
            }
            result.push(out);
        }

        tables.insert(self.source.clone(), result);
        Ok(tables)
    }
}

pub fn group_by_factory(config: &Value) -> Result<Box<dyn MxOperator + Send + Sync>> {
    let obj = config_object(config, "group_by")?;

    let columns: Vec<String> = obj
        .get("columns")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| MxError::config("group_by columns must be strings"))
                })
                .collect::<Result<Vec<_>>>()
        })
        .transpose()?
        .unwrap_or_default();

    let Some(source) = required_str(obj, "source").filter(|_| !columns.is_empty()) else {
        return Err(missing("group_by", &["source", "columns"]));
    };

    let aggregations = match obj.get("aggregations") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Object(map)) => map
            .iter()
            .map(|(column, function)| {
                let name = function.as_str().ok_or_else(|| {
                    MxError::config(format!("aggregation for '{column}' must be a string"))
                })?;
                Ok((column.clone(), name.parse::<MxAggregation>()?))
            })
            .collect::<Result<Vec<_>>>()?,
        Some(_) => return Err(MxError::config("group_by 'aggregations' must be an object")),
    };

    Ok(Box::new(MxGroupBy::new(source, columns, aggregations)))
}
