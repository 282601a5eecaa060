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

//! # Metrix Value Semantics
//!
//! Rows are schema-less: a column may be missing, null, or hold any scalar.
//! The helpers here pin down how operators read such cells.
//!
//! - [`stringify`]: string view used by extract, the string filters and
//!   exports. Missing and null both read as the empty string.
//! - [`loose_eq`]: equality for the `eq`/`ne` filters, numerically aware.
//! - [`relational_cmp`]: ordering for `gt`/`lt`/`gte`/`lte`. Null never
//!   compares; two numbers compare numerically; any other pair compares
//!   by their string views.
//! - [`total_cmp`]: total order used by sort and min/max.
//! - [`MxKey`]: exact, hashable key for grouping and joins.
//! - [`coerce_number`]: numeric reading used by formulas.

use std::cmp::Ordering;

use serde_json::{Number, Value};

use crate::errors::{MxError, Result};

/// Returns the string view of a cell.
pub fn stringify(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
    }
}

/// True for missing cells, nulls and empty strings.
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        _ => false,
    }
}

const TWO_POW_64: f64 = 18_446_744_073_709_551_616.0;

fn integer_of(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

/// Exact comparison of an integer with a finite float.
fn compare_int_float(int: i128, float: f64) -> Ordering {
    let floor = float.floor();
    if floor >= TWO_POW_64 {
        return Ordering::Less;
    }
    if floor < -TWO_POW_64 {
        return Ordering::Greater;
    }
    match int.cmp(&(floor as i128)) {
        Ordering::Equal if float > floor => Ordering::Less,
        other => other,
    }
}

/// Orders two JSON numbers exactly, whatever mix of integers and floats.
pub fn compare_numbers(a: &Number, b: &Number) -> Ordering {
    match (integer_of(a), integer_of(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(x), None) => compare_int_float(x, b.as_f64().unwrap_or(0.0)),
        (None, Some(y)) => compare_int_float(y, a.as_f64().unwrap_or(0.0)).reverse(),
        (None, None) => {
            let x = a.as_f64().unwrap_or(0.0);
            let y = b.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
    }
}

/// Equality where `1` and `1.0` are the same number. A missing cell equals null.
pub fn loose_eq(cell: Option<&Value>, target: &Value) -> bool {
    let cell = cell.unwrap_or(&Value::Null);
    match (cell, target) {
        (Value::Number(a), Value::Number(b)) => compare_numbers(a, b) == Ordering::Equal,
        _ => cell == target,
    }
}

/// Ordering for relational filters. `None` means the pair is not comparable.
pub fn relational_cmp(cell: Option<&Value>, target: &Value) -> Option<Ordering> {
    let cell = cell.unwrap_or(&Value::Null);
    match (cell, target) {
        (Value::Null, _) | (_, Value::Null) => None,
        (Value::Number(a), Value::Number(b)) => Some(compare_numbers(a, b)),
        _ => Some(stringify(Some(cell)).cmp(&stringify(Some(target)))),
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order over cells: null < bool < number < string < array < object.
pub fn total_cmp(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => compare_numbers(x, y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(_), Value::Array(_)) | (Value::Object(_), Value::Object(_)) => {
            a.to_string().cmp(&b.to_string())
        }
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Hashable key with exact-match semantics: `1` and `1.0` are different keys.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum MxKey {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(u64),
    Str(String),
    Json(String),
}

impl MxKey {
    /// Builds the key of a single value.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => MxKey::Null,
            Value::Bool(b) => MxKey::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    MxKey::Int(i)
                } else if let Some(u) = n.as_u64() {
                    MxKey::UInt(u)
                } else {
                    let f = n.as_f64().unwrap_or(0.0);
                    // -0.0 and 0.0 are the same key
                    let f = if f == 0.0 { 0.0 } else { f };
                    MxKey::Float(f.to_bits())
                }
            }
            Value::String(s) => MxKey::Str(s.clone()),
            other => MxKey::Json(other.to_string()),
        }
    }

    /// Key of a cell where a missing column reads as the empty string.
    pub fn from_cell(value: Option<&Value>) -> Self {
        match value {
            Some(v) => Self::from_value(v),
            None => MxKey::Str(String::new()),
        }
    }
}

/// Reads a cell as a number for formula evaluation.
///
/// Missing and null cells read as `0`, booleans as `1`/`0`, and strings must
/// parse as a float.
pub fn coerce_number(value: Option<&Value>) -> Result<f64> {
    match value {
        None | Some(Value::Null) => Ok(0.0),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| MxError::evaluation(format!("number {n} is not representable"))),
        Some(Value::Bool(b)) => Ok(if *b { 1.0 } else { 0.0 }),
        Some(Value::String(s)) => s.trim().parse::<f64>().map_err(|_| {
            MxError::evaluation(format!("could not convert string to float: '{s}'"))
        }),
        Some(other) => Err(MxError::evaluation(format!(
            "unsupported operand: {other}"
        ))),
    }
}

/// Wraps a float as a JSON value; non-finite results become null.
pub fn float_value(value: f64) -> Value {
    Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}
