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

use std::collections::HashSet;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{MxError, Result};
use crate::operator::MxOperator;
use crate::operators::{config_object, missing, required_str};
use crate::table::{MxRow, MxTable, MxTableSet};
use crate::value::MxKey;

/// Join strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MxJoinHow {
    #[default]
    Inner,
    Left,
    Right,
    Outer,
}

impl MxJoinHow {
    fn keeps_left(self) -> bool {
        matches!(self, MxJoinHow::Left | MxJoinHow::Outer)
    }

    fn keeps_right(self) -> bool {
        matches!(self, MxJoinHow::Right | MxJoinHow::Outer)
    }
}

impl FromStr for MxJoinHow {
    type Err = MxError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "inner" => Ok(MxJoinHow::Inner),
            "left" => Ok(MxJoinHow::Left),
            "right" => Ok(MxJoinHow::Right),
            "outer" => Ok(MxJoinHow::Outer),
            other => Err(MxError::config(format!("Unknown join type: {other}"))),
        }
    }
}

/// Equi-join of two tables on one column, stored under `output`.
///
/// Right-side fields that collide with a left field are renamed with a
/// `right_` prefix. The join column itself comes from the left row.
#[derive(Debug)]
pub struct MxJoin {
    left: String,
    right: String,
    on: String,
    how: MxJoinHow,
    output: String,
}

impl MxJoin {
    pub fn new(left: String, right: String, on: String, how: MxJoinHow, output: String) -> Self {
        Self {
            left,
            right,
            on,
            how,
            output,
        }
    }

    fn merge(&self, left: &MxRow, right: &MxRow) -> MxRow {
        let mut merged = left.clone();
        for (key, value) in right {
            if key == &self.on {
                continue;
            }
            let target = if merged.contains_key(key) {
                format!("right_{key}")
            } else {
                key.clone()
            };
            merged.insert(target, value.clone());
        }
        merged
    }

    fn join(&self, left: &[MxRow], right: &[MxRow]) -> MxTable {
        let mut index: IndexMap<MxKey, Vec<&MxRow>> = IndexMap::new();
        for row in right {
            index
                .entry(MxKey::from_cell(row.get(&self.on)))
                .or_default()
                .push(row);
        }

        let mut used: HashSet<&MxKey> = HashSet::new();
        let mut result = MxTable::new();

        for row in left {
            let key = MxKey::from_cell(row.get(&self.on));
            match index.get_key_value(&key) {
                Some((stored, matches)) => {
                    used.insert(stored);
                    result.extend(matches.iter().map(|right_row| self.merge(row, right_row)));
                }
                None if self.how.keeps_left() => result.push(row.clone()),
                None => {}
            }
        }

        if self.how.keeps_right() {
            for (key, rows) in &index {
                if !used.contains(key) {
                    result.extend(rows.iter().map(|row| (*row).clone()));
                }
            }
        }

        result
    }
}

impl MxOperator for MxJoin {
    fn name(&self) -> &'static str {
        "join"
    }

    fn apply(&self, mut tables: MxTableSet) -> Result<MxTableSet> {
        let left = tables
            .get(&self.left)
            .ok_or_else(|| MxError::not_found(format!("Left source '{}' not found", self.left)))?;
        let right = tables
            .get(&self.right)
            .ok_or_else(|| MxError::not_found(format!("Right source '{}' not found", self.right)))?;

        let joined = self.join(left, right);
        log::debug!(
            "join {} x {} on '{}' ({:?}) -> {} rows",
            self.left,
            self.right,
            self.on,
            self.how,
            joined.len()
        );

        tables.insert(self.output.clone(), joined);
        Ok(tables)
    }
}

pub fn join_factory(config: &Value) -> Result<Box<dyn MxOperator + Send + Sync>> {
    let obj = config_object(config, "join")?;
    let (Some(left), Some(right), Some(on)) = (
        required_str(obj, "left"),
        required_str(obj, "right"),
        required_str(obj, "on"),
    ) else {
        return Err(missing("join", &["left", "right", "on"]));
    };

    let how = match obj.get("how") {
        None | Some(Value::Null) => MxJoinHow::default(),
        Some(Value::String(name)) => name.parse()?,
        Some(_) => return Err(MxError::config("join 'how' must be a string")),
    };
    let output = required_str(obj, "output").unwrap_or_else(|| left.clone());

    Ok(Box::new(MxJoin::new(left, right, on, how, output)))
}
