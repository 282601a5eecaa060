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

use serde_json::Value;

use crate::errors::{MxError, Result};
use crate::operator::MxOperator;
use crate::operators::{config_object, missing, required_str};
use crate::table::MxTableSet;
use crate::value::total_cmp;

/// Stable sort of `source` by one column. Missing cells sort as `""`.
#[derive(Debug)]
pub struct MxSort {
    source: String,
    column: String,
    descending: bool,
}

impl MxSort {
    pub fn new(source: String, column: String, descending: bool) -> Self {
        Self {
            source,
            column,
            descending,
        }
    }
}

impl MxOperator for MxSort {
    fn name(&self) -> &'static str {
        "sort"
    }

    fn apply(&self, mut tables: MxTableSet) -> Result<MxTableSet> {
        let table = tables.require_mut(&self.source)?;
        let empty = Value::String(String::new());
        table.sort_by(|a, b| {
            let a = a.get(&self.column).unwrap_or(&empty);
            let b = b.get(&self.column).unwrap_or(&empty);
            if self.descending {
                total_cmp(b, a)
            } else {
                total_cmp(a, b)
            }
        });
        Ok(tables)
    }
}

pub fn sort_factory(config: &Value) -> Result<Box<dyn MxOperator + Send + Sync>> {
    let obj = config_object(config, "sort")?;
    let (Some(source), Some(column)) = (required_str(obj, "source"), required_str(obj, "column"))
    else {
        return Err(missing("sort", &["source", "column"]));
    };
    let descending = match obj.get("descending") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(_) => return Err(MxError::config("sort 'descending' must be a boolean")),
    };

    Ok(Box::new(MxSort::new(source, column, descending)))
}
