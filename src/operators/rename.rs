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

use std::collections::HashMap;

use serde_json::Value;

use crate::errors::{MxError, Result};
use crate::operator::MxOperator;
use crate::operators::{config_object, missing, required_str};
use crate::table::{MxRow, MxTableSet};

/// Renames columns of every row in `source`.
///
/// Unmapped columns pass through. When a rename lands on a name that the row
/// already produced, the field visited later wins.
#[derive(Debug)]
pub struct MxRename {
    source: String,
    mapping: HashMap<String, String>,
}

impl MxRename {
    pub fn new(source: String, mapping: HashMap<String, String>) -> Self {
        Self { source, mapping }
    }

    fn rename_row(&self, row: MxRow) -> MxRow {
        let mut out = MxRow::new();
        for (key, value) in row {
            let key = match self.mapping.get(&key) {
                Some(new_key) => new_key.clone(),
                None => key,
            };
            out.insert(key, value);
        }
        out
    }
}

impl MxOperator for MxRename {
    fn name(&self) -> &'static str {
        "rename"
    }

    fn apply(&self, mut tables: MxTableSet) -> Result<MxTableSet> {
        let table = tables.require_mut(&self.source)?;
        let rows = std::mem::take(table);
        *table = rows.into_iter().map(|row| self.rename_row(row)).collect();
        Ok(tables)
    }
}

pub fn rename_factory(config: &Value) -> Result<Box<dyn MxOperator + Send + Sync>> {
    let obj = config_object(config, "rename")?;
    let mapping = obj.get("mapping").and_then(Value::as_object);
    let (Some(source), Some(mapping)) = (
        required_str(obj, "source"),
        mapping.filter(|m| !m.is_empty()),
    ) else {
        return Err(missing("rename", &["source", "mapping"]));
    };

    let mapping = mapping
        .iter()
        .map(|(old, new)| {
            new.as_str()
                .map(|new| (old.clone(), new.to_string()))
                .ok_or_else(|| MxError::config(format!("rename target for '{old}' must be a string")))
        })
        .collect::<Result<HashMap<_, _>>>()?;

    Ok(Box::new(MxRename::new(source, mapping)))
}
