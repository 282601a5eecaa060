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

use regex::Regex;
use serde_json::Value;

use crate::errors::{MxError, Result};
use crate::operator::MxOperator;
use crate::operators::{config_object, missing, required_str};
use crate::table::MxTableSet;
use crate::value::stringify;

/// Writes the first capture group of `pattern` into `output_column`.
///
/// The column is searched, not anchored. Rows without a match (or a pattern
/// without groups) keep their original string value in the output column.
#[derive(Debug)]
pub struct MxExtract {
    source: String,
    column: String,
    pattern: String,
    output_column: String,
}

impl MxExtract {
    pub fn new(source: String, column: String, pattern: String, output_column: String) -> Self {
        Self {
            source,
            column,
            pattern,
            output_column,
        }
    }
}

impl MxOperator for MxExtract {
    fn name(&self) -> &'static str {
        "extract"
    }

    fn apply(&self, mut tables: MxTableSet) -> Result<MxTableSet> {
        let table = tables.require_mut(&self.source)?;
        let regex = Regex::new(&self.pattern)
            .map_err(|err| MxError::config(format!("Invalid regex pattern: {err}")))?;
        let has_groups = regex.captures_len() > 1;

        for row in table.iter_mut() {
            let text = stringify(row.get(&self.column));
            let captured = regex
                .captures(&text)
                .filter(|_| has_groups)
                .map(|caps| caps.get(1).map(|m| m.as_str().to_string()));
            let extracted = match captured {
                Some(Some(group)) => Value::String(group),
                // group 1 exists but did not take part in the match
                Some(None) => Value::Null,
                None => Value::String(text),
            };
            row.insert(self.output_column.clone(), extracted);
        }

        Ok(tables)
    }
}

pub fn extract_factory(config: &Value) -> Result<Box<dyn MxOperator + Send + Sync>> {
    let obj = config_object(config, "extract")?;
    let (Some(source), Some(column), Some(pattern), Some(output_column)) = (
        required_str(obj, "source"),
        required_str(obj, "column"),
        required_str(obj, "pattern"),
        required_str(obj, "output_column"),
    ) else {
        return Err(missing(
            "extract",
            &["source", "column", "pattern", "output_column"],
        ));
    };

    Ok(Box::new(MxExtract::new(source, column, pattern, output_column)))
}
