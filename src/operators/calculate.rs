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

use crate::errors::Result;
use crate::formula::MxFormula;
use crate::operator::MxOperator;
use crate::operators::{config_object, missing, required_str};
use crate::table::MxTableSet;

/// Evaluates an arithmetic formula per row into `output_column`.
///
/// A row whose evaluation fails gets a null output; the step itself
/// succeeds.
#[derive(Debug)]
pub struct MxCalculate {
    source: String,
    output_column: String,
    formula: MxFormula,
}

impl MxCalculate {
    pub fn new(source: String, output_column: String, formula: MxFormula) -> Self {
        Self {
            source,
            output_column,
            formula,
        }
    }
}

impl MxOperator for MxCalculate {
    fn name(&self) -> &'static str {
        "calculate"
    }

    fn apply(&self, mut tables: MxTableSet) -> Result<MxTableSet> {
        let table = tables.require_mut(&self.source)?;
        if let Some(first) = table.first() {
            let absent: Vec<&str> = self
                .formula
                .columns()
                .into_iter()
                .filter(|column| !first.contains_key(*column))
                .collect();
            if !absent.is_empty() {
                log::debug!(
                    "calculate '{}': {:?} absent from the first row, read as 0",
                    self.formula.source(),
                    absent
                );
            }
        }
        let mut failed = 0usize;
        for row in table.iter_mut() {
            let value = match self.formula.evaluate_row(row) {
                Ok(value) => value,
                Err(err) => {
                    failed += 1;
                    log::debug!("calculate '{}': {}", self.formula.source(), err);
                    Value::Null
                }
            };
            row.insert(self.output_column.clone(), value);
        }
        if failed > 0 {
            log::debug!(
                "calculate {}: {} row(s) set to null",
                self.output_column,
                failed
            );
        }
        Ok(tables)
    }
}

pub fn calculate_factory(config: &Value) -> Result<Box<dyn MxOperator + Send + Sync>> {
    let obj = config_object(config, "calculate")?;
    let (Some(source), Some(output_column), Some(formula)) = (
        required_str(obj, "source"),
        required_str(obj, "output_column"),
        required_str(obj, "formula"),
    ) else {
        return Err(missing("calculate", &["source", "output_column", "formula"]));
    };

    let formula = MxFormula::parse(&formula)?;
    Ok(Box::new(MxCalculate::new(source, output_column, formula)))
}
