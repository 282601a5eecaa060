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

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{MxError, Result};
use crate::operator::MxOperator;
use crate::operators::{config_object, missing, required_str};
use crate::table::MxTableSet;
use crate::value::{is_blank, loose_eq, relational_cmp, stringify};

/// Comparison used by [`MxFilter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MxFilterOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Gte,
    Lte,
    Contains,
    #[serde(rename = "startswith")]
    StartsWith,
    #[serde(rename = "endswith")]
    EndsWith,
    IsNull,
    NotNull,
}

impl MxFilterOp {
    /// Whether the operator compares against a `value`.
    pub fn needs_value(self) -> bool {
        !matches!(self, MxFilterOp::IsNull | MxFilterOp::NotNull)
    }

    /// Evaluates the predicate for one cell.
    ///
    /// Relational operators compare numbers numerically and everything else
    /// by string view. A null or missing cell never satisfies them.
    pub fn matches(self, cell: Option<&Value>, target: &Value) -> bool {
        match self {
            MxFilterOp::Eq => loose_eq(cell, target),
            MxFilterOp::Ne => !loose_eq(cell, target),
            MxFilterOp::Gt => relational_cmp(cell, target) == Some(Ordering::Greater),
            MxFilterOp::Lt => relational_cmp(cell, target) == Some(Ordering::Less),
            MxFilterOp::Gte => matches!(
                relational_cmp(cell, target),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            MxFilterOp::Lte => matches!(
                relational_cmp(cell, target),
                Some(Ordering::Less | Ordering::Equal)
            ),
            MxFilterOp::Contains => stringify(cell).contains(&stringify(Some(target))),
            MxFilterOp::StartsWith => stringify(cell).starts_with(&stringify(Some(target))),
            MxFilterOp::EndsWith => stringify(cell).ends_with(&stringify(Some(target))),
            MxFilterOp::IsNull => is_blank(cell),
            MxFilterOp::NotNull => !is_blank(cell),
        }
    }
}

impl FromStr for MxFilterOp {
    type Err = MxError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "eq" => MxFilterOp::Eq,
            "ne" => MxFilterOp::Ne,
            "gt" => MxFilterOp::Gt,
            "lt" => MxFilterOp::Lt,
            "gte" => MxFilterOp::Gte,
            "lte" => MxFilterOp::Lte,
            "contains" => MxFilterOp::Contains,
            "startswith" => MxFilterOp::StartsWith,
            "endswith" => MxFilterOp::EndsWith,
            "is_null" => MxFilterOp::IsNull,
            "not_null" => MxFilterOp::NotNull,
            other => return Err(MxError::config(format!("Unknown operator: {other}"))),
        })
    }
}

/// Keeps the rows of `source` whose `column` satisfies the predicate.
#[derive(Debug)]
pub struct MxFilter {
    source: String,
    column: String,
    op: MxFilterOp,
    value: Value,
}

impl MxFilter {
    pub fn new(source: String, column: String, op: MxFilterOp, value: Value) -> Self {
        Self {
            source,
            column,
            op,
            value,
        }
    }
}

impl MxOperator for MxFilter {
    fn name(&self) -> &'static str {
        "filter"
    }

    fn apply(&self, mut tables: MxTableSet) -> Result<MxTableSet> {
        let table = tables.require_mut(&self.source)?;
        let before = table.len();
        table.retain(|row| self.op.matches(row.get(&self.column), &self.value));
        log::trace!(
            "filter {} {:?} on '{}': {} -> {} rows",
            self.source,
            self.op,
            self.column,
            before,
            table.len()
        );
        Ok(tables)
    }
}

pub fn filter_factory(config: &Value) -> Result<Box<dyn MxOperator + Send + Sync>> {
    let obj = config_object(config, "filter")?;
    let (Some(source), Some(column), Some(op)) = (
        required_str(obj, "source"),
        required_str(obj, "column"),
        required_str(obj, "operator"),
    ) else {
        return Err(missing("filter", &["source", "column", "operator"]));
    };

    let op: MxFilterOp = op.parse()?;
    let value = match obj.get("value") {
        Some(value) => value.clone(),
        None if op.needs_value() => {
            return Err(missing("filter", &["source", "column", "operator", "value"]))
        }
        None => Value::Null,
    };

    Ok(Box::new(MxFilter::new(source, column, op, value)))
}
