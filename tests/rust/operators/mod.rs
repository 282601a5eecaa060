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

//! # Metrix Operator Tests
//!
//! Exercises every built-in operator through the public registry, the same
//! way a pipeline step reaches it.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test operators
//! ```

mod extract;
mod filter;
mod join;
mod rename;
mod sort;

use metrix::{MxError, MxOperatorRegistry, MxTableSet, Result};
use serde_json::Value;

/// Builds the named operator from `config` and applies it to `input`.
pub fn apply(kind: &str, config: Value, input: Value) -> Result<MxTableSet> {
    let operator = MxOperatorRegistry::shared().build(kind, &config)?;
    operator.apply(MxTableSet::from_json(input)?)
}

/// Values of `column` in table `key`, with missing cells as null.
pub fn column(tables: &MxTableSet, key: &str, column: &str) -> Vec<Value> {
    tables
        .get(key)
        .expect("table present")
        .iter()
        .map(|row| row.get(column).cloned().unwrap_or(Value::Null))
        .collect()
}

pub fn message(err: MxError) -> String {
    err.to_string()
}
