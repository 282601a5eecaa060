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

//! # Operators Module
//!
//! The seven built-in transformation operators.
//!
//! - **extract**: regex capture into a new column
//! - **group_by**: grouping with sum/avg/count/min/max/first/last
//! - **join**: inner/left/right/outer equi-join of two tables
//! - **rename**: column renaming
//! - **filter**: row selection by comparison, substring or null checks
//! - **calculate**: arithmetic formula into a new column
//! - **sort**: stable single-column sort
//!
//! Each operator has a factory that reads its step configuration. A
//! required key that is absent, empty or of the wrong type yields the
//! configuration error `"<type> requires: <keys>"`.

pub mod calculate;
pub mod extract;
pub mod filter;
pub mod group_by;
pub mod join;
pub mod rename;
pub mod sort;

use serde_json::{Map, Value};

use crate::errors::{MxError, Result};

pub(crate) fn config_object<'a>(config: &'a Value, operator: &str) -> Result<&'a Map<String, Value>> {
    config
        .as_object()
        .ok_or_else(|| MxError::config(format!("{operator} config must be object")))
}

/// A non-empty string parameter.
pub(crate) fn required_str(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub(crate) fn missing(operator: &str, keys: &[&str]) -> MxError {
    MxError::config(format!("{operator} requires: {}", keys.join(", ")))
}
