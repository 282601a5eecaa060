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

//! # Metrix Operator Module
//!
//! This module defines the operator trait, the registry that maps step
//! `type` names to operator factories, and the execution helper used by the
//! pipeline.
//!
//! ## Operator Design
//!
//! An operator receives the whole named table set and returns the updated
//! set. Most built-ins rewrite their `source` table in place; `join` may
//! write to a different key. Operators are built from their step
//! configuration right before they run, so a malformed configuration
//! surfaces as an error of that step and not before.
//!
//! ## Implementing Custom Operators
//!
//! ```rust
//! use metrix::errors::Result;
//! use metrix::operator::{MxOperator, MxOperatorRegistry};
//! use metrix::table::MxTableSet;
//! use serde_json::Value;
//!
//! #[derive(Debug)]
//! struct DropAll(String);
//!
//! impl MxOperator for DropAll {
//!     fn name(&self) -> &'static str {
//!         "drop_all"
//!     }
//!
//!     fn apply(&self, mut tables: MxTableSet) -> Result<MxTableSet> {
//!         tables.require_mut(&self.0)?.clear();
//!         Ok(tables)
//!     }
//! }
//!
//! fn drop_all_factory(config: &Value) -> Result<Box<dyn MxOperator + Send + Sync>> {
//!     let source = config["source"].as_str().unwrap_or_default().to_string();
//!     Ok(Box::new(DropAll(source)))
//! }
//!
//! let mut registry = MxOperatorRegistry::with_defaults();
//! registry.register("drop_all", drop_all_factory);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{MxError, Result};
use crate::table::MxTableSet;

/// Contract every transformation operator fulfills.
pub trait MxOperator: fmt::Debug {
    /// Step type name, used in logs and positional error messages.
    fn name(&self) -> &'static str;

    /// Applies the operator to the table set and returns the updated set.
    fn apply(&self, tables: MxTableSet) -> Result<MxTableSet>;
}

/// Builds an operator from the configuration of one pipeline step.
pub type MxOperatorFactory = fn(&Value) -> Result<Box<dyn MxOperator + Send + Sync>>;

/// The built-in operator kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MxOperatorKind {
    Extract,
    GroupBy,
    Join,
    Rename,
    Filter,
    Calculate,
    Sort,
}

impl MxOperatorKind {
    pub const ALL: [MxOperatorKind; 7] = [
        MxOperatorKind::Extract,
        MxOperatorKind::GroupBy,
        MxOperatorKind::Join,
        MxOperatorKind::Rename,
        MxOperatorKind::Filter,
        MxOperatorKind::Calculate,
        MxOperatorKind::Sort,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MxOperatorKind::Extract => "extract",
            MxOperatorKind::GroupBy => "group_by",
            MxOperatorKind::Join => "join",
            MxOperatorKind::Rename => "rename",
            MxOperatorKind::Filter => "filter",
            MxOperatorKind::Calculate => "calculate",
            MxOperatorKind::Sort => "sort",
        }
    }

    /// Factory of the built-in implementation.
    pub fn factory(&self) -> MxOperatorFactory {
        use crate::operators::*;
        match self {
            MxOperatorKind::Extract => extract::extract_factory,
            MxOperatorKind::GroupBy => group_by::group_by_factory,
            MxOperatorKind::Join => join::join_factory,
            MxOperatorKind::Rename => rename::rename_factory,
            MxOperatorKind::Filter => filter::filter_factory,
            MxOperatorKind::Calculate => calculate::calculate_factory,
            MxOperatorKind::Sort => sort::sort_factory,
        }
    }
}

impl fmt::Display for MxOperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MxOperatorKind {
    type Err = MxError;

    fn from_str(s: &str) -> Result<Self> {
        MxOperatorKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| MxError::UnknownOperator(s.to_string()))
    }
}

/// Lookup table from step type name to operator factory.
#[derive(Clone, Default)]
pub struct MxOperatorRegistry {
    factories: HashMap<String, MxOperatorFactory>,
}

impl fmt::Debug for MxOperatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = self.names();
        names.sort_unstable();
        f.debug_struct("MxOperatorRegistry")
            .field("operators", &names)
            .finish()
    }
}

impl MxOperatorRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the seven built-in operators.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for kind in MxOperatorKind::ALL {
            registry.register(kind.as_str(), kind.factory());
        }
        registry
    }

    /// Process-wide registry of the built-in operators.
    pub fn shared() -> Arc<MxOperatorRegistry> {
        static SHARED: OnceLock<Arc<MxOperatorRegistry>> = OnceLock::new();
        SHARED
            .get_or_init(|| Arc::new(MxOperatorRegistry::with_defaults()))
            .clone()
    }

    /// Registers (or replaces) the factory for a step type.
    pub fn register(&mut self, name: impl Into<String>, factory: MxOperatorFactory) {
        self.factories.insert(name.into(), factory);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Instantiates the operator for a step.
    pub fn build(&self, name: &str, config: &Value) -> Result<Box<dyn MxOperator + Send + Sync>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| MxError::UnknownOperator(name.to_string()))?;
        factory(config)
    }
}

/// Executes an operator as pipeline step `step` (1-based), normalizing errors.
///
/// Contract errors pass through unchanged; anything else is tagged with the
/// step number and operator name.
pub fn execute_operator(
    operator: &dyn MxOperator,
    tables: MxTableSet,
    step: usize,
) -> Result<MxTableSet> {
    operator
        .apply(tables)
        .map_err(|err| err.at_step(step, operator.name()))
}
