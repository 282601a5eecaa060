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

//! # Metrix Pipeline Module
//!
//! Ordered execution of transformation steps over a named table set.
//!
//! A pipeline is a list of [`MxStep`] records, each carrying a `type`
//! discriminator plus the fields of that operator. Steps run strictly in
//! order, and every step sees the cumulative effect of the ones before it.
//! The first failing step stops the run; callers get either the fully
//! transformed set or one error.
//!
//! ```rust
//! use metrix::pipeline::MxPipeline;
//! use metrix::table::MxTableSet;
//! use serde_json::json;
//!
//! let pipeline = MxPipeline::from_json_str(
//!     r#"[{"type": "sort", "source": "direct", "column": "cost", "descending": true}]"#,
//! ).unwrap();
//! let tables = MxTableSet::from_json(json!({
//!     "direct": [{"cost": 10}, {"cost": 30}]
//! })).unwrap();
//!
//! let out = pipeline.run(&tables).unwrap();
//! assert_eq!(out.get("direct").unwrap()[0]["cost"], json!(30));
//! ```

use std::mem;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{MxError, Result};
use crate::operator::{execute_operator, MxOperatorRegistry};
use crate::table::MxTableSet;

/// One configured step: the operator `type` plus its fields.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MxStep {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(flatten)]
    pub config: Map<String, Value>,
}

impl MxStep {
    /// Builds a step from a type name and a JSON object of fields.
    ///
    /// Non-object configs yield a step without fields.
    pub fn new(kind: impl Into<String>, config: Value) -> Self {
        let config = match config {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            kind: kind.into(),
            config,
        }
    }

    /// Operator fields as a JSON object.
    pub fn config_value(&self) -> Value {
        Value::Object(self.config.clone())
    }
}

/// Row counts observed around one completed step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MxStepReport {
    /// 1-based step number.
    pub step: usize,
    pub operator: String,
    /// Total rows over all tables before the step.
    pub rows_before: usize,
    pub rows_after: usize,
}

/// Terminal failure of a run.
#[derive(Debug)]
pub struct MxStepFailure {
    pub step: usize,
    pub operator: String,
    pub error: MxError,
}

/// Lifecycle of one pipeline run.
#[derive(Debug)]
pub enum MxPipelineState {
    /// Nothing has run yet.
    Ready(MxTableSet),
    /// `completed` steps have finished and more remain.
    Running { completed: usize, tables: MxTableSet },
    Succeeded(MxTableSet),
    Failed(MxStepFailure),
}

impl MxPipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, MxPipelineState::Succeeded(_) | MxPipelineState::Failed(_))
    }
}

/// Ordered list of steps bound to an operator registry.
#[derive(Clone, Debug)]
pub struct MxPipeline {
    steps: Vec<MxStep>,
    registry: Arc<MxOperatorRegistry>,
}

impl Default for MxPipeline {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl MxPipeline {
    /// Creates a pipeline over the built-in operators.
    pub fn new(steps: Vec<MxStep>) -> Self {
        Self {
            steps,
            registry: MxOperatorRegistry::shared(),
        }
    }

    pub fn from_steps(steps: impl IntoIterator<Item = MxStep>) -> Self {
        Self::new(steps.into_iter().collect())
    }

    /// Replaces the registry used to resolve step types.
    pub fn with_registry(mut self, registry: Arc<MxOperatorRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Parses a JSON array of step records.
    pub fn from_json_str(input: &str) -> Result<Self> {
        let steps: Vec<MxStep> = serde_json::from_str(input)?;
        Ok(Self::new(steps))
    }

    /// Parses a YAML sequence of step records.
    pub fn from_yaml_str(input: &str) -> Result<Self> {
        let steps: Vec<MxStep> = serde_yaml::from_str(input)?;
        Ok(Self::new(steps))
    }

    pub fn steps(&self) -> &[MxStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Runs the pipeline on a private copy of `tables`.
    ///
    /// The caller's set is never modified.
    pub fn run(&self, tables: &MxTableSet) -> Result<MxTableSet> {
        self.run_owned(tables.clone())
    }

    /// Runs the pipeline, consuming `tables`.
    pub fn run_owned(&self, tables: MxTableSet) -> Result<MxTableSet> {
        self.run_with_progress(tables, |_| {})
    }

    /// Runs the pipeline and reports every completed step.
    pub fn run_with_progress(
        &self,
        tables: MxTableSet,
        mut progress: impl FnMut(&MxStepReport),
    ) -> Result<MxTableSet> {
        let mut execution = self.execution(tables);
        while let Some(report) = execution.step() {
            progress(&report);
        }
        execution.finish()
    }

    /// Starts a stepwise run.
    pub fn execution(&self, tables: MxTableSet) -> MxPipelineExecution<'_> {
        MxPipelineExecution {
            pipeline: self,
            state: MxPipelineState::Ready(tables),
        }
    }
}

/// A pipeline run driven one step at a time.
#[derive(Debug)]
pub struct MxPipelineExecution<'a> {
    pipeline: &'a MxPipeline,
    state: MxPipelineState,
}

impl MxPipelineExecution<'_> {
    pub fn state(&self) -> &MxPipelineState {
        &self.state
    }

    /// Runs the next step.
    ///
    /// Returns `None` once the run has reached a terminal state, including
    /// when this call is the one that failed.
    pub fn step(&mut self) -> Option<MxStepReport> {
        let pipeline = self.pipeline;
        let placeholder = MxPipelineState::Ready(MxTableSet::new());
        let (completed, tables) = match mem::replace(&mut self.state, placeholder) {
            MxPipelineState::Ready(tables) => {
                log::info!(
                    "pipeline started: {} step(s) over {} table(s)",
                    pipeline.len(),
                    tables.len()
                );
                (0, tables)
            }
            MxPipelineState::Running { completed, tables } => (completed, tables),
            terminal => {
                self.state = terminal;
                return None;
            }
        };

        if completed >= pipeline.len() {
            self.succeed(tables);
            return None;
        }

        let step = &pipeline.steps[completed];
        let number = completed + 1;
        let rows_before = tables.total_rows();

        match self.run_step(step, number, tables) {
            Ok(tables) => {
                let report = MxStepReport {
                    step: number,
                    operator: step.kind.clone(),
                    rows_before,
                    rows_after: tables.total_rows(),
                };
                log::debug!(
                    "step {} ({}): {} -> {} rows",
                    number,
                    step.kind,
                    report.rows_before,
                    report.rows_after
                );
                if log::log_enabled!(log::Level::Trace) {
                    log::trace!("step {} tables: {:?}", number, tables.row_counts());
                }
                if number == pipeline.len() {
                    self.succeed(tables);
                } else {
                    self.state = MxPipelineState::Running {
                        completed: number,
                        tables,
                    };
                }
                Some(report)
            }
            Err(error) => {
                log::warn!("pipeline stopped at step {} ({}): {}", number, step.kind, error);
                self.state = MxPipelineState::Failed(MxStepFailure {
                    step: number,
                    operator: step.kind.clone(),
                    error,
                });
                None
            }
        }
    }

    /// Drives the remaining steps and returns the outcome.
    pub fn finish(mut self) -> Result<MxTableSet> {
        while !self.state.is_terminal() {
            self.step();
        }
        match self.state {
            MxPipelineState::Succeeded(tables) => Ok(tables),
            MxPipelineState::Failed(failure) => Err(failure.error),
            _ => Err(MxError::internal("pipeline run ended in a non-terminal state")),
        }
    }

    fn run_step(&self, step: &MxStep, number: usize, tables: MxTableSet) -> Result<MxTableSet> {
        let operator = self
            .pipeline
            .registry
            .build(&step.kind, &step.config_value())
            .map_err(|err| err.at_step(number, step.kind.as_str()))?;
        execute_operator(operator.as_ref(), tables, number)
    }

    fn succeed(&mut self, tables: MxTableSet) {
        log::info!(
            "pipeline finished: {} table(s), {} row(s)",
            tables.len(),
            tables.total_rows()
        );
        self.state = MxPipelineState::Succeeded(tables);
    }
}
