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

//! # Metrix Error Module
//!
//! This module defines the error types used throughout Metrix.
//!
//! ## Error Categories
//!
//! - **Config**: a required operator parameter is missing or malformed
//! - **NotFound**: a referenced table key does not exist in the table set
//! - **UnknownOperator**: a pipeline step names an unregistered type
//! - **Evaluation**: a per-row formula failure, recovered by `calculate`
//! - **Value**: a value of the wrong shape reached an operator
//! - **Transformation**: any non-contract failure, tagged with its step
//! - **Source**: a per-source pipeline failure during a report run
//! - **Report**: a failure of the report-wide transformations
//! - **Io** / **Serde**: file and (de)serialization failures
//! - **Internal**: unexpected internal failures
//!
//! Config, NotFound and UnknownOperator are the *contract* kinds: their
//! messages describe the problem on their own, so the pipeline executor
//! propagates them verbatim. Everything else raised by an operator is
//! rewrapped as [`MxError::Transformation`].

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used throughout Metrix.
pub type Result<T> = std::result::Result<T, MxError>;

/// Canonical error enumeration for Metrix.
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum MxError {
    /// Missing or malformed operator configuration.
    #[error("{message}")]
    Config { message: String },

    /// A table key referenced by an operator is absent.
    #[error("{message}")]
    NotFound { message: String },

    /// A pipeline step with an unregistered `type`.
    #[error("Unknown transformation type: {0}")]
    UnknownOperator(String),

    /// Formula evaluation failed for a single row.
    #[error("evaluation error: {message}")]
    Evaluation { message: String },

    /// A row value could not be used the way an operator needs it.
    #[error("{message}")]
    Value { message: String },

    /// Non-contract failure raised at a given (1-based) pipeline step.
    #[error("Transformation {step} ({operator}) failed: {message}")]
    Transformation {
        step: usize,
        operator: String,
        message: String,
    },

    /// A per-source pipeline failed while running a report.
    #[error("Source '{source_id}' transformation error: {message}")]
    Source { source_id: String, message: String },

    /// The report-wide transformations failed.
    #[error("Transformation error: {message}")]
    Report { message: String },

    /// Errors originating from filesystem IO.
    #[error("io error: {0}")]
    Io(String),

    /// Wrapper for serialization issues.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Catch-all variant for unexpected situations.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<io::Error> for MxError {
    fn from(err: io::Error) -> Self {
        MxError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for MxError {
    fn from(err: serde_json::Error) -> Self {
        MxError::Serde(err.to_string())
    }
}

impl From<serde_yaml::Error> for MxError {
    fn from(err: serde_yaml::Error) -> Self {
        MxError::Serde(err.to_string())
    }
}

#[cfg(feature = "csv")]
impl From<csv::Error> for MxError {
    fn from(err: csv::Error) -> Self {
        MxError::Io(format!("csv error: {err}"))
    }
}

impl MxError {
    /// Helper to construct configuration errors.
    pub fn config<T: Into<String>>(message: T) -> Self {
        MxError::Config {
            message: message.into(),
        }
    }

    /// Helper to construct not-found errors.
    pub fn not_found<T: Into<String>>(message: T) -> Self {
        MxError::NotFound {
            message: message.into(),
        }
    }

    /// Helper to construct per-row evaluation errors.
    pub fn evaluation<T: Into<String>>(message: T) -> Self {
        MxError::Evaluation {
            message: message.into(),
        }
    }

    /// Helper to construct value errors.
    pub fn value<T: Into<String>>(message: T) -> Self {
        MxError::Value {
            message: message.into(),
        }
    }

    /// Helper to construct internal errors.
    pub fn internal<T: Into<String>>(message: T) -> Self {
        MxError::Internal(message.into())
    }

    /// Whether the message of this error is self-describing and must reach
    /// the caller without a positional wrapper.
    pub fn is_contract(&self) -> bool {
        matches!(
            self,
            MxError::Config { .. } | MxError::NotFound { .. } | MxError::UnknownOperator(_)
        )
    }

    /// Tags a failure with the pipeline step that raised it.
    ///
    /// Contract errors are returned unchanged.
    pub fn at_step(self, step: usize, operator: impl Into<String>) -> Self {
        if self.is_contract() {
            return self;
        }
        MxError::Transformation {
            step,
            operator: operator.into(),
            message: self.to_string(),
        }
    }
}
