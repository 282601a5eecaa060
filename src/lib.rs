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

//! # Metrix Core Library
//!
//! Metrix turns tables fetched from advertising and web-analytics sources
//! into report tables. A report names its sources and an ordered list of
//! transformation steps; the library threads a named table set through those
//! steps and hands the first table to the presentation layer.
//!
//! ## Module Overview
//!
//! - **table**: rows, tables, the named table set and the preview view
//! - **value**: cell semantics shared by operators (string view, ordering, keys)
//! - **operator**: operator trait, registry and step execution
//! - **operators**: the seven built-in operators
//! - **formula**: restricted arithmetic evaluator used by `calculate`
//! - **pipeline**: ordered step execution and its state machine
//! - **report**: report documents, periods and the report runner
//! - **io**: loading table sets and steps, writing previews
//!
//! ## Feature Flags
//!
//! - `csv`: CSV preview export and CSV table loading
//! - `full`: Enables all features
//!
//! ## Quick Start
//!
//! ```rust
//! use metrix::{MxPipeline, MxTableSet};
//! use serde_json::json;
//!
//! let tables = MxTableSet::from_json(json!({
//!     "direct": [{"campaign_id": "123", "cost": 1000, "conversions": 10}]
//! })).unwrap();
//!
//! let pipeline = MxPipeline::from_json_str(r#"[
//!     {"type": "calculate", "source": "direct", "output_column": "cpa",
//!      "formula": "cost / conversions"}
//! ]"#).unwrap();
//!
//! let out = pipeline.run(&tables).unwrap();
//! assert_eq!(out.get("direct").unwrap()[0]["cpa"], json!(100.0));
//! ```
//!
//! ## Error Handling
//!
//! All operations return `Result<T, MxError>`. Configuration and not-found
//! errors keep their own message; any other failure inside a step is
//! reported as `Transformation {n} ({type}) failed: {message}`.

pub mod errors;
pub mod formula;
pub mod io;
pub mod operator;
pub mod operators;
pub mod pipeline;
pub mod report;
pub mod table;
pub mod value;

pub use errors::{MxError, Result};
pub use formula::MxFormula;
pub use io::{MxIo, MxIoFormat};
pub use operator::{execute_operator, MxOperator, MxOperatorKind, MxOperatorRegistry};
pub use pipeline::{MxPipeline, MxPipelineExecution, MxPipelineState, MxStep, MxStepReport};
pub use report::{
    MxDateRange, MxExportConfig, MxPeriodConfig, MxPeriodKind, MxReportConfig, MxReportOutcome,
    MxReportRunner, MxSourceConfig, MxSourceFetcher, MxStaticFetcher,
};
pub use table::{MxRow, MxTable, MxTablePreview, MxTableSet};
