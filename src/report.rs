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

//! # Metrix Report Module
//!
//! A report is a saved document that names its data sources, the period to
//! fetch, the per-source and global transformation steps, and where the
//! result is exported. This module owns that document and the run that turns
//! it into a preview table.
//!
//! Fetching is delegated to an [`MxSourceFetcher`]; the runner itself never
//! performs network or storage IO.
//!
//! ## Run Order
//!
//! 1. Resolve the period into a concrete date range.
//! 2. Fetch every source and store it under its id (or its type).
//! 3. Apply the source's own `source_transformations` on a set holding only
//!    that source.
//! 4. Apply the global `transformations` over all sources.
//! 5. Present the first table as the report preview.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{MxError, Result};
use crate::operator::MxOperatorRegistry;
use crate::pipeline::{MxPipeline, MxStep};
use crate::table::{MxTable, MxTablePreview, MxTableSet};
use crate::value::is_blank;

/// One configured data source of a report.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MxSourceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Source type, e.g. `direct` or `metrika`.
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign_ids: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counter_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goals: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_transformations: Vec<MxStep>,
    /// Fetcher-specific settings (metrics, dimensions, field lists, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MxSourceConfig {
    /// Table key of this source: its `id`, or its type when no id is set.
    pub fn key(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.kind)
    }

    /// Checks the settings every fetcher relies on.
    pub fn validate(&self) -> Result<()> {
        if self.kind == "metrika" && is_blank(self.counter_id.as_ref()) {
            return Err(MxError::config("counter_id is required for Metrika source"));
        }
        Ok(())
    }
}

/// Named period of a report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MxPeriodKind {
    #[default]
    #[serde(rename = "last_7_days")]
    Last7Days,
    #[serde(rename = "last_14_days")]
    Last14Days,
    #[serde(rename = "last_30_days")]
    Last30Days,
    #[serde(rename = "last_90_days")]
    Last90Days,
    #[serde(rename = "this_month")]
    ThisMonth,
    #[serde(rename = "last_month")]
    LastMonth,
    #[serde(rename = "custom")]
    Custom,
    /// Unrecognized types behave like the last seven days.
    #[serde(other)]
    Other,
}

/// Inclusive date range handed to the fetchers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MxDateRange {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
}

impl fmt::Display for MxDateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.date_from, self.date_to)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MxPeriodConfig {
    #[serde(rename = "type", default)]
    pub kind: MxPeriodKind,
    /// Used by `custom` periods only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<NaiveDate>,
}

fn days_before(today: NaiveDate, days: u64) -> Result<NaiveDate> {
    today
        .checked_sub_days(Days::new(days))
        .ok_or_else(|| MxError::config(format!("date out of range: {today} - {days} days")))
}

fn first_of_month(date: NaiveDate) -> Result<NaiveDate> {
    date.with_day(1)
        .ok_or_else(|| MxError::internal(format!("no first day for {date}")))
}

impl MxPeriodConfig {
    pub fn new(kind: MxPeriodKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Resolves the period relative to `today`.
    ///
    /// Rolling periods end yesterday. `this_month` ends today. A `custom`
    /// period falls back to the last seven days for a missing bound.
    pub fn resolve(&self, today: NaiveDate) -> Result<MxDateRange> {
        let rolling = |days| -> Result<MxDateRange> {
            Ok(MxDateRange {
                date_from: days_before(today, days)?,
                date_to: days_before(today, 1)?,
            })
        };

        match self.kind {
            MxPeriodKind::Last7Days | MxPeriodKind::Other => rolling(7),
            MxPeriodKind::Last14Days => rolling(14),
            MxPeriodKind::Last30Days => rolling(30),
            MxPeriodKind::Last90Days => rolling(90),
            MxPeriodKind::ThisMonth => Ok(MxDateRange {
                date_from: first_of_month(today)?,
                date_to: today,
            }),
            MxPeriodKind::LastMonth => {
                let last_month_end = days_before(first_of_month(today)?, 1)?;
                Ok(MxDateRange {
                    date_from: first_of_month(last_month_end)?,
                    date_to: last_month_end,
                })
            }
            MxPeriodKind::Custom => {
                let date_from = match self.date_from {
                    Some(date) => date,
                    None => days_before(today, 7)?,
                };
                let date_to = match self.date_to {
                    Some(date) => date,
                    None => days_before(today, 1)?,
                };
                Ok(MxDateRange { date_from, date_to })
            }
        }
    }
}

fn default_export_kind() -> String {
    "google_sheets".to_string()
}

/// Export target of a report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MxExportConfig {
    #[serde(rename = "type", default = "default_export_kind")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spreadsheet_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_name: Option<String>,
    #[serde(default)]
    pub create_new: bool,
}

/// Saved report document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MxReportConfig {
    #[serde(default)]
    pub sources: Vec<MxSourceConfig>,
    #[serde(default)]
    pub period: MxPeriodConfig,
    #[serde(default)]
    pub transformations: Vec<MxStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export: Option<MxExportConfig>,
}

impl MxReportConfig {
    pub fn from_json_str(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn from_yaml_str(input: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(input)?)
    }

    /// Loads a report document, as YAML for `.yaml`/`.yml` files and as JSON
    /// otherwise.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&text),
            _ => Self::from_json_str(&text),
        }
    }
}

/// Upstream boundary that turns a source configuration into rows.
pub trait MxSourceFetcher {
    fn fetch(&self, source: &MxSourceConfig, range: &MxDateRange) -> Result<MxTable>;
}

impl<F> MxSourceFetcher for F
where
    F: Fn(&MxSourceConfig, &MxDateRange) -> Result<MxTable>,
{
    fn fetch(&self, source: &MxSourceConfig, range: &MxDateRange) -> Result<MxTable> {
        self(source, range)
    }
}

/// Fetcher serving pre-loaded tables by source key, ignoring the period.
#[derive(Clone, Debug, Default)]
pub struct MxStaticFetcher {
    tables: MxTableSet,
}

impl MxStaticFetcher {
    pub fn new(tables: MxTableSet) -> Self {
        Self { tables }
    }
}

impl MxSourceFetcher for MxStaticFetcher {
    fn fetch(&self, source: &MxSourceConfig, _range: &MxDateRange) -> Result<MxTable> {
        self.tables
            .get(source.key())
            .cloned()
            .ok_or_else(|| MxError::not_found(format!("No data for source '{}'", source.key())))
    }
}

/// Result of a report run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MxReportOutcome {
    pub date_range: MxDateRange,
    /// Every table after the global transformations.
    pub tables: MxTableSet,
    /// The first table, as shown to the user and exported.
    pub preview: MxTablePreview,
}

/// Executes report documents against a fetcher.
#[derive(Clone, Debug)]
pub struct MxReportRunner {
    registry: Arc<MxOperatorRegistry>,
}

impl Default for MxReportRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl MxReportRunner {
    pub fn new() -> Self {
        Self {
            registry: MxOperatorRegistry::shared(),
        }
    }

    pub fn with_registry(registry: Arc<MxOperatorRegistry>) -> Self {
        Self { registry }
    }

    fn pipeline(&self, steps: &[MxStep]) -> MxPipeline {
        MxPipeline::new(steps.to_vec()).with_registry(Arc::clone(&self.registry))
    }

    /// Fetches, transforms and previews a report.
    pub fn run(
        &self,
        config: &MxReportConfig,
        fetcher: &dyn MxSourceFetcher,
        today: NaiveDate,
    ) -> Result<MxReportOutcome> {
        let date_range = config.period.resolve(today)?;
        log::info!(
            "report run: {} source(s), period {}",
            config.sources.len(),
            date_range
        );

        let mut tables = MxTableSet::new();
        for source in &config.sources {
            source.validate()?;
            let key = source.key().to_string();
            let mut data = fetcher.fetch(source, &date_range)?;
            log::debug!("source '{}' fetched {} row(s)", key, data.len());

            if !source.source_transformations.is_empty() {
                let single = MxTableSet::new().with_table(key.clone(), data.clone());
                let mut transformed = self
                    .pipeline(&source.source_transformations)
                    .run_owned(single)
                    .map_err(|err| MxError::Source {
                        source_id: key.clone(),
                        message: err.to_string(),
                    })?;
                // a pipeline that drops the source key leaves the fetched rows
                if let Some(table) = transformed.remove(&key) {
                    data = table;
                }
            }
            tables.insert(key, data);
        }

        if !config.transformations.is_empty() {
            tables = self
                .pipeline(&config.transformations)
                .run_owned(tables)
                .map_err(|err| MxError::Report {
                    message: err.to_string(),
                })?;
        }

        let preview = tables.preview_first();
        log::info!("report produced {} row(s)", preview.row_count);
        Ok(MxReportOutcome {
            date_range,
            tables,
            preview,
        })
    }
}
