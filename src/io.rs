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

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::errors::{MxError, Result};
use crate::pipeline::MxStep;
use crate::table::{MxTablePreview, MxTableSet};
#[cfg(feature = "csv")]
use crate::table::{MxRow, MxTable};

/// Output formats for a table preview.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MxIoFormat {
    Json,
    #[cfg(feature = "csv")]
    Csv(MxCsvOptions),
}

/// Configuration for CSV reading and writing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MxCsvOptions {
    pub delimiter: u8,
    pub has_headers: bool,
}

impl Default for MxCsvOptions {
    fn default() -> Self {
        MxCsvOptions {
            delimiter: b',',
            has_headers: true,
        }
    }
}

/// A steps file is either a bare list or a report-like object.
#[derive(Deserialize)]
#[serde(untagged)]
enum StepsDocument {
    List(Vec<MxStep>),
    Report { transformations: Vec<MxStep> },
}

impl StepsDocument {
    fn into_steps(self) -> Vec<MxStep> {
        match self {
            StepsDocument::List(steps) => steps,
            StepsDocument::Report { transformations } => transformations,
        }
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// File helpers for table sets, pipeline steps and previews.
pub struct MxIo;

impl MxIo {
    /// Infers a preview output format from the file extension.
    pub fn detect_format(path: impl AsRef<Path>) -> Option<MxIoFormat> {
        let ext = path
            .as_ref()
            .extension()?
            .to_string_lossy()
            .to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(MxIoFormat::Json),
            #[cfg(feature = "csv")]
            "csv" => Some(MxIoFormat::Csv(MxCsvOptions::default())),
            _ => None,
        }
    }

    /// Loads a table set from a JSON object of `key -> [row, ...]`.
    pub fn load_tables(path: impl AsRef<Path>) -> Result<MxTableSet> {
        let file = File::open(path)?;
        Self::load_tables_reader(BufReader::new(file))
    }

    pub fn load_tables_reader<R: Read>(reader: R) -> Result<MxTableSet> {
        let value: Value = serde_json::from_reader(reader)?;
        if !value.is_object() {
            return Err(MxError::config("table set must be a JSON object of tables"));
        }
        MxTableSet::from_json(value)
    }

    /// Loads pipeline steps from JSON or YAML (by extension).
    ///
    /// The document is either a list of steps or an object with a
    /// `transformations` list.
    pub fn load_steps(path: impl AsRef<Path>) -> Result<Vec<MxStep>> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let document: StepsDocument = if is_yaml(path) {
            serde_yaml::from_str(&text)?
        } else {
            serde_json::from_str(&text)?
        };
        Ok(document.into_steps())
    }

    /// Writes a preview in the given format.
    pub fn write_preview(
        path: impl AsRef<Path>,
        format: &MxIoFormat,
        preview: &MxTablePreview,
    ) -> Result<()> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        match format {
            MxIoFormat::Json => Self::write_preview_json(writer, preview),
            #[cfg(feature = "csv")]
            MxIoFormat::Csv(options) => Self::write_preview_csv(writer, options, preview),
        }
    }

    /// Writes the preview as a pretty-printed JSON document.
    pub fn write_preview_json<W: Write>(mut writer: W, preview: &MxTablePreview) -> Result<()> {
        serde_json::to_writer_pretty(&mut writer, preview)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    /// Writes the preview grid: a header row of columns, then one record per
    /// row with blank cells for missing and null values.
    #[cfg(feature = "csv")]
    pub fn write_preview_csv<W: Write>(
        writer: W,
        options: &MxCsvOptions,
        preview: &MxTablePreview,
    ) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(options.delimiter)
            .has_headers(false)
            .from_writer(writer);

        let grid = preview.sheet_values();
        let skip = usize::from(!options.has_headers);
        for row in grid.iter().skip(skip) {
            let cells: Vec<String> = row
                .iter()
                .map(|cell| match cell {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect();
            writer.write_record(&cells)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Loads one table from CSV. Integer and float cells become numbers and
    /// everything else stays a string.
    #[cfg(feature = "csv")]
    pub fn load_table_csv(path: impl AsRef<Path>, options: &MxCsvOptions) -> Result<MxTable> {
        let file = File::open(path)?;
        Self::load_table_csv_reader(BufReader::new(file), options)
    }

    #[cfg(feature = "csv")]
    pub fn load_table_csv_reader<R: Read>(reader: R, options: &MxCsvOptions) -> Result<MxTable> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .has_headers(options.has_headers)
            .from_reader(reader);

        let headers: Option<Vec<String>> = if options.has_headers {
            Some(reader.headers()?.iter().map(str::to_string).collect())
        } else {
            None
        };

        let mut table = MxTable::new();
        for record in reader.records() {
            let record = record?;
            let mut row = MxRow::new();
            for (idx, cell) in record.iter().enumerate() {
                let column = headers
                    .as_ref()
                    .and_then(|h| h.get(idx).cloned())
                    .unwrap_or_else(|| format!("column_{idx}"));
                row.insert(column, parse_cell(cell));
            }
            table.push(row);
        }
        Ok(table)
    }
}

#[cfg(feature = "csv")]
fn parse_cell(cell: &str) -> Value {
    if let Ok(int) = cell.parse::<i64>() {
        return Value::from(int);
    }
    match cell.parse::<f64>() {
        Ok(float) if float.is_finite() => crate::value::float_value(float),
        _ => Value::String(cell.to_string()),
    }
}
