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

//! # Metrix Core Tests - IO
//!
//! Table sets and steps loaded from disk, previews written back.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test io
//! ```

use std::fs;

use metrix::{MxIo, MxIoFormat, MxPipeline};
use serde_json::{json, Value};
use tempfile::tempdir;

/// Tests a full file round: tables and steps in, preview out.
#[test]
fn test_load_run_and_write_json() {
    let dir = tempdir().unwrap();
    let tables_path = dir.path().join("tables.json");
    let steps_path = dir.path().join("steps.json");
    let out_path = dir.path().join("preview.json");

    fs::write(
        &tables_path,
        json!({"direct": [{"campaign": "A", "cost": 3}, {"campaign": "B", "cost": 7}]}).to_string(),
    )
    .unwrap();
    fs::write(
        &steps_path,
        json!([{"type": "sort", "source": "direct", "column": "cost", "descending": true}]).to_string(),
    )
    .unwrap();

    let tables = MxIo::load_tables(&tables_path).unwrap();
    let steps = MxIo::load_steps(&steps_path).unwrap();
    let out = MxPipeline::new(steps).run_owned(tables).unwrap();
    MxIo::write_preview(&out_path, &MxIoFormat::Json, &out.preview_first()).unwrap();

    let written: Value = serde_json::from_str(&fs::read_to_string(&out_path).unwrap()).unwrap();
    assert_eq!(written["columns"], json!(["campaign", "cost"]));
    assert_eq!(written["data"][0]["campaign"], json!("B"));
    assert_eq!(written["row_count"], json!(2));
}

/// Tests steps embedded in a YAML report-like document.
#[test]
fn test_load_steps_from_yaml_document() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("report.yml");
    fs::write(
        &path,
        "transformations:\n  - type: rename\n    source: direct\n    mapping:\n      Cost: cost\n  - type: sort\n    source: direct\n    column: cost\n",
    )
    .unwrap();

    let steps = MxIo::load_steps(&path).unwrap();
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0].kind, "rename");
    assert_eq!(steps[1].config.get("column"), Some(&json!("cost")));
}

/// Tests that a missing file surfaces as an io error.
#[test]
fn test_missing_tables_file() {
    let dir = tempdir().unwrap();
    let err = MxIo::load_tables(dir.path().join("absent.json")).unwrap_err();
    assert!(err.to_string().starts_with("io error"));
}

/// Tests CSV preview files.
#[cfg(feature = "csv")]
#[test]
fn test_write_csv_preview() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("preview.csv");
    let tables = metrix::MxTableSet::from_json(json!({
        "direct": [{"campaign": "A, B", "cost": 1.5}, {"campaign": "C"}]
    }))
    .unwrap();

    let format = MxIo::detect_format(&path).unwrap();
    MxIo::write_preview(&path, &format, &tables.preview_first()).unwrap();
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "campaign,cost\n\"A, B\",1.5\nC,\n"
    );
}

/// Tests loading a CSV export as a table.
#[cfg(feature = "csv")]
#[test]
fn test_load_csv_table() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("direct.csv");
    fs::write(&path, "campaign_id,cost\n123,1000\n456,12.5\n").unwrap();

    let table = MxIo::load_table_csv(&path, &Default::default()).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table[1]["cost"], json!(12.5));
}
