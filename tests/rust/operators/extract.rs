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

//! # Metrix Operator Tests - Extract

use serde_json::json;

use super::{apply, column, message};

/// Tests pulling campaign ids out of UTM campaign names.
#[test]
fn test_extract_campaign_id_from_utm() {
    let out = apply(
        "extract",
        json!({"source": "metrika", "column": "utm_campaign", "pattern": r"cid(\d+)", "output_column": "campaign_id"}),
        json!({"metrika": [
            {"utm_campaign": "cid123_x", "visits": 100},
            {"utm_campaign": "brand", "visits": 7}
        ]}),
    )
    .unwrap();
    assert_eq!(column(&out, "metrika", "campaign_id"), vec![json!("123"), json!("brand")]);
    assert_eq!(column(&out, "metrika", "visits"), vec![json!(100), json!(7)]);
}

/// Tests that the pattern is searched anywhere in the value.
#[test]
fn test_extract_is_unanchored() {
    let out = apply(
        "extract",
        json!({"source": "s", "column": "c", "pattern": r"_(\w)$", "output_column": "o"}),
        json!({"s": [{"c": "prefix_a"}]}),
    )
    .unwrap();
    assert_eq!(column(&out, "s", "o"), vec![json!("a")]);
}

/// Tests that an optional group that did not participate yields null.
#[test]
fn test_extract_unmatched_optional_group() {
    let out = apply(
        "extract",
        json!({"source": "s", "column": "c", "pattern": r"x(\d+)?", "output_column": "o"}),
        json!({"s": [{"c": "x"}]}),
    )
    .unwrap();
    assert_eq!(column(&out, "s", "o"), vec![json!(null)]);
}

/// Tests that the output column may overwrite the input column.
#[test]
fn test_extract_in_place() {
    let out = apply(
        "extract",
        json!({"source": "s", "column": "c", "pattern": r"(\d+)", "output_column": "c"}),
        json!({"s": [{"c": "id-42"}]}),
    )
    .unwrap();
    assert_eq!(column(&out, "s", "c"), vec![json!("42")]);
}

/// Tests the invalid regex error message.
#[test]
fn test_extract_invalid_regex() {
    let err = apply(
        "extract",
        json!({"source": "s", "column": "c", "pattern": "(unclosed", "output_column": "o"}),
        json!({"s": []}),
    )
    .unwrap_err();
    assert!(message(err).starts_with("Invalid regex pattern:"));
}
