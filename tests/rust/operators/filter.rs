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

//! # Metrix Operator Tests - Filter

use serde_json::json;

use super::{apply, column, message};

/// Tests dropping campaigns without conversions.
#[test]
fn test_filter_gt_zero() {
    let out = apply(
        "filter",
        json!({"source": "direct", "column": "conversions", "operator": "gt", "value": 0}),
        json!({"direct": [
            {"campaign": "A", "conversions": 10},
            {"campaign": "B", "conversions": 0},
            {"campaign": "C"}
        ]}),
    )
    .unwrap();
    assert_eq!(column(&out, "direct", "campaign"), vec![json!("A")]);
}

/// Tests the not_null scenario from report previews.
#[test]
fn test_filter_not_null() {
    let out = apply(
        "filter",
        json!({"source": "s", "column": "v", "operator": "not_null"}),
        json!({"s": [{"v": 10}, {"v": null}, {"v": ""}, {"v": 20}]}),
    )
    .unwrap();
    assert_eq!(column(&out, "s", "v"), vec![json!(10), json!(20)]);
}

/// Tests that order is preserved for kept rows.
#[test]
fn test_filter_preserves_order() {
    let out = apply(
        "filter",
        json!({"source": "s", "column": "name", "operator": "contains", "value": "sale"}),
        json!({"s": [
            {"name": "z_sale"}, {"name": "brand"}, {"name": "a_sale"}, {"name": "sale_m"}
        ]}),
    )
    .unwrap();
    assert_eq!(
        column(&out, "s", "name"),
        vec![json!("z_sale"), json!("a_sale"), json!("sale_m")]
    );
}

/// Tests equality against a null value.
#[test]
fn test_filter_eq_null() {
    let out = apply(
        "filter",
        json!({"source": "s", "column": "v", "operator": "eq", "value": null}),
        json!({"s": [{"v": null}, {"v": 0}, {}]}),
    )
    .unwrap();
    assert_eq!(out.get("s").unwrap().len(), 2);
}

/// Tests the unknown operator message.
#[test]
fn test_filter_unknown_operator() {
    let err = apply(
        "filter",
        json!({"source": "s", "column": "v", "operator": "like", "value": "x"}),
        json!({"s": []}),
    )
    .unwrap_err();
    assert_eq!(message(err), "Unknown operator: like");
}
