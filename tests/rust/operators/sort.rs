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

//! # Metrix Operator Tests - Sort

use serde_json::json;

use super::{apply, column, message};

/// Tests sorting campaigns by cost, highest first.
#[test]
fn test_sort_descending_by_cost() {
    let out = apply(
        "sort",
        json!({"source": "direct", "column": "cost", "descending": true}),
        json!({"direct": [
            {"campaign": "A", "cost": 10},
            {"campaign": "B", "cost": 250.5},
            {"campaign": "C", "cost": 99}
        ]}),
    )
    .unwrap();
    assert_eq!(
        column(&out, "direct", "campaign"),
        vec![json!("B"), json!("C"), json!("A")]
    );
}

/// Tests that ties keep their input order.
#[test]
fn test_sort_is_stable() {
    let out = apply(
        "sort",
        json!({"source": "s", "column": "k"}),
        json!({"s": [
            {"k": "b", "i": 0}, {"k": "a", "i": 1}, {"k": "b", "i": 2}, {"k": "a", "i": 3}
        ]}),
    )
    .unwrap();
    assert_eq!(column(&out, "s", "i"), vec![json!(1), json!(3), json!(0), json!(2)]);
}

/// Tests that numbers order before strings in mixed columns.
#[test]
fn test_sort_mixed_types() {
    let out = apply(
        "sort",
        json!({"source": "s", "column": "v"}),
        json!({"s": [{"v": "x"}, {"v": 2}, {"v": null}, {"v": 1}]}),
    )
    .unwrap();
    assert_eq!(
        column(&out, "s", "v"),
        vec![json!(null), json!(1), json!(2), json!("x")]
    );
}

/// Tests missing configuration keys.
#[test]
fn test_sort_requires_column() {
    let err = apply("sort", json!({"source": "s"}), json!({"s": []})).unwrap_err();
    assert_eq!(message(err), "sort requires: source, column");
}
