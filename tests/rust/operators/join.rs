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

//! # Metrix Operator Tests - Join

use serde_json::{json, Value};

use super::{apply, column, message};

fn sources() -> Value {
    json!({
        "direct": [
            {"campaign_id": "1", "cost": 100},
            {"campaign_id": "2", "cost": 200},
            {"campaign_id": "3", "cost": 300}
        ],
        "metrika": [
            {"campaign_id": "1", "visits": 10, "cost": 1},
            {"campaign_id": "1", "visits": 11, "cost": 2},
            {"campaign_id": "9", "visits": 90, "cost": 9}
        ]
    })
}

fn join(how: &str) -> metrix::MxTableSet {
    apply(
        "join",
        json!({"left": "direct", "right": "metrika", "on": "campaign_id", "how": how, "output": "joined"}),
        sources(),
    )
    .unwrap()
}

/// Tests inner join cardinality with a duplicated right key.
#[test]
fn test_join_inner_multiplies_matches() {
    let out = join("inner");
    assert_eq!(column(&out, "joined", "visits"), vec![json!(10), json!(11)]);
    assert_eq!(column(&out, "joined", "right_cost"), vec![json!(1), json!(2)]);
    assert_eq!(column(&out, "joined", "cost"), vec![json!(100), json!(100)]);
}

/// Tests that a left join keeps every left row in order.
#[test]
fn test_join_left_keeps_left_rows() {
    let out = join("left");
    assert_eq!(
        column(&out, "joined", "campaign_id"),
        vec![json!("1"), json!("1"), json!("2"), json!("3")]
    );
    assert_eq!(column(&out, "joined", "visits")[2], Value::Null);
}

/// Tests that an outer join emits unmatched right keys once, after left rows.
#[test]
fn test_join_outer_appends_unused_right_keys() {
    let out = join("outer");
    let ids = column(&out, "joined", "campaign_id");
    assert_eq!(ids.len(), 5);
    assert_eq!(ids[4], json!("9"));
    assert_eq!(column(&out, "joined", "cost")[4], json!(9));
}

/// Tests that a right join drops unmatched left rows.
#[test]
fn test_join_right() {
    let out = join("right");
    assert_eq!(
        column(&out, "joined", "campaign_id"),
        vec![json!("1"), json!("1"), json!("9")]
    );
}

/// Tests that the join defaults to inner and writes to the left key.
#[test]
fn test_join_defaults() {
    let out = apply(
        "join",
        json!({"left": "direct", "right": "metrika", "on": "campaign_id"}),
        sources(),
    )
    .unwrap();
    assert_eq!(out.get("direct").unwrap().len(), 2);
    assert_eq!(out.get("metrika").unwrap().len(), 3);
    assert_eq!(out.len(), 2);
}

/// Tests rows missing the join column match other rows missing it.
#[test]
fn test_join_missing_key_counts_as_empty() {
    let out = apply(
        "join",
        json!({"left": "l", "right": "r", "on": "k", "output": "o"}),
        json!({"l": [{"a": 1}], "r": [{"k": "", "b": 2}]}),
    )
    .unwrap();
    assert_eq!(column(&out, "o", "b"), vec![json!(2)]);
}

/// Tests the role-specific not-found messages.
#[test]
fn test_join_missing_right() {
    let err = apply(
        "join",
        json!({"left": "direct", "right": "nope", "on": "campaign_id"}),
        sources(),
    )
    .unwrap_err();
    assert_eq!(message(err), "Right source 'nope' not found");
}
