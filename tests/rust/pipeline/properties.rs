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

//! # Metrix Pipeline Tests - Properties
//!
//! Algebraic laws of the built-in operators checked with proptest.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test properties
//! ```

use std::collections::HashSet;

use metrix::{MxPipeline, MxStep, MxTableSet};
use proptest::prelude::*;
use serde_json::{json, Value};

fn table(key: &str, rows: Vec<Value>) -> MxTableSet {
    MxTableSet::from_json(json!({ key: rows })).unwrap()
}

fn run(steps: Vec<MxStep>, tables: &MxTableSet) -> MxTableSet {
    MxPipeline::new(steps).run(tables).unwrap()
}

fn column(tables: &MxTableSet, key: &str, column: &str) -> Vec<Value> {
    tables
        .get(key)
        .unwrap()
        .iter()
        .map(|row| row.get(column).cloned().unwrap_or(Value::Null))
        .collect()
}

proptest! {
    #[test]
    fn prop_sort_descending_reverses_ascending(values in proptest::collection::hash_set(-1000i64..1000, 0..40)) {
        let rows = values.iter().map(|v| json!({"v": v})).collect();
        let input = table("s", rows);

        let ascending = run(vec![MxStep::new("sort", json!({"source": "s", "column": "v"}))], &input);
        let descending = run(
            vec![MxStep::new("sort", json!({"source": "s", "column": "v", "descending": true}))],
            &ascending,
        );

        let mut expected = column(&ascending, "s", "v");
        expected.reverse();
        prop_assert_eq!(column(&descending, "s", "v"), expected);
    }

    #[test]
    fn prop_group_by_counts_cover_every_row(groups in proptest::collection::vec(0u8..6, 0..60)) {
        let rows = groups.iter().enumerate().map(|(i, g)| json!({"g": g, "v": i})).collect();
        let input = table("s", rows);
        let out = run(
            vec![MxStep::new(
                "group_by",
                json!({"source": "s", "columns": ["g"], "aggregations": {"v": "count"}}),
            )],
            &input,
        );

        let distinct: HashSet<u8> = groups.iter().copied().collect();
        prop_assert_eq!(out.get("s").unwrap().len(), distinct.len());
        let total: u64 = column(&out, "s", "v").iter().filter_map(Value::as_u64).sum();
        prop_assert_eq!(total as usize, groups.len());
    }

    #[test]
    fn prop_rename_round_trip(values in proptest::collection::vec((any::<i32>(), "[a-z]{0,8}"), 0..20)) {
        let rows = values.iter().map(|(n, s)| json!({"id": n, "name": s, "keep": true})).collect();
        let input = table("s", rows);
        let out = run(
            vec![
                MxStep::new("rename", json!({"source": "s", "mapping": {"id": "campaign_id", "name": "title"}})),
                MxStep::new("rename", json!({"source": "s", "mapping": {"campaign_id": "id", "title": "name"}})),
            ],
            &input,
        );
        prop_assert_eq!(out, input);
    }

    #[test]
    fn prop_inner_join_cardinality(
        left in proptest::collection::vec(0u8..5, 0..20),
        right in proptest::collection::vec(0u8..5, 0..20),
    ) {
        let input = MxTableSet::from_json(json!({
            "l": left.iter().map(|k| json!({"k": k, "a": 1})).collect::<Vec<_>>(),
            "r": right.iter().map(|k| json!({"k": k, "b": 2})).collect::<Vec<_>>(),
        }))
        .unwrap();
        let out = run(
            vec![MxStep::new("join", json!({"left": "l", "right": "r", "on": "k", "output": "o"}))],
            &input,
        );

        let expected: usize = left
            .iter()
            .map(|k| right.iter().filter(|r| *r == k).count())
            .sum();
        prop_assert_eq!(out.get("o").unwrap().len(), expected);
    }

    #[test]
    fn prop_left_join_without_matches_keeps_left(
        left in proptest::collection::vec(0u8..5, 0..20),
        right in proptest::collection::vec(10u8..15, 0..20),
    ) {
        let input = MxTableSet::from_json(json!({
            "l": left.iter().map(|k| json!({"k": k})).collect::<Vec<_>>(),
            "r": right.iter().map(|k| json!({"k": k, "b": 2})).collect::<Vec<_>>(),
        }))
        .unwrap();
        let out = run(
            vec![MxStep::new("join", json!({"left": "l", "right": "r", "on": "k", "how": "left"}))],
            &input,
        );
        prop_assert_eq!(out.get("l").unwrap().len(), left.len());
    }

    #[test]
    fn prop_division_by_zero_is_null(values in proptest::collection::vec(-1.0e6f64..1.0e6, 0..20)) {
        let rows = values.iter().map(|x| json!({"x": x})).collect();
        let input = table("s", rows);
        let out = run(
            vec![MxStep::new("calculate", json!({"source": "s", "output_column": "r", "formula": "x / 0"}))],
            &input,
        );
        prop_assert!(column(&out, "s", "r").iter().all(Value::is_null));
    }
}
