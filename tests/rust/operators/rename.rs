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

//! # Metrix Operator Tests - Rename

use serde_json::json;

use super::{apply, column, message};

/// Tests renaming API field names into report headers.
#[test]
fn test_rename_columns() {
    let out = apply(
        "rename",
        json!({"source": "direct", "mapping": {"CampaignName": "campaign", "Cost": "cost"}}),
        json!({"direct": [{"CampaignName": "brand", "Cost": 10, "Clicks": 3}]}),
    )
    .unwrap();
    let row = &out.get("direct").unwrap()[0];
    assert_eq!(row.keys().collect::<Vec<_>>(), vec!["campaign", "cost", "Clicks"]);
    assert_eq!(column(&out, "direct", "campaign"), vec![json!("brand")]);
}

/// Tests that swapping two names is applied per field, not sequentially.
#[test]
fn test_rename_swap() {
    let out = apply(
        "rename",
        json!({"source": "s", "mapping": {"a": "b", "b": "a"}}),
        json!({"s": [{"a": 1, "b": 2}]}),
    )
    .unwrap();
    assert_eq!(column(&out, "s", "a"), vec![json!(2)]);
    assert_eq!(column(&out, "s", "b"), vec![json!(1)]);
}

/// Tests missing configuration keys.
#[test]
fn test_rename_requires_mapping() {
    let err = apply("rename", json!({"source": "s"}), json!({"s": []})).unwrap_err();
    assert_eq!(message(err), "rename requires: source, mapping");
}
