// Copyright (c) Contributors to the Tenon project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/tenon-build/tenon

use std::sync::Arc;

use super::Solution;
use crate::unit_version;

#[test]
fn test_add_replaces_same_package() {
    let mut solution = Solution::default();
    solution.add(Arc::new(unit_version!("A", "1.0.0")));
    solution.add(Arc::new(unit_version!("B", "1.0.0")));
    solution.add(Arc::new(unit_version!("A", "2.0.0")));

    assert_eq!(solution.len(), 2);
    assert_eq!(solution.get("A").unwrap().version().to_string(), "2.0.0");
    // replacement keeps the original position
    let names: Vec<_> = solution
        .items()
        .map(|unit| unit.name().to_string())
        .collect();
    assert_eq!(names, vec!["A", "B"]);
}

#[test]
fn test_get_unknown_package() {
    let solution = Solution::default();
    assert!(solution.is_empty());
    assert!(solution.get("missing").is_none());
}

#[test]
fn test_versions_map() {
    let solution: Solution = [
        Arc::new(unit_version!("B", "1.0.0")),
        Arc::new(unit_version!("A", "2.0.0")),
    ]
    .into_iter()
    .collect();
    let versions = solution.versions();
    assert_eq!(versions.len(), 2);
    assert_eq!(versions["A"].to_string(), "2.0.0");
    assert_eq!(versions["B"].to_string(), "1.0.0");
}

#[test]
fn test_serialize_as_name_version_map() {
    let solution: Solution = [
        Arc::new(unit_version!("lib", "1.2.0")),
        Arc::new(unit_version!("app", "0.1.0")),
    ]
    .into_iter()
    .collect();
    let json = serde_json::to_value(&solution).unwrap();
    assert_eq!(json, serde_json::json!({"lib": "1.2.0", "app": "0.1.0"}));
}
