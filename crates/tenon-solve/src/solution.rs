// Copyright (c) Contributors to the Tenon project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/tenon-build/tenon

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tenon_version::Version;

use crate::unit::UnitVersion;

#[cfg(test)]
#[path = "./solution_test.rs"]
mod solution_test;

/// Represents a set of resolved units.
#[derive(Clone, Debug, Default)]
pub struct Solution {
    resolved: Vec<Arc<UnitVersion>>,
}

impl Solution {
    pub fn add(&mut self, unit: Arc<UnitVersion>) {
        match self
            .resolved
            .iter_mut()
            .find(|existing| existing.name() == unit.name())
        {
            None => self.resolved.push(unit),
            Some(existing) => {
                *existing = unit;
            }
        }
    }

    pub fn get<S: AsRef<str>>(&self, name: S) -> Option<&Arc<UnitVersion>> {
        self.resolved
            .iter()
            .find(|unit| unit.name() == name.as_ref())
    }

    pub fn items(&self) -> std::slice::Iter<'_, Arc<UnitVersion>> {
        self.resolved.iter()
    }

    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }

    /// The resolved versions by package name.
    pub fn versions(&self) -> BTreeMap<String, Version> {
        self.resolved
            .iter()
            .map(|unit| (unit.name().to_string(), unit.version().clone()))
            .collect()
    }
}

impl FromIterator<Arc<UnitVersion>> for Solution {
    fn from_iter<T: IntoIterator<Item = Arc<UnitVersion>>>(iter: T) -> Self {
        let mut solution = Solution::default();
        for unit in iter {
            solution.add(unit);
        }
        solution
    }
}

impl Serialize for Solution {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_map(self.resolved.iter().map(|unit| (unit.name(), unit.version())))
    }
}
