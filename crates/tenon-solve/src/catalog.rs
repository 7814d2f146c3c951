// Copyright (c) Contributors to the Tenon project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/tenon-build/tenon

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tenon_version::Version;

use crate::unit::UnitVersion;
use crate::{Error, Result};

#[cfg(test)]
#[path = "./catalog_test.rs"]
mod catalog_test;

/// The registry of every known unit, indexed by package name and
/// version.
///
/// A catalog is populated before a resolve begins and is read-only
/// while the search runs.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    units: HashMap<Arc<str>, BTreeMap<Version, Arc<UnitVersion>>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a unit, freezing it for use by the search.
    ///
    /// Registration fails when the same `(name, version)` pair is
    /// already present (versions compare equal regardless of trailing
    /// zeros) or when the unit claims a compatibility baseline above
    /// its own version.
    pub fn add_unit_version(&mut self, unit: UnitVersion) -> Result<Arc<UnitVersion>> {
        if unit.earliest_compatible() > unit.version() {
            return Err(Error::EcvAboveVersion {
                package: unit.name().to_owned(),
                version: unit.version().clone(),
                earliest_compatible: unit.earliest_compatible().clone(),
            });
        }

        let unit = Arc::new(unit);
        let versions = self.units.entry(Arc::clone(unit.name_arc())).or_default();
        match versions.entry(unit.version().clone()) {
            std::collections::btree_map::Entry::Occupied(_) => Err(Error::DuplicateUnit {
                package: unit.name().to_owned(),
                version: unit.version().clone(),
            }),
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(Arc::clone(&unit));
                Ok(unit)
            }
        }
    }

    /// Reports whether any unit was registered for the named package.
    pub fn contains_package(&self, name: &str) -> bool {
        self.units.contains_key(name)
    }

    /// All units of the named package, newest first.
    ///
    /// Yields nothing when the package is unknown.
    pub fn versions_descending(&self, name: &str) -> impl Iterator<Item = &Arc<UnitVersion>> {
        self.units
            .get(name)
            .into_iter()
            .flat_map(|versions| versions.values().rev())
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
