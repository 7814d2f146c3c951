// Copyright (c) Contributors to the Tenon project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/tenon-build/tenon

use std::sync::Arc;

use indexmap::IndexSet;
use tenon_version::Version;

use crate::constraint::Constraint;

/// One published version of one package.
///
/// A unit carries the dependency edges and constraints that come into
/// force whenever it is chosen. Units are mutable only while the
/// catalog is being populated; the resolver freezes them behind an
/// `Arc` on registration.
#[derive(Clone, Debug)]
pub struct UnitVersion {
    name: Arc<str>,
    version: Version,
    earliest_compatible: Version,
    dependencies: IndexSet<Arc<str>>,
    constraints: Vec<Arc<Constraint>>,
}

impl UnitVersion {
    pub fn new(name: impl Into<Arc<str>>, version: Version, earliest_compatible: Version) -> Self {
        Self {
            name: name.into(),
            version,
            earliest_compatible,
            dependencies: IndexSet::new(),
            constraints: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn name_arc(&self) -> &Arc<str> {
        &self.name
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    /// The oldest version that code built against this unit can still
    /// rely on.
    pub fn earliest_compatible(&self) -> &Version {
        &self.earliest_compatible
    }

    pub fn is_pre_release(&self) -> bool {
        self.version.is_pre_release()
    }

    /// Record that this unit requires the named package, at any
    /// version admitted by the constraints in force.
    pub fn add_dependency(&mut self, name: impl Into<Arc<str>>) {
        self.dependencies.insert(name.into());
    }

    /// Attach a constraint that comes into force when this unit is
    /// chosen. The target may be any package, including this one.
    pub fn add_constraint(&mut self, constraint: Arc<Constraint>) {
        self.constraints.push(constraint);
    }

    /// The names this unit requires, in declaration order.
    pub fn dependencies(&self) -> impl Iterator<Item = &Arc<str>> {
        self.dependencies.iter()
    }

    pub fn constraints(&self) -> &[Arc<Constraint>] {
        &self.constraints
    }
}

impl std::fmt::Display for UnitVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}/{}", self.name, self.version)
    }
}

impl PartialEq for UnitVersion {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.version == other.version
    }
}

impl Eq for UnitVersion {}

impl std::hash::Hash for UnitVersion {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.version.hash(state);
    }
}
