// Copyright (c) Contributors to the Tenon project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/tenon-build/tenon

use std::collections::BTreeMap;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use once_cell::sync::Lazy;
use tenon_version::{Compatibility, Version};

use crate::constraint::{Constraint, Ranged};
use crate::unit::UnitVersion;

#[cfg(test)]
#[path = "./state_test.rs"]
mod state_test;

pub static EMPTY_STATE: Lazy<Arc<State>> = Lazy::new(State::empty);

/// A constraint in force during a resolve, together with the unit
/// that imposed it (or none, for caller-supplied constraints).
#[derive(Clone, Debug)]
pub struct ImposedConstraint {
    pub constraint: Arc<Constraint>,
    pub imposed_by: Option<Arc<UnitVersion>>,
}

impl ImposedConstraint {
    pub fn requested(constraint: Arc<Constraint>) -> Self {
        Self {
            constraint,
            imposed_by: None,
        }
    }

    pub fn required_by(constraint: Arc<Constraint>, unit: &Arc<UnitVersion>) -> Self {
        Self {
            constraint,
            imposed_by: Some(Arc::clone(unit)),
        }
    }
}

impl std::fmt::Display for ImposedConstraint {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match &self.imposed_by {
            Some(unit) => write!(f, "{} (required by {unit})", self.constraint),
            None => write!(f, "{} (requested)", self.constraint),
        }
    }
}

/// Some additional information left by the solver
#[derive(Clone, Debug)]
pub enum Note {
    Skip(SkipUnitNote),
    Missing(Arc<str>),
}

impl std::fmt::Display for Note {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Note::Skip(note) => note.fmt(f),
            Note::Missing(package) => write!(f, "{package} has no versions in the catalog"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SkipUnitNote {
    pub unit: Arc<UnitVersion>,
    pub reason: Compatibility,
}

impl SkipUnitNote {
    pub fn new(unit: Arc<UnitVersion>, reason: Compatibility) -> Self {
        SkipUnitNote { unit, reason }
    }

    pub fn new_from_message<S: ToString>(unit: Arc<UnitVersion>, reason: S) -> Self {
        SkipUnitNote {
            unit,
            reason: Compatibility::incompatible(reason),
        }
    }
}

impl std::fmt::Display for SkipUnitNote {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} - {}", self.unit, self.reason)
    }
}

/// One immutable point in the search space.
///
/// Every field is shared with the parent state; each `with_*`
/// constructor produces a new state that replaces only the field it
/// touches. Abandoning a branch therefore restores the parent's
/// frontier and constraint set without any bookkeeping.
#[derive(Clone, Debug)]
pub struct State {
    /// Every package name awaiting or holding a decision, in order of
    /// first appearance.
    requested: Arc<IndexSet<Arc<str>>>,
    /// Chosen units by package name, in decision order.
    decisions: Arc<IndexMap<Arc<str>, Arc<UnitVersion>>>,
    /// Constraints in force, grouped by target package.
    constraints: Arc<BTreeMap<Arc<str>, Vec<ImposedConstraint>>>,
    /// Versions from a previous solution, for cost functions only.
    previous: Arc<BTreeMap<Arc<str>, Version>>,
}

impl State {
    pub fn empty() -> Arc<Self> {
        Arc::new(Self {
            requested: Arc::new(IndexSet::new()),
            decisions: Arc::new(IndexMap::new()),
            constraints: Arc::new(BTreeMap::new()),
            previous: Arc::new(BTreeMap::new()),
        })
    }

    /// The first requested package that has no decision yet.
    pub fn next_undecided(&self) -> Option<&Arc<str>> {
        self.requested
            .iter()
            .find(|name| !self.decisions.contains_key(&***name))
    }

    pub fn is_complete(&self) -> bool {
        self.next_undecided().is_none()
    }

    pub fn decision(&self, name: &str) -> Option<&Arc<UnitVersion>> {
        self.decisions.get(name)
    }

    /// The chosen units, in the order they were decided.
    pub fn decisions(&self) -> impl Iterator<Item = &Arc<UnitVersion>> {
        self.decisions.values()
    }

    pub fn decision_count(&self) -> usize {
        self.decisions.len()
    }

    pub fn requested(&self) -> impl Iterator<Item = &Arc<str>> {
        self.requested.iter()
    }

    /// The constraints in force whose target is the named package.
    pub fn constraints_on(&self, name: &str) -> &[ImposedConstraint] {
        self.constraints
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Reports whether an exact constraint in force pins the named
    /// package to precisely this version.
    pub fn pinned_exactly(&self, name: &str, version: &Version) -> bool {
        self.constraints_on(name)
            .iter()
            .any(|imposed| imposed.constraint.spec().exact_version() == Some(version))
    }

    /// The version the previous solution held for this package, if
    /// one was supplied to the resolve call.
    pub fn previous_version(&self, name: &str) -> Option<&Version> {
        self.previous.get(name)
    }

    pub fn with_previous(&self, previous: BTreeMap<Arc<str>, Version>) -> Self {
        Self {
            requested: Arc::clone(&self.requested),
            decisions: Arc::clone(&self.decisions),
            constraints: Arc::clone(&self.constraints),
            previous: Arc::new(previous),
        }
    }

    /// Add package names to the frontier, keeping first-appearance
    /// order for names already present.
    pub fn with_requested<I>(&self, names: I) -> Self
    where
        I: IntoIterator<Item = Arc<str>>,
    {
        let mut requested = Arc::clone(&self.requested);
        let set = Arc::make_mut(&mut requested);
        for name in names {
            set.insert(name);
        }
        Self {
            requested,
            decisions: Arc::clone(&self.decisions),
            constraints: Arc::clone(&self.constraints),
            previous: Arc::clone(&self.previous),
        }
    }

    /// Bring constraints into force, adding their target packages to
    /// the frontier.
    pub fn with_constraints(&self, imposed: Vec<ImposedConstraint>) -> Self {
        let mut requested = Arc::clone(&self.requested);
        let mut constraints = Arc::clone(&self.constraints);
        {
            let requested = Arc::make_mut(&mut requested);
            let constraints = Arc::make_mut(&mut constraints);
            for imposed in imposed {
                let target = Arc::clone(imposed.constraint.package_arc());
                requested.insert(Arc::clone(&target));
                constraints.entry(target).or_default().push(imposed);
            }
        }
        Self {
            requested,
            decisions: Arc::clone(&self.decisions),
            constraints,
            previous: Arc::clone(&self.previous),
        }
    }

    /// Record the chosen unit for its package.
    ///
    /// The package is expected to already be on the frontier; the
    /// unit's dependencies and constraints are merged separately.
    pub fn with_decision(&self, unit: Arc<UnitVersion>) -> Self {
        let mut decisions = Arc::clone(&self.decisions);
        Arc::make_mut(&mut decisions).insert(Arc::clone(unit.name_arc()), unit);
        Self {
            requested: Arc::clone(&self.requested),
            decisions,
            constraints: Arc::clone(&self.constraints),
            previous: Arc::clone(&self.previous),
        }
    }
}
