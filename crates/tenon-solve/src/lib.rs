// Copyright (c) Contributors to the Tenon project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/tenon-build/tenon

//! Exact, cost-guided resolution of package version constraints.
//!
//! A [`Resolver`] holds a catalog of available [`UnitVersion`]s and
//! finds the assignment of one version per requested package that
//! minimizes a caller-provided [`CostFunction`], exploring the full
//! space of valid assignments with branch-and-bound pruning.

mod catalog;
mod constraint;
mod cost;
mod error;
mod format;
mod macros;
mod solution;
mod solver;
mod state;
mod unit;
mod validation;

#[cfg(test)]
mod fixtures;

pub use catalog::Catalog;
pub use constraint::{AnyVersion, CompatRange, Constraint, ExactVersion, Ranged, VersionSpec};
pub use cost::{version_weight, CostFunction, PreferPrevious};
pub use error::{Error, Result, UnresolvedPackage};
pub use format::{format_note, FormatError, FormatIdent, FormatSolution};
pub use solution::Solution;
pub use solver::{ResolveOptions, Resolver, SolverStatistics};
pub use state::{ImposedConstraint, Note, SkipUnitNote, State, EMPTY_STATE};
pub use tenon_version::{parse_version, Compatibility, Version};
pub use unit::UnitVersion;
pub use validation::{default_validators, ValidatorT, Validators};
