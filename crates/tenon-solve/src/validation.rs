// Copyright (c) Contributors to the Tenon project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/tenon-build/tenon

use enum_dispatch::enum_dispatch;
use tenon_version::Compatibility;

use crate::state::State;
use crate::unit::UnitVersion;

#[cfg(test)]
#[path = "./validation_test.rs"]
mod validation_test;

/// The default set of checks applied to every candidate unit.
pub const fn default_validators() -> &'static [Validators] {
    &[
        Validators::Constraints(ConstraintsValidator {}),
        Validators::PreRelease(PreReleaseValidator {}),
    ]
}

#[derive(Clone, Copy)]
#[enum_dispatch(ValidatorT)]
pub enum Validators {
    Constraints(ConstraintsValidator),
    PreRelease(PreReleaseValidator),
}

#[enum_dispatch]
pub trait ValidatorT {
    /// Check if the given unit is appropriate for the provided state.
    fn validate_unit(&self, state: &State, unit: &UnitVersion) -> Compatibility;
}

/// Ensures that a unit satisfies every constraint in force for its
/// package.
#[derive(Clone, Copy, Default)]
pub struct ConstraintsValidator {}

impl ValidatorT for ConstraintsValidator {
    fn validate_unit(&self, state: &State, unit: &UnitVersion) -> Compatibility {
        for imposed in state.constraints_on(unit.name()) {
            let compat = imposed.constraint.satisfied_by(unit);
            if !compat.is_ok() {
                return Compatibility::incompatible(format!("{compat} [{imposed}]"));
            }
        }
        Compatibility::Compatible
    }
}

/// Ensures that a pre-release version is only selected when an exact
/// constraint in force names that precise version.
#[derive(Clone, Copy, Default)]
pub struct PreReleaseValidator {}

impl ValidatorT for PreReleaseValidator {
    fn validate_unit(&self, state: &State, unit: &UnitVersion) -> Compatibility {
        if !unit.is_pre_release() {
            return Compatibility::Compatible;
        }
        if state.pinned_exactly(unit.name(), unit.version()) {
            return Compatibility::Compatible;
        }
        Compatibility::incompatible(
            "pre-release versions are not selected unless requested exactly",
        )
    }
}
