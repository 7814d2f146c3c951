// Copyright (c) Contributors to the Tenon project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/tenon-build/tenon

use std::sync::Arc;

use super::{default_validators, ConstraintsValidator, PreReleaseValidator, ValidatorT, Validators};
use crate::{unit_version, Constraint, ImposedConstraint, EMPTY_STATE};

#[test]
fn test_constraints_validator_checks_all_in_force() {
    let validator = ConstraintsValidator {};
    let state = EMPTY_STATE.with_constraints(vec![ImposedConstraint::requested(Arc::new(
        Constraint::parse("A", "1.1.0").unwrap(),
    ))]);

    let good = unit_version!("A", "1.2.0", "1.0.0");
    assert!(validator.validate_unit(&state, &good).is_ok());

    let low = unit_version!("A", "1.0.0");
    let compat = validator.validate_unit(&state, &low);
    assert!(!compat.is_ok());
    assert!(
        compat.message().contains("A/1.1.0 (requested)"),
        "{}",
        compat.message()
    );
}

#[test]
fn test_constraints_validator_passes_unconstrained_packages() {
    let validator = ConstraintsValidator {};
    let unit = unit_version!("B", "0.1.0");
    assert!(validator.validate_unit(&EMPTY_STATE, &unit).is_ok());
}

#[test]
fn test_pre_release_validator_blocks_unpinned_pre_releases() {
    let validator = PreReleaseValidator {};
    let rc = unit_version!("A", "1.0.0-rc.1", "1.0.0-rc.1");
    let compat = validator.validate_unit(&EMPTY_STATE, &rc);
    assert!(!compat.is_ok());
    assert!(compat.message().contains("pre-release"));
}

#[test]
fn test_pre_release_validator_accepts_exact_pins() {
    let validator = PreReleaseValidator {};
    let rc = unit_version!("A", "1.0.0-rc.1", "1.0.0-rc.1");

    let pinned = EMPTY_STATE.with_constraints(vec![ImposedConstraint::requested(Arc::new(
        Constraint::parse("A", "=1.0.0-rc.1").unwrap(),
    ))]);
    assert!(validator.validate_unit(&pinned, &rc).is_ok());

    // a compatible-range constraint is not enough to unlock it
    let ranged = EMPTY_STATE.with_constraints(vec![ImposedConstraint::requested(Arc::new(
        Constraint::parse("A", "1.0.0-rc.1").unwrap(),
    ))]);
    assert!(!validator.validate_unit(&ranged, &rc).is_ok());
}

#[test]
fn test_pre_release_validator_ignores_releases() {
    let validator = PreReleaseValidator {};
    let release = unit_version!("A", "1.0.0");
    assert!(validator.validate_unit(&EMPTY_STATE, &release).is_ok());
}

#[test]
fn test_default_validators_check_constraints_first() {
    assert!(matches!(
        default_validators().first(),
        Some(Validators::Constraints(_))
    ));
}
