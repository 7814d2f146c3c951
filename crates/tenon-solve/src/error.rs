// Copyright (c) Contributors to the Tenon project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/tenon-build/tenon

use std::sync::Arc;

use miette::Diagnostic;
use tenon_version::Version;
use thiserror::Error;

use crate::state::{ImposedConstraint, Note};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Diagnostic, Debug, Error)]
#[diagnostic(
    url(
        "https://tenon.dev/error_codes#{}",
        self.code().unwrap_or_else(|| Box::new("tenon::generic"))
    )
)]
pub enum Error {
    #[diagnostic(code("tenon::solve::duplicate_unit"))]
    #[error("Duplicate unit: {package}/{version}")]
    DuplicateUnit { package: String, version: Version },

    #[diagnostic(code("tenon::solve::ecv_above_version"))]
    #[error(
        "Invalid unit {package}/{version}: earliest compatible version {earliest_compatible} is above the version itself"
    )]
    EcvAboveVersion {
        package: String,
        version: Version,
        earliest_compatible: Version,
    },

    #[diagnostic(code("tenon::solve::invalid_constraint"))]
    #[error("Invalid constraint expression '{expression}': {message}")]
    InvalidConstraint { expression: String, message: String },

    #[diagnostic(code("tenon::solve::unsatisfiable"))]
    #[error("Failed to resolve: no allowed version of {}", .0.package)]
    Unsatisfiable(#[from] Box<UnresolvedPackage>),

    #[diagnostic(code("tenon::solve::step_limit"))]
    #[error("Search stopped after {limit} steps without proving a result")]
    StepLimitReached { limit: u64 },
}

/// The deepest dead end reached by a failed search: the package that
/// could not be decided, the constraints that were in force on it,
/// and a note for every candidate that was tried.
#[derive(Diagnostic, Debug, Error)]
#[error("no allowed version of {package}")]
pub struct UnresolvedPackage {
    pub package: Arc<str>,
    pub conflicts: Vec<ImposedConstraint>,
    pub notes: Vec<Note>,
}
