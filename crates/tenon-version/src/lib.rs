// Copyright (c) Contributors to the Tenon project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/tenon-build/tenon

//! Package version identifiers and their total ordering.
//!
//! A [`Version`] is a dot-separated sequence of numeric parts with an
//! optional pre-release tag. Releases order above their pre-releases
//! (`1.0.0-rc.1 < 1.0.0`) and trailing zeros never matter
//! (`1.0 == 1.0.0`).

mod compat;
mod error;
pub mod parsing;
mod version;

pub use compat::Compatibility;
pub use error::{Error, Result};
pub use version::{
    parse_version,
    InvalidVersionError,
    PreReleaseId,
    PreReleaseTag,
    Version,
    VersionParts,
    PRE_RELEASE_SEP,
    VERSION_SEP,
};
