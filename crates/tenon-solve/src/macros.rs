// Copyright (c) Contributors to the Tenon project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/tenon-build/tenon

/// Create a version from an expression that is known to be valid.
#[macro_export]
macro_rules! version {
    ($version:expr) => {
        $crate::parse_version($version).expect("invalid version literal")
    };
}

/// Create a unit version from literals that are known to be valid.
///
/// The two-argument form uses the version itself as the earliest
/// compatible version.
#[macro_export]
macro_rules! unit_version {
    ($name:literal, $version:literal) => {
        $crate::UnitVersion::new($name, $crate::version!($version), $crate::version!($version))
    };
    ($name:literal, $version:literal, $ecv:literal) => {
        $crate::UnitVersion::new($name, $crate::version!($version), $crate::version!($ecv))
    };
}
