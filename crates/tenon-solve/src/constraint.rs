// Copyright (c) Contributors to the Tenon project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/tenon-build/tenon

use std::fmt::{Display, Write};
use std::str::FromStr;
use std::sync::Arc;

use enum_dispatch::enum_dispatch;
use nom::branch::alt;
use nom::character::complete::char;
use nom::combinator::map;
use nom::error::{ContextError, FromExternalError, ParseError};
use nom::sequence::preceded;
use nom::IResult;
use tenon_version::{Compatibility, Version};

use crate::unit::UnitVersion;
use crate::{Error, Result};

#[cfg(test)]
#[path = "./constraint_test.rs"]
mod constraint_test;

/// The set of versions a constraint expression admits.
#[enum_dispatch]
pub trait Ranged: Display + Clone + Into<VersionSpec> {
    /// The version pinned by this spec, if it admits exactly one.
    fn exact_version(&self) -> Option<&Version> {
        None
    }

    /// Check the given unit's version against this spec.
    fn satisfied_by(&self, unit: &UnitVersion) -> Compatibility;
}

/// Admits every known version of the package.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct AnyVersion {}

impl Ranged for AnyVersion {
    fn satisfied_by(&self, _unit: &UnitVersion) -> Compatibility {
        Compatibility::Compatible
    }
}

impl Display for AnyVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_char('*')
    }
}

/// Admits exactly one version, even when it is a pre-release.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ExactVersion {
    version: Version,
}

impl ExactVersion {
    pub fn new(version: Version) -> Self {
        Self { version }
    }
}

impl Ranged for ExactVersion {
    fn exact_version(&self) -> Option<&Version> {
        Some(&self.version)
    }

    fn satisfied_by(&self, unit: &UnitVersion) -> Compatibility {
        if unit.version() == &self.version {
            Compatibility::Compatible
        } else {
            Compatibility::incompatible(format!(
                "version {} does not equal {}",
                unit.version(),
                self
            ))
        }
    }
}

impl Display for ExactVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_char('=')?;
        f.write_str(&self.version.to_string())
    }
}

/// Admits versions at or above a baseline whose compatibility still
/// reaches back down to it.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct CompatRange {
    base: Version,
}

impl CompatRange {
    pub fn new(base: Version) -> Self {
        Self { base }
    }
}

impl Ranged for CompatRange {
    fn satisfied_by(&self, unit: &UnitVersion) -> Compatibility {
        if unit.version() < &self.base {
            return Compatibility::incompatible(format!("version too low for >= {}", self.base));
        }
        let earliest = unit.earliest_compatible();
        if earliest > &self.base {
            return Compatibility::incompatible(format!(
                "earliest compatible version {earliest} is too high for {}",
                self.base
            ));
        }
        Compatibility::Compatible
    }
}

impl Display for CompatRange {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(&self.base.to_string())
    }
}

/// Specifies a range of versions in a constraint expression.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[enum_dispatch(Ranged)]
pub enum VersionSpec {
    Any(AnyVersion),
    Compat(CompatRange),
    Equals(ExactVersion),
}

impl Display for VersionSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            VersionSpec::Any(vs) => vs.fmt(f),
            VersionSpec::Compat(vs) => vs.fmt(f),
            VersionSpec::Equals(vs) => vs.fmt(f),
        }
    }
}

fn version_spec<'a, E>(input: &'a str) -> IResult<&'a str, VersionSpec, E>
where
    E: ParseError<&'a str>
        + ContextError<&'a str>
        + FromExternalError<&'a str, std::num::ParseIntError>,
{
    alt((
        map(preceded(char('='), tenon_version::parsing::version), |v| {
            VersionSpec::Equals(ExactVersion::new(v))
        }),
        map(char('*'), |_| VersionSpec::Any(AnyVersion::default())),
        map(tenon_version::parsing::version, |v| {
            VersionSpec::Compat(CompatRange::new(v))
        }),
    ))(input)
}

impl FromStr for VersionSpec {
    type Err = Error;

    fn from_str(spec_str: &str) -> Result<Self> {
        use nom::combinator::{all_consuming, eof};
        use nom::error::convert_error;

        all_consuming(alt((
            version_spec,
            // Allow empty input to be treated like "*"
            map(eof, |_| VersionSpec::Any(AnyVersion::default())),
        )))(spec_str)
        .map(|(_, spec)| spec)
        .map_err(|err| match err {
            nom::Err::Error(e) | nom::Err::Failure(e) => Error::InvalidConstraint {
                expression: spec_str.to_owned(),
                message: convert_error(spec_str, e),
            },
            nom::Err::Incomplete(_) => unreachable!(),
        })
    }
}

/// A requirement on one package, pairing its name with the version
/// spec a chosen unit must satisfy.
///
/// The resolver interns constraints by `(package, expression)` so that
/// structurally identical requirements share one allocation.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Constraint {
    package: Arc<str>,
    spec: VersionSpec,
}

impl Constraint {
    pub fn new(package: impl Into<Arc<str>>, spec: VersionSpec) -> Self {
        Self {
            package: package.into(),
            spec,
        }
    }

    /// Parse `expression` as a constraint on the named package.
    pub fn parse(package: impl Into<Arc<str>>, expression: &str) -> Result<Self> {
        Ok(Self::new(package, VersionSpec::from_str(expression)?))
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub(crate) fn package_arc(&self) -> &Arc<str> {
        &self.package
    }

    pub fn spec(&self) -> &VersionSpec {
        &self.spec
    }

    /// Check the given unit against this constraint's version spec.
    pub fn satisfied_by(&self, unit: &UnitVersion) -> Compatibility {
        self.spec.satisfied_by(unit)
    }
}

impl Display for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}/{}", self.package, self.spec)
    }
}
