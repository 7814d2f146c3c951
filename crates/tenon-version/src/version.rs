// Copyright (c) Contributors to the Tenon project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/tenon-build/tenon

use std::cmp::{Ord, Ordering};
use std::convert::TryFrom;
use std::ops::{Deref, DerefMut};
use std::str::FromStr;

use itertools::Itertools;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::{Error, Result};

#[cfg(test)]
#[path = "./version_test.rs"]
mod version_test;

pub const VERSION_SEP: &str = ".";
pub const PRE_RELEASE_SEP: &str = "-";

/// Denotes that an invalid version number was given.
#[derive(Debug, Error)]
#[error("Invalid version: {message}")]
pub struct InvalidVersionError {
    pub message: String,
}

impl InvalidVersionError {
    pub fn new_error(msg: String) -> Error {
        Error::InvalidVersionError(Self { message: msg })
    }
}

/// A single identifier within a pre-release tag.
///
/// Identifiers made up entirely of digits compare numerically and
/// order below any identifier containing letters.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum PreReleaseId {
    Numeric(u32),
    Alphanumeric(String),
}

impl PreReleaseId {
    /// Classify a raw identifier, treating it as numeric when possible.
    pub fn from_ident(ident: &str) -> Self {
        match ident.parse::<u32>() {
            Ok(num) => Self::Numeric(num),
            Err(_) => Self::Alphanumeric(ident.to_string()),
        }
    }
}

impl std::fmt::Display for PreReleaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Numeric(num) => write!(f, "{num}"),
            Self::Alphanumeric(ident) => f.write_str(ident),
        }
    }
}

/// PreReleaseTag holds the dot-separated identifiers that mark a
/// version as preceding its own release (eg the `rc.1` in `1.0.0-rc.1`).
///
/// An empty tag denotes a release. The empty/non-empty distinction is
/// handled by [`Version`]'s ordering, not here: tags themselves compare
/// identifier by identifier, with a longer list winning when it extends
/// an otherwise equal prefix.
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PreReleaseTag {
    pub ids: Vec<PreReleaseId>,
}

impl PreReleaseTag {
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl Deref for PreReleaseTag {
    type Target = Vec<PreReleaseId>;

    fn deref(&self) -> &Self::Target {
        &self.ids
    }
}

impl From<Vec<PreReleaseId>> for PreReleaseTag {
    fn from(ids: Vec<PreReleaseId>) -> Self {
        Self { ids }
    }
}

impl std::fmt::Display for PreReleaseTag {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(&self.ids.iter().join(VERSION_SEP))
    }
}

/// The numeric portion of a version.
#[derive(Clone, Debug, Default)]
pub struct VersionParts {
    pub parts: Vec<u32>,
}

impl Deref for VersionParts {
    type Target = Vec<u32>;

    fn deref(&self) -> &Self::Target {
        &self.parts
    }
}

impl DerefMut for VersionParts {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.parts
    }
}

impl From<Vec<u32>> for VersionParts {
    fn from(parts: Vec<u32>) -> Self {
        Self { parts }
    }
}

impl std::cmp::PartialEq for VersionParts {
    fn eq(&self, other: &Self) -> bool {
        let self_last_nonzero_digit = self.parts.iter().rposition(|d| d != &0);
        let other_last_nonzero_digit = other.parts.iter().rposition(|d| d != &0);

        match (self_last_nonzero_digit, other_last_nonzero_digit) {
            (Some(self_last), Some(other_last)) => {
                self.parts[..=self_last] == other.parts[..=other_last]
            }
            (None, None) => true,
            _ => false,
        }
    }
}

impl std::cmp::Eq for VersionParts {}

impl std::hash::Hash for VersionParts {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        // trailing zeros do not alter the hash/cmp for a version
        if let Some(last_nonzero) = self.parts.iter().rposition(|d| d != &0) {
            self.parts[..=last_nonzero].hash(state)
        };
    }
}

impl PartialOrd for VersionParts {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VersionParts {
    fn cmp(&self, other: &Self) -> Ordering {
        let self_parts = self.parts.iter();
        let mut other_parts = other.parts.iter();

        for self_part in self_parts {
            match other_parts.next() {
                Some(other_part) => match self_part.cmp(other_part) {
                    Ordering::Equal => continue,
                    res => return res,
                },
                None if self_part == &0 => {
                    // having more parts than the other only makes
                    // us greater if it's a non-zero value
                    // eg: 1.2.0 == 1.2.0.0.0
                    continue;
                }
                None => {
                    // we have more base parts than other
                    return Ordering::Greater;
                }
            }
        }

        match other_parts.max() {
            // same as above, having more parts only matters
            // if they are non-zero
            None | Some(0) => Ordering::Equal,
            Some(_) => {
                // other has more base parts than we do
                Ordering::Less
            }
        }
    }
}

/// Version specifies a package version number.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Version {
    pub parts: VersionParts,
    pub pre: PreReleaseTag,
}

impl<S> std::cmp::PartialEq<S> for Version
where
    S: AsRef<str>,
{
    fn eq(&self, other: &S) -> bool {
        match Self::from_str(other.as_ref()) {
            Ok(v) => self == &v,
            Err(_) => false,
        }
    }
}

impl Version {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Version {
            parts: vec![major, minor, patch].into(),
            ..Default::default()
        }
    }

    /// Build a new version number from any number of digits
    pub fn from_parts<P: IntoIterator<Item = u32>>(parts: P) -> Self {
        Version {
            parts: parts.into_iter().collect::<Vec<_>>().into(),
            ..Default::default()
        }
    }

    /// The major version number (first component)
    pub fn major(&self) -> u32 {
        self.parts.first().copied().unwrap_or_default()
    }

    /// The minor version number (second component)
    pub fn minor(&self) -> u32 {
        self.parts.get(1).copied().unwrap_or_default()
    }

    /// The patch version number (third component)
    pub fn patch(&self) -> u32 {
        self.parts.get(2).copied().unwrap_or_default()
    }

    /// The base integer portion of this version as a string
    pub fn base(&self) -> String {
        let mut part_strings: Vec<_> = self.parts.iter().map(ToString::to_string).collect();
        if part_strings.is_empty() {
            // the base version cannot ever be an empty string, as that
            // is not a valid version
            part_strings.push(String::from("0"));
        }
        part_strings.join(VERSION_SEP)
    }

    /// Reports if this version precedes its own release.
    pub fn is_pre_release(&self) -> bool {
        !self.pre.is_empty()
    }
}

impl From<VersionParts> for Version {
    fn from(parts: VersionParts) -> Self {
        Self {
            parts,
            ..Default::default()
        }
    }
}

impl TryFrom<&str> for Version {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        parse_version(value)
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        parse_version(s)
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(&self.base())?;
        if !self.pre.is_empty() {
            f.write_str(PRE_RELEASE_SEP)?;
            std::fmt::Display::fmt(&self.pre, f)?;
        }
        Ok(())
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.parts.cmp(&other.parts) {
            Ordering::Equal => (),
            res => return res,
        }

        // a release orders above any of its own pre-releases
        match (self.pre.is_empty(), other.pre.is_empty()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self.pre.cmp(&other.pre),
        }
    }
}

/// Parse a string as a version specifier.
///
/// Any trailing build metadata (eg the `+build.4` in `1.0.0+build.4`)
/// is validated and discarded, as it never affects ordering or
/// compatibility.
pub fn parse_version<S: AsRef<str>>(version: S) -> Result<Version> {
    use nom::combinator::all_consuming;

    let version = version.as_ref();
    all_consuming(crate::parsing::version::<nom::error::VerboseError<_>>)(version)
        .map(|(_, v)| v)
        .map_err(|err| match err {
            nom::Err::Error(e) | nom::Err::Failure(e) => {
                InvalidVersionError::new_error(nom::error::convert_error(version, e))
            }
            nom::Err::Incomplete(_) => unreachable!(),
        })
}

impl Serialize for Version {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct VersionVisitor;
        impl<'de> serde::de::Visitor<'de> for VersionVisitor {
            type Value = Version;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a version number (eg: 1.0.0, 1.0.0-rc.1, 1.2.3.4+build.0)")
            }

            fn visit_str<E>(self, value: &str) -> std::result::Result<Version, E>
            where
                E: serde::de::Error,
            {
                Version::from_str(value).map_err(serde::de::Error::custom)
            }
        }
        deserializer.deserialize_str(VersionVisitor)
    }
}
