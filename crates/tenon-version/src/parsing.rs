// Copyright (c) Contributors to the Tenon project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/tenon-build/tenon

//! Nom parsers for version strings, reusable from any grammar that
//! embeds a version (eg constraint expressions).

use nom::bytes::complete::take_while1;
use nom::character::complete::{char, digit1};
use nom::combinator::{map, map_res, opt, recognize};
use nom::error::{context, ContextError, FromExternalError, ParseError};
use nom::multi::separated_list1;
use nom::sequence::{pair, preceded};
use nom::IResult;

use crate::{PreReleaseId, PreReleaseTag, Version};

/// Parse a version string into a [`Version`].
///
/// A version is a dot-separated list of numbers, followed by an
/// optional pre-release tag and optional build metadata. The build
/// metadata is validated but discarded.
///
/// Examples:
/// - `"1.0"`
/// - `"1.0.0-rc.1"`
/// - `"1.2.3.4+build.0"`
pub fn version<'a, E>(input: &'a str) -> IResult<&'a str, Version, E>
where
    E: ParseError<&'a str>
        + ContextError<&'a str>
        + FromExternalError<&'a str, std::num::ParseIntError>,
{
    context(
        "version",
        map(
            pair(
                version_parts,
                pair(
                    opt(preceded(char('-'), pre_release_tag)),
                    opt(preceded(char('+'), build_metadata)),
                ),
            ),
            |(parts, (pre, _build))| Version {
                parts: parts.into(),
                pre: pre.unwrap_or_default(),
            },
        ),
    )(input)
}

/// Parse a pre-release tag into a [`PreReleaseTag`].
///
/// A tag is a dot-separated list of identifiers made up of letters
/// and digits, eg `"rc.1"` or `"alpha1"`.
pub fn pre_release_tag<'a, E>(input: &'a str) -> IResult<&'a str, PreReleaseTag, E>
where
    E: ParseError<&'a str> + ContextError<&'a str>,
{
    context(
        "pre_release_tag",
        map(
            separated_list1(char('.'), pre_release_id),
            PreReleaseTag::from,
        ),
    )(input)
}

fn pre_release_id<'a, E>(input: &'a str) -> IResult<&'a str, PreReleaseId, E>
where
    E: ParseError<&'a str>,
{
    map(
        take_while1(|c: char| c.is_ascii_alphanumeric()),
        PreReleaseId::from_ident,
    )(input)
}

fn version_parts<'a, E>(input: &'a str) -> IResult<&'a str, Vec<u32>, E>
where
    E: ParseError<&'a str> + FromExternalError<&'a str, std::num::ParseIntError>,
{
    separated_list1(char('.'), map_res(digit1, |n: &str| n.parse::<u32>()))(input)
}

fn build_metadata<'a, E>(input: &'a str) -> IResult<&'a str, &'a str, E>
where
    E: ParseError<&'a str>,
{
    recognize(separated_list1(
        char('.'),
        take_while1(|c: char| c.is_ascii_alphanumeric() || c == '-'),
    ))(input)
}
