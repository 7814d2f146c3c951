// Copyright (c) Contributors to the Tenon project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/tenon-build/tenon

use colored::Colorize;
use itertools::Itertools;

use crate::error::Error;
use crate::solution::Solution;
use crate::state::Note;
use crate::unit::UnitVersion;

#[cfg(test)]
#[path = "./format_test.rs"]
mod format_test;

pub trait FormatIdent {
    fn format_ident(&self) -> String;
}

impl FormatIdent for UnitVersion {
    fn format_ident(&self) -> String {
        format!(
            "{}/{}",
            self.name().bold(),
            self.version().to_string().bright_blue()
        )
    }
}

pub trait FormatSolution {
    fn format_solution(&self, verbosity: u32) -> String;
}

impl FormatSolution for Solution {
    fn format_solution(&self, verbosity: u32) -> String {
        if self.is_empty() {
            return "Nothing Resolved".to_string();
        }
        let mut out = "Resolved Units:\n".to_string();
        for unit in self.items() {
            out.push_str(&format!("  {}", unit.format_ident()));
            if verbosity > 0 {
                let required_by = self
                    .items()
                    .filter(|other| {
                        other.dependencies().any(|dep| dep.as_ref() == unit.name())
                            || other
                                .constraints()
                                .iter()
                                .any(|constraint| constraint.package() == unit.name())
                    })
                    .map(ToString::to_string)
                    .join(", ");
                if required_by.is_empty() {
                    out.push_str(" (requested)");
                } else {
                    out.push_str(&format!(" (required by {required_by})"));
                }
            }
            out.push('\n');
        }
        out.push_str(&format!(" Number of Units: {}", self.len()));
        out
    }
}

pub trait FormatError {
    fn format_error(&self, verbosity: u32) -> String;
}

impl FormatError for Error {
    fn format_error(&self, verbosity: u32) -> String {
        let mut msg = "Failed to resolve".to_string();
        match self {
            Error::Unsatisfiable(failure) => {
                msg.push_str("\n * no allowed version of ");
                msg.push_str(&failure.package);
                if verbosity > 0 {
                    for conflict in &failure.conflicts {
                        msg.push_str(&format!("\n * required: {conflict}"));
                    }
                }
                if verbosity > 1 {
                    for note in &failure.notes {
                        msg.push_str(&format!("\n * {}", format_note(note)));
                    }
                }
            }
            Error::StepLimitReached { limit } => {
                msg.push_str(&format!(
                    "\n * stopped after {limit} steps; a solution may still exist"
                ));
            }
            err => {
                msg.push_str(&format!("\n * {err}"));
            }
        }
        match verbosity {
            0 => {
                msg.push_str(
                    &"\n * try '--verbose/-v' for more info"
                        .dimmed()
                        .yellow()
                        .to_string(),
                );
            }
            1 => {
                msg.push_str(
                    &"\n * try '-vv' for even more info"
                        .dimmed()
                        .yellow()
                        .to_string(),
                );
            }
            2 => {
                msg.push_str(
                    &"\n * try '-vvv' for even more info"
                        .dimmed()
                        .yellow()
                        .to_string(),
                );
            }
            3.. => (),
        }
        msg
    }
}

pub fn format_note(note: &Note) -> String {
    match note {
        Note::Skip(note) => {
            format!(
                "{} {} - {}",
                "TRY".magenta(),
                note.unit.format_ident(),
                note.reason
            )
        }
        Note::Missing(package) => {
            format!(
                "{} {} has no versions in the catalog",
                "MISSING".magenta(),
                package.bold()
            )
        }
    }
}
