// Copyright (c) Contributors to the Tenon project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/tenon-build/tenon

use tenon_version::Version;

use crate::state::State;

#[cfg(test)]
#[path = "./cost_test.rs"]
mod cost_test;

/// Scores candidate solutions so the solver can find the cheapest one.
pub trait CostFunction {
    /// The cost of a state; lower is better.
    fn cost(&self, state: &State) -> f64;

    /// An optimistic bound on the cost of any completion of the given
    /// partial state.
    ///
    /// Returning a value lets the solver abandon branches that cannot
    /// beat the best solution found so far. The bound must never
    /// exceed the true cost of any completion; an overestimate makes
    /// the search skip valid solutions.
    fn lower_bound(&self, _state: &State) -> Option<f64> {
        None
    }
}

impl<F> CostFunction for F
where
    F: Fn(&State) -> f64,
{
    fn cost(&self, state: &State) -> f64 {
        self(state)
    }
}

/// Penalizes every decision that deviates from the previous solution
/// supplied to the resolve call.
#[derive(Clone, Copy, Debug)]
pub struct PreferPrevious {
    pub penalty: f64,
}

impl Default for PreferPrevious {
    fn default() -> Self {
        Self { penalty: 100.0 }
    }
}

impl CostFunction for PreferPrevious {
    fn cost(&self, state: &State) -> f64 {
        let deviations = state
            .decisions()
            .filter(|unit| {
                state
                    .previous_version(unit.name())
                    .is_some_and(|previous| previous != unit.version())
            })
            .count();
        self.penalty * deviations as f64
    }

    // A deviation never disappears as the state grows, so the cost of
    // the partial state is already a valid bound.
    fn lower_bound(&self, state: &State) -> Option<f64> {
        Some(self.cost(state))
    }
}

/// A scalar that orders versions by their numeric parts, for cost
/// functions that prefer higher (or lower) versions.
///
/// Assumes every part stays below 1000; the pre-release tag is
/// ignored.
pub fn version_weight(version: &Version) -> f64 {
    version
        .parts
        .iter()
        .enumerate()
        .fold(0.0, |weight, (i, part)| {
            weight + f64::from(*part) / 1000f64.powi(i as i32)
        })
}
