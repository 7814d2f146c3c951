// Copyright (c) Contributors to the Tenon project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/tenon-build/tenon

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use tenon_version::Compatibility;

use crate::catalog::Catalog;
use crate::constraint::Constraint;
use crate::cost::CostFunction;
use crate::error::{Error, Result, UnresolvedPackage};
use crate::solution::Solution;
use crate::state::{ImposedConstraint, Note, SkipUnitNote, State, EMPTY_STATE};
use crate::unit::UnitVersion;
use crate::validation::{self, ValidatorT, Validators};

#[cfg(test)]
#[path = "./solver_test.rs"]
mod solver_test;

/// Counters collected over the course of one resolve call.
#[derive(Clone, Debug, Default)]
pub struct SolverStatistics {
    /// Frontier packages taken up for enumeration.
    pub steps: u64,
    /// Candidate units rejected by a validator or a conflict check.
    pub candidates_skipped: u64,
    /// Branches abandoned because their bound could not beat the
    /// best solution found so far.
    pub branches_pruned: u64,
    /// Complete states reached, improving or not.
    pub solutions_found: u64,
    skip_frequency: HashMap<String, u64>,
    problem_packages: HashMap<String, u64>,
}

impl SolverStatistics {
    /// How often each rejection reason was seen.
    pub fn skip_frequency(&self) -> &HashMap<String, u64> {
        &self.skip_frequency
    }

    /// Packages whose candidates were rejected, by rejection count.
    pub fn problem_packages(&self) -> &HashMap<String, u64> {
        &self.problem_packages
    }

    fn record_skip(&mut self, unit: &UnitVersion, reason: &Compatibility) {
        self.candidates_skipped += 1;
        *self
            .skip_frequency
            .entry(reason.message().to_owned())
            .or_default() += 1;
        *self
            .problem_packages
            .entry(unit.name().to_owned())
            .or_default() += 1;
    }
}

/// Per-call settings for [`Resolver::resolve`].
pub struct ResolveOptions<'a> {
    cost: &'a dyn CostFunction,
    previous_solution: Option<&'a Solution>,
    max_steps: Option<u64>,
}

impl<'a> ResolveOptions<'a> {
    pub fn new(cost: &'a dyn CostFunction) -> Self {
        Self {
            cost,
            previous_solution: None,
            max_steps: None,
        }
    }

    /// Make a previous solution's versions visible to the cost
    /// function, for stability-preferring costs.
    pub fn with_previous_solution(mut self, previous: &'a Solution) -> Self {
        self.previous_solution = Some(previous);
        self
    }

    /// Give up once this many steps have been taken.
    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = Some(max_steps);
        self
    }
}

/// Resolves package constraints against a catalog of unit versions,
/// returning the lowest-cost solution under a caller-provided cost
/// function.
pub struct Resolver {
    catalog: Catalog,
    constraints: HashMap<(Arc<str>, String), Arc<Constraint>>,
    validators: Cow<'static, [Validators]>,
    statistics: SolverStatistics,
}

impl Default for Resolver {
    fn default() -> Self {
        Self {
            catalog: Catalog::new(),
            constraints: HashMap::new(),
            validators: Cow::from(validation::default_validators()),
            statistics: SolverStatistics::default(),
        }
    }
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a unit version so the solver can consider it.
    pub fn add_unit_version(&mut self, unit: UnitVersion) -> Result<Arc<UnitVersion>> {
        self.catalog.add_unit_version(unit)
    }

    /// Parse a constraint expression, reusing the existing object
    /// when the same package and expression were seen before.
    pub fn get_constraint(&mut self, package: &str, expression: &str) -> Result<Arc<Constraint>> {
        let key = (Arc::<str>::from(package), expression.to_owned());
        if let Some(existing) = self.constraints.get(&key) {
            return Ok(Arc::clone(existing));
        }
        let constraint = Arc::new(Constraint::parse(Arc::clone(&key.0), expression)?);
        self.constraints.insert(key, Arc::clone(&constraint));
        Ok(constraint)
    }

    /// The counters from the most recent resolve call.
    pub fn statistics(&self) -> &SolverStatistics {
        &self.statistics
    }

    /// Put this resolver back into its default state.
    pub fn reset(&mut self) {
        self.catalog = Catalog::new();
        self.constraints.clear();
        self.validators = Cow::from(validation::default_validators());
        self.statistics = SolverStatistics::default();
    }

    /// Find the lowest-cost assignment of one unit version to each
    /// requested package, honoring every constraint that comes into
    /// force along the way.
    ///
    /// `roots` are the initially requested packages and
    /// `extra_constraints` are enforced as if requested by the
    /// caller. Their targets are resolved too.
    pub fn resolve(
        &mut self,
        roots: &[&str],
        extra_constraints: &[Arc<Constraint>],
        options: ResolveOptions,
    ) -> Result<Solution> {
        self.statistics = SolverStatistics::default();

        let mut state = match options.previous_solution {
            Some(previous) => EMPTY_STATE.with_previous(
                previous
                    .items()
                    .map(|unit| (Arc::clone(unit.name_arc()), unit.version().clone()))
                    .collect(),
            ),
            None => (**EMPTY_STATE).clone(),
        };
        state = state.with_requested(roots.iter().map(|name| Arc::from(*name)));
        state = state.with_constraints(
            extra_constraints
                .iter()
                .map(|constraint| ImposedConstraint::requested(Arc::clone(constraint)))
                .collect(),
        );
        let root = Arc::new(state);

        let mut search = Search {
            catalog: &self.catalog,
            validators: &self.validators,
            cost: options.cost,
            max_steps: options.max_steps,
            statistics: &mut self.statistics,
            best: None,
            deepest: None,
        };
        search.explore(&root)?;
        let Search { best, deepest, .. } = search;

        match best {
            Some((cost, state)) => {
                tracing::debug!(
                    cost,
                    steps = self.statistics.steps,
                    "resolve complete"
                );
                Ok(state.decisions().cloned().collect())
            }
            None => {
                let (_, failure) =
                    deepest.expect("an unsatisfiable search records at least one dead end");
                Err(Error::Unsatisfiable(Box::new(failure)))
            }
        }
    }
}

/// The mutable context of one resolve call.
struct Search<'a> {
    catalog: &'a Catalog,
    validators: &'a [Validators],
    cost: &'a dyn CostFunction,
    max_steps: Option<u64>,
    statistics: &'a mut SolverStatistics,
    /// The best complete state found so far, with its cost.
    best: Option<(f64, Arc<State>)>,
    /// The deepest dead end seen, by number of decisions made.
    deepest: Option<(usize, UnresolvedPackage)>,
}

impl Search<'_> {
    /// Exhaustively enumerate the completions of `state`, keeping the
    /// cheapest complete state and the deepest dead end.
    fn explore(&mut self, state: &Arc<State>) -> Result<()> {
        let Some(package) = state.next_undecided().map(Arc::clone) else {
            let cost = self.cost.cost(state);
            self.statistics.solutions_found += 1;
            let improved = match &self.best {
                Some((best, _)) => cost < *best,
                None => true,
            };
            if improved {
                tracing::debug!(cost, "complete state improves on the best so far");
                self.best = Some((cost, Arc::clone(state)));
            }
            return Ok(());
        };

        if let (Some((best, _)), Some(bound)) = (&self.best, self.cost.lower_bound(state)) {
            if bound >= *best {
                self.statistics.branches_pruned += 1;
                tracing::trace!(bound, best = *best, "pruning branch that cannot improve");
                return Ok(());
            }
        }

        self.statistics.steps += 1;
        if let Some(limit) = self.max_steps {
            if self.statistics.steps > limit {
                return Err(Error::StepLimitReached { limit });
            }
        }

        if !self.catalog.contains_package(&package) {
            tracing::debug!(package = %package, "package has no versions in the catalog");
            self.record_dead_end(state, &package, vec![Note::Missing(Arc::clone(&package))]);
            return Ok(());
        }

        let catalog = self.catalog;
        let mut notes = Vec::new();
        let mut descended = false;
        for unit in catalog.versions_descending(&package) {
            let compat = self.validate_unit(state, unit);
            if !&compat {
                self.statistics.record_skip(unit, &compat);
                tracing::trace!(unit = %unit, reason = %compat, "candidate rejected");
                notes.push(Note::Skip(SkipUnitNote::new(Arc::clone(unit), compat)));
                continue;
            }

            let next = state
                .with_decision(Arc::clone(unit))
                .with_requested(unit.dependencies().map(Arc::clone))
                .with_constraints(
                    unit.constraints()
                        .iter()
                        .map(|constraint| {
                            ImposedConstraint::required_by(Arc::clone(constraint), unit)
                        })
                        .collect(),
                );

            // The constraints this unit imposes may contradict a
            // decision already made, including its own.
            if let Some(reason) = conflicting_decision(&next, unit) {
                self.statistics.record_skip(unit, &reason);
                tracing::trace!(unit = %unit, reason = %reason, "candidate conflicts with an earlier decision");
                notes.push(Note::Skip(SkipUnitNote::new(Arc::clone(unit), reason)));
                continue;
            }

            descended = true;
            self.explore(&Arc::new(next))?;
        }

        if !descended {
            self.record_dead_end(state, &package, notes);
        }
        Ok(())
    }

    /// Run each configured validator, stopping at the first
    /// incompatibility.
    fn validate_unit(&self, state: &State, unit: &UnitVersion) -> Compatibility {
        for validator in self.validators.iter() {
            let compat = validator.validate_unit(state, unit);
            if !&compat {
                return compat;
            }
        }
        Compatibility::Compatible
    }

    /// Keep the failure whose state had the most decisions; ties keep
    /// the first seen.
    fn record_dead_end(&mut self, state: &State, package: &Arc<str>, notes: Vec<Note>) {
        let depth = state.decision_count();
        if self
            .deepest
            .as_ref()
            .is_some_and(|(deepest, _)| *deepest >= depth)
        {
            return;
        }
        self.deepest = Some((
            depth,
            UnresolvedPackage {
                package: Arc::clone(package),
                conflicts: state.constraints_on(package).to_vec(),
                notes,
            },
        ));
    }
}

/// Check the constraints imposed by `unit` against the decisions
/// already present in `state`.
fn conflicting_decision(state: &State, unit: &UnitVersion) -> Option<Compatibility> {
    for constraint in unit.constraints() {
        if let Some(existing) = state.decision(constraint.package()) {
            let compat = constraint.satisfied_by(existing);
            if !&compat {
                return Some(Compatibility::incompatible(format!(
                    "constraint {constraint} is not satisfied by the decided {existing}: {compat}"
                )));
            }
        }
    }
    None
}
