// Copyright (c) Contributors to the Tenon project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/tenon-build/tenon

use std::sync::Arc;

use rstest::{fixture, rstest};

use super::{ResolveOptions, Resolver};
use crate::{
    unit_version, version_weight, Error, FormatSolution, Note, PreferPrevious, Solution, State,
    UnitVersion,
};

macro_rules! assert_resolved {
    ($solution:expr, $pkg:literal, $version:literal) => {{
        let resolved = $solution
            .get($pkg)
            .unwrap_or_else(|| panic!("{} expected in solution", $pkg));
        assert_eq!(
            resolved.version(),
            &$crate::version!($version),
            "wrong version for {}",
            $pkg
        );
    }};
}

#[fixture]
fn resolver() -> Resolver {
    crate::fixtures::init_logging();
    Resolver::new()
}

fn add_unit(
    resolver: &mut Resolver,
    name: &str,
    version: &str,
    ecv: &str,
    deps: &[&str],
    constraints: &[(&str, &str)],
) -> Arc<UnitVersion> {
    let mut unit = UnitVersion::new(name, crate::version!(version), crate::version!(ecv));
    for dep in deps {
        unit.add_dependency(*dep);
    }
    for (package, expression) in constraints {
        let constraint = resolver.get_constraint(package, expression).unwrap();
        unit.add_constraint(constraint);
    }
    resolver.add_unit_version(unit).unwrap()
}

fn prefer_high(state: &State) -> f64 {
    -state
        .decisions()
        .map(|unit| version_weight(unit.version()))
        .sum::<f64>()
}

#[rstest]
fn test_exact_chain_with_shared_requirement(mut resolver: Resolver) {
    add_unit(
        &mut resolver,
        "A",
        "1.0.0",
        "1.0.0",
        &["B", "F"],
        &[("B", "=1.0.0"), ("F", "1.1.0")],
    );
    add_unit(
        &mut resolver,
        "B",
        "1.0.0",
        "1.0.0",
        &["C", "D", "F"],
        &[("C", "=1.0.0"), ("F", "1.0.0")],
    );
    add_unit(&mut resolver, "B", "2.0.0", "2.0.0", &[], &[]);
    add_unit(&mut resolver, "C", "1.0.0", "1.0.0", &[], &[]);
    add_unit(&mut resolver, "C", "2.0.0", "2.0.0", &[], &[]);
    add_unit(&mut resolver, "D", "1.0.0", "1.0.0", &[], &[]);
    add_unit(
        &mut resolver,
        "D",
        "1.1.0",
        "1.0.0",
        &["E"],
        &[("E", "=1.0.0")],
    );
    add_unit(&mut resolver, "E", "1.0.0", "1.0.0", &[], &[]);
    add_unit(&mut resolver, "E", "1.1.0", "1.0.0", &[], &[]);
    add_unit(&mut resolver, "F", "1.0.0", "1.0.0", &[], &[]);
    add_unit(&mut resolver, "F", "1.1.0", "1.0.0", &[], &[]);
    add_unit(&mut resolver, "F", "1.2.0", "1.0.0", &[], &[]);

    let solution = resolver
        .resolve(&["A"], &[], ResolveOptions::new(&prefer_high))
        .unwrap();

    assert_eq!(solution.len(), 6);
    assert_resolved!(solution, "A", "1.0.0");
    assert_resolved!(solution, "B", "1.0.0");
    assert_resolved!(solution, "C", "1.0.0");
    assert_resolved!(solution, "D", "1.1.0");
    assert_resolved!(solution, "E", "1.0.0");
    assert_resolved!(solution, "F", "1.2.0");

    // units come out in decision order, which follows first appearance
    let order: Vec<_> = solution
        .items()
        .map(|unit| unit.name().to_string())
        .collect();
    assert_eq!(order, vec!["A", "B", "F", "C", "D", "E"]);

    // every dependency and constraint target made it into the solution
    for unit in solution.items() {
        for dep in unit.dependencies() {
            assert!(solution.get(dep.as_ref()).is_some(), "{dep} is missing");
        }
        for constraint in unit.constraints() {
            let chosen = solution
                .get(constraint.package())
                .expect("constraint target resolved");
            assert!(constraint.satisfied_by(chosen).is_ok());
        }
    }

    colored::control::set_override(false);
    let rendered = solution.format_solution(1);
    assert!(
        rendered.contains("F/1.2.0 (required by A/1.0.0, B/1.0.0)"),
        "{rendered}"
    );
}

#[rstest]
fn test_constant_cost_keeps_the_first_complete_state(mut resolver: Resolver) {
    add_unit(&mut resolver, "A", "1.0.0", "1.0.0", &["C"], &[("C", "1.0.0")]);
    for v in ["1.0.0", "1.1.0", "1.2.0"] {
        add_unit(&mut resolver, "C", v, "1.0.0", &[], &[]);
    }

    let constant = |_: &State| 0.0;
    let solution = resolver
        .resolve(&["A"], &[], ResolveOptions::new(&constant))
        .unwrap();
    // versions enumerate newest first, and ties keep the first found
    assert_resolved!(solution, "C", "1.2.0");
    assert_eq!(resolver.statistics().solutions_found, 3);
}

#[rstest]
fn test_cost_overrides_enumeration_order(mut resolver: Resolver) {
    add_unit(&mut resolver, "A", "1.0.0", "1.0.0", &["C"], &[("C", "1.0.0")]);
    for v in ["1.0.0", "1.1.0", "1.2.0"] {
        add_unit(&mut resolver, "C", v, "1.0.0", &[], &[]);
    }

    let prefer_low = |state: &State| {
        state
            .decisions()
            .map(|unit| version_weight(unit.version()))
            .sum::<f64>()
    };
    let solution = resolver
        .resolve(&["A"], &[], ResolveOptions::new(&prefer_low))
        .unwrap();
    assert_resolved!(solution, "C", "1.0.0");
}

#[rstest]
fn test_previous_solution_steers_the_result(mut resolver: Resolver) {
    for v in ["1.0.0", "1.1.0"] {
        add_unit(&mut resolver, "A", v, "1.0.0", &["C"], &[]);
        add_unit(&mut resolver, "B", v, "1.0.0", &["C"], &[]);
    }
    add_unit(&mut resolver, "C", "1.0.0", "1.0.0", &[], &[]);

    let previous: Solution = [Arc::new(unit_version!("B", "1.0.0"))].into_iter().collect();
    let cost = PreferPrevious::default();
    let solution = resolver
        .resolve(
            &["A", "B"],
            &[],
            ResolveOptions::new(&cost).with_previous_solution(&previous),
        )
        .unwrap();

    // A was not pinned down before, so the newest wins; B stays put
    assert_resolved!(solution, "A", "1.1.0");
    assert_resolved!(solution, "B", "1.0.0");
    assert_resolved!(solution, "C", "1.0.0");
    // the bound from the partial cost lets whole branches be skipped
    assert!(resolver.statistics().branches_pruned >= 1);
}

#[rstest]
fn test_previous_solution_avoids_a_forced_upgrade(mut resolver: Resolver) {
    // A/1.0.0 would force B up to 1.1.0; A/1.1.0 brings in C and
    // leaves B alone
    add_unit(&mut resolver, "A", "1.0.0", "1.0.0", &["B"], &[("B", "1.1.0")]);
    add_unit(&mut resolver, "A", "1.1.0", "1.0.0", &["C"], &[("C", "1.0.0")]);
    add_unit(&mut resolver, "B", "1.0.0", "1.0.0", &[], &[]);
    add_unit(&mut resolver, "B", "1.1.0", "1.0.0", &[], &[]);
    add_unit(&mut resolver, "C", "1.0.0", "1.0.0", &[], &[]);

    let previous: Solution = [Arc::new(unit_version!("B", "1.0.0"))].into_iter().collect();
    let cost = PreferPrevious::default();
    let solution = resolver
        .resolve(
            &["A", "B"],
            &[],
            ResolveOptions::new(&cost).with_previous_solution(&previous),
        )
        .unwrap();

    // the upgrade-free branch wins even though it resolves an extra unit
    assert_eq!(solution.len(), 3);
    assert_resolved!(solution, "A", "1.1.0");
    assert_resolved!(solution, "B", "1.0.0");
    assert_resolved!(solution, "C", "1.0.0");
}

#[rstest]
fn test_pre_releases_need_an_exact_request(mut resolver: Resolver) {
    add_unit(&mut resolver, "A", "1.0.0", "1.0.0", &[], &[]);
    add_unit(&mut resolver, "A", "1.1.0-rc.1", "1.1.0-rc.1", &[], &[]);

    let solution = resolver
        .resolve(&["A"], &[], ResolveOptions::new(&prefer_high))
        .unwrap();
    assert_resolved!(solution, "A", "1.0.0");
    let stats = resolver.statistics();
    assert_eq!(stats.problem_packages().get("A"), Some(&1));
    assert!(stats
        .skip_frequency()
        .keys()
        .any(|reason| reason.contains("pre-release")));

    let pin = resolver.get_constraint("A", "=1.1.0-rc.1").unwrap();
    let solution = resolver
        .resolve(&["A"], &[pin], ResolveOptions::new(&prefer_high))
        .unwrap();
    assert_eq!(solution.len(), 1);
    assert_resolved!(solution, "A", "1.1.0-rc.1");
}

#[rstest]
fn test_constraint_targets_are_resolved_too(mut resolver: Resolver) {
    add_unit(&mut resolver, "A", "1.0.0", "1.0.0", &[], &[("B", "1.0.0")]);
    add_unit(&mut resolver, "B", "1.0.0", "1.0.0", &[], &[]);
    add_unit(&mut resolver, "B", "1.1.0", "1.0.0", &[], &[]);

    let constant = |_: &State| 0.0;
    let solution = resolver
        .resolve(&["A"], &[], ResolveOptions::new(&constant))
        .unwrap();
    // B is not a dependency of A, but A's constraint pulls it in
    assert_eq!(solution.len(), 2);
    assert_resolved!(solution, "B", "1.1.0");
}

#[rstest]
fn test_own_constraints_are_rechecked_against_the_decision(mut resolver: Resolver) {
    add_unit(&mut resolver, "A", "2.0.0", "2.0.0", &[], &[("A", "=1.0.0")]);
    add_unit(&mut resolver, "A", "1.0.0", "1.0.0", &[], &[]);

    let constant = |_: &State| 0.0;
    let solution = resolver
        .resolve(&["A"], &[], ResolveOptions::new(&constant))
        .unwrap();
    assert_resolved!(solution, "A", "1.0.0");
    assert!(resolver.statistics().candidates_skipped >= 1);
}

#[rstest]
fn test_late_constraints_check_existing_decisions(mut resolver: Resolver) {
    add_unit(&mut resolver, "B", "2.0.0", "2.0.0", &[], &[]);
    add_unit(&mut resolver, "B", "1.0.0", "1.0.0", &[], &[]);
    add_unit(&mut resolver, "C", "1.0.0", "1.0.0", &[], &[("B", "=1.0.0")]);

    let constant = |_: &State| 0.0;
    let solution = resolver
        .resolve(&["B", "C"], &[], ResolveOptions::new(&constant))
        .unwrap();
    // B/2.0.0 is tried first and C's constraint forces a backtrack
    assert_resolved!(solution, "B", "1.0.0");
    assert_resolved!(solution, "C", "1.0.0");
}

#[rstest]
fn test_unsatisfiable_reports_deepest_conflict(mut resolver: Resolver) {
    add_unit(&mut resolver, "A", "1.0.0", "1.0.0", &["C"], &[("C", "=1.0.0")]);
    add_unit(&mut resolver, "B", "1.0.0", "1.0.0", &["C"], &[("C", "=2.0.0")]);
    add_unit(&mut resolver, "C", "1.0.0", "1.0.0", &[], &[]);
    add_unit(&mut resolver, "C", "2.0.0", "2.0.0", &[], &[]);

    let constant = |_: &State| 0.0;
    let err = resolver
        .resolve(&["A", "B"], &[], ResolveOptions::new(&constant))
        .unwrap_err();
    match err {
        Error::Unsatisfiable(failure) => {
            assert_eq!(&*failure.package, "C");
            assert_eq!(failure.conflicts.len(), 2);
            assert_eq!(failure.notes.len(), 2);
        }
        other => panic!("expected Unsatisfiable, got {other}"),
    }
}

#[rstest]
fn test_missing_package_is_a_dead_end(mut resolver: Resolver) {
    add_unit(&mut resolver, "A", "1.0.0", "1.0.0", &["ghost"], &[]);

    let constant = |_: &State| 0.0;
    let err = resolver
        .resolve(&["A"], &[], ResolveOptions::new(&constant))
        .unwrap_err();
    match err {
        Error::Unsatisfiable(failure) => {
            assert_eq!(&*failure.package, "ghost");
            assert!(matches!(failure.notes.as_slice(), [Note::Missing(_)]));
        }
        other => panic!("expected Unsatisfiable, got {other}"),
    }
}

#[rstest]
fn test_step_limit_stops_the_search(mut resolver: Resolver) {
    for v in ["1.0.0", "1.1.0"] {
        add_unit(&mut resolver, "A", v, "1.0.0", &[], &[]);
        add_unit(&mut resolver, "B", v, "1.0.0", &[], &[]);
    }

    let constant = |_: &State| 0.0;
    let err = resolver
        .resolve(
            &["A", "B"],
            &[],
            ResolveOptions::new(&constant).with_max_steps(1),
        )
        .unwrap_err();
    assert!(matches!(err, Error::StepLimitReached { limit: 1 }));
}

#[rstest]
fn test_step_limit_applies_even_after_a_solution_is_found(mut resolver: Resolver) {
    for v in ["1.0.0", "1.1.0", "1.2.0"] {
        add_unit(&mut resolver, "A", v, "1.0.0", &["B"], &[]);
        add_unit(&mut resolver, "B", v, "1.0.0", &[], &[]);
    }

    // two steps are enough to reach complete states under A/1.2.0,
    // but not to prove them optimal
    let constant = |_: &State| 0.0;
    let result = resolver.resolve(
        &["A"],
        &[],
        ResolveOptions::new(&constant).with_max_steps(2),
    );
    assert!(matches!(result, Err(Error::StepLimitReached { .. })));
}

#[rstest]
fn test_empty_request_resolves_to_nothing(mut resolver: Resolver) {
    let constant = |_: &State| 0.0;
    let solution = resolver
        .resolve(&[], &[], ResolveOptions::new(&constant))
        .unwrap();
    assert!(solution.is_empty());
    assert_eq!(resolver.statistics().solutions_found, 1);
    assert_eq!(resolver.statistics().steps, 0);
}

#[rstest]
fn test_resolving_twice_gives_the_same_answer(mut resolver: Resolver) {
    add_unit(&mut resolver, "A", "1.0.0", "1.0.0", &["B"], &[]);
    add_unit(&mut resolver, "B", "1.0.0", "1.0.0", &[], &[]);
    add_unit(&mut resolver, "B", "1.1.0", "1.0.0", &[], &[]);

    let first = resolver
        .resolve(&["A"], &[], ResolveOptions::new(&prefer_high))
        .unwrap();
    let steps = resolver.statistics().steps;
    let second = resolver
        .resolve(&["A"], &[], ResolveOptions::new(&prefer_high))
        .unwrap();
    assert_eq!(first.versions(), second.versions());
    assert_eq!(resolver.statistics().steps, steps);
}

#[rstest]
fn test_statistics_track_the_search(mut resolver: Resolver) {
    add_unit(&mut resolver, "A", "1.0.0", "1.0.0", &["B"], &[]);
    add_unit(&mut resolver, "B", "1.0.0", "1.0.0", &[], &[]);
    add_unit(&mut resolver, "B", "1.1.0", "1.0.0", &[], &[]);

    let constant = |_: &State| 0.0;
    resolver
        .resolve(&["A"], &[], ResolveOptions::new(&constant))
        .unwrap();
    let stats = resolver.statistics();
    assert_eq!(stats.steps, 2);
    assert_eq!(stats.solutions_found, 2);
    assert_eq!(stats.candidates_skipped, 0);
    assert_eq!(stats.branches_pruned, 0);
}

#[rstest]
fn test_constraints_are_interned(mut resolver: Resolver) {
    let first = resolver.get_constraint("A", "=1.0.0").unwrap();
    let second = resolver.get_constraint("A", "=1.0.0").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    let different = resolver.get_constraint("A", "=1.0.1").unwrap();
    assert!(!Arc::ptr_eq(&first, &different));
}

#[rstest]
fn test_reset_clears_the_catalog(mut resolver: Resolver) {
    add_unit(&mut resolver, "A", "1.0.0", "1.0.0", &[], &[]);
    resolver.reset();

    let constant = |_: &State| 0.0;
    let err = resolver
        .resolve(&["A"], &[], ResolveOptions::new(&constant))
        .unwrap_err();
    assert!(matches!(err, Error::Unsatisfiable(_)));
}
