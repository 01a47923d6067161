//! Engine properties over seeded random scenarios.
//!
//! Scenarios are generated from a `ChaCha8Rng` so every failure is
//! reproducible from its seed.

use deadsim_core::{LogKind, Session};
use deadsim_engine::{abort_process, advance, get_metrics, initialize, release_process};
use deadsim_types::{AlgorithmType, ResourceKind, Scenario};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

const SEEDS: u64 = 64;
const TICK_LIMIT: usize = 500;

/// Build a random scenario whose every claim fits within the totals.
///
/// With `distinct` set, no process requests the same kind twice.
fn random_scenario(rng: &mut ChaCha8Rng, algorithm: AlgorithmType, distinct: bool) -> Scenario {
    let kind_count = rng.gen_range(1..=4);
    let mut kinds: Vec<ResourceKind> = ResourceKind::ALL
        .choose_multiple(rng, kind_count)
        .copied()
        .collect();
    kinds.sort();

    let mut scenario = Scenario::new().with_algorithm(algorithm);
    let mut amounts = BTreeMap::new();
    for &kind in &kinds {
        let amount = rng.gen_range(1..=3);
        amounts.insert(kind, amount);
        scenario = scenario.with_resource(kind, amount);
    }

    for p in 0..rng.gen_range(2..=5) {
        let mut order = Vec::new();
        let mut counts: BTreeMap<ResourceKind, u32> = BTreeMap::new();
        for _ in 0..rng.gen_range(1..=4) {
            let kind = kinds[rng.gen_range(0..kinds.len())];
            let used = counts.entry(kind).or_insert(0);
            let limit = if distinct { 1 } else { amounts[&kind] };
            if *used < limit {
                *used += 1;
                order.push(kind);
            }
        }
        scenario = scenario.with_process(format!("p{p}"), format!("P{p}"), order);
    }

    let mut priority = kinds.clone();
    priority.shuffle(rng);
    scenario = scenario.with_prevention_priority(priority);

    assert!(scenario.validate().is_ok(), "generator produced {scenario:?}");
    scenario
}

fn totals(scenario: &Scenario) -> Vec<(ResourceKind, u32)> {
    scenario.resources.iter().map(|r| (r.kind, r.amount)).collect()
}

fn assert_conserved(session: &Session, totals: &[(ResourceKind, u32)]) {
    for &(kind, total) in totals {
        assert_eq!(
            session.total_of(kind),
            total,
            "{kind} not conserved at t={}",
            session.t
        );
    }
}

fn actions_at(session: &Session, t: u64) -> usize {
    session
        .logs_at(t)
        .filter(|l| matches!(l.kind, LogKind::Grant | LogKind::Prevention))
        .count()
}

/// Drive a session to completion, force-finishing the first unfinished
/// process on every deadlock, checking per-tick invariants along the way.
fn drive(scenario: &Scenario) -> Session {
    let totals = totals(scenario);
    let mut s = initialize(scenario);

    for _ in 0..TICK_LIMIT {
        if s.all_done() {
            break;
        }
        if s.deadlock {
            let victim = s
                .procs
                .iter()
                .find(|p| !p.is_done())
                .map(|p| p.id.clone())
                .unwrap();
            s = release_process(&s, &victim);
            assert!(!s.deadlock);
            assert_conserved(&s, &totals);
            continue;
        }

        let before = s.clone();
        s = advance(&s);

        assert_eq!(s.t, before.t + 1);
        assert_conserved(&s, &totals);
        assert!(actions_at(&s, s.t) <= 1, "more than one action at t={}", s.t);

        for (old, new) in before.procs.iter().zip(s.procs.iter()) {
            if old.is_done() {
                assert_eq!(old.ptr, new.ptr);
                assert_eq!(old.holding, new.holding);
                assert!(new.is_done());
            }
        }
    }
    s
}

#[test]
fn test_prevention_terminates_without_deadlock() {
    for seed in 0..SEEDS {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let scenario = random_scenario(&mut rng, AlgorithmType::Prevention, true);
        let end = drive(&scenario);

        assert!(end.all_done(), "seed {seed} did not finish: {scenario:?}");
        assert_eq!(end.deadlocks_count, 0, "seed {seed}");
        assert_eq!(get_metrics(&end).manual_aborts, 0);
    }
}

#[test]
fn test_avoidance_acts_every_tick() {
    for seed in 0..SEEDS {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let scenario = random_scenario(&mut rng, AlgorithmType::Avoidance, false);
        let requests: usize = scenario
            .processes
            .iter()
            .map(|p| p.allocation_order.len())
            .sum();

        let end = drive(&scenario);
        assert!(end.all_done(), "seed {seed} did not finish: {scenario:?}");
        assert_eq!(end.deadlocks_count, 0, "seed {seed}");
        // Safe states always admit a grant, so no tick is wasted
        assert_eq!(end.t as usize, requests, "seed {seed}");
    }
}

#[test]
fn test_detection_recovers_through_releases() {
    for seed in 0..SEEDS {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let scenario = random_scenario(&mut rng, AlgorithmType::Detection, false);
        let end = drive(&scenario);

        assert!(end.all_done(), "seed {seed} did not finish: {scenario:?}");
        assert_eq!(end.manual_aborts, 0, "seed {seed}");
        let releases = end.logs.iter().filter(|l| l.kind == LogKind::Release).count();
        assert_eq!(releases, end.deadlocks_count as usize, "seed {seed}");
        for kind in ResourceKind::ALL {
            assert_eq!(end.available_of(kind), scenario.amount(kind));
        }
    }
}

#[test]
fn test_three_way_cycle_with_single_abort() {
    use ResourceKind::*;

    let scenario = Scenario::new()
        .with_resource(Cpu, 1)
        .with_resource(Disk, 1)
        .with_resource(Mutex, 1)
        .with_process("p1", "P1", vec![Cpu, Disk])
        .with_process("p2", "P2", vec![Disk, Mutex])
        .with_process("p3", "P3", vec![Mutex, Cpu])
        .with_algorithm(AlgorithmType::Detection);

    let mut s = initialize(&scenario);
    for _ in 0..4 {
        s = advance(&s);
    }
    assert!(s.deadlock);
    assert_eq!(s.t, 4);
    assert_eq!(s.rr_index, 1);

    s = abort_process(&s, &"p1".into());
    let ids: Vec<_> = s.procs.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["p2", "p3", "p1"]);
    assert_eq!(s.rr_index, 0);

    let end = drive_from(s);
    assert!(end.all_done());
    assert_eq!(end.t, 8);
    let m = get_metrics(&end);
    assert_eq!(m.deadlocks, 1);
    assert_eq!(m.manual_aborts, 1);
}

fn drive_from(mut s: Session) -> Session {
    while !s.all_done() && !s.deadlock && (s.t as usize) < TICK_LIMIT {
        s = advance(&s);
    }
    s
}

#[test]
fn test_advance_is_deterministic() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let scenario = random_scenario(&mut rng, AlgorithmType::Avoidance, false);

    let a = drive(&scenario);
    let b = drive(&scenario);
    assert_eq!(a, b);
}
