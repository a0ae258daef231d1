//! End-to-end network behavior.

use std::any::Any;
use std::sync::Arc;

use nf_core::LinearTable;
use nf_links::{
    Battery, Capacitor, ConstantPowerLoad, Conductor, Contribution, FluxSource, Link, LinkResult,
    MinorStep, Potential,
};
use nf_sim::{
    AssemblyMode, HealthSignal, Network, NetworkBuilder, NonConvergencePolicy, PotentialSensor,
    SimError, SolveStatus, SolverConfig, SolverError,
};

const IDEAL: f64 = 1.0e12;

/// Node held at `v` through a stiff source, loaded by conductor `g`.
fn held_node(v: f64, g: f64, source_first: bool) -> Network {
    let mut b = NetworkBuilder::new();
    let gnd = b.add_ground("GND", 0.0);
    let n = b.add_node("N");
    if source_first {
        b.add_link(Potential::new("src", IDEAL, v), &[gnd, n]);
        b.add_link(Conductor::new("load", g), &[n, gnd]);
    } else {
        b.add_link(Conductor::new("load", g), &[n, gnd]);
        b.add_link(Potential::new("src", IDEAL, v), &[gnd, n]);
    }
    b.build(SolverConfig::default()).unwrap()
}

#[test]
fn single_conductor_to_ground() {
    for source_first in [true, false] {
        let mut net = held_node(28.0, 2.0, source_first);
        let report = net.step(0.1);
        assert_eq!(report.status, SolveStatus::Converged);
        let v = net.potential_by_name("N").unwrap();
        assert!((v - 28.0).abs() < 1e-9);
        let load = net.link_id("load").unwrap();
        assert!((net.flux(load).unwrap() - 56.0).abs() < 1e-9);
    }
    let mut a = held_node(28.0, 2.0, true);
    let mut b = held_node(28.0, 2.0, false);
    a.step(0.1);
    b.step(0.1);
    assert_eq!(a.potential_by_name("N"), b.potential_by_name("N"));
}

fn sar_like(assembly: AssemblyMode) -> Network {
    let table = Arc::new(LinearTable::from_points(vec![0.0, 0.5, 1.0], vec![0.0, 12.5, 15.0]).unwrap());
    let mut b = NetworkBuilder::new();
    let n0 = b.add_node_with("N0", 120.0, 0.0);
    let n1 = b.add_node_with("N1", 120.0, 0.0);
    let gnd = b.add_ground("GROUND", 0.0);
    b.add_link(ConstantPowerLoad::new("cpl", 25.0), &[n1, gnd]);
    b.add_link(Conductor::new("conductor", 0.01), &[n1, gnd]);
    b.add_link(Battery::new("battery", 10, 0.01, 40.0, 0.9, table), &[gnd, n1]);
    b.add_link(Capacitor::new("cap", 0.5, 140.0), &[n1, gnd]);
    b.add_link(FluxSource::new("array", 2.0), &[gnd, n0]);
    b.add_link(Conductor::new("array_shunt", 0.1), &[n0, gnd]);
    b.build(SolverConfig {
        assembly,
        ..SolverConfig::default()
    })
    .unwrap()
}

#[test]
fn converged_network_resteps_in_one_minor_step() {
    let mut net = sar_like(AssemblyMode::Incremental);
    for _ in 0..20 {
        assert!(net.step(0.1).status.is_converged());
    }
    let cap = net.link_id("cap").unwrap();
    net.link_mut::<Capacitor>(cap).unwrap().capacitance = 0.0;
    let first = net.step(0.1);
    assert_eq!(first.status, SolveStatus::Converged);
    let again = net.step(0.1);
    assert_eq!(again.status, SolveStatus::Converged);
    assert_eq!(again.minor_steps, 1);
}

#[test]
fn assembly_modes_are_bit_identical() {
    let mut full = sar_like(AssemblyMode::Full);
    let mut incremental = sar_like(AssemblyMode::Incremental);
    for _ in 0..25 {
        let a = full.step(0.1);
        let b = incremental.step(0.1);
        assert_eq!(a.status, b.status);
        assert_eq!(a.minor_steps, b.minor_steps);
        for name in ["N0", "N1"] {
            assert_eq!(
                full.potential_by_name(name).map(f64::to_bits),
                incremental.potential_by_name(name).map(f64::to_bits),
            );
        }
    }
}

#[test]
fn zero_admittance_link_is_like_removal() {
    let build = |with_bridge: bool| {
        let mut b = NetworkBuilder::new();
        let gnd = b.add_ground("GND", 0.0);
        let n1 = b.add_node("N1");
        let n2 = b.add_node("N2");
        b.add_link(Potential::new("v", 1.0, 10.0), &[gnd, n1]);
        b.add_link(Conductor::new("r1", 1.0), &[n1, gnd]);
        b.add_link(FluxSource::new("i", 4.0), &[gnd, n2]);
        b.add_link(Conductor::new("r2", 2.0), &[n2, gnd]);
        if with_bridge {
            b.add_link(Conductor::new("bridge", 0.0), &[n1, n2]);
        }
        let mut net = b.build(SolverConfig::default()).unwrap();
        assert_eq!(net.step(0.1).status, SolveStatus::Converged);
        (
            net.potential_by_name("N1").unwrap(),
            net.potential_by_name("N2").unwrap(),
        )
    };
    let (a1, a2) = build(true);
    let (b1, b2) = build(false);
    assert!((a1 - b1).abs() < 1e-12);
    assert!((a2 - b2).abs() < 1e-12);
    assert!((b1 - 5.0).abs() < 1e-12);
    assert!((b2 - 2.0).abs() < 1e-12);
}

#[test]
fn singular_island_fails_without_nan() {
    let mut b = NetworkBuilder::new();
    let gnd = b.add_ground("GND", 0.0);
    let n0 = b.add_node_with("N0", 3.0, 0.0);
    let n1 = b.add_node_with("N1", 4.0, 0.0);
    let n2 = b.add_node("N2");
    b.add_link(Conductor::new("pair", 1.0), &[n0, n1]);
    b.add_link(Conductor::new("dead_ref", 1.0), &[n1, gnd]);
    // A healthy, separate island.
    b.add_link(Potential::new("v", 1.0, 6.0), &[gnd, n2]);
    b.add_link(Conductor::new("r", 2.0), &[n2, gnd]);
    let mut net = b.build(SolverConfig::default()).unwrap();

    // The only path to ground loses its admittance after initialization.
    let dead_ref = net.link_id("dead_ref").unwrap();
    net.link_mut::<Conductor>(dead_ref).unwrap().conductance = 0.0;
    let report = net.step(0.1);
    assert_eq!(report.status, SolveStatus::Failed);
    let failed = report.island_of(n0).unwrap();
    assert_eq!(failed.status, SolveStatus::Failed);
    assert!(matches!(failed.error, Some(SolverError::SingularMatrix { .. })));

    // Failed island keeps its start-of-step potentials, the other island solves.
    assert_eq!(net.potential(n0), Some(3.0));
    assert_eq!(net.potential(n1), Some(4.0));
    assert_eq!(report.island_of(n2).unwrap().status, SolveStatus::Converged);
    assert!((net.potential(n2).unwrap() - 2.0).abs() < 1e-12);
    for node in net.solver().nodes() {
        assert!(node.potential.is_finite());
    }
    let pair = net.link_id("pair").unwrap();
    assert_eq!(net.flux(pair), Some(0.0));
}

#[test]
fn source_on_ground_ground_leaves_n1_at_ground() {
    let mut b = NetworkBuilder::new();
    let n0 = b.add_node_with("N0", 120.0, 0.0);
    let n1 = b.add_node_with("N1", 120.0, 0.0);
    let gnd = b.add_ground("GROUND", 0.0);
    b.add_link(Conductor::new("conductor", 10.0), &[n1, gnd]);
    b.add_link(Potential::new("potential", 1.0, 161.0), &[gnd, gnd]);
    let mut net = b.build(SolverConfig::default()).unwrap();

    assert_eq!(net.islands().reference_links().len(), 1);
    let report = net.step(0.1);
    assert_eq!(report.status, SolveStatus::Converged);
    assert!(net.potential(n1).unwrap().abs() < 1e-12);
    // N0 has no links: idle island, potential held.
    assert_eq!(net.potential(n0), Some(120.0));
    assert_eq!(report.island_of(n0).unwrap().minor_steps, 0);
    // The reference link still computes its flux.
    let p = net.link_id("potential").unwrap();
    assert!((net.flux(p).unwrap() - 161.0).abs() < 1e-12);
}

#[test]
fn source_to_n1_matches_admittance_weighted_value() {
    let mut last_error = f64::INFINITY;
    for gs in [10.0, 100.0, 1.0e3, 1.0e6] {
        let mut b = NetworkBuilder::new();
        b.add_node_with("N0", 120.0, 0.0);
        let n1 = b.add_node_with("N1", 120.0, 0.0);
        let gnd = b.add_ground("GROUND", 0.0);
        b.add_link(Conductor::new("conductor", 10.0), &[n1, gnd]);
        b.add_link(Potential::new("potential", gs, 161.0), &[gnd, n1]);
        let mut net = b.build(SolverConfig::default()).unwrap();
        assert_eq!(net.step(0.1).status, SolveStatus::Converged);

        let v = net.potential(n1).unwrap();
        let expected = 161.0 * gs / (gs + 10.0);
        assert!((v - expected).abs() < 1e-9 * expected);
        let error = 161.0 - v;
        assert!(error < last_error);
        last_error = error;
    }
    assert!(last_error < 0.01);
}

/// Alternates between two conductances every minor step.
struct Flipper {
    name: String,
    high: bool,
    flux: f64,
}

impl Flipper {
    fn new() -> Self {
        Self {
            name: "flipper".into(),
            high: false,
            flux: 0.0,
        }
    }

    fn g(&self) -> f64 {
        if self.high {
            2.0
        } else {
            1.0
        }
    }
}

impl Link for Flipper {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> LinkResult<()> {
        Ok(())
    }

    fn is_nonlinear(&self) -> bool {
        true
    }

    fn contribute(&self, out: &mut Contribution) {
        out.add_conductance(0, 1, self.g());
    }

    fn update_from_potentials(&mut self, _potentials: &[f64], _ctx: &MinorStep) -> bool {
        self.high = !self.high;
        true
    }

    fn compute_flows(&mut self, potentials: &[f64], _dt: f64, flows: &mut [f64]) {
        self.flux = self.g() * (potentials[0] - potentials[1]);
        flows[0] = -self.flux;
        flows[1] = self.flux;
    }

    fn flux(&self) -> f64 {
        self.flux
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn oscillating(config: SolverConfig) -> Network {
    let mut b = NetworkBuilder::new();
    let gnd = b.add_ground("GND", 0.0);
    let n1 = b.add_node_with("N1", 1.0, 0.0);
    b.add_link(Potential::new("v", 1.0, 10.0), &[gnd, n1]);
    b.add_link(Flipper::new(), &[n1, gnd]);
    b.build(config).unwrap()
}

#[test]
fn oscillating_link_degrades() {
    let config = SolverConfig {
        on_nonconvergence: NonConvergencePolicy::Degrade,
        ..SolverConfig::default()
    };
    let budget = config.minor_step_budget();
    let mut net = oscillating(config);
    let report = net.step(0.1);
    assert_eq!(report.status, SolveStatus::ConvergedDegraded);
    assert_eq!(report.minor_steps, budget);
    assert!(net.potential_by_name("N1").unwrap().is_finite());
}

#[test]
fn oscillating_link_fails_and_restores() {
    let config = SolverConfig {
        on_nonconvergence: NonConvergencePolicy::Fail,
        ..SolverConfig::default()
    };
    let mut net = oscillating(config);
    let report = net.step(0.1);
    assert_eq!(report.status, SolveStatus::Failed);
    assert!(matches!(
        report.errors().next(),
        Some(SolverError::ConvergenceFailure { minor_steps: 20, .. })
    ));
    assert_eq!(net.potential_by_name("N1"), Some(1.0));
}

#[test]
fn decomposition_limit_bounds_the_step() {
    let config = SolverConfig {
        decomposition_limit: 3,
        on_nonconvergence: NonConvergencePolicy::Fail,
        ..SolverConfig::default()
    };
    let mut net = oscillating(config);
    let report = net.step(0.1);
    assert_eq!(report.status, SolveStatus::Failed);
    assert_eq!(report.minor_steps, 3);
    assert!(matches!(
        report.errors().next(),
        Some(SolverError::DecompositionLimit { limit: 3, .. })
    ));
}

#[test]
fn repeated_degradation_raises_health_signal() {
    let config = SolverConfig {
        health_streak_threshold: 3,
        ..SolverConfig::default()
    };
    let mut net = oscillating(config);
    assert_eq!(net.step(0.1).health, None);
    assert_eq!(net.step(0.1).health, None);
    assert_eq!(
        net.step(0.1).health,
        Some(HealthSignal::PersistentDegradation { steps: 3 })
    );
}

#[test]
fn restoring_a_checkpoint_clears_health_streaks() {
    let config = SolverConfig {
        health_streak_threshold: 3,
        ..SolverConfig::default()
    };
    let mut net = oscillating(config);
    let start = net.checkpoint();
    for _ in 0..3 {
        net.step(0.1);
    }
    assert!(net.step(0.1).health.is_some());

    net.restore(&start).unwrap();
    let report = net.step(0.1);
    assert_eq!(report.status, SolveStatus::ConvergedDegraded);
    assert_eq!(report.health, None);
}

#[test]
fn zero_conductance_reference_is_singular_at_runtime() {
    let mut net = held_node(5.0, 2.0, true);
    let src = net.link_id("src").unwrap();
    let load = net.link_id("load").unwrap();
    net.link_mut::<Potential>(src).unwrap().conductance = 0.0;
    net.link_mut::<Conductor>(load).unwrap().conductance = 0.0;

    let report = net.step(0.1);
    assert_eq!(report.status, SolveStatus::Failed);
    assert!(matches!(
        report.errors().next(),
        Some(SolverError::SingularMatrix { .. })
    ));
    assert_eq!(net.potential_by_name("N"), Some(0.0));
    assert_eq!(net.flux(load), Some(0.0));

    // Restoring the admittance recovers the island.
    net.link_mut::<Conductor>(load).unwrap().conductance = 2.0;
    net.link_mut::<Potential>(src).unwrap().conductance = IDEAL;
    assert_eq!(net.step(0.1).status, SolveStatus::Converged);
    assert!((net.potential_by_name("N").unwrap() - 5.0).abs() < 1e-9);
}

#[test]
fn set_potential_by_name_checks_its_target() {
    let mut b = NetworkBuilder::new();
    b.add_ground("GND", 0.0);
    let n = b.add_node_with("N", 0.0, 1.0);
    let mut net = b.build(SolverConfig::default()).unwrap();

    net.set_potential_by_name("N", 4.5).unwrap();
    assert_eq!(net.potential(n), Some(4.5));
    assert!(matches!(
        net.set_potential_by_name("M", 1.0),
        Err(SimError::UnknownNode { name }) if name == "M"
    ));
    assert!(matches!(
        net.set_potential_by_name("GND", 1.0),
        Err(SimError::InvalidArg { .. })
    ));
    assert!(net.set_potential_by_name("N", f64::NAN).is_err());
    assert_eq!(net.potential(n), Some(4.5));
}

#[test]
fn invalid_dt_does_not_advance_time() {
    let mut net = held_node(5.0, 1.0, true);
    net.step(0.1);
    assert_eq!(net.step(0.0).status, SolveStatus::Failed);
    let report = net.step(-0.1);
    assert_eq!(report.status, SolveStatus::Failed);
    assert!((net.time() - 0.1).abs() < 1e-15);
    assert_eq!(net.steps(), 1);
}

#[test]
fn disabling_the_only_reference_fails_the_island() {
    let mut net = held_node(5.0, 1.0, true);
    let src = net.link_id("src").unwrap();
    let load = net.link_id("load").unwrap();
    net.set_link_enabled(src, false).unwrap();
    net.link_mut::<Conductor>(load).unwrap().conductance = 0.0;
    let report = net.step(0.1);
    assert_eq!(report.status, SolveStatus::Failed);
    assert!(net.potential_by_name("N").unwrap().is_finite());
    assert!(net.set_link_enabled_by_name("nope", true).is_err());
}

#[test]
fn spotters_read_after_each_step() {
    let mut b = NetworkBuilder::new();
    let gnd = b.add_ground("GND", 0.0);
    let n = b.add_node("N");
    b.add_link(Potential::new("v", 1.0, 200.0), &[gnd, n]);
    b.add_link(Conductor::new("r", 1.0), &[n, gnd]);
    let sensor = b.add_spotter(PotentialSensor::new("n_sense", n, 0.0, 50.0));
    let mut net = b.build(SolverConfig::default()).unwrap();

    let s = net.spotter::<PotentialSensor>(sensor).unwrap();
    assert_eq!(s.reading(), None);
    net.step(0.1);
    // true value is 100, the sensor saturates
    let s = net.spotter::<PotentialSensor>(sensor).unwrap();
    assert_eq!(s.reading(), Some(50.0));
}

#[test]
fn typed_link_access() {
    let mut net = held_node(5.0, 1.0, true);
    let load = net.link_id("load").unwrap();
    assert!(net.link_as::<Conductor>(load).is_some());
    assert!(net.link_as::<Battery>(load).is_none());
    assert!(net.link_mut::<Potential>(load).is_none());
}
