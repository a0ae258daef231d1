use nf_links::{Capacitor, Conductor, Potential};
use nf_sim::{run_sim, run_sim_with_progress, NetworkBuilder, SimError, SimOptions, SolveStatus, SolverConfig};

fn rc() -> nf_sim::Network {
    let mut b = NetworkBuilder::new();
    let gnd = b.add_ground("GND", 0.0);
    let n = b.add_node("N");
    b.add_link(Potential::new("v", 1.0, 10.0), &[gnd, n]);
    b.add_link(Capacitor::new("c", 1.0, 0.0), &[n, gnd]);
    b.build(SolverConfig::default()).unwrap()
}

#[test]
fn records_decimated_history() {
    let mut net = rc();
    let opts = SimOptions {
        dt: 0.1,
        t_end: 1.0,
        record_every: 3,
        ..SimOptions::default()
    };
    let record = run_sim(&mut net, &opts).unwrap();
    // initial, steps 3, 6, 9, final 10
    assert_eq!(record.t.len(), 5);
    assert!((record.t.last().unwrap() - 1.0).abs() < 1e-9);
    assert_eq!(record.worst, Some(SolveStatus::Converged));
    let n = net.node_id("N").unwrap().slot();
    let history: Vec<f64> = record.potentials.iter().map(|p| p[n]).collect();
    assert!(history.windows(2).all(|w| w[1] > w[0]));
}

#[test]
fn progress_sees_every_step() {
    let mut net = rc();
    let mut seen = 0;
    run_sim_with_progress(&mut net, &SimOptions::default(), |p| {
        seen += 1;
        assert_eq!(p.step, seen);
    })
    .unwrap();
    assert_eq!(seen, 10);
}

#[test]
fn halts_on_failure_when_asked() {
    let mut b = NetworkBuilder::new();
    let gnd = b.add_ground("GND", 0.0);
    let n = b.add_node("N");
    b.add_link(Conductor::new("r", 0.0), &[n, gnd]);
    let mut net = b.build(SolverConfig::default()).unwrap();

    let opts = SimOptions {
        halt_on_failure: true,
        ..SimOptions::default()
    };
    assert!(matches!(
        run_sim(&mut net, &opts),
        Err(SimError::StepFailed { step: 1, .. })
    ));

    let record = run_sim(&mut net, &SimOptions::default()).unwrap();
    assert_eq!(record.worst, Some(SolveStatus::Failed));
}

#[test]
fn rejects_bad_options() {
    let mut net = rc();
    let opts = SimOptions {
        dt: 0.0,
        ..SimOptions::default()
    };
    assert!(matches!(run_sim(&mut net, &opts), Err(SimError::InvalidArg { .. })));
}
