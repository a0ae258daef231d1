//! Property tests over random passive ladder networks.

use nf_graph::TopologyBuilder;
use nf_links::{Conductor, Link, Potential};
use nf_solver::{NetworkSolver, SolveStatus, SolverConfig};
use proptest::prelude::*;

#[derive(Debug, Clone)]
struct Ladder {
    source: f64,
    source_g: f64,
    shunts: Vec<f64>,
    series: Vec<f64>,
}

fn ladder() -> impl Strategy<Value = Ladder> {
    (1usize..8).prop_flat_map(|n| {
        (
            -100.0..100.0f64,
            0.1..100.0f64,
            prop::collection::vec(0.01..10.0f64, n),
            prop::collection::vec(0.01..10.0f64, n - 1),
        )
            .prop_map(|(source, source_g, shunts, series)| Ladder {
                source,
                source_g,
                shunts,
                series,
            })
    })
}

fn solve(ladder: &Ladder, reversed: bool) -> (SolveStatus, Vec<f64>) {
    let mut b = TopologyBuilder::new();
    let g = b.add_ground("GND", 0.0);
    let nodes: Vec<_> = (0..ladder.shunts.len())
        .map(|i| b.add_node(format!("N{i}")))
        .collect();

    let mut bindings = Vec::new();
    let mut links: Vec<Box<dyn Link>> = Vec::new();
    bindings.push(("v".to_string(), vec![g, nodes[0]]));
    links.push(Box::new(Potential::new("v", ladder.source_g, ladder.source)));
    for (i, &gs) in ladder.shunts.iter().enumerate() {
        let name = format!("shunt{i}");
        bindings.push((name.clone(), vec![nodes[i], g]));
        links.push(Box::new(Conductor::new(name, gs)));
    }
    for (i, &gs) in ladder.series.iter().enumerate() {
        let name = format!("series{i}");
        bindings.push((name.clone(), vec![nodes[i], nodes[i + 1]]));
        links.push(Box::new(Conductor::new(name, gs)));
    }
    if reversed {
        bindings.reverse();
        links.reverse();
    }
    for (name, ports) in &bindings {
        b.add_link(name.clone(), ports);
    }

    let mut solver =
        NetworkSolver::new(b.build().unwrap(), links, SolverConfig::default()).unwrap();
    let report = solver.step(0.1);
    let potentials = nodes.iter().map(|n| solver.potential(*n).unwrap()).collect();
    (report.status, potentials)
}

proptest! {
    #[test]
    fn passive_networks_converge_within_bounds(ladder in ladder()) {
        let (status, potentials) = solve(&ladder, false);
        prop_assert_eq!(status, SolveStatus::Converged);
        let lo = ladder.source.min(0.0) - 1e-9;
        let hi = ladder.source.max(0.0) + 1e-9;
        for p in potentials {
            prop_assert!(p.is_finite());
            prop_assert!(p >= lo && p <= hi, "{} outside [{}, {}]", p, lo, hi);
        }
    }

    #[test]
    fn link_order_does_not_matter(ladder in ladder()) {
        let (_, forward) = solve(&ladder, false);
        let (_, backward) = solve(&ladder, true);
        for (a, b) in forward.iter().zip(&backward) {
            prop_assert!((a - b).abs() <= 1e-9 * a.abs().max(1.0));
        }
    }
}
