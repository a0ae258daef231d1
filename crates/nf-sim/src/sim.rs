//! Fixed-step simulation runner and result recording.

use nf_solver::SolveStatus;
use tracing::warn;

use crate::error::{SimError, SimResult};
use crate::network::Network;

/// Options for simulation runs.
#[derive(Clone, Debug)]
pub struct SimOptions {
    /// Fixed time step (seconds)
    pub dt: f64,
    /// Final simulation time (seconds)
    pub t_end: f64,
    /// Maximum number of steps (safety limit)
    pub max_steps: usize,
    /// Record every N-th step (decimation)
    pub record_every: usize,
    /// Stop with an error on the first failed step
    pub halt_on_failure: bool,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            dt: 0.1,
            t_end: 1.0,
            max_steps: 100_000,
            record_every: 1,
            halt_on_failure: false,
        }
    }
}

/// Recorded node potentials over time.
#[derive(Clone, Debug, Default)]
pub struct SimRecord {
    /// Time points (seconds)
    pub t: Vec<f64>,
    /// Node potentials at each time point, indexed by node
    pub potentials: Vec<Vec<f64>>,
    /// Step status at each time point (the initial point counts as converged)
    pub status: Vec<SolveStatus>,
    /// Worst status seen during the run
    pub worst: Option<SolveStatus>,
}

/// Progress passed to the callback of `run_sim_with_progress`.
#[derive(Clone, Copy, Debug)]
pub struct SimProgress {
    pub step: usize,
    pub t: f64,
    pub t_end: f64,
    pub status: SolveStatus,
    pub minor_steps: usize,
}

/// Run a network from its current state to `t_end`.
pub fn run_sim(network: &mut Network, opts: &SimOptions) -> SimResult<SimRecord> {
    run_sim_with_progress(network, opts, |_| {})
}

/// Run a network to `t_end`, calling `progress` after every step.
pub fn run_sim_with_progress<F>(
    network: &mut Network,
    opts: &SimOptions,
    mut progress: F,
) -> SimResult<SimRecord>
where
    F: FnMut(&SimProgress),
{
    if !(opts.dt.is_finite() && opts.dt > 0.0) {
        return Err(SimError::InvalidArg {
            what: "dt must be positive",
        });
    }
    if opts.t_end.is_nan() || opts.t_end < 0.0 {
        return Err(SimError::InvalidArg {
            what: "t_end must be non-negative",
        });
    }
    if opts.max_steps == 0 {
        return Err(SimError::InvalidArg {
            what: "max_steps must be positive",
        });
    }
    if opts.record_every == 0 {
        return Err(SimError::InvalidArg {
            what: "record_every must be positive",
        });
    }

    let snapshot = |network: &Network| -> Vec<f64> {
        network
            .solver()
            .nodes()
            .iter()
            .map(|n| n.potential)
            .collect()
    };

    let mut record = SimRecord::default();
    record.t.push(network.time());
    record.potentials.push(snapshot(network));
    record.status.push(SolveStatus::Converged);

    let t_start = network.time();
    let mut step = 0;
    let mut last = SolveStatus::Converged;
    while network.time() - t_start < opts.t_end - 0.5 * opts.dt && step < opts.max_steps {
        let report = network.step(opts.dt);
        step += 1;
        last = report.status;
        record.worst = record.worst.max(Some(report.status));

        progress(&SimProgress {
            step,
            t: network.time(),
            t_end: t_start + opts.t_end,
            status: report.status,
            minor_steps: report.minor_steps,
        });

        if report.status == SolveStatus::Failed {
            warn!(step, t = network.time(), "step failed");
            if opts.halt_on_failure {
                return Err(SimError::StepFailed {
                    step,
                    t: network.time(),
                });
            }
        }

        if step % opts.record_every == 0 {
            record.t.push(network.time());
            record.potentials.push(snapshot(network));
            record.status.push(report.status);
        }
    }

    // Always record final state
    if step % opts.record_every != 0 {
        record.t.push(network.time());
        record.potentials.push(snapshot(network));
        record.status.push(last);
    }

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_options_defaults() {
        let opts = SimOptions::default();
        assert_eq!(opts.dt, 0.1);
        assert_eq!(opts.max_steps, 100_000);
        assert_eq!(opts.record_every, 1);
        assert!(!opts.halt_on_failure);
    }
}
