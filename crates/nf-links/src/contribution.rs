//! Per-link admittance matrix and source vector.

use nalgebra::{DMatrix, DVector};

/// What one link adds to the system of equations, expressed over its ports.
///
/// `admittance[(i, j)]` is added to the system at (row of port i, column of
/// port j) and `source[i]` to the right-hand side at the row of port i.
#[derive(Debug, Clone, PartialEq)]
pub struct Contribution {
    admittance: DMatrix<f64>,
    source: DVector<f64>,
}

impl Contribution {
    pub fn zeros(ports: usize) -> Self {
        Self {
            admittance: DMatrix::zeros(ports, ports),
            source: DVector::zeros(ports),
        }
    }

    pub fn port_count(&self) -> usize {
        self.source.len()
    }

    pub fn clear(&mut self) {
        self.admittance.fill(0.0);
        self.source.fill(0.0);
    }

    pub fn admittance(&self) -> &DMatrix<f64> {
        &self.admittance
    }

    pub fn source(&self) -> &DVector<f64> {
        &self.source
    }

    /// Stamp a conductance `g` between ports `a` and `b`.
    pub fn add_conductance(&mut self, a: usize, b: usize, g: f64) {
        self.admittance[(a, a)] += g;
        self.admittance[(b, b)] += g;
        self.admittance[(a, b)] -= g;
        self.admittance[(b, a)] -= g;
    }

    /// Add a source term at a port (positive = flow into the node).
    pub fn add_source(&mut self, port: usize, s: f64) {
        self.source[port] += s;
    }

    /// Stamp a forced flux leaving port `from` and entering port `to`.
    pub fn add_flux(&mut self, from: usize, to: usize, flux: f64) {
        self.source[from] -= flux;
        self.source[to] += flux;
    }

    pub fn is_finite(&self) -> bool {
        self.admittance.iter().all(|v| v.is_finite()) && self.source.iter().all(|v| v.is_finite())
    }
}
