//! Dense linear solve with factorization reuse.
//!
//! Symmetric systems are tried with Cholesky first; anything Cholesky rejects
//! goes through full-pivot LU. The last factorization is kept and reused
//! while the matrix is bit-identical.

use nalgebra::linalg::{Cholesky, FullPivLU};
use nalgebra::{DMatrix, DVector, Dyn};
use thiserror::Error;

/// Failure of a single linear solve, in island row terms.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LinearError {
    #[error("matrix is {rows}x{cols} but the source has {len} entries")]
    Shape { rows: usize, cols: usize, len: usize },

    #[error("row {row} has no admittance")]
    EmptyRow { row: usize },

    #[error("pivot below the singular threshold")]
    SmallPivot { row: Option<usize> },

    #[error("solution is not finite")]
    NonFinite,
}

impl LinearError {
    /// Island row the failure points at, if known.
    pub fn row(&self) -> Option<usize> {
        match self {
            LinearError::EmptyRow { row } => Some(*row),
            LinearError::SmallPivot { row } => *row,
            LinearError::Shape { .. } | LinearError::NonFinite => None,
        }
    }
}

/// Result of a solve.
#[derive(Debug, Clone)]
pub struct LinearSolution {
    pub x: DVector<f64>,
    /// False when a cached factorization was reused.
    pub fresh: bool,
}

enum Factorization {
    Cholesky(Cholesky<f64, Dyn>),
    Lu(FullPivLU<f64, Dyn, Dyn>),
}

struct Cached {
    matrix: DMatrix<f64>,
    factorization: Factorization,
}

/// Linear solver for one island, remembering its last factorization.
#[derive(Default)]
pub struct LinearSolver {
    cached: Option<Cached>,
}

impl std::fmt::Debug for LinearSolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinearSolver")
            .field("cached", &self.cached.is_some())
            .finish()
    }
}

impl LinearSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when solving `a` requires a fresh decomposition.
    pub fn needs_decomposition(&self, a: &DMatrix<f64>) -> bool {
        !matches!(&self.cached, Some(c) if c.matrix == *a)
    }

    /// Drop the cached factorization.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// Solve `a x = b`, treating row sums and relative pivots at or below
    /// `threshold` as singular.
    pub fn solve(
        &mut self,
        a: &DMatrix<f64>,
        b: &DVector<f64>,
        threshold: f64,
    ) -> Result<LinearSolution, LinearError> {
        if a.nrows() != a.ncols() || a.nrows() != b.len() {
            return Err(LinearError::Shape {
                rows: a.nrows(),
                cols: a.ncols(),
                len: b.len(),
            });
        }

        let (cached, fresh) = match self.cached.take() {
            Some(c) if c.matrix == *a => (c, false),
            _ => {
                scan_rows(a, threshold)?;
                let factorization = factor(a, threshold)?;
                (
                    Cached {
                        matrix: a.clone(),
                        factorization,
                    },
                    true,
                )
            }
        };

        let x = match &cached.factorization {
            Factorization::Cholesky(chol) => Some(chol.solve(b)),
            Factorization::Lu(lu) => lu.solve(b),
        };
        self.cached = Some(cached);

        let x = x.ok_or(LinearError::SmallPivot { row: None })?;
        if !x.iter().all(|v| v.is_finite()) {
            self.cached = None;
            return Err(LinearError::NonFinite);
        }
        Ok(LinearSolution { x, fresh })
    }
}

/// A row with (almost) no admittance belongs to a node nothing holds.
fn scan_rows(a: &DMatrix<f64>, threshold: f64) -> Result<(), LinearError> {
    for (row, r) in a.row_iter().enumerate() {
        let sum: f64 = r.iter().map(|v| v.abs()).sum();
        if !sum.is_finite() {
            return Err(LinearError::NonFinite);
        }
        if sum <= threshold {
            return Err(LinearError::EmptyRow { row });
        }
    }
    Ok(())
}

fn factor(a: &DMatrix<f64>, threshold: f64) -> Result<Factorization, LinearError> {
    if is_symmetric(a) {
        if let Some(chol) = a.clone().cholesky() {
            let pivots: Vec<f64> = chol.l().diagonal().iter().map(|d| d * d).collect();
            check_pivots(&pivots, threshold, true)?;
            return Ok(Factorization::Cholesky(chol));
        }
    }
    let lu = a.clone().full_piv_lu();
    let pivots: Vec<f64> = lu.u().diagonal().iter().map(|d| d.abs()).collect();
    check_pivots(&pivots, threshold, false)?;
    Ok(Factorization::Lu(lu))
}

fn check_pivots(pivots: &[f64], threshold: f64, rows_in_order: bool) -> Result<(), LinearError> {
    let max = pivots.iter().fold(0.0_f64, |m, p| m.max(*p));
    for (k, p) in pivots.iter().enumerate() {
        if !p.is_finite() || *p <= threshold * max {
            return Err(LinearError::SmallPivot {
                row: rows_in_order.then_some(k),
            });
        }
    }
    Ok(())
}

fn is_symmetric(a: &DMatrix<f64>) -> bool {
    let n = a.nrows();
    for i in 0..n {
        for j in (i + 1)..n {
            let (x, y) = (a[(i, j)], a[(j, i)]);
            if (x - y).abs() > f64::EPSILON * (x.abs() + y.abs()) {
                return false;
            }
        }
    }
    true
}
