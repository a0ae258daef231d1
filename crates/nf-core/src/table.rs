//! Read-only lookup tables shared between links.
//!
//! Tables are built once by the caller and handed to links behind an `Arc`,
//! so several links can read the same data without any global state.

use crate::{NfError, NfResult, Real};

/// Piecewise-linear interpolation table with input clamping.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearTable {
    x: Vec<Real>,
    y: Vec<Real>,
    min_x: Real,
    max_x: Real,
}

impl LinearTable {
    /// Build a table. `x` must be strictly increasing with at least two points,
    /// and inputs are clamped to `[min_x, max_x]` before lookup.
    pub fn new(x: Vec<Real>, y: Vec<Real>, min_x: Real, max_x: Real) -> NfResult<Self> {
        if x.len() != y.len() {
            return Err(NfError::InvalidArg {
                what: "table x and y lengths differ",
            });
        }
        if x.len() < 2 {
            return Err(NfError::InvalidArg {
                what: "table needs at least two points",
            });
        }
        for v in x.iter().chain(y.iter()) {
            crate::ensure_finite(*v, "table point")?;
        }
        if x.windows(2).any(|w| w[1] <= w[0]) {
            return Err(NfError::InvalidArg {
                what: "table x must be strictly increasing",
            });
        }
        if !(min_x <= max_x) {
            return Err(NfError::InvalidArg {
                what: "table min_x exceeds max_x",
            });
        }
        Ok(Self { x, y, min_x, max_x })
    }

    /// Build a table whose clamp range equals its first and last x values.
    pub fn from_points(x: Vec<Real>, y: Vec<Real>) -> NfResult<Self> {
        let (lo, hi) = match (x.first(), x.last()) {
            (Some(lo), Some(hi)) => (*lo, *hi),
            _ => {
                return Err(NfError::InvalidArg {
                    what: "table needs at least two points",
                })
            }
        };
        Self::new(x, y, lo, hi)
    }

    pub fn min_x(&self) -> Real {
        self.min_x
    }

    pub fn max_x(&self) -> Real {
        self.max_x
    }

    /// Interpolated value at `x`, extrapolating linearly from the end segments
    /// when the clamp range extends past the data.
    pub fn eval(&self, x: Real) -> Real {
        let x = x.clamp(self.min_x, self.max_x);
        let n = self.x.len();
        let seg = match self.x.partition_point(|&xi| xi <= x) {
            0 => 0,
            i if i >= n => n - 2,
            i => i - 1,
        };
        let (x0, x1) = (self.x[seg], self.x[seg + 1]);
        let (y0, y1) = (self.y[seg], self.y[seg + 1]);
        y0 + (y1 - y0) * (x - x0) / (x1 - x0)
    }
}
