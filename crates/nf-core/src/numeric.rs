use crate::NfError;

/// Floating point type used for potentials, admittances and flows.
pub type Real = f64;

/// Absolute + relative tolerance pair.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Tolerances {
    /// Tolerance that is relative to magnitude, with `tol` also used as the
    /// absolute floor near zero.
    pub fn relative(tol: Real) -> Self {
        Self { abs: tol, rel: tol }
    }
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

/// True when `new` differs from `old` by more than `tol` relative to the
/// larger magnitude (absolute near zero).
pub fn changed_beyond(old: Real, new: Real, tol: Real) -> bool {
    !nearly_equal(old, new, Tolerances::relative(tol))
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, NfError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(NfError::NonFinite { what, value: v })
    }
}

pub fn ensure_non_negative(v: Real, what: &'static str) -> Result<Real, NfError> {
    let v = ensure_finite(v, what)?;
    if v < 0.0 {
        return Err(NfError::InvalidArg { what });
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearly_equal_basic() {
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-9,
        };
        assert!(nearly_equal(1.0, 1.0 + 1e-12, tol));
        assert!(nearly_equal(0.0, 1e-13, tol));
        assert!(!nearly_equal(1.0, 1.0 + 1e-6, tol));
    }

    #[test]
    fn changed_beyond_uses_relative_scale() {
        assert!(!changed_beyond(1000.0, 1000.5, 1e-3));
        assert!(changed_beyond(1000.0, 1002.0, 1e-3));
        assert!(!changed_beyond(0.0, 1e-4, 1e-3));
    }

    #[test]
    fn ensure_non_negative_rejects() {
        assert!(ensure_non_negative(0.0, "g").is_ok());
        assert!(matches!(
            ensure_non_negative(-1.0, "g"),
            Err(NfError::InvalidArg { what: "g" })
        ));
        assert!(matches!(
            ensure_non_negative(Real::NAN, "g"),
            Err(NfError::NonFinite { .. })
        ));
    }
}
