//! Common helpers for link models.

use crate::error::{LinkError, LinkResult};

/// Upper bound applied to any conductance a link stamps.
pub const CONDUCTANCE_LIMIT: f64 = 1.0e15;

/// Require `value` to be finite and >= 0.
pub fn require_non_negative(link: &str, what: &'static str, value: f64) -> LinkResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(out_of_range(link, what, value))
    }
}

/// Require `value` to be finite and > 0.
pub fn require_positive(link: &str, what: &'static str, value: f64) -> LinkResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(out_of_range(link, what, value))
    }
}

/// Require `value` to be finite.
pub fn require_finite(link: &str, what: &'static str, value: f64) -> LinkResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(out_of_range(link, what, value))
    }
}

/// Require `value` to lie in [0, 1].
pub fn require_fraction(link: &str, what: &'static str, value: f64) -> LinkResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(out_of_range(link, what, value))
    }
}

fn out_of_range(link: &str, what: &'static str, value: f64) -> LinkError {
    LinkError::OutOfRange {
        link: link.to_string(),
        what,
        value,
    }
}

/// Clamp a conductance into [0, CONDUCTANCE_LIMIT].
pub fn limit_conductance(g: f64) -> f64 {
    g.clamp(0.0, CONDUCTANCE_LIMIT)
}

/// Write a two-port flux into per-port flows: leaves port 0, enters port 1.
pub fn two_port_flows(flux: f64, flows: &mut [f64]) {
    if let [from, to, ..] = flows {
        *from = -flux;
        *to = flux;
    }
}

/// Potential drop from port 0 to port 1.
pub fn port_drop(potentials: &[f64]) -> f64 {
    match potentials {
        [p0, p1, ..] => p0 - p1,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_checks() {
        assert!(require_non_negative("l", "g", 0.0).is_ok());
        assert!(require_non_negative("l", "g", -1e-9).is_err());
        assert!(require_positive("l", "c", 0.0).is_err());
        assert!(require_positive("l", "c", f64::INFINITY).is_err());
        assert!(require_fraction("l", "soc", 1.0).is_ok());
        assert!(require_fraction("l", "soc", 1.01).is_err());
        assert!(require_fraction("l", "soc", f64::NAN).is_err());
    }

    #[test]
    fn conductance_is_limited() {
        assert_eq!(limit_conductance(1e20), CONDUCTANCE_LIMIT);
        assert_eq!(limit_conductance(-3.0), 0.0);
        assert_eq!(limit_conductance(4.0), 4.0);
    }

    #[test]
    fn two_port_flow_signs() {
        let mut flows = [0.0; 2];
        two_port_flows(3.0, &mut flows);
        assert_eq!(flows, [-3.0, 3.0]);
        assert_eq!(port_drop(&[5.0, 2.0]), 3.0);
    }
}
