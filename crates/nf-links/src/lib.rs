//! nf-links: link models for netflux networks.
//!
//! A link is the unit of physics plugged into the solver. Every link
//! implements the [`Link`] trait: it validates its own parameters, stamps an
//! admittance matrix and source vector over its ports, reacts to solved
//! potentials, and reports flows back into its nodes.
//!
//! Provided models:
//! - [`Conductor`] with a blockage malfunction
//! - [`Potential`] source with internal conductance
//! - [`FluxSource`]
//! - [`Capacitor`]
//! - [`Diode`] (two-state nonlinear conductance)
//! - [`ConstantPowerLoad`] (nonlinear, `G = P/V²`)
//! - [`Battery`] with a table-driven open-circuit potential
//!
//! # Example
//!
//! ```
//! use nf_links::{Conductor, Contribution, Link};
//!
//! let r = Conductor::new("r1", 2.0);
//! r.validate().unwrap();
//!
//! let mut c = Contribution::zeros(r.port_count());
//! r.contribute(&mut c);
//! assert_eq!(c.admittance()[(0, 0)], 2.0);
//! assert_eq!(c.admittance()[(0, 1)], -2.0);
//! ```

pub mod battery;
pub mod capacitor;
pub mod common;
pub mod conductor;
pub mod contribution;
pub mod diode;
pub mod error;
pub mod potential;
pub mod power_load;
pub mod source;
pub mod state;
pub mod traits;

pub use battery::Battery;
pub use capacitor::Capacitor;
pub use conductor::Conductor;
pub use contribution::Contribution;
pub use diode::Diode;
pub use error::{LinkError, LinkResult};
pub use potential::Potential;
pub use power_load::ConstantPowerLoad;
pub use source::FluxSource;
pub use state::LinkState;
pub use traits::{Link, MinorStep};
