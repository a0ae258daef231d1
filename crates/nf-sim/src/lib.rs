//! Network runtime for netflux.
//!
//! Provides:
//! - `NetworkBuilder` to compose nodes, ground and link objects
//! - `Network`, the caller-facing handle that steps the solver
//! - Spotters that observe the network before and after each step
//! - Checkpoints of potentials, link enables and link state
//! - A fixed-step simulation runner with decimated recording

pub mod builder;
pub mod checkpoint;
pub mod error;
pub mod network;
pub mod sim;
pub mod spotter;

pub use builder::NetworkBuilder;
pub use checkpoint::Checkpoint;
pub use error::{ConfigurationError, InitializationError, SimError, SimResult};
pub use network::Network;
pub use sim::{run_sim, run_sim_with_progress, SimOptions, SimProgress, SimRecord};
pub use spotter::{FluxSensor, NetworkView, PotentialSensor, Spotter};

pub use nf_solver::{
    AssemblyMode, HealthSignal, IslandReport, NonConvergencePolicy, SolveStatus, SolverConfig,
    SolverError, StepReport,
};
