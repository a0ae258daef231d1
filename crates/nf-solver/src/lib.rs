//! Iterative nodal network solver.
//!
//! Unknowns are node potentials. Each major step the solver partitions the
//! network into islands, assembles one linear system per island from the link
//! contributions, solves it, lets nonlinear links react to the solution, and
//! repeats (minor steps) until every island converges, degrades or fails.

pub mod assembly;
pub mod config;
pub mod controller;
pub mod error;
pub mod health;
pub mod linear;
pub mod node;
pub mod report;
pub mod slot;
pub mod solve;

pub use assembly::IslandSystem;
pub use config::{AssemblyMode, NonConvergencePolicy, SolverConfig};
pub use controller::{ConvergenceController, IslandState, Phase};
pub use error::{SolverError, SolverResult};
pub use health::{HealthMonitor, HealthSignal};
pub use linear::{LinearError, LinearSolution, LinearSolver};
pub use node::NodeState;
pub use report::{IslandReport, SolveStatus, StepReport};
pub use slot::LinkSlot;
pub use solve::NetworkSolver;
