//! nf-graph: topology layer for netflux.
//!
//! Provides:
//! - Topology data structures (Node, LinkBinding, Topology)
//! - Incremental builder with aggregated validation
//! - Island (connected component) partitioning
//! - Island-local row indexing for the solver
//!
//! # Example
//!
//! ```
//! use nf_graph::{IslandSet, TopologyBuilder};
//!
//! let mut builder = TopologyBuilder::new();
//! let n1 = builder.add_node("n1");
//! let gnd = builder.add_ground("ground", 0.0);
//! builder.add_link("r1", &[n1, gnd]);
//! let topology = builder.build().unwrap();
//!
//! let islands = IslandSet::compute(&topology, &[true]);
//! assert_eq!(islands.len(), 1);
//! assert!(islands.islands()[0].touches_ground);
//! ```

pub mod builder;
pub mod error;
pub mod graph;
pub mod indexing;
pub mod island;
pub(crate) mod validate;

pub use builder::TopologyBuilder;
pub use error::{GraphError, GraphErrors};
pub use graph::{LinkBinding, Node, NodeKind, Topology};
pub use indexing::RowMap;
pub use island::{Island, IslandSet};
