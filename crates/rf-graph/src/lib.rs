//! rf-graph: flow-network topology for resflow.
//!
//! Provides:
//! - Node/edge data structures for wells, pipes, separators and boosters
//! - Incremental builder with validation (dangling references, self loops,
//!   missing downstream targets, cycles)
//! - Deterministic topological ordering for stream propagation
//!
//! # Example
//!
//! ```
//! use rf_graph::{GraphBuilder, NodeKind};
//!
//! let mut builder = GraphBuilder::new();
//! let well = builder.add_node("W1", NodeKind::Well);
//! let pipe = builder.add_terminal("P1", NodeKind::Pipe);
//! builder.connect(well, pipe, 0);
//! let graph = builder.build().unwrap();
//!
//! assert_eq!(graph.nodes().len(), 2);
//! assert_eq!(graph.order(), &[well, pipe]);
//! ```

pub mod builder;
pub mod error;
pub mod graph;
pub mod order;
pub(crate) mod validate;

pub use builder::GraphBuilder;
pub use error::{GraphError, GraphResult};
pub use graph::{Edge, FlowGraph, Node, NodeKind};
