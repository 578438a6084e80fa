//! Production-network model orchestration.
//!
//! The `Model` owns every component, the flat variable/constraint store and
//! the objective. It resolves the declared routing into a `FlowGraph` once,
//! then drives the recomputation sequence on every evaluation:
//!
//! 1. `update_streams` (topological order, splits and merges)
//! 2. `calculate_pipe_pressures` (reverse order, from the boundary upwards)
//! 3. `update_constraints`
//! 4. `update_objective_value`

pub mod constraints;
pub mod error;
pub mod fraction;
pub mod model;
pub mod network;
pub mod objective;
pub mod routing;

pub use error::{ModelError, ModelResult};
pub use model::{Coupling, InputPoint, Model};
pub use objective::{Objective, ObjectiveKind};
