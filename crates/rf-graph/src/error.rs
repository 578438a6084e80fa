//! Graph-specific error types.

use rf_core::{ComponentId, EdgeId, RfError};

pub type GraphResult<T> = Result<T, GraphError>;

/// Topology construction and validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// An edge refers to a node that doesn't exist.
    InvalidNodeRef { edge: EdgeId, node: ComponentId },

    /// An edge connects a node to itself.
    SelfLoop { node: String },

    /// The same upstream/downstream pair is connected twice.
    DuplicateEdge { from: String, to: String },

    /// A well appears as the downstream end of a connection.
    WellAsTarget { well: String },

    /// A non-terminal node has no downstream connection.
    MissingDownstream { node: String },

    /// A terminal node (end pipe) declares downstream connections.
    TerminalWithOutlet { node: String },

    /// A node that must have exactly one outlet has several.
    MultipleOutlets { node: String, count: usize },

    /// The network contains a cycle through the named node.
    Cycle { node: String },
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::InvalidNodeRef { edge, node } => {
                write!(f, "Connection {} refers to non-existent node {}", edge, node)
            }
            GraphError::SelfLoop { node } => {
                write!(f, "Node '{}' is connected to itself", node)
            }
            GraphError::DuplicateEdge { from, to } => {
                write!(f, "Node '{}' is connected to '{}' more than once", from, to)
            }
            GraphError::WellAsTarget { well } => {
                write!(f, "Well '{}' cannot receive flow from upstream", well)
            }
            GraphError::MissingDownstream { node } => {
                write!(f, "Node '{}' has no resolvable downstream target", node)
            }
            GraphError::TerminalWithOutlet { node } => {
                write!(f, "End pipe '{}' cannot have downstream connections", node)
            }
            GraphError::MultipleOutlets { node, count } => {
                write!(
                    f,
                    "Node '{}' has {} outlet connections (expected exactly 1)",
                    node, count
                )
            }
            GraphError::Cycle { node } => {
                write!(f, "Flow network contains a cycle through '{}'", node)
            }
        }
    }
}

impl std::error::Error for GraphError {}

impl From<GraphError> for RfError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::InvalidNodeRef { .. } => RfError::Invariant {
                what: "connection refers to unknown node",
            },
            GraphError::Cycle { .. } => RfError::Invariant {
                what: "flow network contains a cycle",
            },
            _ => RfError::InvalidArg {
                what: "invalid flow network topology",
            },
        }
    }
}
