//! Author interaction graph: representation, construction and path algorithms

pub mod algorithms;
pub mod builder;
pub mod compressed;

use serde::{Deserialize, Serialize};

pub use builder::{build_interaction_graph, build_interaction_graph_with, GraphBuilder};
pub use compressed::InteractionGraph;

/// Node and edge lists of a graph fragment, handed to renderers as-is
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subgraph {
    pub nodes: Vec<String>,

    /// `(replier, replied_to)` author pairs
    pub edges: Vec<(String, String)>,
}
