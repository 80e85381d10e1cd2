//! Graph model, its interchange codec and GeoJSON derivations.

pub mod features;
pub mod interchange;
mod model;

pub use model::{Edge, EdgeId, Graph, ImportedLink, MAX_ID, Node, NodeId};
