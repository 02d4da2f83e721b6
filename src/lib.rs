//! Grow an architecture graph from declarative add-operations and animate it
//! with a force-directed layout.

pub mod dataset;
pub mod graph;
pub mod layout;
pub mod navigation;
pub mod session;
pub mod util;

pub use dataset::{Dataset, GraphElement, GraphLoader};
pub use graph::{Edge, GraphError, GraphStore, Node, NodeId};
pub use layout::{ChargeController, Frame, LayoutConfig, LayoutEngine};
pub use navigation::{NavigationError, NavigationState};
pub use session::GraphSession;
