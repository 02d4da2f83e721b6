use serde::Serialize;

use crate::graph::GraphStore;

use super::LayoutEngine;

/// Everything a renderer needs for one tick. Nodes without a body yet are
/// left out, as are edges touching them.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Frame {
    pub charge: f32,
    pub alpha: f32,
    pub nodes: Vec<NodeFrame>,
    pub edges: Vec<EdgeFrame>,
}

#[derive(Clone, Debug, Serialize)]
pub struct NodeFrame {
    pub name: String,
    pub size: u32,
    pub radius: f32,
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Debug, Serialize)]
pub struct EdgeFrame {
    pub source: String,
    pub target: String,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Frame {
    pub(super) fn capture(engine: &LayoutEngine, graph: &GraphStore) -> Self {
        let nodes = graph
            .node_ids()
            .filter_map(|id| {
                let node = graph.node(id)?;
                let position = engine.position(id)?;
                Some(NodeFrame {
                    name: node.name.clone(),
                    size: node.size,
                    radius: node.radius(),
                    x: position.x,
                    y: position.y,
                })
            })
            .collect();

        let edges = graph
            .edges()
            .iter()
            .filter_map(|edge| {
                let start = engine.position(edge.source)?;
                let end = engine.position(edge.target)?;
                Some(EdgeFrame {
                    source: graph.node(edge.source)?.name.clone(),
                    target: graph.node(edge.target)?.name.clone(),
                    x1: start.x,
                    y1: start.y,
                    x2: end.x,
                    y2: end.y,
                })
            })
            .collect();

        Self {
            charge: engine.charge(),
            alpha: engine.alpha(),
            nodes,
            edges,
        }
    }
}
