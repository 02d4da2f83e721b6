use std::collections::HashMap;
use std::collections::hash_map::Entry;

use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("no node named `{0}` has been added")]
    UnknownNode(String),
}

#[derive(Clone, Debug)]
pub struct Node {
    pub name: String,
    pub size: u32,
}

impl Node {
    /// Key used to pick the palette colour: the length of the fourth dotted
    /// segment, or 0 for shorter names.
    pub fn color_key(&self) -> usize {
        self.name.split('.').nth(3).map(str::len).unwrap_or(0)
    }

    pub fn radius(&self) -> f32 {
        (self.size as f32).sqrt() * 2.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
}

/// Append-only node/edge store. Names resolve to the first node added under
/// that name; the most recently added node is the root.
#[derive(Clone, Debug, Default)]
pub struct GraphStore {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    index_by_name: HashMap<String, NodeId>,
    root: Option<NodeId>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, name: impl Into<String>) -> NodeId {
        let name = name.into();
        let id = NodeId(self.nodes.len());

        match self.index_by_name.entry(name.clone()) {
            Entry::Occupied(existing) => {
                tracing::warn!(
                    name = %name,
                    first = existing.get().index(),
                    "duplicate node name; lookups keep resolving to the first node"
                );
            }
            Entry::Vacant(slot) => {
                slot.insert(id);
            }
        }

        self.nodes.push(Node { name, size: 1 });
        self.root = Some(id);
        id
    }

    pub fn peek(&self, name: &str) -> Option<NodeId> {
        self.index_by_name.get(name).copied()
    }

    /// Resolves `name` and counts the lookup as a reference to that node.
    pub fn reference(&mut self, name: &str) -> Result<NodeId, GraphError> {
        let id = self
            .peek(name)
            .ok_or_else(|| GraphError::UnknownNode(name.to_owned()))?;
        self.nodes[id.0].size += 1;
        Ok(id)
    }

    /// Both endpoints must exist; on failure neither size is touched.
    pub fn add_edge(&mut self, source: &str, target: &str) -> Result<Edge, GraphError> {
        for name in [source, target] {
            if self.peek(name).is_none() {
                return Err(GraphError::UnknownNode(name.to_owned()));
            }
        }

        let edge = Edge {
            source: self.reference(source)?,
            target: self.reference(target)?,
        };
        self.edges.push(edge);
        Ok(edge)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node_by_name(&self, name: &str) -> Option<&Node> {
        self.peek(name).and_then(|id| self.node(id))
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn id_at(&self, index: usize) -> Option<NodeId> {
        (index < self.nodes.len()).then_some(NodeId(index))
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Edge rest length: `10 + 7 * mean(endpoint sizes)`.
    pub fn link_distance(&self, edge: Edge) -> f32 {
        let source = self.nodes[edge.source.0].size as f32;
        let target = self.nodes[edge.target.0].size as f32;
        10.0 + 7.0 * (source + target) / 2.0
    }

    pub(crate) fn degrees(&self) -> Vec<u32> {
        let mut degrees = vec![0u32; self.nodes.len()];
        for edge in &self.edges {
            degrees[edge.source.0] += 1;
            degrees[edge.target.0] += 1;
        }
        degrees
    }
}
