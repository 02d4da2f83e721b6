mod parse;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::graph::{GraphError, GraphStore};
use crate::navigation::NavigationState;

pub use parse::parse_dataset;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GraphElement {
    Node(String),
    Edge { source: String, target: String },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dataset {
    pub version: Option<String>,
    pub elements: Vec<GraphElement>,
}

impl Dataset {
    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(|element| match element {
            GraphElement::Node(name) => Some(name.as_str()),
            GraphElement::Edge { .. } => None,
        })
    }

    pub fn edge_endpoints(&self) -> impl Iterator<Item = (&str, &str)> {
        self.elements.iter().filter_map(|element| match element {
            GraphElement::Edge { source, target } => Some((source.as_str(), target.as_str())),
            GraphElement::Node(_) => None,
        })
    }

    /// Adds every node, then every edge, regardless of how they interleave in
    /// the document.
    pub fn apply(&self, store: &mut GraphStore) -> Result<(), GraphError> {
        for name in self.node_names() {
            store.add_node(name);
        }
        for (source, target) in self.edge_endpoints() {
            store.add_edge(source, target)?;
        }
        Ok(())
    }

    /// Builds a fresh store; on error nothing from this dataset is visible.
    pub fn build_store(&self) -> Result<GraphStore, GraphError> {
        let mut store = GraphStore::new();
        self.apply(&mut store)?;
        Ok(store)
    }
}

/// Reads datasets named by a [`NavigationState`] from a directory of
/// `<resource key>.json` files.
#[derive(Clone, Debug)]
pub struct GraphLoader {
    data_dir: PathBuf,
}

impl GraphLoader {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn resource_path(&self, navigation: &NavigationState) -> PathBuf {
        self.data_dir
            .join(format!("{}.json", navigation.resource_key()))
    }

    pub fn fetch(&self, navigation: &NavigationState) -> Result<Dataset> {
        let path = self.resource_path(navigation);
        let dataset = read_dataset(&path)?;
        tracing::info!(
            path = %path.display(),
            version = dataset.version.as_deref().unwrap_or("unversioned"),
            elements = dataset.elements.len(),
            "loaded dataset"
        );
        Ok(dataset)
    }
}

pub fn read_dataset(path: &Path) -> Result<Dataset> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read dataset {}", path.display()))?;
    parse_dataset(&raw).with_context(|| format!("failed to parse dataset {}", path.display()))
}
