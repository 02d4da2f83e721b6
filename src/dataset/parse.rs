use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use serde_json::Value;

use super::{Dataset, GraphElement};

#[derive(Clone, Debug, Deserialize)]
struct RawDataset {
    #[serde(default)]
    version: Value,
    #[serde(default)]
    graph: Vec<Value>,
}

/// One entry of the `graph` array. The nested edge form carries its
/// endpoints inside `edge`; the flat form marks `edge` truthy and puts them
/// next to it.
#[derive(Clone, Debug, Default, Deserialize)]
struct RawElement {
    #[serde(default)]
    node: Value,
    #[serde(default)]
    edge: Value,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    target: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
struct RawEndpoints {
    source: String,
    target: String,
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn version_label(version: &Value) -> Option<String> {
    match version {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn parse_element(position: usize, raw: RawElement, elements: &mut Vec<GraphElement>) -> Result<()> {
    let mut recognised = false;

    if is_truthy(&raw.node) {
        let name = raw
            .node
            .as_str()
            .ok_or_else(|| anyhow!("graph element {position}: node name must be a string"))?;
        elements.push(GraphElement::Node(name.to_owned()));
        recognised = true;
    }

    if is_truthy(&raw.edge) {
        let endpoints = if raw.edge.is_object() {
            RawEndpoints::deserialize(&raw.edge)
                .with_context(|| format!("graph element {position}: invalid edge endpoints"))?
        } else {
            match (raw.source, raw.target) {
                (Some(source), Some(target)) => RawEndpoints { source, target },
                _ => bail!("graph element {position}: edge is missing source or target"),
            }
        };
        elements.push(GraphElement::Edge {
            source: endpoints.source,
            target: endpoints.target,
        });
        recognised = true;
    }

    if !recognised {
        tracing::warn!(position, "skipping graph element that is neither a node nor an edge");
    }
    Ok(())
}

pub fn parse_dataset(raw: &str) -> Result<Dataset> {
    let parsed: RawDataset = serde_json::from_str(raw).context("invalid dataset JSON")?;

    let mut elements = Vec::with_capacity(parsed.graph.len());
    for (position, value) in parsed.graph.into_iter().enumerate() {
        if !value.is_object() {
            tracing::warn!(position, "skipping graph element that is not an object");
            continue;
        }
        let element = RawElement::deserialize(value)
            .with_context(|| format!("graph element {position} is malformed"))?;
        parse_element(position, element, &mut elements)?;
    }

    Ok(Dataset {
        version: version_label(&parsed.version),
        elements,
    })
}
