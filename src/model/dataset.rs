use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Policy,
    Concept,
    Mechanism,
    Right,
    Risk,
    Analyst,
}

impl NodeKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Policy => "policy",
            Self::Concept => "concept",
            Self::Mechanism => "mechanism",
            Self::Right => "right",
            Self::Risk => "risk",
            Self::Analyst => "analyst",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Reinforcing,
    Tension,
    Extraction,
    Resistance,
    Translation,
}

impl EdgeKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Reinforcing => "reinforcing",
            Self::Tension => "tension",
            Self::Extraction => "extraction",
            Self::Resistance => "resistance",
            Self::Translation => "translation",
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RawNode {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default)]
    pub inferred_centrality: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RawEdge {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
    #[serde(default)]
    pub weight: Option<f32>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct RawDataset {
    pub nodes: Vec<RawNode>,
    pub edges: Vec<RawEdge>,
    pub skipped_entries: usize,
}

/// Parses the collaborator wire format. Entries that fail to deserialize
/// (missing id, unknown type string) are skipped rather than failing the
/// whole document; only a non-JSON payload is an error.
pub fn parse_dataset(raw: &str) -> Result<RawDataset> {
    let parsed: Value = serde_json::from_str(raw).context("invalid JSON in assemblage dataset")?;
    let object = parsed
        .as_object()
        .ok_or_else(|| anyhow!("unexpected JSON type for assemblage dataset"))?;

    let mut dataset = RawDataset::default();

    for entry in object.get("nodes").and_then(Value::as_array).into_iter().flatten() {
        match serde_json::from_value::<RawNode>(entry.clone()) {
            Ok(node) => dataset.nodes.push(node),
            Err(error) => {
                dataset.skipped_entries += 1;
                tracing::warn!(%error, "skipping malformed node entry");
            }
        }
    }

    for entry in object.get("edges").and_then(Value::as_array).into_iter().flatten() {
        match serde_json::from_value::<RawEdge>(entry.clone()) {
            Ok(edge) => dataset.edges.push(edge),
            Err(error) => {
                dataset.skipped_entries += 1;
                tracing::warn!(%error, "skipping malformed edge entry");
            }
        }
    }

    Ok(dataset)
}

pub fn load_dataset(path: &Path) -> Result<RawDataset> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read dataset from {}", path.display()))?;
    parse_dataset(&raw).with_context(|| format!("failed to parse dataset {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nodes_and_edges() {
        let dataset = parse_dataset(
            r#"{
                "nodes": [
                    {"id": "p1", "label": "GDPR", "type": "policy"},
                    {"id": "c1", "label": "Consent", "type": "concept", "inferred_centrality": "hub"}
                ],
                "edges": [
                    {"from": "p1", "to": "c1", "type": "reinforcing", "weight": 0.8}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(dataset.nodes.len(), 2);
        assert_eq!(dataset.edges.len(), 1);
        assert_eq!(dataset.nodes[0].kind, NodeKind::Policy);
        assert_eq!(dataset.nodes[1].inferred_centrality.as_deref(), Some("hub"));
        assert_eq!(dataset.edges[0].kind, EdgeKind::Reinforcing);
        assert_eq!(dataset.skipped_entries, 0);
    }

    #[test]
    fn skips_malformed_entries_instead_of_failing() {
        let dataset = parse_dataset(
            r#"{
                "nodes": [
                    {"id": "p1", "type": "policy"},
                    {"label": "no id", "type": "concept"},
                    {"id": "x", "type": "galaxy"}
                ],
                "edges": [
                    {"from": "p1", "type": "tension"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(dataset.nodes.len(), 1);
        assert!(dataset.edges.is_empty());
        assert_eq!(dataset.skipped_entries, 3);
        // label falls back to the id downstream
        assert!(dataset.nodes[0].label.is_none());
    }

    #[test]
    fn missing_sections_yield_an_empty_dataset() {
        let dataset = parse_dataset("{}").unwrap();
        assert!(dataset.nodes.is_empty());
        assert!(dataset.edges.is_empty());

        assert!(parse_dataset("[1, 2]").is_err());
        assert!(parse_dataset("not json").is_err());
    }
}
