use std::collections::HashMap;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::thread;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::model::{EdgeKind, GraphModel, NodeKind};

/// Payload sent to the interpretation collaborator, in the same wire shape
/// the dataset arrives in.
#[derive(Clone, Debug, Serialize)]
pub(super) struct InterpretRequest {
    pub nodes: Vec<RequestNode>,
    pub edges: Vec<RequestEdge>,
}

#[derive(Clone, Debug, Serialize)]
pub(super) struct RequestNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
}

#[derive(Clone, Debug, Serialize)]
pub(super) struct RequestEdge {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
}

impl InterpretRequest {
    pub fn from_model(model: &GraphModel) -> Self {
        Self {
            nodes: model
                .nodes
                .iter()
                .map(|node| RequestNode {
                    id: node.id.clone(),
                    label: node.label.clone(),
                    kind: node.kind,
                })
                .collect(),
            edges: model
                .edges
                .iter()
                .map(|edge| RequestEdge {
                    from: model.nodes[edge.source].id.clone(),
                    to: model.nodes[edge.target].id.clone(),
                    kind: edge.kind,
                })
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub(super) struct Interpretation {
    pub title: String,
    pub analysis: String,
}

/// Seam to the external analysis collaborator. The response is displayed
/// verbatim; failures keep the UI interactive and the panel closed.
pub(super) trait InterpretClient: Send + Sync {
    fn interpret(&self, request: &InterpretRequest) -> Result<Interpretation>;
}

/// Bundled fallback client: a deterministic structural digest of the graph.
pub(super) struct LocalDigestClient;

impl InterpretClient for LocalDigestClient {
    fn interpret(&self, request: &InterpretRequest) -> Result<Interpretation> {
        let mut kind_counts: HashMap<&'static str, usize> = HashMap::new();
        for node in &request.nodes {
            *kind_counts.entry(node.kind.label()).or_insert(0) += 1;
        }
        let mut kinds = kind_counts.into_iter().collect::<Vec<_>>();
        kinds.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        let composition = kinds
            .iter()
            .map(|(kind, count)| format!("{count} {kind}"))
            .collect::<Vec<_>>()
            .join(", ");

        let tension_count = request
            .edges
            .iter()
            .filter(|edge| edge.kind == EdgeKind::Tension)
            .count();

        let mut degrees: HashMap<&str, usize> = HashMap::new();
        for edge in &request.edges {
            *degrees.entry(edge.from.as_str()).or_insert(0) += 1;
            *degrees.entry(edge.to.as_str()).or_insert(0) += 1;
        }
        let densest = degrees
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
            .and_then(|(id, _)| request.nodes.iter().find(|node| node.id == id))
            .map(|node| node.label.clone());

        let mut analysis = format!(
            "The assemblage holds {} actors ({composition}) linked by {} relations.",
            request.nodes.len(),
            request.edges.len(),
        );
        if let Some(densest) = densest {
            analysis.push_str(&format!(
                " \"{densest}\" carries the most connections and is the most likely \
                 territorializing force in this network."
            ));
        }
        if tension_count > 0 {
            analysis.push_str(&format!(
                " {tension_count} tension relation(s) mark the active controversies."
            ));
        }

        Ok(Interpretation {
            title: "Assemblage digest".to_owned(),
            analysis,
        })
    }
}

/// Runs the request off the frame loop. Callers replace any previous
/// receiver, so the latest response wins.
pub(super) fn spawn_interpret(
    client: Arc<dyn InterpretClient>,
    request: InterpretRequest,
) -> Receiver<Result<Interpretation, String>> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let result = client.interpret(&request).map_err(|error| error.to_string());
        let _ = tx.send(result);
    });

    rx
}

pub(super) fn interpretation_cache_key(comparison_id: &str) -> String {
    format!("assemblage-interpretation-{comparison_id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::parse_dataset;

    fn request() -> InterpretRequest {
        let model = GraphModel::from_dataset(
            &parse_dataset(
                r#"{
                    "nodes": [
                        {"id": "p1", "label": "GDPR", "type": "policy"},
                        {"id": "c1", "label": "Consent", "type": "concept"},
                        {"id": "r1", "label": "Profiling", "type": "risk"}
                    ],
                    "edges": [
                        {"from": "p1", "to": "c1", "type": "reinforcing"},
                        {"from": "r1", "to": "p1", "type": "tension"}
                    ]
                }"#,
            )
            .unwrap(),
        );
        InterpretRequest::from_model(&model)
    }

    #[test]
    fn request_serializes_in_the_collaborator_wire_shape() {
        let json = serde_json::to_value(request()).unwrap();
        assert_eq!(json["nodes"][0]["type"], "policy");
        assert_eq!(json["edges"][0]["from"], "p1");
        assert_eq!(json["edges"][0]["to"], "c1");
        assert_eq!(json["edges"][1]["type"], "tension");
    }

    #[test]
    fn local_digest_is_deterministic_and_names_the_densest_node() {
        let first = LocalDigestClient.interpret(&request()).unwrap();
        let second = LocalDigestClient.interpret(&request()).unwrap();

        assert_eq!(first, second);
        assert!(!first.title.is_empty());
        assert!(first.analysis.contains("3 actors"));
        assert!(first.analysis.contains("GDPR"));
        assert!(first.analysis.contains("1 tension relation"));
    }

    #[test]
    fn spawn_interpret_replies_over_the_channel() {
        let rx = spawn_interpret(Arc::new(LocalDigestClient), request());
        let interpretation = rx.recv().unwrap().unwrap();
        assert_eq!(interpretation.title, "Assemblage digest");
    }

    #[test]
    fn cache_key_is_scoped_by_comparison_id() {
        assert_eq!(
            interpretation_cache_key("brazil-india"),
            "assemblage-interpretation-brazil-india"
        );
        assert_ne!(
            interpretation_cache_key("a"),
            interpretation_cache_key("b")
        );
    }
}
