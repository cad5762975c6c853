use std::collections::{HashMap, HashSet};

use super::dataset::{EdgeKind, NodeKind, RawDataset};

#[derive(Clone, Debug)]
pub struct NodeRecord {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    pub inferred_centrality: Option<String>,
}

#[derive(Clone, Debug)]
pub struct EdgeRecord {
    pub source: usize,
    pub target: usize,
    pub kind: EdgeKind,
    pub weight: Option<f32>,
    pub description: Option<String>,
}

impl EdgeRecord {
    pub fn touches(&self, slot: usize) -> bool {
        self.source == slot || self.target == slot
    }
}

/// Validated assemblage graph. Nodes live in an index-stable arena; edges
/// reference arena slots. Built once per dataset and replaced wholesale when
/// the dataset changes.
#[derive(Clone, Debug)]
pub struct GraphModel {
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
    pub index_by_id: HashMap<String, usize>,
    pub mediator: Option<usize>,
    pub dropped_nodes: usize,
    pub dropped_edges: usize,
}

impl GraphModel {
    pub fn from_dataset(dataset: &RawDataset) -> Self {
        let mut nodes = Vec::with_capacity(dataset.nodes.len());
        let mut index_by_id = HashMap::with_capacity(dataset.nodes.len());
        let mut dropped_nodes = 0usize;
        let mut mediator = None;

        for raw in &dataset.nodes {
            if index_by_id.contains_key(&raw.id) {
                dropped_nodes += 1;
                tracing::warn!(id = %raw.id, "dropping duplicate node id");
                continue;
            }

            let slot = nodes.len();
            index_by_id.insert(raw.id.clone(), slot);
            if raw.kind == NodeKind::Analyst && mediator.is_none() {
                mediator = Some(slot);
            }
            nodes.push(NodeRecord {
                id: raw.id.clone(),
                label: raw.label.clone().unwrap_or_else(|| raw.id.clone()),
                kind: raw.kind,
                inferred_centrality: raw.inferred_centrality.clone(),
            });
        }

        let mut edges = Vec::with_capacity(dataset.edges.len());
        let mut dropped_edges = 0usize;
        for raw in &dataset.edges {
            let (Some(&source), Some(&target)) =
                (index_by_id.get(&raw.from), index_by_id.get(&raw.to))
            else {
                dropped_edges += 1;
                tracing::warn!(from = %raw.from, to = %raw.to, "dropping edge with unknown endpoint");
                continue;
            };

            edges.push(EdgeRecord {
                source,
                target,
                kind: raw.kind,
                weight: raw.weight,
                description: raw.description.clone(),
            });
        }

        Self {
            nodes,
            edges,
            index_by_id,
            mediator,
            dropped_nodes,
            dropped_edges,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes directly linked to `slot`, in either edge direction.
    pub fn neighbors_of(&self, slot: usize) -> HashSet<usize> {
        let mut neighbors = HashSet::new();
        for edge in &self.edges {
            if edge.source == slot && edge.target != slot {
                neighbors.insert(edge.target);
            }
            if edge.target == slot && edge.source != slot {
                neighbors.insert(edge.source);
            }
        }
        neighbors
    }

    pub fn degree(&self, slot: usize) -> usize {
        self.edges.iter().filter(|edge| edge.touches(slot)).count()
    }

    /// Slots with no incident edges; these get the extra radial containment
    /// pull so they stay in view.
    pub fn disconnected_slots(&self) -> Vec<usize> {
        let mut connected = vec![false; self.nodes.len()];
        for edge in &self.edges {
            if let Some(entry) = connected.get_mut(edge.source) {
                *entry = true;
            }
            if let Some(entry) = connected.get_mut(edge.target) {
                *entry = true;
            }
        }

        connected
            .iter()
            .enumerate()
            .filter_map(|(slot, is_connected)| (!is_connected).then_some(slot))
            .collect()
    }
}
