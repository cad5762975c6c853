use clap::ValueEnum;

use super::dataset::{EdgeKind, NodeKind};
use super::graph::{EdgeRecord, GraphModel, NodeRecord};

pub const MEDIATOR_ID: &str = "analyst_ai";
const MEDIATOR_LABEL: &str = "AI Analyst";
const SHORT_CONCEPT_LABEL: usize = 20;
const FALLBACK_TARGETS: usize = 3;

/// How the mediator picks its translation targets. The selection rule is a
/// caller decision, not an inferred heuristic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum MediatorPolicy {
    /// Every policy node, plus concept nodes with short labels; falls back
    /// to the first three nodes when neither exists.
    PreferPolicies,
    /// The first three nodes of the dataset, in input order.
    FirstThree,
}

impl MediatorPolicy {
    fn targets(self, model: &GraphModel, mediator: usize) -> Vec<usize> {
        let candidates = |keep: &dyn Fn(&NodeRecord) -> bool| {
            model
                .nodes
                .iter()
                .enumerate()
                .filter(|&(slot, node)| slot != mediator && keep(node))
                .map(|(slot, _)| slot)
                .collect::<Vec<_>>()
        };

        let preferred = match self {
            Self::PreferPolicies => candidates(&|node| {
                node.kind == NodeKind::Policy
                    || (node.kind == NodeKind::Concept
                        && node.label.chars().count() < SHORT_CONCEPT_LABEL)
            }),
            Self::FirstThree => Vec::new(),
        };

        if preferred.is_empty() {
            let mut fallback = candidates(&|_| true);
            fallback.truncate(FALLBACK_TARGETS);
            fallback
        } else {
            preferred
        }
    }
}

/// Pre-processing stage: ensures the graph carries exactly one mediator node
/// and, when the input has no translation edges touching it, wires it to the
/// targets chosen by `policy`. Returns the mediator slot.
pub fn inject_mediator(model: &mut GraphModel, policy: MediatorPolicy) -> usize {
    let mediator = model.mediator.unwrap_or_else(|| {
        let slot = model.nodes.len();
        model.nodes.push(NodeRecord {
            id: MEDIATOR_ID.to_owned(),
            label: MEDIATOR_LABEL.to_owned(),
            kind: NodeKind::Analyst,
            inferred_centrality: None,
        });
        model.index_by_id.insert(MEDIATOR_ID.to_owned(), slot);
        model.mediator = Some(slot);
        slot
    });

    let already_wired = model
        .edges
        .iter()
        .any(|edge| edge.kind == EdgeKind::Translation && edge.touches(mediator));
    if already_wired {
        return mediator;
    }

    for target in policy.targets(model, mediator) {
        model.edges.push(EdgeRecord {
            source: mediator,
            target,
            kind: EdgeKind::Translation,
            weight: Some(0.5),
            description: Some("Algorithmic translation (inferred connection)".to_owned()),
        });
    }

    mediator
}
