use crate::model::{EdgeRecord, GraphModel};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum NodeClass {
    Center,
    Territory,
    Independent,
    Default,
}

impl NodeClass {
    pub fn label_suffix(self) -> &'static str {
        match self {
            Self::Center => " (Center)",
            Self::Territory => " (Territory)",
            Self::Independent => " (Independent)",
            Self::Default => "",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum EdgeClass {
    Normal,
    Held,
    Faded,
}

/// Classification driven by the active territorialization center. Recomputed
/// once per center change and read declaratively by the scene builder and
/// the physics anchor force.
#[derive(Clone, Debug)]
pub(super) struct TerritoryState {
    center: Option<usize>,
    classes: Vec<NodeClass>,
}

impl TerritoryState {
    pub fn new(node_count: usize) -> Self {
        Self {
            center: None,
            classes: vec![NodeClass::Default; node_count],
        }
    }

    pub fn center(&self) -> Option<usize> {
        self.center
    }

    pub fn is_active(&self) -> bool {
        self.center.is_some()
    }

    pub fn class_of(&self, slot: usize) -> NodeClass {
        self.classes.get(slot).copied().unwrap_or(NodeClass::Default)
    }

    /// Select a center, or clear it by re-selecting the active one.
    pub fn toggle(&mut self, slot: usize, model: &GraphModel) {
        if self.center == Some(slot) {
            self.set_center(None, model);
        } else {
            self.set_center(Some(slot), model);
        }
    }

    /// Replaces the whole classification; switching centers never leaves
    /// residue from the previous one.
    pub fn set_center(&mut self, center: Option<usize>, model: &GraphModel) {
        self.center = center.filter(|&slot| slot < model.node_count());
        self.classes.clear();
        self.classes.resize(model.node_count(), NodeClass::Default);

        let Some(center) = self.center else {
            return;
        };

        for class in &mut self.classes {
            *class = NodeClass::Independent;
        }
        for neighbor in model.neighbors_of(center) {
            if let Some(class) = self.classes.get_mut(neighbor) {
                *class = NodeClass::Territory;
            }
        }
        self.classes[center] = NodeClass::Center;
    }

    pub fn edge_class(&self, edge: &EdgeRecord) -> EdgeClass {
        match self.center {
            None => EdgeClass::Normal,
            Some(center) if edge.touches(center) => EdgeClass::Held,
            Some(_) => EdgeClass::Faded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::parse_dataset;

    fn model() -> GraphModel {
        GraphModel::from_dataset(
            &parse_dataset(
                r#"{
                    "nodes": [
                        {"id": "a", "type": "policy"},
                        {"id": "b", "type": "concept"},
                        {"id": "c", "type": "risk"},
                        {"id": "d", "type": "right"}
                    ],
                    "edges": [
                        {"from": "a", "to": "b", "type": "reinforcing"},
                        {"from": "c", "to": "a", "type": "tension"},
                        {"from": "c", "to": "d", "type": "resistance"}
                    ]
                }"#,
            )
            .unwrap(),
        )
    }

    #[test]
    fn classification_covers_center_territory_independent() {
        let model = model();
        let mut territory = TerritoryState::new(model.node_count());
        territory.set_center(Some(model.index_by_id["a"]), &model);

        assert_eq!(territory.class_of(model.index_by_id["a"]), NodeClass::Center);
        assert_eq!(territory.class_of(model.index_by_id["b"]), NodeClass::Territory);
        assert_eq!(territory.class_of(model.index_by_id["c"]), NodeClass::Territory);
        assert_eq!(territory.class_of(model.index_by_id["d"]), NodeClass::Independent);
    }

    #[test]
    fn toggle_twice_returns_everything_to_default() {
        let model = model();
        let mut territory = TerritoryState::new(model.node_count());
        let a = model.index_by_id["a"];

        territory.toggle(a, &model);
        assert!(territory.is_active());
        territory.toggle(a, &model);

        assert!(!territory.is_active());
        for slot in 0..model.node_count() {
            assert_eq!(territory.class_of(slot), NodeClass::Default);
        }
        for edge in &model.edges {
            assert_eq!(territory.edge_class(edge), EdgeClass::Normal);
        }
    }

    #[test]
    fn switching_centers_leaves_no_residual_territory() {
        let model = model();
        let mut territory = TerritoryState::new(model.node_count());
        let a = model.index_by_id["a"];
        let d = model.index_by_id["d"];

        territory.toggle(a, &model);
        territory.toggle(d, &model);

        assert_eq!(territory.center(), Some(d));
        assert_eq!(territory.class_of(d), NodeClass::Center);
        assert_eq!(territory.class_of(model.index_by_id["c"]), NodeClass::Territory);
        // a and b belong to the old center's orbit, not the new one
        assert_eq!(territory.class_of(a), NodeClass::Independent);
        assert_eq!(territory.class_of(model.index_by_id["b"]), NodeClass::Independent);
    }

    #[test]
    fn classification_is_idempotent_for_a_fixed_center() {
        let model = model();
        let mut territory = TerritoryState::new(model.node_count());
        let a = model.index_by_id["a"];

        territory.set_center(Some(a), &model);
        let first = (0..model.node_count())
            .map(|slot| territory.class_of(slot))
            .collect::<Vec<_>>();

        territory.set_center(Some(a), &model);
        let second = (0..model.node_count())
            .map(|slot| territory.class_of(slot))
            .collect::<Vec<_>>();

        assert_eq!(first, second);
    }

    #[test]
    fn edges_touching_the_center_are_held_others_fade() {
        let model = model();
        let mut territory = TerritoryState::new(model.node_count());
        territory.set_center(Some(model.index_by_id["a"]), &model);

        let classes = model
            .edges
            .iter()
            .map(|edge| territory.edge_class(edge))
            .collect::<Vec<_>>();
        assert_eq!(classes, vec![EdgeClass::Held, EdgeClass::Held, EdgeClass::Faded]);
    }
}
