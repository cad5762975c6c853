mod dataset;
mod graph;
mod mediator;

pub use dataset::{EdgeKind, NodeKind, RawDataset, RawEdge, RawNode, load_dataset, parse_dataset};
pub use graph::{EdgeRecord, GraphModel, NodeRecord};
pub use mediator::{MEDIATOR_ID, MediatorPolicy, inject_mediator};
