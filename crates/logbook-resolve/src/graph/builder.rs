use std::borrow::Borrow;

use logbook_core::Triple;
use tracing::debug;

use super::{ActivityGraph, ActivityNode};
use crate::error::Result;

pub const DEFAULT_GRAPH_NAME: &str = "Logbook Activity";

/// Folds triples into an [`ActivityGraph`] one at a time.
///
/// Order matters: a later triple for the same person/detail pair
/// overwrites the edge's action, date and label.
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    graph: ActivityGraph,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_GRAPH_NAME)
    }
}

impl GraphBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            graph: ActivityGraph::new(name),
        }
    }

    /// Add one triple. A malformed triple leaves the graph untouched, so
    /// callers may skip it and keep going.
    pub fn add_triple(&mut self, triple: &Triple) -> Result<()> {
        triple.validate()?;

        let (person, new_person) = self
            .graph
            .ensure_node(ActivityNode::person(triple.entity.clone()));
        let (object, new_object) = self
            .graph
            .ensure_node(ActivityNode::object(triple.detail.clone()));
        let (_, new_edge) = self
            .graph
            .upsert_edge(person, object, triple.action.clone());

        if new_person {
            debug!(name = %triple.entity.name, "added person node");
        }
        if new_object {
            debug!(detail = %triple.detail.detail, "added object node");
        }
        if !new_edge {
            debug!(
                name = %triple.entity.name,
                detail = %triple.detail.detail,
                action = %triple.action.action,
                "overwrote existing edge"
            );
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn build(self) -> ActivityGraph {
        self.graph
    }
}

/// Build a graph from a finite sequence of triples, failing on the first
/// malformed one.
pub fn build_graph<I>(triples: I, name: &str) -> Result<ActivityGraph>
where
    I: IntoIterator,
    I::Item: Borrow<Triple>,
{
    let mut builder = GraphBuilder::new(name);
    for triple in triples {
        builder.add_triple(triple.borrow())?;
    }
    let graph = builder.build();
    debug!(
        name = graph.name(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "built activity graph"
    );
    Ok(graph)
}
