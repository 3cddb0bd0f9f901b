//! Bipartite activity graph: people on one side, details on the other,
//! joined by action-labeled edges.

mod builder;
mod summary;

pub use builder::{DEFAULT_GRAPH_NAME, GraphBuilder, build_graph};
pub use summary::{ActionCount, GraphSummary};

use std::borrow::Cow;
use std::collections::HashMap;

use chrono::NaiveDate;
use logbook_core::{Action, Detail, Entity, Fields, NodeKind};
use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

/// Identity of a node during graph construction.
///
/// Derived from the node kind and every field of its record, so two
/// records map to the same key iff they are exactly equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(String);

impl NodeKey {
    pub fn person(entity: &Entity) -> Self {
        // length prefix keeps ("ab", "c") and ("a", "bc") apart
        Self(format!(
            "person:{}:{}{}",
            entity.name.len(),
            entity.name,
            entity.email
        ))
    }

    pub fn object(detail: &Detail) -> Self {
        Self(format!("object:{}", detail.detail))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeRecord {
    Person(Entity),
    Object(Detail),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityNode {
    key: NodeKey,
    record: NodeRecord,
}

impl ActivityNode {
    fn person(entity: Entity) -> Self {
        Self {
            key: NodeKey::person(&entity),
            record: NodeRecord::Person(entity),
        }
    }

    fn object(detail: Detail) -> Self {
        Self {
            key: NodeKey::object(&detail),
            record: NodeRecord::Object(detail),
        }
    }

    pub fn key(&self) -> &NodeKey {
        &self.key
    }

    pub fn record(&self) -> &NodeRecord {
        &self.record
    }

    pub fn kind(&self) -> NodeKind {
        match self.record {
            NodeRecord::Person(_) => NodeKind::Person,
            NodeRecord::Object(_) => NodeKind::Object,
        }
    }

    /// Display name: the person's name or the detail text.
    pub fn name(&self) -> &str {
        match &self.record {
            NodeRecord::Person(entity) => &entity.name,
            NodeRecord::Object(detail) => &detail.detail,
        }
    }

    pub fn email(&self) -> Option<&str> {
        match &self.record {
            NodeRecord::Person(entity) => Some(&entity.email),
            NodeRecord::Object(_) => None,
        }
    }

    pub fn as_entity(&self) -> Option<&Entity> {
        match &self.record {
            NodeRecord::Person(entity) => Some(entity),
            NodeRecord::Object(_) => None,
        }
    }

    pub fn as_detail(&self) -> Option<&Detail> {
        match &self.record {
            NodeRecord::Object(detail) => Some(detail),
            NodeRecord::Person(_) => None,
        }
    }
}

/// Nodes compare through their underlying record.
impl Fields for ActivityNode {
    fn field_names(&self) -> Vec<&str> {
        match &self.record {
            NodeRecord::Person(entity) => entity.field_names(),
            NodeRecord::Object(detail) => detail.field_names(),
        }
    }

    fn field_value(&self, name: &str) -> Option<Cow<'_, str>> {
        match &self.record {
            NodeRecord::Person(entity) => entity.field_value(name),
            NodeRecord::Object(detail) => detail.field_value(name),
        }
    }
}

/// Edge between a person and a detail.
///
/// `action`/`label` reflect the most recently folded triple; `events`
/// keeps every action seen for the pair, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEdge {
    action: Action,
    events: Vec<Action>,
}

impl ActivityEdge {
    fn new(action: Action) -> Self {
        Self {
            events: vec![action.clone()],
            action,
        }
    }

    fn record(&mut self, action: Action) {
        self.events.push(action.clone());
        self.action = action;
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    pub fn date(&self) -> NaiveDate {
        self.action.date
    }

    pub fn label(&self) -> &str {
        &self.action.action
    }

    pub fn events(&self) -> &[Action] {
        &self.events
    }
}

/// Undirected activity graph, read-only once built.
#[derive(Debug, Clone)]
pub struct ActivityGraph {
    name: String,
    graph: UnGraph<ActivityNode, ActivityEdge>,
    index: HashMap<NodeKey, NodeIndex>,
}

impl ActivityGraph {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            graph: UnGraph::default(),
            index: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node(&self, index: NodeIndex) -> Option<&ActivityNode> {
        self.graph.node_weight(index)
    }

    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &ActivityNode)> + '_ {
        self.graph
            .node_indices()
            .map(move |idx| (idx, &self.graph[idx]))
    }

    /// Node indices of one kind, in insertion order.
    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = NodeIndex> + '_ {
        self.nodes()
            .filter(move |(_, node)| node.kind() == kind)
            .map(|(idx, _)| idx)
    }

    pub fn edges(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex, &ActivityEdge)> + '_ {
        self.graph
            .edge_references()
            .map(|edge| (edge.source(), edge.target(), edge.weight()))
    }

    pub fn edge_between(&self, a: NodeIndex, b: NodeIndex) -> Option<&ActivityEdge> {
        self.graph
            .find_edge(a, b)
            .and_then(|edge| self.graph.edge_weight(edge))
    }

    pub fn neighbors(&self, index: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors(index)
    }

    pub fn find(&self, key: &NodeKey) -> Option<NodeIndex> {
        self.index.get(key).copied()
    }

    pub fn find_entity(&self, entity: &Entity) -> Option<NodeIndex> {
        self.find(&NodeKey::person(entity))
    }

    pub fn find_detail(&self, detail: &Detail) -> Option<NodeIndex> {
        self.find(&NodeKey::object(detail))
    }

    /// The underlying petgraph graph.
    pub fn inner(&self) -> &UnGraph<ActivityNode, ActivityEdge> {
        &self.graph
    }

    fn ensure_node(&mut self, node: ActivityNode) -> (NodeIndex, bool) {
        if let Some(idx) = self.index.get(node.key()) {
            return (*idx, false);
        }
        let key = node.key.clone();
        let idx = self.graph.add_node(node);
        self.index.insert(key, idx);
        (idx, true)
    }

    fn upsert_edge(&mut self, a: NodeIndex, b: NodeIndex, action: Action) -> (EdgeIndex, bool) {
        match self.graph.find_edge(a, b) {
            Some(edge) => {
                self.graph[edge].record(action);
                (edge, false)
            }
            None => (self.graph.add_edge(a, b, ActivityEdge::new(action)), true),
        }
    }
}
