use std::collections::HashMap;
use std::fmt;

use logbook_core::{BlockingPolicy, NodeKind};
use serde::Serialize;

use super::ActivityGraph;
use crate::candidates::{NeighborBlocked, Pairwise};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionCount {
    pub label: String,
    pub count: usize,
}

/// Shape of an activity graph and how much comparison work it implies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphSummary {
    pub name: String,
    pub nodes: usize,
    pub people: usize,
    pub objects: usize,
    pub edges: usize,
    pub pairwise_comparisons: usize,
    pub blocked_comparisons: usize,
    /// Edge labels, most common first.
    pub action_counts: Vec<ActionCount>,
}

impl GraphSummary {
    /// Comparison counts cover every node, unfiltered by kind.
    pub fn from_graph(graph: &ActivityGraph) -> Self {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for (_, _, edge) in graph.edges() {
            *counts.entry(edge.label()).or_default() += 1;
        }
        let mut action_counts: Vec<ActionCount> = counts
            .into_iter()
            .map(|(label, count)| ActionCount {
                label: label.to_string(),
                count,
            })
            .collect();
        action_counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));

        Self {
            name: graph.name().to_string(),
            nodes: graph.node_count(),
            people: graph.nodes_of_kind(NodeKind::Person).count(),
            objects: graph.nodes_of_kind(NodeKind::Object).count(),
            edges: graph.edge_count(),
            pairwise_comparisons: Pairwise::new(graph, None).count(),
            blocked_comparisons: NeighborBlocked::new(graph, None, BlockingPolicy::Exclude).count(),
            action_counts,
        }
    }

    pub fn distinct_actions(&self) -> usize {
        self.action_counts.len()
    }
}

impl fmt::Display for GraphSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Name: {}", self.name)?;
        writeln!(
            f,
            "Number of nodes: {} ({} people, {} objects)",
            self.nodes, self.people, self.objects
        )?;
        writeln!(f, "Number of edges: {}", self.edges)?;
        writeln!(f, "Number of Actions: {}", self.distinct_actions())?;
        writeln!(f, "Number of Pairwise Comparisons: {}", self.pairwise_comparisons)?;
        writeln!(
            f,
            "Number of Edge Blocked Comparisons: {}",
            self.blocked_comparisons
        )?;
        writeln!(f)?;
        writeln!(f, "Action Counts")?;
        writeln!(f, "-------------")?;
        for action in &self.action_counts {
            writeln!(f, "{}: {}", action.label, action.count)?;
        }
        Ok(())
    }
}
