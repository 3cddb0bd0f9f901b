//! Candidate pair generation over an activity graph.
//!
//! Every generator is a cheap, restartable description of a pair
//! sequence: `iter()` walks it lazily and can be stopped at any point,
//! `count()` sizes it, `collect_pairs()` materializes it.

use logbook_core::{BlockingPolicy, CandidateMode, NodeKind};
use petgraph::graph::NodeIndex;

use crate::graph::ActivityGraph;

/// An unordered pair of graph nodes; `left` precedes `right` in graph order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CandidatePair {
    pub left: NodeIndex,
    pub right: NodeIndex,
}

impl CandidatePair {
    pub fn new(left: NodeIndex, right: NodeIndex) -> Self {
        if right < left {
            Self {
                left: right,
                right: left,
            }
        } else {
            Self { left, right }
        }
    }
}

fn select_nodes(graph: &ActivityGraph, kind: Option<NodeKind>) -> Vec<NodeIndex> {
    match kind {
        Some(kind) => graph.nodes_of_kind(kind).collect(),
        None => graph.node_indices().collect(),
    }
}

// ─── Exhaustive ─────────────────────────────────────────────

/// All `n(n-1)/2` pairs of the selected nodes.
#[derive(Debug, Clone)]
pub struct Pairwise<'g> {
    graph: &'g ActivityGraph,
    nodes: Vec<NodeIndex>,
}

impl<'g> Pairwise<'g> {
    /// `kind` restricts pairing to nodes of that kind.
    pub fn new(graph: &'g ActivityGraph, kind: Option<NodeKind>) -> Self {
        Self {
            graph,
            nodes: select_nodes(graph, kind),
        }
    }

    pub fn graph(&self) -> &'g ActivityGraph {
        self.graph
    }

    pub fn nodes(&self) -> &[NodeIndex] {
        &self.nodes
    }

    pub fn iter(&self) -> PairIter<'_> {
        PairIter::new(&self.nodes)
    }

    /// Closed form; nothing is enumerated.
    pub fn count(&self) -> usize {
        let n = self.nodes.len();
        n * n.saturating_sub(1) / 2
    }

    pub fn collect_pairs(&self) -> Vec<CandidatePair> {
        self.iter().collect()
    }
}

/// Lazy walk over `(i, j)` with `i < j`.
#[derive(Debug, Clone)]
pub struct PairIter<'a> {
    nodes: &'a [NodeIndex],
    i: usize,
    j: usize,
}

impl<'a> PairIter<'a> {
    fn new(nodes: &'a [NodeIndex]) -> Self {
        Self { nodes, i: 0, j: 1 }
    }
}

impl Iterator for PairIter<'_> {
    type Item = CandidatePair;

    fn next(&mut self) -> Option<CandidatePair> {
        if self.j >= self.nodes.len() {
            self.i += 1;
            self.j = self.i + 1;
            if self.j >= self.nodes.len() {
                return None;
            }
        }
        let pair = CandidatePair {
            left: self.nodes[self.i],
            right: self.nodes[self.j],
        };
        self.j += 1;
        Some(pair)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.nodes.len();
        if self.i >= n {
            return (0, Some(0));
        }
        // rest of row i, then every full row after it
        let rest = n.saturating_sub(self.j);
        let after = n - self.i - 1;
        let remaining = rest + after * after.saturating_sub(1) / 2;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PairIter<'_> {}

// ─── Neighbor-blocked ───────────────────────────────────────

/// Pairwise candidates filtered by whether the two nodes share a
/// neighbor in the full graph.
#[derive(Debug, Clone)]
pub struct NeighborBlocked<'g> {
    pairwise: Pairwise<'g>,
    /// Sorted neighbor lists, indexed by node index. Only filled for
    /// selected nodes.
    neighbors: Vec<Vec<NodeIndex>>,
    policy: BlockingPolicy,
}

impl<'g> NeighborBlocked<'g> {
    pub fn new(graph: &'g ActivityGraph, kind: Option<NodeKind>, policy: BlockingPolicy) -> Self {
        let pairwise = Pairwise::new(graph, kind);
        let mut neighbors = vec![Vec::new(); graph.node_count()];
        for &node in pairwise.nodes() {
            let mut hood: Vec<NodeIndex> = graph.neighbors(node).collect();
            hood.sort_unstable();
            hood.dedup();
            neighbors[node.index()] = hood;
        }
        Self {
            pairwise,
            neighbors,
            policy,
        }
    }

    pub fn policy(&self) -> BlockingPolicy {
        self.policy
    }

    pub fn graph(&self) -> &'g ActivityGraph {
        self.pairwise.graph()
    }

    /// True if the two nodes have at least one neighbor in common.
    pub fn shares_neighbor(&self, pair: CandidatePair) -> bool {
        let (Some(a), Some(b)) = (
            self.neighbors.get(pair.left.index()),
            self.neighbors.get(pair.right.index()),
        ) else {
            return false;
        };

        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => return true,
            }
        }
        false
    }

    pub fn iter(&self) -> BlockedIter<'_> {
        let phase = match self.policy {
            BlockingPolicy::Exclude => Phase::Unshared,
            BlockingPolicy::Prioritize => Phase::Shared,
        };
        BlockedIter {
            source: self,
            inner: self.pairwise.iter(),
            phase,
        }
    }

    /// Enumerates; blocking cannot be sized in closed form.
    pub fn count(&self) -> usize {
        self.iter().count()
    }

    pub fn collect_pairs(&self) -> Vec<CandidatePair> {
        self.iter().collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Yield pairs that share a neighbor, then switch to `Unshared`.
    Shared,
    /// Yield pairs with disjoint neighborhoods, then stop.
    Unshared,
}

#[derive(Debug, Clone)]
pub struct BlockedIter<'a> {
    source: &'a NeighborBlocked<'a>,
    inner: PairIter<'a>,
    phase: Phase,
}

impl Iterator for BlockedIter<'_> {
    type Item = CandidatePair;

    fn next(&mut self) -> Option<CandidatePair> {
        loop {
            match self.inner.next() {
                Some(pair) => {
                    let shared = self.source.shares_neighbor(pair);
                    if shared == (self.phase == Phase::Shared) {
                        return Some(pair);
                    }
                }
                None if self.phase == Phase::Shared => {
                    self.phase = Phase::Unshared;
                    self.inner = self.source.pairwise.iter();
                }
                None => return None,
            }
        }
    }
}

// ─── Mode dispatch ──────────────────────────────────────────

/// Candidate generator selected by [`CandidateMode`].
#[derive(Debug, Clone)]
pub enum Candidates<'g> {
    Exhaustive(Pairwise<'g>),
    Blocked(NeighborBlocked<'g>),
}

impl<'g> Candidates<'g> {
    pub fn new(
        graph: &'g ActivityGraph,
        mode: CandidateMode,
        kind: Option<NodeKind>,
        policy: BlockingPolicy,
    ) -> Self {
        match mode {
            CandidateMode::Exhaustive => Candidates::Exhaustive(Pairwise::new(graph, kind)),
            CandidateMode::NeighborBlocked => {
                Candidates::Blocked(NeighborBlocked::new(graph, kind, policy))
            }
        }
    }

    pub fn graph(&self) -> &'g ActivityGraph {
        match self {
            Candidates::Exhaustive(p) => p.graph(),
            Candidates::Blocked(b) => b.graph(),
        }
    }

    pub fn iter(&self) -> CandidateIter<'_> {
        match self {
            Candidates::Exhaustive(p) => CandidateIter::Exhaustive(p.iter()),
            Candidates::Blocked(b) => CandidateIter::Blocked(b.iter()),
        }
    }

    pub fn count(&self) -> usize {
        match self {
            Candidates::Exhaustive(p) => p.count(),
            Candidates::Blocked(b) => b.count(),
        }
    }

    pub fn collect_pairs(&self) -> Vec<CandidatePair> {
        self.iter().collect()
    }
}

#[derive(Debug, Clone)]
pub enum CandidateIter<'a> {
    Exhaustive(PairIter<'a>),
    Blocked(BlockedIter<'a>),
}

impl Iterator for CandidateIter<'_> {
    type Item = CandidatePair;

    fn next(&mut self) -> Option<CandidatePair> {
        match self {
            CandidateIter::Exhaustive(it) => it.next(),
            CandidateIter::Blocked(it) => it.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            CandidateIter::Exhaustive(it) => it.size_hint(),
            CandidateIter::Blocked(_) => (0, None),
        }
    }
}

impl<'a, 'g> IntoIterator for &'a Candidates<'g> {
    type Item = CandidatePair;
    type IntoIter = CandidateIter<'a>;

    fn into_iter(self) -> CandidateIter<'a> {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::graph::{DEFAULT_GRAPH_NAME, build_graph};
    use chrono::NaiveDate;
    use logbook_core::{Action, Detail, Entity, Triple};

    fn triple(name: &str, detail: &str) -> Triple {
        Triple::new(
            Entity::new(name, format!("{}@x.com", name.to_lowercase())),
            Action::new("View", NaiveDate::from_ymd_opt(2016, 3, 1).unwrap()),
            Detail::new(detail),
        )
    }

    fn shared_course_graph() -> ActivityGraph {
        build_graph(
            [
                triple("Ben", "ML101"),
                triple("Benjamin", "ML101"),
                triple("Tony", "Wrangling"),
            ],
            DEFAULT_GRAPH_NAME,
        )
        .unwrap()
    }

    #[test]
    fn exhaustive_count_is_n_choose_2() {
        let graph = shared_course_graph();
        let n = graph.node_count();
        let pairwise = Pairwise::new(&graph, None);
        assert_eq!(pairwise.count(), n * (n - 1) / 2);
        assert_eq!(pairwise.iter().count(), pairwise.count());
        assert_eq!(pairwise.iter().len(), pairwise.count());
    }

    #[test]
    fn pairs_are_unique_and_unordered() {
        let graph = shared_course_graph();
        let pairs = Pairwise::new(&graph, None).collect_pairs();
        let mut seen = HashSet::new();
        for pair in &pairs {
            assert!(pair.left < pair.right);
            assert!(seen.insert((pair.left, pair.right)));
        }
    }

    #[test]
    fn kind_filter_restricts_nodes() {
        let graph = shared_course_graph();
        let people = Pairwise::new(&graph, Some(NodeKind::Person));
        assert_eq!(people.nodes().len(), 3);
        assert_eq!(people.count(), 3);
        for pair in people.iter() {
            assert_eq!(graph.node(pair.left).unwrap().kind(), NodeKind::Person);
            assert_eq!(graph.node(pair.right).unwrap().kind(), NodeKind::Person);
        }
    }

    #[test]
    fn small_inputs() {
        let empty = build_graph(Vec::<Triple>::new(), "empty").unwrap();
        assert_eq!(Pairwise::new(&empty, None).count(), 0);
        assert_eq!(Pairwise::new(&empty, None).iter().next(), None);

        let graph = build_graph([triple("Ben", "ML101")], "one").unwrap();
        assert_eq!(Pairwise::new(&graph, None).collect_pairs().len(), 1);
        assert_eq!(Pairwise::new(&graph, Some(NodeKind::Person)).count(), 0);
    }

    #[test]
    fn blocked_excludes_pairs_sharing_a_detail() {
        let graph = shared_course_graph();
        let ben = graph.find_entity(&Entity::new("Ben", "ben@x.com")).unwrap();
        let benjamin = graph
            .find_entity(&Entity::new("Benjamin", "benjamin@x.com"))
            .unwrap();

        let blocked = NeighborBlocked::new(&graph, Some(NodeKind::Person), BlockingPolicy::Exclude);
        let pairs = blocked.collect_pairs();
        assert_eq!(pairs.len(), 2);
        assert!(!pairs.contains(&CandidatePair::new(ben, benjamin)));
        assert!(blocked.shares_neighbor(CandidatePair::new(benjamin, ben)));
        assert!(blocked.count() <= Pairwise::new(&graph, Some(NodeKind::Person)).count());
    }

    #[test]
    fn blocked_equals_exhaustive_without_shared_neighbors() {
        let graph = build_graph(
            [triple("Ben", "ML101"), triple("Tony", "Wrangling")],
            DEFAULT_GRAPH_NAME,
        )
        .unwrap();
        let exhaustive = Pairwise::new(&graph, None);
        let blocked = NeighborBlocked::new(&graph, None, BlockingPolicy::Exclude);
        assert_eq!(blocked.count(), exhaustive.count());
        assert_eq!(blocked.collect_pairs(), exhaustive.collect_pairs());
    }

    #[test]
    fn prioritize_yields_shared_pairs_first_and_keeps_all() {
        let graph = shared_course_graph();
        let blocked = NeighborBlocked::new(&graph, Some(NodeKind::Person), BlockingPolicy::Prioritize);
        let pairs = blocked.collect_pairs();
        assert_eq!(pairs.len(), 3);
        assert!(blocked.shares_neighbor(pairs[0]));
        assert!(!blocked.shares_neighbor(pairs[1]));
        assert!(!blocked.shares_neighbor(pairs[2]));
    }

    #[test]
    fn iteration_is_restartable_and_lazy() {
        let graph = shared_course_graph();
        let candidates = Candidates::new(&graph, CandidateMode::Exhaustive, None, BlockingPolicy::Exclude);

        let first: Vec<_> = candidates.iter().take(2).collect();
        assert_eq!(first.len(), 2);
        let all: Vec<_> = (&candidates).into_iter().collect();
        assert_eq!(&all[..2], &first[..]);
        assert_eq!(all.len(), candidates.count());

        let mut it = candidates.iter();
        it.next();
        assert_eq!(it.size_hint().0, candidates.count() - 1);
    }

    #[test]
    fn mode_dispatch() {
        let graph = shared_course_graph();
        let blocked = Candidates::new(
            &graph,
            CandidateMode::NeighborBlocked,
            Some(NodeKind::Person),
            BlockingPolicy::Exclude,
        );
        assert!(matches!(blocked, Candidates::Blocked(_)));
        assert_eq!(blocked.count(), 2);
        assert_eq!(blocked.collect_pairs().len(), 2);
        assert_eq!(blocked.graph().node_count(), 5);
    }
}
