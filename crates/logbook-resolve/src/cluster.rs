use std::collections::BTreeMap;

use petgraph::graph::NodeIndex;
use petgraph::unionfind::UnionFind;

use crate::candidates::CandidatePair;
use crate::resolver::Verdict;

/// Nodes judged to be the same real-world entity.
///
/// An annotation only: the graph keeps every member as its own node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateCluster {
    /// Lowest node index in the cluster.
    pub canonical: NodeIndex,
    pub duplicates: Vec<NodeIndex>,
}

impl DuplicateCluster {
    pub fn members(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        std::iter::once(self.canonical).chain(self.duplicates.iter().copied())
    }

    pub fn size(&self) -> usize {
        self.duplicates.len() + 1
    }
}

/// Group duplicate verdicts transitively: if a~b and b~c, then {a, b, c}.
///
/// Clusters come back ordered by their canonical node.
pub fn cluster_duplicates(verdicts: &[Verdict]) -> Vec<DuplicateCluster> {
    let duplicates: Vec<CandidatePair> = verdicts
        .iter()
        .filter(|v| v.duplicate)
        .map(|v| v.pair)
        .collect();

    // dense slot per node that appears in any duplicate pair
    let mut slots: BTreeMap<NodeIndex, usize> = BTreeMap::new();
    for pair in &duplicates {
        for node in [pair.left, pair.right] {
            let next = slots.len();
            slots.entry(node).or_insert(next);
        }
    }

    let mut sets = UnionFind::<usize>::new(slots.len());
    for pair in &duplicates {
        sets.union(slots[&pair.left], slots[&pair.right]);
    }
    let labels = sets.into_labeling();

    let mut components: BTreeMap<usize, Vec<NodeIndex>> = BTreeMap::new();
    for (node, slot) in &slots {
        components.entry(labels[*slot]).or_default().push(*node);
    }

    let mut clusters: Vec<DuplicateCluster> = components
        .into_values()
        .filter_map(|members| {
            let (canonical, rest) = members.split_first()?;
            Some(DuplicateCluster {
                canonical: *canonical,
                duplicates: rest.to_vec(),
            })
        })
        .collect();
    clusters.sort_by_key(|c| c.canonical);
    clusters
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(a: usize, b: usize, duplicate: bool) -> Verdict {
        Verdict {
            pair: CandidatePair::new(NodeIndex::new(a), NodeIndex::new(b)),
            score: if duplicate { 90.0 } else { 10.0 },
            duplicate,
        }
    }

    #[test]
    fn transitive_duplicates_form_one_cluster() {
        let verdicts = [
            verdict(4, 2, true),
            verdict(2, 7, true),
            verdict(1, 3, false),
            verdict(5, 9, true),
        ];
        let clusters = cluster_duplicates(&verdicts);

        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].canonical, NodeIndex::new(2));
        assert_eq!(
            clusters[0].duplicates,
            vec![NodeIndex::new(4), NodeIndex::new(7)]
        );
        assert_eq!(clusters[0].size(), 3);
        assert_eq!(clusters[1].members().count(), 2);
    }

    #[test]
    fn chained_pairs_in_any_order_merge() {
        let verdicts = [
            verdict(8, 6, true),
            verdict(0, 3, true),
            verdict(3, 6, true),
            verdict(1, 2, true),
        ];
        let clusters = cluster_duplicates(&verdicts);

        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].canonical, NodeIndex::new(0));
        assert_eq!(
            clusters[0].members().collect::<Vec<_>>(),
            vec![
                NodeIndex::new(0),
                NodeIndex::new(3),
                NodeIndex::new(6),
                NodeIndex::new(8)
            ]
        );
        assert_eq!(clusters[1].size(), 2);
    }

    #[test]
    fn non_duplicates_produce_no_clusters() {
        let clusters = cluster_duplicates(&[verdict(0, 1, false), verdict(1, 2, false)]);
        assert!(clusters.is_empty());
    }
}
