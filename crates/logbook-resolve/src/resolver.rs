use logbook_core::ResolveConfig;
use rayon::iter::{ParallelBridge, ParallelIterator};
use tracing::info;

use crate::candidates::{CandidatePair, Candidates};
use crate::classify::Classifier;
use crate::error::{ResolveError, Result};
use crate::graph::ActivityGraph;
use crate::pairing::FieldPairer;
use crate::similarity::Scorer;

/// Score and verdict for one candidate pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub pair: CandidatePair,
    pub score: f64,
    pub duplicate: bool,
}

/// Runs candidate generation, scoring and classification over a graph.
#[derive(Debug, Clone)]
pub struct Resolver {
    config: ResolveConfig,
    classifier: Classifier,
}

impl Resolver {
    pub fn new(config: ResolveConfig) -> Result<Self> {
        let scorer = Scorer::new(FieldPairer::new().with_empty(config.empty_placeholder.clone()));
        let classifier = Classifier::new(config.threshold)?.with_scorer(scorer);
        config.validate()?;
        Ok(Self { config, classifier })
    }

    pub fn config(&self) -> &ResolveConfig {
        &self.config
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn candidates<'g>(&self, graph: &'g ActivityGraph) -> Candidates<'g> {
        Candidates::new(
            graph,
            self.config.mode,
            self.config.kind,
            self.config.blocking,
        )
    }

    pub fn score_pair(&self, graph: &ActivityGraph, pair: CandidatePair) -> Result<Verdict> {
        let left = graph
            .node(pair.left)
            .ok_or(ResolveError::UnknownNode(pair.left.index()))?;
        let right = graph
            .node(pair.right)
            .ok_or(ResolveError::UnknownNode(pair.right.index()))?;
        let (score, duplicate) = self.classifier.classify(left, right)?;
        Ok(Verdict {
            pair,
            score,
            duplicate,
        })
    }

    /// Sequential, lazy scoring in candidate order. Stop consuming to stop
    /// scoring.
    pub fn scores<'a>(
        &'a self,
        candidates: &'a Candidates<'a>,
    ) -> impl Iterator<Item = Result<Verdict>> + 'a {
        self.score_pairs(candidates.graph(), candidates.iter())
    }

    /// Score pairs from any source, pulling one pair per verdict.
    pub fn score_pairs<'a, I>(
        &'a self,
        graph: &'a ActivityGraph,
        pairs: I,
    ) -> impl Iterator<Item = Result<Verdict>> + 'a
    where
        I: IntoIterator<Item = CandidatePair>,
        I::IntoIter: 'a,
    {
        pairs
            .into_iter()
            .map(move |pair| self.score_pair(graph, pair))
    }

    /// Score every candidate pair on the rayon pool.
    ///
    /// Verdicts come back sorted by pair, whatever order they finished in.
    pub fn resolve(&self, graph: &ActivityGraph) -> Result<Vec<Verdict>> {
        let candidates = self.candidates(graph);
        let mut verdicts = candidates
            .iter()
            .par_bridge()
            .map(|pair| self.score_pair(graph, pair))
            .collect::<Result<Vec<_>>>()?;
        verdicts.sort_by_key(|v| v.pair);

        info!(
            graph = graph.name(),
            mode = %self.config.mode,
            pairs = verdicts.len(),
            duplicates = verdicts.iter().filter(|v| v.duplicate).count(),
            threshold = self.classifier.threshold(),
            "resolved candidate pairs"
        );
        Ok(verdicts)
    }

    /// Only the pairs classified as duplicates.
    pub fn duplicates(&self, graph: &ActivityGraph) -> Result<Vec<Verdict>> {
        let mut verdicts = self.resolve(graph)?;
        verdicts.retain(|v| v.duplicate);
        Ok(verdicts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{DEFAULT_GRAPH_NAME, build_graph};
    use std::cell::Cell;
    use chrono::NaiveDate;
    use logbook_core::{Action, BlockingPolicy, CandidateMode, Detail, Entity, NodeKind, Triple};

    fn triple(name: &str, email: &str, d: u32, detail: &str) -> Triple {
        Triple::new(
            Entity::new(name, email),
            Action::new("View", NaiveDate::from_ymd_opt(2016, 1, d).unwrap()),
            Detail::new(detail),
        )
    }

    fn people_config(mode: CandidateMode) -> ResolveConfig {
        ResolveConfig {
            mode,
            kind: Some(NodeKind::Person),
            ..Default::default()
        }
    }

    #[test]
    fn two_bens_resolve_as_duplicates_over_distinct_nodes() {
        let graph = build_graph(
            [
                triple("Ben Bengfort", "bb@x.com", 1, "ML101"),
                triple("Benjamin Bengfort", "bb@x.com", 2, "ML101"),
            ],
            DEFAULT_GRAPH_NAME,
        )
        .unwrap();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);

        let resolver = Resolver::new(people_config(CandidateMode::Exhaustive)).unwrap();
        let verdicts = resolver.resolve(&graph).unwrap();
        assert_eq!(verdicts.len(), 1);
        assert!(verdicts[0].score > 65.0);
        assert!(verdicts[0].duplicate);

        // they share ML101, so default blocking never compares them
        let blocked = Resolver::new(people_config(CandidateMode::NeighborBlocked)).unwrap();
        assert!(blocked.resolve(&graph).unwrap().is_empty());

        let prioritized = Resolver::new(ResolveConfig {
            blocking: BlockingPolicy::Prioritize,
            ..people_config(CandidateMode::NeighborBlocked)
        })
        .unwrap();
        assert_eq!(prioritized.duplicates(&graph).unwrap().len(), 1);
    }

    #[test]
    fn parallel_resolve_matches_sequential_scores() {
        let graph = build_graph(
            [
                triple("Ben Bengfort", "bb@x.com", 1, "ML101"),
                triple("Benjamin Bengfort", "bb@x.com", 2, "Wrangling"),
                triple("Tony Ojeda", "tojeda@x.com", 3, "ML101"),
                triple("Anthony Ojeda", "tojeda@x.com", 4, "Visualization"),
                triple("Rebecca Bilbro", "rbilbro@x.com", 5, "Visualization"),
            ],
            DEFAULT_GRAPH_NAME,
        )
        .unwrap();
        let resolver = Resolver::new(people_config(CandidateMode::NeighborBlocked)).unwrap();
        let candidates = resolver.candidates(&graph);

        let mut sequential: Vec<Verdict> = resolver
            .scores(&candidates)
            .collect::<Result<Vec<_>>>()
            .unwrap();
        sequential.sort_by_key(|v| v.pair);
        let parallel = resolver.resolve(&graph).unwrap();
        assert_eq!(sequential, parallel);
        assert_eq!(parallel.len(), candidates.count());

        let names: Vec<(&str, &str)> = resolver
            .duplicates(&graph)
            .unwrap()
            .iter()
            .map(|v| {
                (
                    graph.node(v.pair.left).unwrap().name(),
                    graph.node(v.pair.right).unwrap().name(),
                )
            })
            .collect();
        assert!(names.contains(&("Ben Bengfort", "Benjamin Bengfort")));
        assert!(names.contains(&("Tony Ojeda", "Anthony Ojeda")));
    }

    #[test]
    fn lazy_scores_stop_early() {
        let graph = build_graph(
            [
                triple("Ben Bengfort", "bb@x.com", 1, "ML101"),
                triple("Tony Ojeda", "to@x.com", 2, "Wrangling"),
                triple("Rebecca Bilbro", "rb@x.com", 3, "Visualization"),
            ],
            DEFAULT_GRAPH_NAME,
        )
        .unwrap();
        let resolver = Resolver::new(people_config(CandidateMode::Exhaustive)).unwrap();
        let candidates = resolver.candidates(&graph);
        assert_eq!(candidates.count(), 3);

        let pulled = Cell::new(0);
        let source = candidates.iter().inspect(|_| pulled.set(pulled.get() + 1));
        let mut verdicts = resolver.score_pairs(&graph, source);
        assert_eq!(pulled.get(), 0, "nothing is scored before the first pull");

        let first = verdicts.next().unwrap().unwrap();
        assert_eq!(pulled.get(), 1);
        assert_eq!(first.pair, candidates.iter().next().unwrap());
        drop(verdicts);
        assert_eq!(pulled.get(), 1, "remaining pairs were never generated");

        let taken: Vec<_> = resolver.scores(&candidates).take(2).collect();
        assert_eq!(taken.len(), 2);
    }

    #[test]
    fn invalid_threshold_is_rejected() {
        let err = Resolver::new(ResolveConfig {
            threshold: -5.0,
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ResolveError::InvalidThreshold(t) if t == -5.0));
    }

    #[test]
    fn unknown_node_is_an_error() {
        let graph = build_graph(
            [triple("Ben Bengfort", "bb@x.com", 1, "ML101")],
            DEFAULT_GRAPH_NAME,
        )
        .unwrap();
        let resolver = Resolver::new(ResolveConfig::default()).unwrap();
        let bogus = CandidatePair::new(
            petgraph::graph::NodeIndex::new(0),
            petgraph::graph::NodeIndex::new(42),
        );
        assert!(matches!(
            resolver.score_pair(&graph, bogus),
            Err(ResolveError::UnknownNode(42))
        ));
    }
}
