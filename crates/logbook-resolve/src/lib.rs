//! Logbook Resolve: fuzzy entity resolution over activity graphs.

pub mod candidates;
pub mod classify;
pub mod cluster;
pub mod error;
pub mod graph;
pub mod normalize;
pub mod pairing;
pub mod resolver;
pub mod similarity;

pub use candidates::{CandidatePair, Candidates, NeighborBlocked, Pairwise};
pub use classify::{Classifier, is_duplicate};
pub use cluster::{DuplicateCluster, cluster_duplicates};
pub use error::{ResolveError, Result};
pub use graph::{
    ActivityEdge, ActivityGraph, ActivityNode, DEFAULT_GRAPH_NAME, GraphBuilder, GraphSummary,
    NodeKey, NodeRecord, build_graph,
};
pub use normalize::{NormalizeRule, NormalizerTable, normalize};
pub use pairing::{FieldPair, FieldPairer, field_pairs};
pub use resolver::{Resolver, Verdict};
pub use similarity::{Scorer, partial_ratio, similarity};

pub use petgraph::graph::NodeIndex;
