use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use logbook_core::{BlockingPolicy, CandidateMode, Entity, LogReader, NodeKind, ResolveConfig};
use logbook_resolve::{
    ActivityGraph, CandidatePair, Classifier, DEFAULT_GRAPH_NAME, FieldPairer, GraphBuilder,
    GraphSummary, NodeIndex, Resolver, Scorer, cluster_duplicates,
};

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "logbook",
    about = "Find people logged under more than one spelling",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format (for scripts).
    /// Also enabled by setting LOGBOOK_JSON=1.
    #[arg(long, global = true)]
    json: bool,

    /// Resolve config file (TOML). Defaults to $LOGBOOK_CONFIG or
    /// ~/.config/logbook/config.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Skip log rows with this action.
    #[arg(long, global = true, action = clap::ArgAction::Append)]
    exclude: Vec<String>,

    /// More logging on stderr (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the activity graph and summarize it.
    Info {
        /// Activity log (CSV with a header row).
        log: PathBuf,
        #[arg(long, default_value = DEFAULT_GRAPH_NAME)]
        name: String,
    },

    /// List or count candidate pairs.
    Candidates {
        log: PathBuf,
        #[command(flatten)]
        selection: Selection,
        /// Only print how many pairs there are.
        #[arg(long)]
        count: bool,
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Score candidate pairs and report likely duplicates.
    Resolve {
        log: PathBuf,
        #[command(flatten)]
        selection: Selection,
        #[arg(long)]
        threshold: Option<f64>,
        /// Print every scored pair, not just duplicates.
        #[arg(long)]
        all: bool,
    },

    /// Score two people against each other.
    Compare {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        other_name: String,
        #[arg(long)]
        other_email: String,
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// Show the effective resolve configuration.
    Config,
}

/// Candidate selection flags shared by `candidates` and `resolve`.
#[derive(Args, Default)]
struct Selection {
    /// exhaustive | neighbor-blocked
    #[arg(long)]
    mode: Option<CandidateMode>,
    /// exclude | prioritize
    #[arg(long)]
    policy: Option<BlockingPolicy>,
    /// person | object
    #[arg(long)]
    kind: Option<NodeKind>,
    /// Pair every node regardless of kind.
    #[arg(long, conflicts_with = "kind")]
    all_kinds: bool,
}

impl Selection {
    fn apply(&self, config: &mut ResolveConfig) {
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(policy) = self.policy {
            config.blocking = policy;
        }
        if let Some(kind) = self.kind {
            config.kind = Some(kind);
        }
        if self.all_kinds {
            config.kind = None;
        }
    }
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let start = Instant::now();
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let json_output = cli.json || std::env::var("LOGBOOK_JSON").is_ok_and(|v| v == "1");
    let config_path = config_path(cli.config.as_deref());
    let mut config = load_config(&config_path)?;

    match cli.command {
        Commands::Info { log, name } => {
            let graph = load_graph(&log, &cli.exclude, &name)?;
            let summary = GraphSummary::from_graph(&graph);
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": summary,
                    "meta": { "duration_ms": dur }
                }))?;
            } else {
                print!("{summary}");
            }
        }

        Commands::Candidates { log, selection, count, limit } => {
            selection.apply(&mut config);
            let graph = load_graph(&log, &cli.exclude, DEFAULT_GRAPH_NAME)?;
            let resolver = Resolver::new(config)?;
            let candidates = resolver.candidates(&graph);

            if count {
                let total = candidates.count();
                let dur = start.elapsed().as_millis();
                if json_output {
                    print_json(&serde_json::json!({
                        "status": "ok",
                        "data": { "count": total, "mode": resolver.config().mode.to_string() },
                        "meta": { "duration_ms": dur }
                    }))?;
                } else {
                    println!("{total}");
                }
                return Ok(());
            }

            let pairs: Vec<CandidatePair> = candidates
                .iter()
                .take(limit.unwrap_or(usize::MAX))
                .collect();
            let dur = start.elapsed().as_millis();

            if json_output {
                let items: Vec<_> = pairs
                    .iter()
                    .map(|p| serde_json::json!([node_json(&graph, p.left), node_json(&graph, p.right)]))
                    .collect();
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "items": items, "total": items.len() },
                    "meta": { "duration_ms": dur }
                }))?;
            } else if pairs.is_empty() {
                println!("No candidate pairs.");
            } else {
                for pair in &pairs {
                    println!(
                        "{:<40}  {}",
                        node_label(&graph, pair.left),
                        node_label(&graph, pair.right)
                    );
                }
            }
        }

        Commands::Resolve { log, selection, threshold, all } => {
            selection.apply(&mut config);
            if let Some(t) = threshold {
                config.threshold = t;
            }
            let graph = load_graph(&log, &cli.exclude, DEFAULT_GRAPH_NAME)?;
            let resolver = Resolver::new(config)?;
            let verdicts = resolver.resolve(&graph)?;
            let clusters = cluster_duplicates(&verdicts);
            let shown: Vec<_> = verdicts.iter().filter(|v| all || v.duplicate).collect();
            let dur = start.elapsed().as_millis();

            if json_output {
                let items: Vec<_> = shown
                    .iter()
                    .map(|v| {
                        serde_json::json!({
                            "left": node_json(&graph, v.pair.left),
                            "right": node_json(&graph, v.pair.right),
                            "score": v.score,
                            "duplicate": v.duplicate,
                        })
                    })
                    .collect();
                let groups: Vec<_> = clusters
                    .iter()
                    .map(|c| {
                        c.members()
                            .map(|idx| node_json(&graph, idx))
                            .collect::<Vec<_>>()
                    })
                    .collect();
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": {
                        "scored": verdicts.len(),
                        "items": items,
                        "clusters": groups,
                        "threshold": resolver.classifier().threshold(),
                    },
                    "meta": { "duration_ms": dur }
                }))?;
            } else {
                let duplicates = verdicts.iter().filter(|v| v.duplicate).count();
                println!(
                    "Scored {} pairs ({}, threshold {}): {} likely duplicates",
                    verdicts.len(),
                    resolver.config().mode,
                    resolver.classifier().threshold(),
                    duplicates
                );
                for v in &shown {
                    println!(
                        "  {:>6.2}  {}  ~  {}",
                        v.score,
                        node_label(&graph, v.pair.left),
                        node_label(&graph, v.pair.right)
                    );
                }
                if !clusters.is_empty() {
                    println!("\nClusters:");
                    for cluster in &clusters {
                        let rest: Vec<String> = cluster
                            .duplicates
                            .iter()
                            .map(|idx| node_label(&graph, *idx))
                            .collect();
                        println!("  {} = {}", node_label(&graph, cluster.canonical), rest.join(", "));
                    }
                }
            }
        }

        Commands::Compare { name, email, other_name, other_email, threshold } => {
            let left = Entity::new(name, email);
            let right = Entity::new(other_name, other_email);
            let scorer = Scorer::new(FieldPairer::new().with_empty(config.empty_placeholder.clone()));
            let classifier =
                Classifier::new(threshold.unwrap_or(config.threshold))?.with_scorer(scorer);
            let (score, duplicate) = classifier.classify(&left, &right)?;
            let fields = classifier.scorer().field_scores(&left, &right);
            let dur = start.elapsed().as_millis();

            if json_output {
                let breakdown: Vec<_> = fields
                    .iter()
                    .map(|f| serde_json::json!({ "left": f.left, "right": f.right, "score": f.score }))
                    .collect();
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "score": score, "duplicate": duplicate, "fields": breakdown },
                    "meta": { "duration_ms": dur }
                }))?;
            } else {
                for f in &fields {
                    println!("  {:>6.2}  {:?} ~ {:?}", f.score, f.left, f.right);
                }
                println!(
                    "Similarity {score:.2} ({})",
                    if duplicate { "likely duplicate" } else { "distinct" }
                );
            }
        }

        Commands::Config => {
            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "path": config_path.display().to_string(), "config": config },
                }))?;
            } else {
                println!("# {}", config_path.display());
                print!("{}", config.to_toml_string()?);
            }
        }
    }

    tracing::debug!(elapsed_ms = start.elapsed().as_millis() as u64, "done");
    Ok(())
}

// ─── Helpers ────────────────────────────────────────────────────────────────

fn init_tracing(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(format!("logbook={level}").parse()?))
        .init();
    Ok(())
}

/// `--config`, then `$LOGBOOK_CONFIG`, then `~/.config/logbook/config.toml`.
fn config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var("LOGBOOK_CONFIG") {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("logbook")
        .join("config.toml")
}

/// Missing file means defaults.
fn load_config(path: &Path) -> Result<ResolveConfig> {
    if !path.exists() {
        return Ok(ResolveConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    ResolveConfig::from_toml_str(&contents)
        .with_context(|| format!("parsing config {}", path.display()))
}

fn load_graph(log: &Path, exclude: &[String], name: &str) -> Result<ActivityGraph> {
    let reader = LogReader::new(log).with_exclude(exclude.iter().cloned());
    let mut builder = GraphBuilder::new(name);
    let triples = reader
        .triples()
        .with_context(|| format!("opening log {}", log.display()))?;
    for triple in triples {
        builder.add_triple(&triple?)?;
    }
    Ok(builder.build())
}

fn node_label(graph: &ActivityGraph, idx: NodeIndex) -> String {
    match graph.node(idx) {
        Some(node) => match node.email() {
            Some(email) => format!("{} <{}>", node.name(), email),
            None => format!("[{}]", node.name()),
        },
        None => format!("#{}", idx.index()),
    }
}

fn node_json(graph: &ActivityGraph, idx: NodeIndex) -> serde_json::Value {
    match graph.node(idx) {
        Some(node) => serde_json::json!({
            "index": idx.index(),
            "kind": node.kind(),
            "name": node.name(),
            "email": node.email(),
        }),
        None => serde_json::json!({ "index": idx.index() }),
    }
}

fn print_json(val: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(val)?);
    Ok(())
}
