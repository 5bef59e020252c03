use clap::{ArgAction, Parser, Subcommand};
use itertools::Itertools;
use kairo::prelude::*;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Inspect, validate and export FSM graphs saved in the native format
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Expression catalog JSON used to resolve structured guard options
    #[arg(short, long, global = true)]
    catalog: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a summary of every node in the graph
    Inspect {
        /// Path to the saved graph
        path: String,
    },
    /// Linearize the graph reachable from a state node
    Export {
        /// Path to the saved graph
        path: String,
        /// Id of the root state. Defaults to the state with the lowest id.
        #[arg(short, long)]
        root: Option<u64>,
        /// Print the statements as JSON instead of the line format
        #[arg(long)]
        json: bool,
    },
    /// Load the graph and check its structural invariants
    Validate {
        /// Path to the saved graph
        path: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let catalog = cli.catalog.as_deref().map(|path| {
        ExpressionCatalog::from_file(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load catalog: {}", e)))
    });

    match cli.command {
        Command::Inspect { path } => run_inspect(&load_graph(&path, catalog)),
        Command::Export { path, root, json } => run_export(&load_graph(&path, catalog), root, json),
        Command::Validate { path } => run_validate(&path, catalog),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_graph(path: &str, catalog: Option<ExpressionCatalog>) -> FsmGraph {
    let mut builder = FsmGraph::builder();
    if let Some(catalog) = catalog {
        builder = builder.with_catalog(catalog);
    }
    let mut graph = builder.build();
    graph
        .load(path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load graph '{}': {}", path, e)));
    graph
}

fn run_inspect(graph: &FsmGraph) {
    println!("--- Graph Summary ---");
    println!("Nodes:           {}", graph.node_count());
    println!("Pins:            {}", graph.pin_count());
    println!("Links:           {}", graph.link_count());
    println!("Last id issued:  {}", graph.last_allocated_id());

    println!("\n--- Nodes ---");
    for node in graph.nodes().sorted_by_key(|node| node.id()) {
        let detail = match node.kind() {
            NodeKind::State(state) => format!("\"{}\"", state.name()),
            NodeKind::If(if_node) => format!("[{}]", if_node.guard().preview()),
            NodeKind::Cond(_) => node
                .cond_guards()
                .iter()
                .map(|(_, guard)| format!("[{}]", guard.preview()))
                .join(" / "),
        };
        println!("#{:<6} {:<6} {}", node.id(), node.variant(), detail);

        for (index, output) in node.outputs().iter().enumerate() {
            let targets = graph.targets_of(*output).map(|target| target.id()).join(", ");
            if !targets.is_empty() {
                println!("         out {} -> {}", index, targets);
            }
        }
    }
}

fn run_export(graph: &FsmGraph, root: Option<u64>, json: bool) {
    let root = root.map(NodeId::new).or_else(|| {
        graph
            .nodes()
            .filter(|node| node.variant() == NodeVariant::State)
            .map(|node| node.id())
            .min()
    });
    let Some(root) = root else {
        exit_with_error("The graph has no state node to export from.");
    };

    let statements =
        export(graph, root).unwrap_or_else(|e| exit_with_error(&format!("Export failed: {}", e)));

    if json {
        let output = serde_json::to_string_pretty(&statements)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize export: {}", e)));
        println!("{}", output);
    } else {
        print!("{}", render(&statements));
    }
}

fn run_validate(path: &str, catalog: Option<ExpressionCatalog>) {
    let start = Instant::now();
    let graph = load_graph(path, catalog);
    if let Err(e) = graph.validate() {
        exit_with_error(&format!("Graph is invalid: {}", e));
    }
    println!(
        "'{}' is valid: {} nodes, {} links (checked in {:?})",
        path,
        graph.node_count(),
        graph.link_count(),
        start.elapsed()
    );
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
