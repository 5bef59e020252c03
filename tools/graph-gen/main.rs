use clap::Parser;
use kairo::graph::FsmGraph;
use kairo::guard::{ExpressionCatalog, ExpressionOption, Guard, GuardMode};
use kairo::id::NodeId;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// A CLI tool to generate random FSM graphs in the native format
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated graph to
    #[arg(short, long, default_value = "generated.fsm")]
    output: String,

    /// Number of state nodes
    #[arg(long, default_value_t = 8)]
    states: usize,

    /// Number of conditional (If / Cond) nodes
    #[arg(long, default_value_t = 12)]
    conditions: usize,

    /// Number of link attempts; infeasible ones are skipped
    #[arg(long, default_value_t = 60)]
    links: usize,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

const OPTIONS: &[(&str, &str, &str)] = &[
    ("Movement", "on ground", "self.on_ground"),
    ("Movement", "falling", "self.velocity.y < 0"),
    ("Movement", "running", "self.speed > 4"),
    ("Combat", "attacking", "self.attack_timer > 0"),
    ("Combat", "low health", "self.health < 20"),
    ("Combat", "target visible", "self:can_see(self.target)"),
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if cli.states == 0 {
        eprintln!("Error: --states must be at least 1");
        std::process::exit(1);
    }

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let catalog = Arc::new(build_catalog()?);
    let mut graph = FsmGraph::builder()
        .with_shared_catalog(Arc::clone(&catalog))
        .build();

    let mut nodes: Vec<NodeId> = Vec::new();
    for i in 0..cli.states {
        nodes.push(graph.create_state(&format!("State {}", i))?);
    }
    for _ in 0..cli.conditions {
        let id = if rng.random_bool(0.5) {
            graph.create_if()?
        } else {
            graph.create_cond(rng.random_range(1..=4))?
        };
        configure_guards(&mut graph, id, &catalog, &mut rng);
        nodes.push(id);
    }

    let mut created = 0;
    for _ in 0..cli.links {
        let from_node = nodes[rng.random_range(0..nodes.len())];
        let to_node = nodes[rng.random_range(0..nodes.len())];
        let (Some(from), Some(to)) = (
            graph.node(from_node).and_then(|n| pick(n.outputs(), &mut rng)),
            graph.node(to_node).and_then(|n| pick(n.inputs(), &mut rng)),
        ) else {
            continue;
        };
        if graph.try_link(from, to).is_ok() {
            created += 1;
        }
    }

    graph.save(&cli.output)?;
    info!(
        nodes = graph.node_count(),
        links = created,
        attempts = cli.links,
        path = %cli.output,
        "generated graph"
    );

    Ok(())
}

fn build_catalog() -> Result<ExpressionCatalog, Box<dyn std::error::Error>> {
    let mut catalog = ExpressionCatalog::new();
    for (category, shorthand, expression) in OPTIONS {
        catalog.add_option(category, ExpressionOption::new(*shorthand, *expression))?;
    }
    Ok(catalog)
}

/// Gives every guard of `node` either a random free-text expression or a
/// random selection of catalog options.
fn configure_guards(
    graph: &mut FsmGraph,
    node: NodeId,
    catalog: &ExpressionCatalog,
    rng: &mut StdRng,
) {
    let Some(node) = graph.node_mut(node) else {
        return;
    };
    let outputs = node.outputs().to_vec();
    if let Some(if_node) = node.as_if_mut() {
        randomize_guard(if_node.guard_mut(), catalog, rng);
    } else if let Some(cond) = node.as_cond_mut() {
        for output in outputs {
            if let Some(guard) = cond.guard_mut(output) {
                randomize_guard(guard, catalog, rng);
            }
        }
    }
}

fn randomize_guard(guard: &mut Guard, catalog: &ExpressionCatalog, rng: &mut StdRng) {
    if rng.random_bool(0.3) {
        guard.set_mode(GuardMode::FreeText);
        guard.set_text(&format!("self.counter > {}", rng.random_range(0..100)));
        return;
    }
    guard.set_mode(GuardMode::Structured);
    for (_, options) in catalog.categories() {
        for option in options {
            if rng.random_bool(0.25) {
                guard.insert_option(Arc::clone(option));
            }
        }
    }
}

fn pick<T: Copy>(items: &[T], rng: &mut StdRng) -> Option<T> {
    if items.is_empty() {
        None
    } else {
        Some(items[rng.random_range(0..items.len())])
    }
}
