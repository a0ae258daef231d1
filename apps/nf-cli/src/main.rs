use clap::{Parser, Subcommand};
use nf_project::{build_network, ProjectResult};
use nf_sim::{run_sim_with_progress, Checkpoint, Network, SimOptions, SolveStatus};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

#[derive(Parser)]
#[command(name = "nf-cli")]
#[command(about = "NetFlux CLI - nodal network simulation tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a network file and initialize the network it describes
    Validate {
        /// Path to the network YAML or JSON file
        network_path: PathBuf,
    },
    /// List the islands of a network
    Islands {
        /// Path to the network YAML or JSON file
        network_path: PathBuf,
    },
    /// Run a fixed-step simulation
    Run {
        /// Path to the network YAML or JSON file
        network_path: PathBuf,
        /// Time step in seconds
        #[arg(long, default_value_t = 0.1)]
        dt: f64,
        /// Simulated duration in seconds
        #[arg(long, default_value_t = 1.0)]
        t_end: f64,
        /// Record every N-th step
        #[arg(long, default_value_t = 1)]
        record_every: usize,
        /// Stop on the first failed step
        #[arg(long)]
        halt_on_failure: bool,
        /// Start from a checkpoint written by an earlier run
        #[arg(long)]
        restore: Option<PathBuf>,
        /// Write a checkpoint of the final state
        #[arg(long)]
        checkpoint: Option<PathBuf>,
    },
}

fn main() -> ProjectResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { network_path } => cmd_validate(&network_path),
        Commands::Islands { network_path } => cmd_islands(&network_path),
        Commands::Run {
            network_path,
            dt,
            t_end,
            record_every,
            halt_on_failure,
            restore,
            checkpoint,
        } => {
            let opts = SimOptions {
                dt,
                t_end,
                record_every,
                halt_on_failure,
                ..SimOptions::default()
            };
            cmd_run(&network_path, &opts, restore.as_deref(), checkpoint.as_deref())
        }
    }
}

fn load_network(path: &Path) -> ProjectResult<(String, Network)> {
    let def = nf_project::load(path)?;
    let network = build_network(&def)?;
    Ok((def.name, network))
}

fn cmd_validate(network_path: &Path) -> ProjectResult<()> {
    println!("Validating network: {}", network_path.display());
    let (name, network) = load_network(network_path)?;
    println!(
        "✓ '{}' is valid ({} nodes, {} links)",
        name,
        network.topology().node_count(),
        network.topology().link_count()
    );
    Ok(())
}

fn cmd_islands(network_path: &Path) -> ProjectResult<()> {
    let (name, mut network) = load_network(network_path)?;
    let islands = network.islands().clone();
    let topology = network.topology();

    println!("Islands in '{}':", name);
    for (index, island) in islands.islands().iter().enumerate() {
        let nodes: Vec<&str> = island
            .nodes
            .iter()
            .filter_map(|n| topology.node(*n))
            .map(|n| n.name.as_str())
            .collect();
        let state = if island.is_idle() { "  (idle)" } else { "" };
        println!(
            "  #{} - {} node(s), {} link(s){}: {}",
            index,
            island.nodes.len(),
            island.links.len(),
            state,
            nodes.join(", ")
        );
    }
    let refs = islands.reference_links();
    if !refs.is_empty() {
        let names: Vec<&str> = refs
            .iter()
            .filter_map(|l| topology.link(*l))
            .map(|l| l.name.as_str())
            .collect();
        println!("  Ground-only links: {}", names.join(", "));
    }
    Ok(())
}

fn cmd_run(
    network_path: &Path,
    opts: &SimOptions,
    restore: Option<&Path>,
    checkpoint: Option<&Path>,
) -> ProjectResult<()> {
    let (name, mut network) = load_network(network_path)?;
    if let Some(path) = restore {
        let content = std::fs::read_to_string(path)?;
        network.restore(&Checkpoint::from_json(&content)?)?;
        println!("Restored checkpoint {} at t = {:.3} s", path.display(), network.time());
    }

    println!("Running '{}'", name);
    println!("  dt = {:.3} s, t_end = {:.3} s", opts.dt, opts.t_end);

    let started = Instant::now();
    let mut last_emit = Instant::now();
    let mut degraded = 0usize;
    let mut failed = 0usize;
    let record = run_sim_with_progress(&mut network, opts, |p| {
        match p.status {
            SolveStatus::ConvergedDegraded => degraded += 1,
            SolveStatus::Failed => failed += 1,
            SolveStatus::Converged => {}
        }
        if last_emit.elapsed().as_millis() >= 100 {
            print!(
                "\rt={:.3}/{:.3}s  step={}  minor={}  status={:?}",
                p.t, p.t_end, p.step, p.minor_steps, p.status
            );
            let _ = io::stdout().flush();
            last_emit = Instant::now();
        }
    })?;
    print!("\r{}\r", " ".repeat(80));
    let _ = io::stdout().flush();

    info!(steps = network.steps(), elapsed_s = started.elapsed().as_secs_f64(), "run finished");
    println!("✓ Simulation completed in {:.3}s", started.elapsed().as_secs_f64());
    println!("  Time points: {}", record.t.len());
    println!("  Degraded steps: {}", degraded);
    println!("  Failed steps:   {}", failed);
    if let Some(worst) = record.worst {
        println!("  Worst status:   {:?}", worst);
    }

    println!("\nFinal potentials:");
    for node in network.topology().nodes() {
        let potential = network.potential(node.id).unwrap_or(f64::NAN);
        println!("  {:<16} {:>14.6}", node.name, potential);
    }

    if let Some(path) = checkpoint {
        std::fs::write(path, network.checkpoint().to_json()?)?;
        println!("\nCheckpoint written to {}", path.display());
    }
    Ok(())
}
