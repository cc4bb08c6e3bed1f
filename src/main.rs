//! Demo experiments for the loopfire engine.
//!
//! Examples:
//!   loopfire ring
//!   loopfire mini-brain
//!   loopfire defined-cycles
//!
//! Each experiment builds a declarative topology, scans it for feedback
//! cycles, runs the activation automaton and writes JSON artifacts under
//! `results/`.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Serialize;
use tracing::info;

use loopfire::artifact::{CycleStatsDoc, HubsDoc, ResultsDoc};
use loopfire::automaton::Automaton;
use loopfire::cycles::enumerate_cycles;
use loopfire::graph::Polarity;
use loopfire::hubs::find_hubs;
use loopfire::topology::Topology;

const RESULTS_DIR: &str = "results";
const STEPS: usize = 10;
const SCAN_MAX_LENGTH: usize = 6;
const SCAN_BUDGET: Duration = Duration::from_secs(60);
const HUB_MIN_PARTICIPATION: usize = 2;

fn main() {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() >= 2 && (args[1] == "--help" || args[1] == "-h" || args[1] == "help") {
        print_help();
        return;
    }
    if args.len() < 2 {
        print_help();
        std::process::exit(2);
    }

    let outcome = match args[1].as_str() {
        "ring" => run_experiment("ring", ring_topology()),
        "mini-brain" => run_experiment("mini_brain", mini_brain_topology()),
        "defined-cycles" => run_experiment("defined_cycles", defined_cycles_topology()),
        other => {
            eprintln!("Unknown experiment: {other}");
            print_help();
            std::process::exit(2);
        }
    };

    if let Err(e) = outcome {
        eprintln!("Failed: {e}");
        std::process::exit(1);
    }
}

fn print_help() {
    println!("loopfire (feedback-loop activation experiments)");
    println!("usage:");
    println!("  loopfire ring            three-node ring, activation chases one hop per step");
    println!("  loopfire mini-brain      four interlinked rings with cross-links");
    println!("  loopfire defined-cycles  percept/relay/response rings with an inhibitory brake");
    println!("  loopfire --help");
}

/// Minimal ring: one hop of activation per step.
fn ring_topology() -> Topology {
    Topology::new().cycle("ring", &["A", "B", "C"]).activate("A")
}

fn mini_brain_topology() -> Topology {
    Topology::new()
        .cycle("a", &["A1", "A2", "A3", "A4"])
        .cycle("b", &["B1", "B2", "B3", "B4", "B5"])
        .cycle("c", &["C1", "C2", "C3", "C4", "C5", "C6"])
        .cycle("d", &["D1", "D2", "D3", "D4", "D5", "D6", "D7"])
        .link("A1", "B3", Polarity::Excitatory)
        .link("B5", "C2", Polarity::Inhibitory)
        .link("C4", "A2", Polarity::Excitatory)
        .link("D7", "A1", Polarity::Excitatory)
        .activate("A1")
        .activate("B1")
}

/// A percept ring driving a response ring through a two-node relay, with
/// an inhibitory brake inside the response ring.
fn defined_cycles_topology() -> Topology {
    Topology::new()
        .cycle("percept", &["C1L", "C2L", "C3L"])
        .cycle("response", &["C1R", "C2R", "C3R"])
        .cycle("relay", &["MCL1", "MCL2"])
        .link("C3L", "MCL1", Polarity::Excitatory)
        .link("MCL2", "C1R", Polarity::Excitatory)
        .link("C2R", "C1R", Polarity::Inhibitory)
        .activate("C1L")
        .activate("C2L")
        .activate("C3L")
}

fn run_experiment(name: &str, topology: Topology) -> Result<(), Box<dyn std::error::Error>> {
    let net = topology.build()?;
    info!(
        experiment = name,
        nodes = net.node_count(),
        edges = net.edge_count(),
        "built topology"
    );

    let reciprocal = net.reciprocal_pairs();
    if !reciprocal.is_empty() {
        info!(pairs = reciprocal.len(), "reciprocal edge pairs present");
    }

    let scan = enumerate_cycles(&net, SCAN_MAX_LENGTH, SCAN_BUDGET);
    let hubs = find_hubs(&scan.cycles, HUB_MIN_PARTICIPATION);

    let mut automaton = Automaton::new(&net);
    automaton.seed(&topology.initial_nodes(&net)?)?;
    let trace = automaton.run(STEPS);

    fs::create_dir_all(RESULTS_DIR)?;
    write_json(
        &format!("{RESULTS_DIR}/{name}.json"),
        &ResultsDoc::new(&net, &scan.cycles, &trace),
    )?;
    write_json(
        &format!("{RESULTS_DIR}/cycle_stats.json"),
        &CycleStatsDoc::from_scan(&scan),
    )?;
    write_json(
        &format!("{RESULTS_DIR}/hub_nodes.json"),
        &HubsDoc::new(&net, &hubs),
    )?;

    println!(
        "{name}: {} nodes, {} edges, {} steps",
        net.node_count(),
        net.edge_count(),
        trace.len()
    );
    if scan.complete {
        println!(
            "cycles (len <= {SCAN_MAX_LENGTH}): {} in {:?}",
            scan.total(),
            scan.elapsed
        );
    } else {
        println!(
            "cycles (len <= {SCAN_MAX_LENGTH}): {}+ (budget expired, results partial)",
            scan.total()
        );
    }
    for (length, count) in scan.length_histogram() {
        println!("  length {length}: {count}");
    }
    println!(
        "hubs (> {HUB_MIN_PARTICIPATION} cycles): {:?}",
        hubs.iter().map(|&id| net.node_name(id)).collect::<Vec<_>>()
    );

    for step in 0..trace.len() {
        let active: Vec<&str> = trace
            .active_at(step)
            .into_iter()
            .map(|id| net.node_name(id))
            .collect();
        println!("t={step:2} active={active:?}");
    }

    println!("results written to {}/", Path::new(RESULTS_DIR).display());
    Ok(())
}

fn write_json<T: Serialize>(path: &str, value: &T) -> Result<(), Box<dyn std::error::Error>> {
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}
