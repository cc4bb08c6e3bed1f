//! Persisted document types for graphs, traces and cycle statistics.
//!
//! The engine itself only hands out in-memory values; these documents fix
//! the JSON schema the surrounding tooling reads and writes, keeping it
//! key-compatible with the historical result files
//! (`cycle_stats.json`, `hub_nodes.json`, combined experiment results).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::automaton::ActivationTrace;
use crate::cycles::CycleScan;
use crate::error::EngineError;
use crate::graph::{Network, NodeId, Polarity, DEFAULT_THRESHOLD};

/// Persisted graph: node list, `(source, target, polarity)` triples and
/// optional threshold overrides (absent means 1).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphDoc {
    pub nodes: Vec<String>,
    pub edges: Vec<(String, String, Polarity)>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub thresholds: BTreeMap<String, u32>,
}

impl GraphDoc {
    pub fn from_network(net: &Network) -> Self {
        let thresholds = net
            .nodes()
            .filter(|&id| net.threshold(id) != DEFAULT_THRESHOLD)
            .map(|id| (net.node_name(id).to_string(), net.threshold(id)))
            .collect();

        Self {
            nodes: net.node_names().map(|s| s.to_string()).collect(),
            edges: net
                .edges()
                .map(|e| {
                    (
                        net.node_name(e.source).to_string(),
                        net.node_name(e.target).to_string(),
                        e.polarity,
                    )
                })
                .collect(),
            thresholds,
        }
    }

    /// Rebuild the network. Edge endpoints missing from the node list are
    /// registered on the fly, the same policy as [`Network::add_edge`];
    /// threshold entries must name listed nodes and be at least 1.
    pub fn to_network(&self) -> Result<Network, EngineError> {
        let mut net = Network::new();
        for name in &self.nodes {
            net.add_node(name);
        }
        for (source, target, polarity) in &self.edges {
            net.add_edge(source, target, *polarity);
        }
        for (name, threshold) in &self.thresholds {
            let id = net
                .node_id(name)
                .ok_or_else(|| EngineError::UnknownNode(name.clone()))?;
            net.set_threshold(id, *threshold)?;
        }
        Ok(net)
    }
}

/// Combined experiment payload: the graph, the cycle list and the full
/// activation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsDoc {
    pub nodes: Vec<String>,
    pub edges: Vec<(String, String, Polarity)>,
    pub cycles: Vec<Vec<String>>,
    pub activation_history: Vec<BTreeMap<String, bool>>,
}

impl ResultsDoc {
    pub fn new(net: &Network, cycles: &[Vec<NodeId>], trace: &ActivationTrace) -> Self {
        let graph = GraphDoc::from_network(net);
        Self {
            nodes: graph.nodes,
            edges: graph.edges,
            cycles: cycle_names(net, cycles),
            activation_history: trace_history(net, trace),
        }
    }
}

/// Cycle statistics artifact (`cycle_stats.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleStatsDoc {
    pub total_cycles: usize,
    pub cycle_lengths: Vec<usize>,
}

impl CycleStatsDoc {
    pub fn from_scan(scan: &CycleScan) -> Self {
        Self {
            total_cycles: scan.total(),
            cycle_lengths: scan.cycles.iter().map(|c| c.len()).collect(),
        }
    }
}

/// Hub artifact (`hub_nodes.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubsDoc {
    pub overlapping_hubs: Vec<String>,
}

impl HubsDoc {
    pub fn new(net: &Network, hubs: &[NodeId]) -> Self {
        Self {
            overlapping_hubs: hubs.iter().map(|&id| net.node_name(id).to_string()).collect(),
        }
    }
}

/// Cycles as name sequences, in traversal order.
pub fn cycle_names(net: &Network, cycles: &[Vec<NodeId>]) -> Vec<Vec<String>> {
    cycles
        .iter()
        .map(|cycle| cycle.iter().map(|&id| net.node_name(id).to_string()).collect())
        .collect()
}

/// The trace as per-step `name -> active` mappings.
pub fn trace_history(net: &Network, trace: &ActivationTrace) -> Vec<BTreeMap<String, bool>> {
    trace
        .states()
        .iter()
        .map(|state| {
            net.nodes()
                .map(|id| (net.node_name(id).to_string(), state[id]))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::Automaton;
    use crate::cycles::enumerate_cycles;
    use std::time::Duration;

    fn sample_network() -> Network {
        let mut net = Network::new();
        net.add_edge("A", "B", Polarity::Excitatory);
        net.add_edge("B", "C", Polarity::Excitatory);
        net.add_edge("C", "A", Polarity::Excitatory);
        net.add_edge("X", "B", Polarity::Inhibitory);
        let b = net.node_id("B").unwrap();
        net.set_threshold(b, 2).unwrap();
        net
    }

    #[test]
    fn graph_doc_round_trips() {
        let net = sample_network();
        let doc = GraphDoc::from_network(&net);

        let json = serde_json::to_string(&doc).unwrap();
        let parsed: GraphDoc = serde_json::from_str(&json).unwrap();
        let rebuilt = parsed.to_network().unwrap();

        assert_eq!(
            net.node_names().collect::<Vec<_>>(),
            rebuilt.node_names().collect::<Vec<_>>()
        );
        assert_eq!(net.edge_count(), rebuilt.edge_count());
        for (orig, copy) in net.edges().zip(rebuilt.edges()) {
            assert_eq!(orig, copy);
        }
        for id in net.nodes() {
            assert_eq!(net.threshold(id), rebuilt.threshold(id));
        }
    }

    #[test]
    fn polarity_serializes_as_lowercase_tags() {
        let json = serde_json::to_string(&Polarity::Excitatory).unwrap();
        assert_eq!(json, "\"excitatory\"");
        let parsed: Polarity = serde_json::from_str("\"inhibitory\"").unwrap();
        assert_eq!(parsed, Polarity::Inhibitory);
    }

    #[test]
    fn malformed_polarity_tag_is_a_hard_error() {
        assert!(serde_json::from_str::<Polarity>("\"modulatory\"").is_err());
    }

    #[test]
    fn default_thresholds_are_omitted_from_the_doc() {
        let net = sample_network();
        let doc = GraphDoc::from_network(&net);
        assert_eq!(doc.thresholds, BTreeMap::from([("B".to_string(), 2)]));
    }

    #[test]
    fn doc_with_unlisted_edge_endpoint_auto_registers() {
        let doc = GraphDoc {
            nodes: vec!["A".to_string()],
            edges: vec![("A".to_string(), "B".to_string(), Polarity::Excitatory)],
            thresholds: BTreeMap::new(),
        };
        let net = doc.to_network().unwrap();
        assert!(net.node_id("B").is_some());
    }

    #[test]
    fn doc_threshold_naming_no_node_fails() {
        let doc = GraphDoc {
            nodes: vec!["A".to_string()],
            edges: Vec::new(),
            thresholds: BTreeMap::from([("Q".to_string(), 2)]),
        };
        assert_eq!(
            doc.to_network().unwrap_err(),
            EngineError::UnknownNode("Q".to_string())
        );
    }

    #[test]
    fn results_doc_uses_the_historical_keys() {
        let mut net = Network::new();
        net.add_edge("A", "B", Polarity::Excitatory);
        net.add_edge("B", "A", Polarity::Excitatory);

        let scan = enumerate_cycles(&net, 4, Duration::from_secs(1));
        let mut automaton = Automaton::new(&net);
        automaton.seed_named(&["A"]).unwrap();
        let trace = automaton.run(2);

        let doc = ResultsDoc::new(&net, &scan.cycles, &trace);
        let value: serde_json::Value = serde_json::to_value(&doc).unwrap();

        assert!(value.get("nodes").is_some());
        assert!(value.get("edges").is_some());
        assert_eq!(value["cycles"][0][0], "A");
        assert_eq!(value["activation_history"][0]["B"], true);
        assert_eq!(value["activation_history"][1]["A"], true);
    }

    #[test]
    fn cycle_stats_doc_matches_the_scan() {
        let mut net = Network::new();
        net.add_edge("A", "A", Polarity::Excitatory);
        net.add_edge("B", "C", Polarity::Excitatory);
        net.add_edge("C", "B", Polarity::Excitatory);

        let scan = enumerate_cycles(&net, 4, Duration::from_secs(1));
        let stats = CycleStatsDoc::from_scan(&scan);
        assert_eq!(stats.total_cycles, 2);
        let mut lengths = stats.cycle_lengths.clone();
        lengths.sort_unstable();
        assert_eq!(lengths, vec![1, 2]);
    }

    #[test]
    fn hubs_doc_carries_names() {
        let mut net = Network::new();
        net.add_node("A");
        net.add_node("B");
        let doc = HubsDoc::new(&net, &[net.node_id("B").unwrap()]);
        assert_eq!(doc.overlapping_hubs, vec!["B".to_string()]);
    }
}
