use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::graph::{Network, NodeId, Polarity};

/// A named ring of nodes, wired head-to-tail with excitatory edges.
/// A single-node ring becomes a self-loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedCycle {
    pub name: String,
    pub nodes: Vec<String>,
}

/// An extra edge between ring nodes (or standalone nodes).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossLink {
    pub from: String,
    pub to: String,
    pub polarity: Polarity,
}

/// Declarative feedback topology: named cycles, cross-links between them,
/// per-node threshold overrides and the initially active set.
///
/// Experiment presets are data handed to one builder instead of
/// per-experiment graph construction code.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub cycles: Vec<NamedCycle>,
    #[serde(default)]
    pub links: Vec<CrossLink>,
    #[serde(default)]
    pub thresholds: Vec<(String, u32)>,
    #[serde(default)]
    pub initial_active: Vec<String>,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cycle(mut self, name: &str, nodes: &[&str]) -> Self {
        self.cycles.push(NamedCycle {
            name: name.to_string(),
            nodes: nodes.iter().map(|s| s.to_string()).collect(),
        });
        self
    }

    pub fn link(mut self, from: &str, to: &str, polarity: Polarity) -> Self {
        self.links.push(CrossLink {
            from: from.to_string(),
            to: to.to_string(),
            polarity,
        });
        self
    }

    pub fn threshold(mut self, node: &str, threshold: u32) -> Self {
        self.thresholds.push((node.to_string(), threshold));
        self
    }

    pub fn activate(mut self, node: &str) -> Self {
        self.initial_active.push(node.to_string());
        self
    }

    /// Wire the network: ring edges first (all excitatory), then
    /// cross-links. A link re-using an ordered pair overwrites the ring
    /// edge (last write wins), so an inhibitory override of a ring segment
    /// is a one-liner.
    pub fn build(&self) -> Result<Network, EngineError> {
        let mut net = Network::new();

        for cycle in &self.cycles {
            if cycle.nodes.is_empty() {
                return Err(EngineError::InvalidArgument(format!(
                    "cycle \"{}\" has no nodes",
                    cycle.name
                )));
            }
            for node in &cycle.nodes {
                net.add_node(node);
            }
            for (i, node) in cycle.nodes.iter().enumerate() {
                let next = &cycle.nodes[(i + 1) % cycle.nodes.len()];
                net.add_edge(node, next, Polarity::Excitatory);
            }
        }

        for link in &self.links {
            net.add_edge(&link.from, &link.to, link.polarity);
        }

        for (name, threshold) in &self.thresholds {
            let id = net
                .node_id(name)
                .ok_or_else(|| EngineError::UnknownNode(name.clone()))?;
            net.set_threshold(id, *threshold)?;
        }

        for name in &self.initial_active {
            if net.node_id(name).is_none() {
                return Err(EngineError::UnknownNode(name.clone()));
            }
        }

        Ok(net)
    }

    /// The initially active set resolved against `net`.
    pub fn initial_nodes(&self, net: &Network) -> Result<Vec<NodeId>, EngineError> {
        self.initial_active
            .iter()
            .map(|name| {
                net.node_id(name)
                    .ok_or_else(|| EngineError::UnknownNode(name.clone()))
            })
            .collect()
    }

    /// The declared rings as id sequences, e.g. for hub counting against
    /// the designed (rather than discovered) feedback structure.
    pub fn declared_cycles(&self, net: &Network) -> Result<Vec<Vec<NodeId>>, EngineError> {
        self.cycles
            .iter()
            .map(|cycle| {
                cycle
                    .nodes
                    .iter()
                    .map(|name| {
                        net.node_id(name)
                            .ok_or_else(|| EngineError::UnknownNode(name.clone()))
                    })
                    .collect()
            })
            .collect()
    }
}
