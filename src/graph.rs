use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

pub type NodeId = usize;

pub const DEFAULT_THRESHOLD: u32 = 1;

/// Edge polarity: excitatory edges push their target toward firing,
/// inhibitory edges suppress it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Excitatory,
    Inhibitory,
}

impl Polarity {
    pub fn as_str(self) -> &'static str {
        match self {
            Polarity::Excitatory => "excitatory",
            Polarity::Inhibitory => "inhibitory",
        }
    }
}

impl FromStr for Polarity {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "excitatory" => Ok(Polarity::Excitatory),
            "inhibitory" => Ok(Polarity::Inhibitory),
            other => Err(EngineError::InvalidArgument(format!(
                "polarity must be \"excitatory\" or \"inhibitory\", got \"{other}\""
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    pub polarity: Polarity,
}

/// Directed graph with named nodes, per-node firing thresholds and polar
/// edges.
///
/// Node names are interned once; a `NodeId` is a dense index into the
/// reverse table, so per-node state elsewhere in the engine can live in
/// plain vectors. Nodes and edges iterate in insertion order, which keeps
/// persisted output stable; no algorithm depends on that order.
///
/// At most one edge exists per ordered `(source, target)` pair. Re-adding
/// the pair overwrites its polarity in place (last write wins) and keeps
/// the edge's original position.
#[derive(Debug, Clone, Default)]
pub struct Network {
    names: Vec<String>,
    ids: HashMap<String, NodeId>,
    thresholds: Vec<u32>,

    edges: Vec<Edge>,
    edge_index: HashMap<(NodeId, NodeId), usize>,

    // Incoming/outgoing edge indices per node.
    preds: Vec<Vec<usize>>,
    succs: Vec<Vec<usize>>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a node. Idempotent: an existing node keeps its threshold.
    pub fn add_node(&mut self, name: &str) -> NodeId {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = self.names.len();
        self.names.push(name.to_string());
        self.ids.insert(name.to_string(), id);
        self.thresholds.push(DEFAULT_THRESHOLD);
        self.preds.push(Vec::new());
        self.succs.push(Vec::new());
        id
    }

    /// Intern a node with an explicit threshold. Overwrites the threshold
    /// of an existing node.
    pub fn add_node_with_threshold(
        &mut self,
        name: &str,
        threshold: u32,
    ) -> Result<NodeId, EngineError> {
        validate_threshold(threshold)?;
        let id = self.add_node(name);
        self.thresholds[id] = threshold;
        Ok(id)
    }

    pub fn set_threshold(&mut self, id: NodeId, threshold: u32) -> Result<(), EngineError> {
        validate_threshold(threshold)?;
        if id >= self.names.len() {
            return Err(EngineError::UnknownNode(format!("#{id}")));
        }
        self.thresholds[id] = threshold;
        Ok(())
    }

    /// Insert or overwrite the edge `u -> v`.
    ///
    /// Endpoints absent from the graph are registered on the fly, matching
    /// the behavior of the persisted-data round trip; use [`connect`] to
    /// enforce membership instead.
    ///
    /// [`connect`]: Network::connect
    pub fn add_edge(&mut self, u: &str, v: &str, polarity: Polarity) -> (NodeId, NodeId) {
        let source = self.add_node(u);
        let target = self.add_node(v);
        self.upsert_edge(source, target, polarity);
        (source, target)
    }

    /// Strict edge insertion between already-registered nodes.
    pub fn connect(
        &mut self,
        source: NodeId,
        target: NodeId,
        polarity: Polarity,
    ) -> Result<(), EngineError> {
        let n = self.names.len();
        if source >= n {
            return Err(EngineError::UnknownNode(format!("#{source}")));
        }
        if target >= n {
            return Err(EngineError::UnknownNode(format!("#{target}")));
        }
        self.upsert_edge(source, target, polarity);
        Ok(())
    }

    fn upsert_edge(&mut self, source: NodeId, target: NodeId, polarity: Polarity) {
        if let Some(&i) = self.edge_index.get(&(source, target)) {
            self.edges[i].polarity = polarity;
            return;
        }
        let i = self.edges.len();
        self.edges.push(Edge {
            source,
            target,
            polarity,
        });
        self.edge_index.insert((source, target), i);
        self.succs[source].push(i);
        self.preds[target].push(i);
    }

    pub fn node_count(&self) -> usize {
        self.names.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.ids.get(name).copied()
    }

    pub fn node_name(&self, id: NodeId) -> &str {
        &self.names[id]
    }

    pub fn threshold(&self, id: NodeId) -> u32 {
        self.thresholds[id]
    }

    pub fn polarity(&self, source: NodeId, target: NodeId) -> Option<Polarity> {
        self.edge_index
            .get(&(source, target))
            .map(|&i| self.edges[i].polarity)
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> {
        0..self.names.len()
    }

    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|s| s.as_str())
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    /// Sources of edges into `v`, with each edge's polarity.
    pub fn predecessors(&self, v: NodeId) -> impl Iterator<Item = (NodeId, Polarity)> + '_ {
        self.preds[v]
            .iter()
            .map(|&i| (self.edges[i].source, self.edges[i].polarity))
    }

    /// Targets of edges out of `v`, with each edge's polarity.
    pub fn successors(&self, v: NodeId) -> impl Iterator<Item = (NodeId, Polarity)> + '_ {
        self.succs[v]
            .iter()
            .map(|&i| (self.edges[i].target, self.edges[i].polarity))
    }

    /// Node pairs connected in both directions, one entry per unordered
    /// pair. A reciprocal pair usually means an undirected edge survived a
    /// dataset conversion; self-loops are not reported.
    pub fn reciprocal_pairs(&self) -> Vec<(NodeId, NodeId)> {
        self.edges
            .iter()
            .filter(|e| e.source < e.target && self.edge_index.contains_key(&(e.target, e.source)))
            .map(|e| (e.source, e.target))
            .collect()
    }
}

fn validate_threshold(threshold: u32) -> Result<(), EngineError> {
    if threshold == 0 {
        return Err(EngineError::InvalidArgument(
            "threshold must be at least 1".to_string(),
        ));
    }
    Ok(())
}
