use crate::error::EngineError;
use crate::graph::{Network, NodeId, Polarity};

/// Activation snapshot for a single step, indexed by `NodeId`.
pub type ActivationState = Vec<bool>;

/// How inhibitory input silences a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InhibitionRule {
    /// A single active inhibitory predecessor keeps the node silent.
    #[default]
    Veto,
    /// The node is silenced only once `min_inputs` inhibitory predecessors
    /// are active in the same step. `Veto` is `Count { min_inputs: 1 }`.
    Count { min_inputs: u32 },
}

impl InhibitionRule {
    fn silences(self, inhibitory_active: u32) -> bool {
        match self {
            InhibitionRule::Veto => inhibitory_active > 0,
            InhibitionRule::Count { min_inputs } => inhibitory_active >= min_inputs,
        }
    }
}

/// Activation history of a run, one state per step.
///
/// The first entry is the state computed *from* the initial condition; the
/// initial condition itself (virtual step -1) never appears in the trace.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActivationTrace {
    states: Vec<ActivationState>,
}

impl ActivationTrace {
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn states(&self) -> &[ActivationState] {
        &self.states
    }

    pub fn is_active(&self, step: usize, node: NodeId) -> bool {
        self.states
            .get(step)
            .and_then(|s| s.get(node).copied())
            .unwrap_or(false)
    }

    /// Nodes active at `step`, in id order.
    pub fn active_at(&self, step: usize) -> Vec<NodeId> {
        match self.states.get(step) {
            Some(state) => state
                .iter()
                .enumerate()
                .filter(|(_, &on)| on)
                .map(|(id, _)| id)
                .collect(),
            None => Vec::new(),
        }
    }
}

/// Synchronous activation automaton over a borrowed network.
///
/// Per step, every node recomputes from the *previous* state only:
///
/// ```text
/// E(v) = active excitatory predecessors
/// I(v) = active inhibitory predecessors
/// next(v) = E(v) >= threshold(v)  and  I(v) does not silence v
/// ```
///
/// Activation is transient: a node must re-earn it every step from
/// predecessor activity, so nothing persists without a feedback edge.
pub struct Automaton<'a> {
    net: &'a Network,
    rule: InhibitionRule,
    state: ActivationState,
}

impl<'a> Automaton<'a> {
    /// All-inactive automaton with the canonical [`InhibitionRule::Veto`].
    pub fn new(net: &'a Network) -> Self {
        Self {
            net,
            rule: InhibitionRule::Veto,
            state: vec![false; net.node_count()],
        }
    }

    pub fn with_rule(net: &'a Network, rule: InhibitionRule) -> Result<Self, EngineError> {
        if let InhibitionRule::Count { min_inputs: 0 } = rule {
            return Err(EngineError::InvalidArgument(
                "inhibition count threshold must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            net,
            rule,
            state: vec![false; net.node_count()],
        })
    }

    /// Mark nodes active in the initial condition (virtual step -1).
    pub fn seed(&mut self, nodes: &[NodeId]) -> Result<(), EngineError> {
        for &id in nodes {
            if id >= self.net.node_count() {
                return Err(EngineError::UnknownNode(format!("#{id}")));
            }
            self.state[id] = true;
        }
        Ok(())
    }

    pub fn seed_named(&mut self, names: &[&str]) -> Result<(), EngineError> {
        for name in names {
            let id = self
                .net
                .node_id(name)
                .ok_or_else(|| EngineError::UnknownNode((*name).to_string()))?;
            self.state[id] = true;
        }
        Ok(())
    }

    pub fn state(&self) -> &ActivationState {
        &self.state
    }

    /// Advance one step and return the new state.
    pub fn step(&mut self) -> &ActivationState {
        let mut next = vec![false; self.net.node_count()];
        for v in self.net.nodes() {
            let mut excitatory = 0u32;
            let mut inhibitory = 0u32;
            for (u, polarity) in self.net.predecessors(v) {
                if !self.state[u] {
                    continue;
                }
                match polarity {
                    Polarity::Excitatory => excitatory += 1,
                    Polarity::Inhibitory => inhibitory += 1,
                }
            }
            next[v] = excitatory >= self.net.threshold(v) && !self.rule.silences(inhibitory);
        }
        self.state = next;
        &self.state
    }

    /// Run `steps` steps and collect the trace. Zero steps yields an empty
    /// trace.
    pub fn run(&mut self, steps: usize) -> ActivationTrace {
        let mut states = Vec::with_capacity(steps);
        for _ in 0..steps {
            self.step();
            states.push(self.state.clone());
        }
        ActivationTrace { states }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring() -> Network {
        let mut net = Network::new();
        net.add_edge("A", "B", Polarity::Excitatory);
        net.add_edge("B", "C", Polarity::Excitatory);
        net.add_edge("C", "A", Polarity::Excitatory);
        net
    }

    fn run_seeded(net: &Network, seed: &[&str], steps: usize) -> ActivationTrace {
        let mut automaton = Automaton::new(net);
        automaton.seed_named(seed).unwrap();
        automaton.run(steps)
    }

    #[test]
    fn activation_chases_around_a_ring() {
        let net = ring();
        let trace = run_seeded(&net, &["A"], 3);

        let a = net.node_id("A").unwrap();
        let b = net.node_id("B").unwrap();
        let c = net.node_id("C").unwrap();

        assert_eq!(trace.len(), 3);
        assert_eq!(trace.states()[0], state_of(&net, &[b]));
        assert_eq!(trace.states()[1], state_of(&net, &[c]));
        assert_eq!(trace.states()[2], state_of(&net, &[a]));
    }

    #[test]
    fn runs_are_deterministic() {
        let net = ring();
        let first = run_seeded(&net, &["A", "C"], 12);
        let second = run_seeded(&net, &["A", "C"], 12);
        assert_eq!(first, second);
    }

    #[test]
    fn update_is_synchronous() {
        // Two-node loop seeded at A. An in-place update scanning A then B
        // would hand B the freshly cleared A and extinguish everything;
        // the synchronous rule keeps the activation bouncing.
        let mut net = Network::new();
        net.add_edge("A", "B", Polarity::Excitatory);
        net.add_edge("B", "A", Polarity::Excitatory);
        let a = net.node_id("A").unwrap();
        let b = net.node_id("B").unwrap();

        let trace = run_seeded(&net, &["A"], 4);
        assert_eq!(trace.states()[0], state_of(&net, &[b]));
        assert_eq!(trace.states()[1], state_of(&net, &[a]));
        assert_eq!(trace.states()[2], state_of(&net, &[b]));
        assert_eq!(trace.states()[3], state_of(&net, &[a]));
    }

    #[test]
    fn threshold_boundary() {
        // X has three excitatory predecessors and threshold 2.
        let mut net = Network::new();
        net.add_edge("P1", "X", Polarity::Excitatory);
        net.add_edge("P2", "X", Polarity::Excitatory);
        net.add_edge("P3", "X", Polarity::Excitatory);
        let x = net.node_id("X").unwrap();
        net.set_threshold(x, 2).unwrap();

        // k-1 active: stays silent.
        let trace = run_seeded(&net, &["P1"], 1);
        assert!(!trace.is_active(0, x));

        // k active: fires.
        let trace = run_seeded(&net, &["P1", "P2"], 1);
        assert!(trace.is_active(0, x));
    }

    #[test]
    fn one_active_inhibitor_vetoes_sufficient_excitation() {
        let mut net = Network::new();
        net.add_edge("P1", "X", Polarity::Excitatory);
        net.add_edge("P2", "X", Polarity::Excitatory);
        net.add_edge("N", "X", Polarity::Inhibitory);
        let x = net.node_id("X").unwrap();
        net.set_threshold(x, 2).unwrap();

        let trace = run_seeded(&net, &["P1", "P2", "N"], 1);
        assert!(!trace.is_active(0, x));
    }

    #[test]
    fn count_rule_tolerates_inhibition_below_its_threshold() {
        let mut net = Network::new();
        net.add_edge("P", "X", Polarity::Excitatory);
        net.add_edge("N1", "X", Polarity::Inhibitory);
        net.add_edge("N2", "X", Polarity::Inhibitory);
        let x = net.node_id("X").unwrap();

        // One active inhibitor: tolerated under Count{2}, fatal under Veto.
        let mut automaton =
            Automaton::with_rule(&net, InhibitionRule::Count { min_inputs: 2 }).unwrap();
        automaton.seed_named(&["P", "N1"]).unwrap();
        assert!(automaton.run(1).is_active(0, x));

        let trace = run_seeded(&net, &["P", "N1"], 1);
        assert!(!trace.is_active(0, x));

        // Both inhibitors active: silenced either way.
        let mut automaton =
            Automaton::with_rule(&net, InhibitionRule::Count { min_inputs: 2 }).unwrap();
        automaton.seed_named(&["P", "N1", "N2"]).unwrap();
        assert!(!automaton.run(1).is_active(0, x));
    }

    #[test]
    fn zero_inhibition_count_is_rejected() {
        let net = ring();
        assert!(matches!(
            Automaton::with_rule(&net, InhibitionRule::Count { min_inputs: 0 }),
            Err(EngineError::InvalidArgument(_))
        ));
    }

    #[test]
    fn activation_is_not_self_sustaining() {
        // A feeds B; with no edge back into A, its seed activation dies
        // after the first step.
        let mut net = Network::new();
        net.add_edge("A", "B", Polarity::Excitatory);
        let a = net.node_id("A").unwrap();
        let b = net.node_id("B").unwrap();

        let trace = run_seeded(&net, &["A"], 2);
        assert!(!trace.is_active(0, a));
        assert!(trace.is_active(0, b));
        assert_eq!(trace.active_at(1), Vec::<NodeId>::new());
    }

    #[test]
    fn self_loop_latches_a_node() {
        let mut net = Network::new();
        net.add_edge("A", "A", Polarity::Excitatory);
        let a = net.node_id("A").unwrap();

        let trace = run_seeded(&net, &["A"], 5);
        for step in 0..5 {
            assert!(trace.is_active(step, a));
        }
    }

    #[test]
    fn seeding_unknown_names_fails() {
        let net = ring();
        let mut automaton = Automaton::new(&net);
        assert_eq!(
            automaton.seed_named(&["Q"]),
            Err(EngineError::UnknownNode("Q".to_string()))
        );
    }

    #[test]
    fn zero_steps_yields_empty_trace() {
        let net = ring();
        let trace = run_seeded(&net, &["A"], 0);
        assert!(trace.is_empty());
    }

    fn state_of(net: &Network, active: &[NodeId]) -> ActivationState {
        let mut state = vec![false; net.node_count()];
        for &id in active {
            state[id] = true;
        }
        state
    }
}
