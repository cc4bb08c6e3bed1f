use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::graph::{Network, NodeId};

/// Result of one enumeration pass.
///
/// `complete == false` means the wall-clock budget expired mid-search: the
/// cycle list is a valid prefix of the full enumeration, not an exhaustive
/// answer, and downstream statistics must not be reported as such. An
/// exhaustive scan that found nothing has `complete == true` and an empty
/// list.
#[derive(Debug, Clone)]
pub struct CycleScan {
    /// Simple cycles in traversal order, each starting at its minimal node
    /// id, without repeating the start at the end.
    pub cycles: Vec<Vec<NodeId>>,
    pub complete: bool,
    pub elapsed: Duration,
}

impl CycleScan {
    pub fn total(&self) -> usize {
        self.cycles.len()
    }

    pub fn timed_out(&self) -> bool {
        !self.complete
    }

    /// Cycle length -> count, over whatever was found before the budget
    /// ran out.
    pub fn length_histogram(&self) -> BTreeMap<usize, usize> {
        let mut histogram = BTreeMap::new();
        for cycle in &self.cycles {
            *histogram.entry(cycle.len()).or_insert(0) += 1;
        }
        histogram
    }
}

/// Enumerate all simple directed cycles of length `<= max_length`, giving
/// up once `time_budget` wall-clock time has elapsed.
///
/// Depth-first path extension with an explicit stack: the search rooted at
/// node `s` never descends into nodes `< s`, so every cycle is produced
/// exactly once, rooted at its minimal node. A self-loop edge is a cycle
/// of length 1.
///
/// The deadline is checked between expansions, never via signals or
/// preemption, so a borrowed `Network` is all the state the search needs.
pub fn enumerate_cycles(net: &Network, max_length: usize, time_budget: Duration) -> CycleScan {
    let started = Instant::now();
    let deadline = started.checked_add(time_budget);

    let n = net.node_count();
    let mut cycles: Vec<Vec<NodeId>> = Vec::new();

    if n == 0 || max_length == 0 {
        return CycleScan {
            cycles,
            complete: true,
            elapsed: started.elapsed(),
        };
    }

    // Polarity does not matter here; flatten the adjacency once.
    let succ: Vec<Vec<NodeId>> = net
        .nodes()
        .map(|v| net.successors(v).map(|(to, _)| to).collect())
        .collect();

    let mut on_path = vec![false; n];
    let mut path: Vec<NodeId> = Vec::new();
    // One frame per path node: (node, index of the next successor to try).
    let mut stack: Vec<(NodeId, usize)> = Vec::new();

    for start in 0..n {
        path.push(start);
        on_path[start] = true;
        stack.push((start, 0));

        while let Some(frame) = stack.last_mut() {
            if expired(deadline) {
                warn!(
                    found = cycles.len(),
                    max_length,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "cycle enumeration hit its time budget; results are partial"
                );
                return CycleScan {
                    cycles,
                    complete: false,
                    elapsed: started.elapsed(),
                };
            }

            let (node, cursor) = (frame.0, frame.1);
            if cursor >= succ[node].len() {
                stack.pop();
                on_path[node] = false;
                path.pop();
                continue;
            }
            frame.1 += 1;

            let next = succ[node][cursor];
            if next == start {
                cycles.push(path.clone());
                continue;
            }
            // Nodes below the root belong to earlier roots' searches.
            if next < start || on_path[next] {
                continue;
            }
            if path.len() == max_length {
                continue;
            }

            path.push(next);
            on_path[next] = true;
            stack.push((next, 0));
        }
    }

    debug!(
        found = cycles.len(),
        max_length,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "cycle enumeration finished"
    );
    CycleScan {
        cycles,
        complete: true,
        elapsed: started.elapsed(),
    }
}

fn expired(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|d| Instant::now() >= d)
}
