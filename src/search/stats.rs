use std::time::Duration;

use serde::Serialize;

/// Counters collected during one conflict-minimizing search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    /// Search-tree nodes visited
    pub nodes: u64,
    /// Branches abandoned because their score passed the threshold
    pub pruned: u64,
    /// Complete schedules reached
    pub solutions_found: u64,
    /// Complete schedules kept by the solution set at the time they were found
    pub solutions_accepted: u64,
    /// Whether the node budget stopped the search early
    pub node_limit_reached: bool,
    pub elapsed: Duration,
}

impl std::fmt::Display for SearchStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Search Statistics:")?;
        writeln!(f, "  Nodes Visited: {}", self.nodes)?;
        writeln!(f, "  Branches Pruned: {}", self.pruned)?;
        writeln!(f, "  Schedules Found: {}", self.solutions_found)?;
        writeln!(f, "  Schedules Accepted: {}", self.solutions_accepted)?;
        if self.node_limit_reached {
            writeln!(f, "  Stopped Early: node limit reached")?;
        }
        writeln!(f, "  Duration (secs): {:.3}", self.elapsed.as_secs_f64())
    }
}
