use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::workload::ClassifiedRow;

/// Label → count table, iterated in ascending label order.
pub type Tally = BTreeMap<String, usize>;

/// Per-category counts over the rows of one report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryCounters {
    pub state: Tally,
    pub agent_status: Tally,
    pub policy_sync: Tally,
}

impl SummaryCounters {
    pub fn record(&mut self, row: &ClassifiedRow) {
        *self.state.entry(row.state.to_string()).or_insert(0) += 1;
        *self
            .agent_status
            .entry(row.agent_status.to_string())
            .or_insert(0) += 1;
        *self.policy_sync.entry(row.policy_sync.clone()).or_insert(0) += 1;
    }

    pub fn total(&self) -> usize {
        self.state.values().sum()
    }

    /// Blocks as (title, tally), in report order.
    pub fn blocks(&self) -> [(&'static str, &Tally); 3] {
        [
            ("State", &self.state),
            ("Agent Status", &self.agent_status),
            ("Policy Sync", &self.policy_sync),
        ]
    }

    /// Plain-text summary printed after the console table.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Summary:");
        let _ = writeln!(out, "{}", "=".repeat(50));
        for (i, (title, tally)) in self.blocks().into_iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            let _ = writeln!(out, "{title} Counts:");
            for (label, count) in tally {
                let _ = writeln!(out, "{label:<20}: {count}");
            }
        }
        out
    }
}
