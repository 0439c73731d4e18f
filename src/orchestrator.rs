use std::io::Write;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::error::ReportError;
use crate::pce::{Inventory, WorkloadSource};
use crate::report::{CsvExporter, Report};

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The inventory was reachable but empty; no CSV is written.
    NoWorkloads { complete: bool },
    Written {
        path: PathBuf,
        rows: usize,
        skipped: usize,
        /// `false` when pagination stopped early on a failed page.
        complete: bool,
    },
}

/// Drives one report: fetch, classify, render, export.
pub struct ReportRunner {
    output: PathBuf,
}

impl ReportRunner {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
        }
    }

    /// Fetch the inventory. Only a source that yielded no page at all is
    /// an error; a partial inventory is logged and kept.
    pub async fn collect(&self, source: &impl WorkloadSource) -> Result<Inventory, ReportError> {
        let inventory = source.fetch_all_workloads().await;
        if inventory.is_unavailable() {
            return Err(ReportError::Unavailable(source.origin()));
        }
        if !inventory.complete {
            warn!(
                pages = inventory.pages,
                workloads = inventory.workloads.len(),
                "inventory is incomplete, reporting what was retrieved"
            );
        }
        Ok(inventory)
    }

    /// Classify the inventory, print the table and summary to `console`
    /// and write the CSV.
    pub fn render(
        &self,
        inventory: Inventory,
        console: &mut impl Write,
    ) -> Result<RunOutcome, ReportError> {
        let complete = inventory.complete;
        if inventory.workloads.is_empty() {
            writeln!(console, "No workloads found.")?;
            return Ok(RunOutcome::NoWorkloads { complete });
        }

        let total = inventory.workloads.len();
        info!(total, "total workloads retrieved");
        writeln!(console, "Total workloads retrieved: {total}")?;

        let report = Report::build(inventory.workloads);
        writeln!(console)?;
        writeln!(console, "Workload Status:")?;
        write!(console, "{}", report.render_console())?;
        console.flush()?;

        CsvExporter::export_to_path(&report, &self.output)?;
        info!(path = %self.output.display(), rows = report.rows.len(), "CSV written");

        Ok(RunOutcome::Written {
            path: self.output.clone(),
            rows: report.rows.len(),
            skipped: report.skipped.len(),
            complete,
        })
    }
}
