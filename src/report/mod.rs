//! Report assembly: classifies raw workloads into rows, tallies them and
//! renders the console table. CSV output is written by [`CsvExporter`].

mod csv;
mod summary;
mod table;

pub use self::csv::CsvExporter;
pub use summary::SummaryCounters;

use serde_json::Value;
use tracing::warn;

use crate::workload::{ClassifiedRow, RowError, WorkloadRecord};

/// A workload that could not be rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    /// Zero-based position in the inventory.
    pub position: usize,
    pub identifier: String,
    pub error: RowError,
}

/// Classified rows of one run plus their counts.
#[derive(Debug, Clone, Default)]
pub struct Report {
    pub rows: Vec<ClassifiedRow>,
    pub skipped: Vec<SkippedRow>,
    pub summary: SummaryCounters,
}

impl Report {
    /// Classify every record in order. A record that fails to project is
    /// logged and skipped; it never stops the rest of the batch.
    pub fn build(records: impl IntoIterator<Item = Value>) -> Self {
        let mut report = Report::default();

        for (position, value) in records.into_iter().enumerate() {
            let (identifier, projected) = match WorkloadRecord::try_from(value) {
                Ok(record) => (
                    record.identifier().map(str::to_string),
                    ClassifiedRow::from_record(&record),
                ),
                Err(error) => (None, Err(error)),
            };

            match projected {
                Ok(row) => {
                    report.summary.record(&row);
                    report.rows.push(row);
                }
                Err(error) => {
                    let identifier = identifier.unwrap_or_else(|| format!("#{}", position + 1));
                    warn!(workload = %identifier, position, %error, "skipping workload");
                    report.skipped.push(SkippedRow {
                        position,
                        identifier,
                        error,
                    });
                }
            }
        }

        report
    }

    /// Console table followed by the textual summary.
    pub fn render_console(&self) -> String {
        let mut out = table::header();
        out.push('\n');
        for row in &self.rows {
            out.push_str(&table::row_line(row));
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&self.summary.render());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn malformed_row_is_skipped_and_batch_continues() {
        let report = Report::build(vec![
            json!({"hostname": "ok-1", "online": true, "interfaces": [{"address": "10.0.0.1"}]}),
            json!({"hostname": "bad-1", "online": true, "interfaces": ["10.0.0.2"]}),
            json!({"hostname": "ok-2", "online": false}),
        ]);

        let hosts: Vec<&str> = report.rows.iter().map(|r| r.hostname.as_str()).collect();
        assert_eq!(hosts, ["ok-1", "ok-2"]);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].identifier, "bad-1");
        assert_eq!(report.skipped[0].position, 1);
        assert_eq!(report.summary.total(), 2);

        let mut buf = Vec::new();
        CsvExporter::export(&report, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("ok-2,"));
        assert!(!text.contains("bad-1"));
    }

    #[test]
    fn non_object_record_is_identified_by_position() {
        let report = Report::build(vec![json!({"hostname": "a"}), json!(["not", "a", "workload"])]);
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.skipped[0].identifier, "#2");
        assert_eq!(report.skipped[0].error, RowError::NotAnObject("array"));

        let copy = report.clone();
        assert_eq!(copy.skipped, report.skipped);
    }

    #[test]
    fn console_output_has_table_and_summary() {
        let report = Report::build(vec![
            json!({"hostname": "web-01", "online": true, "enforcement_mode": "full"}),
        ]);
        let text = report.render_console();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[1].starts_with("Hostname"));
        assert!(lines[3].starts_with("web-01               N/A             enforced"));
        assert!(text.contains("State Counts:\nenforced            : 1"));
    }
}
