use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use csv::WriterBuilder;

use super::Report;
use super::table::COLUMNS;
use crate::error::ReportError;

/// Writes a [`Report`] as CSV: the workload rows, then the summary blocks.
///
/// Each section goes through its own `csv::Writer` and is flushed before the
/// next begins, so a failure while writing the summary leaves the rows
/// already on disk intact.
pub struct CsvExporter;

impl CsvExporter {
    pub fn export<W: Write>(report: &Report, mut out: W) -> Result<(), ReportError> {
        let mut wtr = WriterBuilder::new().from_writer(&mut out);
        wtr.write_record(COLUMNS.iter().map(|c| c.title))?;
        for row in &report.rows {
            wtr.write_record(row.cells())?;
        }
        wtr.flush()?;
        drop(wtr);

        for (i, (title, tally)) in report.summary.blocks().into_iter().enumerate() {
            out.write_all(b"\n")?;
            let mut wtr = WriterBuilder::new().flexible(true).from_writer(&mut out);
            if i == 0 {
                wtr.write_record(["Summary"])?;
            }
            wtr.write_record([title, "Count"])?;
            for (label, count) in tally {
                wtr.write_record([label.as_str(), count.to_string().as_str()])?;
            }
            wtr.flush()?;
        }

        out.flush()?;
        Ok(())
    }

    pub fn export_to_path(report: &Report, path: &Path) -> Result<(), ReportError> {
        let file = File::create(path).map_err(|source| ReportError::Output {
            path: path.to_path_buf(),
            source,
        })?;
        Self::export(report, BufWriter::new(file))
    }
}
