use crate::workload::ClassifiedRow;

/// One column of the console table.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub title: &'static str,
    pub width: usize,
}

pub const COLUMNS: [Column; 10] = [
    Column { title: "Hostname", width: 20 },
    Column { title: "IP", width: 15 },
    Column { title: "State", width: 12 },
    Column { title: "Agent Status", width: 12 },
    Column { title: "Policy Sync", width: 12 },
    Column { title: "Mode", width: 12 },
    Column { title: "Status", width: 12 },
    Column { title: "Version", width: 10 },
    Column { title: "Health Errors", width: 15 },
    Column { title: "Managed Since", width: 15 },
];

const RULE_WIDTH: usize = 130;

/// Truncate to `width` characters, then pad with spaces to exactly `width`.
pub fn fit(value: &str, width: usize) -> String {
    let truncated: String = value.chars().take(width).collect();
    format!("{truncated:<width$}")
}

fn line<'a>(cells: impl IntoIterator<Item = &'a str>) -> String {
    let joined = COLUMNS
        .iter()
        .zip(cells)
        .map(|(col, cell)| fit(cell, col.width))
        .collect::<Vec<_>>()
        .join(" ");
    joined.trim_end().to_string()
}

pub fn header() -> String {
    let mut out = String::new();
    out.push_str(&"=".repeat(RULE_WIDTH));
    out.push('\n');
    out.push_str(&line(COLUMNS.iter().map(|c| c.title)));
    out.push('\n');
    out.push_str(&"-".repeat(RULE_WIDTH));
    out
}

pub fn row_line(row: &ClassifiedRow) -> String {
    let cells = row.cells();
    line(cells.iter().map(String::as_str))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workload::WorkloadRecord;
    use serde_json::json;

    #[test]
    fn fit_truncates_and_pads() {
        assert_eq!(fit("abc", 5), "abc  ");
        assert_eq!(fit("abcdefgh", 5), "abcde");
        assert_eq!(fit("", 2), "  ");
        // Truncation counts characters, not bytes.
        assert_eq!(fit("hôte-ümlaut", 4), "hôte");
    }

    #[test]
    fn header_aligns_titles() {
        let h = header();
        let lines: Vec<&str> = h.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].len(), 130);
        assert!(lines[1].starts_with("Hostname             IP              State        Agent Status"));
        assert!(lines[1].ends_with("Managed Since"));
        assert!(lines[2].chars().all(|c| c == '-'));
    }

    #[test]
    fn row_cells_are_truncated_to_column_width() {
        let record = WorkloadRecord::try_from(json!({
            "hostname": "a-very-long-hostname.internal.example.com",
            "online": true,
            "enforcement_mode": "visibility_only",
            "agent": {"status": "running", "config_sync_state": "syncing"},
            "interfaces": [{"address": "10.20.30.40"}]
        }))
        .unwrap();
        let row = ClassifiedRow::from_record(&record).unwrap();
        let text = row_line(&row);

        assert!(text.starts_with("a-very-long-hostname 10.20.30.40     visibility/s active/synci"));
        assert!(!text.contains("internal"));
    }
}
