//! Flat tables and CSV export.

use std::path::Path;

use crate::error::Result;
use crate::types::{ExtractedDataPoint, LiteratureRecord};

/// Column headers for the baseline fields of an extracted data point.
pub const BASELINE_COLUMNS: [&str; 4] = ["pmid", "title", "year", "doi"];

/// Column headers for raw search results.
pub const RECORD_COLUMNS: [&str; 7] = [
    "pmid", "title", "abstract", "year", "journal", "doi", "authors",
];

/// A rectangular table of text cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row, padding or truncating it to the header width.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Extracted-data table: baseline columns, then metric columns in the
    /// order they are first seen across `points`.
    pub fn from_data_points(points: &[ExtractedDataPoint]) -> Self {
        let columns = metric_columns(points);
        let mut table = Table::new(
            BASELINE_COLUMNS
                .iter()
                .copied()
                .chain(columns.iter().map(String::as_str)),
        );
        for point in points {
            let mut row = vec![
                point.identifier.clone(),
                point.title.clone(),
                point.year.clone(),
                point.doi.clone(),
            ];
            row.extend(
                columns
                    .iter()
                    .map(|c| point.get(c).unwrap_or_default().to_string()),
            );
            table.push_row(row);
        }
        table
    }

    /// Raw search-results table.
    pub fn from_records(records: &[LiteratureRecord]) -> Self {
        let mut table = Table::new(RECORD_COLUMNS);
        for record in records {
            table.push_row(vec![
                record.identifier.clone(),
                record.title.clone(),
                record.abstract_text.clone(),
                record.year.clone(),
                record.journal.clone(),
                record.doi.clone(),
                record.authors_display(),
            ]);
        }
        table
    }

    pub fn to_csv(&self) -> String {
        let mut csv = String::new();
        push_csv_line(&mut csv, &self.headers);
        for row in &self.rows {
            push_csv_line(&mut csv, row);
        }
        csv
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_csv())?;
        tracing::debug!(path = %path.display(), rows = self.rows.len(), "Wrote CSV table");
        Ok(())
    }
}

/// Metric names across `points` in first-seen order.
pub fn metric_columns(points: &[ExtractedDataPoint]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for name in points.iter().flat_map(|p| p.metric_names()) {
        if !columns.iter().any(|c| c == name) {
            columns.push(name.to_string());
        }
    }
    columns
}

fn push_csv_line(out: &mut String, fields: &[String]) {
    let line = fields
        .iter()
        .map(|f| escape_csv(f))
        .collect::<Vec<_>>()
        .join(",");
    out.push_str(&line);
    out.push('\n');
}

/// Quote a field when it contains a separator, quote, or line break.
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn point(id: &str, metrics: &[(&str, &str)]) -> ExtractedDataPoint {
        let mut p = ExtractedDataPoint::baseline(
            &LiteratureRecord::new(id)
                .with_title(format!("Title {id}"))
                .with_year("2020"),
        );
        for (name, value) in metrics {
            p.set(*name, *value);
        }
        p
    }

    #[test]
    fn test_csv_escape() {
        assert_eq!(escape_csv("plain"), "plain");
        assert_eq!(escape_csv("a,b"), "\"a,b\"");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_csv("line\nbreak"), "\"line\nbreak\"");
    }

    #[test]
    fn test_from_data_points_column_order() {
        let table = Table::from_data_points(&[
            point("1", &[("efficacy", "85")]),
            point("2", &[("cost", "1200"), ("coverage", "60")]),
            point("3", &[("efficacy", "70"), ("coverage", "40")]),
        ]);
        assert_eq!(
            table.headers,
            vec!["pmid", "title", "year", "doi", "efficacy", "cost", "coverage"]
        );
        assert_eq!(table.rows[1], vec!["2", "Title 2", "2020", "", "", "1200", "60"]);
    }

    #[test]
    fn test_to_csv() {
        let table = Table::from_data_points(&[point("1", &[("efficacy", "85")])]);
        assert_eq!(
            table.to_csv(),
            "pmid,title,year,doi,efficacy\n1,Title 1,2020,,85\n"
        );
    }

    #[test]
    fn test_from_records_joins_authors() {
        let record = LiteratureRecord::new("5")
            .with_title("Screening, costs and outcomes")
            .with_authors(vec!["Jane Doe".into(), "Ravi Kumar".into()]);
        let csv = Table::from_records(&[record]).to_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "pmid,title,abstract,year,journal,doi,authors");
        assert_eq!(
            lines[1],
            "5,\"Screening, costs and outcomes\",,,,,Jane Doe; Ravi Kumar"
        );
    }

    #[test]
    fn test_push_row_pads() {
        let mut table = Table::new(["a", "b", "c"]);
        table.push_row(vec!["1".into()]);
        assert_eq!(table.rows[0], vec!["1", "", ""]);
    }

    #[test]
    fn test_write_csv_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("out.csv");
        Table::new(["x"]).write_csv(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "x\n");
    }
}
