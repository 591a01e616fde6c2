//! Aggregate statistics for the spreadsheet's second sheet.

use crate::model::Metric;
use crate::report::ReportError;
use crate::report::parser::ParseError;
use crate::report::table::LogTable;

/// Columns summarised, in output order.
pub const STAT_COLUMNS: [Metric; 5] = [
    Metric::Connections,
    Metric::Inserts,
    Metric::Query,
    Metric::Updates,
    Metric::Deletes,
];

/// Row labels of the statistics sheet, in output order.
pub const STAT_ROWS: [&str; 3] = ["mean", "max", "min"];

/// Mean, max and min of one column, each rounded to an integer.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub name: &'static str,
    pub mean: f64,
    pub max: f64,
    pub min: f64,
}

impl ColumnStats {
    /// Summarises `values`. Returns `None` for an empty column.
    ///
    /// Ties round to even, matching the tabular tooling the report format
    /// came from.
    pub fn from_values(name: &'static str, values: &[u64]) -> Option<Self> {
        let max = *values.iter().max()?;
        let min = *values.iter().min()?;
        let sum: f64 = values.iter().map(|v| *v as f64).sum();
        let mean = sum / values.len() as f64;
        Some(Self {
            name,
            mean: mean.round_ties_even(),
            max: max as f64,
            min: min as f64,
        })
    }

    /// Value for a row of [`STAT_ROWS`].
    pub fn get(&self, row: &str) -> Option<f64> {
        match row {
            "mean" => Some(self.mean),
            "max" => Some(self.max),
            "min" => Some(self.min),
            _ => None,
        }
    }
}

/// Computes [`ColumnStats`] for every column in [`STAT_COLUMNS`].
pub fn summarize(table: &LogTable) -> Result<Vec<ColumnStats>, ReportError> {
    if table.rows.is_empty() {
        return Err(ReportError::NoData);
    }

    STAT_COLUMNS
        .iter()
        .map(|metric| {
            let name = metric.name();
            let idx = table.column_index(name).ok_or_else(|| {
                ParseError::SchemaMismatch(format!("log has no '{}' column", name))
            })?;
            let values = table
                .rows
                .iter()
                .enumerate()
                .map(|(i, row)| {
                    row[idx].parse::<u64>().map_err(|e| ParseError::Malformed {
                        line: i + 2,
                        reason: format!("{} '{}': {}", name, row[idx], e),
                    })
                })
                .collect::<Result<Vec<u64>, ParseError>>()?;
            ColumnStats::from_values(name, &values).ok_or(ReportError::NoData)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_column() {
        let stats = ColumnStats::from_values("Inserts", &[10, 20, 30]).unwrap();
        assert_eq!(stats.mean, 20.0);
        assert_eq!(stats.max, 30.0);
        assert_eq!(stats.min, 10.0);
    }

    #[test]
    fn mean_is_rounded() {
        assert_eq!(ColumnStats::from_values("x", &[1, 2]).unwrap().mean, 2.0);
        assert_eq!(ColumnStats::from_values("x", &[2, 3]).unwrap().mean, 2.0);
        assert_eq!(ColumnStats::from_values("x", &[1, 1, 2]).unwrap().mean, 1.0);
        assert!(ColumnStats::from_values("x", &[]).is_none());
    }

    #[test]
    fn summarize_full_log() {
        let table = LogTable::from_text(
            "Host Status Connections Inserts Query Updates Deletes GetMore Command CursorsTotal CursorsNoTimeout Timestamp\n\
             h Primary 4 10 100 1 0 0 0 0 0 2024-01-01-00:00:00.000000\n\
             h Primary 6 20 200 2 0 0 0 0 0 2024-01-01-00:00:01.000000\n\
             h Primary 8 30 300 3 0 0 0 0 0 2024-01-01-00:00:02.000000",
        )
        .unwrap();

        let stats = summarize(&table).unwrap();
        let names: Vec<&str> = stats.iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec!["Connections", "Inserts", "Query", "Updates", "Deletes"]
        );
        assert_eq!(stats[0].get("mean"), Some(6.0));
        assert_eq!(stats[1].get("max"), Some(30.0));
        assert_eq!(stats[2].get("min"), Some(100.0));
        assert_eq!(stats[4].get("mean"), Some(0.0));
        assert_eq!(stats[0].get("median"), None);
    }

    #[test]
    fn summarize_without_rows_is_no_data() {
        let table = LogTable::from_text("Connections Inserts Query Updates Deletes").unwrap();
        assert!(matches!(summarize(&table), Err(ReportError::NoData)));
    }

    #[test]
    fn summarize_missing_column() {
        let table = LogTable::from_text("Inserts Query\n1 2").unwrap();
        assert!(matches!(
            summarize(&table),
            Err(ReportError::Parse(ParseError::SchemaMismatch(_)))
        ));
    }
}
