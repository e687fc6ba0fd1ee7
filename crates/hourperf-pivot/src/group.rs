//! Per-category grouping and sorting

use std::collections::BTreeMap;

use hourperf_core::{parse_number, parse_percentage, MetricRow, Role, TaskCategory};

use crate::columns::Record;

/// Metric rows per task category, each sorted by hour descending
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Partitions {
    groups: BTreeMap<TaskCategory, Vec<MetricRow>>,
}

impl Partitions {
    pub fn get(&self, category: TaskCategory) -> &[MetricRow] {
        self.groups.get(&category).map_or(&[], Vec::as_slice)
    }

    /// Size of the largest partition, 0 when nothing matched
    pub fn max_len(&self) -> usize {
        self.groups.values().map(Vec::len).max().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    /// Row count per category in block order
    pub fn counts(&self) -> Vec<(TaskCategory, usize)> {
        TaskCategory::ALL
            .into_iter()
            .map(|c| (c, self.get(c).len()))
            .collect()
    }
}

/// Derive the metric row of a record; unparsable values degrade to 0
pub fn metric_row(record: &Record<'_>) -> MetricRow {
    MetricRow::new(
        record.field(Role::FullName),
        record.hour(),
        parse_number(record.field(Role::Quantity), 0.0),
        parse_number(record.field(Role::OccupiedHours), 0.0),
        parse_percentage(record.field(Role::PerformanceWithoutRotation), 0.0),
        parse_percentage(record.field(Role::PerformanceWithRotation), 0.0),
    )
}

/// Partition records by task category and sort each partition
///
/// Unknown categories are dropped. Rows without an hour sort last; ties
/// keep their source order.
pub fn group_and_sort(records: &[Record<'_>]) -> Partitions {
    let mut groups: BTreeMap<TaskCategory, Vec<MetricRow>> = TaskCategory::ALL
        .into_iter()
        .map(|c| (c, Vec::new()))
        .collect();

    let mut dropped = 0usize;
    for record in records {
        match record.category() {
            Some(category) => groups.entry(category).or_default().push(metric_row(record)),
            None => dropped += 1,
        }
    }
    if dropped > 0 {
        tracing::debug!(dropped, "Records with unknown task type skipped");
    }

    for rows in groups.values_mut() {
        rows.sort_by(|a, b| b.hour_key().cmp(&a.hour_key()));
    }

    Partitions { groups }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::{resolve, ColumnAliases, ColumnMap};
    use pretty_assertions::assert_eq;

    fn columns() -> ColumnMap {
        let headers: Vec<String> = [
            "full_name",
            "hour",
            "quantity",
            "occupied_hours",
            "performance_without_rotation",
            "performance_with_rotation",
            "task_type",
            "date",
            "Shift",
        ]
        .iter()
        .map(|h| h.to_string())
        .collect();
        resolve(&headers, &ColumnAliases::default()).unwrap()
    }

    fn row(name: &str, task: &str, hour: &str, occupied: &str) -> Vec<String> {
        [name, hour, "10", occupied, "60.9%", "131.5%", task, "2024-05-01", "Shift1"]
            .iter()
            .map(|c| c.to_string())
            .collect()
    }

    fn hours(rows: &[MetricRow]) -> Vec<Option<i64>> {
        rows.iter().map(|r| r.hour).collect()
    }

    #[test]
    fn pick_rows_sorted_with_negative_minutes() {
        let cols = columns();
        let rows = vec![row("a", "Pick", "5", "70"), row("b", "Pick", "9", "45")];
        let parts = group_and_sort(&Record::all(&rows, &cols));
        let pick = parts.get(TaskCategory::Pick);
        assert_eq!(hours(pick), [Some(9), Some(5)]);
        assert_eq!(pick[0].negative_minutes, 15);
        assert_eq!(pick[1].negative_minutes, 0);
        assert_eq!(pick[0].performance_without_rotation, 0.609);
        assert_eq!(pick[0].performance_with_rotation, 1.315);
    }

    #[test]
    fn missing_hour_sorts_last() {
        let cols = columns();
        let rows = vec![
            row("a", "Sort", "", "60"),
            row("b", "Sort", "0", "60"),
            row("c", "Sort", "x", "60"),
            row("d", "Sort", "23", "60"),
        ];
        let parts = group_and_sort(&Record::all(&rows, &cols));
        assert_eq!(hours(parts.get(TaskCategory::Sort)), [Some(23), Some(0), None, None]);
    }

    #[test]
    fn ties_keep_source_order() {
        let cols = columns();
        let rows = vec![
            row("first", "Receive", "8", "60"),
            row("second", "Receive", "8", "60"),
            row("third", "Receive", "8", "60"),
        ];
        let parts = group_and_sort(&Record::all(&rows, &cols));
        let names: Vec<_> = parts
            .get(TaskCategory::Receive)
            .iter()
            .map(|r| r.full_name.as_str())
            .collect();
        assert_eq!(names, ["first", "second", "third"]);
    }

    #[test]
    fn unknown_categories_dropped() {
        let cols = columns();
        let rows = vec![
            row("a", "Packing", "8", "60"),
            row("b", " Stock taking ", "8", "60"),
            row("c", "pick", "8", "60"),
        ];
        let parts = group_and_sort(&Record::all(&rows, &cols));
        assert_eq!(parts.total(), 1);
        assert_eq!(parts.get(TaskCategory::StockTaking).len(), 1);
        assert_eq!(parts.max_len(), 1);
    }

    #[test]
    fn counts_cover_every_category() {
        let parts = group_and_sort(&[]);
        let counts = parts.counts();
        assert_eq!(counts.len(), 10);
        assert!(counts.iter().all(|(_, n)| *n == 0));
        assert_eq!(parts.max_len(), 0);
    }

    #[test]
    fn unparsable_metrics_default_to_zero() {
        let cols = columns();
        let mut raw = row("a", "Pick", "9", "n/a");
        raw[2] = "lots".into();
        raw[4] = "fast".into();
        let parts = group_and_sort(&Record::all(&[raw], &cols));
        let metric = &parts.get(TaskCategory::Pick)[0];
        assert_eq!(metric.quantity, 0.0);
        assert_eq!(metric.occupied_hours, 0.0);
        assert_eq!(metric.negative_minutes, 60);
        assert_eq!(metric.performance_without_rotation, 0.0);
    }
}
