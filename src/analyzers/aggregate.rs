use std::collections::BTreeMap;

use tracing::debug;

use crate::analyzers::types::{MonthlyCell, YearlyCell};
use crate::analyzers::utility::{mean, pct};
use crate::records::{NormalizedRecord, Status, YearMonth};

/// Groups non-missed attempts by (month, exam type) and computes pass rates.
///
/// Missed attempts carry no pass/fail signal and are dropped before grouping,
/// so no cell is ever created with a zero total. Cells come out ordered by
/// month, then exam type.
pub fn aggregate_monthly(records: &[NormalizedRecord]) -> Vec<MonthlyCell> {
    let mut groups: BTreeMap<(YearMonth, &str), (usize, usize)> = BTreeMap::new();

    for rec in records.iter().filter(|r| !r.status.is_missed()) {
        let entry = groups
            .entry((rec.month, rec.exam_type.as_str()))
            .or_insert((0, 0));
        entry.0 += 1;
        if rec.status == Status::Passed {
            entry.1 += 1;
        }
    }

    let cells: Vec<MonthlyCell> = groups
        .into_iter()
        .map(|((month, exam_type), (total, passed))| MonthlyCell {
            month,
            exam_type: exam_type.to_string(),
            total_count: total,
            passed_count: passed,
            pass_rate: pct(passed, total),
        })
        .collect();

    debug!(cells = cells.len(), "Aggregated monthly pass rates");
    cells
}

#[derive(Default)]
struct YearlyAccumulator {
    passed: usize,
    failed: usize,
    missed: usize,
    pass_points: Vec<f64>,
    scores: Vec<f64>,
}

/// Groups every attempt, missed ones included, by (year, exam name).
///
/// Groups come out ordered by year, then exam name.
pub fn aggregate_yearly(records: &[NormalizedRecord]) -> Vec<YearlyCell> {
    let mut groups: BTreeMap<(i32, &str), YearlyAccumulator> = BTreeMap::new();

    for rec in records {
        let acc = groups
            .entry((rec.year, rec.record.exam_name.as_str()))
            .or_default();

        match rec.status {
            Status::Missed => {
                acc.missed += 1;
                continue;
            }
            Status::Passed => acc.passed += 1,
            Status::Failed => acc.failed += 1,
        }
        acc.pass_points.push(rec.record.pass_point_percentage);
        acc.scores.push(rec.record.result_percentage);
    }

    let cells: Vec<YearlyCell> = groups
        .into_iter()
        .map(|((year, exam_name), acc)| {
            let total = acc.passed + acc.failed;
            let valid = total > 0;
            YearlyCell {
                year,
                exam_name: exam_name.to_string(),
                total_count: total,
                passed_count: acc.passed,
                failed_count: acc.failed,
                missed_count: acc.missed,
                avg_pass_point: valid.then(|| mean(&acc.pass_points)),
                avg_score: valid.then(|| mean(&acc.scores)),
                pass_rate: valid.then(|| pct(acc.passed, total)),
                fail_rate: valid.then(|| pct(acc.failed, total)),
            }
        })
        .collect();

    debug!(groups = cells.len(), "Aggregated yearly exam statistics");
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use crate::records::ExamRecord;
    use chrono::NaiveDate;

    #[test]
    fn test_monthly_pass_rate_example() {
        let records = vec![
            record(2024, 1, 10, "A", 66.0, 80.0),
            record(2024, 1, 15, "A", 66.0, 50.0),
        ];

        let cells = aggregate_monthly(&records);

        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].month().label(), "24-Jan");
        assert_eq!(cells[0].exam_type(), "A-66");
        assert_eq!(cells[0].total_count(), 2);
        assert_eq!(cells[0].passed_count(), 1);
        assert_eq!(cells[0].pass_rate(), 50.0);
    }

    #[test]
    fn test_monthly_excludes_missed() {
        let records = vec![
            record(2024, 1, 10, "A", 66.0, 80.0),
            record(2024, 1, 11, "A", 66.0, 0.0),
            record(2024, 2, 11, "A", 66.0, 0.0),
        ];

        let cells = aggregate_monthly(&records);

        // February only had a missed attempt, so no cell is materialized
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].total_count(), 1);
        assert_eq!(cells[0].pass_rate(), 100.0);
    }

    #[test]
    fn test_monthly_keeps_full_precision() {
        let records = vec![
            record(2024, 1, 1, "A", 66.0, 80.0),
            record(2024, 1, 2, "A", 66.0, 50.0),
            record(2024, 1, 3, "A", 66.0, 50.0),
        ];
        let cells = aggregate_monthly(&records);
        assert_eq!(cells[0].pass_rate(), pct(1, 3));
        assert_ne!(cells[0].pass_rate(), 33.33);
    }

    #[test]
    fn test_monthly_splits_by_threshold_and_orders_by_month() {
        let records = vec![
            record(2024, 1, 10, "A", 70.0, 80.0),
            record(2023, 12, 10, "A", 66.0, 60.0),
            record(2024, 1, 10, "A", 66.0, 80.0),
        ];

        let cells = aggregate_monthly(&records);
        let keys: Vec<(String, &str)> = cells
            .iter()
            .map(|c| (c.month().label(), c.exam_type()))
            .collect();

        assert_eq!(
            keys,
            vec![
                ("23-Dec".to_string(), "A-66"),
                ("24-Jan".to_string(), "A-66"),
                ("24-Jan".to_string(), "A-70"),
            ]
        );
        assert_eq!(cells[0].pass_rate(), 0.0);
    }

    #[test]
    fn test_yearly_example_with_missed() {
        let records = vec![
            record(2024, 3, 1, "B", 70.0, 0.0),
            record(2024, 5, 1, "B", 70.0, 70.0),
        ];

        let cells = aggregate_yearly(&records);

        assert_eq!(cells.len(), 1);
        let cell = &cells[0];
        assert_eq!(cell.year(), 2024);
        assert_eq!(cell.exam_name(), "B");
        assert_eq!(cell.total_count(), 1);
        assert_eq!(cell.missed_count(), 1);
        assert_eq!(cell.pass_rate(), Some(100.0));
        assert_eq!(cell.fail_rate(), Some(0.0));
        assert_eq!(cell.avg_score(), Some(70.0));
    }

    #[test]
    fn test_yearly_counts_are_consistent() {
        let records = vec![
            record(2023, 1, 1, "A", 66.0, 80.0),
            record(2023, 2, 1, "A", 70.0, 65.0),
            record(2023, 3, 1, "A", 66.0, 40.0),
            record(2023, 3, 1, "B", 50.0, 51.0),
            record(2024, 1, 1, "A", 66.0, 66.0),
        ];

        let cells = aggregate_yearly(&records);

        assert_eq!(cells.len(), 3);
        for cell in &cells {
            assert_eq!(cell.passed_count() + cell.failed_count(), cell.total_count());
            assert_eq!(cell.missed_count(), 0);
            let sum = cell.pass_rate().unwrap() + cell.fail_rate().unwrap();
            assert!((sum - 100.0).abs() < 1e-9);
        }

        let a2023 = &cells[0];
        assert_eq!((a2023.year(), a2023.exam_name()), (2023, "A"));
        assert_eq!(a2023.total_count(), 3);
        assert_eq!(a2023.passed_count(), 1);
        assert_eq!(a2023.avg_pass_point(), Some((66.0 + 70.0 + 66.0) / 3.0));
        assert_eq!(a2023.avg_score(), Some((80.0 + 65.0 + 40.0) / 3.0));
    }

    #[test]
    fn test_yearly_all_missed_group_has_no_averages() {
        let records = vec![
            record(2024, 3, 1, "C", 70.0, 0.0),
            record(2024, 4, 1, "C", 70.0, 0.0),
        ];

        let cells = aggregate_yearly(&records);

        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].total_count(), 0);
        assert_eq!(cells[0].missed_count(), 2);
        assert_eq!(cells[0].avg_pass_point(), None);
        assert_eq!(cells[0].avg_score(), None);
        assert_eq!(cells[0].pass_rate(), None);
        assert_eq!(cells[0].fail_rate(), None);
    }

    fn record(
        year: i32,
        month: u32,
        day: u32,
        name: &str,
        pass_point: f64,
        result: f64,
    ) -> NormalizedRecord {
        normalize(ExamRecord {
            date: NaiveDate::from_ymd_opt(year, month, day).unwrap(),
            exam_name: name.to_string(),
            pass_point_percentage: pass_point,
            result_percentage: result,
        })
    }
}
