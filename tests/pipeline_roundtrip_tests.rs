//! End-to-end pipeline tests: sample a pass, persist it, read it back, and
//! reduce it into a report.

mod common;

use chrono::{TimeZone, Utc};
use common::{running_for_hours, StaticProvider};
use costwatch::orchestrator::run_pass;
use costwatch::pricing::PricingTable;
use costwatch::report::reduce_series;
use costwatch::snapshot;
use std::sync::Arc;

#[tokio::test]
async fn test_persisted_snapshots_match_sampled_totals() {
    let provider = StaticProvider::new()
        .with_region(
            "us-east-1",
            vec![
                running_for_hours("i-1", "t2.micro", 2),
                running_for_hours("i-2", "m4.large", 4),
            ],
        )
        .with_region("eu-west-1", vec![running_for_hours("i-3", "t2.xlarge", 1)]);

    let summary = run_pass(Arc::new(provider), Arc::new(PricingTable::default()), None)
        .await
        .unwrap();

    let temp = tempfile::TempDir::new().unwrap();
    let as_of = Utc.with_ymd_and_hms(2026, 8, 7, 9, 30, 0).unwrap();
    let path = snapshot::merge(&summary.aggregates, temp.path(), as_of).unwrap();

    // What was written reads back intact
    let series = snapshot::read_daily(&path).unwrap();
    let day = series.day("2026-08-07").unwrap();
    let hour = day.hour(9).unwrap();

    let mut stored_total = 0.0;
    let mut stored_count = 0;
    for aggregate in &summary.aggregates {
        let region_record = &hour.0[&aggregate.region];
        for snap in &aggregate.snapshots {
            assert_eq!(&region_record.0[&snap.id], snap);
            stored_total += region_record.0[&snap.id].current_cost;
            stored_count += 1;
        }
    }
    assert_eq!(stored_count, 3);
    assert!(
        (stored_total - summary.total_cost).abs() < 1e-9,
        "stored current_cost must reproduce the sampled totals"
    );
}

#[tokio::test]
async fn test_reduction_of_persisted_day() {
    let provider = StaticProvider::new().with_region(
        "us-east-1",
        vec![running_for_hours("i-1", "t2.micro", 2)],
    );
    let provider = Arc::new(provider);
    let pricing = Arc::new(PricingTable::default());

    let temp = tempfile::TempDir::new().unwrap();
    // Same instance sampled at hours 9 and 10
    for hour in [9, 10] {
        let summary = run_pass(Arc::clone(&provider), Arc::clone(&pricing), None)
            .await
            .unwrap();
        let as_of = Utc.with_ymd_and_hms(2026, 8, 7, hour, 0, 0).unwrap();
        snapshot::merge(&summary.aggregates, temp.path(), as_of).unwrap();
    }

    let files = snapshot::list_snapshot_files(temp.path()).unwrap();
    assert_eq!(files.len(), 1, "same day merges into one file");

    let series = snapshot::read_daily(&files[0]).unwrap();
    let reports = reduce_series(&series, &pricing);
    assert_eq!(reports.len(), 1);

    let class = &reports[0].regions["us-east-1"].classes["t2.micro"];
    assert_eq!(class.hours, 2);
    assert_eq!(class.unique_instances.len(), 1);
    assert!((class.cost - 2.0 * 0.0116).abs() < 1e-9);
    assert!((reports[0].cost - 0.0232).abs() < 1e-9);
}

#[tokio::test]
async fn test_days_are_separate_files() {
    let provider = Arc::new(StaticProvider::new().with_region(
        "us-east-1",
        vec![running_for_hours("i-1", "t2.micro", 1)],
    ));
    let pricing = Arc::new(PricingTable::default());
    let temp = tempfile::TempDir::new().unwrap();

    for day in [6, 7] {
        let summary = run_pass(Arc::clone(&provider), Arc::clone(&pricing), None)
            .await
            .unwrap();
        let as_of = Utc.with_ymd_and_hms(2026, 8, day, 12, 0, 0).unwrap();
        snapshot::merge(&summary.aggregates, temp.path(), as_of).unwrap();
    }

    let files = snapshot::list_snapshot_files(temp.path()).unwrap();
    let names: Vec<_> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["2026-08-07.json", "2026-08-06.json"]);
}
