// ABOUTME: Integration tests for the telemetry service facade
// ABOUTME: Covers idempotent merges, batch atomicity under concurrency, retention, deadlines and snapshots
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{batch, create_test_telemetry, samples_every_second};
use lifestyle_series::{Sample, SnapshotFile};
use lifestyle_streams::errors::ErrorCode;
use lifestyle_streams::telemetry::{RangeQuery, SnapshotWriter, TelemetryService};
use rand::seq::SliceRandom;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Barrier;
use uuid::Uuid;

const START: i64 = 1_700_000_000_000;

async fn window(service: &TelemetryService, owner: Uuid, metric: &str) -> Vec<Sample> {
    service
        .query(owner, RangeQuery::new(metric, 0, i64::MAX).with_max_points(1_000))
        .await
        .unwrap()
        .points
}

#[tokio::test]
async fn test_reingesting_a_batch_is_idempotent() {
    let service = create_test_telemetry(10_000);
    let owner = Uuid::new_v4();
    let samples = samples_every_second(START, 50);

    service.ingest(owner, batch("hr", samples.clone())).await.unwrap();
    let first = window(&service, owner, "hr").await;
    let report = service.ingest(owner, batch("hr", samples)).await.unwrap();
    let second = window(&service, owner, "hr").await;

    assert_eq!(first, second);
    assert_eq!(second.len(), 50);
    assert_eq!(report.retained, 50);
}

#[tokio::test]
async fn test_batch_order_does_not_matter() {
    let service = create_test_telemetry(10_000);
    let (sorted_owner, shuffled_owner) = (Uuid::new_v4(), Uuid::new_v4());
    let samples = samples_every_second(START, 200);
    let mut shuffled = samples.clone();
    shuffled.shuffle(&mut rand::thread_rng());

    service.ingest(sorted_owner, batch("hr", samples)).await.unwrap();
    service.ingest(shuffled_owner, batch("hr", shuffled)).await.unwrap();

    let sorted = window(&service, sorted_owner, "hr").await;
    assert_eq!(sorted, window(&service, shuffled_owner, "hr").await);
    assert!(sorted.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
}

#[tokio::test]
async fn test_last_write_wins_for_duplicate_timestamps() {
    let service = create_test_telemetry(10_000);
    let owner = Uuid::new_v4();

    let report = service
        .ingest(
            owner,
            batch(
                "hr",
                vec![
                    Sample::new(START, 1.0),
                    Sample::new(START + 1_000, 5.0),
                    Sample::new(START, 2.0),
                ],
            ),
        )
        .await
        .unwrap();
    assert_eq!(report.accepted, 2);

    service
        .ingest(owner, batch("hr", vec![Sample::new(START + 1_000, 7.0)]))
        .await
        .unwrap();

    assert_eq!(
        window(&service, owner, "hr").await,
        vec![Sample::new(START, 2.0), Sample::new(START + 1_000, 7.0)]
    );
}

#[tokio::test]
async fn test_range_bounds_are_inclusive() {
    let service = create_test_telemetry(10_000);
    let owner = Uuid::new_v4();
    service
        .ingest(owner, batch("hr", samples_every_second(START, 10)))
        .await
        .unwrap();

    let result = service
        .query(owner, RangeQuery::new("hr", START + 2_000, START + 5_000))
        .await
        .unwrap();
    assert_eq!(result.total, 4);
    assert_eq!(result.points.first().unwrap().timestamp, START + 2_000);
    assert_eq!(result.points.last().unwrap().timestamp, START + 5_000);

    let point = service
        .query(owner, RangeQuery::new("hr", START + 3_000, START + 3_000))
        .await
        .unwrap();
    assert_eq!(point.total, 1);
}

#[tokio::test]
async fn test_retention_evicts_oldest_samples() {
    let service = create_test_telemetry(100);
    let owner = Uuid::new_v4();

    let report = service
        .ingest(owner, batch("hr", samples_every_second(START, 130)))
        .await
        .unwrap();
    assert_eq!(report.evicted, 30);
    assert_eq!(report.retained, 100);

    let kept = window(&service, owner, "hr").await;
    assert_eq!(kept.len(), 100);
    assert_eq!(kept[0].timestamp, START + 30_000);
}

#[tokio::test]
async fn test_invalid_samples_are_counted_as_rejected() {
    let service = create_test_telemetry(100);
    let owner = Uuid::new_v4();

    let report = service
        .ingest(
            owner,
            batch(
                "hr",
                vec![
                    Sample::new(START, 60.0),
                    Sample::new(START + 1_000, f64::NAN),
                    Sample::new(-1, 61.0),
                    Sample::new(START + 2_000, f64::INFINITY),
                ],
            ),
        )
        .await
        .unwrap();

    assert_eq!(report.accepted, 1);
    assert_eq!(report.rejected, 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_batches_are_applied_whole() {
    const BATCH: usize = 20_000;
    let service = create_test_telemetry(100_000);
    let owner = Uuid::new_v4();
    let first = samples_every_second(START, BATCH);
    let second = samples_every_second(START + 1_000 * i64::try_from(BATCH).unwrap(), BATCH);
    let start = Arc::new(Barrier::new(3));

    let writers = [first, second].map(|samples| {
        let service = service.clone();
        let start = Arc::clone(&start);
        tokio::spawn(async move {
            start.wait().await;
            service.ingest(owner, batch("hr", samples)).await.unwrap()
        })
    });
    let reader = {
        let service = service.clone();
        let start = Arc::clone(&start);
        tokio::spawn(async move {
            start.wait().await;
            let mut observations = 0_usize;
            loop {
                let total = service
                    .query(owner, RangeQuery::new("hr", 0, i64::MAX).with_max_points(1_000))
                    .await
                    .unwrap()
                    .total;
                assert_eq!(total % BATCH, 0, "observed a partial batch: {total}");
                observations += 1;
                if total == 2 * BATCH {
                    break observations;
                }
                tokio::task::yield_now().await;
            }
        })
    };

    for writer in writers {
        assert_eq!(writer.await.unwrap().accepted, BATCH);
    }
    assert!(reader.await.unwrap() >= 1);
    assert_eq!(
        service
            .query(owner, RangeQuery::new("hr", 0, i64::MAX).with_max_points(10))
            .await
            .unwrap()
            .total,
        2 * BATCH
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_query_deadline_returns_timeout() {
    let service = create_test_telemetry(1_000_000);
    let owner = Uuid::new_v4();
    service
        .ingest(owner, batch("hr", samples_every_second(START, 300_000)))
        .await
        .unwrap();

    let err = service
        .query_with_deadline(
            owner,
            RangeQuery::new("hr", 0, i64::MAX).with_max_points(1_000),
            Duration::ZERO,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::RequestTimeout);
    assert!(err.code.is_retryable());

    let result = service
        .query_with_deadline(
            owner,
            RangeQuery::new("hr", 0, i64::MAX).with_max_points(1_000),
            Duration::from_secs(30),
        )
        .await
        .unwrap();
    assert_eq!(result.total, 300_000);
    assert_eq!(result.points.len(), 1_000);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_deadline_returns_timeout_but_batch_still_lands() {
    let service = create_test_telemetry(1_000_000);
    let owner = Uuid::new_v4();
    let mut samples = samples_every_second(START, 300_000);
    samples.shuffle(&mut rand::thread_rng());

    let err = service
        .ingest_with_deadline(owner, batch("hr", samples), Duration::ZERO)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::RequestTimeout);

    let mut total = 0;
    for _ in 0..100 {
        total = service
            .query(owner, RangeQuery::new("hr", 0, i64::MAX).with_max_points(10))
            .await
            .unwrap()
            .total;
        if total > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert_eq!(total, 300_000);
}

#[tokio::test]
async fn test_list_purge_and_stats() {
    let service = create_test_telemetry(1_000);
    let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
    for metric in ["hr", "cadence"] {
        service
            .ingest(alice, batch(metric, samples_every_second(START, 5)))
            .await
            .unwrap();
    }
    service
        .ingest(bob, batch("hr", samples_every_second(START, 3)))
        .await
        .unwrap();

    assert_eq!(service.list_metrics(alice).await.unwrap().len(), 2);
    let stats = service.stats().await.unwrap();
    assert_eq!((stats.series, stats.samples), (3, 13));

    assert_eq!(service.purge_owner(alice).await.unwrap(), 2);
    assert!(service.list_metrics(alice).await.unwrap().is_empty());
    assert_eq!(service.list_metrics(bob).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_snapshot_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("streams.json");
    let owner = Uuid::new_v4();

    let original = create_test_telemetry(1_000);
    original
        .ingest(owner, batch("hr", samples_every_second(START, 25)))
        .await
        .unwrap();
    let bytes = SnapshotWriter::new(original.clone(), SnapshotFile::new(&path))
        .save()
        .await
        .unwrap();
    assert!(bytes > 0);

    let restored = create_test_telemetry(1_000);
    let series = SnapshotWriter::new(restored.clone(), SnapshotFile::new(&path))
        .restore()
        .await
        .unwrap();
    assert_eq!(series, 1);
    assert_eq!(
        window(&restored, owner, "hr").await,
        window(&original, owner, "hr").await
    );
}

#[tokio::test]
async fn test_corrupt_snapshot_is_store_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("streams.json");
    std::fs::write(&path, b"{ this is not a snapshot").unwrap();

    let err = SnapshotWriter::new(create_test_telemetry(10), SnapshotFile::new(&path))
        .restore()
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::StoreUnavailable);
}
