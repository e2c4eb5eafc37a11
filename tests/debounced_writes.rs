// tests/debounced_writes.rs

use std::sync::Arc;
use std::time::{Duration, Instant};

use catalog_gen::engine::{DebouncedWriter, WriteOutcome};
use catalog_gen::fs::mock::MockFileSystem;
use catalog_gen_test_utils::{init_tracing, with_timeout};

const PAGE: &str = "/p/src/app/catalog/Button/Primary/page.tsx";

fn writer(fs: &MockFileSystem, window: Duration) -> DebouncedWriter {
    DebouncedWriter::new(Arc::new(fs.clone()), window, "/p")
}

#[tokio::test]
async fn burst_of_requests_collapses_into_last_content() {
    init_tracing();
    let fs = MockFileSystem::new();
    let w = writer(&fs, Duration::from_millis(30));

    let outcomes = with_timeout(async {
        let pending: Vec<_> = (0..5).map(|i| w.schedule(PAGE, format!("v{i}"))).collect();
        let mut outcomes = Vec::new();
        for p in pending {
            outcomes.push(p.settle().await.unwrap());
        }
        outcomes
    })
    .await;

    assert_eq!(
        outcomes.iter().filter(|o| **o == WriteOutcome::Wrote).count(),
        1
    );
    assert_eq!(outcomes.last(), Some(&WriteOutcome::Wrote));
    assert_eq!(fs.write_count(PAGE), 1);
    assert_eq!(fs.contents(PAGE).as_deref(), Some("v4"));
}

#[tokio::test]
async fn requests_spaced_inside_the_window_restart_it() {
    init_tracing();
    let fs = MockFileSystem::new();
    let w = writer(&fs, Duration::from_millis(60));

    let first = w.schedule(PAGE, "old");
    let first = tokio::spawn(first.settle());
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(fs.write_count(PAGE), 0);

    let second = with_timeout(w.write_if_changed(PAGE, "new")).await.unwrap();

    assert_eq!(first.await.unwrap().unwrap(), WriteOutcome::Superseded);
    assert_eq!(second, WriteOutcome::Wrote);
    assert_eq!(fs.write_count(PAGE), 1);
    assert_eq!(fs.contents(PAGE).as_deref(), Some("new"));
}

#[tokio::test]
async fn identical_content_is_not_rewritten() {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_file(PAGE, "same");
    let w = writer(&fs, Duration::from_millis(5));

    let outcome = with_timeout(w.write_if_changed(PAGE, "same")).await.unwrap();

    assert_eq!(outcome, WriteOutcome::Unchanged);
    assert_eq!(fs.total_writes(), 0);
}

#[tokio::test]
async fn distinct_paths_do_not_wait_for_each_other() {
    init_tracing();
    let fs = MockFileSystem::new();
    let window = Duration::from_millis(100);
    let w = writer(&fs, window);

    let started = Instant::now();
    let pending: Vec<_> = (0..5)
        .map(|i| w.schedule(format!("/p/src/app/catalog/S{i}/page.tsx"), "x"))
        .collect();
    let handles: Vec<_> = pending.into_iter().map(|p| tokio::spawn(p.settle())).collect();
    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), WriteOutcome::Wrote);
    }

    // Five sequential windows would take at least 500ms.
    assert!(started.elapsed() < window * 4);
    assert_eq!(fs.total_writes(), 5);
}

#[tokio::test]
async fn cancelled_writes_never_touch_disk() {
    init_tracing();
    let fs = MockFileSystem::new();
    let w = writer(&fs, Duration::from_millis(20));

    let doomed = w.schedule("/p/src/app/catalog/Old/X/page.tsx", "x");
    let kept = w.schedule("/p/src/app/catalog/page.tsx", "index");
    w.cancel_matching(|p| p.starts_with("/p/src/app/catalog/Old"));

    assert_eq!(doomed.settle().await.unwrap(), WriteOutcome::Superseded);
    assert_eq!(kept.settle().await.unwrap(), WriteOutcome::Wrote);
    assert_eq!(fs.total_writes(), 1);
    assert_eq!(w.pending_count(), 0);
}
