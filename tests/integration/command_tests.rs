//! Page commands delivered as worker messages

use crate::support::*;
use offgrid::{CommandOutcome, EventOutcome, MemoryStorage, Storage, WorkerEvent};
use std::sync::Arc;

#[tokio::test]
async fn skip_waiting_signals_host() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let harness = worker(storage, ScriptedFetcher::new(), deployment(&[], &[]));

    let outcome = harness
        .worker
        .dispatch(WorkerEvent::Message("skipWaiting".into()))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        EventOutcome::Handled(Some(CommandOutcome::SkippedWaiting))
    );
    assert_eq!(harness.host.skip_waiting_count(), 1);
}

#[tokio::test]
async fn download_offline_adds_missing_resources() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let fetcher = ScriptedFetcher::new();
    for key in ["a.js", "b.js", "c.js"] {
        fetcher.serve(key, key).await;
    }
    let harness = worker(
        storage.clone(),
        fetcher.clone(),
        deployment(&[("a.js", "1"), ("b.js", "2"), ("c.js", "3")], &["a.js"]),
    );
    harness.worker.lifecycle().install().await.unwrap();
    harness.worker.lifecycle().activate().await.unwrap();

    let calls = fetcher.calls();
    let outcome = harness
        .worker
        .dispatch(WorkerEvent::Message("downloadOffline".into()))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        EventOutcome::Handled(Some(CommandOutcome::Downloaded { added: 2 }))
    );
    assert_eq!(fetcher.calls(), calls + 2);
    assert_eq!(cached_keys(&*storage).await.len(), 3);

    let again = harness.worker.commands().download_offline().await.unwrap();
    assert_eq!(again, 0);
}

#[tokio::test]
async fn download_offline_is_all_or_nothing() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let fetcher = ScriptedFetcher::new();
    fetcher.serve("a.js", "a").await;
    fetcher.serve("b.js", "b").await;
    let harness = worker(
        storage.clone(),
        fetcher,
        deployment(&[("a.js", "1"), ("b.js", "2"), ("gone.js", "3")], &[]),
    );

    let result = harness.worker.commands().download_offline().await;

    assert!(result.is_err());
    assert!(cached_keys(&*storage).await.is_empty());
}

#[tokio::test]
async fn unknown_message_is_ignored() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let fetcher = ScriptedFetcher::new();
    let harness = worker(storage, fetcher.clone(), deployment(&[], &[]));

    let outcome = harness
        .worker
        .dispatch(WorkerEvent::Message("reboot".into()))
        .await
        .unwrap();

    assert_eq!(outcome, EventOutcome::Handled(None));
    assert_eq!(harness.host.skip_waiting_count(), 0);
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn download_offline_reports_only_missing_files() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let fetcher = ScriptedFetcher::new();
    for key in ["a.js", "b.js", "c.js"] {
        fetcher.serve(key, key).await;
    }
    let progress = Arc::new(RecordedProgress::default());
    let harness = worker_with_progress(
        storage,
        fetcher,
        deployment(&[("a.js", "1"), ("b.js", "2"), ("c.js", "3")], &["a.js"]),
        progress.clone(),
    );
    harness.worker.lifecycle().install().await.unwrap();
    harness.worker.lifecycle().activate().await.unwrap();

    harness.worker.commands().download_offline().await.unwrap();

    // One batch for the staged shell, one for the offline download
    assert_eq!(*progress.batches.lock().unwrap(), vec![1, 2]);
    let fetched = progress.fetched.lock().unwrap();
    let downloaded: Vec<&str> = fetched[1..].iter().map(|(k, _)| k.as_str()).collect();
    assert!(downloaded.contains(&"b.js") && downloaded.contains(&"c.js"));
    assert_eq!(fetched.last().map(|(_, n)| *n), Some(2));
}
