//! Install and activate across deployment generations

use crate::support::*;
use offgrid::{
    Activation, CacheMode, EventOutcome, MemoryStorage, OffgridError, PersistedManifest, Request,
    Storage, WorkerEvent,
};
use std::sync::Arc;

async fn persisted(storage: &dyn Storage) -> Option<PersistedManifest> {
    let region = storage.open(MANIFEST).await.unwrap();
    let artifact = region.get("manifest").await.unwrap()?;
    Some(PersistedManifest::from_json(&artifact.body).unwrap())
}

async fn install_and_activate(harness: &Harness) -> Activation {
    harness.worker.lifecycle().install().await.unwrap();
    harness.worker.lifecycle().activate().await.unwrap()
}

#[tokio::test]
async fn fresh_install_caches_only_shell() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let fetcher = ScriptedFetcher::new();
    fetcher.serve("index.html", "<html>").await;
    fetcher.serve("main.js", "main()").await;
    fetcher.serve("logo.png", "png").await;

    let pairs = [("index.html", "h1"), ("main.js", "h2"), ("logo.png", "h3")];
    let gen1 = worker(
        storage.clone(),
        fetcher.clone(),
        deployment(&pairs, &["index.html", "main.js"]),
    );

    let staged = gen1.worker.lifecycle().install().await.unwrap();
    assert_eq!(staged, 2);
    assert_eq!(gen1.host.skip_waiting_count(), 1);
    assert!(fetcher
        .requests()
        .await
        .iter()
        .all(|r| r.cache_mode == CacheMode::Reload));

    let activation = gen1.worker.lifecycle().activate().await.unwrap();
    assert_eq!(activation, Activation::Fresh { copied: 2 });
    assert_eq!(gen1.host.claim_count(), 1);

    assert_eq!(
        cached_keys(&*storage).await,
        vec!["index.html".to_string(), "main.js".to_string()]
    );
    assert!(!storage.has(STAGING).await.unwrap());

    let record = persisted(&*storage).await.unwrap();
    assert_eq!(record.resources, manifest(&pairs));
    assert!(record.activated_at.is_some());
}

#[tokio::test]
async fn upgrade_evicts_changed_resources_and_refreshes_shell() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let fetcher = ScriptedFetcher::new();
    fetcher.serve("a.js", "A1").await;
    fetcher.serve("b.js", "B1").await;

    let gen1 = worker(
        storage.clone(),
        fetcher.clone(),
        deployment(&[("a.js", "h1"), ("b.js", "h2")], &["a.js"]),
    );
    install_and_activate(&gen1).await;
    gen1.worker
        .interceptor()
        .handle(&Request::get(url("b.js")))
        .await
        .unwrap();
    assert_eq!(cached_body(&*storage, "b.js").await.as_deref(), Some("B1"));

    fetcher.serve("a.js", "A2").await;
    fetcher.serve("b.js", "B2").await;
    let gen2 = worker(
        storage.clone(),
        fetcher.clone(),
        deployment(&[("a.js", "h1"), ("b.js", "h3")], &["a.js"]),
    );
    let activation = install_and_activate(&gen2).await;

    assert_eq!(
        activation,
        Activation::Upgraded {
            evicted: 1,
            retained: 1,
            copied: 1
        }
    );
    assert_eq!(cached_body(&*storage, "a.js").await.as_deref(), Some("A2"));
    assert_eq!(cached_body(&*storage, "b.js").await, None);

    let record = persisted(&*storage).await.unwrap();
    assert_eq!(record.resources.fingerprint("b.js"), Some("h3"));
}

#[tokio::test]
async fn upgrade_evicts_orphaned_resources() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let fetcher = ScriptedFetcher::new();
    for key in ["a.js", "b.js", "c.js"] {
        fetcher.serve(key, key).await;
    }

    let gen1 = worker(
        storage.clone(),
        fetcher.clone(),
        deployment(&[("a.js", "h1"), ("b.js", "h2"), ("c.js", "h3")], &["a.js"]),
    );
    install_and_activate(&gen1).await;
    gen1.worker.commands().download_offline().await.unwrap();
    assert_eq!(cached_keys(&*storage).await.len(), 3);

    let gen2 = worker(
        storage.clone(),
        fetcher.clone(),
        deployment(&[("a.js", "h1"), ("b.js", "h2")], &["a.js"]),
    );
    install_and_activate(&gen2).await;

    assert_eq!(
        cached_keys(&*storage).await,
        vec!["a.js".to_string(), "b.js".to_string()]
    );
}

#[tokio::test]
async fn reactivation_with_same_manifest_keeps_contents() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let fetcher = ScriptedFetcher::new();
    fetcher.serve("a.js", "A").await;
    fetcher.serve("b.js", "B").await;

    let pairs = [("a.js", "h1"), ("b.js", "h2")];
    let gen1 = worker(storage.clone(), fetcher.clone(), deployment(&pairs, &["a.js"]));
    install_and_activate(&gen1).await;
    gen1.worker.commands().download_offline().await.unwrap();
    let before = cached_keys(&*storage).await;

    let gen2 = worker(storage.clone(), fetcher.clone(), deployment(&pairs, &["a.js"]));
    gen2.worker.lifecycle().install().await.unwrap();
    let calls = fetcher.calls();
    let activation = gen2.worker.lifecycle().activate().await.unwrap();

    assert_eq!(fetcher.calls(), calls);
    assert_eq!(
        activation,
        Activation::Upgraded {
            evicted: 0,
            retained: 2,
            copied: 1
        }
    );
    assert_eq!(cached_keys(&*storage).await, before);
    assert_eq!(cached_body(&*storage, "b.js").await.as_deref(), Some("B"));
}

#[tokio::test]
async fn activation_failure_resets_every_region() {
    let faulty = Arc::new(FaultyStorage::new(MemoryStorage::new(), RESOURCES));
    let storage: Arc<dyn Storage> = faulty.clone();
    let fetcher = ScriptedFetcher::new();
    fetcher.serve("a.js", "A").await;

    let harness = worker(
        storage.clone(),
        fetcher.clone(),
        deployment(&[("a.js", "h1")], &["a.js"]),
    );
    harness.worker.lifecycle().install().await.unwrap();

    faulty.arm();
    let activation = harness.worker.lifecycle().activate().await.unwrap();

    assert!(activation.is_reset());
    assert_eq!(harness.host.claim_count(), 0);
    for name in [RESOURCES, STAGING, MANIFEST] {
        assert!(!storage.has(name).await.unwrap(), "{} survived", name);
    }
}

#[tokio::test]
async fn upgrade_failure_after_eviction_resets_every_region() {
    let faulty = Arc::new(FaultyStorage::new(MemoryStorage::new(), MANIFEST));
    let storage: Arc<dyn Storage> = faulty.clone();
    let fetcher = ScriptedFetcher::new();
    fetcher.serve("a.js", "A1").await;
    fetcher.serve("b.js", "B1").await;

    let gen1 = worker(
        storage.clone(),
        fetcher.clone(),
        deployment(&[("a.js", "h1"), ("b.js", "h2")], &["a.js"]),
    );
    install_and_activate(&gen1).await;
    gen1.worker.commands().download_offline().await.unwrap();

    let gen2 = worker(
        storage.clone(),
        fetcher.clone(),
        deployment(&[("a.js", "h1"), ("b.js", "h3")], &["a.js"]),
    );
    gen2.worker.lifecycle().install().await.unwrap();

    // The manifest write is the last step, after b.js has been evicted
    faulty.arm();
    let activation = gen2.worker.lifecycle().activate().await.unwrap();

    match activation {
        Activation::Reset { reason } => assert!(reason.contains(MANIFEST), "{}", reason),
        other => panic!("expected a reset, got {:?}", other),
    }
    assert_eq!(gen2.host.claim_count(), 0);
    assert!(storage.names().await.unwrap().is_empty());
}

#[tokio::test]
async fn failed_teardown_is_returned_as_error() {
    let faulty = Arc::new(FaultyStorage::new(MemoryStorage::new(), RESOURCES));
    let storage: Arc<dyn Storage> = faulty.clone();
    let fetcher = ScriptedFetcher::new();
    fetcher.serve("a.js", "A").await;

    let harness = worker(
        storage.clone(),
        fetcher.clone(),
        deployment(&[("a.js", "h1")], &["a.js"]),
    );
    harness.worker.lifecycle().install().await.unwrap();

    faulty.arm();
    faulty.arm_deletes();
    let err = harness.worker.lifecycle().activate().await.unwrap_err();

    assert!(matches!(err, OffgridError::Storage { ref region, .. } if region == RESOURCES));
    assert_eq!(harness.host.claim_count(), 0);
    // Teardown still attempted the regions it could delete
    assert!(!storage.has(STAGING).await.unwrap());
    assert!(!storage.has(MANIFEST).await.unwrap());
}

#[tokio::test]
async fn install_reports_each_shell_file() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let fetcher = ScriptedFetcher::new();
    fetcher.serve("index.html", "<html>").await;
    fetcher.serve("main.js", "main()").await;
    let progress = Arc::new(RecordedProgress::default());

    let harness = worker_with_progress(
        storage,
        fetcher,
        deployment(
            &[("index.html", "h1"), ("main.js", "h2"), ("logo.png", "h3")],
            &["index.html", "main.js"],
        ),
        progress.clone(),
    );
    harness.worker.lifecycle().install().await.unwrap();

    assert_eq!(*progress.batches.lock().unwrap(), vec![2]);
    assert_eq!(
        progress.summary(),
        (vec!["index.html".to_string(), "main.js".to_string()], 2)
    );
}

#[tokio::test]
async fn failed_install_stages_nothing() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let fetcher = ScriptedFetcher::new();
    fetcher.serve("a.js", "A").await;

    let harness = worker(
        storage.clone(),
        fetcher.clone(),
        deployment(&[("a.js", "h1"), ("missing.js", "h2")], &["a.js", "missing.js"]),
    );
    let err = harness.worker.lifecycle().install().await.unwrap_err();

    assert!(err.to_string().contains("missing.js"));
    let staging = storage.open(STAGING).await.unwrap();
    assert!(staging.keys().await.unwrap().is_empty());
}

#[tokio::test]
async fn dispatch_routes_lifecycle_events() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let fetcher = ScriptedFetcher::new();
    fetcher.serve("a.js", "A").await;

    let harness = worker(storage, fetcher, deployment(&[("a.js", "h1")], &["a.js"]));

    let installed = harness.worker.dispatch(WorkerEvent::Install).await.unwrap();
    assert_eq!(installed, EventOutcome::Installed { staged: 1 });

    let activated = harness.worker.dispatch(WorkerEvent::Activate).await.unwrap();
    assert_eq!(
        activated,
        EventOutcome::Activated(Activation::Fresh { copied: 1 })
    );
}
