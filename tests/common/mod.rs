#![allow(dead_code)]

use async_trait::async_trait;
use repo_browser::error::{RepoBrowserError, Result};
use repo_browser::{
    ConfigStore, FetchOrchestrator, FetchStatus, MemoryStore, ReadOnlyObservable,
    RepositoryFetcher, RepositoryKind, RepositorySummary,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

pub const WAIT: Duration = Duration::from_secs(5);

/// One call made to a [`ScriptedFetcher`], waiting for the test to answer it
pub struct PendingFetch {
    pub target: String,
    pub kind: RepositoryKind,
    pub token: Option<String>,
    responder: oneshot::Sender<Result<Vec<RepositorySummary>>>,
}

impl PendingFetch {
    pub fn succeed(self, repositories: Vec<RepositorySummary>) {
        let _ = self.responder.send(Ok(repositories));
    }

    pub fn fail(self, message: &str) {
        let _ = self
            .responder
            .send(Err(RepoBrowserError::ApiError(message.to_string())));
    }
}

/// Fetcher whose calls complete only when the test resolves them
pub struct ScriptedFetcher {
    calls: mpsc::UnboundedSender<PendingFetch>,
}

impl ScriptedFetcher {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<PendingFetch>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { calls: tx }), rx)
    }
}

#[async_trait]
impl RepositoryFetcher for ScriptedFetcher {
    async fn fetch_repositories(
        &self,
        target: &str,
        kind: RepositoryKind,
        token: Option<&str>,
    ) -> Result<Vec<RepositorySummary>> {
        let (responder, response) = oneshot::channel();
        self.calls
            .send(PendingFetch {
                target: target.to_string(),
                kind,
                token: token.map(str::to_string),
                responder,
            })
            .map_err(|_| RepoBrowserError::ApiError("test dropped the call log".to_string()))?;

        response
            .await
            .unwrap_or_else(|_| Err(RepoBrowserError::ApiError("call abandoned".to_string())))
    }
}

/// Fetcher that answers immediately and records what it was asked
#[derive(Default)]
pub struct StaticFetcher {
    pub repositories: Vec<RepositorySummary>,
    pub fail: bool,
    pub calls: AtomicUsize,
    pub last_request: Mutex<Option<(String, RepositoryKind, Option<String>)>>,
}

impl StaticFetcher {
    pub fn returning(repositories: Vec<RepositorySummary>) -> Arc<Self> {
        Arc::new(Self {
            repositories,
            ..Default::default()
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Default::default()
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<(String, RepositoryKind, Option<String>)> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl RepositoryFetcher for StaticFetcher {
    async fn fetch_repositories(
        &self,
        target: &str,
        kind: RepositoryKind,
        token: Option<&str>,
    ) -> Result<Vec<RepositorySummary>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() =
            Some((target.to_string(), kind, token.map(str::to_string)));

        if self.fail {
            return Err(RepoBrowserError::ApiError("scripted failure".to_string()));
        }
        Ok(self.repositories.clone())
    }
}

pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub config: ConfigStore,
    pub orchestrator: FetchOrchestrator,
}

impl TestContext {
    pub async fn new(fetcher: Arc<dyn RepositoryFetcher>) -> Self {
        Self::with_target("acme", RepositoryKind::Organization, fetcher).await
    }

    pub async fn with_target(
        name: &str,
        kind: RepositoryKind,
        fetcher: Arc<dyn RepositoryFetcher>,
    ) -> Self {
        let store = Arc::new(MemoryStore::new());
        let config = ConfigStore::new(store.clone()).expect("Failed to seed config");
        config.set_target_name(name).expect("Failed to set target name");
        config.set_kind(kind).expect("Failed to set kind");

        let orchestrator = FetchOrchestrator::spawn(&config, fetcher)
            .await
            .expect("Failed to spawn orchestrator");

        TestContext {
            store,
            config,
            orchestrator,
        }
    }
}

/// Forward every published status into a channel
pub fn watch_status(
    status: &ReadOnlyObservable<FetchStatus>,
) -> mpsc::UnboundedReceiver<FetchStatus> {
    let (tx, rx) = mpsc::unbounded_channel();
    status.subscribe(move |s| {
        let _ = tx.send(s.clone());
    });
    rx
}

/// Wait until request `request_id` has been published as loaded or failed
pub async fn settled(
    statuses: &mut mpsc::UnboundedReceiver<FetchStatus>,
    request_id: u64,
) -> FetchStatus {
    tokio::time::timeout(WAIT, async {
        loop {
            let status = statuses.recv().await.expect("status channel closed");
            match &status {
                FetchStatus::Loaded { request_id: id, .. }
                | FetchStatus::Failed { request_id: id, .. }
                    if *id == request_id =>
                {
                    return status;
                }
                _ => {}
            }
        }
    })
    .await
    .expect("Timed out waiting for fetch to settle")
}

/// Poll the stats until `discarded` reaches `expected`
pub async fn wait_for_discarded(orchestrator: &FetchOrchestrator, expected: u64) {
    tokio::time::timeout(WAIT, async {
        loop {
            let stats = orchestrator.stats().await.expect("Failed to get stats");
            if stats.discarded >= expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("Timed out waiting for stale result to be discarded")
}

pub fn repo(name: &str, stars: u32) -> RepositorySummary {
    RepositorySummary::new(name, Some("test repository"), stars)
}

pub async fn next_call(calls: &mut mpsc::UnboundedReceiver<PendingFetch>) -> PendingFetch {
    tokio::time::timeout(WAIT, calls.recv())
        .await
        .expect("Timed out waiting for fetch call")
        .expect("fetch call channel closed")
}
