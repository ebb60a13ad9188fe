use chrono::Utc;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::config::ConfigStore;
use crate::error::{RepoBrowserError, Result};
use crate::github::RepositoryFetcher;
use crate::models::{
    Configuration, FetchStatus, OrchestratorStats, RepositoryKind, RepositorySummary,
};
use crate::observable::{Observable, ReadOnlyObservable};

const CALL_TIMEOUT: Duration = Duration::from_secs(5);

/// Actor that owns the published repository list
///
/// Every state change happens inside `handle`, so the request counter, the
/// configuration snapshot and the container writes are never interleaved.
/// Fetches run as detached tasks and report back with `FetchCompleted`.
pub struct FetchOrchestratorActor;

pub struct FetchOrchestratorState {
    fetcher: Arc<dyn RepositoryFetcher>,
    config: Configuration,
    repositories: Observable<Vec<RepositorySummary>>,
    status: Observable<FetchStatus>,
    latest_request: u64,
    stats: OrchestratorStats,
}

/// Messages the orchestrator can handle
#[derive(Debug)]
pub enum FetchOrchestratorMessage {
    /// Fetch again with the current configuration
    Refresh,
    /// Target name was persisted
    TargetNameChanged(String),
    /// Target kind was persisted
    KindChanged(RepositoryKind),
    /// Token was persisted or cleared
    TokenChanged(Option<String>),
    /// A fetch task finished
    FetchCompleted {
        request_id: u64,
        result: Result<Vec<RepositorySummary>>,
    },
    GetConfiguration(RpcReplyPort<Configuration>),
    GetStats(RpcReplyPort<OrchestratorStats>),
}

pub struct FetchOrchestratorArgs {
    pub fetcher: Arc<dyn RepositoryFetcher>,
    pub config: Configuration,
    pub repositories: Observable<Vec<RepositorySummary>>,
    pub status: Observable<FetchStatus>,
}

#[ractor::async_trait]
impl Actor for FetchOrchestratorActor {
    type Msg = FetchOrchestratorMessage;
    type State = FetchOrchestratorState;
    type Arguments = FetchOrchestratorArgs;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> std::result::Result<Self::State, ActorProcessingErr> {
        info!(
            target_name = %args.config.target_name,
            kind = %args.config.kind,
            authenticated = args.config.token.is_some(),
            "Starting fetch orchestrator"
        );

        Ok(FetchOrchestratorState {
            fetcher: args.fetcher,
            config: args.config,
            repositories: args.repositories,
            status: args.status,
            latest_request: 0,
            stats: OrchestratorStats::default(),
        })
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> std::result::Result<(), ActorProcessingErr> {
        match message {
            FetchOrchestratorMessage::Refresh => {
                state.issue_fetch(&myself, "refresh");
            }
            FetchOrchestratorMessage::TargetNameChanged(name) => {
                state.config.target_name = name.trim().to_string();
                state.issue_fetch(&myself, "target_name_changed");
            }
            FetchOrchestratorMessage::KindChanged(kind) => {
                state.config.kind = kind;
                state.issue_fetch(&myself, "kind_changed");
            }
            FetchOrchestratorMessage::TokenChanged(token) => {
                state.config.token = token.filter(|t| !t.is_empty());
                state.issue_fetch(&myself, "token_changed");
            }
            FetchOrchestratorMessage::FetchCompleted { request_id, result } => {
                state.complete_fetch(request_id, result);
            }
            FetchOrchestratorMessage::GetConfiguration(reply) => {
                if reply.send(state.config.clone()).is_err() {
                    debug!("Configuration requester went away");
                }
            }
            FetchOrchestratorMessage::GetStats(reply) => {
                if reply.send(state.stats.clone()).is_err() {
                    debug!("Stats requester went away");
                }
            }
        }

        Ok(())
    }

    async fn post_stop(
        &self,
        _myself: ActorRef<Self::Msg>,
        state: &mut Self::State,
    ) -> std::result::Result<(), ActorProcessingErr> {
        info!(
            issued = state.stats.issued,
            published = state.stats.published,
            discarded = state.stats.discarded,
            "Fetch orchestrator stopped"
        );
        Ok(())
    }
}

impl FetchOrchestratorState {
    fn issue_fetch(&mut self, myself: &ActorRef<FetchOrchestratorMessage>, trigger: &'static str) {
        self.latest_request += 1;
        self.stats.issued += 1;
        let request_id = self.latest_request;
        let snapshot = self.config.clone();

        info!(
            request_id,
            trigger,
            target_name = %snapshot.target_name,
            kind = %snapshot.kind,
            "Issuing repository fetch"
        );
        self.status.set(FetchStatus::Loading { request_id });

        let fetcher = Arc::clone(&self.fetcher);
        let myself = myself.clone();
        tokio::spawn(async move {
            let result = fetcher
                .fetch_repositories(&snapshot.target_name, snapshot.kind, snapshot.token.as_deref())
                .await;

            if let Err(e) = myself.send_message(FetchOrchestratorMessage::FetchCompleted {
                request_id,
                result,
            }) {
                debug!(request_id, "Orchestrator gone before fetch completed: {}", e);
            }
        });
    }

    fn complete_fetch(&mut self, request_id: u64, result: Result<Vec<RepositorySummary>>) {
        self.stats.completed += 1;

        if request_id != self.latest_request {
            self.stats.discarded += 1;
            debug!(
                request_id,
                latest_request = self.latest_request,
                "Discarding stale fetch result"
            );
            return;
        }

        let now = Utc::now();
        match result {
            Ok(repositories) => {
                let count = repositories.len();
                info!(request_id, count, "Publishing repositories");
                self.repositories.set(repositories);
                self.status.set(FetchStatus::Loaded {
                    request_id,
                    count,
                    at: now,
                });
            }
            Err(e) => {
                error!(request_id, "Error loading repositories: {}", e);
                self.stats.failed += 1;
                self.repositories.set(Vec::new());
                self.status.set(FetchStatus::Failed {
                    request_id,
                    message: e.to_string(),
                    at: now,
                });
            }
        }

        self.stats.published += 1;
        self.stats.last_published_at = Some(now);
    }
}

/// Handle to a running orchestrator
///
/// Intent methods never fail: a fetch error ends up as an empty list, and a
/// stopped orchestrator is only logged.
#[derive(Clone)]
pub struct FetchOrchestrator {
    actor: ActorRef<FetchOrchestratorMessage>,
    repositories: ReadOnlyObservable<Vec<RepositorySummary>>,
    status: ReadOnlyObservable<FetchStatus>,
}

impl FetchOrchestrator {
    /// Spawn the orchestrator with the configuration currently in `config`
    ///
    /// No fetch is issued until the first intent arrives.
    pub async fn spawn(config: &ConfigStore, fetcher: Arc<dyn RepositoryFetcher>) -> Result<Self> {
        let repositories = Observable::new(Vec::new());
        let status = Observable::new(FetchStatus::Idle);

        let args = FetchOrchestratorArgs {
            fetcher,
            config: config.configuration(),
            repositories: repositories.clone(),
            status: status.clone(),
        };

        let (actor, _handle) = Actor::spawn(None, FetchOrchestratorActor, args)
            .await
            .map_err(|e| {
                RepoBrowserError::OrchestratorError(format!("Failed to start orchestrator: {}", e))
            })?;

        Ok(Self {
            actor,
            repositories: repositories.read_only(),
            status: status.read_only(),
        })
    }

    pub fn current_list(&self) -> ReadOnlyObservable<Vec<RepositorySummary>> {
        self.repositories.clone()
    }

    pub fn status(&self) -> ReadOnlyObservable<FetchStatus> {
        self.status.clone()
    }

    pub fn refresh(&self) {
        self.send(FetchOrchestratorMessage::Refresh);
    }

    pub fn on_target_name_changed(&self, name: impl Into<String>) {
        self.send(FetchOrchestratorMessage::TargetNameChanged(name.into()));
    }

    pub fn on_kind_changed(&self, kind: RepositoryKind) {
        self.send(FetchOrchestratorMessage::KindChanged(kind));
    }

    pub fn on_token_changed(&self, token: Option<String>) {
        self.send(FetchOrchestratorMessage::TokenChanged(token));
    }

    /// Configuration the next fetch will use
    pub async fn configuration(&self) -> Result<Configuration> {
        let result = self
            .actor
            .call(
                |reply| FetchOrchestratorMessage::GetConfiguration(reply),
                Some(CALL_TIMEOUT),
            )
            .await;
        unwrap_call(result, "configuration")
    }

    pub async fn stats(&self) -> Result<OrchestratorStats> {
        let result = self
            .actor
            .call(
                |reply| FetchOrchestratorMessage::GetStats(reply),
                Some(CALL_TIMEOUT),
            )
            .await;
        unwrap_call(result, "stats")
    }

    pub fn shutdown(&self) {
        self.actor.stop(Some("shutdown requested".to_string()));
    }

    fn send(&self, message: FetchOrchestratorMessage) {
        if let Err(e) = self.actor.send_message(message) {
            error!("Failed to reach fetch orchestrator: {}", e);
        }
    }
}

fn unwrap_call<T>(
    result: std::result::Result<
        ractor::rpc::CallResult<T>,
        ractor::MessagingErr<FetchOrchestratorMessage>,
    >,
    what: &str,
) -> Result<T> {
    match result {
        Ok(ractor::rpc::CallResult::Success(value)) => Ok(value),
        Ok(ractor::rpc::CallResult::Timeout) => Err(RepoBrowserError::OrchestratorError(format!(
            "Timeout getting {}",
            what
        ))),
        Ok(ractor::rpc::CallResult::SenderError) => Err(RepoBrowserError::OrchestratorError(
            format!("Sender error getting {}", what),
        )),
        Err(e) => Err(RepoBrowserError::OrchestratorError(format!(
            "Failed to get {}: {}",
            what, e
        ))),
    }
}
