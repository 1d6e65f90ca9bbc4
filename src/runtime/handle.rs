use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};

use crate::{
    core::contract::{QuizStore, StoreError},
    engine::{QuizConfig, QuizResult, generate_quiz},
    entity::{Club, Season},
    ingest::{ImportError, ImportReport, ImportRow, import_rows},
};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error("quiz service is not running")]
    ChannelClosed,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Commands that may wait for the store before senders block.
    pub queue_bound: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self { queue_bound: 256 }
    }
}

/// Cloneable handle to the task that owns the store.
#[derive(Clone)]
pub struct QuizServiceHandle {
    cmd_tx: mpsc::Sender<Command>,
}

enum Command {
    GenerateQuiz {
        config: QuizConfig,
        resp: oneshot::Sender<Result<QuizResult, ServiceError>>,
    },
    ListClubs {
        resp: oneshot::Sender<Result<Vec<Club>, ServiceError>>,
    },
    ListSeasons {
        resp: oneshot::Sender<Result<Vec<Season>, ServiceError>>,
    },
    Import {
        rows: Vec<ImportRow>,
        resp: oneshot::Sender<Result<ImportReport, ServiceError>>,
    },
    Shutdown {
        resp: oneshot::Sender<()>,
    },
}

/// Moves `store` onto a blocking task and serves commands one at a time,
/// so each quiz sees a single consistent view of the store.
pub fn spawn_quiz_service<S>(store: S, config: ServiceConfig) -> QuizServiceHandle
where
    S: QuizStore + 'static,
{
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(config.queue_bound.max(1));

    tokio::task::spawn_blocking(move || {
        let mut store = store;
        while let Some(cmd) = cmd_rx.blocking_recv() {
            if handle_command(cmd, &mut store) {
                break;
            }
        }
        debug!("quiz service stopped");
    });

    QuizServiceHandle { cmd_tx }
}

impl QuizServiceHandle {
    pub async fn generate_quiz(&self, config: QuizConfig) -> Result<QuizResult, ServiceError> {
        self.call(|resp| Command::GenerateQuiz { config, resp }).await?
    }

    pub async fn list_clubs(&self) -> Result<Vec<Club>, ServiceError> {
        self.call(|resp| Command::ListClubs { resp }).await?
    }

    pub async fn list_seasons(&self) -> Result<Vec<Season>, ServiceError> {
        self.call(|resp| Command::ListSeasons { resp }).await?
    }

    pub async fn import_rows(&self, rows: Vec<ImportRow>) -> Result<ImportReport, ServiceError> {
        self.call(|resp| Command::Import { rows, resp }).await?
    }

    /// Stops the service after already queued commands; later calls fail
    /// with [`ServiceError::ChannelClosed`].
    pub async fn shutdown(&self) -> Result<(), ServiceError> {
        self.call(|resp| Command::Shutdown { resp }).await
    }

    async fn call<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, ServiceError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(make(tx))
            .await
            .map_err(|_| ServiceError::ChannelClosed)?;
        rx.await.map_err(|_| ServiceError::ChannelClosed)
    }
}

fn handle_command<S>(cmd: Command, store: &mut S) -> bool
where
    S: QuizStore + ?Sized,
{
    match cmd {
        Command::GenerateQuiz { config, resp } => {
            let res = generate_quiz(&*store, &config).map_err(ServiceError::from);
            if let Err(err) = &res {
                error!(%err, "quiz generation failed");
            }
            let _ = resp.send(res);
        }
        Command::ListClubs { resp } => {
            let _ = resp.send(store.list_clubs().map_err(ServiceError::from));
        }
        Command::ListSeasons { resp } => {
            let _ = resp.send(store.list_seasons().map_err(ServiceError::from));
        }
        Command::Import { rows, resp } => {
            let _ = resp.send(import_rows(store, rows).map_err(ServiceError::from));
        }
        Command::Shutdown { resp } => {
            let _ = resp.send(());
            return true;
        }
    }

    false
}
