//! The feed loop: owns the session, drives iterations and reacts to their
//! failures.

use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::db::ConnectionManager;
use crate::domain::BatchSummary;
use crate::error::{FailureKind, FeederError};
use crate::ports::{Connector, Session};
use crate::services::iteration::IterationRunner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Once,
    Continuous { interval: Duration },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Starting,
    Connected,
    Iterating,
    Reconnecting,
    Stopped,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StopReason {
    #[default]
    Completed,
    Interrupted,
    /// An iteration left the session in an unknown state.
    Unexpected(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopReport {
    pub iterations: u64,
    pub committed: u64,
    pub rolled_back: u64,
    pub reconnects: u64,
    pub inserted: BatchSummary,
    pub stop_reason: StopReason,
}

impl LoopReport {
    fn record_commit(&mut self, summary: BatchSummary) {
        self.committed += 1;
        self.inserted.customers += summary.customers;
        self.inserted.accounts += summary.accounts;
        self.inserted.transactions += summary.transactions;
    }
}

/// How the iteration loop ended, and whether its session still needs closing.
enum Exit {
    Live(StopReason),
    Lost(StopReason),
}

pub struct FeedLoop<C: Connector> {
    manager: ConnectionManager<C>,
    runner: IterationRunner,
    mode: RunMode,
    shutdown: watch::Receiver<bool>,
    state: LoopState,
}

impl<C: Connector> FeedLoop<C> {
    /// `shutdown` flips to `true` on interrupt. It is only looked at between
    /// iterations.
    pub fn new(
        manager: ConnectionManager<C>,
        runner: IterationRunner,
        mode: RunMode,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            manager,
            runner,
            mode,
            shutdown,
            state: LoopState::Starting,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Runs until single-shot completion, interrupt, or an unexpected failure.
    /// Only connection exhaustion (initial or on reconnect) is returned as an error.
    pub async fn run(&mut self) -> Result<LoopReport, FeederError> {
        self.transition(LoopState::Starting);
        let mut report = LoopReport::default();

        let mut session = match self.open_session(false).await {
            Ok(Some(session)) => session,
            Ok(None) => {
                info!("Interrupted while connecting. Exiting...");
                self.transition(LoopState::Stopped);
                report.stop_reason = StopReason::Interrupted;
                return Ok(report);
            }
            Err(e) => {
                self.transition(LoopState::Stopped);
                return Err(e);
            }
        };
        self.transition(LoopState::Connected);

        let outcome = self.drive(&mut session, &mut report).await;
        self.transition(LoopState::Stopped);

        match outcome {
            Ok(Exit::Live(reason)) => {
                match session.close().await {
                    Ok(()) => info!("Database connection closed."),
                    Err(e) => warn!("Database connection did not close cleanly: {}", e),
                }
                report.stop_reason = reason;
                Ok(report)
            }
            // The session is already gone; dropping it releases the socket.
            Ok(Exit::Lost(reason)) => {
                report.stop_reason = reason;
                Ok(report)
            }
            Err(e) => Err(e),
        }
    }

    /// Opens a session through the retry policy. `None` means the interrupt
    /// arrived first.
    async fn open_session(&mut self, reconnect: bool) -> Result<Option<C::Session>, FeederError> {
        let manager = &self.manager;
        let shutdown = &mut self.shutdown;
        let opening = async {
            if reconnect {
                manager.reconnect().await
            } else {
                manager.connect().await
            }
        };

        tokio::select! {
            biased;
            result = opening => result.map(Some),
            _ = wait_for_shutdown(shutdown) => Ok(None),
        }
    }

    async fn drive(
        &mut self,
        session: &mut C::Session,
        report: &mut LoopReport,
    ) -> Result<Exit, FeederError> {
        loop {
            if self.interrupted() {
                info!("Interrupted by user. Cleaning up and exiting...");
                return Ok(Exit::Live(StopReason::Interrupted));
            }

            report.iterations += 1;
            let iteration = report.iterations;
            info!("--- Iteration {} started ---", iteration);
            self.transition(LoopState::Iterating);

            match self.runner.run(session).await {
                Ok(summary) => {
                    info!("Inserted {}.", summary);
                    report.record_commit(summary);
                }
                Err(err) => match err.kind() {
                    FailureKind::Continue => {
                        error!("Error during iteration, rolled back transaction: {}", err);
                        report.rolled_back += 1;
                    }
                    FailureKind::Reconnect => {
                        warn!("Iteration {} lost its connection: {}", iteration, err);
                        self.transition(LoopState::Reconnecting);
                        report.reconnects += 1;
                        match self.open_session(true).await? {
                            Some(fresh) => *session = fresh,
                            None => {
                                info!("Interrupted while reconnecting. Exiting...");
                                return Ok(Exit::Lost(StopReason::Interrupted));
                            }
                        }
                        self.transition(LoopState::Connected);
                        continue;
                    }
                    FailureKind::Fatal => {
                        error!(error = ?err, "Unexpected error: {}", err);
                        return Ok(Exit::Live(StopReason::Unexpected(err.to_string())));
                    }
                },
            }

            info!("--- Iteration {} finished ---", iteration);
            self.transition(LoopState::Connected);

            match self.mode {
                RunMode::Once => return Ok(Exit::Live(StopReason::Completed)),
                RunMode::Continuous { interval } => self.pause(interval).await,
            }
        }
    }

    async fn pause(&mut self, interval: Duration) {
        let shutdown = &mut self.shutdown;
        tokio::select! {
            _ = sleep(interval) => {}
            _ = wait_for_shutdown(shutdown) => {}
        }
    }

    fn interrupted(&self) -> bool {
        *self.shutdown.borrow()
    }

    fn transition(&mut self, next: LoopState) {
        if self.state != next {
            debug!("Feed loop {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }
}

async fn wait_for_shutdown(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow() {
            return;
        }
        if rx.changed().await.is_err() {
            // Sender gone: no interrupt can arrive any more.
            std::future::pending::<()>().await;
        }
    }
}
