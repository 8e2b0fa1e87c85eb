//! # Registration Session
//!
//! Ties a frontend's lifetime to the running process. A session adds the
//! frontend, optionally waits until the process is asked to stop, and then
//! removes it exactly once.
//!
//! ```text
//! Idle → Registered → Waiting → Deregistering → Terminated
//!             └──────────(no wait)──────────────────┘
//! ```
//!
//! Termination requests arrive through a [`CancellationToken`]. Signal
//! handlers (see [`signals`]) only cancel the token; every state transition
//! happens on the flow that owns the session.

pub mod signals;

use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::FrontendRecord;
use crate::registry::{FrontendRegistry, RegistryError};

/// How long the final remove may take before the process exits anyway
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Registered,
    Waiting,
    Deregistering,
    Terminated,
}

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("Failed to add frontend '{id}'")]
    Register {
        id: String,
        #[source]
        source: RegistryError,
    },

    #[error("Gave up adding frontend '{id}' {grace:?} after termination was requested")]
    RegisterTimeout { id: String, grace: Duration },

    #[error("Failed to remove frontend '{id}'")]
    Deregister {
        id: String,
        #[source]
        source: RegistryError,
    },

    #[error("Gave up removing frontend '{id}' after {grace:?}")]
    DeregisterTimeout { id: String, grace: Duration },
}

#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    /// Block until terminated and deregister before returning
    pub wait: bool,

    /// Upper bound on the final remove call
    pub grace_period: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self { wait: false, grace_period: DEFAULT_GRACE_PERIOD }
    }
}

/// A registered frontend owned by this process
#[derive(Debug)]
pub struct RegistrationSession<'a, R: FrontendRegistry + ?Sized> {
    registry: &'a R,
    id: String,
    state: SessionState,
    deregistered: bool,
}

impl<'a, R: FrontendRegistry + ?Sized> RegistrationSession<'a, R> {
    pub fn new(registry: &'a R, id: impl Into<String>) -> Self {
        Self { registry, id: id.into(), state: SessionState::Idle, deregistered: false }
    }

    /// Add the frontend. The session stays `Idle` unless the registry accepted it.
    pub async fn start(&mut self, record: &FrontendRecord) -> Result<(), SessionError> {
        if self.state != SessionState::Idle {
            debug!(frontend = %self.id, state = ?self.state, "Frontend already added");
            return Ok(());
        }
        debug!(frontend = %self.id, selectors = record.selectors.len(), "Adding frontend");

        self.registry
            .add(&self.id, record)
            .await
            .map_err(|source| SessionError::Register { id: self.id.clone(), source })?;

        info!("Added frontend '{}'", self.id);
        self.state = SessionState::Registered;
        Ok(())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_deregistered(&self) -> bool {
        self.deregistered
    }

    /// Suspend until `shutdown` is cancelled. Returns immediately if it already was.
    pub async fn await_termination(&mut self, shutdown: &CancellationToken) {
        self.state = SessionState::Waiting;
        info!("Waiting for termination to remove frontend '{}'", self.id);
        shutdown.cancelled().await;
        debug!(frontend = %self.id, "Termination requested");
    }

    /// Remove the frontend, bounded by `grace`. Only the first call reaches
    /// the registry; later calls return `Ok(())` without doing anything.
    pub async fn deregister(&mut self, grace: Duration) -> Result<(), SessionError> {
        if self.deregistered || self.state == SessionState::Idle {
            debug!(frontend = %self.id, state = ?self.state, "Nothing to deregister");
            return Ok(());
        }
        self.deregistered = true;
        self.state = SessionState::Deregistering;

        info!("Removing frontend '{}'", self.id);
        let result = match tokio::time::timeout(grace, self.registry.remove(&self.id)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(source)) => Err(SessionError::Deregister { id: self.id.clone(), source }),
            Err(_) => {
                warn!(frontend = %self.id, grace_secs = grace.as_secs(), "Remove did not finish in time");
                Err(SessionError::DeregisterTimeout { id: self.id.clone(), grace })
            }
        };

        self.state = SessionState::Terminated;
        result
    }

    /// End a session that was not asked to wait. The frontend stays registered.
    pub fn finish(mut self) -> SessionState {
        if self.state == SessionState::Registered {
            self.state = SessionState::Terminated;
        }
        self.state
    }
}

/// Run the whole lifecycle: add, then (in wait mode) wait for `shutdown` and remove.
///
/// In wait mode a termination request that arrives while the add is still in
/// flight starts the grace period right away: the add and the following
/// remove must both finish before it runs out.
pub async fn run<R: FrontendRegistry + ?Sized>(
    registry: &R,
    id: &str,
    record: &FrontendRecord,
    options: SessionOptions,
    shutdown: &CancellationToken,
) -> Result<SessionState, SessionError> {
    let mut session = RegistrationSession::new(registry, id);

    if !options.wait {
        session.start(record).await?;
        return Ok(session.finish());
    }

    // Deadline set when termination was requested before the add finished
    let interrupted = {
        let start = session.start(record);
        tokio::pin!(start);

        tokio::select! {
            biased;
            result = &mut start => {
                result?;
                None
            }
            _ = shutdown.cancelled() => {
                info!("Termination requested while adding frontend '{}'", id);
                let deadline = Instant::now() + options.grace_period;
                tokio::time::timeout_at(deadline, start).await.map_err(|_| {
                    SessionError::RegisterTimeout { id: id.to_string(), grace: options.grace_period }
                })??;
                Some(deadline)
            }
        }
    };

    match interrupted {
        Some(deadline) => {
            session.deregister(deadline.saturating_duration_since(Instant::now())).await?
        }
        None => {
            session.await_termination(shutdown).await;
            session.deregister(options.grace_period).await?;
        }
    }
    Ok(session.state())
}
