//! Termination signal handling
//!
//! The listener task translates SIGINT/SIGTERM into a cancelled
//! [`CancellationToken`] and does nothing else.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Install handlers for termination signals and cancel `shutdown` whenever one arrives.
///
/// Handlers are installed before this returns, so a signal delivered right
/// after the call is never lost.
pub fn listen_for_termination(shutdown: CancellationToken) -> std::io::Result<JoinHandle<()>> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut interrupt = signal(SignalKind::interrupt())?;
        let mut terminate = signal(SignalKind::terminate())?;

        Ok(tokio::spawn(async move {
            loop {
                let name = tokio::select! {
                    Some(()) = interrupt.recv() => "SIGINT",
                    Some(()) = terminate.recv() => "SIGTERM",
                    else => break,
                };
                request_termination(&shutdown, name);
            }
        }))
    }

    #[cfg(not(unix))]
    {
        Ok(tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                request_termination(&shutdown, "Ctrl-C");
            }
        }))
    }
}

/// Cancel `shutdown` on behalf of `source`. Repeated requests are logged and ignored.
pub fn request_termination(shutdown: &CancellationToken, source: &str) {
    if shutdown.is_cancelled() {
        warn!("Received {} while already shutting down", source);
        return;
    }
    info!("Received {}, shutting down", source);
    shutdown.cancel();
}
