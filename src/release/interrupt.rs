// ABOUTME: Operator interrupt seam for long-running engine calls.
// ABOUTME: Ctrl-C is turned into a cancellation request instead of killing the process.

use async_trait::async_trait;
use std::io;
use tokio::sync::watch;

/// A cancellation request the flows can poll and wait on.
#[async_trait]
pub trait Interrupt: Send + Sync {
    /// Whether cancellation has already been requested.
    fn is_requested(&self) -> bool;

    /// Resolves once cancellation is requested. Never resolves otherwise.
    async fn requested(&self);
}

/// Never fires.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInterrupt;

#[async_trait]
impl Interrupt for NoInterrupt {
    fn is_requested(&self) -> bool {
        false
    }

    async fn requested(&self) {
        std::future::pending::<()>().await;
    }
}

/// Fires on the first SIGINT (Ctrl-C) delivered to the process.
///
/// While a listener is alive, SIGINT no longer terminates the process, so
/// the engine child and the directory lock get a chance to wind down. A
/// signal that arrives after every listener was dropped exits with 130.
#[derive(Debug, Clone)]
pub struct CtrlC {
    rx: watch::Receiver<bool>,
}

impl CtrlC {
    /// Install the handler. Must be called inside a Tokio runtime.
    pub fn listen() -> io::Result<Self> {
        let (tx, rx) = watch::channel(false);

        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};

            // Registered here rather than in the task so a signal that
            // arrives before the task is first polled is not lost
            let mut sigint = signal(SignalKind::interrupt())?;
            tokio::spawn(async move {
                if sigint.recv().await.is_some() {
                    tracing::debug!("received SIGINT");
                    request_or_exit(&tx);
                }
            });
        }

        #[cfg(not(unix))]
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::debug!("received Ctrl-C");
                request_or_exit(&tx);
            }
        });

        Ok(Self { rx })
    }
}

fn request_or_exit(tx: &watch::Sender<bool>) {
    if tx.send(true).is_err() {
        // Nothing is left to wind down
        std::process::exit(130);
    }
}

#[async_trait]
impl Interrupt for CtrlC {
    fn is_requested(&self) -> bool {
        *self.rx.borrow()
    }

    async fn requested(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|fired| *fired).await.is_err() {
            // Listener task is gone; no request can arrive any more
            std::future::pending::<()>().await;
        }
    }
}
