//! Lifecycle supervisor: owns the shared [`CancellationToken`] and fans in
//! the terminal outcome of every pipeline stage task.
//!
//! Any stage exiting — whether with a [`StageError`] or simply returning,
//! which should never happen in steady state since stages loop until
//! cancelled — is treated as a signal to shut the whole pipeline down: the
//! remaining stages are cancelled and the supervisor waits for all of them
//! to drain before returning, so in-flight messages get a chance to finish
//! rather than being dropped mid-flight.

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::error::StageError;

/// Coordinates shutdown across however many stage tasks are registered.
pub struct Supervisor {
    cancel: CancellationToken,
    tasks: JoinSet<Result<(), StageError>>,
}

impl Supervisor {
    pub fn new() -> Self {
        Self {
            cancel: CancellationToken::new(),
            tasks: JoinSet::new(),
        }
    }

    /// The token every stage should watch for cancellation, and the token
    /// the HTTP server's graceful-shutdown future should watch too.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Register a stage task. Its future must already be wired to observe
    /// `cancellation_token()` internally; the supervisor does not abort
    /// tasks forcibly, only asks them to stop.
    pub fn spawn<F>(&mut self, future: F)
    where
        F: std::future::Future<Output = Result<(), StageError>> + Send + 'static,
    {
        self.tasks.spawn(future);
    }

    /// Run until either `shutdown` resolves (e.g. SIGINT) or any registered
    /// stage exits on its own, whichever comes first. Either way, every
    /// other stage is cancelled and this waits for the full set to drain
    /// before returning.
    ///
    /// Returns the first [`StageError`] encountered, if any; `Ok(())` means
    /// shutdown was externally requested and every stage exited cleanly.
    pub async fn run_until_shutdown(
        mut self,
        shutdown: impl std::future::Future<Output = ()>,
    ) -> Result<(), StageError> {
        tokio::pin!(shutdown);
        let mut first_error = None;

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("shutdown requested, cancelling pipeline");
                    self.cancel.cancel();
                    break;
                }
                Some(result) = self.tasks.join_next() => {
                    match result {
                        Ok(Ok(())) => {
                            info!("pipeline stage exited, shutting down remaining stages");
                        }
                        Ok(Err(stage_err)) => {
                            error!(error = %stage_err, "pipeline stage failed, shutting down remaining stages");
                            first_error.get_or_insert(stage_err);
                        }
                        Err(join_err) => {
                            error!(error = %join_err, "pipeline stage task panicked");
                        }
                    }
                    self.cancel.cancel();
                    break;
                }
                else => break,
            }
        }

        while let Some(result) = self.tasks.join_next().await {
            if let Ok(Err(stage_err)) = result {
                first_error.get_or_insert(stage_err);
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new()
    }
}
