use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{ClimboxError, ClimboxResult};

/// Runs a cycle immediately, then once per interval, on a worker thread.
#[derive(Debug, Clone, Copy)]
pub struct PollLoop {
    interval: Duration,
}

impl PollLoop {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    #[must_use]
    pub fn from_seconds(seconds: u64) -> Self {
        Self::new(Duration::from_secs(seconds))
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Starts the worker. Errors returned by `cycle` are logged and the loop
    /// keeps going.
    pub fn spawn<F>(self, mut cycle: F) -> ClimboxResult<PollHandle>
    where
        F: FnMut() -> ClimboxResult<()> + Send + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let interval = self.interval;
        let worker = thread::Builder::new()
            .name("climbox-poll".to_owned())
            .spawn(move || {
                let mut runs = 0_u64;
                loop {
                    runs += 1;
                    if let Err(err) = cycle() {
                        warn!(run = runs, error = %err, "poll cycle failed");
                    }
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                debug!(runs, "poll loop stopped");
            })
            .map_err(|e| ClimboxError::InvalidConfig(format!("failed to spawn poll worker: {e}")))?;

        Ok(PollHandle {
            stop: Some(stop_tx),
            worker: Some(worker),
        })
    }
}

/// Owner of a running [`PollLoop`].
///
/// Stopping takes effect between cycles; a cycle in progress completes.
/// Dropping the handle stops the loop without waiting for it.
#[derive(Debug)]
pub struct PollHandle {
    stop: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl PollHandle {
    pub fn stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }

    /// Stops the loop and waits for the worker to exit.
    pub fn join(mut self) -> ClimboxResult<()> {
        self.stop();
        match self.worker.take() {
            Some(worker) => worker
                .join()
                .map_err(|_| ClimboxError::InvalidData("poll worker panicked".to_owned())),
            None => Ok(()),
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
