use std::{
    sync::mpsc::{channel, Receiver, Sender, TryRecvError},
    thread::{self, JoinHandle},
};

use tracing::{debug, info, warn};

use crate::{cancellation::CancellationToken, error::Error};

/// Progress reporter handed to a running job.
#[derive(Debug, Clone)]
pub struct Progress {
    sender: Sender<f64>,
}

impl Progress {
    /// Publishes the completed fraction of the job, clamped to `0..=1`.
    pub fn report(&self, fraction: f64) {
        // controller is gone, nobody is listening
        let _ = self.sender.send(fraction.clamp(0.0, 1.0));
    }
}

struct Running<T> {
    handle: JoinHandle<()>,
    results: Receiver<Result<T, Error>>,
    progress: Receiver<f64>,
}

/// Runs one generate or match job at a time on a background thread.
///
/// The job owns everything it works on and hands back its result through a channel, so the
/// controller never sees partial state. A job stays active until its result was collected
/// with [`Worker::poll`] or [`Worker::wait`].
///
pub struct Worker<T: Send + 'static> {
    token: CancellationToken,
    running: Option<Running<T>>,
    progress: f64,
}

impl<T: Send + 'static> Default for Worker<T> {
    fn default() -> Self {
        Self {
            token: CancellationToken::new(),
            running: None,
            progress: 0.0,
        }
    }
}

impl<T: Send + 'static> Worker<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a job.
    ///
    /// # Arguments
    /// * `job` - Work to run, polls the token and may report progress
    ///
    /// # Errors
    /// [`Error::WorkerBusy`] if a job is still active, the new job is not queued.
    ///
    pub fn spawn<F>(&mut self, job: F) -> Result<(), Error>
    where
        F: FnOnce(&CancellationToken, &Progress) -> Result<T, Error> + Send + 'static,
    {
        if self.running.is_some() {
            return Err(Error::WorkerBusy);
        }

        // a cancel issued while idle must not abort the new job
        self.token.reset();
        self.progress = 0.0;

        let (result_sender, results) = channel();
        let (progress_sender, progress) = channel();
        let token = self.token.clone();
        let handle = thread::spawn(move || {
            let reporter = Progress {
                sender: progress_sender,
            };
            let result = job(&token, &reporter);
            if result_sender.send(result).is_err() {
                debug!("Worker result dropped, controller is gone");
            }
        });

        self.running = Some(Running {
            handle,
            results,
            progress,
        });
        debug!("Worker job started");
        Ok(())
    }

    /// Requests the active job to stop. Idempotent.
    pub fn cancel(&self) {
        if self.running.is_some() {
            info!("Cancelling worker job");
        }
        self.token.cancel();
    }

    pub fn is_busy(&self) -> bool {
        self.running.is_some()
    }

    /// Last progress fraction reported by the active or the last job.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Collects the result if the job has finished, never blocks.
    ///
    /// Returns `None` while the job runs or if no job was started.
    ///
    pub fn poll(&mut self) -> Option<Result<T, Error>> {
        let running = self.running.as_ref()?;
        self.progress = running
            .progress
            .try_iter()
            .fold(self.progress, |_, fraction| fraction);
        let result = match running.results.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(Error::WorkerDisconnected),
        };
        Some(self.finish(result))
    }

    /// Blocks until the active job has finished and returns its result.
    ///
    /// Returns `None` if no job was started.
    ///
    pub fn wait(&mut self) -> Option<Result<T, Error>> {
        let running = self.running.as_ref()?;
        let result = running
            .results
            .recv()
            .unwrap_or(Err(Error::WorkerDisconnected));
        Some(self.finish(result))
    }

    fn finish(&mut self, result: Result<T, Error>) -> Result<T, Error> {
        if let Some(running) = self.running.take() {
            if let Some(fraction) = running.progress.try_iter().last() {
                self.progress = fraction;
            }
            if running.handle.join().is_err() {
                warn!("Worker thread panicked");
            }
        }
        self.token.reset();
        match &result {
            Ok(_) => debug!("Worker job finished"),
            Err(err) if err.is_cancelled() => info!("Worker job cancelled"),
            Err(err) => warn!("Worker job failed: {}", err),
        }
        result
    }
}

impl<T: Send + 'static> Drop for Worker<T> {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            self.token.cancel();
            let _ = running.handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn until_cancelled(token: &CancellationToken, _: &Progress) -> Result<usize, Error> {
        loop {
            token.check()?;
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_result_and_progress() {
        let mut worker = Worker::new();
        assert!(worker.poll().is_none());
        worker
            .spawn(|_, progress| {
                progress.report(0.5);
                progress.report(2.0);
                Ok(42)
            })
            .unwrap();
        assert_eq!(worker.wait(), Some(Ok(42)));
        assert_eq!(worker.progress(), 1.0);
        assert!(!worker.is_busy());
        assert!(worker.wait().is_none());
    }

    #[test]
    fn test_busy_and_cancel() {
        let mut worker = Worker::new();
        worker.spawn(until_cancelled).unwrap();
        assert_eq!(worker.spawn(|_, _| Ok(1)), Err(Error::WorkerBusy));
        assert!(worker.poll().is_none());

        worker.cancel();
        worker.cancel();
        assert_eq!(worker.wait(), Some(Err(Error::Cancelled)));
        assert!(!worker.token.is_cancelled());

        // ready for the next run
        worker.spawn(|_, _| Ok(7)).unwrap();
        assert_eq!(worker.wait(), Some(Ok(7)));
    }

    #[test]
    fn test_cancel_while_idle_is_ignored() {
        let mut worker = Worker::new();
        worker.cancel();
        worker
            .spawn(|token, _| {
                token.check()?;
                Ok(3)
            })
            .unwrap();
        assert_eq!(worker.wait(), Some(Ok(3)));
    }

    #[test]
    fn test_poll_until_done() {
        let mut worker = Worker::new();
        worker.spawn(|_, _| Ok("done")).unwrap();
        let result = loop {
            if let Some(result) = worker.poll() {
                break result;
            }
            thread::sleep(Duration::from_millis(1));
        };
        assert_eq!(result, Ok("done"));
    }

    #[test]
    fn test_panicking_job_disconnects() {
        let mut worker: Worker<usize> = Worker::new();
        worker.spawn(|_, _| panic!("job failed")).unwrap();
        assert_eq!(worker.wait(), Some(Err(Error::WorkerDisconnected)));
        assert!(!worker.is_busy());
    }
}
