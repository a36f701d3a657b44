use std::future::Future;
use std::sync::{Mutex, PoisonError};

use tokio::task::JoinSet;
use tracing::error;

/// Runs persistence work off the request path. Failures are logged with the
/// task label; they never reach the caller.
#[derive(Default)]
pub struct BackgroundWriter {
    tasks: Mutex<JoinSet<()>>,
}

impl BackgroundWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn<F>(&self, label: &'static str, work: F)
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        while tasks.try_join_next().is_some() {}
        tasks.spawn(async move {
            if let Err(e) = work.await {
                error!(task = label, error = %format!("{e:#}"), "background write failed");
            }
        });
    }

    /// Waits for every task spawned so far.
    pub async fn drain(&self) {
        let mut tasks = {
            let mut guard = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut *guard)
        };
        while let Some(res) = tasks.join_next().await {
            if let Err(e) = res {
                error!(error = %e, "background task panicked");
            }
        }
    }

    pub fn pending(&self) -> usize {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn drain_waits_for_all_tasks() {
        let writer = BackgroundWriter::new();
        let done = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let done = done.clone();
            writer.spawn("count", async move {
                tokio::task::yield_now().await;
                done.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        }
        writer.drain().await;
        assert_eq!(done.load(Ordering::SeqCst), 3);
        assert_eq!(writer.pending(), 0);
    }

    #[tokio::test]
    async fn failures_are_swallowed() {
        let writer = BackgroundWriter::new();
        writer.spawn("fails", async { anyhow::bail!("db unavailable") });
        writer.drain().await;
    }
}
