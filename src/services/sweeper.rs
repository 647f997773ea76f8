//! Background tasks: the interval and cron runners, and the session expiry
//! sweep that deletes accounts whose session has gone idle.

use crate::clients::DirectoryClient;
use crate::error::AppError;
use crate::store::SessionTracker;
use chrono::Utc;
use cron::Schedule;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// A spawned periodic task plus the handle that stops it.
pub struct BackgroundTask {
    handle: JoinHandle<()>,
    shutdown: watch::Sender<bool>,
}

impl BackgroundTask {
    /// Signals the loop to exit and waits for it.
    pub async fn stop(self) {
        // Receiver dropping first also ends the loop; send errors are moot.
        let _ = self.shutdown.send(true);
        let _ = self.handle.await;
    }
}

/// Runs `task` every `period` until stopped. Missed ticks are skipped, not
/// replayed.
pub fn run_every<F, Fut>(period: Duration, mut task: F) -> BackgroundTask
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send,
{
    let (shutdown, mut stopped) = watch::channel(false);
    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = ticker.tick() => task().await,
                changed = stopped.changed() => {
                    if changed.is_err() || *stopped.borrow() {
                        break;
                    }
                }
            }
        }
    });

    BackgroundTask { handle, shutdown }
}

/// Runs `task` at every upcoming fire time of the cron schedule until
/// stopped.
pub fn run_on_schedule<F, Fut>(schedule: Schedule, mut task: F) -> BackgroundTask
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send,
{
    let (shutdown, mut stopped) = watch::channel(false);
    let handle = tokio::spawn(async move {
        loop {
            let Some(next) = schedule.upcoming(Utc).next() else {
                break;
            };
            let wait = (next - Utc::now()).to_std().unwrap_or(Duration::ZERO);
            tokio::select! {
                _ = tokio::time::sleep(wait) => task().await,
                changed = stopped.changed() => {
                    if changed.is_err() || *stopped.borrow() {
                        break;
                    }
                }
            }
        }
    });

    BackgroundTask { handle, shutdown }
}

/// Deletes accounts whose session has been idle past the limit.
#[derive(Clone)]
pub struct SessionSweeper {
    sessions: Arc<SessionTracker>,
    directory: DirectoryClient,
    max_idle: Duration,
}

impl SessionSweeper {
    pub fn new(sessions: Arc<SessionTracker>, directory: DirectoryClient, max_idle: Duration) -> Self {
        Self {
            sessions,
            directory,
            max_idle,
        }
    }

    /// One sweep pass. A no-op while nothing is tracked. The session entry is
    /// only dropped once the directory has deleted the account (or reports it
    /// already gone), so a directory outage retries on the next tick.
    pub async fn sweep(&self) {
        if self.sessions.is_empty() {
            return;
        }

        for otp in self.sessions.stale(self.max_idle) {
            match self.directory.delete_account(otp).await {
                Ok(()) => {
                    self.sessions.remove(otp);
                    tracing::info!(session = otp, "expired session swept");
                }
                Err(AppError::NotFound(_)) => {
                    self.sessions.remove(otp);
                }
                Err(err) => {
                    tracing::warn!(session = otp, error = %err, "sweep failed, will retry");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr as _;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn interval_runner_fires_and_stops() {
        let count = Arc::new(AtomicUsize::new(0));
        let task_count = count.clone();
        let task = run_every(Duration::from_millis(5), move || {
            let task_count = task_count.clone();
            async move {
                task_count.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_millis(30)).await;
        task.stop().await;
        let at_stop = count.load(Ordering::SeqCst);
        assert!(at_stop >= 2);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(count.load(Ordering::SeqCst), at_stop);
    }

    #[tokio::test]
    async fn cron_runner_stops_cleanly() {
        // Fires every second; stopping before the first fire must not hang.
        let schedule = Schedule::from_str("* * * * * *").unwrap();
        let count = Arc::new(AtomicUsize::new(0));
        let task_count = count.clone();
        let task = run_on_schedule(schedule, move || {
            let task_count = task_count.clone();
            async move {
                task_count.fetch_add(1, Ordering::SeqCst);
            }
        });

        task.stop().await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn sweep_deletes_stale_sessions_only() {
        let mut server = mockito::Server::new_async().await;
        let delete = server
            .mock("DELETE", "/accounts")
            .match_header("sessionId", "1234")
            .with_status(200)
            .with_body(r#"{"message":"account deleted"}"#)
            .create_async()
            .await;

        let sessions = Arc::new(SessionTracker::new());
        sessions.touch(1234);
        std::thread::sleep(Duration::from_millis(25));
        sessions.touch(5678);

        let sweeper = SessionSweeper::new(
            sessions.clone(),
            DirectoryClient::new(server.url()),
            Duration::from_millis(20),
        );
        sweeper.sweep().await;

        delete.assert_async().await;
        assert!(!sessions.is_empty());
        assert!(!sessions.stale(Duration::ZERO).contains(&1234));
    }

    #[tokio::test]
    async fn sweep_keeps_the_session_when_the_directory_is_down() {
        let sessions = Arc::new(SessionTracker::new());
        sessions.touch(1234);
        std::thread::sleep(Duration::from_millis(5));

        let sweeper = SessionSweeper::new(
            sessions.clone(),
            DirectoryClient::new("http://127.0.0.1:1".to_string()),
            Duration::from_millis(1),
        );
        sweeper.sweep().await;

        assert_eq!(sessions.stale(Duration::from_millis(1)), vec![1234]);
    }

    #[tokio::test]
    async fn sweep_forgets_sessions_the_directory_no_longer_knows() {
        let mut server = mockito::Server::new_async().await;
        let _delete = server
            .mock("DELETE", "/accounts")
            .with_status(404)
            .with_body(r#"{"error":"Not found: account for session 1234","status":404}"#)
            .create_async()
            .await;

        let sessions = Arc::new(SessionTracker::new());
        sessions.touch(1234);
        std::thread::sleep(Duration::from_millis(5));

        let sweeper = SessionSweeper::new(
            sessions.clone(),
            DirectoryClient::new(server.url()),
            Duration::from_millis(1),
        );
        sweeper.sweep().await;

        assert!(sessions.is_empty());
    }
}
