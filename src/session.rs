//! Session state for one monitoring lifecycle

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::notifier::NotificationRecord;
use crate::probe::CheckResult;

/// Handle on the repeating check timer
#[derive(Debug)]
pub struct TimerHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl TimerHandle {
    pub fn new(token: CancellationToken, task: JoinHandle<()>) -> Self {
        Self { token, task }
    }

    /// Stop the timer. The loop observes the token and exits on its own;
    /// the join handle is dropped without waiting.
    fn cancel(self) {
        self.token.cancel();
        drop(self.task);
    }
}

/// State shared between the engine and the API surface
#[derive(Debug)]
pub struct MonitorSession {
    /// Availability reported by the last completed pass. None until a
    /// pass completes, and again after a stop.
    pub last_status: Option<bool>,
    pub last_result: Option<CheckResult>,
    timer: Option<TimerHandle>,
    pub history: VecDeque<NotificationRecord>,
    pub history_max_size: usize,
}

impl MonitorSession {
    pub fn new(history_max_size: usize) -> Self {
        Self {
            last_status: None,
            last_result: None,
            timer: None,
            history: VecDeque::with_capacity(history_max_size),
            history_max_size,
        }
    }

    /// Install the repeating timer, stopping any previously armed one.
    /// A session never has more than one timer.
    pub fn arm_timer(&mut self, timer: TimerHandle) {
        if let Some(old) = self.timer.replace(timer) {
            tracing::debug!("Replacing an already armed timer");
            old.cancel();
        }
    }

    /// Stop the repeating timer if one is armed
    pub fn disarm_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    pub fn record_result(&mut self, result: CheckResult) {
        self.last_result = Some(result);
    }

    pub fn set_last_status(&mut self, available: bool) {
        self.last_status = Some(available);
    }

    /// Forget the last known status so the next pass notifies again
    pub fn reset_last_status(&mut self) {
        self.last_status = None;
    }

    /// Add a delivery attempt to history
    pub fn add_notification(&mut self, record: NotificationRecord) {
        if self.history.len() >= self.history_max_size {
            self.history.pop_front();
        }
        self.history.push_back(record);
    }
}

/// Thread-safe session handle
pub type SessionHandle = Arc<RwLock<MonitorSession>>;

pub fn new_session_handle(history_max_size: usize) -> SessionHandle {
    Arc::new(RwLock::new(MonitorSession::new(history_max_size)))
}
