//! Completion tracking for animated (smooth) scrolls.
//!
//! The host starts a native smooth scroll and reports the element offset on
//! every animation frame. A task resolves once the offset reaches its
//! target, gives up after a timeout, and can be cancelled by a newer command.

/// Offsets closer than this are considered equal.
pub const OFFSET_EPSILON: f64 = 0.5;

/// Lifecycle of a [`ScrollTask`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Running,
    Completed,
    TimedOut,
    Cancelled,
}

/// An in-flight animated scroll toward `target`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollTask<T> {
    id: u64,
    target: f64,
    started_ms: f64,
    timeout_ms: f64,
    state: TaskState,
    /// Payload handed back on completion.
    on_complete: Option<T>,
}

impl<T> ScrollTask<T> {
    pub fn start(id: u64, target: f64, now_ms: f64, timeout_ms: f64, on_complete: Option<T>) -> Self {
        Self {
            id,
            target,
            started_ms: now_ms,
            timeout_ms,
            state: TaskState::Running,
            on_complete,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TaskState::Running
    }

    /// Check the element offset for this frame.
    ///
    /// Returns the completion payload exactly once, on the frame the target
    /// is reached. Timed out or cancelled tasks never yield it.
    pub fn poll(&mut self, offset: f64, now_ms: f64) -> Option<T> {
        if !self.is_running() {
            return None;
        }
        if (offset - self.target).abs() < OFFSET_EPSILON {
            self.state = TaskState::Completed;
            tracing::trace!(task = self.id, target = self.target, "scroll animation completed");
            return self.on_complete.take();
        }
        if now_ms - self.started_ms >= self.timeout_ms {
            self.state = TaskState::TimedOut;
            tracing::debug!(task = self.id, offset, target = self.target, "scroll animation timed out");
            self.on_complete = None;
        }
        None
    }

    pub fn cancel(&mut self) {
        if self.is_running() {
            self.state = TaskState::Cancelled;
            self.on_complete = None;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_completes_once() {
        let mut task = ScrollTask::start(1, 300.0, 0.0, 1000.0, Some("edge"));
        assert_eq!(task.poll(100.0, 16.0), None);
        assert_eq!(task.poll(299.8, 32.0), Some("edge"));
        assert_eq!(task.state(), TaskState::Completed);
        assert_eq!(task.poll(300.0, 48.0), None);
    }

    #[test]
    fn test_times_out_without_payload() {
        let mut task = ScrollTask::start(2, 300.0, 0.0, 100.0, Some(()));
        assert_eq!(task.poll(200.0, 100.0), None);
        assert_eq!(task.state(), TaskState::TimedOut);
        assert_eq!(task.poll(300.0, 120.0), None);
    }

    #[test]
    fn test_cancelled_task_is_inert() {
        let mut task = ScrollTask::start(3, 0.0, 0.0, 1000.0, Some(()));
        task.cancel();
        assert_eq!(task.state(), TaskState::Cancelled);
        assert_eq!(task.poll(0.0, 10.0), None);
    }
}
