//! Virtual-time timers
//!
//! The host owns time: nothing fires until [`TimerQueue::advance`] moves the
//! clock forward. Due timers run in deadline order, outside the queue's lock,
//! so a firing callback may freely schedule or cancel other timers.

use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Callback invoked when a timer fires.
pub type TimerCallback = Arc<dyn Fn() + Send + Sync>;

/// Handle for canceling a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

struct Scheduled {
    id: TimerId,
    deadline: Duration,
    callback: TimerCallback,
}

#[derive(Default)]
struct QueueInner {
    now: Duration,
    next_id: u64,
    timers: Vec<Scheduled>,
}

/// Deadline-ordered timer queue driven by explicit [`advance`](Self::advance)
/// calls.
#[derive(Default)]
pub struct TimerQueue {
    inner: Mutex<QueueInner>,
}

impl std::fmt::Debug for TimerQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock().unwrap();
        f.debug_struct("TimerQueue")
            .field("now", &inner.now)
            .field("pending", &inner.timers.len())
            .finish()
    }
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.inner.lock().unwrap().now
    }

    /// Number of timers waiting to fire.
    pub fn pending(&self) -> usize {
        self.inner.lock().unwrap().timers.len()
    }

    /// Schedule `callback` to fire once `delay` has elapsed.
    pub fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerId {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = TimerId(inner.next_id);
        let deadline = inner.now + delay;
        inner.timers.push(Scheduled {
            id,
            deadline,
            callback,
        });
        id
    }

    /// Cancel a pending timer. Returns `false` if it already fired or was
    /// canceled.
    pub fn cancel(&self, id: TimerId) -> bool {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.timers.len();
        inner.timers.retain(|t| t.id != id);
        inner.timers.len() != before
    }

    /// Advance the clock by `dt`, firing every timer whose deadline falls
    /// inside the window. Timers scheduled by a firing callback run in the
    /// same pass when they land inside the window too.
    pub fn advance(&self, dt: Duration) {
        let target = {
            let inner = self.inner.lock().unwrap();
            inner.now + dt
        };
        loop {
            let next = {
                let mut inner = self.inner.lock().unwrap();
                let due = inner
                    .timers
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.deadline <= target)
                    .min_by_key(|(_, t)| (t.deadline, t.id.0))
                    .map(|(i, _)| i);
                match due {
                    Some(i) => {
                        let timer = inner.timers.swap_remove(i);
                        inner.now = inner.now.max(timer.deadline);
                        timer.callback
                    }
                    None => {
                        inner.now = target;
                        break;
                    }
                }
            };
            next();
        }
    }
}

/// Trailing-edge debouncer over a [`TimerQueue`].
///
/// Each [`call`](Self::call) cancels the previous pending timer and schedules
/// a new one, so a burst of calls collapses into a single callback fired
/// `delay` after the burst goes quiet.
pub struct Debouncer {
    queue: Arc<TimerQueue>,
    delay: Duration,
    pending: Arc<Mutex<Option<TimerId>>>,
}

impl std::fmt::Debug for Debouncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("delay", &self.delay)
            .field("pending", &self.is_pending())
            .finish()
    }
}

impl Debouncer {
    pub fn new(queue: Arc<TimerQueue>, delay: Duration) -> Self {
        Self {
            queue,
            delay,
            pending: Arc::new(Mutex::new(None)),
        }
    }

    /// Reset the quiescence window and arrange for `callback` to fire once it
    /// elapses without another call.
    pub fn call(&self, callback: TimerCallback) {
        let mut pending = self.pending.lock().unwrap();
        if let Some(id) = pending.take() {
            self.queue.cancel(id);
        }
        let slot = Arc::clone(&self.pending);
        let id = self.queue.schedule(
            self.delay,
            Arc::new(move || {
                *slot.lock().unwrap() = None;
                callback();
            }),
        );
        *pending = Some(id);
    }

    /// Drop any pending invocation. Returns `true` if one was canceled.
    pub fn cancel(&self) -> bool {
        let mut pending = self.pending.lock().unwrap();
        match pending.take() {
            Some(id) => self.queue.cancel(id),
            None => false,
        }
    }

    /// Whether an invocation is waiting on the quiescence window.
    pub fn is_pending(&self) -> bool {
        self.pending.lock().unwrap().is_some()
    }
}
