// Cancelable single-shot timers driven by the frame clock.
//
// Everything runs on the update thread: `advance` is called once per tick and
// returns whatever expired. A handle that was cancelled never fires, and the
// owner is expected to compare a fired handle against the one it still holds
// so late or superseded timers are no-ops.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

struct Pending<T> {
    handle: TimerHandle,
    deadline: Duration,
    payload: T,
}

pub struct DelayTimers<T> {
    now: Duration,
    next_id: u64,
    pending: Vec<Pending<T>>,
}

impl<T> Default for DelayTimers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DelayTimers<T> {
    pub fn new() -> Self {
        Self { now: Duration::ZERO, next_id: 0, pending: Vec::new() }
    }

    /// Current clock reading.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn schedule(&mut self, delay: Duration, payload: T) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending { handle, deadline: self.now.saturating_add(delay), payload });
        handle
    }

    /// Returns false if the handle already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.handle != handle);
        self.pending.len() != before
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|p| p.handle == handle)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Move the clock forward and drain every timer whose deadline is now due,
    /// earliest first. The clock saturates at `Duration::MAX`.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<(TimerHandle, T)> {
        self.now = self.now.saturating_add(elapsed);
        let now = self.now;

        let mut due = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].deadline <= now {
                due.push(self.pending.swap_remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by_key(|p| (p.deadline, p.handle.0));
        due.into_iter().map(|p| (p.handle, p.payload)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: fn(u64) -> Duration = Duration::from_millis;

    #[test]
    fn fires_exactly_at_deadline() {
        let mut timers = DelayTimers::new();
        let h = timers.schedule(MS(500), "panel");
        assert!(timers.advance(MS(499)).is_empty());
        let fired = timers.advance(MS(1));
        assert_eq!(fired, vec![(h, "panel")]);
        assert!(timers.is_empty());
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut timers = DelayTimers::new();
        let h = timers.schedule(MS(500), 1);
        timers.advance(MS(200));
        assert!(timers.cancel(h));
        assert!(!timers.cancel(h));
        assert!(timers.advance(MS(10_000)).is_empty());
    }

    #[test]
    fn handles_are_unique_across_reschedule() {
        let mut timers = DelayTimers::new();
        let a = timers.schedule(MS(10), ());
        timers.cancel(a);
        let b = timers.schedule(MS(10), ());
        assert_ne!(a, b);
        assert!(timers.is_pending(b));
    }

    #[test]
    fn large_step_drains_in_deadline_order() {
        let mut timers = DelayTimers::new();
        timers.schedule(MS(300), 'c');
        timers.schedule(MS(100), 'a');
        timers.schedule(MS(200), 'b');
        let order: Vec<char> = timers.advance(MS(1000)).into_iter().map(|(_, p)| p).collect();
        assert_eq!(order, vec!['a', 'b', 'c']);
        assert_eq!(timers.now(), MS(1000));
    }

    #[test]
    fn clock_saturates_instead_of_overflowing() {
        let mut timers = DelayTimers::new();
        timers.advance(MS(10));
        let h = timers.schedule(Duration::MAX, ());
        let fired = timers.advance(Duration::MAX);
        assert_eq!(timers.now(), Duration::MAX);
        assert_eq!(fired, vec![(h, ())]);
    }
}
