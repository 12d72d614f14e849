//! Cooperative one-shot timeline
//!
//! Deferred actions share the frame clock: the owner advances time once per
//! frame and drains whatever has come due. Nothing runs on another thread,
//! so ordering is fixed by due time and then by scheduling order.

use std::time::Duration;

/// Handle to a scheduled action, used to cancel it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug)]
struct Pending<A> {
    id: u64,
    due: f64,
    action: A,
}

/// Owned table of pending one-shot actions
#[derive(Debug)]
pub struct Timeline<A> {
    /// Seconds since the timeline was created
    now: f64,
    next_id: u64,
    pending: Vec<Pending<A>>,
}

impl<A> Default for Timeline<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Timeline<A> {
    pub fn new() -> Self {
        Self {
            now: 0.0,
            next_id: 0,
            pending: Vec::new(),
        }
    }

    /// Current time on this timeline (seconds)
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Schedule `action` to come due `delay` from now
    pub fn schedule(&mut self, delay: Duration, action: A) -> TaskHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.pending.push(Pending {
            id,
            due: self.now + delay.as_secs_f64(),
            action,
        });
        TaskHandle(id)
    }

    /// Cancel a pending action. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        match self.pending.iter().position(|p| p.id == handle.0) {
            Some(i) => {
                self.pending.remove(i);
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.pending.iter().any(|p| p.id == handle.0)
    }

    /// Move the clock forward. Negative or non-finite steps are ignored.
    pub fn advance(&mut self, dt: f64) {
        if dt.is_finite() && dt > 0.0 {
            self.now += dt;
        }
    }

    /// Remove and return the earliest action that has come due
    pub fn pop_due(&mut self) -> Option<A> {
        let now = self.now;
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due <= now)
            .min_by(|(_, a), (_, b)| a.due.total_cmp(&b.due).then(a.id.cmp(&b.id)))
            .map(|(i, _)| i)?;
        Some(self.pending.remove(index).action)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop every pending action
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
