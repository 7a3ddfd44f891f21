//! Deferred work drained by the tick loop.
//!
//! A [`TaskList`] holds `(due, id, key)` entries ordered by deadline. Nothing
//! here sleeps or blocks: the owner advances its clock and calls
//! [`TaskList::drain_due`] once per tick. Every scheduled entry gets a
//! [`TaskId`] that can cancel it before it fires.

use std::collections::VecDeque;

/// Cancellation token for a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

#[derive(Debug, Clone)]
struct Scheduled<K> {
    due: f64,
    id: TaskId,
    key: K,
}

/// Deadline-ordered list of pending tasks.
#[derive(Debug, Clone)]
pub struct TaskList<K> {
    pending: VecDeque<Scheduled<K>>,
    next_id: u64,
}

impl<K> Default for TaskList<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> TaskList<K> {
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            next_id: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: VecDeque::with_capacity(capacity),
            next_id: 0,
        }
    }

    pub fn reserve(&mut self, additional: usize) {
        self.pending.reserve(additional);
    }

    /// Schedule `key` to fire once the clock reaches `due`.
    ///
    /// Tasks with equal deadlines fire in the order they were scheduled.
    pub fn schedule(&mut self, due: f64, key: K) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);

        // Deadlines are usually monotonic, so this is almost always a push_back.
        let at = self.pending.partition_point(|t| t.due <= due);
        self.pending.insert(at, Scheduled { due, id, key });
        id
    }

    /// Drop a pending task. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        match self.pending.iter().position(|t| t.id == id) {
            Some(index) => {
                self.pending.remove(index);
                true
            }
            None => false,
        }
    }

    /// Pop every task due at or before `now`, in deadline order.
    pub fn drain_due(&mut self, now: f64, mut fire: impl FnMut(K)) -> usize {
        let mut fired = 0;
        while self.pending.front().is_some_and(|t| t.due <= now) {
            if let Some(task) = self.pending.pop_front() {
                fire(task.key);
                fired += 1;
            }
        }
        fired
    }

    /// Deadline of the next task, if any.
    pub fn next_due(&self) -> Option<f64> {
        self.pending.front().map(|t| t.due)
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_in_deadline_order() {
        let mut tasks = TaskList::new();
        tasks.schedule(3.0, "c");
        tasks.schedule(1.0, "a");
        tasks.schedule(2.0, "b");

        let mut fired = Vec::new();
        assert_eq!(tasks.drain_due(2.0, |k| fired.push(k)), 2);
        assert_eq!(fired, vec!["a", "b"]);
        assert_eq!(tasks.next_due(), Some(3.0));

        tasks.drain_due(10.0, |k| fired.push(k));
        assert_eq!(fired, vec!["a", "b", "c"]);
        assert!(tasks.is_empty());
    }

    #[test]
    fn equal_deadlines_keep_insertion_order() {
        let mut tasks = TaskList::new();
        tasks.schedule(1.0, 1);
        tasks.schedule(1.0, 2);
        tasks.schedule(1.0, 3);

        let mut fired = Vec::new();
        tasks.drain_due(1.0, |k| fired.push(k));
        assert_eq!(fired, vec![1, 2, 3]);
    }

    #[test]
    fn nothing_fires_early() {
        let mut tasks = TaskList::new();
        tasks.schedule(0.5, ());
        assert_eq!(tasks.drain_due(0.49, |_| {}), 0);
        assert_eq!(tasks.len(), 1);
    }

    #[test]
    fn cancelled_task_never_fires() {
        let mut tasks = TaskList::new();
        let a = tasks.schedule(1.0, "a");
        tasks.schedule(1.0, "b");

        assert!(tasks.cancel(a));
        assert!(!tasks.cancel(a));

        let mut fired = Vec::new();
        tasks.drain_due(5.0, |k| fired.push(k));
        assert_eq!(fired, vec!["b"]);
    }

    #[test]
    fn clear_discards_everything() {
        let mut tasks = TaskList::with_capacity(4);
        let id = tasks.schedule(1.0, 7);
        tasks.schedule(2.0, 8);
        tasks.clear();
        assert!(tasks.is_empty());
        assert!(!tasks.cancel(id));
        assert_eq!(tasks.next_due(), None);
    }
}
