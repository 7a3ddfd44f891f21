//! Fragment pool - reusable cut-off pieces with timed auto-return
//!
//! Every misaligned placement sheds a fragment. Fragments are purely cosmetic,
//! so they come from a pool instead of being allocated per placement:
//!
//! - [`FragmentPool::acquire`] hands out a free handle (FIFO reuse), growing
//!   the pool or refusing depending on [`ExhaustionPolicy`]
//! - every acquired handle is scheduled to come back after the configured
//!   lifetime; [`FragmentPool::tick`] drains those returns
//! - [`FragmentPool::release`] returns a handle early and cancels its timer
//!
//! A handle is never on the free list while it still has a pending return,
//! so two in-flight fragments can never share one.

use std::collections::VecDeque;

use crate::config::{ExhaustionPolicy, StackConfig};
use crate::schedule::{TaskId, TaskList};
use crate::types::{Extent, Point2};

/// Borrowed reference to a pooled fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FragmentHandle(u32);

impl FragmentHandle {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A pooled fragment's state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment {
    pub anchor: Point2,
    pub layer: i32,
    pub extent: Extent,
    /// Handed back as zero on every acquire; the renderer owns the fall.
    pub fall_speed: f32,
    pub active: bool,
    return_task: Option<TaskId>,
}

impl Default for Fragment {
    fn default() -> Self {
        Self {
            anchor: Point2::ORIGIN,
            layer: 0,
            extent: Extent::default(),
            fall_speed: 0.0,
            active: false,
            return_task: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FragmentPool {
    slots: Vec<Fragment>,
    free: VecDeque<FragmentHandle>,
    returns: TaskList<FragmentHandle>,
    policy: ExhaustionPolicy,
    expansion: usize,
    lifetime_secs: f64,
    clock_secs: f64,
}

impl FragmentPool {
    pub fn new(initial: usize, expansion: usize, policy: ExhaustionPolicy, lifetime_secs: f32) -> Self {
        let mut pool = Self {
            slots: Vec::new(),
            free: VecDeque::new(),
            returns: TaskList::new(),
            policy,
            expansion,
            lifetime_secs: lifetime_secs as f64,
            clock_secs: 0.0,
        };
        pool.expand(initial);
        pool
    }

    pub fn from_config(config: &StackConfig) -> Self {
        Self::new(
            config.pool_initial_size,
            config.pool_expansion_size,
            config.on_exhausted,
            config.fragment_lifetime_secs,
        )
    }

    fn expand(&mut self, count: usize) {
        let start = self.slots.len();
        self.slots.resize(start + count, Fragment::default());
        self.free.reserve(count);
        self.returns.reserve(count);
        for index in start..start + count {
            self.free.push_back(FragmentHandle(index as u32));
        }
    }

    /// Take a fragment out of the pool and schedule its return.
    ///
    /// Returns `None` only when the pool is exhausted and set to reject.
    pub fn acquire(&mut self, anchor: Point2, layer: i32, extent: Extent) -> Option<FragmentHandle> {
        if self.free.is_empty() {
            match self.policy {
                ExhaustionPolicy::Grow if self.expansion > 0 => {
                    self.expand(self.expansion);
                    log::debug!(
                        "fragment pool expanded by {}. New pool size: {}",
                        self.expansion,
                        self.slots.len()
                    );
                }
                _ => {
                    log::debug!(
                        "fragment pool exhausted ({} in flight); fragment dropped",
                        self.slots.len()
                    );
                    return None;
                }
            }
        }

        let handle = self.free.pop_front()?;
        let due = self.clock_secs + self.lifetime_secs;
        let task = self.returns.schedule(due, handle);

        let slot = &mut self.slots[handle.index()];
        debug_assert!(!slot.active, "free list held an active fragment");
        *slot = Fragment {
            anchor,
            layer,
            extent,
            fall_speed: 0.0,
            active: true,
            return_task: Some(task),
        };
        Some(handle)
    }

    /// Return a fragment before its lifetime ends.
    ///
    /// Returns false if the handle is unknown or already back in the pool.
    pub fn release(&mut self, handle: FragmentHandle) -> bool {
        let Some(slot) = self.slots.get_mut(handle.index()) else {
            return false;
        };
        if !slot.active {
            return false;
        }
        if let Some(task) = slot.return_task.take() {
            self.returns.cancel(task);
        }
        slot.active = false;
        self.free.push_back(handle);
        true
    }

    /// Advance the pool clock and return every fragment whose lifetime ran out.
    pub fn tick(&mut self, dt_secs: f32) -> usize {
        self.clock_secs += dt_secs as f64;

        let slots = &mut self.slots;
        let free = &mut self.free;
        self.returns.drain_due(self.clock_secs, |handle| {
            let slot = &mut slots[handle.index()];
            slot.active = false;
            slot.return_task = None;
            free.push_back(handle);
        })
    }

    /// Force every in-flight fragment back and drop their pending returns.
    pub fn reclaim_all(&mut self) -> usize {
        self.returns.clear();
        let mut reclaimed = 0;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.active {
                slot.active = false;
                slot.return_task = None;
                self.free.push_back(FragmentHandle(index as u32));
                reclaimed += 1;
            }
        }
        reclaimed
    }

    pub fn get(&self, handle: FragmentHandle) -> Option<&Fragment> {
        self.slots.get(handle.index())
    }

    pub fn is_active(&self, handle: FragmentHandle) -> bool {
        self.get(handle).is_some_and(|f| f.active)
    }

    pub fn active(&self) -> impl Iterator<Item = (FragmentHandle, &Fragment)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, f)| f.active)
            .map(|(i, f)| (FragmentHandle(i as u32), f))
    }

    pub fn active_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn pending_returns(&self) -> usize {
        self.returns.len()
    }
}
