//! Cooperative scheduling primitives for the pipeline.
//!
//! The engine is single-threaded and event-driven: long operations are
//! split into tasks drained one at a time from a [`TaskQueue`], yielding to
//! the host between tasks. Time-dependent behavior (processing indicator,
//! notice expiry) goes through the [`Clock`] trait so tests drive it with a
//! manual clock.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of the current instant.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Production clock.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Test clock advanced explicitly.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Cell::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.offset.get()
    }
}

impl<C: Clock> Clock for Rc<C> {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Point in time after which something fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    pub fn after(clock: &dyn Clock, delay: Duration) -> Self {
        Self {
            at: clock.now() + delay,
        }
    }

    pub fn expired(&self, clock: &dyn Clock) -> bool {
        clock.now() >= self.at
    }
}

/// FIFO queue of pending pipeline tasks. One task is executed per step;
/// everything still queued is a yield point the host can interleave with.
#[derive(Debug)]
pub struct TaskQueue<T> {
    tasks: std::collections::VecDeque<T>,
}

impl<T> TaskQueue<T> {
    pub fn new() -> Self {
        Self {
            tasks: std::collections::VecDeque::new(),
        }
    }

    pub fn push(&mut self, task: T) {
        self.tasks.push_back(task);
    }

    pub fn pop(&mut self) -> Option<T> {
        self.tasks.pop_front()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }
}

impl<T> Default for TaskQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
