//! Deferred task queue
//!
//! Tasks run on the next scheduling tick, in FIFO order. Every task belongs
//! to a generation; [`DeferredQueue::cancel_all`] starts a new generation,
//! cancels the old token and drops whatever was still queued, so no task can
//! act on state that has since been replaced.

use crate::cancel::CancellationToken;
use std::collections::VecDeque;

/// Unique task identifier
pub type TaskId = u64;

/// Kinds of deferred work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeferredTask {
    /// Decode the window neighbours of the page that was just shown
    PrefetchNeighbors,

    /// Decode the first pages of a freshly opened container
    WarmUp,
}

/// A task handed out by [`DeferredQueue::next`]
#[derive(Debug, Clone)]
pub struct ScheduledTask {
    pub id: TaskId,
    pub task: DeferredTask,

    /// Generation the task was scheduled in
    pub generation: u64,

    /// Cancelled once the generation is superseded
    pub token: CancellationToken,
}

/// Queue statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Tasks accepted by `schedule` (coalesced duplicates excluded)
    pub scheduled: u64,

    /// Tasks handed out by `next`
    pub dispatched: u64,

    /// Queued tasks dropped by `cancel_all`
    pub cancelled: u64,

    /// `schedule` calls folded into an already queued identical task
    pub coalesced: u64,
}

/// Single-threaded, zero-delay, cancellable task queue
#[derive(Debug, Default)]
pub struct DeferredQueue {
    next_id: TaskId,
    generation: u64,
    token: CancellationToken,
    pending: VecDeque<(TaskId, DeferredTask)>,
    stats: QueueStats,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `task` for the next tick
    ///
    /// Scheduling a task that is already queued is a no-op returning the id
    /// of the queued one, so redundant scheduling is always safe.
    pub fn schedule(&mut self, task: DeferredTask) -> TaskId {
        if let Some((id, _)) = self.pending.iter().find(|(_, queued)| *queued == task) {
            self.stats.coalesced += 1;
            return *id;
        }

        self.next_id += 1;
        let id = self.next_id;
        self.pending.push_back((id, task));
        self.stats.scheduled += 1;
        tracing::trace!(id, ?task, generation = self.generation, "deferred task scheduled");
        id
    }

    /// Take the next task to run, if any
    pub fn next(&mut self) -> Option<ScheduledTask> {
        let (id, task) = self.pending.pop_front()?;
        self.stats.dispatched += 1;

        Some(ScheduledTask { id, task, generation: self.generation, token: self.token.clone() })
    }

    /// Cancel all queued and in-flight work and start a new generation
    ///
    /// # Returns
    ///
    /// The number of queued tasks that were dropped.
    pub fn cancel_all(&mut self) -> usize {
        self.token.cancel();
        self.token = CancellationToken::new();
        self.generation += 1;

        let dropped = self.pending.len();
        self.pending.clear();
        self.stats.cancelled += dropped as u64;

        if dropped > 0 {
            tracing::debug!(dropped, generation = self.generation, "deferred tasks cancelled");
        }
        dropped
    }

    /// Whether a task handed out earlier still belongs to the live generation
    pub fn is_current(&self, task: &ScheduledTask) -> bool {
        task.generation == self.generation && !task.token.is_cancelled()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn stats(&self) -> QueueStats {
        self.stats
    }
}
