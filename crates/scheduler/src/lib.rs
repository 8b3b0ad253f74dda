//! Comic Reader Scheduler Library
//!
//! Zero-delay deferred tasks for the reader's control thread.
//!
//! The reader never blocks on more than one decode at a time: after a page
//! is shown or a container is opened, follow-up decoding is queued here and
//! drained one task per tick. Opening another container or deleting one
//! cancels everything queued for the superseded state.
//!
//! # Example
//!
//! ```
//! use comic_reader_scheduler::{DeferredQueue, DeferredTask};
//!
//! let mut queue = DeferredQueue::new();
//! queue.schedule(DeferredTask::WarmUp);
//! queue.schedule(DeferredTask::PrefetchNeighbors);
//!
//! // A new container was opened: drop everything queued for the old one.
//! queue.cancel_all();
//! assert!(queue.next().is_none());
//! ```

mod cancel;
mod deferred;

pub use cancel::CancellationToken;
pub use deferred::{DeferredQueue, DeferredTask, QueueStats, ScheduledTask, TaskId};
