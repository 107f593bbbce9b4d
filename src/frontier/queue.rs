//! Shared depth-tagged work queue
//!
//! Workers drain one queue of `(depth, url)` items. The queue tracks how many
//! items are currently being processed so a worker that observes emptiness can
//! tell "briefly empty while a peer is mid-page" apart from "crawl finished":
//! the run ends only when the queue is empty and nothing is in flight.

use std::collections::VecDeque;
use std::sync::Mutex;

/// A unit of crawl work: a page URL tagged with its discovery depth
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub depth: u32,
    pub url: String,
}

struct Inner {
    items: VecDeque<WorkItem>,
    in_flight: usize,
}

/// Mutex-guarded FIFO queue shared by all workers
pub struct WorkQueue {
    inner: Mutex<Inner>,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                items: VecDeque::new(),
                in_flight: 0,
            }),
        }
    }

    /// Enqueues a work item at the back of the queue
    pub fn push(&self, item: WorkItem) {
        let mut inner = self.inner.lock().unwrap();
        inner.items.push_back(item);
    }

    /// Dequeues the next item, counting it as in flight until `complete`
    pub fn pop(&self) -> Option<WorkItem> {
        let mut inner = self.inner.lock().unwrap();
        let item = inner.items.pop_front();
        if item.is_some() {
            inner.in_flight += 1;
        }
        item
    }

    /// Marks one previously popped item as finished
    pub fn complete(&self) {
        let mut inner = self.inner.lock().unwrap();
        debug_assert!(inner.in_flight > 0);
        inner.in_flight = inner.in_flight.saturating_sub(1);
    }

    /// True when the queue is empty and no popped item is still processing
    pub fn is_idle(&self) -> bool {
        let inner = self.inner.lock().unwrap();
        inner.items.is_empty() && inner.in_flight == 0
    }

    /// Number of queued (not yet popped) items
    pub fn pending(&self) -> usize {
        self.inner.lock().unwrap().items.len()
    }
}

impl Default for WorkQueue {
    fn default() -> Self {
        Self::new()
    }
}
