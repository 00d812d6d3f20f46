// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Crashwise

//! Per-subscriber bounded mailbox.
//!
//! Writers never block on a slow subscriber: `push` is synchronous and
//! bounded. On overflow the oldest stats frame is dropped; crash frames are
//! never dropped, so a mailbox full of crashes may exceed its nominal
//! capacity rather than lose one.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::progress::ProgressEvent;

#[derive(Debug)]
struct Inner {
    queue: Mutex<VecDeque<ProgressEvent>>,
    notify: Notify,
    capacity: usize,
    closed: AtomicBool,
}

/// Cloneable handle; the store keeps one clone, the stream task the other.
#[derive(Debug, Clone)]
pub struct Mailbox {
    inner: Arc<Inner>,
}

impl Mailbox {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                queue: Mutex::new(VecDeque::new()),
                notify: Notify::new(),
                capacity: capacity.max(1),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Enqueue an event, evicting the oldest stats frame when full.
    pub fn push(&self, event: ProgressEvent) {
        {
            let mut queue = self.inner.queue.lock();
            if queue.len() >= self.inner.capacity {
                if let Some(pos) = queue.iter().position(|e| matches!(e, ProgressEvent::Stats(_)))
                {
                    let _ = queue.remove(pos);
                }
            }
            queue.push_back(event);
        }
        self.inner.notify.notify_one();
    }

    /// Next event in push order; `None` once closed and drained.
    pub async fn recv(&self) -> Option<ProgressEvent> {
        loop {
            {
                let mut queue = self.inner.queue.lock();
                if let Some(event) = queue.pop_front() {
                    return Some(event);
                }
                if self.inner.closed.load(Ordering::Acquire) {
                    return None;
                }
            }
            self.inner.notify.notified().await;
        }
    }

    /// Wake any waiting receiver and refuse further delivery attempts from
    /// being observed past the drain.
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::Release);
        self.inner.notify.notify_waiters();
        self.inner.notify.notify_one();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.inner.queue.lock().len()
    }
}

#[cfg(test)]
#[path = "mailbox_tests.rs"]
mod tests;
