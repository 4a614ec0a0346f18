//! Lock-free single-slot mailbox between frame producer and render loop

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use crossbeam::utils::CachePadded;

use crate::display::image::DisplayImage;
use crate::error::MailboxError;

/// Holds at most one image; the newest publish always wins
pub struct FrameMailbox {
    /// The slot itself. Every operation is a single atomic exchange.
    slot: ArcSwapOption<DisplayImage>,

    /// Set once teardown begins
    closed: AtomicBool,

    /// Statistics
    stats: CachePadded<Stats>,
}

#[derive(Default)]
struct Stats {
    published: AtomicU64,
    delivered: AtomicU64,
    replaced: AtomicU64,
    rejected: AtomicU64,
}

/// Point-in-time mailbox counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MailboxStats {
    pub published: u64,
    pub delivered: u64,
    /// Images released without ever reaching the consumer
    pub replaced: u64,
    /// Publishes refused after close
    pub rejected: u64,
}

impl Default for FrameMailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameMailbox {
    pub fn new() -> Self {
        Self {
            slot: ArcSwapOption::empty(),
            closed: AtomicBool::new(false),
            stats: CachePadded::new(Stats::default()),
        }
    }

    /// Producer: swap `image` into the slot.
    ///
    /// Returns the image it displaced, which was never consumed; dropping it
    /// releases it. After [`close`](Self::close) the image is released and
    /// `MailboxError::Closed` returned.
    pub fn publish(
        &self,
        image: Arc<DisplayImage>,
    ) -> Result<Option<Arc<DisplayImage>>, MailboxError> {
        if self.closed.load(Ordering::Acquire) {
            self.stats.rejected.fetch_add(1, Ordering::Relaxed);
            return Err(MailboxError::Closed);
        }

        let previous = self.slot.swap(Some(image));
        self.stats.published.fetch_add(1, Ordering::Relaxed);
        if previous.is_some() {
            self.stats.replaced.fetch_add(1, Ordering::Relaxed);
        }

        // Lost the race with close(): pull our image back out
        if self.closed.load(Ordering::Acquire) {
            if self.slot.swap(None).is_some() {
                self.stats.rejected.fetch_add(1, Ordering::Relaxed);
            }
            return Err(MailboxError::Closed);
        }

        Ok(previous)
    }

    /// Consumer: keep emptying the slot until it reads empty and return the
    /// newest image seen. Older ones are released.
    pub fn take_latest(&self) -> Option<Arc<DisplayImage>> {
        let mut latest = None;
        while let Some(image) = self.slot.swap(None) {
            if latest.replace(image).is_some() {
                self.stats.replaced.fetch_add(1, Ordering::Relaxed);
            }
        }
        if latest.is_some() {
            self.stats.delivered.fetch_add(1, Ordering::Relaxed);
        }
        latest
    }

    pub fn is_empty(&self) -> bool {
        self.slot.load().is_none()
    }

    /// Begin teardown: refuse further publishes and release any pending image.
    ///
    /// Returns true if an undelivered image was released.
    pub fn close(&self) -> bool {
        self.closed.store(true, Ordering::Release);
        let released = self.slot.swap(None).is_some();
        if released {
            self.stats.replaced.fetch_add(1, Ordering::Relaxed);
        }
        released
    }

    pub fn stats(&self) -> MailboxStats {
        MailboxStats {
            published: self.stats.published.load(Ordering::Relaxed),
            delivered: self.stats.delivered.load(Ordering::Relaxed),
            replaced: self.stats.replaced.load(Ordering::Relaxed),
            rejected: self.stats.rejected.load(Ordering::Relaxed),
        }
    }
}
