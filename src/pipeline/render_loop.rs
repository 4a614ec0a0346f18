//! Re-entrancy guarded drain loop that feeds the display surface

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crossbeam::utils::CachePadded;
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tracing::{debug, trace, warn};

use crate::display::image::DisplayImage;
use crate::display::surface::DisplaySurface;
use crate::error::MailboxError;
use crate::pipeline::mailbox::{FrameMailbox, MailboxStats};

/// Consumer side of the pipeline.
///
/// Producers call [`submit`](Self::submit) from any thread; at most one drain
/// task runs on the consumer runtime at a time and always shows the newest
/// image in the mailbox.
pub struct RenderLoop<S> {
    shared: Arc<Shared<S>>,
    runtime: Handle,
}

impl<S> Clone for RenderLoop<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            runtime: self.runtime.clone(),
        }
    }
}

struct Shared<S> {
    surface: S,
    mailbox: FrameMailbox,
    /// True while a drain task owns the surface
    active: AtomicBool,
    idle: Notify,
    stats: CachePadded<LoopCounters>,
}

#[derive(Default)]
struct LoopCounters {
    presented: AtomicU64,
    present_failures: AtomicU64,
    drains_started: AtomicU64,
    wakeups_coalesced: AtomicU64,
}

/// Point-in-time render loop counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub mailbox: MailboxStats,
    pub presented: u64,
    pub present_failures: u64,
    pub drains_started: u64,
    /// Wake-ups that found a drain already running
    pub wakeups_coalesced: u64,
}

impl<S: DisplaySurface> RenderLoop<S> {
    /// Drain tasks are spawned on `runtime`, the consumer context.
    pub fn new(surface: S, runtime: Handle) -> Self {
        Self {
            shared: Arc::new(Shared {
                surface,
                mailbox: FrameMailbox::new(),
                active: AtomicBool::new(false),
                idle: Notify::new(),
                stats: CachePadded::new(LoopCounters::default()),
            }),
            runtime,
        }
    }

    pub fn surface(&self) -> &S {
        &self.shared.surface
    }

    pub fn mailbox(&self) -> &FrameMailbox {
        &self.shared.mailbox
    }

    /// Publish `image` and wake the consumer. Never blocks.
    pub fn submit(&self, image: DisplayImage) -> Result<(), MailboxError> {
        if let Some(stale) = self.shared.mailbox.publish(Arc::new(image))? {
            trace!(
                "Released undisplayed {}x{} frame",
                stale.width(),
                stale.height()
            );
            metrics::counter!("frames_replaced").increment(1);
        }
        self.wake();
        Ok(())
    }

    /// Start a drain task unless one is already running
    pub fn wake(&self) {
        if self.try_activate() {
            self.shared.stats.drains_started.fetch_add(1, Ordering::Relaxed);
            let shared = Arc::clone(&self.shared);
            self.runtime.spawn(drain(shared));
        } else {
            self.shared
                .stats
                .wakeups_coalesced
                .fetch_add(1, Ordering::Relaxed);
        }
    }

    fn try_activate(&self) -> bool {
        self.shared
            .active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn is_draining(&self) -> bool {
        self.shared.active.load(Ordering::Acquire)
    }

    /// Close the mailbox, release any pending image and wait for an
    /// in-flight present to finish. Producers must be stopped first.
    pub async fn shutdown(&self) {
        if self.shared.mailbox.close() {
            debug!("Released pending frame on shutdown");
        }

        loop {
            let idle = self.shared.idle.notified();
            tokio::pin!(idle);
            idle.as_mut().enable();
            if !self.is_draining() {
                break;
            }
            idle.await;
        }
    }

    pub fn stats(&self) -> RenderStats {
        let counters = &self.shared.stats;
        RenderStats {
            mailbox: self.shared.mailbox.stats(),
            presented: counters.presented.load(Ordering::Relaxed),
            present_failures: counters.present_failures.load(Ordering::Relaxed),
            drains_started: counters.drains_started.load(Ordering::Relaxed),
            wakeups_coalesced: counters.wakeups_coalesced.load(Ordering::Relaxed),
        }
    }
}

async fn drain<S: DisplaySurface>(shared: Arc<Shared<S>>) {
    loop {
        while let Some(image) = shared.mailbox.take_latest() {
            let start = Instant::now();
            match shared.surface.present(&image).await {
                Ok(()) => {
                    shared.stats.presented.fetch_add(1, Ordering::Relaxed);
                    metrics::counter!("frames_presented").increment(1);
                }
                Err(e) => {
                    shared.stats.present_failures.fetch_add(1, Ordering::Relaxed);
                    warn!("Present failed: {}", e);
                }
            }
            metrics::histogram!("present_time_us").record(start.elapsed().as_micros() as f64);
            drop(image);
        }

        shared.active.store(false, Ordering::Release);
        shared.idle.notify_waiters();

        // A publish between the last take and clearing the flag saw us as
        // active and did not spawn; pick its image up here.
        if shared.mailbox.is_empty()
            || shared
                .active
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
        {
            break;
        }
    }
}
