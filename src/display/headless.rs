//! Off-screen surface that simulates an asynchronous texture upload

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::debug;

use crate::display::image::DisplayImage;
use crate::display::surface::DisplaySurface;
use crate::error::DisplayError;
use crate::DisplayConfig;

/// Surface without a window. Each present sleeps for the configured upload
/// latency and records what was shown.
pub struct HeadlessSurface {
    upload_latency: Duration,
    presented: AtomicU64,
    last_size: AtomicU64,
}

impl HeadlessSurface {
    pub fn new(config: &DisplayConfig) -> Self {
        Self {
            upload_latency: Duration::from_millis(config.upload_latency_ms),
            presented: AtomicU64::new(0),
            last_size: AtomicU64::new(0),
        }
    }

    /// Number of images shown so far
    pub fn presented(&self) -> u64 {
        self.presented.load(Ordering::Relaxed)
    }

    /// Width and height of the most recent image
    pub fn last_size(&self) -> Option<(u32, u32)> {
        match self.last_size.load(Ordering::Relaxed) {
            0 => None,
            packed => Some(((packed >> 32) as u32, packed as u32)),
        }
    }
}

impl DisplaySurface for HeadlessSurface {
    async fn present(&self, image: &DisplayImage) -> Result<(), DisplayError> {
        tokio::time::sleep(self.upload_latency).await;

        let count = self.presented.fetch_add(1, Ordering::Relaxed) + 1;
        let size = (image.width() as u64) << 32 | image.height() as u64;
        self.last_size.store(size, Ordering::Relaxed);
        debug!(
            "Presented frame #{} ({}x{})",
            count,
            image.width(),
            image.height()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface() -> HeadlessSurface {
        HeadlessSurface::new(&DisplayConfig {
            upload_latency_ms: 1,
        })
    }

    #[tokio::test]
    async fn records_presented_frames() {
        let surface = surface();
        assert_eq!(surface.last_size(), None);

        surface.present(&DisplayImage::new(4, 3).unwrap()).await.unwrap();
        surface.present(&DisplayImage::new(8, 2).unwrap()).await.unwrap();

        assert_eq!(surface.presented(), 2);
        assert_eq!(surface.last_size(), Some((8, 2)));
    }
}
