use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::capture::frame::RawFrame;
use crate::convert::converter::PixelConverter;
use crate::display::image::DisplayImage;
use crate::display::surface::DisplaySurface;
use crate::pipeline::render_loop::{RenderLoop, RenderStats};

/// Producer-side entry point: convert, hand off to the render loop, and keep
/// a copy for downstream consumers.
pub struct FrameRenderer<S> {
    converter: PixelConverter,
    render: RenderLoop<S>,
}

impl<S: DisplaySurface> FrameRenderer<S> {
    pub fn new(surface: S, runtime: Handle) -> Self {
        Self::with_converter(PixelConverter::default(), surface, runtime)
    }

    pub fn with_converter(converter: PixelConverter, surface: S, runtime: Handle) -> Self {
        Self {
            converter,
            render: RenderLoop::new(surface, runtime),
        }
    }

    /// Convert `frame` and queue it for display.
    ///
    /// Returns a copy of the converted image, or `None` when there was no
    /// frame or it could not be converted. Never blocks on the display.
    pub fn process_frame(&self, frame: Option<&RawFrame<'_>>) -> Option<DisplayImage> {
        let frame = frame?;
        let image = match self.converter.convert(frame) {
            Ok(image) => image,
            Err(e) => {
                warn!("Skipping frame: {}", e);
                metrics::counter!("frames_unsupported").increment(1);
                return None;
            }
        };
        metrics::counter!("frames_converted").increment(1);

        let copy = image.clone();
        if let Err(e) = self.render.submit(image) {
            debug!("Frame not queued: {}", e);
        }
        Some(copy)
    }

    pub fn render_loop(&self) -> &RenderLoop<S> {
        &self.render
    }

    pub fn stats(&self) -> RenderStats {
        self.render.stats()
    }

    /// Stop displaying. The producer must already have stopped.
    pub async fn shutdown(&self) {
        self.render.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::frame::{AlphaMode, FrameSource, PixelEncoding};
    use crate::display::headless::HeadlessSurface;
    use crate::DisplayConfig;
    use std::time::Duration;

    fn renderer() -> FrameRenderer<HeadlessSurface> {
        let surface = HeadlessSurface::new(&DisplayConfig {
            upload_latency_ms: 0,
        });
        FrameRenderer::new(surface, Handle::current())
    }

    async fn settle(renderer: &FrameRenderer<HeadlessSurface>) {
        for _ in 0..200 {
            if !renderer.render_loop().is_draining() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }

    #[tokio::test]
    async fn converted_frame_is_shown_and_copied() {
        let renderer = renderer();
        let data: Vec<u8> = (0..16).collect();
        let frame = RawFrame {
            width: 2,
            height: 2,
            stride: 8,
            encoding: PixelEncoding::Bgra8,
            source: FrameSource::Color {
                alpha: AlphaMode::Premultiplied,
            },
            data: &data,
        };

        let copy = renderer.process_frame(Some(&frame)).unwrap();
        assert_eq!(copy.to_packed(), data);

        settle(&renderer).await;
        assert_eq!(renderer.render_loop().surface().presented(), 1);
        assert_eq!(renderer.render_loop().surface().last_size(), Some((2, 2)));
    }

    #[tokio::test]
    async fn missing_or_unsupported_frames_produce_nothing() {
        let renderer = renderer();
        assert!(renderer.process_frame(None).is_none());

        let data = [0u8; 4];
        let frame = RawFrame {
            width: 2,
            height: 2,
            stride: 2,
            encoding: PixelEncoding::Gray8,
            source: FrameSource::Color {
                alpha: AlphaMode::Premultiplied,
            },
            data: &data,
        };
        assert!(renderer.process_frame(Some(&frame)).is_none());
        assert_eq!(renderer.stats().mailbox.published, 0);
    }

    #[tokio::test]
    async fn frames_after_shutdown_are_converted_but_not_queued() {
        let renderer = renderer();
        renderer.shutdown().await;

        let data = [0u8; 2];
        let frame = RawFrame {
            width: 2,
            height: 1,
            stride: 2,
            encoding: PixelEncoding::Gray8,
            source: FrameSource::Infrared,
            data: &data,
        };
        assert!(renderer.process_frame(Some(&frame)).is_some());
        assert_eq!(renderer.stats().mailbox.rejected, 1);
    }
}
