//! Frame-arrived handling: render, decode, and forward decoded text

use flume::{Sender, TrySendError};
use tracing::{debug, info, instrument, warn};

use crate::capture::frame::RawFrame;
use crate::decode::FrameDecoder;
use crate::display::surface::DisplaySurface;
use crate::pipeline::renderer::FrameRenderer;

/// Glue between a capture source and everything downstream of it
pub struct FrameSession<S, D> {
    renderer: FrameRenderer<S>,
    decoder: Option<D>,
    results: Sender<String>,
}

impl<S: DisplaySurface, D: FrameDecoder> FrameSession<S, D> {
    /// `decoder` may be `None` to only display frames
    pub fn new(renderer: FrameRenderer<S>, decoder: Option<D>, results: Sender<String>) -> Self {
        Self {
            renderer,
            decoder,
            results,
        }
    }

    /// Handle one arrived frame on the producer context.
    ///
    /// Returns the decoded text, if any was found and forwarded.
    #[instrument(skip_all)]
    pub fn on_frame_arrived(&self, frame: Option<&RawFrame<'_>>) -> Option<String> {
        debug!("Acquiring");
        let image = self.renderer.process_frame(frame)?;
        let decoder = self.decoder.as_ref()?;

        debug!("Recognizing");
        let pixels = image.to_packed();
        let text = decoder
            .decode(&pixels, image.width(), image.height())
            .filter(|text| !text.is_empty());

        if let Some(text) = &text {
            info!("Sending {}", text);
            match self.results.try_send(text.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => warn!("Result queue full, dropping {}", text),
                Err(TrySendError::Disconnected(_)) => warn!("Transmit worker gone"),
            }
        }
        debug!("Done");
        text
    }

    pub fn renderer(&self) -> &FrameRenderer<S> {
        &self.renderer
    }

    /// Tear down the display side. Stop the capture producer first.
    pub async fn shutdown(&self) {
        self.renderer.shutdown().await;
        let stats = self.renderer.stats();
        info!(
            "Session closed: {} published, {} presented, {} replaced, {} rejected",
            stats.mailbox.published,
            stats.presented,
            stats.mailbox.replaced,
            stats.mailbox.rejected
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::frame::{FrameSource, PixelEncoding};
    use crate::decode::NullDecoder;
    use crate::display::headless::HeadlessSurface;
    use crate::DisplayConfig;
    use tokio::runtime::Handle;

    /// Reports the first packed byte, or nothing for black frames
    struct FirstByteDecoder;

    impl FrameDecoder for FirstByteDecoder {
        fn decode(&self, pixels: &[u8], width: u32, height: u32) -> Option<String> {
            assert_eq!(pixels.len(), (width * height * 4) as usize);
            match pixels.first() {
                Some(0) | None => None,
                Some(b) => Some(format!("code-{b}")),
            }
        }
    }

    fn renderer() -> FrameRenderer<HeadlessSurface> {
        FrameRenderer::new(
            HeadlessSurface::new(&DisplayConfig {
                upload_latency_ms: 0,
            }),
            Handle::current(),
        )
    }

    fn infrared(data: &[u8]) -> RawFrame<'_> {
        RawFrame {
            width: data.len() as u32,
            height: 1,
            stride: data.len(),
            encoding: PixelEncoding::Gray8,
            source: FrameSource::Infrared,
            data,
        }
    }

    #[tokio::test]
    async fn decoded_text_is_forwarded() {
        let (tx, rx) = flume::bounded(4);
        let session = FrameSession::new(renderer(), Some(FirstByteDecoder), tx);

        let text = session.on_frame_arrived(Some(&infrared(&[0, 128])));
        assert!(text.is_some());
        assert_eq!(rx.try_recv().ok(), text);
        session.shutdown().await;
    }

    #[tokio::test]
    async fn full_queue_drops_results_without_blocking() {
        let (tx, rx) = flume::bounded(1);
        let session = FrameSession::new(renderer(), Some(FirstByteDecoder), tx);

        let frame = infrared(&[0]);
        assert!(session.on_frame_arrived(Some(&frame)).is_some());
        assert!(session.on_frame_arrived(Some(&frame)).is_some());
        assert_eq!(rx.len(), 1);
        session.shutdown().await;
    }

    #[tokio::test]
    async fn without_decoder_frames_are_only_displayed() {
        let (tx, rx) = flume::bounded(1);
        let session: FrameSession<_, NullDecoder> = FrameSession::new(renderer(), None, tx);

        assert!(session.on_frame_arrived(Some(&infrared(&[9, 9]))).is_none());
        assert!(session.on_frame_arrived(None).is_none());
        assert!(rx.is_empty());
        assert_eq!(session.renderer().stats().mailbox.published, 1);
        session.shutdown().await;
    }
}
