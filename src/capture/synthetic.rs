//! Synthetic frame source standing in for a camera during demos and tests

use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::{BufMut, BytesMut};
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{info, instrument};

use crate::capture::format::{negotiate_encoding, FrameFormat};
use crate::capture::frame::{
    AlphaMode, DepthParams, FrameMetadata, FrameSource, PixelEncoding, SensorFrame, SensorKind,
};
use crate::CaptureConfig;

/// Rows are padded to this many bytes, like most capture drivers do
const ROW_ALIGNMENT: usize = 64;

/// Produces moving test patterns at the configured rate
pub struct SyntheticCapture {
    config: CaptureConfig,
    encoding: PixelEncoding,
    source: FrameSource,
    stride: usize,
    ticker: Interval,
    started: Instant,
    sequence: u64,
}

impl SyntheticCapture {
    /// Negotiate the stream encoding and start the frame clock.
    ///
    /// Returns `None` when the configured native format cannot be rendered,
    /// in which case the stream must not be opened.
    pub fn new(config: CaptureConfig) -> Option<Self> {
        let native = FrameFormat::new(
            config.subtype.clone(),
            config.width,
            config.height,
            config.fps,
        );
        let encoding = negotiate_encoding(config.kind, &native)?;
        let bytes_per_pixel = encoding.bytes_per_pixel()?;

        let source = match config.kind {
            SensorKind::Color => FrameSource::Color {
                alpha: AlphaMode::Straight,
            },
            SensorKind::Depth => FrameSource::Depth(DepthParams {
                scale: config.depth_scale,
                min_reliable: config.min_reliable_depth,
                max_reliable: config.max_reliable_depth,
            }),
            SensorKind::Infrared => FrameSource::Infrared,
        };

        let row_bytes = config.width as usize * bytes_per_pixel;
        let stride = row_bytes.div_ceil(ROW_ALIGNMENT) * ROW_ALIGNMENT;

        let mut ticker = interval(Duration::from_secs(1) / config.fps.max(1));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            "Synthetic {:?} source: {}x{} {} -> {:?}, stride {}",
            config.kind, config.width, config.height, native.subtype, encoding, stride
        );

        Some(Self {
            config,
            encoding,
            source,
            stride,
            ticker,
            started: Instant::now(),
            sequence: 0,
        })
    }

    pub fn encoding(&self) -> PixelEncoding {
        self.encoding
    }

    /// Wait for the next frame period and render a frame
    #[instrument(skip(self))]
    pub async fn capture_frame(&mut self) -> SensorFrame {
        self.ticker.tick().await;
        self.sequence += 1;
        self.render(self.sequence)
    }

    /// Render frame `sequence` without waiting on the frame clock
    pub fn render(&self, sequence: u64) -> SensorFrame {
        let width = self.config.width as usize;
        let height = self.config.height as usize;
        let mut data = BytesMut::zeroed(self.stride * height);

        for (y, row) in data.chunks_mut(self.stride.max(1)).enumerate() {
            let mut row = &mut row[..];
            for x in 0..width {
                // Pattern scrolls one pixel per frame
                let phase = (x + y + sequence as usize) % width.max(1);
                let t = phase as f32 / width.max(1) as f32;
                self.write_sample(&mut row, x, t);
            }
        }

        let timestamp = Instant::now();
        SensorFrame {
            data: data.freeze(),
            meta: Arc::new(FrameMetadata {
                sequence,
                width: self.config.width,
                height: self.config.height,
                stride: self.stride,
                encoding: self.encoding,
                source: self.source,
                device_timestamp: Some(timestamp.duration_since(self.started)),
            }),
            timestamp,
        }
    }

    fn write_sample(&self, row: &mut &mut [u8], x: usize, t: f32) {
        match self.source {
            FrameSource::Color { .. } => {
                let level = (t * 255.0) as u8;
                row.put_slice(&[level, 255 - level, (x % 256) as u8, 0xC0]);
            }
            FrameSource::Depth(params) => {
                // Every 16th column has no depth reading
                let raw = if x % 16 == 15 {
                    0
                } else {
                    let span = params.max_reliable.saturating_sub(params.min_reliable) as f32;
                    (params.min_reliable as f32 + t * span) as u16
                };
                row.put_u16_le(raw);
            }
            FrameSource::Infrared => match self.encoding {
                PixelEncoding::Gray16 => row.put_u16_le((t * u16::MAX as f32) as u16),
                _ => row.put_u8((t * u8::MAX as f32) as u8),
            },
        }
    }
}
