//! Prism demo: synthetic sensor stream through conversion, handoff and a headless display

use std::path::PathBuf;
use std::sync::Arc;

use color_eyre::{eyre::eyre, Result};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use prism::capture::SyntheticCapture;
use prism::decode::NullDecoder;
use prism::display::HeadlessSurface;
use prism::pipeline::{FrameRenderer, FrameSession};
use prism::transmit::{self, LogTransmitter};
use prism::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling and logging
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("prism=debug")),
        )
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .init();

    info!("Prism launching...");

    // Load configuration
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = Config::load(config_path.as_deref())?;
    prism::CONFIG.store(Arc::new(config.clone()));

    // Negotiate the stream format before opening anything downstream
    let mut capture = SyntheticCapture::new(config.capture.clone()).ok_or_else(|| {
        eyre!(
            "Cannot render {:?} source with native subtype {}",
            config.capture.kind,
            config.capture.subtype
        )
    })?;

    // Display and decode side
    let surface = HeadlessSurface::new(&config.display);
    let renderer = FrameRenderer::new(surface, Handle::current());
    let (tx, rx) = flume::bounded::<String>(config.pipeline.result_queue);
    let transmit_handle = transmit::spawn_worker(LogTransmitter, config.transmit.clone(), rx);
    let decoder = config.pipeline.decode.then_some(NullDecoder);
    let session = Arc::new(FrameSession::new(renderer, decoder, tx));

    // Spawn capture task
    let (stop_tx, mut stop_rx) = watch::channel(false);
    let max_frames = config.pipeline.max_frames;
    let capture_session = Arc::clone(&session);
    let capture_handle = tokio::spawn(async move {
        let mut captured = 0u64;
        loop {
            tokio::select! {
                _ = stop_rx.changed() => break,
                frame = capture.capture_frame() => {
                    capture_session.on_frame_arrived(Some(&frame.raw()));
                    captured += 1;
                    if max_frames.is_some_and(|max| captured >= max) {
                        break;
                    }
                }
            }
        }
        captured
    });

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                warn!("Failed to listen for ctrl-c: {}", e);
            }
            info!("Interrupted");
        }
        _ = wait_finished(&capture_handle) => {}
    }

    // Producer stops before the mailbox is torn down
    let _ = stop_tx.send(true);
    let captured = capture_handle.await?;
    session.shutdown().await;

    let surface = session.renderer().render_loop().surface();
    info!(
        "Captured {} frames, presented {}",
        captured,
        surface.presented()
    );

    // Dropping the session closes the result channel and ends the worker
    drop(session);
    let sent = transmit_handle.await?;
    info!("Transmitted {} results", sent);

    info!("Prism shutting down");
    Ok(())
}

async fn wait_finished<T>(handle: &tokio::task::JoinHandle<T>) {
    while !handle.is_finished() {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }
}
