//! wavescope entry point.

mod app;
mod commands;
mod config;
mod logging;
mod monitor;
mod playback;
mod waveform;

#[tokio::main]
async fn main() {
    if let Err(e) = app::run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
