//! # A/B Conversion Dashboard
//!
//! In the browser this mounts the interactive dashboard over the embedded
//! dataset. Natively it is a snapshot tool: apply view changes to the stored
//! preferences and write the chart as a PNG.

mod config;

#[cfg(not(target_arch = "wasm32"))]
mod cli;
#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
fn main() {
    web::start();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    use clap::Parser;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    match cli::run(cli::Cli::parse()) {
        Ok(_) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Snapshot failed");
            std::process::ExitCode::FAILURE
        }
    }
}
