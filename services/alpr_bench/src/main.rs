mod cli;
mod configuration;

use alpr_bench_core::cancellation::CancellationToken;
use alpr_bench_core::driver::BenchDriver;
use alpr_bench_core::fetcher::{HttpTransport, VideoFetcher};
use alpr_bench_core::platform::Platform;
use alpr_bench_core::synthetic::SyntheticBackend;
use anyhow::Result;
use clap::Parser;
use log::{debug, info, warn};

use crate::cli::Cli;
use crate::configuration::{build_configuration, BenchSettings};

fn init_logging(quiet: bool) {
    let level = if quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_target(false)
        .init();
}

/// First interrupt stops the workers gracefully, a second one exits at once.
fn install_interrupt_handler(token: CancellationToken) -> Result<()> {
    ctrlc::set_handler(move || {
        if token.is_cancelled() {
            warn!("Second Ctrl+C received, exiting immediately");
            std::process::exit(130);
        }
        warn!("Ctrl+C received! Stopping after the current download or run...");
        token.cancel();
    })?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    info!("┌───────────────────────────────────────────────────────┐");
    info!("│                 ALPR Speed Benchmark                  │");
    info!("│ This program is licensed under the APACHE 2.0 license │");
    info!("│      For more information, see the LICENSE file       │");
    info!("└───────────────────────────────────────────────────────┘");
    info!("alpr_bench version: {}", alpr_bench_core::version());

    info!("Initializing...");
    let platform = Platform::detect()?;
    info!("\tOperating system: {}", platform.name());

    let settings = match &cli.settings {
        Some(path) => {
            info!("\tSettings: {}", path.display());
            BenchSettings::new(path)?
        }
        None => BenchSettings::default(),
    };
    debug!("Settings: {:?}", settings);

    let conf = build_configuration(&cli, &settings, platform)?;
    info!("\tRuntime data: {}", conf.runtime_data().display());
    info!("\tEngine configuration: {}", conf.engine_config().display());
    debug!("Configuration: {:?}", conf);

    let token = CancellationToken::new();
    install_interrupt_handler(token.clone())?;

    let fetcher = VideoFetcher::new(conf.endpoint(), conf.download_dir(), HttpTransport::new()?)
        .with_cancellation(token.clone());
    let videos = fetcher.ensure(conf.resolutions())?;

    let backend = SyntheticBackend::new(settings.synthetic())?;
    let json = cli.json;
    let mut driver = BenchDriver::new(backend, conf, token);
    let summary = driver.run(&videos, |report| {
        if !json {
            println!("{}", report);
        }
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    if summary.interrupted {
        info!("Benchmark interrupted after {} frames", summary.total_frames());
    }
    Ok(())
}
