use clap::Parser;
use dwmstatus::config::Config;
use dwmstatus::poller::{Poller, PollerConfig};
use dwmstatus::runtime;
use dwmstatus::sink;
use dwmstatus::source::Probe;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    runtime::init_tracing();
    let config = Config::parse();
    info!(
        "Starting dwmstatus: interface={}, sink={:?}, battery={}, wifi={}, volume={}",
        config.interface, config.sink, config.battery, config.wifi, config.volume
    );

    let probe = Probe::new(&config);
    let mut poller = Poller::new(
        probe,
        PollerConfig::from_config(&config),
        sink::from_kind(config.sink),
    );

    if config.once {
        if let Err(e) = poller.tick() {
            error!("Failed to publish status: {}", e);
            std::process::exit(1);
        }
        return;
    }

    let cancel = CancellationToken::new();
    let poller_cancel = cancel.clone();
    let poller_handle = tokio::spawn(async move { poller.run(poller_cancel).await });

    runtime::shutdown_signal().await;
    cancel.cancel();

    let _ = poller_handle.await;
}
