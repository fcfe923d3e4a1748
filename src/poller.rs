use crate::config::Config;
use crate::error::{SinkError, SourceError};
use crate::metrics::{CpuLoad, CpuSnapshot, Metric};
use crate::network::NetHistory;
use crate::sink::StatusSink;
use crate::source::Probe;
use crate::status::StatusLine;
use crate::storage::Sample;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

const DATETIME_FORMAT: &str = "%a %b %d %H:%M";

/// Which optional metrics appear on the line.
#[derive(Clone, Copy, Debug)]
pub struct PollerConfig {
    pub interval: Duration,
    pub battery: bool,
    pub wifi: bool,
    pub volume: bool,
}

impl PollerConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            interval: config.interval(),
            battery: config.battery,
            wifi: config.wifi,
            volume: config.volume,
        }
    }
}

/// State carried from one tick to the next.
#[derive(Clone, Debug, Default)]
pub struct TickState {
    pub net: NetHistory,
    pub prev_cpu: Option<CpuSnapshot>,
}

/// Samples every source and assembles the line for one tick.
pub fn collect(
    probe: &Probe,
    config: &PollerConfig,
    state: &mut TickState,
    now: Instant,
) -> StatusLine {
    let mut line = StatusLine::new();

    let ncpu = probe.ncpu();
    line.push_separated(or_placeholder(
        "load",
        probe.load().map(|reading| Metric::Load { reading, ncpu }),
    ));

    let cpu = probe.cpu().map(|snapshot| {
        let load = CpuLoad::between(state.prev_cpu.as_ref(), &snapshot);
        state.prev_cpu = Some(snapshot);
        Metric::Cpu(load)
    });
    line.push(or_placeholder("cpu", cpu));
    line.push(or_placeholder("mem", probe.memory().map(Metric::Memory)));

    let net = probe.net_counters().map(|(rx, tx)| {
        state.net.observe(Sample::new(now, rx, tx));
        Metric::Network(state.net.frame())
    });
    line.push_separated(or_placeholder("net", net));

    push_optional(
        &mut line,
        "temp",
        probe.temperature().map(|t| t.map(Metric::Temperature)),
    );

    if config.wifi {
        push_optional(&mut line, "wifi", probe.wifi().map(|w| w.map(Metric::Wifi)));
    }
    if config.battery {
        push_optional(
            &mut line,
            "bat",
            probe.battery().map(|b| b.map(|r| Metric::Battery(r.status()))),
        );
    }
    if config.volume {
        line.push_separated(or_placeholder("vol", probe.volume().map(Metric::Volume)));
    }

    line.push(Metric::Spacer);
    line.push(Metric::Datetime(
        chrono::Local::now().format(DATETIME_FORMAT).to_string(),
    ));
    line
}

fn or_placeholder(label: &'static str, result: Result<Metric, SourceError>) -> Metric {
    result.unwrap_or_else(|e| {
        warn!("{} unavailable: {}", label, e);
        Metric::Unavailable(label)
    })
}

/// Pushes a metric whose hardware may be absent; absence hides it entirely.
fn push_optional(
    line: &mut StatusLine,
    label: &'static str,
    result: Result<Option<Metric>, SourceError>,
) {
    match result {
        Ok(Some(metric)) => {
            line.push_separated(metric);
        }
        Ok(None) => debug!("No {} present", label),
        Err(e) => {
            warn!("{} unavailable: {}", label, e);
            line.push_separated(Metric::Unavailable(label));
        }
    }
}

pub struct Poller<S> {
    probe: Probe,
    config: PollerConfig,
    state: TickState,
    sink: S,
}

impl<S: StatusSink> Poller<S> {
    pub fn new(probe: Probe, config: PollerConfig, sink: S) -> Self {
        Self {
            probe,
            config,
            state: TickState::default(),
            sink,
        }
    }

    pub fn state(&self) -> &TickState {
        &self.state
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Samples, renders and publishes one line.
    pub fn tick(&mut self) -> Result<(), SinkError> {
        let line = collect(&self.probe, &self.config, &mut self.state, Instant::now()).render();
        self.sink.publish(&line)
    }

    pub async fn run(mut self, cancel: CancellationToken) {
        info!(
            "Poller started: interface={}, interval={:?}",
            self.probe.interface(),
            self.config.interval
        );

        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            // The first tick completes immediately.
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    break;
                }
                _ = ticker.tick() => {}
            }

            if let Err(e) = self.tick() {
                error!("Failed to publish status: {}", e);
            }
        }
        info!("Poller stopped");
    }
}
