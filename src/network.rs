use crate::classify::{self, Tier};
use crate::metrics::{push_text, scoped};
use crate::rate::{rate, Rates, UndefinedRate};
use crate::storage::{RingBuffer, Sample, HISTORY_CAPACITY};
use crate::token::BarToken;
use tracing::debug;

/// Samples required before any rate is shown.
pub const WARMUP: usize = 3;

/// Baseline row of the sparkline; inbound grows up from it, outbound down.
const BASELINE: u8 = 8;

/// Sparkline column heights for one sample interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Column {
    pub rx_height: u8,
    pub tx_height: u8,
}

/// Everything the network metric needs to render one tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NetworkFrame {
    /// Latest rates in bytes per second, once warmed up and defined.
    pub current: Option<Rates>,
    /// Oldest to newest.
    pub columns: Vec<Column>,
}

/// Persistent counter history of one interface.
#[derive(Clone, Debug, Default)]
pub struct NetHistory {
    samples: RingBuffer<Sample, HISTORY_CAPACITY>,
}

impl NetHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    pub fn samples(&self) -> &RingBuffer<Sample, HISTORY_CAPACITY> {
        &self.samples
    }

    /// Rate between the two most recent samples, once warmed up.
    pub fn current_rate(&self) -> Option<Result<Rates, UndefinedRate>> {
        if self.samples.total_inserts() < WARMUP {
            return None;
        }
        let newer = self.samples.at(0)?;
        let older = self.samples.at(1)?;
        Some(rate(newer, older))
    }

    /// Rates of each retained interval past warm-up, oldest first.
    ///
    /// Intervals without a defined rate are left out.
    pub fn history(&self) -> Vec<Rates> {
        let total = self.samples.total_inserts();
        let start = (total + WARMUP).saturating_sub(HISTORY_CAPACITY).max(WARMUP);
        (start..total)
            .filter_map(|seq| {
                let newer = self.samples.by_sequence(seq)?;
                let older = self.samples.by_sequence(seq - 1)?;
                rate(newer, older).ok()
            })
            .collect()
    }

    pub fn frame(&self) -> NetworkFrame {
        let current = match self.current_rate() {
            Some(Ok(rates)) => Some(rates),
            Some(Err(reason)) => {
                debug!("Skipping current network rate: {}", reason);
                None
            }
            None => None,
        };
        let columns = self
            .history()
            .into_iter()
            .map(|r| Column {
                rx_height: classify::RX_HEIGHT.height(r.a),
                tx_height: classify::TX_HEIGHT.height(r.b),
            })
            .collect();
        NetworkFrame { current, columns }
    }
}

impl NetworkFrame {
    pub fn render(&self, out: &mut Vec<u8>) {
        if let Some(rates) = self.current {
            let rx = rates.a / 1024.0;
            let tx = rates.b / 1024.0;
            scoped(out, classify::RX_RATE.tier(rx), |o| push_text(o, &kib_rate(rx)));
            scoped(out, classify::TX_RATE.tier(tx), |o| push_text(o, &kib_rate(tx)));
        }
        for col in &self.columns {
            let rh = u32::from(col.rx_height);
            let th = u32::from(col.tx_height);
            BarToken::filled(0, u32::from(BASELINE) - rh, 1, rh, 0, Tier::Green).encode_into(out);
            BarToken::filled(0, u32::from(BASELINE) + 1, 1, th, 1, Tier::Red).encode_into(out);
        }
    }
}

fn kib_rate(kib: f64) -> String {
    if kib > 1024.0 {
        format!("{:.1}M", kib / 1024.0)
    } else {
        format!("{kib:.1}k")
    }
}
