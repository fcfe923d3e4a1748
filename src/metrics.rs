use crate::classify::{self, Tier};
use crate::network::NetworkFrame;
use crate::token::{BarToken, RESET};
use std::fmt::Write as _;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoadReading {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}

/// Values from `/proc/meminfo`, in kB.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemoryReading {
    pub total_kb: u64,
    pub free_kb: u64,
    pub buffers_kb: u64,
    pub cached_kb: u64,
}

impl MemoryReading {
    pub fn used_kb(&self) -> u64 {
        self.total_kb
            .saturating_sub(self.buffers_kb)
            .saturating_sub(self.cached_kb)
            .saturating_sub(self.free_kb)
    }

    /// Total memory over reclaimable memory; infinite when nothing is free.
    pub fn pressure(&self) -> f64 {
        let reclaimable = self.free_kb.saturating_add(self.cached_kb);
        self.total_kb as f64 / reclaimable as f64
    }
}

/// Cumulative jiffies of one `cpu` line in `/proc/stat`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CpuTimes {
    /// user + nice
    pub user: u64,
    pub system: u64,
    pub iowait: u64,
    /// Sum of every column.
    pub total: u64,
}

/// All `cpu` lines of `/proc/stat`; index 0 is the aggregate line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CpuSnapshot {
    pub cpus: Vec<CpuTimes>,
}

/// Whole-percent shares of one CPU over an interval.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CpuUsage {
    pub user: u32,
    pub system: u32,
    pub iowait: u32,
    /// user + system
    pub busy: u32,
}

impl CpuUsage {
    pub fn between(prev: &CpuTimes, cur: &CpuTimes) -> Self {
        let total = cur.total.saturating_sub(prev.total);
        let pct = |now: u64, then: u64| -> u32 {
            if total == 0 {
                return 0;
            }
            (100 * now.saturating_sub(then) / total).min(100) as u32
        };
        Self {
            user: pct(cur.user, prev.user),
            system: pct(cur.system, prev.system),
            iowait: pct(cur.iowait, prev.iowait),
            busy: pct(cur.user + cur.system, prev.user + prev.system),
        }
    }

    pub fn tier(&self) -> Tier {
        classify::CPU_BUSY.tier(f64::from(self.busy))
    }
}

/// Usage of the aggregate line and of every core.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CpuLoad {
    pub aggregate: CpuUsage,
    pub cores: Vec<CpuUsage>,
}

impl CpuLoad {
    /// Usage since `prev`; a missing previous snapshot counts from zero.
    pub fn between(prev: Option<&CpuSnapshot>, cur: &CpuSnapshot) -> Self {
        let zero = CpuTimes::default();
        let mut usages = cur.cpus.iter().enumerate().map(|(i, now)| {
            let then = prev.and_then(|p| p.cpus.get(i)).unwrap_or(&zero);
            CpuUsage::between(then, now)
        });
        let aggregate = usages.next().unwrap_or_default();
        Self {
            aggregate,
            cores: usages.collect(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BatteryReading {
    pub energy_now_wh: f64,
    pub energy_full_wh: f64,
    pub power_w: f64,
    pub ac_online: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChargeDirection {
    Full,
    Charging,
    Discharging,
}

impl ChargeDirection {
    fn symbol(self) -> char {
        match self {
            ChargeDirection::Full => '=',
            ChargeDirection::Charging => '+',
            ChargeDirection::Discharging => '-',
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatteryStatus {
    pub percent: u32,
    /// Minutes to full when charging, remaining when discharging.
    pub minutes: u32,
    pub direction: ChargeDirection,
}

impl BatteryReading {
    pub fn status(&self) -> BatteryStatus {
        let ratio = if self.energy_full_wh > 0.0 {
            100.0 * self.energy_now_wh / self.energy_full_wh
        } else {
            0.0
        };
        let percent = if 100.0 - ratio < 0.5 {
            100
        } else {
            ratio.max(0.0) as u32
        };
        let (direction, energy) = match (self.ac_online, percent) {
            (true, 100) => (ChargeDirection::Full, 0.0),
            (true, _) => (
                ChargeDirection::Charging,
                self.energy_full_wh - self.energy_now_wh,
            ),
            (false, _) => (ChargeDirection::Discharging, self.energy_now_wh),
        };
        let minutes = if self.power_w > 0.0 {
            (60.0 * energy / self.power_w).max(0.0) as u32
        } else {
            0
        };
        BatteryStatus {
            percent,
            minutes,
            direction,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WifiState {
    Off,
    Disconnected,
    Searching,
    Connecting,
    Connected,
}

impl WifiState {
    /// Maps a wpa_supplicant `wpa_state` value.
    pub fn from_wpa_state(state: &str) -> Self {
        match state {
            "COMPLETED" => WifiState::Connected,
            "DISCONNECTED" | "INACTIVE" => WifiState::Disconnected,
            "SCANNING" => WifiState::Searching,
            "INTERFACE_DISABLED" => WifiState::Off,
            _ => WifiState::Connecting,
        }
    }

    pub fn tier(self) -> Tier {
        match self {
            WifiState::Off => Tier::Red,
            WifiState::Disconnected => Tier::Orange,
            WifiState::Searching => Tier::Yellow,
            WifiState::Connecting => Tier::Green,
            WifiState::Connected => Tier::Blue,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WifiReading {
    pub state: WifiState,
    pub ssid: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VolumeReading {
    pub percent: u32,
    pub muted: bool,
}

/// One entry of the status line.
#[derive(Clone, Debug, PartialEq)]
pub enum Metric {
    Separator,
    Spacer,
    Load { reading: LoadReading, ncpu: usize },
    Cpu(CpuLoad),
    Memory(MemoryReading),
    Network(NetworkFrame),
    Temperature(f64),
    Battery(BatteryStatus),
    Wifi(WifiReading),
    Volume(VolumeReading),
    Datetime(String),
    /// Placeholder for a metric whose source could not be read this tick.
    Unavailable(&'static str),
}

impl Metric {
    /// Colour wrapped around the whole rendering by the status line.
    pub fn color(&self) -> Tier {
        match self {
            Metric::Load { reading, ncpu } => classify::load_tier(reading.one, *ncpu),
            Metric::Memory(m) => classify::MEMORY_PRESSURE.tier(m.pressure()),
            Metric::Temperature(celsius) => classify::TEMPERATURE.tier(*celsius),
            Metric::Battery(b) => classify::BATTERY.tier(f64::from(b.percent)),
            Metric::Wifi(w) => w.state.tier(),
            Metric::Unavailable(_) => Tier::Red,
            // These colour their own sub-ranges.
            Metric::Cpu(_) | Metric::Network(_) => Tier::Normal,
            Metric::Separator
            | Metric::Spacer
            | Metric::Volume(_)
            | Metric::Datetime(_) => Tier::Normal,
        }
    }

    /// Appends text and embedded bar tokens, without the outer colour.
    pub fn render(&self, out: &mut Vec<u8>) {
        match self {
            Metric::Separator => push_text(out, "::"),
            Metric::Spacer => push_text(out, " "),
            Metric::Load { reading, .. } => push_text(
                out,
                &format!("{:.2} {:.2} {:.2}", reading.one, reading.five, reading.fifteen),
            ),
            Metric::Cpu(load) => render_cpu(load, out),
            Metric::Memory(m) => render_memory(m, out),
            Metric::Network(frame) => frame.render(out),
            Metric::Temperature(celsius) => push_text(out, &format!("{celsius:.1}C")),
            Metric::Battery(b) => render_battery(b, out),
            Metric::Wifi(w) => match (w.state, w.ssid.is_empty()) {
                (WifiState::Off, _) => push_text(out, "wifi off"),
                (_, true) => push_text(out, "???"),
                (_, false) => push_text(out, &w.ssid),
            },
            Metric::Volume(v) if v.muted => push_text(out, "vol mute"),
            Metric::Volume(v) => push_text(out, &format!("vol {}", v.percent)),
            Metric::Datetime(s) => push_text(out, s),
            Metric::Unavailable(label) => push_text(out, &format!("{label}?")),
        }
    }
}

/// Appends `text`, replacing anything outside printable ASCII with `?`.
///
/// Keeps text from colliding with colour bytes and token markers.
pub fn push_text(out: &mut Vec<u8>, text: &str) {
    out.extend(text.chars().map(|c| {
        if c.is_ascii_graphic() || c == ' ' {
            c as u8
        } else {
            b'?'
        }
    }));
}

/// Runs `body` inside a colour escape unless `tier` is the default colour.
pub fn scoped(out: &mut Vec<u8>, tier: Tier, body: impl FnOnce(&mut Vec<u8>)) {
    if tier == Tier::Normal {
        body(out);
        return;
    }
    out.push(tier.byte());
    body(out);
    out.push(RESET);
}

fn render_cpu(load: &CpuLoad, out: &mut Vec<u8>) {
    let agg = load.aggregate;
    scoped(out, agg.tier(), |out| {
        push_text(
            out,
            &format!("{}% {}% {}%", agg.user, agg.system, agg.iowait),
        )
    });
    let last = load.cores.len().saturating_sub(1);
    for (i, core) in load.cores.iter().enumerate() {
        let i = i as u32;
        let skip = if i as usize == last { 41 } else { 0 };
        BarToken::filled(0, 2 + i * 3, 40 * core.busy / 100, 2, skip, core.tier()).encode_into(out);
    }
}

fn render_memory(m: &MemoryReading, out: &mut Vec<u8>) {
    let used = m.used_kb();
    let mut text = String::new();
    for (label, kb) in [("u", used), ("b", m.buffers_kb), ("c", m.cached_kb)] {
        let _ = write!(text, "{label} {} ", human_kb(kb));
    }
    push_text(out, &text);

    let share = |kb: u64| -> u32 {
        if m.total_kb == 0 {
            0
        } else {
            (100 * kb / m.total_kb) as u32
        }
    };
    let mut x = 0;
    for (kb, tier) in [
        (used, Tier::Green),
        (m.buffers_kb, Tier::Blue),
        (m.cached_kb, Tier::Orange),
    ] {
        let width = share(kb);
        BarToken::filled(x, 1, width, 12, 0, tier).encode_into(out);
        x += width;
    }
    BarToken::outline(0, 1, 100, 12, 101, Tier::Normal).encode_into(out);
}

fn human_kb(kb: u64) -> String {
    if kb > 1 << 20 {
        format!("{:.1}G", kb as f64 / 1024.0 / 1024.0)
    } else {
        format!("{:.1}M", kb as f64 / 1024.0)
    }
}

fn render_battery(b: &BatteryStatus, out: &mut Vec<u8>) {
    let mut text = format!("{}{}%", b.direction.symbol(), b.percent);
    if b.percent != 100 || b.direction == ChargeDirection::Discharging {
        let _ = write!(text, " {}:{:02}", b.minutes / 60, b.minutes % 60);
    }
    push_text(out, &text);
}

pub fn now_timestamp_ms() -> u128 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(dur) => dur.as_millis(),
        Err(err) => {
            tracing::error!("SystemTime before UNIX_EPOCH: {}", err);
            0
        }
    }
}
