use serde::{Deserialize, Serialize};

/// Colour slot understood by the status bar; the discriminant is the wire byte.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Tier {
    #[default]
    Normal = 1,
    Selected = 2,
    Red = 3,
    Orange = 4,
    Yellow = 5,
    Blue = 6,
    Cyan = 7,
    Green = 8,
}

impl Tier {
    pub const fn byte(self) -> u8 {
        self as u8
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        Some(match byte {
            1 => Tier::Normal,
            2 => Tier::Selected,
            3 => Tier::Red,
            4 => Tier::Orange,
            5 => Tier::Yellow,
            6 => Tier::Blue,
            7 => Tier::Cyan,
            8 => Tier::Green,
            _ => return None,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Larger values are worse; a step matches when `value > threshold`.
    Rising,
    /// Smaller values are worse; a step matches when `value < threshold`.
    Falling,
}

/// Ordered threshold table, most severe step first.
#[derive(Clone, Copy, Debug)]
pub struct Ladder<'a> {
    pub direction: Direction,
    pub steps: &'a [(f64, Tier)],
    pub floor: Tier,
}

impl<'a> Ladder<'a> {
    pub const fn rising(steps: &'a [(f64, Tier)], floor: Tier) -> Self {
        Self {
            direction: Direction::Rising,
            steps,
            floor,
        }
    }

    pub const fn falling(steps: &'a [(f64, Tier)], floor: Tier) -> Self {
        Self {
            direction: Direction::Falling,
            steps,
            floor,
        }
    }

    /// First step whose threshold is strictly crossed, else the floor.
    pub fn tier(&self, value: f64) -> Tier {
        self.steps
            .iter()
            .find(|(threshold, _)| match self.direction {
                Direction::Rising => value > *threshold,
                Direction::Falling => value < *threshold,
            })
            .map(|(_, tier)| *tier)
            .unwrap_or(self.floor)
    }
}

/// Busy percentage of a CPU (user + system).
pub const CPU_BUSY: Ladder<'static> = Ladder::rising(
    &[
        (90.0, Tier::Red),
        (75.0, Tier::Orange),
        (50.0, Tier::Yellow),
        (10.0, Tier::Green),
    ],
    Tier::Blue,
);

/// `total / (free + cached)`; 10 means a tenth of memory is reclaimable.
pub const MEMORY_PRESSURE: Ladder<'static> = Ladder::rising(
    &[(10.0, Tier::Red), (5.0, Tier::Orange), (3.0, Tier::Yellow)],
    Tier::Green,
);

/// Degrees Celsius.
pub const TEMPERATURE: Ladder<'static> = Ladder::rising(
    &[(80.0, Tier::Red), (65.0, Tier::Orange), (50.0, Tier::Yellow)],
    Tier::Green,
);

/// Charge percent.
pub const BATTERY: Ladder<'static> = Ladder::falling(
    &[(10.0, Tier::Red), (20.0, Tier::Orange), (30.0, Tier::Yellow)],
    Tier::Cyan,
);

/// Inbound KiB/s.
pub const RX_RATE: Ladder<'static> = Ladder::rising(
    &[
        (4500.0, Tier::Red),
        (2000.0, Tier::Orange),
        (1000.0, Tier::Yellow),
        (100.0, Tier::Green),
    ],
    Tier::Blue,
);

/// Outbound KiB/s.
pub const TX_RATE: Ladder<'static> = Ladder::rising(
    &[
        (1000.0, Tier::Red),
        (500.0, Tier::Orange),
        (100.0, Tier::Yellow),
        (50.0, Tier::Green),
    ],
    Tier::Blue,
);

/// One-minute load average against the number of online CPUs.
pub fn load_tier(one_minute: f64, ncpu: usize) -> Tier {
    let n = ncpu as f64;
    let steps = [
        (2.0 * n, Tier::Red),
        (1.5 * n, Tier::Orange),
        (n, Tier::Yellow),
    ];
    Ladder::rising(&steps, Tier::Blue).tier(one_minute)
}

/// Linear piece of a [`HeightCurve`], used while `rate < below`.
#[derive(Clone, Copy, Debug)]
pub struct Segment {
    pub below: f64,
    pub base: f64,
    pub scale: f64,
    pub unit: f64,
}

/// Piecewise-linear mapping from a byte rate to a bar height in pixels.
#[derive(Clone, Copy, Debug)]
pub struct HeightCurve<'a> {
    pub segments: &'a [Segment],
    pub cap: u8,
}

impl HeightCurve<'_> {
    pub fn height(&self, rate: f64) -> u8 {
        let Some(segment) = self
            .segments
            .iter()
            .find(|s| rate < s.below)
            .or_else(|| self.segments.last())
        else {
            return 0;
        };
        let raw = segment.base + segment.scale * rate / segment.unit;
        // Truncate toward zero, then clamp into 0..=cap.
        raw.trunc().clamp(0.0, f64::from(self.cap)) as u8
    }
}

const KIB: f64 = 1024.0;
const MIB: f64 = 1024.0 * 1024.0;
/// 50 megabits per second in bytes.
const MAX_RX: f64 = (50u64 << 20) as f64 / 8.0;
/// 5 megabits per second in bytes.
const MAX_TX: f64 = (5u64 << 20) as f64 / 8.0;

pub const RX_HEIGHT: HeightCurve<'static> = HeightCurve {
    segments: &[
        Segment {
            below: 100.0 * KIB,
            base: 0.0,
            scale: 3.0,
            unit: 100.0 * KIB,
        },
        Segment {
            below: MIB,
            base: 3.0,
            scale: 3.0,
            unit: MIB,
        },
        Segment {
            below: f64::INFINITY,
            base: 6.0,
            scale: 2.0,
            unit: MAX_RX,
        },
    ],
    cap: 8,
};

pub const TX_HEIGHT: HeightCurve<'static> = HeightCurve {
    segments: &[
        Segment {
            below: 10.0 * KIB,
            base: 0.0,
            scale: 2.0,
            unit: 10.0 * KIB,
        },
        Segment {
            below: f64::INFINITY,
            base: 2.0,
            scale: 2.0,
            unit: MAX_TX,
        },
    ],
    cap: 4,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_falls_to_less_severe_tier() {
        assert_eq!(RX_RATE.tier(100.0), Tier::Blue);
        assert_eq!(RX_RATE.tier(100.0 + 1e-9), Tier::Green);
        assert_eq!(RX_RATE.tier(4500.0), Tier::Orange);
        assert_eq!(RX_RATE.tier(4500.1), Tier::Red);
        assert_eq!(BATTERY.tier(10.0), Tier::Orange);
        assert_eq!(BATTERY.tier(9.99), Tier::Red);
        assert_eq!(BATTERY.tier(30.0), Tier::Cyan);
    }

    #[test]
    fn slow_rate_gets_floor_tier() {
        let ladder = Ladder::rising(
            &[(1000.0, Tier::Red), (500.0, Tier::Orange), (100.0, Tier::Yellow)],
            Tier::Blue,
        );
        assert_eq!(ladder.tier(40.0), Tier::Blue);
        assert_eq!(ladder.tier(501.0), Tier::Orange);
    }

    #[test]
    fn memory_pressure_scenario() {
        // total 1000, free + cached 100: *10 is not below total, *5 is.
        assert_eq!(MEMORY_PRESSURE.tier(1000.0 / 100.0), Tier::Orange);
        assert_eq!(MEMORY_PRESSURE.tier(1000.0 / 0.0), Tier::Red);
        assert_eq!(MEMORY_PRESSURE.tier(1000.0 / 500.0), Tier::Green);
    }

    #[test]
    fn load_scales_with_cpu_count() {
        assert_eq!(load_tier(4.0, 4), Tier::Blue);
        assert_eq!(load_tier(4.1, 4), Tier::Yellow);
        assert_eq!(load_tier(6.5, 4), Tier::Orange);
        assert_eq!(load_tier(8.5, 4), Tier::Red);
    }

    #[test]
    fn inbound_height_follows_three_segments() {
        assert_eq!(RX_HEIGHT.height(0.0), 0);
        assert_eq!(RX_HEIGHT.height(50.0 * KIB), 1);
        assert_eq!(RX_HEIGHT.height(99.0 * KIB), 2);
        assert_eq!(RX_HEIGHT.height(100.0 * KIB), 3);
        assert_eq!(RX_HEIGHT.height(700.0 * KIB), 5);
        assert_eq!(RX_HEIGHT.height(MIB), 6);
        assert_eq!(RX_HEIGHT.height(MAX_RX / 2.0), 7);
        assert_eq!(RX_HEIGHT.height(MAX_RX * 10.0), 8);
    }

    #[test]
    fn outbound_height_is_capped_at_four() {
        assert_eq!(TX_HEIGHT.height(5.0 * KIB), 1);
        assert_eq!(TX_HEIGHT.height(10.0 * KIB), 2);
        assert_eq!(TX_HEIGHT.height(MAX_TX / 2.0), 3);
        assert_eq!(TX_HEIGHT.height(MAX_TX * 100.0), 4);
    }

    #[test]
    fn tier_bytes_round_trip() {
        for byte in 1..=8u8 {
            assert_eq!(Tier::from_byte(byte).map(Tier::byte), Some(byte));
        }
        assert_eq!(Tier::from_byte(0), None);
        assert_eq!(Tier::from_byte(9), None);
    }
}
