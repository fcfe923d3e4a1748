use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// Time between two status updates.
pub const TICK_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SinkKind {
    /// Set the X root window name
    Root,
    /// Raw status bytes, one line per tick
    Stdout,
    /// Colourised preview in the terminal
    Terminal,
    /// One JSON object per tick
    Json,
}

#[derive(Clone, Debug, Parser)]
#[command(name = "dwmstatus", about = "Status line for the dwm title bar")]
pub struct Config {
    /// Network interface whose throughput is graphed
    #[arg(long, default_value = "wlp3s0")]
    pub interface: String,

    /// Where rendered lines are published
    #[arg(long, value_enum, default_value_t = SinkKind::Root)]
    pub sink: SinkKind,

    /// Render a single line and exit
    #[arg(long, default_value_t = false)]
    pub once: bool,

    /// Number of thermal zones averaged for the temperature
    #[arg(long, default_value_t = 2)]
    pub thermal_zones: usize,

    /// Show the Master playback volume
    #[arg(long, default_value_t = false)]
    pub volume: bool,

    /// Skip the battery metric
    #[arg(long = "no-battery", action = ArgAction::SetFalse)]
    pub battery: bool,

    /// Skip the wireless metric
    #[arg(long = "no-wifi", action = ArgAction::SetFalse)]
    pub wifi: bool,

    /// Mount point of procfs
    #[arg(long, default_value = "/proc")]
    pub proc_root: PathBuf,

    /// Mount point of sysfs
    #[arg(long, default_value = "/sys")]
    pub sys_root: PathBuf,

    /// Directory of wpa_supplicant control sockets
    #[arg(long, default_value = "/run/wpa_supplicant")]
    pub wpa_dir: PathBuf,
}

impl Config {
    pub fn interval(&self) -> Duration {
        TICK_INTERVAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_a_laptop_setup() {
        let config = Config::parse_from(["dwmstatus"]);
        assert_eq!(config.interface, "wlp3s0");
        assert_eq!(config.sink, SinkKind::Root);
        assert!(config.battery);
        assert!(config.wifi);
        assert!(!config.volume);
        assert_eq!(config.interval(), Duration::from_secs(5));
    }

    #[test]
    fn switches_parse() {
        let config = Config::parse_from([
            "dwmstatus",
            "--interface",
            "eth0",
            "--sink",
            "json",
            "--no-battery",
            "--volume",
            "--once",
        ]);
        assert_eq!(config.interface, "eth0");
        assert_eq!(config.sink, SinkKind::Json);
        assert!(!config.battery);
        assert!(config.volume);
        assert!(config.once);
    }
}
