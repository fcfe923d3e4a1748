pub mod mixer;
pub mod power;
pub mod procfs;
pub mod wifi;

use crate::config::Config;
use crate::error::SourceError;
use crate::metrics::{
    BatteryReading, CpuSnapshot, LoadReading, MemoryReading, VolumeReading, WifiReading,
};
use std::path::PathBuf;
use sysinfo::{CpuRefreshKind, RefreshKind, System};

/// Where the host's telemetry lives.
#[derive(Clone, Debug)]
pub struct Probe {
    proc_root: PathBuf,
    sys_root: PathBuf,
    wpa_dir: PathBuf,
    interface: String,
    thermal_zones: usize,
    ncpu: usize,
}

impl Probe {
    pub fn new(config: &Config) -> Self {
        Self {
            proc_root: config.proc_root.clone(),
            sys_root: config.sys_root.clone(),
            wpa_dir: config.wpa_dir.clone(),
            interface: config.interface.clone(),
            thermal_zones: config.thermal_zones,
            ncpu: online_cpus(),
        }
    }

    /// Overrides the detected CPU count used to scale load thresholds.
    pub fn with_ncpu(mut self, ncpu: usize) -> Self {
        self.ncpu = ncpu.max(1);
        self
    }

    pub fn ncpu(&self) -> usize {
        self.ncpu
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    pub fn load(&self) -> Result<LoadReading, SourceError> {
        procfs::load(&self.proc_root.join("loadavg"))
    }

    pub fn memory(&self) -> Result<MemoryReading, SourceError> {
        procfs::memory(&self.proc_root.join("meminfo"))
    }

    pub fn cpu(&self) -> Result<CpuSnapshot, SourceError> {
        procfs::cpu(&self.proc_root.join("stat"))
    }

    /// Cumulative (received, transmitted) bytes of the configured interface.
    pub fn net_counters(&self) -> Result<(u64, u64), SourceError> {
        procfs::net_counters(&self.proc_root.join("net/dev"), &self.interface)
    }

    pub fn temperature(&self) -> Result<Option<f64>, SourceError> {
        procfs::temperature(&self.sys_root, self.thermal_zones)
    }

    pub fn battery(&self) -> Result<Option<BatteryReading>, SourceError> {
        power::battery(&self.sys_root)
    }

    pub fn wifi(&self) -> Result<Option<WifiReading>, SourceError> {
        wifi::wifi(&self.wpa_dir)
    }

    pub fn volume(&self) -> Result<VolumeReading, SourceError> {
        mixer::volume()
    }
}

fn online_cpus() -> usize {
    let sys = System::new_with_specifics(
        RefreshKind::nothing().with_cpu(CpuRefreshKind::nothing()),
    );
    sys.cpus().len().max(1)
}
