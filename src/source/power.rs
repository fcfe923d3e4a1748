use crate::error::SourceError;
use crate::metrics::BatteryReading;
use battery::units::energy::watt_hour;
use battery::units::power::watt;
use battery::State;
use std::path::Path;
use tracing::debug;

/// Sums every present battery; `None` when the machine has none.
pub fn battery(sys_root: &Path) -> Result<Option<BatteryReading>, SourceError> {
    let manager = battery::Manager::new()?;
    let mut reading: Option<BatteryReading> = None;
    let mut any_charging = false;
    for maybe_battery in manager.batteries()? {
        let bat = maybe_battery?;
        any_charging |= matches!(bat.state(), State::Charging | State::Full);
        let sum = reading.get_or_insert(BatteryReading {
            energy_now_wh: 0.0,
            energy_full_wh: 0.0,
            power_w: 0.0,
            ac_online: false,
        });
        sum.energy_now_wh += f64::from(bat.energy().get::<watt_hour>());
        sum.energy_full_wh += f64::from(bat.energy_full().get::<watt_hour>());
        sum.power_w += f64::from(bat.energy_rate().get::<watt>());
    }
    if let Some(sum) = reading.as_mut() {
        sum.ac_online = ac_online(sys_root).unwrap_or(any_charging);
    }
    Ok(reading)
}

/// The `AC/online` flag of the power supply class, if the adapter is exposed.
fn ac_online(sys_root: &Path) -> Option<bool> {
    let path = sys_root.join("class/power_supply/AC/online");
    match super::procfs::read(&path) {
        Ok(text) => Some(text.trim() == "1"),
        Err(e) => {
            debug!("No AC adapter flag: {}", e);
            None
        }
    }
}
