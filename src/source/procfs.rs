use crate::error::SourceError;
use crate::metrics::{CpuSnapshot, CpuTimes, LoadReading, MemoryReading};
use std::path::{Path, PathBuf};

pub(crate) fn read(path: &Path) -> Result<String, SourceError> {
    std::fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn malformed(path: &Path, what: &'static str) -> SourceError {
    SourceError::Malformed {
        path: path.to_path_buf(),
        what,
    }
}

/// `/proc/loadavg`: the three leading averages.
pub fn load(path: &Path) -> Result<LoadReading, SourceError> {
    let text = read(path)?;
    let mut fields = text.split_whitespace().map(str::parse::<f64>);
    let mut next = || {
        fields
            .next()
            .and_then(Result::ok)
            .ok_or_else(|| malformed(path, "load average"))
    };
    Ok(LoadReading {
        one: next()?,
        five: next()?,
        fifteen: next()?,
    })
}

/// `/proc/meminfo`: total, free, buffers and page cache.
pub fn memory(path: &Path) -> Result<MemoryReading, SourceError> {
    let text = read(path)?;
    parse_meminfo(&text).ok_or_else(|| malformed(path, "meminfo"))
}

fn parse_meminfo(text: &str) -> Option<MemoryReading> {
    let (mut total, mut free, mut buffers, mut cached) = (None, None, None, None);
    for line in text.lines() {
        let Some((key, rest)) = line.split_once(':') else {
            continue;
        };
        let slot = match key {
            "MemTotal" => &mut total,
            "MemFree" => &mut free,
            "Buffers" => &mut buffers,
            "Cached" => &mut cached,
            _ => continue,
        };
        *slot = rest.split_whitespace().next().and_then(|v| v.parse().ok());
    }
    Some(MemoryReading {
        total_kb: total?,
        free_kb: free?,
        buffers_kb: buffers?,
        cached_kb: cached?,
    })
}

/// `/proc/stat`: jiffies of the aggregate line and every core.
pub fn cpu(path: &Path) -> Result<CpuSnapshot, SourceError> {
    let text = read(path)?;
    let snapshot = parse_stat(&text);
    if snapshot.cpus.is_empty() {
        return Err(malformed(path, "cpu lines"));
    }
    Ok(snapshot)
}

fn parse_stat(text: &str) -> CpuSnapshot {
    let cpus = text
        .lines()
        .take_while(|line| line.starts_with("cpu"))
        .map(|line| {
            let mut times = CpuTimes::default();
            let columns = line
                .split_whitespace()
                .skip(1)
                .map_while(|v| v.parse::<u64>().ok());
            for (j, jiffies) in columns.enumerate() {
                match j {
                    0 | 1 => times.user += jiffies,
                    2 => times.system += jiffies,
                    4 => times.iowait += jiffies,
                    _ => {}
                }
                times.total += jiffies;
            }
            times
        })
        .collect();
    CpuSnapshot { cpus }
}

/// `/proc/net/dev`: cumulative received and transmitted bytes of `iface`.
pub fn net_counters(path: &Path, iface: &str) -> Result<(u64, u64), SourceError> {
    let text = read(path)?;
    parse_net_dev(&text, iface)
        .ok_or_else(|| SourceError::NoInterface(iface.to_string()))
}

fn parse_net_dev(text: &str, iface: &str) -> Option<(u64, u64)> {
    text.lines().find_map(|line| {
        let (name, rest) = line.split_once(':')?;
        if name.trim() != iface {
            return None;
        }
        let fields: Vec<u64> = rest
            .split_whitespace()
            .map_while(|v| v.parse().ok())
            .collect();
        Some((*fields.first()?, *fields.get(8)?))
    })
}

/// Mean of `zones` thermal zones, in degrees Celsius; `None` when no zone is configured.
pub fn temperature(sys_root: &Path, zones: usize) -> Result<Option<f64>, SourceError> {
    if zones == 0 {
        return Ok(None);
    }
    let mut sum = 0.0;
    for zone in 0..zones {
        let path = thermal_zone(sys_root, zone);
        let millis: f64 = read(&path)?
            .trim()
            .parse()
            .map_err(|_| malformed(&path, "temperature"))?;
        sum += millis / 1000.0;
    }
    Ok(Some(sum / zones as f64))
}

fn thermal_zone(sys_root: &Path, zone: usize) -> PathBuf {
    sys_root
        .join("class/thermal")
        .join(format!("thermal_zone{zone}"))
        .join("temp")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const STAT: &str = "\
cpu  100 20 30 400 50 6 7 0 0 0
cpu0 60 10 20 200 30 3 4 0 0 0
cpu1 40 10 10 200 20 3 3 0 0 0
intr 12345 0 0
ctxt 999
";

    const NET_DEV: &str = "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo: 9000      10    0    0    0     0          0         0     9000      10    0    0    0     0       0          0
wlp3s0: 123456   200    0    0    0     0          0         0    65432     150    0    0    0     0       0          0
";

    #[test]
    fn stat_splits_user_system_iowait() {
        let snap = parse_stat(STAT);
        assert_eq!(snap.cpus.len(), 3);
        assert_eq!(
            snap.cpus[0],
            CpuTimes {
                user: 120,
                system: 30,
                iowait: 50,
                total: 613,
            }
        );
        assert_eq!(snap.cpus[2].user, 50);
    }

    #[test]
    fn net_dev_picks_named_interface() {
        assert_eq!(parse_net_dev(NET_DEV, "wlp3s0"), Some((123456, 65432)));
        assert_eq!(parse_net_dev(NET_DEV, "lo"), Some((9000, 9000)));
        assert_eq!(parse_net_dev(NET_DEV, "eth0"), None);
    }

    #[test]
    fn meminfo_requires_all_four_fields() {
        let text = "MemTotal:       16000 kB\nMemFree:         2000 kB\nMemAvailable:    9000 kB\nBuffers:          500 kB\nCached:          4000 kB\nSwapCached:         0 kB\n";
        assert_eq!(
            parse_meminfo(text),
            Some(MemoryReading {
                total_kb: 16000,
                free_kb: 2000,
                buffers_kb: 500,
                cached_kb: 4000,
            })
        );
        assert_eq!(parse_meminfo("MemTotal: 1 kB\n"), None);
    }

    #[test]
    fn reads_fixture_files() {
        let dir = tempfile::tempdir().unwrap();
        let loadavg = dir.path().join("loadavg");
        fs::write(&loadavg, "0.52 1.50 2.25 2/467 12345\n").unwrap();
        let load = load(&loadavg).unwrap();
        assert_eq!((load.one, load.five, load.fifteen), (0.52, 1.5, 2.25));

        for (zone, millis) in [(0, "50000\n"), (1, "60000\n")] {
            let path = thermal_zone(dir.path(), zone);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, millis).unwrap();
        }
        assert_eq!(temperature(dir.path(), 2).unwrap(), Some(55.0));
        assert_eq!(temperature(dir.path(), 0).unwrap(), None);
        assert!(matches!(
            temperature(dir.path(), 3),
            Err(SourceError::Io { .. })
        ));
    }

    #[test]
    fn garbage_is_malformed_not_a_panic() {
        let dir = tempfile::tempdir().unwrap();
        let loadavg = dir.path().join("loadavg");
        fs::write(&loadavg, "not a number\n").unwrap();
        assert!(matches!(
            load(&loadavg),
            Err(SourceError::Malformed { .. })
        ));
        let stat = dir.path().join("stat");
        fs::write(&stat, "intr 1 2 3\n").unwrap();
        assert!(matches!(cpu(&stat), Err(SourceError::Malformed { .. })));
    }
}
