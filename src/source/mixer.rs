use crate::error::SourceError;
use crate::metrics::VolumeReading;
use std::process::Command;

const MIXER_PROGRAM: &str = "amixer";

/// Volume of the `Master` playback control of the default card.
pub fn volume() -> Result<VolumeReading, SourceError> {
    let output = Command::new(MIXER_PROGRAM)
        .args(["get", "Master"])
        .output()
        .map_err(|e| SourceError::Mixer(format!("{MIXER_PROGRAM}: {e}")))?;
    if !output.status.success() {
        return Err(SourceError::Mixer(format!(
            "{MIXER_PROGRAM} exited with {}",
            output.status
        )));
    }
    let text = String::from_utf8_lossy(&output.stdout);
    parse_amixer(&text).ok_or_else(|| SourceError::Mixer("no playback volume in output".into()))
}

/// Reads the first channel's `[NN%]` and `[on]`/`[off]` fields.
pub fn parse_amixer(text: &str) -> Option<VolumeReading> {
    let line = text
        .lines()
        .find(|l| l.contains("Playback") && l.contains('%'))?;
    let mut percent = None;
    let mut muted = false;
    for field in line.split('[').skip(1) {
        let value = field.split(']').next()?;
        if let Some(pct) = value.strip_suffix('%') {
            percent = pct.parse().ok();
        } else if value == "off" {
            muted = true;
        }
    }
    Some(VolumeReading {
        percent: percent?,
        muted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTPUT: &str = "\
Simple mixer control 'Master',0
  Capabilities: pvolume pswitch pswitch-joined
  Playback channels: Front Left - Front Right
  Limits: Playback 0 - 87
  Mono:
  Front Left: Playback 75 [86%] [-9.00dB] [on]
  Front Right: Playback 75 [86%] [-9.00dB] [on]
";

    #[test]
    fn reads_first_channel() {
        assert_eq!(
            parse_amixer(OUTPUT),
            Some(VolumeReading {
                percent: 86,
                muted: false
            })
        );
    }

    #[test]
    fn off_switch_means_muted() {
        let muted = OUTPUT.replace("[on]", "[off]");
        assert!(parse_amixer(&muted).unwrap().muted);
        assert_eq!(parse_amixer("Simple mixer control 'Master',0\n"), None);
    }
}
