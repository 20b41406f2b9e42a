//! Application settings
//!
//! Settings come from an optional JSON file; command line flags override
//! them. The result is resolved once at startup into a [`RunConfig`], and
//! anything invalid there is a fatal configuration error.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use pad_mux::{AllocationPolicy, ChannelLayout};
use pad_protocol::PulseDuration;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::args::Args;

/// Settings file contents
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Allocation policy for file playback
    pub logic: AllocationPolicy,
    /// Number of controllers to claim
    pub controllers: usize,
    /// Preferred live input port
    pub midi_input_port: Option<String>,
    /// Capacity of the note event channel
    pub event_buffer: usize,
    /// Note length in milliseconds; notes sound until released if unset
    pub pulse_ms: Option<u64>,
    /// Draw the channel status line
    pub show_status: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            logic: AllocationPolicy::SingleVoice,
            controllers: 1,
            midi_input_port: None,
            event_buffer: 1024,
            pulse_ms: None,
            show_status: true,
        }
    }
}

impl Settings {
    /// Default settings file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("padsynth").join("settings.json"))
    }

    /// Load settings
    ///
    /// An explicitly given file must exist. The default file is optional, but
    /// if it exists it must be valid.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => {
                    debug!("No settings file, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let json = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read settings from {}", path.display()))?;
        let settings = serde_json::from_str(&json)
            .with_context(|| format!("invalid settings file {}", path.display()))?;
        info!("Loaded settings from {}", path.display());
        Ok(settings)
    }
}

/// Where note events come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Play a MIDI file
    File(PathBuf),
    /// Listen on a live input port (first available if `None`)
    Live(Option<String>),
}

/// Fully resolved startup configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub policy: AllocationPolicy,
    pub layout: ChannelLayout,
    pub source: Source,
    pub event_buffer: usize,
    pub duration: PulseDuration,
    pub show_status: bool,
    pub simulate: bool,
}

impl RunConfig {
    /// Merge command line flags over settings
    pub fn resolve(args: &Args, settings: &Settings) -> Result<Self> {
        let mut policy = match &args.logic {
            Some(name) => name.parse::<AllocationPolicy>()?,
            None => settings.logic,
        };

        let controllers = args.controllers.unwrap_or(settings.controllers);
        let layout = ChannelLayout::new(controllers)?;

        let source = match &args.file {
            Some(path) => Source::File(path.clone()),
            None => Source::Live(
                args.midi_input_port
                    .clone()
                    .or_else(|| settings.midi_input_port.clone()),
            ),
        };

        if let Source::Live(_) = source {
            if policy == AllocationPolicy::SingleVoice {
                if args.logic.is_some() {
                    warn!("Live input always uses polyphony; ignoring --logic single_voice");
                } else {
                    debug!("Live input, switching to polyphony");
                }
                policy = AllocationPolicy::Polyphony;
            }
        }

        if settings.event_buffer == 0 {
            bail!("event_buffer must be at least 1");
        }

        let duration = match args.pulse_ms.or(settings.pulse_ms) {
            None => PulseDuration::Indefinite,
            Some(0) => bail!("pulse_ms must be at least 1"),
            Some(ms) => PulseDuration::Finite(Duration::from_millis(ms)),
        };

        Ok(Self {
            policy,
            layout,
            source,
            event_buffer: settings.event_buffer,
            duration,
            show_status: settings.show_status && !args.no_status,
            simulate: args.simulate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pad_mux::MuxError;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("padsynth").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = RunConfig::resolve(&args(&["-f", "song.mid"]), &Settings::default()).unwrap();

        assert_eq!(config.policy, AllocationPolicy::SingleVoice);
        assert_eq!(config.layout.controller_count(), 1);
        assert_eq!(config.source, Source::File(PathBuf::from("song.mid")));
        assert_eq!(config.duration, PulseDuration::Indefinite);
        assert!(config.show_status);
    }

    #[test]
    fn test_pulse_length() {
        let settings = Settings {
            pulse_ms: Some(250),
            ..Default::default()
        };
        let config = RunConfig::resolve(&args(&["-f", "a.mid"]), &settings).unwrap();
        assert_eq!(config.duration, PulseDuration::Finite(Duration::from_millis(250)));

        let config = RunConfig::resolve(&args(&["-f", "a.mid", "--pulse-ms", "40"]), &settings).unwrap();
        assert_eq!(config.duration, PulseDuration::Finite(Duration::from_millis(40)));

        assert!(RunConfig::resolve(&args(&["-f", "a.mid", "--pulse-ms", "0"]), &settings).is_err());
    }

    #[test]
    fn test_flags_override_settings() {
        let settings = Settings {
            logic: AllocationPolicy::Polyphony,
            controllers: 3,
            ..Default::default()
        };
        let config = RunConfig::resolve(
            &args(&["-f", "a.mid", "-l", "single_voice", "-c", "2", "--no-status"]),
            &settings,
        )
        .unwrap();

        assert_eq!(config.policy, AllocationPolicy::SingleVoice);
        assert_eq!(config.layout.total_channels(), 4);
        assert!(!config.show_status);
    }

    #[test]
    fn test_unknown_policy_is_fatal() {
        let err = RunConfig::resolve(&args(&["-f", "a.mid", "-l", "stealing"]), &Settings::default())
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<MuxError>(),
            Some(&MuxError::UnknownPolicy("stealing".to_string()))
        );
    }

    #[test]
    fn test_zero_controllers_is_fatal() {
        let err = RunConfig::resolve(&args(&["-f", "a.mid", "-c", "0"]), &Settings::default())
            .unwrap_err();
        assert_eq!(err.downcast_ref::<MuxError>(), Some(&MuxError::NoControllers));
    }

    #[test]
    fn test_live_mode_forces_polyphony() {
        let config = RunConfig::resolve(&args(&["-l", "single_voice"]), &Settings::default()).unwrap();
        assert_eq!(config.policy, AllocationPolicy::Polyphony);
        assert_eq!(config.source, Source::Live(None));

        let settings = Settings {
            midi_input_port: Some("Piano".into()),
            ..Default::default()
        };
        let config = RunConfig::resolve(&args(&[]), &settings).unwrap();
        assert_eq!(config.source, Source::Live(Some("Piano".into())));
        assert_eq!(config.policy, AllocationPolicy::Polyphony);
    }

    #[test]
    fn test_partial_settings_file() {
        let path = std::env::temp_dir().join(format!("padsynth-settings-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "logic": "polyphony", "controllers": 2 }"#).unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(settings.logic, AllocationPolicy::Polyphony);
        assert_eq!(settings.controllers, 2);
        assert_eq!(settings.event_buffer, Settings::default().event_buffer);
    }

    #[test]
    fn test_invalid_settings_file_is_fatal() {
        let path = std::env::temp_dir().join(format!("padsynth-bad-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "logic": "round_robin" }"#).unwrap();

        let result = Settings::load(Some(&path));
        std::fs::remove_file(&path).unwrap();
        assert!(result.is_err());

        assert!(Settings::load(Some(Path::new("/nonexistent/settings.json"))).is_err());
    }
}
