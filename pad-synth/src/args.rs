//! Command line interface

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "padsynth")]
#[command(about = "Play MIDI on the haptic pads of one or more Steam Controllers")]
#[command(version)]
pub struct Args {
    /// MIDI file to play; without one, the controllers act as a live synthesizer
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Voice allocation: single_voice (one pad per MIDI channel) or polyphony
    #[arg(short, long)]
    pub logic: Option<String>,

    /// Number of Steam Controllers to use
    #[arg(short, long)]
    pub controllers: Option<usize>,

    /// MIDI input port for live mode (default: first available)
    #[arg(short, long)]
    pub midi_input_port: Option<String>,

    /// Length of each note in milliseconds (default: until released)
    #[arg(long)]
    pub pulse_ms: Option<u64>,

    /// List MIDI input ports and exit
    #[arg(long)]
    pub list_ports: bool,

    /// Step the first pad through every note, pressing Enter between notes
    #[arg(long)]
    pub tune: bool,

    /// Use virtual controllers instead of USB hardware
    #[arg(long)]
    pub simulate: bool,

    /// Do not draw the channel status line
    #[arg(long)]
    pub no_status: bool,

    /// Settings file (default: <config dir>/padsynth/settings.json)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_short_flags() {
        let args = Args::try_parse_from([
            "padsynth", "-f", "song.mid", "-l", "polyphony", "-c", "2",
        ])
        .unwrap();

        assert_eq!(args.file, Some(PathBuf::from("song.mid")));
        assert_eq!(args.logic.as_deref(), Some("polyphony"));
        assert_eq!(args.controllers, Some(2));
        assert!(!args.simulate);
    }

    #[test]
    fn test_live_port_flag() {
        let args = Args::try_parse_from(["padsynth", "--midi-input-port", "Keystation 49"]).unwrap();
        assert_eq!(args.midi_input_port.as_deref(), Some("Keystation 49"));
        assert!(args.file.is_none());
    }
}
