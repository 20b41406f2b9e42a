//! Interactive tuning
//!
//! Steps the first pad through every note from the bottom of the range,
//! waiting for Enter between notes so each pitch can be checked by ear.
//! Typing `q` or closing input ends the run; the pad is silenced either way.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use pad_mux::{ChannelDriver, ChannelIndex};
use pad_protocol::{Note, NoteCommand, PulseDuration};
use tracing::warn;

const TUNE_CHANNEL: ChannelIndex = ChannelIndex(0);

/// Run the tuning loop; returns the number of notes played
///
/// The pad is stopped even when reading input or writing the prompt fails.
pub fn run<D, R, W>(driver: &mut D, input: R, out: W) -> Result<usize>
where
    D: ChannelDriver + ?Sized,
    R: BufRead,
    W: Write,
{
    let result = step_notes(driver, input, out);

    if let Err(e) = driver.play_note(TUNE_CHANNEL, NoteCommand::Stop, PulseDuration::Indefinite) {
        warn!("{}", e);
    }
    result
}

fn step_notes<D, R, W>(driver: &mut D, mut input: R, mut out: W) -> Result<usize>
where
    D: ChannelDriver + ?Sized,
    R: BufRead,
    W: Write,
{
    let mut played = 0;
    let mut line = String::new();

    for note in Note::all() {
        if let Err(e) = driver.play_note(TUNE_CHANNEL, NoteCommand::Play(note), PulseDuration::Indefinite) {
            warn!("{}", e);
        }
        played += 1;

        write!(
            out,
            "{} {} ({:.2} Hz), Enter for next, q to quit: ",
            note.as_u8(),
            note.name(),
            note.frequency()
        )
        .context("failed to write prompt")?;
        out.flush().context("failed to write prompt")?;

        line.clear();
        let read = input.read_line(&mut line).context("failed to read input")?;
        if read == 0 || line.trim().eq_ignore_ascii_case("q") {
            break;
        }
    }
    writeln!(out).context("failed to write prompt")?;
    Ok(played)
}
