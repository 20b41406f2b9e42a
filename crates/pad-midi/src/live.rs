//! Live MIDI input
//!
//! Opens a MIDI input port with `midir` and forwards note messages into a
//! tokio channel. The port stays open for as long as the [`LiveInput`] is
//! alive.

use midir::{Ignore, MidiInput, MidiInputConnection, MidiInputPort};
use pad_protocol::NoteEvent;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::convert::decode_live;
use crate::error::MidiError;

const CLIENT_NAME: &str = "padsynth";

/// Names of the available MIDI input ports
pub fn input_port_names() -> Result<Vec<String>, MidiError> {
    let input = MidiInput::new(CLIENT_NAME)?;
    input
        .ports()
        .iter()
        .map(|port| input.port_name(port).map_err(MidiError::from))
        .collect()
}

/// An open live input port
pub struct LiveInput {
    port_name: String,
    _connection: MidiInputConnection<()>,
}

impl LiveInput {
    /// Connect to the port called `port`, or the first port if `None`
    ///
    /// Note messages are pushed into `tx` from midir's callback thread;
    /// messages that arrive while the channel is full are dropped.
    pub fn connect(port: Option<&str>, tx: mpsc::Sender<NoteEvent>) -> Result<Self, MidiError> {
        let mut input = MidiInput::new(CLIENT_NAME)?;
        input.ignore(Ignore::All);

        let (selected, port_name) = select_port(&input, port)?;
        info!("Listening on MIDI input '{}'", port_name);

        let connection = input.connect(
            &selected,
            "padsynth-input",
            move |_stamp, message, _| {
                let Some(event) = decode_live(message) else {
                    return;
                };
                if let Err(e) = tx.try_send(event) {
                    warn!("Dropping live event: {}", e);
                }
            },
            (),
        )?;

        Ok(Self {
            port_name,
            _connection: connection,
        })
    }

    /// Name of the connected port
    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

fn select_port(input: &MidiInput, wanted: Option<&str>) -> Result<(MidiInputPort, String), MidiError> {
    let mut available = Vec::new();
    for port in input.ports() {
        let name = input.port_name(&port)?;
        debug!("MIDI input port: {}", name);
        match wanted {
            None => return Ok((port, name)),
            Some(wanted) if wanted == name => return Ok((port, name)),
            Some(_) => available.push(name),
        }
    }

    match wanted {
        None => Err(MidiError::NoInputPorts),
        Some(name) if available.is_empty() => {
            warn!("Requested MIDI input '{}' but no ports exist", name);
            Err(MidiError::NoInputPorts)
        }
        Some(name) => Err(MidiError::PortNotFound {
            name: name.to_string(),
            available,
        }),
    }
}
