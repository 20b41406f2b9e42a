//! Channel status line
//!
//! Renders what every pad is playing on a single stdout line that is
//! rewritten in place, e.g. `R1: C4  L1: OFF  R2: F#5  L2: OFF`. Logs go
//! to stderr so they do not tear the line.

use std::io::Write;

use pad_mux::{ChannelLayout, RouterEvent, RouterState};
use pad_protocol::NoteCommand;
use tokio::sync::mpsc;

/// Current per-channel display state
#[derive(Debug, Clone)]
pub struct StatusLine {
    layout: ChannelLayout,
    channels: Vec<NoteCommand>,
}

impl StatusLine {
    pub fn new(layout: ChannelLayout) -> Self {
        Self {
            layout,
            channels: vec![NoteCommand::Stop; layout.total_channels()],
        }
    }

    /// Apply an event; returns true if the line changed
    pub fn apply(&mut self, event: &RouterEvent) -> bool {
        let RouterEvent::ChannelChanged { channel, command } = event else {
            return false;
        };
        match self.channels.get_mut(channel.as_usize()) {
            Some(slot) if slot != command => {
                *slot = *command;
                true
            }
            _ => false,
        }
    }

    pub fn render(&self) -> String {
        self.layout
            .channels()
            .zip(&self.channels)
            .map(|(channel, command)| format!("{}: {:>3}", channel, command.label().trim_start()))
            .collect::<Vec<_>>()
            .join("  ")
    }
}

/// Draw the status line until the router drops its event sender
pub async fn run(mut events: mpsc::Receiver<RouterEvent>, layout: ChannelLayout, enabled: bool) {
    let mut line = StatusLine::new(layout);
    let mut drawn = false;

    while let Some(event) = events.recv().await {
        if !enabled || !event.is_display_update() {
            continue;
        }
        match event {
            RouterEvent::StateChanged { to: RouterState::Stopped, .. } => {
                if drawn {
                    println!();
                    drawn = false;
                }
            }
            event => {
                if line.apply(&event) {
                    let mut stdout = std::io::stdout().lock();
                    let _ = write!(stdout, "\r{}", line.render());
                    let _ = stdout.flush();
                    drawn = true;
                }
            }
        }
    }

    if drawn {
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pad_mux::ChannelIndex;
    use pad_protocol::Note;

    #[test]
    fn test_render_initial_line() {
        let line = StatusLine::new(ChannelLayout::new(2).unwrap());
        assert_eq!(line.render(), "R1: OFF  L1: OFF  R2: OFF  L2: OFF");
    }

    #[test]
    fn test_apply_channel_changes() {
        let mut line = StatusLine::new(ChannelLayout::default());

        let c4 = RouterEvent::ChannelChanged {
            channel: ChannelIndex(1),
            command: NoteCommand::Play(Note::new(60).unwrap()),
        };
        assert!(line.apply(&c4));
        assert!(!line.apply(&c4));
        assert_eq!(line.render(), "R1: OFF  L1:  C4");

        let sharp = RouterEvent::ChannelChanged {
            channel: ChannelIndex(0),
            command: NoteCommand::Play(Note::new(78).unwrap()),
        };
        line.apply(&sharp);
        assert_eq!(line.render(), "R1: F#5  L1:  C4");
    }

    #[test]
    fn test_ignores_other_events() {
        let mut line = StatusLine::new(ChannelLayout::default());
        assert!(!line.apply(&RouterEvent::StateChanged {
            from: RouterState::Idle,
            to: RouterState::Streaming,
        }));
        assert!(!line.apply(&RouterEvent::ChannelChanged {
            channel: ChannelIndex(5),
            command: NoteCommand::Stop,
        }));
    }

    #[tokio::test]
    async fn test_run_ends_when_router_is_gone() {
        let (tx, rx) = mpsc::channel(4);
        tx.send(RouterEvent::StateChanged {
            from: RouterState::Streaming,
            to: RouterState::Stopping,
        })
        .await
        .unwrap();
        drop(tx);

        run(rx, ChannelLayout::default(), false).await;
    }
}
