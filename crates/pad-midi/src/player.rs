//! Timed file playback
//!
//! Replays a file's events on a tokio task, sleeping until each event's
//! offset before sending it. Dropping the sender when the last event has been
//! sent is what tells the router the stream has ended.

use pad_protocol::NoteEvent;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use crate::file::{MidiFile, TimedNoteEvent};

/// Spawn a task that plays `file` into `tx`
///
/// The task resolves to the number of events delivered. It stops early if
/// the receiver is dropped.
pub fn spawn_playback(file: MidiFile, tx: mpsc::Sender<NoteEvent>) -> JoinHandle<usize> {
    tokio::spawn(play_events(file.into_events(), tx))
}

/// Send `events` into `tx` at their offsets from now
pub async fn play_events(events: Vec<TimedNoteEvent>, tx: mpsc::Sender<NoteEvent>) -> usize {
    let start = Instant::now();
    let total = events.len();
    info!("Playback started: {} event(s)", total);

    let mut sent = 0;
    for TimedNoteEvent { offset, event } in events {
        let Some(due) = start.checked_add(offset) else {
            warn!("Event at {:?} is beyond the timer range, ending playback", offset);
            return sent;
        };
        sleep_until(due).await;
        if tx.send(event).await.is_err() {
            debug!("Event receiver closed after {} of {} event(s)", sent, total);
            return sent;
        }
        sent += 1;
    }

    info!("Playback finished");
    sent
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn timed(ms: u64, event: NoteEvent) -> TimedNoteEvent {
        TimedNoteEvent {
            offset: Duration::from_millis(ms),
            event,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_arrive_on_schedule() {
        let (tx, mut rx) = mpsc::channel(8);
        let events = vec![
            timed(0, NoteEvent::note_on(0, 60, 100)),
            timed(250, NoteEvent::note_off(0, 60)),
            timed(1000, NoteEvent::note_on(1, 64, 100)),
        ];
        let task = tokio::spawn(play_events(events, tx));

        let start = Instant::now();
        let mut arrivals = Vec::new();
        while let Some(event) = rx.recv().await {
            arrivals.push((start.elapsed().as_millis(), event));
        }

        assert_eq!(
            arrivals,
            vec![
                (0, NoteEvent::note_on(0, 60, 100)),
                (250, NoteEvent::note_off(0, 60)),
                (1000, NoteEvent::note_on(1, 64, 100)),
            ]
        );
        // The channel closed because the sender was dropped
        assert_eq!(task.await.unwrap(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_when_receiver_dropped() {
        let (tx, mut rx) = mpsc::channel(1);
        let events = vec![
            timed(0, NoteEvent::note_on(0, 60, 100)),
            timed(10, NoteEvent::note_on(0, 62, 100)),
            timed(20, NoteEvent::note_on(0, 64, 100)),
        ];
        let task = tokio::spawn(play_events(events, tx));

        assert!(rx.recv().await.is_some());
        drop(rx);

        assert!(task.await.unwrap() < 3);
    }
}
