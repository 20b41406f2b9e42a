//! Event router
//!
//! The long-lived loop between an event source and the channel driver. It
//! pulls events one at a time, lets the [`VoiceAllocator`] decide what each
//! one means, and issues the resulting commands before pulling the next.
//!
//! However the stream ends (the source closes, a `StopStream` event arrives,
//! the shutdown signal fires, or the router is dropped mid-stream) every
//! channel is sent a stop exactly once before the router reaches
//! [`RouterState::Stopped`].

use pad_protocol::{NoteEvent, PulseDuration};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, trace, warn};

use crate::allocator::{ChannelCommand, VoiceAllocator};
use crate::driver::ChannelDriver;
use crate::events::RouterEvent;
use crate::state::RouterState;

/// Why a router stopped streaming
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// The source closed (file exhausted, input port gone)
    SourceClosed,
    /// A `StopStream` event arrived
    StopStream,
    /// The shutdown signal fired
    Cancelled,
    /// The router was dropped while streaming
    Dropped,
}

/// Counters reported when a router finishes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouterSummary {
    /// Note events dispatched to the allocator
    pub events_handled: u64,
    /// Commands passed to the driver, including the final stop-all
    pub commands_issued: u64,
    /// Commands the driver failed to deliver
    pub failed_transfers: u64,
    /// Notes dropped for lack of a free voice
    pub notes_dropped: u64,
    /// Set once the router has stopped
    pub reason: Option<TerminationReason>,
}

/// Dispatches note events from a source to a channel driver
pub struct EventRouter<D: ChannelDriver> {
    allocator: VoiceAllocator,
    driver: D,
    state: RouterState,
    duration: PulseDuration,
    event_tx: Option<mpsc::Sender<RouterEvent>>,
    summary: RouterSummary,
}

impl<D: ChannelDriver> EventRouter<D> {
    /// Create an idle router
    pub fn new(allocator: VoiceAllocator, driver: D) -> Self {
        Self {
            allocator,
            driver,
            state: RouterState::Idle,
            duration: PulseDuration::Indefinite,
            event_tx: None,
            summary: RouterSummary::default(),
        }
    }

    /// Publish router events on `event_tx`
    ///
    /// Events are offered without waiting; if the receiver falls behind they
    /// are discarded rather than delaying output.
    pub fn with_events(mut self, event_tx: mpsc::Sender<RouterEvent>) -> Self {
        self.event_tx = Some(event_tx);
        self
    }

    /// Pulse length used for every note (indefinite by default)
    pub fn with_duration(mut self, duration: PulseDuration) -> Self {
        self.duration = duration;
        self
    }

    /// Current lifecycle state
    pub fn state(&self) -> RouterState {
        self.state
    }

    /// The allocator
    pub fn allocator(&self) -> &VoiceAllocator {
        &self.allocator
    }

    /// The driver
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Mutable access to the driver
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Counters so far
    pub fn summary(&self) -> &RouterSummary {
        &self.summary
    }

    /// Stream events from `source` until it ends or `shutdown_rx` fires
    ///
    /// The shutdown sender being dropped without sending does not cancel the
    /// stream. Returns immediately if the router has already run.
    pub async fn run(
        &mut self,
        mut source: mpsc::Receiver<NoteEvent>,
        mut shutdown_rx: oneshot::Receiver<()>,
    ) -> RouterSummary {
        if self.state != RouterState::Idle {
            warn!("Router already {}, not attaching a new source", self.state);
            return self.summary.clone();
        }

        info!("Event router starting ({})", self.allocator.policy());
        self.set_state(RouterState::Streaming);

        let mut shutdown_open = true;
        let reason = loop {
            tokio::select! {
                biased;

                result = &mut shutdown_rx, if shutdown_open => {
                    match result {
                        Ok(()) => break TerminationReason::Cancelled,
                        Err(_) => {
                            debug!("Shutdown sender dropped, streaming until the source ends");
                            shutdown_open = false;
                        }
                    }
                }

                event = source.recv() => {
                    match event {
                        Some(event) if event.is_stop_stream() => break TerminationReason::StopStream,
                        Some(event) => self.dispatch(event),
                        None => break TerminationReason::SourceClosed,
                    }
                }
            }
        };

        self.finish(reason);
        self.summary.clone()
    }

    /// Dispatch a single event outside of [`run`](Self::run)
    ///
    /// A `StopStream` event finishes the router. Events after it are ignored.
    pub fn handle_event(&mut self, event: NoteEvent) {
        if self.state.is_finishing() {
            debug!("Router {}, ignoring {:?}", self.state, event.kind);
            return;
        }
        if event.is_stop_stream() {
            self.finish(TerminationReason::StopStream);
            return;
        }
        self.dispatch(event);
    }

    /// Issue the stop-all and move to `Stopped`
    ///
    /// Only the first call has any effect.
    pub fn finish(&mut self, reason: TerminationReason) {
        if self.state.is_finishing() {
            return;
        }

        info!("Event stream ended ({:?}), silencing all channels", reason);
        self.set_state(RouterState::Stopping);

        let commands = self.allocator.stop_all();
        self.issue(commands);
        self.forward_allocator_events();

        self.summary.reason = Some(reason);
        self.set_state(RouterState::Stopped);

        info!(
            "Event router stopped: {} event(s), {} command(s), {} failed, {} dropped",
            self.summary.events_handled,
            self.summary.commands_issued,
            self.summary.failed_transfers,
            self.summary.notes_dropped
        );
    }

    fn dispatch(&mut self, event: NoteEvent) {
        // Every event re-enters Streaming
        self.set_state(RouterState::Streaming);

        trace!(
            "Event {:?} ch {} note {} vel {}",
            event.kind,
            event.channel,
            event.note,
            event.velocity
        );
        self.summary.events_handled += 1;

        let commands = self.allocator.handle(&event);
        self.issue(commands);
        self.forward_allocator_events();
    }

    fn issue(&mut self, commands: Vec<ChannelCommand>) {
        for ChannelCommand { channel, command } in commands {
            self.summary.commands_issued += 1;
            debug!("{} <- {}", channel, command.label().trim_start());

            if let Err(e) = self.driver.play_note(channel, command, self.duration) {
                self.summary.failed_transfers += 1;
                warn!("Failed to command {}: {}", channel, e);
                self.emit(RouterEvent::TransferFailed {
                    channel,
                    message: e.to_string(),
                });
            }
        }
    }

    fn forward_allocator_events(&mut self) {
        for event in self.allocator.drain_events() {
            if matches!(event, RouterEvent::NoteDropped { .. }) {
                self.summary.notes_dropped += 1;
            }
            self.emit(event);
        }
    }

    fn set_state(&mut self, to: RouterState) {
        let from = self.state;
        if from == to {
            return;
        }
        debug!("Router {} -> {}", from, to);
        self.state = to;
        self.emit(RouterEvent::StateChanged { from, to });
    }

    fn emit(&self, event: RouterEvent) {
        if let Some(tx) = &self.event_tx {
            if let Err(e) = tx.try_send(event) {
                trace!("Router event not delivered: {}", e);
            }
        }
    }
}

impl<D: ChannelDriver> Drop for EventRouter<D> {
    fn drop(&mut self) {
        if self.state == RouterState::Streaming {
            self.finish(TerminationReason::Dropped);
        }
    }
}
