//! padsynth
//!
//! Plays MIDI files, or live MIDI input, on the haptic pads of one or more
//! Steam Controllers. Each controller contributes two channels (its right
//! and left pads); notes are spread over them by the selected allocation
//! policy.

mod args;
mod driver;
mod settings;
mod status;
mod tune;

use anyhow::{Context, Result};
use clap::Parser;
use pad_midi::{input_port_names, spawn_playback, LiveInput, MidiFile};
use pad_mux::{AllocationPolicy, ChannelDriver, EventRouter, VoiceAllocator};
use pad_sim::VirtualControllerBank;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use args::Args;
use driver::UsbChannelDriver;
use settings::{RunConfig, Settings, Source};

type BoxedDriver = Box<dyn ChannelDriver + Send>;

/// A loaded note source
enum Input {
    File(MidiFile),
    Live(Option<String>),
}

#[tokio::main]
async fn main() {
    // Logs go to stderr; stdout carries the status line
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "padsynth=info,pad_protocol=info,pad_detect=info,pad_mux=info,pad_midi=info,pad_sim=info"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(Args::parse()).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    if args.list_ports {
        let ports = input_port_names().context("failed to list MIDI input ports")?;
        if ports.is_empty() {
            println!("No MIDI input ports");
        }
        for name in ports {
            println!("{}", name);
        }
        return Ok(());
    }

    let settings = Settings::load(args.config.as_deref())?;
    let config = RunConfig::resolve(&args, &settings)?;

    // Parse the file before touching any hardware
    let input = match &config.source {
        Source::File(path) => Input::File(
            MidiFile::load(path).with_context(|| format!("failed to load {}", path.display()))?,
        ),
        Source::Live(port) => Input::Live(port.clone()),
    };

    let driver: BoxedDriver = if config.simulate {
        Box::new(VirtualControllerBank::new(config.layout.controller_count()))
    } else {
        Box::new(UsbChannelDriver::claim(config.layout.controller_count())?)
    };

    if args.tune {
        return run_tuning(driver).await;
    }

    if let Input::File(file) = &input {
        check_fit(file, &config);
    }

    let (note_tx, note_rx) = mpsc::channel(config.event_buffer);
    let (event_tx, event_rx) = mpsc::channel(config.event_buffer);
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted");
            let _ = shutdown_tx.send(());
        }
    });

    let status = tokio::spawn(status::run(event_rx, config.layout, config.show_status));

    info!(
        "{} controller(s), {} channel(s), {}",
        config.layout.controller_count(),
        config.layout.total_channels(),
        config.policy
    );
    let mut router = EventRouter::new(VoiceAllocator::new(config.policy, config.layout), driver)
        .with_duration(config.duration)
        .with_events(event_tx);

    // The live connection must outlive the router run
    let (playback, _live) = match input {
        Input::File(file) => (Some(spawn_playback(file, note_tx)), None),
        Input::Live(port) => {
            let live = LiveInput::connect(port.as_deref(), note_tx)
                .context("failed to open MIDI input")?;
            info!("Listening on {}", live.port_name());
            (None, Some(live))
        }
    };

    let summary = router.run(note_rx, shutdown_rx).await;

    // Dropping the router closes the status channel
    drop(router);
    let _ = status.await;
    if let Some(playback) = playback {
        playback.abort();
    }

    if summary.failed_transfers > 0 {
        warn!("{} transfer(s) failed during the run", summary.failed_transfers);
    }
    Ok(())
}

/// Warn when a file needs more channels than are available
fn check_fit(file: &MidiFile, config: &RunConfig) {
    let channels = config.layout.total_channels();
    match config.policy {
        AllocationPolicy::SingleVoice => {
            if let Some(highest) = file.highest_channel() {
                if highest as usize >= channels {
                    warn!(
                        "File uses MIDI channels up to {} but only {} pad channel(s) are available; higher channels will be silent",
                        highest, channels
                    );
                }
            }
        }
        AllocationPolicy::Polyphony => {
            let peak = file.peak_polyphony();
            if peak > channels {
                warn!(
                    "File holds up to {} notes at once but only {} pad channel(s) are available; extra notes will be dropped",
                    peak, channels
                );
            }
        }
    }
}

async fn run_tuning(mut driver: BoxedDriver) -> Result<()> {
    let played = tokio::task::spawn_blocking(move || {
        let stdin = std::io::stdin();
        tune::run(&mut driver, stdin.lock(), std::io::stdout())
    })
    .await
    .context("tuning task failed")??;
    info!("Tuning finished after {} note(s)", played);
    Ok(())
}
