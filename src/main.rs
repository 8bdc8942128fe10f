//! Listen-only M17 reflector client.
//!
//! Registers with a reflector, answers its keepalive probes, and decodes
//! the voice streams it relays. `--display dashboard` draws a full-screen
//! field view; leave it with `q` or Ctrl-C.

use std::io;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use m17_listen::audio::{Codec2Vocoder, DiscardSink};
use m17_listen::client::FrameDispatcher;
use m17_listen::core::{AudioSink, Observer, SessionError};
use m17_listen::observer::{
    self, FieldPublisher, GraphicalObserver, NullObserver, TextObserver, spawn_key_listener,
};
use m17_listen::protocol::Callsign;
use m17_listen::{Session, SessionConfig};

/// Listen-only client for M17 voice reflectors.
#[derive(Parser)]
#[command(name = "m17-listen", version, about)]
struct Cli {
    /// Reflector address as host:port (e.g. relay.example.org:17000).
    reflector: String,

    /// Reflector module to listen to, a single character (e.g. A).
    /// Omitted from the listen request when not given.
    #[arg(value_parser = parse_module)]
    module: Option<u8>,

    /// Callsign to register with. A random listen-only callsign by default.
    #[arg(long)]
    callsign: Option<Callsign>,

    /// Presentation mode.
    #[arg(long, value_enum, default_value_t = DisplayMode::None)]
    display: DisplayMode,

    /// Decode voice frames but discard the audio instead of playing it.
    #[arg(long)]
    no_audio: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum DisplayMode {
    /// Log lines only.
    None,
    /// Print each field update to stdout.
    Text,
    /// Full-screen field dashboard.
    Dashboard,
}

/// Parse a module selector: exactly one ASCII character.
fn parse_module(s: &str) -> Result<u8, String> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => Ok(c as u8),
        _ => Err(format!("module must be a single ASCII character, got {s:?}")),
    }
}

fn build_observer(mode: DisplayMode) -> io::Result<Box<dyn Observer>> {
    Ok(match mode {
        DisplayMode::None => Box::new(NullObserver),
        DisplayMode::Text => Box::new(TextObserver),
        DisplayMode::Dashboard => Box::new(GraphicalObserver::new()?),
    })
}

#[cfg(feature = "playback")]
fn build_sink(no_audio: bool) -> Result<Box<dyn AudioSink>, SessionError> {
    if no_audio {
        return Ok(Box::new(DiscardSink::new()));
    }
    Ok(Box::new(m17_listen::audio::CpalSink::new()?))
}

#[cfg(not(feature = "playback"))]
fn build_sink(no_audio: bool) -> Result<Box<dyn AudioSink>, SessionError> {
    if !no_audio {
        info!("built without the playback feature, decoded audio is discarded");
    }
    Ok(Box::new(DiscardSink::new()))
}

/// Resolves on SIGINT, and on SIGTERM where the platform has it.
async fn termination_signal() -> io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let mut term = signal(SignalKind::terminate())?;
        tokio::select! {
            r = tokio::signal::ctrl_c() => r,
            _ = term.recv() => Ok(()),
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await
    }
}

/// Resolves when the dashboard asks to quit; parks forever without one.
async fn display_closed(close: &mut Option<mpsc::Receiver<()>>) {
    match close {
        Some(rx) => {
            let _ = rx.recv().await;
        }
        None => std::future::pending().await,
    }
}

async fn run_session(
    cli: &Cli,
    publisher: FieldPublisher,
    mut close: Option<mpsc::Receiver<()>>,
) -> Result<(), SessionError> {
    let callsign = match &cli.callsign {
        Some(c) => c.clone(),
        None => Callsign::random(),
    };
    let sink = build_sink(cli.no_audio)?;
    let dispatcher = FrameDispatcher::new(Box::new(Codec2Vocoder::new()), sink, publisher.clone());

    let mut config = SessionConfig::new(cli.reflector.clone(), callsign);
    config.module = cli.module;

    let (mut session, mut rejected) = Session::connect(config, dispatcher, publisher).await?;

    tokio::select! {
        r = termination_signal() => {
            r?;
            info!("termination signal received");
        }
        _ = display_closed(&mut close) => {
            info!("display closed");
        }
        r = &mut rejected => {
            if r.is_ok() {
                return Err(SessionError::Rejected);
            }
        }
    }

    session.shutdown().await;
    Ok(())
}

async fn run(cli: Cli) -> Result<(), SessionError> {
    let observer = build_observer(cli.display)?;
    let (publisher, updates) = observer::channel();
    let render = observer::spawn_render_task(updates, observer);

    let close = (cli.display == DisplayMode::Dashboard).then(spawn_key_listener);
    let result = run_session(&cli, publisher, close).await;

    // Every publisher clone is gone once the session is down; the render
    // task drains the channel and restores the terminal before any error
    // goes to stderr.
    let _ = render.await;
    result
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // The dashboard owns the terminal; log lines would tear it up.
    if cli.display != DisplayMode::Dashboard {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("m17-listen: {e}");
            ExitCode::FAILURE
        }
    }
}
