//! Local playback through cpal.
//!
//! cpal uses a callback model: the OS audio subsystem invokes a closure on
//! a high-priority thread whenever it needs samples. This module bridges
//! that model to the blocking [`AudioSink`] interface with a bounded
//! channel; the callback drains queued blocks and emits silence when the
//! queue runs dry.

use std::collections::VecDeque;
use std::sync::mpsc::{Receiver, Sender, SyncSender, TrySendError, channel, sync_channel};
use std::thread;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{debug, error};

use crate::core::constants::{CHANNELS, SAMPLE_RATE};
use crate::core::error::AudioError;
use crate::core::traits::AudioSink;

/// Queue capacity in sample blocks. One block is 40 ms of speech, so the
/// queue absorbs a bit over a second of scheduling jitter.
const QUEUE_BLOCKS: usize = 32;

/// Plays sample blocks on the default output device at 8 kHz mono.
///
/// cpal streams are not `Send`, so the stream lives on a dedicated thread
/// and the sink feeds its callback through the channel. Dropping the sink
/// stops the thread and the stream with it.
pub struct CpalSink {
    tx: SyncSender<Vec<i16>>,
    _stop: Sender<()>,
}

impl CpalSink {
    /// Open the default output device.
    pub fn new() -> Result<Self, AudioError> {
        let (tx, rx) = sync_channel::<Vec<i16>>(QUEUE_BLOCKS);
        let (stop_tx, stop_rx) = channel::<()>();
        let (ready_tx, ready_rx) = channel::<Result<(), AudioError>>();

        thread::Builder::new()
            .name("audio-output".into())
            .spawn(move || {
                let stream = match build_stream(rx) {
                    Ok(stream) => stream,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                if let Err(e) = stream.play() {
                    let _ = ready_tx.send(Err(AudioError::Backend(format!(
                        "failed to start output stream: {e}"
                    ))));
                    return;
                }
                let _ = ready_tx.send(Ok(()));
                // Parked until the sink drops its stop handle.
                let _ = stop_rx.recv();
                debug!("audio output thread stopped");
            })
            .map_err(|e| AudioError::Backend(format!("failed to spawn audio thread: {e}")))?;

        ready_rx
            .recv()
            .map_err(|_| AudioError::Backend("audio thread died during startup".into()))??;

        Ok(CpalSink { tx, _stop: stop_tx })
    }
}

impl AudioSink for CpalSink {
    fn write(&mut self, samples: &[i16]) -> Result<(), AudioError> {
        match self.tx.try_send(samples.to_vec()) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(AudioError::Sink("playback queue full".into())),
            Err(TrySendError::Disconnected(_)) => {
                Err(AudioError::Sink("output stream closed".into()))
            }
        }
    }
}

fn build_stream(rx: Receiver<Vec<i16>>) -> Result<cpal::Stream, AudioError> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| AudioError::Backend("no default output device".into()))?;

    let config = cpal::StreamConfig {
        channels: CHANNELS,
        sample_rate: cpal::SampleRate(SAMPLE_RATE),
        buffer_size: cpal::BufferSize::Default,
    };

    let mut pending: VecDeque<i16> = VecDeque::new();
    device
        .build_output_stream(
            &config,
            move |data: &mut [i16], _info: &cpal::OutputCallbackInfo| {
                for slot in data.iter_mut() {
                    if pending.is_empty() {
                        if let Ok(block) = rx.try_recv() {
                            pending.extend(block);
                        }
                    }
                    // Silence when the queue runs dry.
                    *slot = pending.pop_front().unwrap_or(0);
                }
            },
            |err| {
                error!("output stream error: {err}");
            },
            None,
        )
        .map_err(|e| AudioError::Backend(format!("failed to build output stream: {e}")))
}
