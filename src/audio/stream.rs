use crate::audio::capture::{AudioSource, CaptureDevice};
use crate::audio::pcm::PcmFramer;
use crate::config::AudioConfig;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, error, info, warn};

pub const STATUS_STARTING: &str = "Starting transcription...";
pub const STATUS_TRANSCRIBING: &str = "Transcribing...";
pub const STATUS_STOPPED: &str = "Transcription stopped.";
pub const STATUS_SOCKET_ERROR: &str = "WebSocket error.";
pub const STATUS_CAPTURE_FAILED: &str = "Audio capture failed.";

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("Audio capture failed")]
    CaptureFailed,
    #[error("Transcription socket error: {0}")]
    Socket(String),
}

/// State of the start/stop triggers and the status line.
#[derive(Debug, Clone, PartialEq)]
pub struct Controls {
    pub start_enabled: bool,
    pub stop_enabled: bool,
    pub status: String,
}

impl Controls {
    fn idle(status: &str) -> Self {
        Self {
            start_enabled: true,
            stop_enabled: false,
            status: status.to_string(),
        }
    }

    fn running(status: &str) -> Self {
        Self {
            start_enabled: false,
            stop_enabled: true,
            status: status.to_string(),
        }
    }
}

impl Default for Controls {
    fn default() -> Self {
        Self::idle("")
    }
}

/// In-page event carrying one raw transcript message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "TRANSCRIPT_UPDATE")]
pub struct TranscriptUpdate {
    pub data: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Stopped,
    SourceEnded,
    SocketClosed,
}

/// Streams one capture to the transcription socket until either side goes away.
pub struct Transcriber {
    socket_url: String,
    frame_samples: usize,
    controls: watch::Sender<Controls>,
    updates: mpsc::UnboundedSender<TranscriptUpdate>,
}

impl Transcriber {
    pub fn new(config: &AudioConfig, updates: mpsc::UnboundedSender<TranscriptUpdate>) -> (Self, watch::Receiver<Controls>) {
        let (controls, receiver) = watch::channel(Controls::default());
        let transcriber = Self {
            socket_url: config.socket_url.clone(),
            frame_samples: config.frame_samples,
            controls,
            updates,
        };
        (transcriber, receiver)
    }

    /// Runs a session. Sending on `stop`, or dropping its sender, ends it.
    pub async fn run(&self, device: &dyn CaptureDevice, stop: oneshot::Receiver<()>) -> Result<SessionEnd, AudioError> {
        self.set_controls(Controls::running(STATUS_STARTING));

        let Some(mut source) = device.capture().await else {
            warn!("Audio capture refused");
            self.set_controls(Controls::idle(STATUS_CAPTURE_FAILED));
            return Err(AudioError::CaptureFailed);
        };

        let result = self.stream(source.as_mut(), stop).await;
        source.stop();

        match result {
            Ok(end) => {
                info!(end = ?end, "Transcription session ended");
                self.set_controls(Controls::idle(STATUS_STOPPED));
                Ok(end)
            }
            Err(e) => {
                error!(error = %e, "Transcription session failed");
                self.set_controls(Controls::idle(STATUS_SOCKET_ERROR));
                Err(e)
            }
        }
    }

    async fn stream(&self, source: &mut dyn AudioSource, mut stop: oneshot::Receiver<()>) -> Result<SessionEnd, AudioError> {
        let (socket, _) = connect_async(self.socket_url.as_str())
            .await
            .map_err(|e| AudioError::Socket(e.to_string()))?;
        let (mut sink, mut incoming) = socket.split();

        self.set_controls(Controls::running(STATUS_TRANSCRIBING));
        let mut framer = PcmFramer::new(self.frame_samples);

        let end = loop {
            tokio::select! {
                _ = &mut stop => break SessionEnd::Stopped,
                chunk = source.next_chunk() => {
                    let Some(samples) = chunk else {
                        if let Some(frame) = framer.flush() {
                            sink.send(WsMessage::Binary(frame.into())).await.map_err(|e| AudioError::Socket(e.to_string()))?;
                        }
                        break SessionEnd::SourceEnded;
                    };
                    for frame in framer.push(&samples) {
                        sink.send(WsMessage::Binary(frame.into())).await.map_err(|e| AudioError::Socket(e.to_string()))?;
                    }
                }
                message = incoming.next() => match message {
                    Some(Ok(WsMessage::Text(text))) => self.on_text(&text),
                    Some(Ok(WsMessage::Close(_))) | None => break SessionEnd::SocketClosed,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(AudioError::Socket(e.to_string())),
                },
            }
        };

        if end != SessionEnd::SocketClosed {
            // The peer may already be gone.
            let _ = sink.send(WsMessage::Close(None)).await;
        }

        Ok(end)
    }

    fn on_text(&self, raw: &str) {
        let transcript = match serde_json::from_str::<Value>(raw) {
            Ok(value) => value.get("transcript").and_then(Value::as_str).map(str::to_string),
            Err(e) => {
                warn!(error = %e, "Ignoring non-JSON socket message");
                return;
            }
        };

        let Some(transcript) = transcript.filter(|t| !t.is_empty()) else {
            debug!("Socket message without transcript");
            return;
        };

        self.set_controls(Controls::running(&transcript));
        // Nobody may be listening in-page.
        let _ = self.updates.send(TranscriptUpdate { data: raw.to_string() });
    }

    fn set_controls(&self, controls: Controls) {
        self.controls.send_replace(controls);
    }
}
