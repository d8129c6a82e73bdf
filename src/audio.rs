//! Tab-audio capture streamed as 16-bit PCM to a transcription socket.

pub mod capture;
pub mod pcm;
pub mod stream;

pub use capture::{AudioSource, CaptureDevice, PROBE_FAILED, PROBE_OK, ReaderCapture, ReaderSource, probe};
pub use pcm::{PcmFramer, encode_pcm16, sample_to_pcm16};
pub use stream::{AudioError, Controls, SessionEnd, TranscriptUpdate, Transcriber};
