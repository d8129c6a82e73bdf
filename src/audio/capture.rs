use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::Mutex;
use tracing::debug;

pub const PROBE_OK: &str = "Audio stream captured!";
pub const PROBE_FAILED: &str = "Failed to capture audio.";

const READ_BUFFER: usize = 16 * 1024;

/// A live capture yielding mono float samples.
#[async_trait::async_trait]
pub trait AudioSource: Send {
    /// Next block of samples; `None` once the stream has ended.
    async fn next_chunk(&mut self) -> Option<Vec<f32>>;

    /// Releases the underlying capture.
    fn stop(&mut self);
}

/// Something that can hand out a capture of the current audio, or refuse to.
#[async_trait::async_trait]
pub trait CaptureDevice: Send + Sync {
    async fn capture(&self) -> Option<Box<dyn AudioSource>>;
}

/// One-shot capture check that releases the stream right away.
pub async fn probe(device: &dyn CaptureDevice) -> &'static str {
    match device.capture().await {
        Some(mut source) => {
            source.stop();
            PROBE_OK
        }
        None => PROBE_FAILED,
    }
}

/// Raw little-endian f32 samples read from any async reader.
pub struct ReaderSource<R> {
    reader: Option<R>,
    leftover: Vec<u8>,
}

impl<R: AsyncRead + Unpin + Send> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: Some(reader),
            leftover: Vec::new(),
        }
    }
}

#[async_trait::async_trait]
impl<R: AsyncRead + Unpin + Send> AudioSource for ReaderSource<R> {
    async fn next_chunk(&mut self) -> Option<Vec<f32>> {
        let mut buffer = vec![0u8; READ_BUFFER];

        loop {
            let result = self.reader.as_mut()?.read(&mut buffer).await;
            let read = match result {
                Ok(0) | Err(_) => {
                    self.stop();
                    return None;
                }
                Ok(read) => read,
            };

            self.leftover.extend_from_slice(&buffer[..read]);
            let whole = self.leftover.len() / 4 * 4;
            if whole == 0 {
                continue;
            }

            let samples = self.leftover[..whole]
                .chunks_exact(4)
                .map(|bytes| f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
                .collect();
            self.leftover.drain(..whole);
            return Some(samples);
        }
    }

    fn stop(&mut self) {
        if self.reader.take().is_some() {
            debug!("Audio reader released");
        }
    }
}

/// Hands out a single reader-backed capture; later requests are refused.
pub struct ReaderCapture<R> {
    reader: Mutex<Option<R>>,
}

impl<R> ReaderCapture<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: Mutex::new(Some(reader)),
        }
    }
}

#[async_trait::async_trait]
impl<R: AsyncRead + Unpin + Send + 'static> CaptureDevice for ReaderCapture<R> {
    async fn capture(&self) -> Option<Box<dyn AudioSource>> {
        let reader = self.reader.lock().await.take()?;
        Some(Box::new(ReaderSource::new(reader)))
    }
}
