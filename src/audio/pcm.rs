/// Clips to [-1, 1], scales by `0x7FFF` and truncates toward zero. NaN encodes as silence.
pub fn sample_to_pcm16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

/// Little-endian 16-bit PCM bytes for a block of float samples.
pub fn encode_pcm16(samples: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        bytes.extend_from_slice(&sample_to_pcm16(sample).to_le_bytes());
    }
    bytes
}

/// Groups incoming samples into fixed-size encoded frames.
pub struct PcmFramer {
    frame_samples: usize,
    pending: Vec<f32>,
}

impl PcmFramer {
    pub fn new(frame_samples: usize) -> Self {
        let frame_samples = frame_samples.max(1);
        Self {
            frame_samples,
            pending: Vec::with_capacity(frame_samples),
        }
    }

    /// Every frame completed by `samples`; the remainder waits for the next call.
    pub fn push(&mut self, samples: &[f32]) -> Vec<Vec<u8>> {
        self.pending.extend_from_slice(samples);

        let complete = self.pending.len() / self.frame_samples;
        let frames: Vec<Vec<u8>> = self.pending.chunks_exact(self.frame_samples).take(complete).map(encode_pcm16).collect();
        self.pending.drain(..complete * self.frame_samples);
        frames
    }

    /// The trailing partial frame, if any.
    pub fn flush(&mut self) -> Option<Vec<u8>> {
        if self.pending.is_empty() {
            return None;
        }
        let frame = encode_pcm16(&self.pending);
        self.pending.clear();
        Some(frame)
    }
}
