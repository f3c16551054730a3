/// Encoding of an audio chunk payload.
///
/// The numeric codes are the values carried on the backend ABI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioFormat {
    Pcm16,
    Alaw,
    Ulaw,
    Gsm,
    G722,
    G729,
    Opus,
    Unknown(u32),
}

impl AudioFormat {
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => Self::Pcm16,
            2 => Self::Alaw,
            3 => Self::Ulaw,
            4 => Self::Gsm,
            5 => Self::G722,
            6 => Self::G729,
            7 => Self::Opus,
            other => Self::Unknown(other),
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            Self::Pcm16 => 1,
            Self::Alaw => 2,
            Self::Ulaw => 3,
            Self::Gsm => 4,
            Self::G722 => 5,
            Self::G729 => 6,
            Self::Opus => 7,
            Self::Unknown(code) => *code,
        }
    }
}

/// A block of captured audio produced by the backend.
///
/// Chunks are handed around as `Arc<AudioChunk>` and never mutated after
/// creation, so the producing backend thread and the consuming endpoint can
/// share one allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioChunk {
    pub format: AudioFormat,
    /// Capture time in milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
    pub sequence_number: u32,
    pub sample_rate: u32,
    pub payload: Vec<u8>,
}

impl AudioChunk {
    pub fn new(format: AudioFormat, timestamp_ms: u64, payload: Vec<u8>) -> Self {
        Self {
            format,
            timestamp_ms,
            sequence_number: 0,
            sample_rate: 8000,
            payload,
        }
    }

    pub fn with_sequence_number(mut self, sequence_number: u32) -> Self {
        self.sequence_number = sequence_number;
        self
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}
