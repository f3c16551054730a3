use serde::{Deserialize, Serialize};

/// Kind of a capture event signalled by the backend.
///
/// `Start` and `Stop` frame a capture on an endpoint; the remaining kinds
/// carry call metadata. The numeric codes are the values carried on the
/// backend ABI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Start,
    Stop,
    Direction,
    RemoteParty,
    LocalParty,
    LocalEntryPoint,
    KeyValue,
    CallId,
    EndMetadata,
    Update,
    Unknown(u32),
}

impl EventKind {
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => Self::Start,
            2 => Self::Stop,
            3 => Self::Direction,
            4 => Self::RemoteParty,
            5 => Self::LocalParty,
            6 => Self::LocalEntryPoint,
            7 => Self::KeyValue,
            8 => Self::CallId,
            9 => Self::EndMetadata,
            10 => Self::Update,
            other => Self::Unknown(other),
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            Self::Start => 1,
            Self::Stop => 2,
            Self::Direction => 3,
            Self::RemoteParty => 4,
            Self::LocalParty => 5,
            Self::LocalEntryPoint => 6,
            Self::KeyValue => 7,
            Self::CallId => 8,
            Self::EndMetadata => 9,
            Self::Update => 10,
            Self::Unknown(code) => *code,
        }
    }

    /// Start/stop framing, as opposed to metadata.
    pub fn is_framing(&self) -> bool {
        matches!(self, Self::Start | Self::Stop)
    }
}

/// An event the backend reports for an endpoint. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureEvent {
    pub kind: EventKind,
    pub timestamp_ms: u64,
    pub key: String,
    pub value: String,
}

impl CaptureEvent {
    pub fn new(kind: EventKind, timestamp_ms: u64) -> Self {
        Self {
            kind,
            timestamp_ms,
            key: String::new(),
            value: String::new(),
        }
    }

    pub fn with_key_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.key = key.into();
        self.value = value.into();
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_start_and_stop_are_framing() {
        assert!(EventKind::Start.is_framing());
        assert!(EventKind::Stop.is_framing());
        assert!(!EventKind::RemoteParty.is_framing());
        assert!(!EventKind::Unknown(77).is_framing());
    }

    #[test]
    fn codes_are_stable() {
        for code in 1..=10 {
            assert_eq!(EventKind::from_code(code).code(), code);
        }
        assert_eq!(EventKind::from_code(0), EventKind::Unknown(0));
    }

    #[test]
    fn serializes_kind_as_snake_case() {
        let event = CaptureEvent::new(EventKind::RemoteParty, 5).with_value("+15551234");
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"remote_party\""));
        assert!(json.contains("+15551234"));
    }
}
