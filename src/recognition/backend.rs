//! Platform speech-recognition capability, abstracted.
//!
//! # Overview
//!
//! [`RecognitionBackend`] is the control surface the session drives: it is
//! object-safe and `Send + Sync` so it can be held behind an
//! `Arc<dyn RecognitionBackend>`.  Recognition output travels the other way
//! as [`BackendEvent`]s on an mpsc channel — real platform engines deliver
//! results, errors and termination as asynchronous callbacks, and a channel
//! is the Rust shape of that.
//!
//! [`MockBackend`] (test-only) records every control call and lets tests
//! assert the session's central invariant: no start may ever follow a stop.

use thiserror::Error;

// ---------------------------------------------------------------------------
// ErrorKind
// ---------------------------------------------------------------------------

/// Error kinds reported by the platform capability.
///
/// Two kinds are transient and never surfaced to the caller: `NoSpeech`
/// (quiet microphone, the session keeps listening) and `Aborted` (expected
/// fallout of our own forced stops).  Everything else is session-fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("no speech detected")]
    NoSpeech,

    #[error("recognition aborted")]
    Aborted,

    #[error("network failure during recognition")]
    Network,

    #[error("microphone permission denied")]
    NotAllowed,

    #[error("speech recognition is not supported on this platform")]
    Unsupported,

    #[error("recognition error: {0}")]
    Other(String),
}

impl ErrorKind {
    /// True when this kind forces the session to `Idle` and is surfaced to
    /// the caller.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ErrorKind::NoSpeech | ErrorKind::Aborted)
    }
}

// ---------------------------------------------------------------------------
// TranscriptFragment / BackendEvent
// ---------------------------------------------------------------------------

/// One recognized alternative, interim or final.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptFragment {
    pub text: String,
    pub is_final: bool,
}

impl TranscriptFragment {
    pub fn interim(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: false,
        }
    }

    pub fn final_(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: true,
        }
    }
}

/// Asynchronous events emitted by the platform capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    /// One result callback — each alternative is independently interim or
    /// final.
    Result(Vec<TranscriptFragment>),
    /// A platform error; see [`ErrorKind::is_fatal`].
    Error(ErrorKind),
    /// The recognizer terminated, for any reason.
    End,
    /// Audio capture stopped; usually followed by `End`.
    AudioEnd,
}

// ---------------------------------------------------------------------------
// RecognitionBackend trait
// ---------------------------------------------------------------------------

/// Control primitives of the platform capability.
///
/// # Contract
///
/// - Callers must consult [`is_supported`](Self::is_supported) before
///   starting; `start` on an unsupported backend is allowed to fail.
/// - `stop` requests a graceful termination; `abort` is more forceful and is
///   what guaranteed-termination sequences must use.  Neither is required to
///   terminate the engine synchronously, or at all on some platforms — the
///   session compensates by re-issuing `abort` on a bounded schedule.
pub trait RecognitionBackend: Send + Sync {
    /// Capability probe.
    fn is_supported(&self) -> bool;

    /// Begin recognizing; events start flowing on the backend channel.
    fn start(&self) -> Result<(), ErrorKind>;

    /// Request a graceful stop (pending results may still arrive).
    fn stop(&self);

    /// Force termination, discarding pending results.
    fn abort(&self);
}

// Compile-time assertion: the trait must stay object-safe.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn RecognitionBackend>) {}
};

// ---------------------------------------------------------------------------
// MockBackend  (test-only)
// ---------------------------------------------------------------------------

/// Records every control call for later assertions.
#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendCall {
    Start,
    Stop,
    Abort,
}

/// Test double that records control calls and never touches a real engine.
#[cfg(test)]
pub struct MockBackend {
    supported: bool,
    start_result: Result<(), ErrorKind>,
    calls: std::sync::Mutex<Vec<BackendCall>>,
}

#[cfg(test)]
impl MockBackend {
    pub fn new() -> Self {
        Self {
            supported: true,
            start_result: Ok(()),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new()
        }
    }

    pub fn failing_start(kind: ErrorKind) -> Self {
        Self {
            start_result: Err(kind),
            ..Self::new()
        }
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn start_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| **c == BackendCall::Start)
            .count()
    }

    pub fn abort_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| **c == BackendCall::Abort)
            .count()
    }
}

#[cfg(test)]
impl RecognitionBackend for MockBackend {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn start(&self) -> Result<(), ErrorKind> {
        self.calls.lock().unwrap().push(BackendCall::Start);
        self.start_result.clone()
    }

    fn stop(&self) {
        self.calls.lock().unwrap().push(BackendCall::Stop);
    }

    fn abort(&self) {
        self.calls.lock().unwrap().push(BackendCall::Abort);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
