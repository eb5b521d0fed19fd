//! Speech recognition: backend abstraction, session state machine, and
//! transcript accumulation.
//!
//! ```text
//! RecognitionBackend ──events──▶ RecognitionSession ──▶ TranscriptAccumulator
//!    (platform)                   (state machine)           (debounce)
//!                                                               │
//!                                                          utterances
//! ```

pub mod accumulator;
pub mod backend;
pub mod session;

pub use accumulator::{run_accumulator, AccumulatorSignal, TranscriptAccumulator};
pub use backend::{BackendEvent, ErrorKind, RecognitionBackend, TranscriptFragment};
pub use session::{
    RecognitionSession, SessionCommand, SessionEvent, SessionHandle, SessionPhase,
    SessionSnapshot, SharedSessionState,
};
