//! Debounced transcript accumulation.
//!
//! Final transcript fragments rarely line up with what the speaker meant as
//! one utterance: engines like to emit "two apples" and "and some milk" as
//! separate results a few hundred milliseconds apart.  The accumulator
//! buffers final fragments and releases the joined utterance only after a
//! quiet period, so downstream parsing sees whole thoughts.
//!
//! ```text
//! SessionEvent::Result ──▶ TranscriptAccumulator ──debounce──▶ utterance
//!                                   │
//!                          stop phrase ("that's it", …)
//!                                   │
//!                        immediate flush + session.stop_listening()
//! ```
//!
//! Stop phrases are scanned in interim fragments too, so "that's it" ends
//! the session without waiting for the engine to finalize.

use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};

use super::session::{maybe_sleep_until, SessionEvent, SessionHandle};

// ---------------------------------------------------------------------------
// TranscriptAccumulator
// ---------------------------------------------------------------------------

/// Signal raised by [`TranscriptAccumulator::observe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccumulatorSignal {
    /// A stop phrase was heard; flush and end the session.
    StopRequested,
}

/// Buffers final transcript fragments until a quiet period elapses.
///
/// Purely synchronous; [`run_accumulator`] drives it against the session's
/// event stream.
#[derive(Debug)]
pub struct TranscriptAccumulator {
    buffer: String,
    debounce: Duration,
    stop_phrases: Vec<String>,
    deadline: Option<Instant>,
}

impl TranscriptAccumulator {
    pub fn new(debounce: Duration, stop_phrases: Vec<String>) -> Self {
        let stop_phrases = stop_phrases
            .into_iter()
            .map(|p| p.to_lowercase())
            .collect();
        Self {
            buffer: String::new(),
            debounce,
            stop_phrases,
            deadline: None,
        }
    }

    /// Feed one transcript fragment.
    ///
    /// Final fragments are appended to the buffer and push the flush
    /// deadline out.  Both interim and final text are scanned for stop
    /// phrases.
    pub fn observe(&mut self, text: &str, is_final: bool) -> Option<AccumulatorSignal> {
        if is_final {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                if !self.buffer.is_empty() {
                    self.buffer.push(' ');
                }
                self.buffer.push_str(trimmed);
                self.deadline = Some(Instant::now() + self.debounce);
            }
        }

        let lowered = text.to_lowercase();
        if self
            .stop_phrases
            .iter()
            .any(|phrase| contains_phrase(&lowered, phrase))
        {
            log::debug!("accumulator: stop phrase heard in {:?}", text);
            return Some(AccumulatorSignal::StopRequested);
        }
        None
    }

    /// Next flush deadline, if any fragment is pending.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Take the buffered utterance, clearing the buffer and deadline.
    pub fn take_utterance(&mut self) -> Option<String> {
        self.deadline = None;
        if self.buffer.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.buffer))
        }
    }
}

/// Word-boundary substring match, so "done" never fires inside "abandoned".
fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    let mut from = 0;
    while let Some(pos) = haystack[from..].find(phrase) {
        let start = from + pos;
        let end = start + phrase.len();
        let ok_before = start == 0
            || !haystack[..start]
                .chars()
                .next_back()
                .is_some_and(char::is_alphanumeric);
        let ok_after = end == haystack.len()
            || !haystack[end..].chars().next().is_some_and(char::is_alphanumeric);
        if ok_before && ok_after {
            return true;
        }
        from = start + 1;
    }
    false
}

// ---------------------------------------------------------------------------
// Async driver
// ---------------------------------------------------------------------------

/// Drive the accumulator against a session's event stream.
///
/// Flushed utterances go out on `utterances`; a stop phrase flushes
/// immediately and asks the session to stop.  Runs until the session's
/// event channel closes.
pub async fn run_accumulator(
    mut accumulator: TranscriptAccumulator,
    mut session_events: mpsc::UnboundedReceiver<SessionEvent>,
    utterances: mpsc::UnboundedSender<String>,
    session: SessionHandle,
) {
    log::debug!("accumulator: task started");

    loop {
        tokio::select! {
            event = session_events.recv() => match event {
                Some(SessionEvent::Result { text, is_final }) => {
                    if accumulator.observe(&text, is_final)
                        == Some(AccumulatorSignal::StopRequested)
                    {
                        flush(&mut accumulator, &utterances);
                        session.stop_listening();
                    }
                }
                // Session over one way or another: whatever is buffered is
                // the last utterance.
                Some(SessionEvent::Timeout) | Some(SessionEvent::Ended) => {
                    flush(&mut accumulator, &utterances);
                }
                Some(SessionEvent::Error(kind)) => {
                    log::warn!("accumulator: session error: {kind}");
                    flush(&mut accumulator, &utterances);
                }
                None => break,
            },
            _ = maybe_sleep_until(accumulator.deadline()) => {
                flush(&mut accumulator, &utterances);
            }
        }
    }

    flush(&mut accumulator, &utterances);
    log::debug!("accumulator: task terminated");
}

fn flush(accumulator: &mut TranscriptAccumulator, utterances: &mpsc::UnboundedSender<String>) {
    if let Some(utterance) = accumulator.take_utterance() {
        log::debug!("accumulator: flushing {:?}", utterance);
        let _ = utterances.send(utterance);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
