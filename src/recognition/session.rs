//! Recognition session state machine.
//!
//! Platform speech engines terminate when they feel like it: a stop request
//! may be ignored, an "end" callback may arrive seconds late, and a
//! continuous session can die spontaneously mid-sentence.  [`RecognitionSession`]
//! wraps the capability in an explicit state machine whose guard flags are
//! re-checked at the moment each timer or termination callback acts, never
//! only at the moment it was scheduled.
//!
//! # State machine
//!
//! ```text
//! Idle ──start()──▶ Listening ──stop() / timeout──▶ Stopping ──▶ Idle
//!                      │  ▲
//!   spontaneous End ───┘  └─── auto-restart (continuous, guard re-checked)
//! ```
//!
//! Termination guarantees overlap deliberately:
//! * `stop()` schedules abort attempts at staggered delays
//!   (0/25/50/75/100/150/200/300 ms) because some engines silently ignore a
//!   single stop call; the last attempt forces `Idle` even if the platform
//!   never confirms.
//! * A platform `End` observed while the manual-stop flag is set completes
//!   the stop immediately and drops the remaining attempts.
//! * The invariant that matters: **no restart may ever occur after
//!   `stop()`**, regardless of how platform events interleave.
//!
//! The session runs as one tokio task; all transitions happen inside its
//! select loop, so they are atomic with respect to the event queue.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};

use crate::config::RecognitionConfig;

use super::backend::{BackendEvent, ErrorKind, RecognitionBackend};

// ---------------------------------------------------------------------------
// Timing constants
// ---------------------------------------------------------------------------

/// Offsets of the redundant abort attempts issued by a stop.
const STOP_ATTEMPT_OFFSETS_MS: [u64; 8] = [0, 25, 50, 75, 100, 150, 200, 300];

/// Guard delay before a continuous session restarts after a spontaneous end.
const RESTART_GUARD_MS: u64 = 100;

// ---------------------------------------------------------------------------
// SessionPhase
// ---------------------------------------------------------------------------

/// Lifecycle phase of one recognition session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// Not listening; the initial and terminal phase.
    #[default]
    Idle,
    /// The platform capability is (believed to be) recognizing.
    Listening,
    /// Termination requested; abort attempts may still be in flight.
    Stopping,
}

impl SessionPhase {
    /// Short label for logs and status displays.
    pub fn label(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "Idle",
            SessionPhase::Listening => "Listening",
            SessionPhase::Stopping => "Stopping",
        }
    }
}

// ---------------------------------------------------------------------------
// SessionEvent / SessionCommand
// ---------------------------------------------------------------------------

/// Events the session emits to its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A transcript fragment, interim or final.
    Result { text: String, is_final: bool },
    /// The session force-terminated itself (inactivity or session ceiling).
    Timeout,
    /// A fatal platform error; the session is `Idle` again.
    Error(ErrorKind),
    /// The session reached `Idle` after a stop or a spontaneous end.
    Ended,
}

/// Commands accepted by the session task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Start,
    Stop,
    ResetTranscript,
}

// ---------------------------------------------------------------------------
// SessionSnapshot / SharedSessionState
// ---------------------------------------------------------------------------

/// Readable session state, published after every transition.
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    /// Latest interim transcript (replaced by each interim fragment).
    pub transcript: String,
    /// Space-joined final fragments of the current session.
    pub final_transcript: String,
}

impl SessionSnapshot {
    pub fn is_listening(&self) -> bool {
        self.phase == SessionPhase::Listening
    }
}

/// Thread-safe handle to the latest [`SessionSnapshot`].
///
/// Lock for a short read; the session task is the only writer.
pub type SharedSessionState = Arc<Mutex<SessionSnapshot>>;

// ---------------------------------------------------------------------------
// SessionHandle
// ---------------------------------------------------------------------------

/// Caller-facing handle: commands in, snapshot reads out.
///
/// Cheap to clone.  Session events arrive on the receiver returned by
/// [`RecognitionSession::spawn`].
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<SessionCommand>,
    shared: SharedSessionState,
}

impl SessionHandle {
    pub fn start_listening(&self) {
        let _ = self.commands.send(SessionCommand::Start);
    }

    pub fn stop_listening(&self) {
        let _ = self.commands.send(SessionCommand::Stop);
    }

    pub fn reset_transcript(&self) {
        let _ = self.commands.send(SessionCommand::ResetTranscript);
    }

    pub fn is_listening(&self) -> bool {
        self.shared.lock().unwrap().is_listening()
    }

    pub fn transcript(&self) -> String {
        self.shared.lock().unwrap().transcript.clone()
    }

    pub fn final_transcript(&self) -> String {
        self.shared.lock().unwrap().final_transcript.clone()
    }
}

// ---------------------------------------------------------------------------
// RecognitionSession
// ---------------------------------------------------------------------------

/// One listening session over a [`RecognitionBackend`].
///
/// Construct with [`spawn`](Self::spawn); the returned [`SessionHandle`]
/// drives it and the event receiver reports results and lifecycle changes.
pub struct RecognitionSession {
    config: RecognitionConfig,
    backend: Arc<dyn RecognitionBackend>,
    events: mpsc::UnboundedSender<SessionEvent>,
    shared: SharedSessionState,

    phase: SessionPhase,
    /// Set by `stop()`; consulted by every termination/timer handler at the
    /// moment it acts.  The one flag that suppresses restarts.
    manual_stop: bool,
    transcript: String,
    final_transcript: String,

    inactivity_deadline: Option<Instant>,
    ceiling_deadline: Option<Instant>,
    restart_deadline: Option<Instant>,
    /// Absolute deadlines of the remaining abort attempts, earliest first.
    stop_attempts: VecDeque<Instant>,
}

impl RecognitionSession {
    fn new(
        config: RecognitionConfig,
        backend: Arc<dyn RecognitionBackend>,
        events: mpsc::UnboundedSender<SessionEvent>,
        shared: SharedSessionState,
    ) -> Self {
        Self {
            config,
            backend,
            events,
            shared,
            phase: SessionPhase::Idle,
            manual_stop: false,
            transcript: String::new(),
            final_transcript: String::new(),
            inactivity_deadline: None,
            ceiling_deadline: None,
            restart_deadline: None,
            stop_attempts: VecDeque::new(),
        }
    }

    /// Spawn the session task.
    ///
    /// `backend_rx` carries the platform's asynchronous events; the backend
    /// implementation owns the sending half.
    pub fn spawn(
        config: RecognitionConfig,
        backend: Arc<dyn RecognitionBackend>,
        backend_rx: mpsc::UnboundedReceiver<BackendEvent>,
    ) -> (SessionHandle, mpsc::UnboundedReceiver<SessionEvent>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let shared: SharedSessionState = Arc::new(Mutex::new(SessionSnapshot::default()));

        let session = Self::new(config, backend, event_tx, Arc::clone(&shared));
        tokio::spawn(session.run(command_rx, backend_rx));

        (
            SessionHandle {
                commands: command_tx,
                shared,
            },
            event_rx,
        )
    }

    // -----------------------------------------------------------------------
    // Main async loop
    // -----------------------------------------------------------------------

    /// Run until both channels close.  Every branch below re-checks the
    /// session's current intent before acting — deadlines are cleared and
    /// re-derived each iteration, so a stop is observable to every
    /// subsequently processed event.
    pub async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<SessionCommand>,
        mut backend_rx: mpsc::UnboundedReceiver<BackendEvent>,
    ) {
        log::debug!("session: event loop started");

        loop {
            let next_stop_attempt = self.stop_attempts.front().copied();

            tokio::select! {
                cmd = commands.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },
                event = backend_rx.recv() => match event {
                    Some(event) => self.handle_backend_event(event),
                    None => break,
                },
                _ = maybe_sleep_until(self.inactivity_deadline) => {
                    self.on_inactivity_timeout();
                }
                _ = maybe_sleep_until(self.ceiling_deadline) => {
                    self.on_ceiling_timeout();
                }
                _ = maybe_sleep_until(self.restart_deadline) => {
                    self.on_restart_guard();
                }
                _ = maybe_sleep_until(next_stop_attempt) => {
                    self.on_stop_attempt();
                }
            }

            self.publish();
        }

        // Teardown: never leave the microphone open.
        if self.phase != SessionPhase::Idle {
            log::debug!("session: channels closed while {}, aborting", self.phase.label());
            self.backend.abort();
            self.phase = SessionPhase::Idle;
            self.publish();
        }
        log::debug!("session: event loop terminated");
    }

    // -----------------------------------------------------------------------
    // Command handlers
    // -----------------------------------------------------------------------

    fn handle_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Start => self.handle_start(),
            SessionCommand::Stop => self.handle_stop(),
            SessionCommand::ResetTranscript => {
                self.transcript.clear();
                self.final_transcript.clear();
            }
        }
    }

    fn handle_start(&mut self) {
        if self.phase != SessionPhase::Idle {
            log::warn!("session: start ignored while {}", self.phase.label());
            return;
        }

        if !self.backend.is_supported() {
            log::warn!("session: speech recognition not supported, start refused");
            self.emit(SessionEvent::Error(ErrorKind::Unsupported));
            return;
        }

        log::debug!("session: Idle -> Listening");
        self.transcript.clear();
        self.final_transcript.clear();
        self.manual_stop = false;
        self.phase = SessionPhase::Listening;

        let now = Instant::now();
        self.inactivity_deadline = deadline_after(now, self.config.inactivity_timeout_ms);
        self.ceiling_deadline = deadline_after(now, self.config.max_session_ms);

        if let Err(kind) = self.backend.start() {
            log::error!("session: backend start failed: {kind}");
            self.fatal_error(kind);
        }
    }

    fn handle_stop(&mut self) {
        match self.phase {
            SessionPhase::Idle => {
                log::debug!("session: stop ignored while Idle");
            }
            SessionPhase::Stopping => {
                // Idempotent — but a caller stop upgrades a timeout-initiated
                // stop, so the flag must win any in-flight race.
                self.manual_stop = true;
            }
            SessionPhase::Listening => {
                log::debug!("session: Listening -> Stopping (caller)");
                self.begin_stop(true);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Backend event handlers
    // -----------------------------------------------------------------------

    fn handle_backend_event(&mut self, event: BackendEvent) {
        match event {
            BackendEvent::Result(fragments) => self.handle_result(fragments),
            BackendEvent::Error(kind) => self.handle_error(kind),
            BackendEvent::End => self.handle_termination("end"),
            BackendEvent::AudioEnd => self.handle_termination("audioend"),
        }
    }

    fn handle_result(&mut self, fragments: Vec<super::backend::TranscriptFragment>) {
        if self.phase != SessionPhase::Listening {
            log::debug!(
                "session: dropping {} fragment(s) while {}",
                fragments.len(),
                self.phase.label()
            );
            return;
        }

        for fragment in fragments {
            if fragment.is_final {
                if !self.final_transcript.is_empty() {
                    self.final_transcript.push(' ');
                }
                self.final_transcript.push_str(&fragment.text);
                self.transcript.clear();

                // Speech is flowing — push the inactivity window out.
                self.inactivity_deadline =
                    deadline_after(Instant::now(), self.config.inactivity_timeout_ms);

                self.emit(SessionEvent::Result {
                    text: fragment.text,
                    is_final: true,
                });
            } else if self.config.interim_results {
                self.transcript = fragment.text.clone();
                self.emit(SessionEvent::Result {
                    text: fragment.text,
                    is_final: false,
                });
            }
        }
    }

    fn handle_error(&mut self, kind: ErrorKind) {
        if !kind.is_fatal() {
            // `no-speech` and `aborted` are routine; stay the course.
            log::debug!("session: ignoring non-fatal error: {kind}");
            return;
        }
        if self.phase == SessionPhase::Idle {
            log::debug!("session: dropping late error while Idle: {kind}");
            return;
        }
        log::error!("session: fatal error while {}: {kind}", self.phase.label());
        self.fatal_error(kind);
    }

    /// Common handler for the platform's `end` and `audioend` callbacks.
    fn handle_termination(&mut self, label: &str) {
        if self.manual_stop {
            // Caller-initiated stop confirmed by the platform.
            log::debug!("session: {label} after stop() -> Idle");
            self.finish_stopped();
            return;
        }

        match self.phase {
            SessionPhase::Stopping => {
                // Timeout-forced stop confirmed by the platform.
                log::debug!("session: {label} while Stopping -> Idle");
                self.finish_stopped();
            }
            SessionPhase::Listening if self.config.continuous => {
                // Spontaneous termination: the engine gave up but the caller
                // did not.  Restart after a guard delay; the flag is checked
                // again when the guard fires.
                log::debug!("session: spontaneous {label}, restart in {RESTART_GUARD_MS}ms");
                self.restart_deadline =
                    Some(Instant::now() + Duration::from_millis(RESTART_GUARD_MS));
            }
            SessionPhase::Listening => {
                log::debug!("session: {label} (non-continuous) -> Idle");
                self.finish_stopped();
            }
            SessionPhase::Idle => {
                log::debug!("session: dropping late {label} while Idle");
            }
        }
    }

    // -----------------------------------------------------------------------
    // Timer handlers — each re-checks state at firing time
    // -----------------------------------------------------------------------

    fn on_inactivity_timeout(&mut self) {
        self.inactivity_deadline = None;
        if self.phase != SessionPhase::Listening {
            return;
        }
        log::info!(
            "session: no speech for {}ms, stopping",
            self.config.inactivity_timeout_ms
        );
        self.emit(SessionEvent::Timeout);
        self.begin_stop(false);
    }

    fn on_ceiling_timeout(&mut self) {
        self.ceiling_deadline = None;
        if self.phase != SessionPhase::Listening {
            return;
        }
        log::info!(
            "session: session ceiling of {}ms reached, stopping",
            self.config.max_session_ms
        );
        self.emit(SessionEvent::Timeout);
        self.begin_stop(false);
    }

    fn on_restart_guard(&mut self) {
        self.restart_deadline = None;

        // Re-check intent *now* — a stop may have raced in since the guard
        // was armed.
        if self.manual_stop || self.phase != SessionPhase::Listening {
            log::debug!("session: restart suppressed (flag or phase changed)");
            return;
        }

        log::debug!("session: auto-restarting continuous recognition");
        if let Err(kind) = self.backend.start() {
            log::error!("session: auto-restart failed: {kind}");
            self.fatal_error(kind);
        }
    }

    fn on_stop_attempt(&mut self) {
        self.stop_attempts.pop_front();

        if self.phase != SessionPhase::Stopping {
            // Stop already completed (platform end arrived, or a fatal error
            // tore the session down).
            self.stop_attempts.clear();
            return;
        }

        self.backend.abort();

        if self.stop_attempts.is_empty() {
            // The platform never confirmed; declare the session over anyway.
            log::debug!("session: stop window exhausted -> Idle");
            self.finish_stopped();
        }
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Enter `Stopping`: ask the engine nicely once, then schedule the
    /// redundant abort attempts in case it does not listen.
    fn begin_stop(&mut self, manual: bool) {
        self.backend.stop();
        self.manual_stop = self.manual_stop || manual;
        self.phase = SessionPhase::Stopping;
        self.inactivity_deadline = None;
        self.ceiling_deadline = None;
        self.restart_deadline = None;

        let now = Instant::now();
        self.stop_attempts = STOP_ATTEMPT_OFFSETS_MS
            .iter()
            .map(|ms| now + Duration::from_millis(*ms))
            .collect();
    }

    /// Final transition to `Idle` after any kind of termination.
    fn finish_stopped(&mut self) {
        self.phase = SessionPhase::Idle;
        self.manual_stop = false;
        self.stop_attempts.clear();
        self.inactivity_deadline = None;
        self.ceiling_deadline = None;
        self.restart_deadline = None;
        self.emit(SessionEvent::Ended);
    }

    fn fatal_error(&mut self, kind: ErrorKind) {
        self.phase = SessionPhase::Idle;
        self.manual_stop = false;
        self.stop_attempts.clear();
        self.inactivity_deadline = None;
        self.ceiling_deadline = None;
        self.restart_deadline = None;
        self.emit(SessionEvent::Error(kind));
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn emit(&self, event: SessionEvent) {
        // A dropped receiver just means nobody is watching anymore.
        let _ = self.events.send(event);
    }

    fn publish(&self) {
        let mut snapshot = self.shared.lock().unwrap();
        snapshot.phase = self.phase;
        snapshot.transcript = self.transcript.clone();
        snapshot.final_transcript = self.final_transcript.clone();
    }
}

/// Sleep until `deadline`, or forever when there is none.
pub(crate) async fn maybe_sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn deadline_after(now: Instant, ms: u64) -> Option<Instant> {
    if ms == 0 {
        None
    } else {
        Some(now + Duration::from_millis(ms))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognition::backend::{MockBackend, TranscriptFragment};

    fn test_config() -> RecognitionConfig {
        RecognitionConfig {
            continuous: true,
            interim_results: true,
            language: "en-US".into(),
            inactivity_timeout_ms: 0,
            max_session_ms: 0,
        }
    }

    /// Build a session whose handlers the tests drive directly.
    fn direct_session(
        config: RecognitionConfig,
    ) -> (
        RecognitionSession,
        Arc<MockBackend>,
        mpsc::UnboundedReceiver<SessionEvent>,
    ) {
        let backend = Arc::new(MockBackend::new());
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Mutex::new(SessionSnapshot::default()));
        let session = RecognitionSession::new(
            config,
            backend.clone() as Arc<dyn RecognitionBackend>,
            event_tx,
            shared,
        );
        (session, backend, event_rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<SessionEvent>) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn final_result(text: &str) -> BackendEvent {
        BackendEvent::Result(vec![TranscriptFragment::final_(text)])
    }

    // -----------------------------------------------------------------------
    // start()
    // -----------------------------------------------------------------------

    #[test]
    fn start_transitions_to_listening_and_starts_backend() {
        let (mut s, backend, _rx) = direct_session(test_config());
        s.handle_command(SessionCommand::Start);
        assert_eq!(s.phase, SessionPhase::Listening);
        assert_eq!(backend.start_count(), 1);
    }

    #[test]
    fn start_while_listening_is_ignored() {
        let (mut s, backend, _rx) = direct_session(test_config());
        s.handle_command(SessionCommand::Start);
        s.handle_command(SessionCommand::Start);
        assert_eq!(backend.start_count(), 1);
    }

    #[test]
    fn start_clears_residual_transcript() {
        let (mut s, _backend, _rx) = direct_session(test_config());
        s.handle_command(SessionCommand::Start);
        s.handle_backend_event(final_result("old words"));
        s.handle_command(SessionCommand::Stop);
        s.handle_backend_event(BackendEvent::End);
        assert_eq!(s.final_transcript, "old words");

        s.handle_command(SessionCommand::Start);
        assert!(s.final_transcript.is_empty());
    }

    #[test]
    fn start_on_unsupported_backend_signals_and_stays_idle() {
        let backend = Arc::new(MockBackend::unsupported());
        let (event_tx, mut rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Mutex::new(SessionSnapshot::default()));
        let mut s = RecognitionSession::new(
            test_config(),
            backend.clone() as Arc<dyn RecognitionBackend>,
            event_tx,
            shared,
        );

        s.handle_command(SessionCommand::Start);

        assert_eq!(s.phase, SessionPhase::Idle);
        assert_eq!(backend.start_count(), 0);
        assert_eq!(drain(&mut rx), vec![SessionEvent::Error(ErrorKind::Unsupported)]);
    }

    #[test]
    fn start_failure_goes_idle_with_error() {
        let backend = Arc::new(MockBackend::failing_start(ErrorKind::NotAllowed));
        let (event_tx, mut rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Mutex::new(SessionSnapshot::default()));
        let mut s = RecognitionSession::new(
            test_config(),
            backend as Arc<dyn RecognitionBackend>,
            event_tx,
            shared,
        );

        s.handle_command(SessionCommand::Start);

        assert_eq!(s.phase, SessionPhase::Idle);
        assert_eq!(drain(&mut rx), vec![SessionEvent::Error(ErrorKind::NotAllowed)]);
    }

    // -----------------------------------------------------------------------
    // Results
    // -----------------------------------------------------------------------

    #[test]
    fn final_fragments_accumulate_in_order() {
        let (mut s, _backend, mut rx) = direct_session(test_config());
        s.handle_command(SessionCommand::Start);
        s.handle_backend_event(final_result("two apples"));
        s.handle_backend_event(final_result("and milk"));

        assert_eq!(s.final_transcript, "two apples and milk");
        let events = drain(&mut rx);
        assert_eq!(
            events,
            vec![
                SessionEvent::Result {
                    text: "two apples".into(),
                    is_final: true
                },
                SessionEvent::Result {
                    text: "and milk".into(),
                    is_final: true
                },
            ]
        );
    }

    #[test]
    fn interim_fragments_replace_the_interim_transcript() {
        let (mut s, _backend, mut rx) = direct_session(test_config());
        s.handle_command(SessionCommand::Start);
        s.handle_backend_event(BackendEvent::Result(vec![TranscriptFragment::interim("tw")]));
        s.handle_backend_event(BackendEvent::Result(vec![TranscriptFragment::interim(
            "two app",
        )]));

        assert_eq!(s.transcript, "two app");
        assert!(s.final_transcript.is_empty());
        assert_eq!(drain(&mut rx).len(), 2);
    }

    #[test]
    fn interim_fragments_are_dropped_when_disabled() {
        let config = RecognitionConfig {
            interim_results: false,
            ..test_config()
        };
        let (mut s, _backend, mut rx) = direct_session(config);
        s.handle_command(SessionCommand::Start);
        s.handle_backend_event(BackendEvent::Result(vec![TranscriptFragment::interim("tw")]));

        assert!(s.transcript.is_empty());
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn final_result_rearms_inactivity_deadline() {
        let config = RecognitionConfig {
            inactivity_timeout_ms: 5_000,
            ..test_config()
        };
        let (mut s, _backend, _rx) = direct_session(config);
        s.handle_command(SessionCommand::Start);
        let armed_at_start = s.inactivity_deadline.expect("armed on start");

        s.handle_backend_event(final_result("milk"));
        let rearmed = s.inactivity_deadline.expect("re-armed on result");
        assert!(rearmed >= armed_at_start);
    }

    #[test]
    fn results_after_stop_are_discarded() {
        let (mut s, _backend, mut rx) = direct_session(test_config());
        s.handle_command(SessionCommand::Start);
        s.handle_command(SessionCommand::Stop);
        drain(&mut rx);

        s.handle_backend_event(final_result("late words"));
        assert!(s.final_transcript.is_empty());
        assert!(drain(&mut rx).is_empty());
    }

    // -----------------------------------------------------------------------
    // Errors
    // -----------------------------------------------------------------------

    #[test]
    fn non_fatal_errors_change_nothing() {
        let (mut s, _backend, mut rx) = direct_session(test_config());
        s.handle_command(SessionCommand::Start);

        s.handle_backend_event(BackendEvent::Error(ErrorKind::NoSpeech));
        s.handle_backend_event(BackendEvent::Error(ErrorKind::Aborted));

        assert_eq!(s.phase, SessionPhase::Listening);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn fatal_error_goes_idle_and_fires_exactly_once() {
        let (mut s, _backend, mut rx) = direct_session(test_config());
        s.handle_command(SessionCommand::Start);

        s.handle_backend_event(BackendEvent::Error(ErrorKind::Network));
        assert_eq!(s.phase, SessionPhase::Idle);

        // A duplicate error arriving after teardown is swallowed.
        s.handle_backend_event(BackendEvent::Error(ErrorKind::Network));
        assert_eq!(drain(&mut rx), vec![SessionEvent::Error(ErrorKind::Network)]);
    }

    #[test]
    fn unknown_error_kinds_are_fatal() {
        let (mut s, _backend, mut rx) = direct_session(test_config());
        s.handle_command(SessionCommand::Start);
        s.handle_backend_event(BackendEvent::Error(ErrorKind::Other("vendor".into())));

        assert_eq!(s.phase, SessionPhase::Idle);
        assert_eq!(drain(&mut rx).len(), 1);
    }

    // -----------------------------------------------------------------------
    // stop() and the no-restart invariant
    // -----------------------------------------------------------------------

    #[test]
    fn stop_enters_stopping_and_schedules_all_attempts() {
        let (mut s, _backend, _rx) = direct_session(test_config());
        s.handle_command(SessionCommand::Start);
        s.handle_command(SessionCommand::Stop);

        assert_eq!(s.phase, SessionPhase::Stopping);
        assert!(s.manual_stop);
        assert_eq!(s.stop_attempts.len(), STOP_ATTEMPT_OFFSETS_MS.len());
    }

    #[test]
    fn stop_is_idempotent() {
        let (mut s, _backend, _rx) = direct_session(test_config());
        s.handle_command(SessionCommand::Start);
        s.handle_command(SessionCommand::Stop);
        let scheduled = s.stop_attempts.clone();

        s.handle_command(SessionCommand::Stop);
        s.handle_command(SessionCommand::Stop);

        assert_eq!(s.phase, SessionPhase::Stopping);
        assert_eq!(s.stop_attempts, scheduled);
    }

    #[test]
    fn stop_while_idle_is_a_no_op() {
        let (mut s, backend, mut rx) = direct_session(test_config());
        s.handle_command(SessionCommand::Stop);
        assert_eq!(s.phase, SessionPhase::Idle);
        assert_eq!(backend.abort_count(), 0);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn end_after_stop_completes_without_restart() {
        let (mut s, backend, mut rx) = direct_session(test_config());
        s.handle_command(SessionCommand::Start);
        s.handle_command(SessionCommand::Stop);

        s.handle_backend_event(BackendEvent::End);

        assert_eq!(s.phase, SessionPhase::Idle);
        assert!(!s.manual_stop);
        assert!(s.stop_attempts.is_empty());
        assert_eq!(backend.start_count(), 1);
        assert_eq!(drain(&mut rx), vec![SessionEvent::Ended]);
    }

    #[test]
    fn audioend_after_stop_also_completes() {
        let (mut s, backend, _rx) = direct_session(test_config());
        s.handle_command(SessionCommand::Start);
        s.handle_command(SessionCommand::Stop);
        s.handle_backend_event(BackendEvent::AudioEnd);

        assert_eq!(s.phase, SessionPhase::Idle);
        assert_eq!(backend.start_count(), 1);
    }

    #[test]
    fn stop_wins_race_against_armed_restart_guard() {
        let (mut s, backend, _rx) = direct_session(test_config());
        s.handle_command(SessionCommand::Start);

        // Spontaneous end arms the restart guard…
        s.handle_backend_event(BackendEvent::End);
        assert!(s.restart_deadline.is_some());

        // …but a stop races in before the guard fires.
        s.handle_command(SessionCommand::Stop);
        s.on_restart_guard();

        assert_eq!(backend.start_count(), 1, "restart must be suppressed");
    }

    #[test]
    fn exhausted_stop_window_forces_idle() {
        let (mut s, backend, mut rx) = direct_session(test_config());
        s.handle_command(SessionCommand::Start);
        s.handle_command(SessionCommand::Stop);

        for _ in 0..STOP_ATTEMPT_OFFSETS_MS.len() {
            s.on_stop_attempt();
        }

        assert_eq!(s.phase, SessionPhase::Idle);
        assert_eq!(backend.abort_count(), STOP_ATTEMPT_OFFSETS_MS.len());
        assert_eq!(drain(&mut rx), vec![SessionEvent::Ended]);
    }

    #[test]
    fn no_event_ordering_reaches_listening_after_stop() {
        let (mut s, backend, _rx) = direct_session(test_config());
        s.handle_command(SessionCommand::Start);
        s.handle_command(SessionCommand::Stop);

        // Throw the whole platform repertoire at a stopped session.
        s.handle_backend_event(BackendEvent::AudioEnd);
        s.handle_backend_event(BackendEvent::End);
        s.handle_backend_event(final_result("ghost"));
        s.handle_backend_event(BackendEvent::Error(ErrorKind::Aborted));
        s.on_restart_guard();
        s.on_inactivity_timeout();
        s.on_ceiling_timeout();
        s.on_stop_attempt();

        assert_eq!(s.phase, SessionPhase::Idle);
        assert_eq!(backend.start_count(), 1);
    }

    // -----------------------------------------------------------------------
    // Spontaneous end / auto-restart
    // -----------------------------------------------------------------------

    #[test]
    fn spontaneous_end_in_continuous_mode_arms_restart() {
        let (mut s, _backend, mut rx) = direct_session(test_config());
        s.handle_command(SessionCommand::Start);
        s.handle_backend_event(BackendEvent::End);

        assert_eq!(s.phase, SessionPhase::Listening);
        assert!(s.restart_deadline.is_some());
        assert!(drain(&mut rx).is_empty(), "no Ended while restarting");
    }

    #[test]
    fn restart_guard_restarts_when_unopposed() {
        let (mut s, backend, _rx) = direct_session(test_config());
        s.handle_command(SessionCommand::Start);
        s.handle_backend_event(BackendEvent::End);
        s.on_restart_guard();

        assert_eq!(backend.start_count(), 2);
        assert_eq!(s.phase, SessionPhase::Listening);
    }

    #[test]
    fn spontaneous_end_in_one_shot_mode_goes_idle() {
        let config = RecognitionConfig {
            continuous: false,
            ..test_config()
        };
        let (mut s, backend, mut rx) = direct_session(config);
        s.handle_command(SessionCommand::Start);
        s.handle_backend_event(BackendEvent::End);

        assert_eq!(s.phase, SessionPhase::Idle);
        assert_eq!(backend.start_count(), 1);
        assert_eq!(drain(&mut rx), vec![SessionEvent::Ended]);
    }

    // -----------------------------------------------------------------------
    // Timeouts
    // -----------------------------------------------------------------------

    #[test]
    fn inactivity_timeout_fires_and_forces_stop() {
        let config = RecognitionConfig {
            inactivity_timeout_ms: 1_000,
            ..test_config()
        };
        let (mut s, _backend, mut rx) = direct_session(config);
        s.handle_command(SessionCommand::Start);
        s.on_inactivity_timeout();

        assert_eq!(s.phase, SessionPhase::Stopping);
        assert!(!s.manual_stop, "timeout is not a user action");
        assert_eq!(drain(&mut rx), vec![SessionEvent::Timeout]);
    }

    #[test]
    fn timeout_stop_is_not_restart_eligible() {
        let (mut s, backend, mut rx) = direct_session(test_config());
        s.handle_command(SessionCommand::Start);
        s.on_inactivity_timeout();
        drain(&mut rx);

        // The platform end that follows the forced abort must complete the
        // stop, not restart — even though the session is continuous.
        s.handle_backend_event(BackendEvent::End);
        assert_eq!(s.phase, SessionPhase::Idle);
        assert!(s.restart_deadline.is_none());
        assert_eq!(backend.start_count(), 1);
        assert_eq!(drain(&mut rx), vec![SessionEvent::Ended]);
    }

    #[test]
    fn ceiling_timeout_forces_stop_even_with_activity() {
        let config = RecognitionConfig {
            max_session_ms: 60_000,
            ..test_config()
        };
        let (mut s, _backend, mut rx) = direct_session(config);
        s.handle_command(SessionCommand::Start);
        s.handle_backend_event(final_result("still talking"));
        drain(&mut rx);

        s.on_ceiling_timeout();
        assert_eq!(s.phase, SessionPhase::Stopping);
        assert_eq!(drain(&mut rx), vec![SessionEvent::Timeout]);
    }

    #[test]
    fn stop_clears_both_timers() {
        let config = RecognitionConfig {
            inactivity_timeout_ms: 1_000,
            max_session_ms: 60_000,
            ..test_config()
        };
        let (mut s, _backend, _rx) = direct_session(config);
        s.handle_command(SessionCommand::Start);
        assert!(s.inactivity_deadline.is_some());
        assert!(s.ceiling_deadline.is_some());

        s.handle_command(SessionCommand::Stop);
        assert!(s.inactivity_deadline.is_none());
        assert!(s.ceiling_deadline.is_none());
    }

    // -----------------------------------------------------------------------
    // Transcript reset
    // -----------------------------------------------------------------------

    #[test]
    fn reset_transcript_clears_both_buffers() {
        let (mut s, _backend, _rx) = direct_session(test_config());
        s.handle_command(SessionCommand::Start);
        s.handle_backend_event(BackendEvent::Result(vec![
            TranscriptFragment::interim("two app"),
            TranscriptFragment::final_("two apples"),
        ]));

        s.handle_command(SessionCommand::ResetTranscript);
        assert!(s.transcript.is_empty());
        assert!(s.final_transcript.is_empty());
    }

    // -----------------------------------------------------------------------
    // End-to-end over the spawned task (paused tokio clock)
    // -----------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn spawned_session_stop_holds_against_late_events() {
        let backend = Arc::new(MockBackend::new());
        let (backend_tx, backend_rx) = mpsc::unbounded_channel();
        let (handle, _events) = RecognitionSession::spawn(
            test_config(),
            backend.clone() as Arc<dyn RecognitionBackend>,
            backend_rx,
        );

        handle.start_listening();
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(handle.is_listening());

        handle.stop_listening();
        // Let the whole guaranteed-termination window elapse.
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(!handle.is_listening());

        // Queued platform events arriving after the window change nothing.
        let _ = backend_tx.send(BackendEvent::End);
        let _ = backend_tx.send(final_result("stale"));
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert!(!handle.is_listening());
        assert_eq!(backend.start_count(), 1);
        assert!(backend.abort_count() >= 1);
    }

    #[tokio::test(start_paused = true)]
    async fn spawned_session_auto_restarts_after_spontaneous_end() {
        let backend = Arc::new(MockBackend::new());
        let (backend_tx, backend_rx) = mpsc::unbounded_channel();
        let (handle, _events) = RecognitionSession::spawn(
            test_config(),
            backend.clone() as Arc<dyn RecognitionBackend>,
            backend_rx,
        );

        handle.start_listening();
        tokio::time::sleep(Duration::from_millis(5)).await;

        let _ = backend_tx.send(BackendEvent::End);
        tokio::time::sleep(Duration::from_millis(RESTART_GUARD_MS + 50)).await;

        assert_eq!(backend.start_count(), 2);
        assert!(handle.is_listening());
    }

    #[tokio::test(start_paused = true)]
    async fn spawned_session_inactivity_timeout_releases_microphone() {
        let config = RecognitionConfig {
            inactivity_timeout_ms: 1_000,
            ..test_config()
        };
        let backend = Arc::new(MockBackend::new());
        let (backend_tx, backend_rx) = mpsc::unbounded_channel();
        let (handle, mut events) = RecognitionSession::spawn(
            config,
            backend.clone() as Arc<dyn RecognitionBackend>,
            backend_rx,
        );

        handle.start_listening();
        tokio::time::sleep(Duration::from_millis(5)).await;
        let _ = backend_tx.send(final_result("milk"));

        // Quiet period long enough for the timeout plus the stop window.
        tokio::time::sleep(Duration::from_millis(2_000)).await;

        assert!(!handle.is_listening());
        assert_eq!(backend.start_count(), 1, "timeout must not restart");

        let mut saw_timeout = false;
        while let Ok(event) = events.try_recv() {
            if event == SessionEvent::Timeout {
                saw_timeout = true;
            }
        }
        assert!(saw_timeout);
    }
}
