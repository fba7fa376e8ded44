//! Resolution trace events
//!
//! The resolver can narrate its search through the four classic ports:
//! `CALL` when a goal is first tried, `EXIT` when it proves with some
//! bindings, `REDO` when the search resumes looking for further proofs, and
//! `FAIL` when no (more) proof exists. Events are observational only — they
//! never alter the solution stream.
//!
//! Sinks are engine-scoped values passed at construction time, not a
//! process-wide logger. The default [`LogTrace`] forwards to the `tracing`
//! subscriber at TRACE level; [`NullTrace`] turns event construction off
//! entirely.

use crate::bindings::Bindings;
use crate::term::Goal;

/// One step of the resolution search.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceEvent {
    /// A goal is about to be tried at the given rule depth.
    Call {
        /// Goal after shallow argument substitution.
        goal: Goal,
        /// Rule-expansion depth of the frame trying the goal.
        depth: usize,
    },
    /// The goal proved under the given bindings.
    Exit {
        /// The proved goal.
        goal: Goal,
        /// Substitution the proof produced.
        bindings: Bindings,
    },
    /// The search backtracked into the goal to look for more proofs.
    Redo {
        /// Goal being retried.
        goal: Goal,
    },
    /// The goal produced no (further) proof.
    Fail {
        /// Goal that failed.
        goal: Goal,
    },
}

/// Receiver for trace events, scoped to one engine.
pub trait TraceSink: Send + Sync {
    /// Whether events should be constructed at all. The resolver skips the
    /// clones needed to build an event when this returns false.
    fn enabled(&self) -> bool {
        true
    }

    /// Consumes one event.
    fn emit(&self, event: &TraceEvent);
}

/// Sink that discards everything without constructing events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTrace;

impl TraceSink for NullTrace {
    fn enabled(&self) -> bool {
        false
    }

    fn emit(&self, _event: &TraceEvent) {}
}

/// Sink that forwards events to the `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTrace;

impl TraceSink for LogTrace {
    fn enabled(&self) -> bool {
        tracing::enabled!(tracing::Level::TRACE)
    }

    fn emit(&self, event: &TraceEvent) {
        match event {
            TraceEvent::Call { goal, depth } => {
                tracing::trace!(goal = %goal, depth, "CALL");
            }
            TraceEvent::Exit { goal, bindings } => {
                tracing::trace!(goal = %goal, bindings = %bindings, "EXIT");
            }
            TraceEvent::Redo { goal } => {
                tracing::trace!(goal = %goal, "REDO");
            }
            TraceEvent::Fail { goal } => {
                tracing::trace!(goal = %goal, "FAIL");
            }
        }
    }
}
