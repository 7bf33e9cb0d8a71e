//! Diagnostics sink for pipeline events.
//!
//! The engine never logs through a global logger of its own. Every event is
//! handed to a [`Diagnostics`] implementation supplied by the caller;
//! [`TracingDiagnostics`] forwards them to `tracing`.

use std::sync::{Arc, Mutex};

use strum::{AsRefStr, Display};

use crate::edit::{EditFailure, EditKind};

/// Tracing target for pipeline diagnostics.
pub const TRACING_TARGET: &str = "tailor_engine::diagnostics";

/// Pipeline stage of a personalization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    ValidatingInput,
    Indexing,
    AwaitingResponse,
    Screening,
    Decoding,
    Applying,
    Done,
    Failed,
}

impl Stage {
    /// Returns true for stages a run ends in.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

/// An observable event emitted by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticEvent {
    /// The run moved to a new stage.
    StageEntered(Stage),
    /// The model declined the request.
    Declined { reason: Option<String> },
    /// An edit was applied.
    EditApplied {
        index: usize,
        kind: EditKind,
        line: usize,
    },
    /// An edit was skipped.
    EditFailed { index: usize, failure: EditFailure },
    /// Totals of an applicator pass.
    BatchApplied { applied: usize, failed: usize },
}

/// Receiver of engine diagnostics.
pub trait Diagnostics: Send + Sync {
    /// Records one event.
    fn record(&self, event: DiagnosticEvent);
}

impl<T: Diagnostics + ?Sized> Diagnostics for Arc<T> {
    fn record(&self, event: DiagnosticEvent) {
        (**self).record(event);
    }
}

/// Forwards diagnostics to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn record(&self, event: DiagnosticEvent) {
        match event {
            DiagnosticEvent::StageEntered(stage) => {
                tracing::debug!(target: TRACING_TARGET, stage = %stage, "Entered stage");
            }
            DiagnosticEvent::Declined { reason } => {
                tracing::info!(
                    target: TRACING_TARGET,
                    reason = reason.as_deref().unwrap_or_default(),
                    "Request declined by model",
                );
            }
            DiagnosticEvent::EditApplied { index, kind, line } => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    index,
                    kind = %kind,
                    line,
                    "Edit applied",
                );
            }
            DiagnosticEvent::EditFailed { index, failure } => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    index,
                    reason = %failure,
                    "Edit skipped",
                );
            }
            DiagnosticEvent::BatchApplied { applied, failed } => {
                tracing::info!(target: TRACING_TARGET, applied, failed, "Batch applied");
            }
        }
    }
}

/// Collects events in memory.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    events: Mutex<Vec<DiagnosticEvent>>,
}

impl RecordingDiagnostics {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded events.
    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Returns the stages entered, in order.
    pub fn stages(&self) -> Vec<Stage> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                DiagnosticEvent::StageEntered(stage) => Some(stage),
                _ => None,
            })
            .collect()
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn record(&self, event: DiagnosticEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorder_keeps_order() {
        let recorder = RecordingDiagnostics::new();
        recorder.record(DiagnosticEvent::StageEntered(Stage::Indexing));
        recorder.record(DiagnosticEvent::BatchApplied {
            applied: 1,
            failed: 0,
        });
        recorder.record(DiagnosticEvent::StageEntered(Stage::Done));

        assert_eq!(recorder.events().len(), 3);
        assert_eq!(recorder.stages(), [Stage::Indexing, Stage::Done]);
    }

    #[test]
    fn terminal_stages() {
        assert!(Stage::Done.is_terminal());
        assert!(Stage::Failed.is_terminal());
        assert!(!Stage::Applying.is_terminal());
        assert_eq!(Stage::AwaitingResponse.as_ref(), "awaiting_response");
    }
}
