//! Line-scoped patch application.
//!
//! Edits run in order over one working copy of the lines. An insert joins its
//! text to the front of the target line with [`LINE_BREAK_PLACEHOLDER`], so
//! line numbers keep pointing at the original lines for the rest of the pass.
//! Later edits on the same line see the merged content. The placeholder is
//! expanded into real line breaks once, after the last edit.

use serde::Serialize;

use crate::diagnostics::{DiagnosticEvent, Diagnostics};
use crate::document::Document;
use crate::edit::{EditDescriptor, EditFailure, EditRequest, LINE_BREAK_PLACEHOLDER};
use crate::{Error, Result};

/// Tracing target for patch application.
pub const TRACING_TARGET: &str = "tailor_engine::apply";

/// An edit that was skipped, with its position in the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEdit {
    /// 0-based position in the batch.
    pub index: usize,
    /// Why it was skipped.
    pub reason: String,
    #[serde(skip)]
    pub failure: EditFailure,
}

/// Per-edit outcome of an applicator pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    /// Number of edits applied.
    pub applied: usize,
    /// Edits that were skipped.
    pub skipped: Vec<SkippedEdit>,
}

impl ApplyReport {
    /// Returns the number of edits in the batch.
    pub fn total(&self) -> usize {
        self.applied + self.skipped.len()
    }

    /// Returns true if every edit was applied.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// A patched document together with its report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patched {
    pub document: Document,
    pub report: ApplyReport,
}

/// Applies `edits` to `document`.
///
/// A failing edit is recorded and skipped. The call only fails when the
/// batch is non-empty and no edit could be applied. An empty batch returns
/// the document unchanged. A document that already carries
/// [`LINE_BREAK_PLACEHOLDER`] is rejected as invalid input.
pub fn apply(
    document: &Document,
    edits: &[EditRequest],
    diagnostics: &dyn Diagnostics,
) -> Result<Patched> {
    if document.contains_char(LINE_BREAK_PLACEHOLDER) {
        return Err(Error::invalid_input()
            .with_message("document contains the reserved character U+E000"));
    }

    let mut lines = document.clone().into_lines();
    let mut report = ApplyReport::default();

    for (index, request) in edits.iter().enumerate() {
        let outcome = request
            .validate()
            .and_then(|descriptor| apply_one(&mut lines, &descriptor).map(|()| descriptor));

        match outcome {
            Ok(descriptor) => {
                report.applied += 1;
                diagnostics.record(DiagnosticEvent::EditApplied {
                    index,
                    kind: descriptor.kind(),
                    line: descriptor.target_line(),
                });
            }
            Err(failure) => {
                report.skipped.push(SkippedEdit {
                    index,
                    reason: failure.to_string(),
                    failure: failure.clone(),
                });
                diagnostics.record(DiagnosticEvent::EditFailed { index, failure });
            }
        }
    }

    diagnostics.record(DiagnosticEvent::BatchApplied {
        applied: report.applied,
        failed: report.skipped.len(),
    });

    if !edits.is_empty() && report.applied == 0 {
        let first = report
            .skipped
            .first()
            .map(|skipped| format!(" (first failure: {})", skipped.reason))
            .unwrap_or_default();
        return Err(Error::content().with_message(format!(
            "none of the {} requested changes could be applied{first}",
            edits.len()
        )));
    }

    let document = expand(&lines);
    tracing::debug!(
        target: TRACING_TARGET,
        applied = report.applied,
        skipped = report.skipped.len(),
        lines = document.len(),
        "Patch applied",
    );

    Ok(Patched { document, report })
}

fn apply_one(
    lines: &mut [String],
    descriptor: &EditDescriptor,
) -> std::result::Result<(), EditFailure> {
    let len = lines.len();
    let line = descriptor.target_line();
    let slot = line
        .checked_sub(1)
        .and_then(|idx| lines.get_mut(idx))
        .ok_or(EditFailure::LineOutOfRange { line, len })?;

    match descriptor {
        EditDescriptor::Replace {
            search_text,
            write_text,
            ..
        } => {
            if !slot.contains(search_text.as_str()) {
                return Err(EditFailure::SearchTextNotFound { line });
            }
            *slot = slot.replacen(search_text.as_str(), write_text, 1);
        }
        EditDescriptor::Insert { write_text, .. } => {
            let mut merged = String::with_capacity(write_text.len() + slot.len() + 3);
            merged.push_str(write_text);
            merged.push(LINE_BREAK_PLACEHOLDER);
            merged.push_str(slot);
            *slot = merged;
        }
    }

    Ok(())
}

/// Turns placeholders into line breaks and re-splits the lines.
fn expand(lines: &[String]) -> Document {
    let text = lines.join("\n").replace(LINE_BREAK_PLACEHOLDER, "\n");
    Document::from(text)
}
