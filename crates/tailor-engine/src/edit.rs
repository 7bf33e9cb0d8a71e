//! Edit descriptors and the structured batch returned by the model.
//!
//! Decoding happens in two steps. The batch itself is decoded strictly: an
//! unknown field or an unknown edit kind makes the whole response malformed.
//! Each [`EditRequest`] is then validated on its own into an
//! [`EditDescriptor`]; a request with missing fields fails only itself.

use schemars::{JsonSchema, Schema};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};
use thiserror::Error;

use crate::Result;

/// Reserved character joining inserted text to its line until expansion.
///
/// It is a private-use code point so that it never collides with document
/// content; text carrying it is rejected before it can reach a line.
pub const LINE_BREAK_PLACEHOLDER: char = '\u{E000}';

/// Kind of a requested change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[derive(AsRefStr, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EditKind {
    /// Replace the first occurrence of `search_text` on the target line.
    Replace,
    /// Insert `write_text` as new line(s) before the target line.
    Insert,
}

/// One change as it arrives from the model, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct EditRequest {
    /// Kind of change.
    pub kind: EditKind,
    /// 1-based line number in the numbered document.
    #[serde(default)]
    pub target_line: Option<i64>,
    /// Exact text to find on the target line, without the line marker.
    /// Required for `replace`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_text: Option<String>,
    /// Text to write. Required for both kinds.
    #[serde(default)]
    pub write_text: Option<String>,
}

impl EditRequest {
    /// Creates a replace request.
    pub fn replace(
        target_line: i64,
        search_text: impl Into<String>,
        write_text: impl Into<String>,
    ) -> Self {
        Self {
            kind: EditKind::Replace,
            target_line: Some(target_line),
            search_text: Some(search_text.into()),
            write_text: Some(write_text.into()),
        }
    }

    /// Creates an insert request.
    pub fn insert(target_line: i64, write_text: impl Into<String>) -> Self {
        Self {
            kind: EditKind::Insert,
            target_line: Some(target_line),
            search_text: None,
            write_text: Some(write_text.into()),
        }
    }

    /// Checks required fields per kind and builds a descriptor.
    ///
    /// Both kinds must write a non-empty string.
    pub fn validate(&self) -> std::result::Result<EditDescriptor, EditFailure> {
        let target_line = match self.target_line {
            None => return Err(EditFailure::MissingField("target_line")),
            Some(line) if line < 1 => return Err(EditFailure::InvalidLine(line)),
            Some(line) => usize::try_from(line).map_err(|_| EditFailure::InvalidLine(line))?,
        };

        let write_text = self
            .write_text
            .clone()
            .filter(|text| !text.is_empty())
            .ok_or(EditFailure::MissingField("write_text"))?;
        let reserved = |text: &Option<String>| {
            text.as_deref()
                .is_some_and(|text| text.contains(LINE_BREAK_PLACEHOLDER))
        };
        if reserved(&self.write_text) || reserved(&self.search_text) {
            return Err(EditFailure::ReservedCharacter);
        }

        match self.kind {
            EditKind::Replace => {
                let search_text = self
                    .search_text
                    .clone()
                    .filter(|text| !text.is_empty())
                    .ok_or(EditFailure::MissingField("search_text"))?;

                Ok(EditDescriptor::Replace {
                    target_line,
                    search_text,
                    write_text,
                })
            }
            EditKind::Insert => Ok(EditDescriptor::Insert {
                target_line,
                write_text,
            }),
        }
    }
}

/// A validated change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditDescriptor {
    /// Replace the first occurrence of `search_text` on `target_line`.
    Replace {
        target_line: usize,
        search_text: String,
        write_text: String,
    },
    /// Insert `write_text` before `target_line`.
    Insert {
        target_line: usize,
        write_text: String,
    },
}

impl EditDescriptor {
    /// Returns the 1-based target line.
    pub fn target_line(&self) -> usize {
        match self {
            Self::Replace { target_line, .. } | Self::Insert { target_line, .. } => *target_line,
        }
    }

    /// Returns the kind of this descriptor.
    pub fn kind(&self) -> EditKind {
        match self {
            Self::Replace { .. } => EditKind::Replace,
            Self::Insert { .. } => EditKind::Insert,
        }
    }
}

/// Reason a single edit could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditFailure {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    #[error("invalid target line {0}")]
    InvalidLine(i64),
    #[error("line {line} is out of range (document has {len} lines)")]
    LineOutOfRange { line: usize, len: usize },
    #[error("search text not found on line {line}")]
    SearchTextNotFound { line: usize },
    #[error("edit text contains the reserved line break placeholder")]
    ReservedCharacter,
}

/// The structured response of the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct EditBatch {
    /// False when the request cannot be fulfilled with HTML and CSS.
    pub accepted: bool,
    /// Ordered edits to apply.
    #[serde(default)]
    pub edits: Vec<EditRequest>,
    /// Reason for declining, when `accepted` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EditBatch {
    /// Creates an accepted batch.
    pub fn accepted(edits: Vec<EditRequest>) -> Self {
        Self {
            accepted: true,
            edits,
            error: None,
        }
    }

    /// Creates a declined batch.
    pub fn declined(reason: impl Into<String>) -> Self {
        Self {
            accepted: false,
            edits: Vec::new(),
            error: Some(reason.into()),
        }
    }

    /// Decodes a raw model response, tolerating a surrounding code fence.
    pub fn from_response(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(strip_code_fence(text))?)
    }

    /// Returns the JSON Schema the model output must follow.
    pub fn schema() -> Schema {
        schemars::schema_for!(EditBatch)
    }
}

/// Removes a surrounding markdown code fence, if any.
///
/// ```
/// use tailor_engine::strip_code_fence;
///
/// assert_eq!(strip_code_fence("```json\n{}\n```"), "{}");
/// assert_eq!(strip_code_fence(" {} "), "{}");
/// ```
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = body.strip_suffix("```") else {
        return trimmed;
    };

    // Drop the info string (`json`) on the opening fence line.
    match body.split_once('\n') {
        Some((_, rest)) => rest.trim(),
        None => body.trim(),
    }
}
