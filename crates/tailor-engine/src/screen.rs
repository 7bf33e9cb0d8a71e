//! Script content screening.
//!
//! The screener is a case-insensitive substring scan. It runs over the raw
//! model response before anything is parsed, so script content is caught no
//! matter which field it ends up in, and again over each decoded edit text,
//! where JSON escapes have been resolved. Matching ignores attribute boundaries,
//! so prose that mentions a handler name is rejected too.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

/// Tokens that introduce script-bearing markup.
pub const SCRIPT_MARKUP: &[&str] = &["<script", "javascript:"];

/// Inline DOM event handler attribute names.
///
/// Order matters: when several names match, the first one listed is reported.
pub const EVENT_HANDLERS: &[&str] = &[
    "onclick", "ondblclick", "onmousedown", "onmouseup", "onmouseover",
    "onmouseout", "onmousemove", "onkeydown", "onkeyup", "onkeypress",
    "onload", "onunload", "onresize", "onscroll", "onfocus", "onblur",
    "onchange", "onsubmit", "onreset", "onselect", "onabort", "onerror",
    "oncontextmenu", "ondrag", "ondragend", "ondragenter", "ondragleave",
    "ondragover", "ondragstart", "ondrop", "oninput", "oninvalid",
    "ontouchstart", "ontouchmove", "ontouchend", "ontouchcancel",
    "onwheel", "onanimationstart", "onanimationend", "onanimationiteration",
    "ontransitionend", "oncanplay", "oncanplaythrough", "ondurationchange",
    "onemptied", "onended", "onloadeddata", "onloadedmetadata",
    "onloadstart", "onpause", "onplay", "onplaying", "onprogress",
    "onratechange", "onseeked", "onseeking", "onstalled", "onsuspend",
    "ontimeupdate", "onvolumechange", "onwaiting",
];

/// Fragments of dynamic code execution and raw DOM writes.
pub const DANGEROUS_CALLS: &[&str] = &[
    "eval(",
    "function(",
    "new function",
    "settimeout",
    "setinterval",
    "document.write",
    "innerhtml",
    "outerhtml",
    "insertadjacenthtml",
];

/// Category of a disallowed fragment, in screening order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(AsRefStr, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ThreatCategory {
    /// `<script` tags and `javascript:` URIs.
    ScriptMarkup,
    /// Inline event handler attributes.
    EventHandler,
    /// Dynamic execution and raw DOM write calls.
    DangerousCall,
}

/// Outcome of screening a piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screening {
    /// No disallowed fragment was found.
    Safe,
    /// The first disallowed fragment found.
    Unsafe {
        /// Category the fragment belongs to.
        category: ThreatCategory,
        /// The policy entry that matched.
        fragment: String,
    },
}

impl Screening {
    /// Returns true if the text passed screening.
    pub fn is_safe(&self) -> bool {
        matches!(self, Self::Safe)
    }

    /// Returns a human readable reason for an unsafe result.
    pub fn reason(&self) -> Option<String> {
        match self {
            Self::Safe => None,
            Self::Unsafe { category, fragment } => Some(match category {
                ThreatCategory::ScriptMarkup => {
                    format!("detected script markup '{fragment}', which is not allowed")
                }
                ThreatCategory::EventHandler => {
                    format!("detected inline event handler '{fragment}', which is not allowed")
                }
                ThreatCategory::DangerousCall => {
                    format!("detected dangerous function '{fragment}', which is not allowed")
                }
            }),
        }
    }
}

/// The table of disallowed fragments.
///
/// The default policy is built from [`SCRIPT_MARKUP`], [`EVENT_HANDLERS`]
/// and [`DANGEROUS_CALLS`]. A policy can also be loaded from JSON so it can
/// be reviewed and changed without touching code:
///
/// ```json
/// {
///   "script_markup": ["<script", "javascript:"],
///   "event_handlers": ["onclick"],
///   "dangerous_calls": ["eval("]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScreeningPolicy {
    script_markup: Vec<String>,
    event_handlers: Vec<String>,
    dangerous_calls: Vec<String>,
}

impl ScreeningPolicy {
    /// Creates a policy from explicit lists. Entries are lowercased.
    pub fn new<S: AsRef<str>>(
        script_markup: &[S],
        event_handlers: &[S],
        dangerous_calls: &[S],
    ) -> Self {
        Self {
            script_markup: normalize(script_markup),
            event_handlers: normalize(event_handlers),
            dangerous_calls: normalize(dangerous_calls),
        }
    }

    /// Parses a policy from its JSON form.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let policy: Self = serde_json::from_str(json)?;
        Ok(Self::new(
            &policy.script_markup,
            &policy.event_handlers,
            &policy.dangerous_calls,
        ))
    }

    /// Returns the entries of one category.
    pub fn entries(&self, category: ThreatCategory) -> &[String] {
        match category {
            ThreatCategory::ScriptMarkup => &self.script_markup,
            ThreatCategory::EventHandler => &self.event_handlers,
            ThreatCategory::DangerousCall => &self.dangerous_calls,
        }
    }

    /// Returns the total number of entries.
    pub fn len(&self) -> usize {
        self.script_markup.len() + self.event_handlers.len() + self.dangerous_calls.len()
    }

    /// Returns true if the policy allows everything.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Screens `text`, returning the first disallowed fragment found.
    ///
    /// Categories are checked in order (markup, handlers, calls) and the
    /// scan stops at the first match.
    pub fn screen(&self, text: &str) -> Screening {
        let haystack = text.to_lowercase();

        [
            ThreatCategory::ScriptMarkup,
            ThreatCategory::EventHandler,
            ThreatCategory::DangerousCall,
        ]
        .into_iter()
        .find_map(|category| {
            self.entries(category)
                .iter()
                .find(|fragment| haystack.contains(fragment.as_str()))
                .map(|fragment| Screening::Unsafe {
                    category,
                    fragment: fragment.clone(),
                })
        })
        .unwrap_or(Screening::Safe)
    }
}

impl Default for ScreeningPolicy {
    fn default() -> Self {
        Self::new(SCRIPT_MARKUP, EVENT_HANDLERS, DANGEROUS_CALLS)
    }
}

fn normalize<S: AsRef<str>>(entries: &[S]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| entry.as_ref().trim().to_lowercase())
        .filter(|entry| !entry.is_empty())
        .collect()
}
