//! Model instructions and prompt rendering.

use serde::{Deserialize, Serialize};

use crate::document::IndexedDocument;

/// CSS class of the page's own request box.
pub const DEFAULT_PROTECTED_CLASS: &str = "input-bar";

const SYSTEM_INSTRUCTIONS: &str = "\
You are an expert web developer. You read an HTML page and return the specific \
changes needed to fulfil a modification request.

LINE MARKERS
1. Every line of the page is shown as `[NNN] content`.
2. NNN is the number of that line. To change the content shown after `[25]`, \
set `target_line` to 25.
3. The markers are not part of the page. Never copy them into `search_text` or \
`write_text`.

PARTIAL CHANGES
1. Do not return the whole page. Return only the changes that are needed.
2. `search_text` must be text that exists verbatim on the target line, without \
the marker. Matching is exact and case-sensitive.
3. Prefer the smallest `search_text` that identifies the text to change.
4. You may change styles with CSS, in `<style>` blocks or `style` attributes.
5. Scripts are not allowed: no `<script>` tags, no `javascript:` URIs, no \
inline event handlers such as `onclick`. If the request can only be fulfilled \
with JavaScript, decline it with `accepted: false` and explain why in `error`.

EDIT KINDS
- `replace`: replaces the first occurrence of `search_text` on `target_line` \
with `write_text`. `search_text` is required.
- `insert`: inserts `write_text` as new content before `target_line`. \
`search_text` is not used.

EXAMPLE
Given `[ 15] <h1>My Title</h1>`, to change that title use `target_line: 15` and \
`search_text: \"<h1>My Title</h1>\"` (without `[ 15]`).

FINAL CHECK
Before answering, verify that:
1. every `target_line` matches the marker in front of the content you change;
2. every `search_text` really exists after that marker;
3. no marker appears in `search_text` or `write_text`;
4. the resulting page is valid HTML and CSS and contains no JavaScript.";

/// Renders the instructions and the prompt sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplate {
    /// CSS classes whose elements, and their children, must never change.
    pub protected_classes: Vec<String>,
}

impl PromptTemplate {
    /// Creates a template protecting the given classes.
    pub fn new<I, S>(protected_classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            protected_classes: protected_classes
                .into_iter()
                .map(Into::into)
                .filter(|class: &String| !class.trim().is_empty())
                .collect(),
        }
    }

    /// Returns the system instructions.
    pub fn system_instructions(&self) -> String {
        if self.protected_classes.is_empty() {
            return SYSTEM_INSTRUCTIONS.to_owned();
        }

        let classes = self
            .protected_classes
            .iter()
            .map(|class| format!("'{class}'"))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "{SYSTEM_INSTRUCTIONS}\n\nPROTECTED ELEMENTS\nNever modify elements with the \
             class {classes}, nor any of their children."
        )
    }

    /// Returns the user prompt for one request.
    pub fn user_prompt(&self, document: &IndexedDocument, request: &str) -> String {
        format!(
            "Read the current page carefully. Each line starts with its number.\n\n\
             CURRENT PAGE (with line numbers):\n{document}\n\n\
             MODIFICATION REQUEST: {}\n",
            request.trim()
        )
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new([DEFAULT_PROTECTED_CLASS])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    #[test]
    fn default_protects_the_request_box() {
        let instructions = PromptTemplate::default().system_instructions();
        assert!(instructions.contains("'input-bar'"));
        assert!(instructions.contains("accepted: false"));
    }

    #[test]
    fn no_protected_section_without_classes() {
        let template = PromptTemplate::new(Vec::<String>::new());
        assert!(!template.system_instructions().contains("PROTECTED ELEMENTS"));

        let template = PromptTemplate::new(["  "]);
        assert!(template.protected_classes.is_empty());
    }

    #[test]
    fn user_prompt_carries_page_and_request() {
        let indexed = Document::from("<h1>A</h1>").index();
        let prompt = PromptTemplate::default().user_prompt(&indexed, "  make it blue ");

        assert!(prompt.contains("[  1] <h1>A</h1>"));
        assert!(prompt.contains("MODIFICATION REQUEST: make it blue\n"));
    }
}
