//! Preview truncation and copy gating for the locked artifact.
//!
//! While locked, only the first ten non-empty lines of the artifact are
//! shown plainly; the rest is handed back as an obscured block the host
//! renders blurred and non-interactive. Once unlocked the full text flows
//! through untruncated. Copy-to-clipboard follows the same gate: locked
//! copies are a no-op.

/// Default number of non-empty preview lines.
pub const DEFAULT_PREVIEW_LINES: usize = 10;

/// How much of the artifact is visible and interactive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateView<'a> {
    /// Locked: plain preview plus the obscured remainder.
    Locked {
        /// First `preview_lines` non-empty lines, original content, in
        /// original order.
        preview: Vec<&'a str>,
        /// Raw lines after the last previewed one; rendered blurred,
        /// not selectable, and not a copy target.
        obscured: Vec<&'a str>,
    },
    /// Unlocked: the full text, no truncation.
    Unlocked {
        /// The whole artifact.
        text: &'a str,
    },
}

/// Decides visibility of the artifact from the access flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentGate {
    preview_lines: usize,
}

impl Default for ContentGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentGate {
    /// Creates a gate with the default ten-line preview budget.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            preview_lines: DEFAULT_PREVIEW_LINES,
        }
    }

    /// Overrides the preview budget.
    #[must_use]
    pub const fn with_preview_lines(mut self, lines: usize) -> Self {
        self.preview_lines = lines;
        self
    }

    /// Computes the view of `text` for the given access flag.
    #[must_use]
    pub fn view<'a>(&self, text: &'a str, unlocked: bool) -> GateView<'a> {
        if unlocked {
            return GateView::Unlocked { text };
        }

        let lines: Vec<&str> = text.lines().collect();
        let mut preview = Vec::new();
        let mut cut = lines.len();
        for (idx, line) in lines.iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            preview.push(*line);
            if preview.len() == self.preview_lines {
                cut = idx + 1;
                break;
            }
        }

        GateView::Locked {
            preview,
            obscured: lines[cut..].to_vec(),
        }
    }

    /// Returns the first `preview_lines` non-empty lines of `text`.
    #[must_use]
    pub fn preview<'a>(&self, text: &'a str) -> Vec<&'a str> {
        text.lines()
            .filter(|line| !line.trim().is_empty())
            .take(self.preview_lines)
            .collect()
    }

    /// Copy-to-clipboard gate: the full text only when unlocked.
    #[must_use]
    pub fn copy_text<'a>(&self, text: &'a str, unlocked: bool) -> Option<&'a str> {
        unlocked.then_some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LETTER: &str = "Dear Hiring Manager,\n\nFirst paragraph.\nSecond paragraph.\n\nThird paragraph.\nFourth.\nFifth.\nSixth.\nSeventh.\nEighth.\nNinth.\n\nSincerely,\nJane";

    #[test]
    fn locked_view_reveals_exactly_the_preview_budget() {
        let gate = ContentGate::new();
        let GateView::Locked { preview, obscured } = gate.view(LETTER, false) else {
            panic!("expected a locked view");
        };
        // 10 non-empty lines: the greeting plus nine paragraph lines.
        assert_eq!(preview.len(), 10);
        assert_eq!(preview[0], "Dear Hiring Manager,");
        assert_eq!(preview[9], "Ninth.");
        // Everything after the tenth non-empty line stays obscured.
        assert_eq!(obscured, vec!["", "Sincerely,", "Jane"]);
    }

    #[test]
    fn preview_skips_blank_lines_but_keeps_content_untrimmed() {
        let gate = ContentGate::new().with_preview_lines(2);
        let preview = gate.preview("  indented\n\n\t\nnext line\nthird");
        assert_eq!(preview, vec!["  indented", "next line"]);
    }

    #[test]
    fn short_artifacts_preview_every_non_empty_line() {
        let gate = ContentGate::new();
        let GateView::Locked { preview, obscured } = gate.view("one\n\ntwo\n", false) else {
            panic!("expected a locked view");
        };
        assert_eq!(preview, vec!["one", "two"]);
        assert!(obscured.is_empty());
    }

    #[test]
    fn unlocked_view_is_the_full_text() {
        let gate = ContentGate::new();
        assert_eq!(
            gate.view(LETTER, true),
            GateView::Unlocked { text: LETTER }
        );
    }

    #[test]
    fn copy_is_a_no_op_while_locked() {
        let gate = ContentGate::new();
        assert_eq!(gate.copy_text(LETTER, false), None);
        assert_eq!(gate.copy_text(LETTER, true), Some(LETTER));
    }
}
