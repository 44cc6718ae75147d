//! Hosting-screen glue: artifact, access, gate, editor, and selector.
//!
//! [`DocumentScreen`] owns the generated artifact and wires the shared
//! [`AccessState`] through the gate and the editor. Replacing the artifact
//! (a new generation) resets access to locked, closes any open provider
//! session, and reinitializes the editor buffer.

use std::fmt;
use std::sync::Arc;

use crate::access::AccessState;
use crate::editor::EditableSurface;
use crate::gate::{ContentGate, GateView};
use crate::session::ProviderSelector;

/// The screen hosting one gated artifact.
pub struct DocumentScreen {
    artifact: String,
    access: Arc<AccessState>,
    gate: ContentGate,
    editor: EditableSurface,
    selector: ProviderSelector,
}

impl fmt::Debug for DocumentScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentScreen")
            .field("unlocked", &self.access.get())
            .field("artifact_len", &self.artifact.len())
            .finish_non_exhaustive()
    }
}

impl DocumentScreen {
    /// Creates a screen for `artifact`, charging `amount` in `currency` to
    /// unlock it.
    #[must_use]
    pub fn new(
        artifact: impl Into<String>,
        access: Arc<AccessState>,
        amount: f64,
        currency: impl Into<String>,
    ) -> Self {
        let artifact = artifact.into();
        let editor = EditableSurface::new(artifact.as_str());
        let selector = ProviderSelector::new(Arc::clone(&access), amount, currency);
        Self {
            artifact,
            access,
            gate: ContentGate::new(),
            editor,
            selector,
        }
    }

    /// Returns the shared access state.
    #[must_use]
    pub fn access(&self) -> &Arc<AccessState> {
        &self.access
    }

    /// Returns the current artifact text.
    #[must_use]
    pub fn artifact(&self) -> &str {
        &self.artifact
    }

    /// Computes the gated view. Unlocked screens show the editor's buffer
    /// (local edits included); locked screens show the artifact preview.
    #[must_use]
    pub fn view(&self) -> GateView<'_> {
        if self.access.get() {
            self.gate.view(self.editor.text(), true)
        } else {
            self.gate.view(&self.artifact, false)
        }
    }

    /// The unlock panel driving the payment flows.
    pub fn selector_mut(&mut self) -> &mut ProviderSelector {
        &mut self.selector
    }

    /// The editable surface, available only once unlocked.
    pub fn editor_mut(&mut self) -> Option<&mut EditableSurface> {
        self.access.get().then_some(&mut self.editor)
    }

    /// Copy-to-clipboard gate: the full (edited) text only when unlocked.
    #[must_use]
    pub fn copy_text(&self) -> Option<&str> {
        self.gate.copy_text(self.editor.text(), self.access.get())
    }

    /// Export gate: same rule as copying.
    #[must_use]
    pub fn export_text(&self) -> Option<&str> {
        self.copy_text()
    }

    /// Replaces the artifact with a new generation.
    ///
    /// Policy: access resets to locked, the stored receipt is cleared, any
    /// open provider session is destroyed, and the editor buffer is reset
    /// (discarding local edits).
    pub fn replace_artifact(&mut self, artifact: impl Into<String>) {
        self.artifact = artifact.into();
        self.access.set(false);
        self.access.set_details(None);
        self.selector.close();
        self.editor.sync_artifact(&self.artifact);
    }
}
