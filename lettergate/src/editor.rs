//! Caret-preserving editable text surface.
//!
//! The rendered view of the artifact is abstracted as an ordered list of
//! text segments (one per line, separated by an implicit newline that
//! counts one UTF-16 unit in the flattened text). A live selection is a
//! pair of `(segment, offset)` positions; around every edit it is
//! flattened to [`CaretOffsets`] measured in UTF-16 code units, the buffer
//! is mutated, and only after the next render commit are the offsets
//! translated back into a concrete selection — the segment list the
//! offsets were computed against no longer exists until then.
//!
//! Offsets adjust across the edit so the round-trip holds: an edit
//! entirely at or before a caret shifts it by the length delta; an edit
//! entirely after it leaves it untouched; a caret inside a replaced range
//! collapses to the end of the insertion.

/// A selection flattened to `(start, end)` UTF-16 code-unit offsets.
///
/// Ephemeral: exists only between an edit and the following render commit,
/// never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaretOffsets {
    /// Selection anchor offset.
    pub start: usize,
    /// Selection focus offset.
    pub end: usize,
}

impl CaretOffsets {
    /// Creates a collapsed caret at `offset`.
    #[must_use]
    pub const fn collapsed(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }
}

/// A position inside the segment list: segment index plus UTF-16 offset
/// within that segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentPosition {
    /// Index into the segment list.
    pub segment: usize,
    /// UTF-16 code-unit offset within the segment.
    pub offset: usize,
}

/// A live selection: anchor and focus positions in the rendered segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    /// Where the selection started.
    pub anchor: SegmentPosition,
    /// Where the selection ends (the caret).
    pub focus: SegmentPosition,
}

impl Selection {
    /// Creates a collapsed selection at one position.
    #[must_use]
    pub const fn caret(position: SegmentPosition) -> Self {
        Self {
            anchor: position,
            focus: position,
        }
    }
}

/// UTF-16 code-unit length of a string.
fn utf16_len(s: &str) -> usize {
    s.chars().map(char::len_utf16).sum()
}

/// Byte index corresponding to a UTF-16 offset, clamped to char boundaries.
fn utf16_to_byte(s: &str, offset: usize) -> usize {
    let mut units = 0;
    for (byte_idx, ch) in s.char_indices() {
        if units >= offset {
            return byte_idx;
        }
        units += ch.len_utf16();
    }
    s.len()
}

/// In-place editor over the unlocked artifact.
///
/// Holds a local mutable buffer initialized from the artifact. When the
/// upstream artifact changes (a new generation), the buffer is reset and
/// unsaved local edits are discarded; that is the defined policy.
#[derive(Debug, Clone)]
pub struct EditableSurface {
    /// Upstream artifact the buffer was last initialized from.
    artifact: String,
    /// Local mutable text.
    buffer: String,
    /// Committed rendered view of `buffer`.
    segments: Vec<String>,
    /// Offsets captured around an edit, awaiting the next render commit.
    pending: Option<CaretOffsets>,
}

impl EditableSurface {
    /// Creates a surface initialized from the artifact.
    #[must_use]
    pub fn new(artifact: impl Into<String>) -> Self {
        let artifact = artifact.into();
        let buffer = artifact.clone();
        let segments = render(&buffer);
        Self {
            artifact,
            buffer,
            segments,
            pending: None,
        }
    }

    /// Returns the current plain-text value for downstream consumers.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Returns the committed rendered segments.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Adopts a new upstream artifact.
    ///
    /// A changed artifact resets the buffer, discarding local edits and any
    /// pending caret. Returns `true` when a reset happened.
    pub fn sync_artifact(&mut self, artifact: &str) -> bool {
        if artifact == self.artifact {
            return false;
        }
        self.artifact = artifact.to_owned();
        self.buffer = artifact.to_owned();
        self.segments = render(&self.buffer);
        self.pending = None;
        true
    }

    /// Flattens a live selection to UTF-16 offsets by walking the committed
    /// segments in order, accumulating text length.
    #[must_use]
    pub fn caret_offsets(&self, selection: &Selection) -> CaretOffsets {
        CaretOffsets {
            start: self.flatten(selection.anchor),
            end: self.flatten(selection.focus),
        }
    }

    /// Replaces the UTF-16 range `range` of the buffer with `insert`,
    /// carrying `caret` (captured before the mutation) across the edit.
    ///
    /// The rendered segments are left untouched: restoring the caret must
    /// wait for [`Self::commit_render`], since the tree the offsets were
    /// computed against is stale once the buffer changes.
    pub fn replace_range(&mut self, range: CaretOffsets, insert: &str, caret: CaretOffsets) {
        let from = utf16_to_byte(&self.buffer, range.start.min(range.end));
        let to = utf16_to_byte(&self.buffer, range.start.max(range.end));
        self.buffer.replace_range(from..to, insert);

        let inserted = utf16_len(insert);
        self.pending = Some(CaretOffsets {
            start: adjust(caret.start, range, inserted),
            end: adjust(caret.end, range, inserted),
        });
    }

    /// Commits a re-render: rebuilds the segments from the buffer, then
    /// translates the pending offsets back into a concrete selection for
    /// the host to install.
    ///
    /// Returns `None` when no edit is awaiting restoration.
    pub fn commit_render(&mut self) -> Option<Selection> {
        self.segments = render(&self.buffer);
        let pending = self.pending.take()?;
        Some(Selection {
            anchor: self.locate(pending.start),
            focus: self.locate(pending.end),
        })
    }

    /// Offsets captured by the last edit, if a restore is still pending.
    #[must_use]
    pub const fn pending_caret(&self) -> Option<CaretOffsets> {
        self.pending
    }

    /// Flattened offset of a segment position: lengths of all earlier
    /// segments plus one unit per separator.
    fn flatten(&self, position: SegmentPosition) -> usize {
        let mut acc = 0;
        for segment in self.segments.iter().take(position.segment) {
            acc += utf16_len(segment) + 1;
        }
        acc + position.offset
    }

    /// Walks the segments accumulating length until the target offset is
    /// reached. An offset on a separator maps to the end of the segment
    /// before it; an offset past the end clamps to the final position.
    fn locate(&self, offset: usize) -> SegmentPosition {
        let mut acc = 0;
        let last = self.segments.len().saturating_sub(1);
        for (idx, segment) in self.segments.iter().enumerate() {
            let len = utf16_len(segment);
            if offset <= acc + len {
                return SegmentPosition {
                    segment: idx,
                    offset: offset - acc,
                };
            }
            acc += len + 1;
        }
        SegmentPosition {
            segment: last,
            offset: self.segments.last().map(|s| utf16_len(s)).unwrap_or(0),
        }
    }
}

/// Splits the buffer into rendered segments, one per line.
fn render(buffer: &str) -> Vec<String> {
    buffer.split('\n').map(str::to_owned).collect()
}

/// Carries one captured offset across a range replacement.
fn adjust(p: usize, range: CaretOffsets, inserted: usize) -> usize {
    let (start, end) = (range.start.min(range.end), range.start.max(range.end));
    if end <= p {
        // Edit entirely at or before the caret: shift by the length delta.
        p - (end - start) + inserted
    } else if start >= p {
        // Edit entirely after the caret: untouched.
        p
    } else {
        // Caret inside the replaced range: collapse to the insertion end.
        start + inserted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_flattens_across_segments() {
        let surface = EditableSurface::new("abc\ndef\nghi");
        let selection = Selection::caret(SegmentPosition {
            segment: 1,
            offset: 2,
        });
        // "abc" (3) + separator (1) + 2
        assert_eq!(surface.caret_offsets(&selection), CaretOffsets::collapsed(6));
    }

    #[test]
    fn insert_at_caret_moves_it_by_the_inserted_length() {
        let mut surface = EditableSurface::new("abcdefghijklmnopqrst");
        let caret = CaretOffsets::collapsed(5);
        surface.replace_range(CaretOffsets::collapsed(5), "XYZ", caret);
        assert_eq!(surface.text(), "abcdeXYZfghijklmnopqrst");

        let restored = surface.commit_render().unwrap();
        assert_eq!(restored.focus.offset, 8);
        assert_eq!(restored.focus.segment, 0);
    }

    #[test]
    fn insert_after_caret_leaves_it_unchanged() {
        let mut surface = EditableSurface::new("abcdefghijklmnopqrst");
        let caret = CaretOffsets::collapsed(5);
        surface.replace_range(CaretOffsets::collapsed(15), "XYZ", caret);

        let restored = surface.commit_render().unwrap();
        assert_eq!(restored.focus.offset, 5);
    }

    #[test]
    fn deletion_before_caret_shifts_it_back() {
        let mut surface = EditableSurface::new("hello world");
        let caret = CaretOffsets::collapsed(8);
        surface.replace_range(CaretOffsets { start: 0, end: 6 }, "", caret);
        assert_eq!(surface.text(), "world");

        let restored = surface.commit_render().unwrap();
        assert_eq!(restored.focus.offset, 2);
    }

    #[test]
    fn caret_inside_replaced_range_collapses_to_insertion_end() {
        let mut surface = EditableSurface::new("hello world");
        let caret = CaretOffsets::collapsed(3);
        surface.replace_range(CaretOffsets { start: 1, end: 7 }, "a", caret);

        let restored = surface.commit_render().unwrap();
        assert_eq!(restored.focus.offset, 2);
    }

    #[test]
    fn restore_is_deferred_until_the_render_commits() {
        let mut surface = EditableSurface::new("abc");
        surface.replace_range(CaretOffsets::collapsed(1), "x", CaretOffsets::collapsed(1));
        // Segments are still the pre-edit tree.
        assert_eq!(surface.segments(), ["abc"]);
        assert!(surface.pending_caret().is_some());

        let restored = surface.commit_render();
        assert!(restored.is_some());
        assert_eq!(surface.segments(), ["axbc"]);
        assert!(surface.pending_caret().is_none());
        assert!(surface.commit_render().is_none());
    }

    #[test]
    fn offsets_count_utf16_code_units() {
        // '😀' is two UTF-16 code units but four UTF-8 bytes.
        let mut surface = EditableSurface::new("a😀b");
        let caret = CaretOffsets::collapsed(3); // a (1) + the emoji (2)
        surface.replace_range(CaretOffsets::collapsed(0), "x", caret);
        assert_eq!(surface.text(), "xa😀b");

        let restored = surface.commit_render().unwrap();
        assert_eq!(restored.focus.offset, 4);
    }

    #[test]
    fn caret_restores_across_line_splits() {
        let mut surface = EditableSurface::new("hello world");
        let caret = CaretOffsets::collapsed(11);
        surface.replace_range(CaretOffsets { start: 5, end: 6 }, "\n", caret);
        assert_eq!(surface.text(), "hello\nworld");

        let restored = surface.commit_render().unwrap();
        assert_eq!(
            restored.focus,
            SegmentPosition {
                segment: 1,
                offset: 5
            }
        );
    }

    #[test]
    fn new_artifact_resets_local_edits() {
        let mut surface = EditableSurface::new("first draft");
        surface.replace_range(
            CaretOffsets::collapsed(0),
            "edited ",
            CaretOffsets::collapsed(0),
        );
        surface.commit_render();
        assert_eq!(surface.text(), "edited first draft");

        // Same upstream artifact: local edits survive.
        assert!(!surface.sync_artifact("first draft"));
        assert_eq!(surface.text(), "edited first draft");

        // New generation: buffer resets, edits discarded by policy.
        assert!(surface.sync_artifact("second draft"));
        assert_eq!(surface.text(), "second draft");
        assert!(surface.pending_caret().is_none());
    }

    #[test]
    fn locate_clamps_past_the_end() {
        let surface = EditableSurface::new("ab\ncd");
        let position = surface.locate(99);
        assert_eq!(
            position,
            SegmentPosition {
                segment: 1,
                offset: 2
            }
        );
    }
}
