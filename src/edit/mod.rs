//! Text edits planned against one parsed snapshot of a file
//!
//! An [`EditPlan`] is the only thing the planner hands to the emitter. Edits are kept sorted
//! by start offset; insertions landing on the same offset are merged in planning order, so a
//! well-formed plan never contains two edits that start at the same byte.

pub mod applier;

pub use applier::{apply, Emitted};

use std::ops::Range;

/// Replace `range` of the original text with `text`. An empty range is an insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: Range<usize>,
    pub text: String,
}

impl TextEdit {
    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Self {
            range: offset..offset,
            text: text.into(),
        }
    }

    pub fn replace(range: Range<usize>, text: impl Into<String>) -> Self {
        Self {
            range,
            text: text.into(),
        }
    }

    pub fn is_insertion(&self) -> bool {
        self.range.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditPlan {
    edits: Vec<TextEdit>,
    added_imports: Vec<String>,
}

impl EditPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plan made of `edits` exactly as given, neither sorted nor merged
    pub fn from_edits(edits: Vec<TextEdit>) -> Self {
        Self {
            edits,
            added_imports: Vec::new(),
        }
    }

    /// Adds an edit at its sorted position. An insertion at the offset of an earlier
    /// insertion is appended to it.
    pub fn push(&mut self, edit: TextEdit) {
        if edit.is_insertion() && edit.text.is_empty() {
            return;
        }
        if edit.is_insertion() {
            if let Some(existing) = self
                .edits
                .iter_mut()
                .find(|e| e.is_insertion() && e.range.start == edit.range.start)
            {
                existing.text.push_str(&edit.text);
                return;
            }
        }
        let position = self
            .edits
            .partition_point(|e| (e.range.start, e.range.end) <= (edit.range.start, edit.range.end));
        self.edits.insert(position, edit);
    }

    pub fn insert(&mut self, offset: usize, text: impl Into<String>) {
        self.push(TextEdit::insert(offset, text));
    }

    pub fn replace(&mut self, range: Range<usize>, text: impl Into<String>) {
        self.push(TextEdit::replace(range, text));
    }

    /// Records a fully qualified import the plan introduces
    pub fn record_import(&mut self, qualified: impl Into<String>) {
        let qualified = qualified.into();
        if !self.added_imports.contains(&qualified) {
            self.added_imports.push(qualified);
        }
    }

    pub fn edits(&self) -> &[TextEdit] {
        &self.edits
    }

    pub fn added_imports(&self) -> &[String] {
        &self.added_imports
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_edits_sorted() {
        let mut plan = EditPlan::new();
        plan.insert(30, "c");
        plan.replace(5..8, "a");
        plan.insert(12, "b");
        let starts: Vec<usize> = plan.edits().iter().map(|e| e.range.start).collect();
        assert_eq!(starts, vec![5, 12, 30]);
    }

    #[test]
    fn test_same_offset_insertions_merge_in_order() {
        let mut plan = EditPlan::new();
        plan.insert(10, "first;");
        plan.insert(4, "x");
        plan.insert(10, "second;");
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.edits()[1], TextEdit::insert(10, "first;second;"));
    }

    #[test]
    fn test_empty_insertions_are_dropped() {
        let mut plan = EditPlan::new();
        plan.insert(3, "");
        assert!(plan.is_empty());
    }

    #[test]
    fn test_recorded_imports_are_unique() {
        let mut plan = EditPlan::new();
        plan.record_import("jakarta.persistence.Id");
        plan.record_import("jakarta.persistence.Id");
        assert_eq!(plan.added_imports(), ["jakarta.persistence.Id".to_string()]);
    }
}
