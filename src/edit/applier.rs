//! Applies an [`EditPlan`] to the text it was planned against

use ropey::Rope;
use tracing::trace;

use super::{EditPlan, TextEdit};
use crate::errors::EngineError;

/// New text plus the imports the plan introduced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emitted {
    pub text: String,
    pub added_imports: Vec<String>,
}

/// Applies every edit of `plan` to `source` in one pass, rightmost first.
///
/// Edits are validated before anything is touched: ranges must lie inside `source` on
/// character boundaries, and no two edits may overlap or start at the same offset. Any
/// violation is returned as an error and no text is produced.
pub fn apply(source: &str, plan: &EditPlan) -> Result<Emitted, EngineError> {
    let mut edits: Vec<&TextEdit> = plan.edits().iter().collect();
    for edit in &edits {
        let range = &edit.range;
        if range.start > range.end
            || range.end > source.len()
            || !source.is_char_boundary(range.start)
            || !source.is_char_boundary(range.end)
        {
            return Err(EngineError::InvalidEditRange(range.clone()));
        }
    }

    edits.sort_by_key(|e| (e.range.start, e.range.end));
    for pair in edits.windows(2) {
        let (first, second) = (&pair[0].range, &pair[1].range);
        if second.start < first.end || second.start == first.start {
            return Err(EngineError::OverlappingEdits {
                first: first.clone(),
                second: second.clone(),
            });
        }
    }

    let mut rope = Rope::from_str(source);
    for edit in edits.iter().rev() {
        let start = rope.byte_to_char(edit.range.start);
        let end = rope.byte_to_char(edit.range.end);
        trace!("Applying edit {:?} ({} bytes)", edit.range, edit.text.len());
        if start < end {
            rope.remove(start..end);
        }
        if !edit.text.is_empty() {
            rope.insert(start, &edit.text);
        }
    }

    Ok(Emitted {
        text: rope.to_string(),
        added_imports: plan.added_imports().to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_mixed_edits() {
        let source = "class A { int x; }";
        let mut plan = EditPlan::new();
        plan.insert(16, " int y;");
        plan.replace(6..7, "B");
        plan.record_import("java.util.List");

        let emitted = apply(source, &plan).unwrap();
        assert_eq!(emitted.text, "class B { int x; int y; }");
        assert_eq!(emitted.added_imports, vec!["java.util.List".to_string()]);
    }

    #[test]
    fn test_apply_empty_plan_is_identity() {
        let emitted = apply("class A {}", &EditPlan::new()).unwrap();
        assert_eq!(emitted.text, "class A {}");
        assert!(emitted.added_imports.is_empty());
    }

    #[test]
    fn test_overlapping_edits_fail() {
        let plan = EditPlan::from_edits(vec![
            TextEdit::replace(2..6, "x"),
            TextEdit::replace(4..8, "y"),
        ]);
        assert_eq!(
            apply("0123456789", &plan),
            Err(EngineError::OverlappingEdits {
                first: 2..6,
                second: 4..8,
            })
        );
    }

    #[test]
    fn test_same_offset_insertions_are_ambiguous() {
        let plan = EditPlan::from_edits(vec![TextEdit::insert(3, "a"), TextEdit::insert(3, "b")]);
        assert!(matches!(apply("0123", &plan), Err(EngineError::OverlappingEdits { .. })));
    }

    #[test]
    fn test_insertion_at_end_of_replacement_is_fine() {
        let plan = EditPlan::from_edits(vec![TextEdit::insert(4, "!"), TextEdit::replace(0..4, "abcd")]);
        assert_eq!(apply("0123", &plan).unwrap().text, "abcd!");
    }

    #[test]
    fn test_invalid_ranges() {
        let plan = EditPlan::from_edits(vec![TextEdit::insert(10, "x")]);
        assert_eq!(apply("short", &plan), Err(EngineError::InvalidEditRange(10..10)));

        // `é` is two bytes; offset 2 splits it
        let plan = EditPlan::from_edits(vec![TextEdit::insert(2, "x")]);
        assert_eq!(apply("aé", &plan), Err(EngineError::InvalidEditRange(2..2)));
    }

    #[test]
    fn test_multibyte_text_is_preserved() {
        let source = "// café\nclass A {}";
        let plan = EditPlan::from_edits(vec![TextEdit::insert(source.len() - 1, " int x; ")]);
        assert_eq!(apply(source, &plan).unwrap().text, "// café\nclass A { int x; }");
    }
}
