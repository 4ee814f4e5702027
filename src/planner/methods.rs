//! equals/hashCode planning
//!
//! Only methods whose fingerprint marks them as engine-generated are ever rewritten. A
//! user-authored method of the same name and arity blocks generation of that one method
//! and is reported; its sibling is still generated.

use tracing::debug;

use crate::edit::TextEdit;
use crate::errors::Warning;
use crate::index::{MethodOrigin, TypeDeclaration};

use super::imports::simple_name_taken;
use super::members::MemberBlock;
use super::templates;

pub const OBJECTS_IMPORT: &str = "java.util.Objects";

#[derive(Debug, Default)]
pub struct MethodPlan {
    /// Rewrites of previously generated methods, in place
    pub replacements: Vec<TextEdit>,
    /// Methods to add at the member anchor
    pub new_blocks: Vec<MemberBlock>,
    pub warnings: Vec<Warning>,
    /// Whether the file needs the `java.util.Objects` import afterwards
    pub uses_objects: bool,
}

/// Indentation added per nesting level, derived from the member indentation
pub fn indent_unit(decl: &TypeDeclaration) -> &str {
    match decl.layout.indent.strip_prefix(decl.declaration_indent.as_str()) {
        Some(unit) if !unit.is_empty() => unit,
        _ => decl.layout.indent.as_str(),
    }
}

/// Plans equals/hashCode over `ids`, the complete identifier attribute set
pub fn plan_equals_hash_code(decl: &TypeDeclaration, ids: &[&str]) -> MethodPlan {
    let mut plan = MethodPlan::default();
    if ids.is_empty() {
        plan.warnings.push(Warning::MissingIdentifierAttributes(decl.name.clone()));
        return plan;
    }

    // Another `Objects` import (Guava's, say) forces the qualified form
    let objects_taken = simple_name_taken(decl, OBJECTS_IMPORT);
    let objects = if objects_taken { OBJECTS_IMPORT } else { "Objects" };
    let member = decl.layout.indent.as_str();
    let unit = indent_unit(decl);
    let nl = decl.layout.newline;
    let targets = [
        ("equals", 1, templates::equals_method(&decl.name, ids, objects, member, unit, nl)),
        ("hashCode", 0, templates::hash_code_method(ids, objects, member, unit, nl)),
    ];

    for (name, arity, text) in targets {
        match decl.method(name, arity) {
            Some(existing) if existing.origin == MethodOrigin::UserAuthored => {
                debug!("Leaving user-authored {} of {} untouched", name, decl.name);
                plan.warnings.push(Warning::ConflictingUserMethod(name.to_string()));
            }
            Some(existing) => {
                plan.uses_objects = !objects_taken;
                if existing.text != text {
                    plan.replacements.push(TextEdit::replace(existing.span.clone(), text));
                }
            }
            None => {
                plan.uses_objects = !objects_taken;
                plan.new_blocks.push(MemberBlock::method(text));
            }
        }
    }
    let writes = !plan.replacements.is_empty() || !plan.new_blocks.is_empty();
    if objects_taken && writes {
        plan.warnings.push(Warning::QualifiedReference(OBJECTS_IMPORT.to_string()));
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{build_index, NoTypes};
    use crate::parsers::parse_code;
    use crate::query::QueryEngine;
    use indoc::indoc;

    fn decl(source: &str) -> TypeDeclaration {
        let tree = parse_code(source).unwrap();
        let engine = QueryEngine::builtin().unwrap();
        build_index(&tree, &engine, &NoTypes).unwrap()
    }

    #[test]
    fn test_generates_both_methods() {
        let plan = plan_equals_hash_code(&decl("class Book {\n    private Long id;\n}\n"), &["id"]);
        assert_eq!(plan.new_blocks.len(), 2);
        assert!(plan.replacements.is_empty());
        assert!(plan.warnings.is_empty());
        assert!(plan.uses_objects);
    }

    #[test]
    fn test_no_identifiers() {
        let plan = plan_equals_hash_code(&decl("class Book {}"), &[]);
        assert_eq!(plan.warnings, vec![Warning::MissingIdentifierAttributes("Book".to_string())]);
        assert!(plan.new_blocks.is_empty());
        assert!(!plan.uses_objects);
    }

    #[test]
    fn test_user_equals_conflicts() {
        let d = decl(indoc! {"
            class Book {
                private Long id;

                public boolean equals(Object o) {
                    return false;
                }
            }
        "});
        let plan = plan_equals_hash_code(&d, &["id"]);
        assert_eq!(plan.warnings, vec![Warning::ConflictingUserMethod("equals".to_string())]);
        assert_eq!(plan.new_blocks.len(), 1);
        assert!(plan.new_blocks[0].text.contains("hashCode"));
    }

    #[test]
    fn test_generated_method_is_rewritten_only_when_stale() {
        let source = indoc! {"
            class Book {
                private Long id;

                private String isbn;

                @Override
                public int hashCode() {
                    return Objects.hash(id);
                }
            }
        "};
        let d = decl(source);
        let fresh = plan_equals_hash_code(&d, &["id"]);
        assert!(fresh.replacements.is_empty());
        assert_eq!(fresh.new_blocks.len(), 1);

        let stale = plan_equals_hash_code(&d, &["id", "isbn"]);
        assert_eq!(stale.replacements.len(), 1);
        assert!(stale.replacements[0].text.contains("Objects.hash(id, isbn)"));
    }

    #[test]
    fn test_foreign_objects_import_forces_qualified_calls() {
        let d = decl("import com.google.common.base.Objects;\n\nclass Book {\n    private Long id;\n}\n");
        let plan = plan_equals_hash_code(&d, &["id"]);
        assert!(!plan.uses_objects);
        assert!(plan.new_blocks[0].text.contains("return java.util.Objects.equals(id, other.id);"));
        assert!(plan.new_blocks[1].text.contains("return java.util.Objects.hash(id);"));
        assert_eq!(plan.warnings, vec![Warning::QualifiedReference("java.util.Objects".to_string())]);
    }

    #[test]
    fn test_indent_unit_for_tabs() {
        let d = decl("class Book {\n\tprivate Long id;\n}\n");
        assert_eq!(indent_unit(&d), "\t");
    }
}
