//! Import planning
//!
//! New imports are sorted into the existing single-type import block. Without one, a block
//! is opened after the package clause, or at the top of the file when there is no package.

use tracing::trace;

use crate::edit::EditPlan;
use crate::index::{package_of, simple_name, TypeDeclaration};

/// Well-known JDK types an attribute type may mention
const JDK_TYPES: &[(&str, &str)] = &[
    ("BigDecimal", "java.math.BigDecimal"),
    ("BigInteger", "java.math.BigInteger"),
    ("LocalDate", "java.time.LocalDate"),
    ("LocalDateTime", "java.time.LocalDateTime"),
    ("LocalTime", "java.time.LocalTime"),
    ("Instant", "java.time.Instant"),
    ("OffsetDateTime", "java.time.OffsetDateTime"),
    ("ZonedDateTime", "java.time.ZonedDateTime"),
    ("Duration", "java.time.Duration"),
    ("Year", "java.time.Year"),
    ("UUID", "java.util.UUID"),
    ("Currency", "java.util.Currency"),
    ("Locale", "java.util.Locale"),
    ("Collection", "java.util.Collection"),
    ("List", "java.util.List"),
    ("ArrayList", "java.util.ArrayList"),
    ("Set", "java.util.Set"),
    ("HashSet", "java.util.HashSet"),
    ("LinkedHashSet", "java.util.LinkedHashSet"),
    ("Map", "java.util.Map"),
    ("HashMap", "java.util.HashMap"),
];

pub fn jdk_type(simple: &str) -> Option<&'static str> {
    JDK_TYPES.iter().find(|(name, _)| *name == simple).map(|(_, qualified)| *qualified)
}

/// Whether `qualified` must be imported into `decl`'s file
pub fn needs_import(decl: &TypeDeclaration, qualified: &str) -> bool {
    let package = package_of(qualified);
    if package.is_empty() || package == "java.lang" || package == decl.package_name() {
        return false;
    }
    !decl.imports.covers(qualified) && !simple_name_taken(decl, qualified)
}

/// Whether the simple name of `qualified` already denotes a different type in `decl`'s
/// file: a single-type import of another path, or the declared type itself. Such a type can
/// only be referenced by its qualified name.
pub fn simple_name_taken(decl: &TypeDeclaration, qualified: &str) -> bool {
    let simple = simple_name(qualified);
    let imported = decl
        .imports
        .regular()
        .any(|e| !e.wildcard && simple_name(&e.path) == simple && e.path != qualified);
    imported || (decl.name == simple && decl.qualified_name() != qualified)
}

/// Adds edits importing every entry of `required` that the file lacks, recording each in
/// the plan's import delta.
pub fn plan_imports(decl: &TypeDeclaration, required: &[String], plan: &mut EditPlan) {
    let mut missing: Vec<&str> = required
        .iter()
        .map(String::as_str)
        .filter(|q| needs_import(decl, q))
        .collect();
    missing.sort_unstable();
    missing.dedup();
    if missing.is_empty() {
        return;
    }
    let nl = decl.layout.newline;

    let regular: Vec<_> = decl.imports.regular().collect();
    if !regular.is_empty() {
        for qualified in &missing {
            let line = format!("import {};", qualified);
            match regular.iter().find(|e| rendered(&e.path, e.wildcard).as_str() > *qualified) {
                Some(next) => plan.insert(next.span.start, format!("{line}{nl}")),
                None => {
                    let last = regular.iter().map(|e| e.span.end).max().unwrap_or(0);
                    plan.insert(last, format!("{nl}{line}"));
                }
            }
            plan.record_import(*qualified);
        }
        return;
    }

    let block: String = missing
        .iter()
        .map(|q| format!("import {};", q))
        .collect::<Vec<_>>()
        .join(nl);

    // Static imports only: the new block follows them
    let static_end = decl.imports.iter().map(|e| e.span.end).max();
    match (static_end, &decl.package_span) {
        (Some(end), _) => plan.insert(end, format!("{nl}{nl}{block}")),
        (None, Some(package)) => plan.insert(package.end, format!("{nl}{nl}{block}")),
        (None, None) => plan.insert(decl.import_anchor, format!("{block}{nl}{nl}")),
    }
    trace!("Opening new import block with {} entries", missing.len());
    for qualified in missing {
        plan.record_import(qualified);
    }
}

fn rendered(path: &str, wildcard: bool) -> String {
    if wildcard {
        format!("{}.*", path)
    } else {
        path.to_string()
    }
}
