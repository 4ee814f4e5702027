//! Source templates for everything the planner writes
//!
//! Multi-line templates return text whose first line carries no indentation and whose
//! following lines are prefixed with the member indentation, so the result can be placed
//! at an already indented position (an insertion point or the start of a replaced method).

use std::fmt::Write as _;

use crate::index::TypeKind;

/// `@Override public boolean equals(Object o)` comparing the identifier attributes.
/// `objects` is how the file refers to `java.util.Objects`.
pub fn equals_method(type_name: &str, ids: &[&str], objects: &str, member: &str, unit: &str, nl: &str) -> String {
    let comparison = ids
        .iter()
        .map(|id| format!("{objects}.equals({id}, other.{id})"))
        .collect::<Vec<_>>()
        .join(" && ");

    let mut text = String::new();
    let body = format!("{member}{unit}");
    let _ = write!(text, "@Override{nl}");
    let _ = write!(text, "{member}public boolean equals(Object o) {{{nl}");
    let _ = write!(text, "{body}if (this == o) return true;{nl}");
    let _ = write!(text, "{body}if (!(o instanceof {type_name})) return false;{nl}");
    let _ = write!(text, "{body}{type_name} other = ({type_name}) o;{nl}");
    let _ = write!(text, "{body}return {comparison};{nl}");
    let _ = write!(text, "{member}}}");
    text
}

/// `@Override public int hashCode()` hashing the identifier attributes
pub fn hash_code_method(ids: &[&str], objects: &str, member: &str, unit: &str, nl: &str) -> String {
    format!(
        "@Override{nl}{member}public int hashCode() {{{nl}{member}{unit}return {objects}.hash({});{nl}{member}}}",
        ids.join(", ")
    )
}

/// `@Name`, `@Name(value)` or `@Name(key = value, ...)`
pub fn annotation(name: &str, arguments: &[(String, String)]) -> String {
    match arguments {
        [] => format!("@{}", name),
        [(key, value)] if key == "value" => format!("@{}({})", name, value),
        _ => {
            let rendered: Vec<String> = arguments.iter().map(|(k, v)| format!("{} = {}", k, v)).collect();
            format!("@{}({})", name, rendered.join(", "))
        }
    }
}

/// Annotation lines followed by `private Type name[ = init];`
pub fn field_declaration(
    annotations: &[String],
    declared_type: &str,
    name: &str,
    initializer: Option<&str>,
    member: &str,
    nl: &str,
) -> String {
    let mut text = String::new();
    for annotation in annotations {
        text.push_str(annotation);
        text.push_str(nl);
        text.push_str(member);
    }
    let _ = write!(text, "private {} {}", declared_type, name);
    if let Some(init) = initializer {
        let _ = write!(text, " = {}", init);
    }
    text.push(';');
    text
}

/// Java string literal for `value`
pub fn string_literal(value: &str) -> String {
    let mut literal = String::with_capacity(value.len() + 2);
    literal.push('"');
    for c in value.chars() {
        match c {
            '"' => literal.push_str("\\\""),
            '\\' => literal.push_str("\\\\"),
            '\n' => literal.push_str("\\n"),
            other => literal.push(other),
        }
    }
    literal.push('"');
    literal
}

/// Complete compilation unit for a new type with an empty body
pub fn new_type_file(
    package: &str,
    imports: &[String],
    annotations: &[String],
    kind: TypeKind,
    name: &str,
) -> String {
    let mut text = String::new();
    if !package.is_empty() {
        let _ = write!(text, "package {};\n\n", package);
    }
    if !imports.is_empty() {
        for import in imports {
            let _ = writeln!(text, "import {};", import);
        }
        text.push('\n');
    }
    for annotation in annotations {
        let _ = writeln!(text, "{}", annotation);
    }
    let header = match kind {
        TypeKind::Record => format!("public record {}()", name),
        other => format!("public {} {}", other.keyword(), name),
    };
    let _ = write!(text, "{} {{\n}}\n", header);
    text
}
