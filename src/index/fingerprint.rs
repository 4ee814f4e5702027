//! Structural fingerprints of boilerplate methods
//!
//! A method is considered engine-generated when its signature and the shape of its body
//! statements equal the shape of the code the engine itself emits. The canonical shapes
//! are derived by parsing the engine's own templates once per process, so the fingerprint
//! never drifts from what the planner actually writes. Names of types and fields are not
//! part of the shape.

use std::sync::OnceLock;

use tree_sitter::Node as TsNode;
use tracing::{debug, trace};

use crate::parsers::java::{kind_ids, named_children, parse_code};
use crate::parsers::SyntaxTree;
use crate::planner::templates;

use super::model::simple_name;

/// Shape of one statement: its node kind plus one distinguishing detail
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StatementShape {
    pub kind: String,
    pub detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodFingerprint {
    pub name: String,
    pub return_type: String,
    /// Simple names of the parameter types
    pub parameter_types: Vec<String>,
    pub statements: Vec<StatementShape>,
}

impl MethodFingerprint {
    /// Fingerprint of a `method_declaration` node. `None` for abstract/interface methods
    /// and anything that is not a method declaration.
    pub fn of(tree: &SyntaxTree, method: TsNode<'_>) -> Option<Self> {
        if !kind_ids::is_method_declaration(method.kind_id()) {
            return None;
        }
        let name = tree.text(method.child_by_field_name("name")?).to_string();
        let return_type = simple_name(tree.text(method.child_by_field_name("type")?)).to_string();
        let parameter_types = parameter_types(tree, method)
            .iter()
            .map(|t| simple_name(t).to_string())
            .collect();
        let body = method.child_by_field_name("body")?;
        let statements = named_children(body)
            .into_iter()
            .filter(|s| !kind_ids::is_comment(s.kind_id()))
            .map(|s| statement_shape(tree, s))
            .collect();

        Some(Self {
            name,
            return_type,
            parameter_types,
            statements,
        })
    }

    /// True if this fingerprint equals one of the engine's canonical boilerplate shapes
    pub fn is_canonical(&self) -> bool {
        canonical_fingerprints().iter().any(|c| c == self)
    }
}

/// Parameter type texts of a method or constructor, as written
pub(crate) fn parameter_types(tree: &SyntaxTree, method: TsNode<'_>) -> Vec<String> {
    let Some(parameters) = method.child_by_field_name("parameters") else {
        return Vec::new();
    };
    named_children(parameters)
        .into_iter()
        .filter_map(|p| {
            if kind_ids::is_spread_parameter(p.kind_id()) {
                // `String... names` has no `type` field; the type is its first named child
                named_children(p)
                    .into_iter()
                    .find(|c| !kind_ids::is_modifiers(c.kind_id()))
                    .map(|t| format!("{}...", tree.text(t)))
            } else {
                p.child_by_field_name("type").map(|t| tree.text(t).to_string())
            }
        })
        .collect()
}

fn statement_shape(tree: &SyntaxTree, statement: TsNode<'_>) -> StatementShape {
    let detail = match statement.kind() {
        "if_statement" => statement
            .child_by_field_name("condition")
            .map(|c| unparenthesize(c).kind().to_string()),
        "return_statement" | "expression_statement" => {
            named_children(statement).into_iter().next().map(|e| expression_detail(tree, e))
        }
        _ => None,
    };
    StatementShape {
        kind: statement.kind().to_string(),
        detail,
    }
}

fn expression_detail(tree: &SyntaxTree, expression: TsNode<'_>) -> String {
    match expression.kind() {
        "method_invocation" => match expression.child_by_field_name("name") {
            Some(name) => format!("call:{}", tree.text(name)),
            None => expression.kind().to_string(),
        },
        other => other.to_string(),
    }
}

fn unparenthesize(node: TsNode<'_>) -> TsNode<'_> {
    let mut node = node;
    while node.kind() == "parenthesized_expression" {
        match named_children(node).into_iter().next() {
            Some(inner) => node = inner,
            None => break,
        }
    }
    node
}

static CANONICAL: OnceLock<Vec<MethodFingerprint>> = OnceLock::new();

/// Fingerprints of the equals/hashCode bodies the planner emits, for one and for several
/// identifier attributes (a single id compares with a call, several with `&&`).
pub fn canonical_fingerprints() -> &'static [MethodFingerprint] {
    CANONICAL.get_or_init(|| {
        let mut source = String::from("class T {\n");
        for ids in [&["a"][..], &["a", "b"][..]] {
            source.push_str(&templates::equals_method("T", ids, "Objects", "    ", "    ", "\n"));
            source.push('\n');
            source.push_str(&templates::hash_code_method(ids, "Objects", "    ", "    ", "\n"));
            source.push('\n');
        }
        source.push_str("}\n");

        let fingerprints: Vec<MethodFingerprint> = match parse_code(&source) {
            Ok(tree) => {
                let class = named_children(tree.root()).into_iter().next();
                let body = class.and_then(|c| c.child_by_field_name("body"));
                body.map(|b| {
                    named_children(b)
                        .into_iter()
                        .filter_map(|m| MethodFingerprint::of(&tree, m))
                        .collect()
                })
                .unwrap_or_default()
            }
            Err(e) => {
                debug!("Could not parse boilerplate templates: {}", e);
                Vec::new()
            }
        };
        trace!("Computed {} canonical method fingerprints", fingerprints.len());
        fingerprints
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn first_method_fingerprint(source: &str) -> Option<MethodFingerprint> {
        let tree = parse_code(source).unwrap();
        let class = named_children(tree.root())[0];
        let body = class.child_by_field_name("body").unwrap();
        named_children(body)
            .into_iter()
            .find_map(|m| MethodFingerprint::of(&tree, m))
    }

    #[test]
    fn test_canonical_set_is_populated() {
        assert_eq!(canonical_fingerprints().len(), 4);
    }

    #[test]
    fn test_generated_equals_is_canonical_regardless_of_names() {
        let fp = first_method_fingerprint(indoc! {r#"
            class Book {
                @Override
                public boolean equals(Object o) {
                    if (this == o) return true;
                    if (!(o instanceof Book)) return false;
                    Book other = (Book) o;
                    return Objects.equals(isbn, other.isbn);
                }
            }
        "#})
        .unwrap();
        assert_eq!(fp.parameter_types, vec!["Object"]);
        assert!(fp.is_canonical());
    }

    #[test]
    fn test_user_equals_is_not_canonical() {
        let fp = first_method_fingerprint(indoc! {r#"
            class Book {
                public boolean equals(Object o) {
                    return o instanceof Book b && title.equals(b.title);
                }
            }
        "#})
        .unwrap();
        assert!(!fp.is_canonical());
    }

    #[test]
    fn test_hash_code_shape() {
        let fp = first_method_fingerprint(indoc! {r#"
            class Book {
                public int hashCode() {
                    return Objects.hash(id, isbn, edition);
                }
            }
        "#})
        .unwrap();
        assert_eq!(
            fp.statements,
            vec![StatementShape {
                kind: "return_statement".to_string(),
                detail: Some("call:hash".to_string()),
            }]
        );
        assert!(fp.is_canonical());
    }

    #[test]
    fn test_abstract_method_has_no_fingerprint() {
        assert!(first_method_fingerprint("abstract class A { abstract int size(); }").is_none());
    }
}
