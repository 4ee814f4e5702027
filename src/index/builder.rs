//! Builds a [`TypeDeclaration`] from a syntax tree
//!
//! Every region is located through the query table: package, imports, the outer type, its
//! annotations, fields and methods. Member queries are anchored to the outer type's body
//! (and an enum's declaration section) so inner types never leak into the index. The
//! remaining tree walking is limited to small, local decisions: modifier keywords,
//! annotation arguments and insertion anchors.

use std::ops::Range;

use tree_sitter::Node as TsNode;
use tracing::{debug, trace};

use super::fingerprint::{parameter_types, MethodFingerprint};
use super::model::{
    simple_name, AnnotationArgument, AnnotationUsage, AttributeCategory, AttributeInfo, ImportEntry,
    ImportSet, Layout, MemberAnchor, MethodInfo, MethodOrigin, RelationshipKind, TypeDeclaration,
    TypeKind, Visibility,
};
use super::resolver::TypeResolver;
use crate::errors::EngineError;
use crate::parsers::java::{children, kind_ids, named_children};
use crate::parsers::SyntaxTree;
use crate::query::{Anchor, CaptureRole, QueryEngine, QueryType};

/// Generic wrappers treated as collection-valued
const COLLECTION_TYPES: &[&str] = &[
    "Collection", "List", "Set", "SortedSet", "NavigableSet", "Map", "SortedMap", "Queue",
    "Deque", "ArrayList", "LinkedList", "HashSet", "LinkedHashSet", "TreeSet", "HashMap",
    "LinkedHashMap", "TreeMap",
];

pub struct IndexBuilder<'a> {
    engine: &'a QueryEngine,
    resolver: &'a dyn TypeResolver,
    default_indent: &'a str,
}

impl<'a> IndexBuilder<'a> {
    pub fn new(engine: &'a QueryEngine, resolver: &'a dyn TypeResolver) -> Self {
        Self {
            engine,
            resolver,
            default_indent: "    ",
        }
    }

    /// Indentation used when the file has no member to copy it from
    pub fn with_default_indent(mut self, indent: &'a str) -> Self {
        self.default_indent = indent;
        self
    }

    pub fn build(&self, tree: &SyntaxTree) -> Result<TypeDeclaration, EngineError> {
        let root = tree.root();

        let (package, package_span) = match self.engine.first(tree, QueryType::Package, root)? {
            Some(m) => (
                m.get(&CaptureRole::PackageName)
                    .map(|c| strip_whitespace(c.text(tree.source()))),
                m.get(&CaptureRole::Package).map(|c| c.byte_range.clone()),
            ),
            None => (None, None),
        };

        let imports = self.imports(tree)?;

        let declaration = self
            .engine
            .first(tree, QueryType::TypeDeclaration, root)?
            .ok_or(EngineError::NotATypeDeclaration)?;
        let (decl_node, kind) = declaration
            .captures
            .iter()
            .find_map(|c| match c.role {
                CaptureRole::TypeDeclaration(kind) => Some((c.node, kind)),
                _ => None,
            })
            .ok_or(EngineError::NotATypeDeclaration)?;
        let name = declaration
            .get(&CaptureRole::TypeName)
            .map(|c| c.text(tree.source()).to_string())
            .ok_or(EngineError::NotATypeDeclaration)?;
        let body = declaration
            .get(&CaptureRole::TypeBody)
            .map(|c| c.node)
            .ok_or(EngineError::NotATypeDeclaration)?;

        debug!("Indexing {} {}", kind, name);

        let annotations = match modifiers_of(decl_node) {
            Some(modifiers) => self.annotations(tree, modifiers)?,
            None => Vec::new(),
        };

        // Members live directly in the body, or for enums in the `;` declaration section
        let declarations_section = (kind == TypeKind::Enum)
            .then(|| {
                named_children(body)
                    .into_iter()
                    .find(|n| kind_ids::is_enum_body_declarations(n.kind_id()))
            })
            .flatten();
        let containers: Vec<TsNode<'_>> = std::iter::once(body).chain(declarations_section).collect();
        let members = Anchor::direct_child_of(&containers);

        let (attributes, field_nodes) = self.attributes(tree, body, &members)?;
        let methods = self.methods(tree, body, &members)?;

        let declaration_indent = tree.indentation_of(decl_node).unwrap_or("").to_string();
        let member_indent = first_member_indent(tree, &containers)
            .unwrap_or_else(|| format!("{}{}", declaration_indent, self.default_indent));
        let member_anchor =
            member_anchor(tree, kind, body, declarations_section, &field_nodes, &declaration_indent);
        let import_anchor = import_anchor(root);

        trace!(
            "{}: {} attributes, {} methods, {} imports, anchor {:?}",
            name,
            attributes.len(),
            methods.len(),
            imports.len(),
            member_anchor
        );

        Ok(TypeDeclaration {
            package,
            package_span,
            name,
            kind,
            span: decl_node.start_byte()..decl_node.end_byte(),
            body_span: body.start_byte()..body.end_byte(),
            annotations,
            attributes,
            methods,
            imports,
            member_anchor,
            import_anchor,
            declaration_indent,
            layout: Layout {
                indent: member_indent,
                newline: tree.newline(),
            },
        })
    }

    fn imports(&self, tree: &SyntaxTree) -> Result<ImportSet, EngineError> {
        let mut set = ImportSet::new();
        let captures =
            self.engine
                .captures(tree, QueryType::Imports, tree.root(), &Anchor::Anywhere, &CaptureRole::Import)?;
        for capture in captures {
            if let Some(entry) = parse_import(capture.text(tree.source()), capture.byte_range.clone()) {
                set.insert(entry);
            }
        }
        Ok(set)
    }

    /// Annotations directly inside one `modifiers` node, in source order
    fn annotations(
        &self,
        tree: &SyntaxTree,
        modifiers: TsNode<'_>,
    ) -> Result<Vec<AnnotationUsage>, EngineError> {
        let matches = self.engine.matches(
            tree,
            QueryType::Annotations,
            modifiers,
            &Anchor::direct_child_of(&[modifiers]),
        )?;
        Ok(matches
            .iter()
            .filter_map(|m| {
                let annotation = m.get(&CaptureRole::Annotation)?;
                let name = strip_whitespace(m.get(&CaptureRole::AnnotationName)?.text(tree.source()));
                let arguments = m
                    .get(&CaptureRole::AnnotationArguments)
                    .map(|args| annotation_arguments(tree, args.node))
                    .unwrap_or_default();
                Some(AnnotationUsage {
                    name,
                    arguments,
                    span: annotation.byte_range.clone(),
                })
            })
            .collect())
    }

    fn attributes<'t>(
        &self,
        tree: &'t SyntaxTree,
        body: TsNode<'t>,
        members: &Anchor,
    ) -> Result<(Vec<AttributeInfo>, Vec<TsNode<'t>>), EngineError> {
        let mut attributes: Vec<AttributeInfo> = Vec::new();
        let mut field_nodes: Vec<TsNode<'t>> = Vec::new();

        for m in self.engine.matches(tree, QueryType::Fields, body, members)? {
            let (Some(field), Some(ty), Some(name)) = (
                m.get(&CaptureRole::Field),
                m.get(&CaptureRole::FieldType),
                m.get(&CaptureRole::FieldName),
            ) else {
                continue;
            };
            if field_nodes.last().is_none_or(|last| last.id() != field.node.id()) {
                field_nodes.push(field.node);
            }

            let name = name.text(tree.source()).to_string();
            if attributes.iter().any(|a| a.name == name) {
                trace!("Ignoring redeclared field {}", name);
                continue;
            }

            let modifiers = modifiers_of(field.node);
            let annotations = match modifiers {
                Some(modifiers) => self.annotations(tree, modifiers)?,
                None => Vec::new(),
            };
            let declared_type = strip_redundant_whitespace(ty.text(tree.source()));
            let category = self.categorize(&annotations, ty.node, tree);

            attributes.push(AttributeInfo {
                name,
                collection: is_collection(tree, ty.node),
                declared_type,
                annotations,
                visibility: modifiers.map_or(Visibility::PackagePrivate, visibility_of),
                category,
                span: field.byte_range.clone(),
            });
        }
        Ok((attributes, field_nodes))
    }

    fn categorize(
        &self,
        annotations: &[AnnotationUsage],
        ty: TsNode<'_>,
        tree: &SyntaxTree,
    ) -> AttributeCategory {
        let names: Vec<&str> = annotations.iter().map(|a| a.simple_name()).collect();
        if names.iter().any(|n| *n == "Id" || *n == "EmbeddedId") {
            return AttributeCategory::Identifier;
        }
        if let Some(kind) = names.iter().find_map(|n| RelationshipKind::from_annotation(n)) {
            return AttributeCategory::Relationship(kind);
        }
        if names.contains(&"Enumerated") {
            return AttributeCategory::Enumerated;
        }
        let plain = !kind_ids::is_generic_type(ty.kind_id()) && !kind_ids::is_array_type(ty.kind_id());
        if plain {
            let type_name = simple_name(tree.text(ty));
            if self
                .resolver
                .resolve(type_name)
                .is_some_and(|resolved| resolved.kind == TypeKind::Enum)
            {
                return AttributeCategory::Enumerated;
            }
        }
        AttributeCategory::Basic
    }

    fn methods(
        &self,
        tree: &SyntaxTree,
        body: TsNode<'_>,
        members: &Anchor,
    ) -> Result<Vec<MethodInfo>, EngineError> {
        let mut methods = Vec::new();
        for m in self.engine.matches(tree, QueryType::Methods, body, members)? {
            let (Some(method), Some(ty), Some(name)) = (
                m.get(&CaptureRole::Method),
                m.get(&CaptureRole::MethodType),
                m.get(&CaptureRole::MethodName),
            ) else {
                continue;
            };
            let origin = match MethodFingerprint::of(tree, method.node) {
                Some(fp) if fp.is_canonical() => MethodOrigin::Generated,
                _ => MethodOrigin::UserAuthored,
            };
            methods.push(MethodInfo {
                name: name.text(tree.source()).to_string(),
                return_type: strip_redundant_whitespace(ty.text(tree.source())),
                parameter_types: parameter_types(tree, method.node),
                span: method.byte_range.clone(),
                body_span: method
                    .node
                    .child_by_field_name("body")
                    .map(|b| b.start_byte()..b.end_byte()),
                origin,
                text: method.text(tree.source()).to_string(),
            });
        }
        Ok(methods)
    }
}

fn modifiers_of(node: TsNode<'_>) -> Option<TsNode<'_>> {
    named_children(node)
        .into_iter()
        .find(|c| kind_ids::is_modifiers(c.kind_id()))
}

fn visibility_of(modifiers: TsNode<'_>) -> Visibility {
    for token in children(modifiers) {
        match token.kind() {
            "public" => return Visibility::Public,
            "protected" => return Visibility::Protected,
            "private" => return Visibility::Private,
            _ => {}
        }
    }
    Visibility::PackagePrivate
}

fn annotation_arguments(tree: &SyntaxTree, list: TsNode<'_>) -> Vec<AnnotationArgument> {
    let mut arguments: Vec<AnnotationArgument> = named_children(list)
        .into_iter()
        .filter(|n| !kind_ids::is_comment(n.kind_id()))
        .map(|n| {
            if kind_ids::is_element_value_pair(n.kind_id()) {
                let key = n.child_by_field_name("key").map_or("", |k| tree.text(k));
                let value = n.child_by_field_name("value").map_or("", |v| tree.text(v));
                AnnotationArgument::new(key, value)
            } else {
                AnnotationArgument::new("value", tree.text(n))
            }
        })
        .collect();
    arguments.sort();
    arguments
}

fn is_collection(tree: &SyntaxTree, ty: TsNode<'_>) -> bool {
    if kind_ids::is_array_type(ty.kind_id()) {
        return true;
    }
    if !kind_ids::is_generic_type(ty.kind_id()) {
        return false;
    }
    named_children(ty)
        .into_iter()
        .next()
        .is_some_and(|base| COLLECTION_TYPES.contains(&simple_name(tree.text(base))))
}

/// `import static a.b.C.*;` -> (`a.b.C`, static, wildcard)
fn parse_import(text: &str, span: Range<usize>) -> Option<ImportEntry> {
    let body = text.trim().strip_prefix("import")?.trim().trim_end_matches(';').trim();
    let (is_static, body) = match body.strip_prefix("static") {
        Some(rest) if rest.starts_with(char::is_whitespace) => (true, rest),
        _ => (false, body),
    };
    let path = strip_whitespace(body);
    let (path, wildcard) = match path.strip_suffix(".*") {
        Some(package) => (package.to_string(), true),
        None => (path, false),
    };
    (!path.is_empty()).then_some(ImportEntry {
        path,
        is_static,
        wildcard,
        span,
    })
}

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Collapses whitespace runs (line breaks included) to single spaces
fn strip_redundant_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Indentation of the first member that starts its own line
fn first_member_indent(tree: &SyntaxTree, containers: &[TsNode<'_>]) -> Option<String> {
    containers
        .iter()
        .flat_map(|c| named_children(*c))
        .filter(|n| !kind_ids::is_comment(n.kind_id()) && !kind_ids::is_enum_body_declarations(n.kind_id()))
        .find_map(|n| tree.indentation_of(n).filter(|i| !i.is_empty()).map(str::to_string))
}

/// End of `node`, or of a comment that follows it on the same line. The comment is found by
/// position since it need not be a sibling (after an enum's `;` it trails the section).
fn past_trailing_comment(tree: &SyntaxTree, node: TsNode<'_>) -> usize {
    let end = node.end_byte();
    let rest = &tree.source()[end..];
    let start = end + (rest.len() - rest.trim_start_matches([' ', '\t']).len());
    match tree.root().descendant_for_byte_range(start, start) {
        Some(next) if kind_ids::is_comment(next.kind_id()) && next.start_byte() == start => next.end_byte(),
        _ => end,
    }
}

fn member_anchor(
    tree: &SyntaxTree,
    kind: TypeKind,
    body: TsNode<'_>,
    declarations_section: Option<TsNode<'_>>,
    fields: &[TsNode<'_>],
    declaration_indent: &str,
) -> MemberAnchor {
    if let Some(last) = fields.last() {
        let offset = past_trailing_comment(tree, *last);
        let annotated = modifiers_of(*last).is_some_and(|m| named_children(m).iter().any(|a| kind_ids::is_annotation(a.kind_id())));
        let compact = !annotated && last.start_position().row == last.end_position().row;
        return MemberAnchor::AfterMember { offset, compact };
    }

    if kind == TypeKind::Enum {
        if let Some(section) = declarations_section {
            // The section starts with its `;`
            let semicolon = children(section).into_iter().find(|t| t.kind() == ";");
            let offset = semicolon.map_or(section.start_byte(), |t| past_trailing_comment(tree, t));
            return MemberAnchor::AfterMember { offset, compact: false };
        }
        let last_constant = children(body)
            .into_iter()
            .filter(|n| kind_ids::is_enum_constant(n.kind_id()) || n.kind() == ",")
            .last();
        if let Some(last) = last_constant {
            return MemberAnchor::AfterEnumConstants {
                semicolon: last.end_byte(),
                offset: past_trailing_comment(tree, last),
            };
        }
    }

    let open = body.start_byte() + 1;
    let close = body.end_byte().saturating_sub(1).max(open);
    let interior = &tree.source()[open..close];
    if interior.trim().is_empty() {
        MemberAnchor::EmptyBody {
            interior: open..close,
            closing_indent: declaration_indent.to_string(),
            enum_section: kind == TypeKind::Enum,
        }
    } else {
        let followed_by_newline = interior
            .chars()
            .take_while(|c| c.is_whitespace())
            .any(|c| c == '\n');
        MemberAnchor::OpenBody {
            offset: open,
            followed_by_newline,
        }
    }
}

/// Start of the first top-level declaration, or of the doc comment directly above it
fn import_anchor(root: TsNode<'_>) -> usize {
    let nodes = named_children(root);
    let Some(index) = nodes.iter().position(|n| !kind_ids::is_comment(n.kind_id())) else {
        return root.end_byte();
    };
    match index.checked_sub(1).map(|i| nodes[i]) {
        Some(previous) if previous.kind() == "block_comment" && previous.end_position().row + 1 >= nodes[index].start_position().row => {
            previous.start_byte()
        }
        _ => nodes[index].start_byte(),
    }
}
