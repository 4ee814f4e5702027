//! Query type definitions and capture metadata
//!
//! Defines the structural queries the engine runs against Java syntax trees and the
//! logical roles their captures play.

use std::ops::Range;

use tree_sitter::Node as TsNode;

use crate::index::TypeKind;

/// Structural queries, one `.scm` file each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueryType {
    /// Package clause (package.scm)
    Package,
    /// Top-level import statements (imports.scm)
    Imports,
    /// Outermost type declaration (type_declaration.scm)
    TypeDeclaration,
    /// Field declarations (fields.scm)
    Fields,
    /// Method declarations (methods.scm)
    Methods,
    /// Annotation usages (annotations.scm)
    Annotations,
}

impl QueryType {
    pub const ALL: [QueryType; 6] = [
        QueryType::Package,
        QueryType::Imports,
        QueryType::TypeDeclaration,
        QueryType::Fields,
        QueryType::Methods,
        QueryType::Annotations,
    ];

    /// Get the standard filename for this query type
    pub fn filename(&self) -> &'static str {
        match self {
            QueryType::Package => "package.scm",
            QueryType::Imports => "imports.scm",
            QueryType::TypeDeclaration => "type_declaration.scm",
            QueryType::Fields => "fields.scm",
            QueryType::Methods => "methods.scm",
            QueryType::Annotations => "annotations.scm",
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            QueryType::Package => "package clause",
            QueryType::Imports => "import statements",
            QueryType::TypeDeclaration => "type declaration",
            QueryType::Fields => "field declarations",
            QueryType::Methods => "method declarations",
            QueryType::Annotations => "annotations",
        }
    }

    /// Whether a capture plays the role that anchors one match of this query (the whole
    /// field, the whole method, ...). Anchoring and deduplication are decided on it.
    pub fn is_primary(&self, role: &CaptureRole) -> bool {
        match self {
            QueryType::Package => *role == CaptureRole::Package,
            QueryType::Imports => *role == CaptureRole::Import,
            QueryType::TypeDeclaration => matches!(role, CaptureRole::TypeDeclaration(_)),
            QueryType::Fields => *role == CaptureRole::Field,
            QueryType::Methods => *role == CaptureRole::Method,
            QueryType::Annotations => *role == CaptureRole::Annotation,
        }
    }
}

/// Logical role of a capture, parsed from its capture name
///
/// Capture names use dotted notation: `@type.body`, `@field.name`, `@annotation`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureRole {
    Package,
    PackageName,
    Import,
    /// `@type.class`, `@type.enum`, ...
    TypeDeclaration(TypeKind),
    TypeName,
    TypeBody,
    Field,
    FieldType,
    FieldName,
    Method,
    MethodType,
    MethodName,
    Annotation,
    AnnotationName,
    AnnotationArguments,
    /// Unknown/custom capture name
    Other(String),
}

impl CaptureRole {
    /// Parse a capture name into a CaptureRole
    pub fn from_name(name: &str) -> Self {
        let parts: Vec<&str> = name.split('.').collect();

        match parts.as_slice() {
            ["package"] => Self::Package,
            ["package", "name"] => Self::PackageName,
            ["import"] => Self::Import,
            ["type", "name"] => Self::TypeName,
            ["type", "body"] => Self::TypeBody,
            ["type", kind] => match TypeKind::from_keyword(kind) {
                Some(kind) => Self::TypeDeclaration(kind),
                None => Self::Other(name.to_string()),
            },
            ["field"] => Self::Field,
            ["field", "type"] => Self::FieldType,
            ["field", "name"] => Self::FieldName,
            ["method"] => Self::Method,
            ["method", "type"] => Self::MethodType,
            ["method", "name"] => Self::MethodName,
            ["annotation"] => Self::Annotation,
            ["annotation", "name"] => Self::AnnotationName,
            ["annotation", "arguments"] => Self::AnnotationArguments,
            _ => Self::Other(name.to_string()),
        }
    }
}

/// A captured node from a query match
#[derive(Debug, Clone)]
pub struct Capture<'tree> {
    /// The Tree-Sitter node that was captured
    pub node: TsNode<'tree>,
    pub role: CaptureRole,
    /// Byte range in the source code
    pub byte_range: Range<usize>,
}

impl<'tree> Capture<'tree> {
    pub fn new(node: TsNode<'tree>, role: CaptureRole) -> Self {
        Self {
            node,
            role,
            byte_range: node.start_byte()..node.end_byte(),
        }
    }

    /// Get the text content of the capture
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.byte_range.clone()).unwrap_or("")
    }
}

/// All captures produced by one pattern match
#[derive(Debug, Clone)]
pub struct QueryMatch<'tree> {
    pub captures: Vec<Capture<'tree>>,
}

impl<'tree> QueryMatch<'tree> {
    /// First capture with the given role
    pub fn get(&self, role: &CaptureRole) -> Option<&Capture<'tree>> {
        self.captures.iter().find(|c| &c.role == role)
    }

    /// The node playing the primary role of `query_type` in this match
    pub fn primary(&self, query_type: QueryType) -> Option<&Capture<'tree>> {
        self.captures.iter().find(|c| query_type.is_primary(&c.role))
    }
}
