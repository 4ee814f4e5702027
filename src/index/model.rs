//! Lightweight model of one Java source file
//!
//! Everything here is owned data (names, types, byte ranges): a [`TypeDeclaration`] outlives
//! the syntax tree it was derived from, which keeps the planner a pure function of it.

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Kind of a Java type declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
}

impl TypeKind {
    /// Declaration keyword, `@interface` for annotation types
    pub fn keyword(&self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
            TypeKind::Enum => "enum",
            TypeKind::Record => "record",
            TypeKind::Annotation => "@interface",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "class" => Some(TypeKind::Class),
            "interface" => Some(TypeKind::Interface),
            "enum" => Some(TypeKind::Enum),
            "record" => Some(TypeKind::Record),
            "annotation" | "@interface" => Some(TypeKind::Annotation),
            _ => None,
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKind::Annotation => write!(f, "annotation"),
            other => write!(f, "{}", other.keyword()),
        }
    }
}

impl std::str::FromStr for TypeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypeKind::from_keyword(s).ok_or_else(|| format!("unknown type kind `{}`", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Protected,
    Private,
    PackagePrivate,
}

/// Association cardinality carried by a relationship attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationshipKind {
    ManyToOne,
    OneToOne,
    OneToMany,
    ManyToMany,
}

impl RelationshipKind {
    pub fn annotation_name(&self) -> &'static str {
        match self {
            RelationshipKind::ManyToOne => "ManyToOne",
            RelationshipKind::OneToOne => "OneToOne",
            RelationshipKind::OneToMany => "OneToMany",
            RelationshipKind::ManyToMany => "ManyToMany",
        }
    }

    pub fn from_annotation(simple_name: &str) -> Option<Self> {
        match simple_name {
            "ManyToOne" => Some(RelationshipKind::ManyToOne),
            "OneToOne" => Some(RelationshipKind::OneToOne),
            "OneToMany" => Some(RelationshipKind::OneToMany),
            "ManyToMany" => Some(RelationshipKind::ManyToMany),
            _ => None,
        }
    }

    /// True for the collection-valued sides
    pub fn is_to_many(&self) -> bool {
        matches!(self, RelationshipKind::OneToMany | RelationshipKind::ManyToMany)
    }
}

impl std::str::FromStr for RelationshipKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "many-to-one" => Ok(RelationshipKind::ManyToOne),
            "one-to-one" => Ok(RelationshipKind::OneToOne),
            "one-to-many" => Ok(RelationshipKind::OneToMany),
            "many-to-many" => Ok(RelationshipKind::ManyToMany),
            _ => Err(format!("unknown relationship kind `{}`", s)),
        }
    }
}

/// One `key = value` pair of an annotation, value whitespace-normalized
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct AnnotationArgument {
    pub key: String,
    pub value: String,
}

impl AnnotationArgument {
    pub fn new(key: impl Into<String>, value: &str) -> Self {
        Self {
            key: key.into(),
            value: normalize_value(value),
        }
    }
}

/// An annotation usage on a type or field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationUsage {
    /// Name as written, possibly qualified (`jakarta.persistence.Id`)
    pub name: String,
    /// Sorted by key; a single unnamed element is keyed `value`
    pub arguments: Vec<AnnotationArgument>,
    pub span: Range<usize>,
}

impl AnnotationUsage {
    pub fn simple_name(&self) -> &str {
        simple_name(&self.name)
    }

    /// Same simple name and the same normalized arguments. Differing optional arguments
    /// make two usages distinct.
    pub fn is_equivalent(&self, name: &str, arguments: &[AnnotationArgument]) -> bool {
        if self.simple_name() != simple_name(name) || self.arguments.len() != arguments.len() {
            return false;
        }
        let mut theirs = arguments.to_vec();
        theirs.sort();
        self.arguments == theirs
    }
}

/// How an attribute participates in the persistence mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeCategory {
    Identifier,
    Relationship(RelationshipKind),
    Enumerated,
    Basic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeInfo {
    pub name: String,
    /// Declared type as written (`List<Book>`, `java.time.LocalDate`)
    pub declared_type: String,
    /// `List<..>`, `Set<..>`, `Map<..>`, arrays
    pub collection: bool,
    pub annotations: Vec<AnnotationUsage>,
    pub visibility: Visibility,
    pub category: AttributeCategory,
    /// The whole `field_declaration`, shared by every declarator of `int a, b;`
    pub span: Range<usize>,
}

impl AttributeInfo {
    pub fn has_annotation(&self, simple: &str) -> bool {
        self.annotations.iter().any(|a| a.simple_name() == simple)
    }

    pub fn is_identifier(&self) -> bool {
        self.category == AttributeCategory::Identifier
            || (matches!(self.category, AttributeCategory::Relationship(_)) && self.has_annotation("Id"))
    }
}

/// Whether the engine may replace a method wholesale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodOrigin {
    /// Matches the structural fingerprint of boilerplate this engine emits
    Generated,
    UserAuthored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodInfo {
    pub name: String,
    pub return_type: String,
    pub parameter_types: Vec<String>,
    /// The whole `method_declaration`, modifiers and annotations included
    pub span: Range<usize>,
    pub body_span: Option<Range<usize>>,
    pub origin: MethodOrigin,
    /// Source text of `span`
    pub text: String,
}

impl MethodInfo {
    pub fn arity(&self) -> usize {
        self.parameter_types.len()
    }

    pub fn matches(&self, name: &str, arity: usize) -> bool {
        self.name == name && self.arity() == arity
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEntry {
    /// Imported name without `import`, `static`, `.*` or `;`
    pub path: String,
    pub is_static: bool,
    pub wildcard: bool,
    pub span: Range<usize>,
}

/// Imports of one file, in source order, without duplicates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSet {
    entries: Vec<ImportEntry>,
}

impl ImportSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry unless an identical one (same path and flags) is already present.
    /// Returns whether it was added.
    pub fn insert(&mut self, entry: ImportEntry) -> bool {
        let duplicate = self.entries.iter().any(|e| {
            e.path == entry.path && e.is_static == entry.is_static && e.wildcard == entry.wildcard
        });
        if !duplicate {
            self.entries.push(entry);
        }
        !duplicate
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImportEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact single-type import present
    pub fn contains(&self, qualified: &str) -> bool {
        self.entries
            .iter()
            .any(|e| !e.is_static && !e.wildcard && e.path == qualified)
    }

    /// Whether `qualified` is already visible through an exact or on-demand import
    pub fn covers(&self, qualified: &str) -> bool {
        let package = package_of(qualified);
        self.entries.iter().any(|e| {
            !e.is_static && ((!e.wildcard && e.path == qualified) || (e.wildcard && e.path == package))
        })
    }

    /// Single-type, non-static entries (the block new imports are sorted into)
    pub fn regular(&self) -> impl Iterator<Item = &ImportEntry> {
        self.entries.iter().filter(|e| !e.is_static)
    }

    /// Rendered paths, `static`/`.*` spelled out
    pub fn paths(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| {
                let mut path = String::new();
                if e.is_static {
                    path.push_str("static ");
                }
                path.push_str(&e.path);
                if e.wildcard {
                    path.push_str(".*");
                }
                path
            })
            .collect()
    }
}

/// Where new field declarations (and generated methods following them) go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberAnchor {
    /// Right after an existing member (the last field, or an enum's `;`), at `offset`.
    /// `compact` is true when that member is a single-line field without annotations.
    AfterMember { offset: usize, compact: bool },
    /// Body has members but no fields: insert right after `{`
    OpenBody { offset: usize, followed_by_newline: bool },
    /// Body holds nothing but whitespace: its interior is replaced. `enum_section` is set
    /// for an enum without constants, whose members must follow a lone `;`.
    EmptyBody {
        interior: Range<usize>,
        closing_indent: String,
        enum_section: bool,
    },
    /// Enum without a `;` member section: `;` goes right after the last constant (or its
    /// trailing comma) at `semicolon`, the members at `offset`, past a same-line comment
    AfterEnumConstants { semicolon: usize, offset: usize },
}

/// Formatting conventions detected in the file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Indentation of one member line
    pub indent: String,
    pub newline: &'static str,
}

/// Index of the outermost type declaration of one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDeclaration {
    pub package: Option<String>,
    pub package_span: Option<Range<usize>>,
    pub name: String,
    pub kind: TypeKind,
    /// The whole declaration, modifiers included
    pub span: Range<usize>,
    /// Body including braces
    pub body_span: Range<usize>,
    /// Annotations on the type itself, in source order
    pub annotations: Vec<AnnotationUsage>,
    pub attributes: Vec<AttributeInfo>,
    pub methods: Vec<MethodInfo>,
    pub imports: ImportSet,
    pub member_anchor: MemberAnchor,
    /// Where a fresh import block goes when the file has neither package nor imports
    pub import_anchor: usize,
    /// Indentation of the line holding the declaration
    pub declaration_indent: String,
    pub layout: Layout,
}

impl TypeDeclaration {
    pub fn attribute(&self, name: &str) -> Option<&AttributeInfo> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn identifier_attributes(&self) -> impl Iterator<Item = &AttributeInfo> {
        self.attributes.iter().filter(|a| a.is_identifier())
    }

    pub fn method(&self, name: &str, arity: usize) -> Option<&MethodInfo> {
        self.methods.iter().find(|m| m.matches(name, arity))
    }

    pub fn has_annotation(&self, simple: &str) -> bool {
        self.annotations.iter().any(|a| a.simple_name() == simple)
    }

    pub fn qualified_name(&self) -> String {
        match &self.package {
            Some(package) => format!("{}.{}", package, self.name),
            None => self.name.clone(),
        }
    }

    pub fn package_name(&self) -> &str {
        self.package.as_deref().unwrap_or("")
    }
}

/// Last segment of a possibly qualified name
pub fn simple_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// Everything before the last `.`, empty for simple names
pub fn package_of(qualified: &str) -> &str {
    qualified.rsplit_once('.').map_or("", |(package, _)| package)
}

/// Drop whitespace outside string and character literals
pub fn normalize_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for c in value.chars() {
        match quote {
            Some(q) => {
                out.push(c);
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                }
            }
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                out.push(c);
            }
            None if c.is_whitespace() => {}
            None => out.push(c),
        }
    }
    out
}
