//! Transformation planner
//!
//! Each operation is a pure function of a [`TypeDeclaration`] and its parameters that yields
//! an [`EditPlan`] plus warnings. Idempotency is decided here: an element that already
//! exists (field by name, import by qualified name, annotation by simple name and
//! arguments) is left out of the plan instead of being duplicated.

pub mod attributes;
pub mod create;
pub mod imports;
pub mod members;
pub mod methods;
pub mod templates;

pub use create::{create_type, CreateTypeRequest, NewTypeFile};

use std::str::FromStr;

use tracing::debug;

use crate::config::EngineConfig;
use crate::edit::{EditPlan, TextEdit};
use crate::errors::{EngineError, Warning};
use crate::index::{
    simple_name, AnnotationArgument, RelationshipKind, TypeDeclaration, TypeKind, TypeResolver,
};

use attributes::{resolve_enum, type_imports, AnnotationSpec, Vocabulary};
use members::MemberBlock;
use methods::{plan_equals_hash_code, MethodPlan, OBJECTS_IMPORT};

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Identifier,
    Basic,
    Enumerated,
}

impl FromStr for AttributeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "identifier" | "id" => Ok(AttributeKind::Identifier),
            "basic" => Ok(AttributeKind::Basic),
            "enum" | "enumerated" => Ok(AttributeKind::Enumerated),
            _ => Err(format!("unknown attribute kind `{}`", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStrategy {
    Identity,
    Sequence,
    Uuid,
    Auto,
}

impl FromStr for GenerationStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "identity" => Ok(GenerationStrategy::Identity),
            "sequence" => Ok(GenerationStrategy::Sequence),
            "uuid" => Ok(GenerationStrategy::Uuid),
            "auto" => Ok(GenerationStrategy::Auto),
            _ => Err(format!("unknown generation strategy `{}`", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumStorage {
    #[default]
    String,
    Ordinal,
}

impl FromStr for EnumStorage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "string" => Ok(EnumStorage::String),
            "ordinal" => Ok(EnumStorage::Ordinal),
            _ => Err(format!("unknown enum storage `{}`", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchType {
    Lazy,
    Eager,
}

impl FromStr for FetchType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lazy" => Ok(FetchType::Lazy),
            "eager" => Ok(FetchType::Eager),
            _ => Err(format!("unknown fetch type `{}`", s)),
        }
    }
}

/// Entity operations an association cascades to its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CascadeType {
    Persist,
    Merge,
    Remove,
    Refresh,
    Detach,
}

impl CascadeType {
    pub const ALL: [CascadeType; 5] = [
        CascadeType::Persist,
        CascadeType::Merge,
        CascadeType::Remove,
        CascadeType::Refresh,
        CascadeType::Detach,
    ];
}

impl FromStr for CascadeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "persist" => Ok(CascadeType::Persist),
            "merge" => Ok(CascadeType::Merge),
            "remove" => Ok(CascadeType::Remove),
            "refresh" => Ok(CascadeType::Refresh),
            "detach" => Ok(CascadeType::Detach),
            _ => Err(format!("unknown cascade type `{}`", s)),
        }
    }
}

/// Collection interface of a to-many field. Sets are initialized with `LinkedHashSet`,
/// lists with `ArrayList`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollectionType {
    #[default]
    Set,
    List,
}

impl CollectionType {
    /// Interface and implementation, fully qualified
    fn types(&self) -> (&'static str, &'static str) {
        match self {
            CollectionType::Set => ("java.util.Set", "java.util.LinkedHashSet"),
            CollectionType::List => ("java.util.List", "java.util.ArrayList"),
        }
    }
}

impl FromStr for CollectionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "set" => Ok(CollectionType::Set),
            "list" => Ok(CollectionType::List),
            _ => Err(format!("unknown collection type `{}`", s)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeOptions {
    pub column_name: Option<String>,
    pub length: Option<u32>,
    pub unique: bool,
    /// Identifier attributes only
    pub generation: Option<GenerationStrategy>,
    /// Enum-typed attributes only
    pub enum_storage: EnumStorage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRequest {
    pub kind: AttributeKind,
    pub name: String,
    pub declared_type: String,
    pub nullable: bool,
    pub options: AttributeOptions,
}

impl AttributeRequest {
    pub fn new(kind: AttributeKind, name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            declared_type: declared_type.into(),
            nullable: true,
            options: AttributeOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipOptions {
    pub fetch: Option<FetchType>,
    pub join_column: Option<String>,
    pub mapped_by: Option<String>,
    pub nullable: bool,
    /// The association is (part of) the owner's identifier
    pub identifier: bool,
    pub cascade: Vec<CascadeType>,
    /// One-to-one and one-to-many only
    pub orphan_removal: bool,
    /// To-many only
    pub collection: CollectionType,
}

impl Default for RelationshipOptions {
    fn default() -> Self {
        Self {
            fetch: None,
            join_column: None,
            mapped_by: None,
            nullable: true,
            identifier: false,
            cascade: Vec::new(),
            orphan_removal: false,
            collection: CollectionType::Set,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipRequest {
    pub kind: RelationshipKind,
    pub target: String,
    /// Expected package of the target, dotted or slash separated. Empty accepts whatever
    /// the resolver reports.
    pub target_package: String,
    pub field_name: String,
    pub generate_equals_hash_code: bool,
    pub options: RelationshipOptions,
}

impl RelationshipRequest {
    pub fn new(
        kind: RelationshipKind,
        target: impl Into<String>,
        target_package: impl Into<String>,
        field_name: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            target: target.into(),
            target_package: target_package.into(),
            field_name: field_name.into(),
            generate_equals_hash_code: false,
            options: RelationshipOptions::default(),
        }
    }
}

/// A type-level annotation to add, e.g. `@Table(name = "books")`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeAnnotationRequest {
    /// Simple or fully qualified annotation name
    pub name: String,
    /// `(key, value)` pairs, values as Java source (`"\"books\""`)
    pub arguments: Vec<(String, String)>,
}

impl TypeAnnotationRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
        }
    }

    pub fn with_argument(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.arguments.push((key.into(), value.into()));
        self
    }
}

/// Type-level annotations of the persistence API, imported from the configured namespace
const PERSISTENCE_TYPE_ANNOTATIONS: &[&str] = &[
    "Access", "Cacheable", "DiscriminatorColumn", "DiscriminatorValue", "Embeddable", "Entity",
    "EntityListeners", "IdClass", "Inheritance", "MappedSuperclass", "NamedQueries", "NamedQuery",
    "SecondaryTable", "SequenceGenerator", "Table",
];

// ============================================================================
// Validation
// ============================================================================

const JAVA_KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "false", "final", "finally",
    "float", "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long",
    "native", "new", "null", "package", "private", "protected", "public", "return", "short",
    "static", "strictfp", "super", "switch", "synchronized", "this", "throw", "throws",
    "transient", "true", "try", "void", "volatile", "while", "_",
];

pub fn is_java_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        && !JAVA_KEYWORDS.contains(&name)
}

pub fn validate_identifier(name: &str) -> Result<(), EngineError> {
    if is_java_identifier(name) {
        Ok(())
    } else {
        Err(EngineError::InvalidName(name.to_string()))
    }
}

/// Dotted name whose every segment is an identifier
pub fn validate_qualified_name(name: &str) -> Result<(), EngineError> {
    if name.split('.').all(is_java_identifier) {
        Ok(())
    } else {
        Err(EngineError::InvalidName(name.to_string()))
    }
}

/// Loose check of a type expression: identifier characters, generics, arrays, wildcards
pub fn validate_type(declared_type: &str) -> Result<(), EngineError> {
    let allowed = |c: char| c.is_alphanumeric() || "_$.<>[],? ".contains(c);
    let balanced = declared_type.matches('<').count() == declared_type.matches('>').count()
        && declared_type.matches('[').count() == declared_type.matches(']').count();
    let first_word = declared_type
        .split(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$' || c == '.'))
        .next()
        .unwrap_or("");
    let primitive = ["boolean", "byte", "char", "short", "int", "long", "float", "double"].contains(&first_word);
    if !declared_type.trim().is_empty()
        && declared_type.chars().all(allowed)
        && balanced
        && (primitive || validate_qualified_name(first_word).is_ok())
    {
        Ok(())
    } else {
        Err(EngineError::InvalidName(declared_type.to_string()))
    }
}

/// `com/example/model` and `com.example.model.` both become `com.example.model`
pub fn normalize_package(package: &str) -> String {
    package
        .trim()
        .replace(['/', '\\'], ".")
        .trim_matches('.')
        .to_string()
}

// ============================================================================
// Planner
// ============================================================================

/// Edits for one operation plus the non-fatal conditions met while planning
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Planned {
    pub plan: EditPlan,
    pub warnings: Vec<Warning>,
}

/// Collects the pieces of one plan; new members and imports are placed on `finish`
struct Draft<'d> {
    decl: &'d TypeDeclaration,
    plan: EditPlan,
    members: Vec<MemberBlock>,
    imports: Vec<String>,
    /// Edits on the type declaration itself. They are pushed after the imports so that a
    /// fresh import block opened at the same offset comes first.
    declaration_edits: Vec<TextEdit>,
    warnings: Vec<Warning>,
}

impl<'d> Draft<'d> {
    fn new(decl: &'d TypeDeclaration) -> Self {
        Self {
            decl,
            plan: EditPlan::new(),
            members: Vec::new(),
            imports: Vec::new(),
            declaration_edits: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn add_methods(&mut self, methods: MethodPlan) {
        for edit in methods.replacements {
            self.plan.push(edit);
        }
        self.members.extend(methods.new_blocks);
        self.warnings.extend(methods.warnings);
        if methods.uses_objects {
            self.imports.push(OBJECTS_IMPORT.to_string());
        }
    }

    /// Name generated code uses for `qualified`. It is imported unless another type already
    /// owns its simple name in this file, in which case it is spelled out.
    fn reference(&mut self, qualified: &str) -> String {
        if !qualified.contains('.') {
            return qualified.to_string();
        }
        if imports::simple_name_taken(self.decl, qualified) {
            debug!("Simple name of {} is taken in {}, referencing it qualified", qualified, self.decl.name);
            let warning = Warning::QualifiedReference(qualified.to_string());
            if !self.warnings.contains(&warning) {
                self.warnings.push(warning);
            }
            qualified.to_string()
        } else {
            self.imports.push(qualified.to_string());
            simple_name(qualified).to_string()
        }
    }

    /// Renders `specs` in order, referencing their annotations and the constant holders
    /// their arguments use
    fn annotations(&mut self, specs: Vec<AnnotationSpec>, constants: Vec<String>) -> Vec<String> {
        let mut holders = Vec::new();
        for constant in constants {
            let reference = self.reference(&constant);
            if reference == constant {
                holders.push(constant);
            }
        }
        let mut rendered = Vec::with_capacity(specs.len());
        for mut spec in specs {
            if let Some(import) = spec.import.take() {
                spec.name = self.reference(&import);
            }
            for holder in &holders {
                spec.qualify_constant(simple_name(holder), holder);
            }
            rendered.push(spec.render());
        }
        rendered
    }

    fn finish(mut self) -> Planned {
        for edit in members::insertion(self.decl, &self.members) {
            self.plan.push(edit);
        }
        imports::plan_imports(self.decl, &self.imports, &mut self.plan);
        for edit in self.declaration_edits {
            self.plan.push(edit);
        }
        debug!(
            "Planned {} edits, {} new imports, {} warnings for {}",
            self.plan.len(),
            self.plan.added_imports().len(),
            self.warnings.len(),
            self.decl.name
        );
        Planned {
            plan: self.plan,
            warnings: self.warnings,
        }
    }
}

pub struct Planner<'a> {
    config: &'a EngineConfig,
    resolver: &'a dyn TypeResolver,
}

impl<'a> Planner<'a> {
    pub fn new(config: &'a EngineConfig, resolver: &'a dyn TypeResolver) -> Self {
        Self { config, resolver }
    }

    pub fn add_attribute(
        &self,
        decl: &TypeDeclaration,
        request: &AttributeRequest,
    ) -> Result<Planned, EngineError> {
        validate_identifier(&request.name)?;
        validate_type(&request.declared_type)?;
        if !matches!(decl.kind, TypeKind::Class | TypeKind::Enum) {
            return Err(EngineError::UnsupportedTypeKind {
                operation: "AddAttribute",
                kind: decl.kind,
            });
        }

        let mut draft = Draft::new(decl);
        if decl.attribute(&request.name).is_some() {
            draft.warnings.push(Warning::DuplicateAttributeName(request.name.clone()));
            return Ok(draft.finish());
        }

        let (specs, constants) = Vocabulary::new(self.config).attribute(request);
        let rendered = draft.annotations(specs, constants);

        if request.kind == AttributeKind::Enumerated {
            match resolve_enum(&request.declared_type, self.resolver) {
                Some(resolved) if !request.declared_type.contains('.') => {
                    draft.imports.push(resolved.qualified_name(&request.declared_type));
                }
                Some(_) => {}
                None => draft
                    .warnings
                    .push(Warning::UnresolvedEnumType(request.declared_type.clone())),
            }
        } else {
            draft.imports.extend(type_imports(&request.declared_type, self.resolver));
        }

        let text = templates::field_declaration(
            &rendered,
            &request.declared_type,
            &request.name,
            None,
            &decl.layout.indent,
            decl.layout.newline,
        );
        draft.members.push(MemberBlock::field(text));
        Ok(draft.finish())
    }

    pub fn add_relationship(
        &self,
        decl: &TypeDeclaration,
        request: &RelationshipRequest,
    ) -> Result<Planned, EngineError> {
        validate_identifier(&request.field_name)?;
        validate_identifier(&request.target)?;
        if decl.kind != TypeKind::Class {
            return Err(EngineError::UnsupportedTypeKind {
                operation: "AddRelationship",
                kind: decl.kind,
            });
        }

        let expected_package = normalize_package(&request.target_package);
        let resolved = self
            .resolver
            .resolve(&request.target)
            .filter(|r| r.kind == TypeKind::Class)
            .filter(|r| expected_package.is_empty() || r.package == expected_package)
            .ok_or_else(|| EngineError::UnresolvedTargetType(request.target.clone()))?;

        let mut draft = Draft::new(decl);
        let duplicate = decl.attribute(&request.field_name).is_some();
        if duplicate {
            draft
                .warnings
                .push(Warning::DuplicateAttributeName(request.field_name.clone()));
        } else {
            let (specs, constants) = Vocabulary::new(self.config).relationship(request);
            let rendered = draft.annotations(specs, constants);
            let target = draft.reference(&resolved.qualified_name(&request.target));

            let (declared_type, initializer) = if request.kind.is_to_many() {
                let (interface, implementation) = request.options.collection.types();
                let interface = draft.reference(interface);
                let implementation = draft.reference(implementation);
                (format!("{interface}<{target}>"), Some(format!("new {implementation}<>()")))
            } else {
                (target, None)
            };
            let text = templates::field_declaration(
                &rendered,
                &declared_type,
                &request.field_name,
                initializer.as_deref(),
                &decl.layout.indent,
                decl.layout.newline,
            );
            draft.members.push(MemberBlock::field(text));
        }

        if request.generate_equals_hash_code {
            let mut ids: Vec<&str> = decl.identifier_attributes().map(|a| a.name.as_str()).collect();
            if request.options.identifier && !duplicate {
                ids.push(&request.field_name);
            }
            draft.add_methods(plan_equals_hash_code(decl, &ids));
        }
        Ok(draft.finish())
    }

    pub fn regenerate_equals_hash_code(&self, decl: &TypeDeclaration) -> Result<Planned, EngineError> {
        if decl.kind != TypeKind::Class {
            return Err(EngineError::UnsupportedTypeKind {
                operation: "RegenerateEqualsHashCode",
                kind: decl.kind,
            });
        }
        let ids: Vec<&str> = decl.identifier_attributes().map(|a| a.name.as_str()).collect();
        let mut draft = Draft::new(decl);
        draft.add_methods(plan_equals_hash_code(decl, &ids));
        Ok(draft.finish())
    }

    /// Adds a type-level annotation. An equivalent usage makes this a no-op; a usage with the
    /// same name but different arguments is rewritten to the requested form.
    pub fn annotate_type(
        &self,
        decl: &TypeDeclaration,
        request: &TypeAnnotationRequest,
    ) -> Result<Planned, EngineError> {
        validate_qualified_name(&request.name)?;
        for (key, _) in &request.arguments {
            validate_identifier(key)?;
        }
        let simple = simple_name(&request.name);
        let arguments: Vec<AnnotationArgument> = request
            .arguments
            .iter()
            .map(|(k, v)| AnnotationArgument::new(k.as_str(), v))
            .collect();

        let mut draft = Draft::new(decl);
        let existing = decl.annotations.iter().find(|a| a.simple_name() == simple);
        if existing.is_some_and(|e| e.is_equivalent(simple, &arguments)) {
            draft
                .warnings
                .push(Warning::AnnotationAlreadyPresent(simple.to_string()));
            return Ok(draft.finish());
        }

        let qualified = if request.name.contains('.') {
            Some(request.name.clone())
        } else if PERSISTENCE_TYPE_ANNOTATIONS.contains(&simple) {
            Some(format!("{}.{}", self.config.namespace.persistence_package(), simple))
        } else {
            self.resolver
                .resolve(simple)
                .filter(|r| r.kind == TypeKind::Annotation && !r.package.is_empty())
                .map(|r| r.qualified_name(simple))
        };
        let reference = match qualified {
            Some(qualified) => draft.reference(&qualified),
            None => simple.to_string(),
        };

        let text = templates::annotation(&reference, &request.arguments);
        let nl = decl.layout.newline;
        let indent = &decl.declaration_indent;
        let edit = match (existing, decl.annotations.last()) {
            (Some(usage), _) => TextEdit::replace(usage.span.clone(), text),
            (None, Some(last)) => TextEdit::insert(last.span.end, format!("{nl}{indent}{text}")),
            (None, None) => TextEdit::insert(decl.span.start, format!("{text}{nl}{indent}")),
        };
        draft.declaration_edits.push(edit);
        Ok(draft.finish())
    }
}
