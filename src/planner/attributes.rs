//! Annotation sets and declarations for new attributes
//!
//! Every annotation the planner emits is an [`AnnotationSpec`] tagged with an
//! [`AnnotationSlot`]. Specs are stably sorted by slot before rendering, which yields the
//! canonical order: identifier, generation strategy, mapping, validation.

use crate::config::EngineConfig;
use crate::index::{RelationshipKind, ResolvedType, TypeKind, TypeResolver};

use super::imports::jdk_type;
use super::templates::{annotation, string_literal};
use super::{
    AttributeKind, AttributeRequest, CascadeType, EnumStorage, FetchType, GenerationStrategy,
    RelationshipRequest,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AnnotationSlot {
    Identifier,
    Generation,
    Mapping,
    Validation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationSpec {
    pub name: String,
    /// Fully qualified name to import, `None` when nothing needs importing
    pub import: Option<String>,
    pub arguments: Vec<(String, String)>,
    pub slot: AnnotationSlot,
}

impl AnnotationSpec {
    pub fn render(&self) -> String {
        annotation(&self.name, &self.arguments)
    }

    fn arg(mut self, key: &str, value: impl Into<String>) -> Self {
        self.arguments.push((key.to_string(), value.into()));
        self
    }

    /// Spells every `Holder.CONSTANT` reference in the argument values as
    /// `qualified.CONSTANT`, for a constant holder that cannot be imported
    pub fn qualify_constant(&mut self, holder: &str, qualified: &str) {
        let prefix = format!("{holder}.");
        for (_, value) in self.arguments.iter_mut() {
            let mut spelled = String::with_capacity(value.len());
            let mut copied = 0;
            for (at, _) in value.match_indices(&prefix) {
                let standalone = value[..at]
                    .chars()
                    .next_back()
                    .is_none_or(|c| !(c.is_alphanumeric() || "_$.".contains(c)));
                if standalone {
                    spelled.push_str(&value[copied..at]);
                    spelled.push_str(qualified);
                    spelled.push('.');
                    copied = at + prefix.len();
                }
            }
            spelled.push_str(&value[copied..]);
            *value = spelled;
        }
    }
}

/// Annotation and constant names of the configured persistence namespace
pub struct Vocabulary<'c> {
    config: &'c EngineConfig,
}

impl<'c> Vocabulary<'c> {
    pub fn new(config: &'c EngineConfig) -> Self {
        Self { config }
    }

    pub fn persistence(&self, name: &str, slot: AnnotationSlot) -> AnnotationSpec {
        AnnotationSpec {
            name: name.to_string(),
            import: Some(format!("{}.{}", self.config.namespace.persistence_package(), name)),
            arguments: Vec::new(),
            slot,
        }
    }

    fn validation(&self, name: &str) -> AnnotationSpec {
        AnnotationSpec {
            name: name.to_string(),
            import: Some(format!("{}.{}", self.config.namespace.validation_package(), name)),
            arguments: Vec::new(),
            slot: AnnotationSlot::Validation,
        }
    }

    /// Import for a persistence enum constant holder (`GenerationType`, `FetchType`, ...)
    fn constant_holder(&self, name: &str) -> String {
        format!("{}.{}", self.config.namespace.persistence_package(), name)
    }

    /// Annotations for a new identifier, basic or enum-typed attribute, in canonical order,
    /// plus the imports of the constants they reference
    pub fn attribute(&self, request: &AttributeRequest) -> (Vec<AnnotationSpec>, Vec<String>) {
        let options = &request.options;
        let mut specs = Vec::new();
        let mut constants = Vec::new();

        if request.kind == AttributeKind::Identifier {
            specs.push(self.persistence("Id", AnnotationSlot::Identifier));
            if let Some(strategy) = options.generation {
                specs.push(
                    self.persistence("GeneratedValue", AnnotationSlot::Generation)
                        .arg("strategy", format!("GenerationType.{}", strategy.constant())),
                );
                constants.push(self.constant_holder("GenerationType"));
            }
        }

        if request.kind == AttributeKind::Enumerated {
            let storage = match options.enum_storage {
                EnumStorage::String => "EnumType.STRING",
                EnumStorage::Ordinal => "EnumType.ORDINAL",
            };
            specs.push(self.persistence("Enumerated", AnnotationSlot::Mapping).arg("value", storage));
            constants.push(self.constant_holder("EnumType"));
        }

        // Identifiers are implicitly non-null and unique; only a custom name is worth a @Column
        let mut column = self.persistence("Column", AnnotationSlot::Mapping);
        if let Some(name) = &options.column_name {
            column = column.arg("name", string_literal(name));
        }
        if request.kind != AttributeKind::Identifier {
            if !request.nullable {
                column = column.arg("nullable", "false");
            }
            if let Some(length) = options.length {
                column = column.arg("length", length.to_string());
            }
            if options.unique {
                column = column.arg("unique", "true");
            }
        }
        if !column.arguments.is_empty() {
            specs.push(column);
        }

        if self.config.validation_annotations && request.kind != AttributeKind::Identifier {
            if !request.nullable {
                specs.push(self.validation("NotNull"));
            }
            if let (Some(length), true) = (options.length, request.declared_type == "String") {
                specs.push(self.validation("Size").arg("max", length.to_string()));
            }
        }

        specs.sort_by_key(|s| s.slot);
        (specs, constants)
    }

    /// Annotations for a new relationship attribute, in canonical order, plus constant imports
    pub fn relationship(&self, request: &RelationshipRequest) -> (Vec<AnnotationSpec>, Vec<String>) {
        let options = &request.options;
        let mut specs = Vec::new();
        let mut constants = Vec::new();

        if options.identifier {
            specs.push(self.persistence("Id", AnnotationSlot::Identifier));
        }

        let mut association = self.persistence(request.kind.annotation_name(), AnnotationSlot::Mapping);
        if let Some(mapped_by) = &options.mapped_by {
            association = association.arg("mappedBy", string_literal(mapped_by));
        }
        if let Some(fetch) = options.fetch {
            let constant = match fetch {
                FetchType::Lazy => "FetchType.LAZY",
                FetchType::Eager => "FetchType.EAGER",
            };
            association = association.arg("fetch", constant);
            constants.push(self.constant_holder("FetchType"));
        }
        let single_valued = !request.kind.is_to_many();
        if single_valued && !options.nullable && options.mapped_by.is_none() {
            association = association.arg("optional", "false");
        }
        // Only the owning side of a one-to-* association may remove orphans
        if options.orphan_removal
            && matches!(request.kind, RelationshipKind::OneToOne | RelationshipKind::OneToMany)
        {
            association = association.arg("orphanRemoval", "true");
        }
        if let Some(cascade) = cascade_argument(&options.cascade) {
            association = association.arg("cascade", cascade);
            constants.push(self.constant_holder("CascadeType"));
        }
        specs.push(association);

        if let Some(join) = &options.join_column {
            if request.kind == RelationshipKind::ManyToMany {
                specs.push(
                    self.persistence("JoinTable", AnnotationSlot::Mapping)
                        .arg("name", string_literal(join)),
                );
            } else {
                let mut column = self
                    .persistence("JoinColumn", AnnotationSlot::Mapping)
                    .arg("name", string_literal(join));
                if single_valued && !options.nullable {
                    column = column.arg("nullable", "false");
                }
                specs.push(column);
            }
        }

        if self.config.validation_annotations && single_valued && !options.nullable {
            specs.push(self.validation("NotNull"));
        }

        specs.sort_by_key(|s| s.slot);
        (specs, constants)
    }
}

/// `CascadeType.X` for one operation, a braced list for several, `CascadeType.ALL` for all
fn cascade_argument(cascade: &[CascadeType]) -> Option<String> {
    let mut operations = cascade.to_vec();
    operations.sort_unstable();
    operations.dedup();
    match operations.as_slice() {
        [] => None,
        [single] => Some(format!("CascadeType.{}", single.constant())),
        all if all.len() == CascadeType::ALL.len() => Some("CascadeType.ALL".to_string()),
        several => {
            let listed: Vec<String> = several
                .iter()
                .map(|c| format!("CascadeType.{}", c.constant()))
                .collect();
            Some(format!("{{{}}}", listed.join(", ")))
        }
    }
}

impl CascadeType {
    fn constant(&self) -> &'static str {
        match self {
            CascadeType::Persist => "PERSIST",
            CascadeType::Merge => "MERGE",
            CascadeType::Remove => "REMOVE",
            CascadeType::Refresh => "REFRESH",
            CascadeType::Detach => "DETACH",
        }
    }
}

impl GenerationStrategy {
    fn constant(&self) -> &'static str {
        match self {
            GenerationStrategy::Identity => "IDENTITY",
            GenerationStrategy::Sequence => "SEQUENCE",
            GenerationStrategy::Uuid => "UUID",
            GenerationStrategy::Auto => "AUTO",
        }
    }
}

/// Simple type names referenced by a declared type (`Map<String, List<Tag>>` yields
/// `Map`, `String`, `List`, `Tag`). Qualified references and primitives are skipped.
pub fn referenced_types(declared_type: &str) -> Vec<&str> {
    declared_type
        .split(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$' || c == '.'))
        .filter(|token| !token.is_empty() && !token.contains('.'))
        .filter(|token| token.chars().next().is_some_and(char::is_uppercase))
        .filter(|token| *token != "extends" && *token != "super")
        .collect()
}

/// Imports needed for the types a declared type mentions. JDK types come from a fixed
/// table, everything else from the resolver.
pub fn type_imports(declared_type: &str, resolver: &dyn TypeResolver) -> Vec<String> {
    referenced_types(declared_type)
        .into_iter()
        .filter_map(|simple| match jdk_type(simple) {
            Some(qualified) => Some(qualified.to_string()),
            None => resolver
                .resolve(simple)
                .filter(|r| !r.package.is_empty())
                .map(|r| r.qualified_name(simple)),
        })
        .collect()
}

/// The resolver's answer for an enum-typed attribute, if it really names an enum
pub fn resolve_enum(declared_type: &str, resolver: &dyn TypeResolver) -> Option<ResolvedType> {
    let simple = crate::index::simple_name(declared_type);
    resolver.resolve(simple).filter(|r| r.kind == TypeKind::Enum)
}
