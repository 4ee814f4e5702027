//! Operation catalog and the engine facade
//!
//! Every edit operation runs the same pipeline: parse, index the outer type, plan, apply,
//! and re-parse the output to make sure the transformation did not break the file. The
//! [`Engine`] owns the read-only pieces shared by all operations (configuration, compiled
//! query table, optional parse cache), so one instance can serve many files and threads.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::config::EngineConfig;
use crate::edit::apply;
use crate::errors::{EngineError, Warning};
use crate::index::{IndexBuilder, TypeDeclaration, TypeResolver};
use crate::parsers::java::parse_tree;
use crate::parsers::{ParseCache, SyntaxTree};
use crate::planner::{
    create_type, AttributeRequest, CreateTypeRequest, NewTypeFile, Planned, Planner,
    RelationshipRequest, TypeAnnotationRequest,
};
use crate::query::{QueryEngine, QueryTable, QueryType};

/// High-level operations the engine supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateType,
    AddAttribute,
    AddRelationship,
    RegenerateEqualsHashCode,
    AnnotateType,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::CreateType,
        Operation::AddAttribute,
        Operation::AddRelationship,
        Operation::RegenerateEqualsHashCode,
        Operation::AnnotateType,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Operation::CreateType => "CreateType",
            Operation::AddAttribute => "AddAttribute",
            Operation::AddRelationship => "AddRelationship",
            Operation::RegenerateEqualsHashCode => "RegenerateEqualsHashCode",
            Operation::AnnotateType => "AnnotateType",
        }
    }

    /// Queries the operation runs against the input file
    pub fn required_queries(&self) -> &'static [QueryType] {
        match self {
            Operation::CreateType => &[],
            Operation::AddAttribute | Operation::AddRelationship | Operation::RegenerateEqualsHashCode => &[
                QueryType::Package,
                QueryType::Imports,
                QueryType::TypeDeclaration,
                QueryType::Annotations,
                QueryType::Fields,
                QueryType::Methods,
            ],
            Operation::AnnotateType => &[
                QueryType::Package,
                QueryType::Imports,
                QueryType::TypeDeclaration,
                QueryType::Annotations,
            ],
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of an edit operation: always a complete file text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOutcome {
    pub text: String,
    /// Fully qualified imports the operation added, sorted
    pub added_imports: Vec<String>,
    pub warnings: Vec<Warning>,
    pub edits_applied: usize,
    /// False when the output is byte-identical to the input
    pub changed: bool,
}

pub struct Engine {
    config: EngineConfig,
    queries: QueryEngine,
    cache: Option<ParseCache>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("query_table", &self.queries.table().version())
            .field("cached_trees", &self.cache.as_ref().map_or(0, |c| c.len()))
            .finish()
    }
}

impl Engine {
    /// Engine over the built-in query table
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        Ok(Self::with_query_table(config, QueryTable::builtin()?))
    }

    pub fn with_query_table(config: EngineConfig, table: Arc<QueryTable>) -> Self {
        let cache = (config.parse_cache_capacity > 0).then(|| ParseCache::new(config.parse_cache_capacity));
        Self {
            config,
            queries: QueryEngine::new(table),
            cache,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn parse_cache(&self) -> Option<&ParseCache> {
        self.cache.as_ref()
    }

    /// Parses `source`, reusing a cached tree for identical text
    pub fn parse(&self, source: &str) -> Result<SyntaxTree, EngineError> {
        if let Some(tree) = self.cache.as_ref().and_then(|c| c.get(source)) {
            trace!("Parse cache hit for {} bytes", source.len());
            return Ok(SyntaxTree::from_parts(tree, source));
        }
        let tree = parse_tree(source)?;
        if let Some(cache) = &self.cache {
            cache.insert(source.to_string(), tree.clone());
        }
        Ok(SyntaxTree::from_parts(tree, source))
    }

    /// Semantic index of the outer type of `source`
    pub fn index(&self, source: &str, resolver: &dyn TypeResolver) -> Result<TypeDeclaration, EngineError> {
        let tree = self.parse(source)?;
        self.index_tree(&tree, resolver)
    }

    fn index_tree(&self, tree: &SyntaxTree, resolver: &dyn TypeResolver) -> Result<TypeDeclaration, EngineError> {
        let mut decl = IndexBuilder::new(&self.queries, resolver)
            .with_default_indent(self.config.fallback_indent())
            .build(tree)?;
        if let Some(unit) = &self.config.indent {
            decl.layout.indent = format!("{}{}", decl.declaration_indent, unit);
        }
        Ok(decl)
    }

    pub fn create_type(&self, request: &CreateTypeRequest) -> Result<NewTypeFile, EngineError> {
        debug!("{} {} {}", Operation::CreateType, request.kind, request.name);
        create_type(&self.config, request)
    }

    pub fn add_attribute(
        &self,
        source: &str,
        request: &AttributeRequest,
        resolver: &dyn TypeResolver,
    ) -> Result<TransformOutcome, EngineError> {
        self.transform(Operation::AddAttribute, source, resolver, |planner, decl| {
            planner.add_attribute(decl, request)
        })
    }

    pub fn add_relationship(
        &self,
        source: &str,
        request: &RelationshipRequest,
        resolver: &dyn TypeResolver,
    ) -> Result<TransformOutcome, EngineError> {
        self.transform(Operation::AddRelationship, source, resolver, |planner, decl| {
            planner.add_relationship(decl, request)
        })
    }

    pub fn regenerate_equals_hash_code(
        &self,
        source: &str,
        resolver: &dyn TypeResolver,
    ) -> Result<TransformOutcome, EngineError> {
        self.transform(Operation::RegenerateEqualsHashCode, source, resolver, |planner, decl| {
            planner.regenerate_equals_hash_code(decl)
        })
    }

    pub fn annotate_type(
        &self,
        source: &str,
        request: &TypeAnnotationRequest,
        resolver: &dyn TypeResolver,
    ) -> Result<TransformOutcome, EngineError> {
        self.transform(Operation::AnnotateType, source, resolver, |planner, decl| {
            planner.annotate_type(decl, request)
        })
    }

    fn transform(
        &self,
        operation: Operation,
        source: &str,
        resolver: &dyn TypeResolver,
        plan: impl FnOnce(&Planner<'_>, &TypeDeclaration) -> Result<Planned, EngineError>,
    ) -> Result<TransformOutcome, EngineError> {
        let table = self.queries.table();
        if let Some(missing) = operation.required_queries().iter().find(|q| !table.has_query(**q)) {
            return Err(EngineError::InvalidQuery {
                query: missing.filename(),
                message: format!("not loaded in table {}", table.version()),
            });
        }

        debug!("{} on {} bytes", operation, source.len());
        let tree = self.parse(source)?;
        let decl = self.index_tree(&tree, resolver)?;
        let planner = Planner::new(&self.config, resolver);
        let Planned { plan, warnings } = plan(&planner, &decl)?;

        if plan.is_empty() {
            debug!("{} left {} unchanged", operation, decl.name);
            return Ok(TransformOutcome {
                text: source.to_string(),
                added_imports: Vec::new(),
                warnings,
                edits_applied: 0,
                changed: false,
            });
        }

        let emitted = apply(source, &plan)?;
        let output = self.parse(&emitted.text)?;
        if output.has_errors() && !tree.has_errors() {
            return Err(EngineError::MalformedOutput);
        }

        let mut added_imports = emitted.added_imports;
        added_imports.sort();
        debug!(
            "{} applied {} edits to {}, {} imports added",
            operation,
            plan.len(),
            decl.name,
            added_imports.len()
        );
        Ok(TransformOutcome {
            changed: emitted.text != source,
            text: emitted.text,
            added_imports,
            warnings,
            edits_applied: plan.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{KnownTypes, NoTypes, TypeKind};
    use crate::planner::AttributeKind;

    fn engine() -> Engine {
        Engine::new(EngineConfig::default()).unwrap()
    }

    #[test]
    fn test_operation_names_and_queries() {
        assert_eq!(Operation::AddAttribute.to_string(), "AddAttribute");
        assert!(Operation::CreateType.required_queries().is_empty());
        assert!(Operation::RegenerateEqualsHashCode
            .required_queries()
            .contains(&QueryType::Methods));
    }

    #[test]
    fn test_missing_query_is_reported() {
        let table = QueryTable::from_sources(
            "partial",
            &crate::parsers::java::language(),
            [(QueryType::Package, "(package_declaration) @package")],
        )
        .unwrap();
        let engine = Engine::with_query_table(EngineConfig::default(), Arc::new(table));
        let request = AttributeRequest::new(AttributeKind::Basic, "title", "String");
        let err = engine.add_attribute("class Book {}", &request, &NoTypes).unwrap_err();
        assert!(matches!(err, EngineError::InvalidQuery { query: "imports.scm", .. }));
    }

    #[test]
    fn test_no_op_outcome() {
        let source = "class Book {\n    private String title;\n}\n";
        let request = AttributeRequest::new(AttributeKind::Basic, "title", "String");
        let outcome = engine().add_attribute(source, &request, &NoTypes).unwrap();
        assert!(!outcome.changed);
        assert_eq!(outcome.edits_applied, 0);
        assert_eq!(outcome.text, source);
    }

    #[test]
    fn test_parse_cache_is_used() {
        let engine = engine();
        let request = AttributeRequest::new(AttributeKind::Basic, "title", "String");
        engine.add_attribute("class Book {}", &request, &NoTypes).unwrap();
        engine.add_attribute("class Book {}", &request, &NoTypes).unwrap();
        let stats = engine.parse_cache().unwrap().stats();
        assert!(stats.hit_rate.unwrap() > 0.0);
    }

    #[test]
    fn test_cache_can_be_disabled() {
        let config = EngineConfig {
            parse_cache_capacity: 0,
            ..EngineConfig::default()
        };
        assert!(Engine::new(config).unwrap().parse_cache().is_none());
    }

    #[test]
    fn test_indent_override() {
        let config = EngineConfig {
            indent: Some("\t".to_string()),
            ..EngineConfig::default()
        };
        let engine = Engine::new(config).unwrap();
        let request = AttributeRequest::new(AttributeKind::Basic, "title", "String");
        let outcome = engine.add_attribute("class Book {}", &request, &NoTypes).unwrap();
        assert_eq!(outcome.text, "class Book {\n\tprivate String title;\n}");
    }

    fn planned(offset: usize, text: &str) -> Result<Planned, EngineError> {
        let mut plan = crate::edit::EditPlan::new();
        plan.insert(offset, text);
        Ok(Planned {
            plan,
            warnings: Vec::new(),
        })
    }

    #[test]
    fn test_output_that_breaks_the_file_is_rejected() {
        let engine = engine();
        let err = engine
            .transform(Operation::AnnotateType, "class Book {}\n", &NoTypes, |_, _| {
                planned(0, "@Entity\nimport a.B;\n")
            })
            .unwrap_err();
        assert_eq!(err, EngineError::MalformedOutput);

        let fine = engine
            .transform(Operation::AnnotateType, "class Book {}\n", &NoTypes, |_, _| planned(0, "@Entity\n"))
            .unwrap();
        assert_eq!(fine.text, "@Entity\nclass Book {}\n");
    }

    #[test]
    fn test_input_errors_are_not_blamed_on_the_edit() {
        // Already broken before the edit: the guard only rejects errors the edit introduced
        let source = "class Book {\n    private String title\n}\n";
        let outcome = engine()
            .transform(Operation::AnnotateType, source, &NoTypes, |_, _| planned(0, "@Entity\n"))
            .unwrap();
        assert!(outcome.text.starts_with("@Entity\nclass Book"));
    }

    #[test]
    fn test_index_uses_resolver() {
        let types = KnownTypes::new().with("Status", "a.b", TypeKind::Enum);
        let decl = engine()
            .index("class Book { private Status status; }", &types)
            .unwrap();
        assert_eq!(decl.attributes.len(), 1);
        assert_eq!(decl.attributes[0].category, crate::index::AttributeCategory::Enumerated);
    }
}
