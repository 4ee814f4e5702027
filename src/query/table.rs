//! Versioned query-pattern table
//!
//! The `.scm` sources are grammar data, not code: they are embedded from
//! `src/queries/java/`, compiled once per process and shared read-only by every engine.
//! Swapping the grammar (or a single pattern, in tests) means building another table,
//! never touching the planner.

use std::sync::{Arc, OnceLock};

use rustc_hash::FxHashMap;
use tree_sitter::{Language, Query};
use tracing::{debug, trace};

use super::query_types::QueryType;
use crate::errors::EngineError;
use crate::parsers::java;

/// Version tag of the built-in table, tied to the grammar release the patterns target
pub const QUERY_TABLE_VERSION: &str = "java-0.23";

const BUILTIN_SOURCES: [(QueryType, &str); 6] = [
    (QueryType::Package, include_str!("../queries/java/package.scm")),
    (QueryType::Imports, include_str!("../queries/java/imports.scm")),
    (QueryType::TypeDeclaration, include_str!("../queries/java/type_declaration.scm")),
    (QueryType::Fields, include_str!("../queries/java/fields.scm")),
    (QueryType::Methods, include_str!("../queries/java/methods.scm")),
    (QueryType::Annotations, include_str!("../queries/java/annotations.scm")),
];

static BUILTIN: OnceLock<Result<Arc<QueryTable>, EngineError>> = OnceLock::new();

/// Compiled queries keyed by [`QueryType`]
pub struct QueryTable {
    version: String,
    queries: FxHashMap<QueryType, Arc<Query>>,
}

impl std::fmt::Debug for QueryTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryTable")
            .field("version", &self.version)
            .field("queries", &self.loaded())
            .finish()
    }
}

impl QueryTable {
    /// The built-in Java table, compiled on first use
    pub fn builtin() -> Result<Arc<QueryTable>, EngineError> {
        BUILTIN
            .get_or_init(|| {
                debug!("Compiling built-in query table {}", QUERY_TABLE_VERSION);
                QueryTable::from_sources(QUERY_TABLE_VERSION, &java::language(), BUILTIN_SOURCES)
                    .map(Arc::new)
            })
            .clone()
    }

    /// Compile a table from `(QueryType, source)` pairs
    pub fn from_sources<'a>(
        version: impl Into<String>,
        language: &Language,
        sources: impl IntoIterator<Item = (QueryType, &'a str)>,
    ) -> Result<Self, EngineError> {
        let mut queries = FxHashMap::default();
        for (query_type, source) in sources {
            let query = Query::new(language, source).map_err(|e| EngineError::InvalidQuery {
                query: query_type.filename(),
                message: e.to_string(),
            })?;
            trace!(
                "Loaded {} with {} patterns and {} captures",
                query_type.filename(),
                query.pattern_count(),
                query.capture_names().len()
            );
            queries.insert(query_type, Arc::new(query));
        }

        Ok(Self {
            version: version.into(),
            queries,
        })
    }

    /// The built-in sources with some entries replaced
    pub fn builtin_with_overrides<'a>(
        version: impl Into<String>,
        overrides: impl IntoIterator<Item = (QueryType, &'a str)>,
    ) -> Result<Self, EngineError> {
        let mut sources: FxHashMap<QueryType, &str> = BUILTIN_SOURCES.into_iter().collect();
        sources.extend(overrides);
        Self::from_sources(version, &java::language(), sources)
    }

    pub fn get(&self, query_type: QueryType) -> Result<&Query, EngineError> {
        self.queries
            .get(&query_type)
            .map(|q| q.as_ref())
            .ok_or_else(|| EngineError::InvalidQuery {
                query: query_type.filename(),
                message: format!("{} query not loaded", query_type.description()),
            })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn has_query(&self, query_type: QueryType) -> bool {
        self.queries.contains_key(&query_type)
    }

    /// Loaded query types, sorted
    pub fn loaded(&self) -> Vec<QueryType> {
        let mut loaded: Vec<QueryType> = self.queries.keys().copied().collect();
        loaded.sort();
        loaded
    }
}
