//! Type resolution capability
//!
//! The index and planner never look at other files. Whether `Author` is a known entity or
//! `Status` an enum is answered by a [`TypeResolver`] supplied by the host.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::model::TypeKind;

/// What the host knows about a type name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedType {
    /// Dotted package, empty for the default package
    #[serde(default)]
    pub package: String,
    pub kind: TypeKind,
}

impl ResolvedType {
    pub fn new(package: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            package: package.into(),
            kind,
        }
    }

    pub fn qualified_name(&self, simple_name: &str) -> String {
        if self.package.is_empty() {
            simple_name.to_string()
        } else {
            format!("{}.{}", self.package, simple_name)
        }
    }
}

/// Lookup of simple type names
pub trait TypeResolver {
    fn resolve(&self, simple_name: &str) -> Option<ResolvedType>;
}

impl<F> TypeResolver for F
where
    F: Fn(&str) -> Option<ResolvedType>,
{
    fn resolve(&self, simple_name: &str) -> Option<ResolvedType> {
        self(simple_name)
    }
}

/// Resolver that knows nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTypes;

impl TypeResolver for NoTypes {
    fn resolve(&self, _simple_name: &str) -> Option<ResolvedType> {
        None
    }
}

/// Table of known types, keyed by simple name
///
/// Deserializes from a JSON object such as
/// `{"Author": {"package": "com.example.model", "kind": "class"}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnownTypes {
    types: HashMap<String, ResolvedType>,
}

impl KnownTypes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, simple_name: impl Into<String>, resolved: ResolvedType) {
        self.types.insert(simple_name.into(), resolved);
    }

    pub fn with(mut self, simple_name: impl Into<String>, package: &str, kind: TypeKind) -> Self {
        self.insert(simple_name, ResolvedType::new(package, kind));
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Parses `Name=package:kind`, the kind defaulting to `class`
    pub fn parse_entry(entry: &str) -> Result<(String, ResolvedType), String> {
        let (name, rest) = entry
            .split_once('=')
            .ok_or_else(|| format!("expected Name=package[:kind], got `{}`", entry))?;
        let (package, kind) = match rest.rsplit_once(':') {
            Some((package, kind)) => (package, kind.parse::<TypeKind>()?),
            None => (rest, TypeKind::Class),
        };
        if name.is_empty() {
            return Err(format!("missing type name in `{}`", entry));
        }
        Ok((name.to_string(), ResolvedType::new(package, kind)))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeResolver for KnownTypes {
    fn resolve(&self, simple_name: &str) -> Option<ResolvedType> {
        self.types.get(simple_name).cloned()
    }
}
