//! Semantic index of one Java source file
//!
//! [`build_index`] turns a parsed file into a [`TypeDeclaration`]: package, imports, the
//! outermost type with its annotations, attributes and methods, plus the layout facts the
//! planner needs to insert code that looks like it was always there.

pub mod builder;
pub mod fingerprint;
pub mod model;
pub mod resolver;

pub use builder::IndexBuilder;
pub use fingerprint::{canonical_fingerprints, MethodFingerprint, StatementShape};
pub use model::{
    normalize_value, package_of, simple_name, AnnotationArgument, AnnotationUsage,
    AttributeCategory, AttributeInfo, ImportEntry, ImportSet, Layout, MemberAnchor, MethodInfo,
    MethodOrigin, RelationshipKind, TypeDeclaration, TypeKind, Visibility,
};
pub use resolver::{KnownTypes, NoTypes, ResolvedType, TypeResolver};

use crate::errors::EngineError;
use crate::parsers::SyntaxTree;
use crate::query::QueryEngine;

/// Index the outermost type declaration of `tree`
///
/// Fails with [`EngineError::NotATypeDeclaration`] when the file declares no top-level type.
pub fn build_index(
    tree: &SyntaxTree,
    engine: &QueryEngine,
    resolver: &dyn TypeResolver,
) -> Result<TypeDeclaration, EngineError> {
    IndexBuilder::new(engine, resolver).build(tree)
}
