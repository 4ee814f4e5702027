//! Syntax-tree driven scaffolding for Java persistence entities
//!
//! The pipeline for every edit operation is: [`parsers`] (tree-sitter Java) ->
//! [`query`] (versioned structural queries) -> [`index`] (model of the outer type) ->
//! [`planner`] (edit plan) -> [`edit`] (single-pass application). [`operations::Engine`]
//! wires the stages together behind the operation catalog.

pub mod config;
pub mod edit;
pub mod errors;
pub mod index;
pub mod logging;
pub mod operations;
pub mod parsers;
pub mod planner;
pub mod query;

pub use config::{EngineConfig, PersistenceNamespace};
pub use errors::{EngineError, Warning};
pub use index::{KnownTypes, NoTypes, RelationshipKind, ResolvedType, TypeKind, TypeResolver};
pub use operations::{Engine, Operation, TransformOutcome};
pub use planner::{
    AttributeKind, AttributeOptions, AttributeRequest, CascadeType, CollectionType,
    CreateTypeRequest, EnumStorage, FetchType, GenerationStrategy, NewTypeFile, RelationshipOptions, RelationshipRequest,
    TypeAnnotationRequest,
};
