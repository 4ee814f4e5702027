//! Error and warning types shared by every stage of the transformation pipeline
//!
//! Fatal conditions are [`EngineError`]: the operation is aborted and no text is produced.
//! Non-fatal conditions are [`Warning`]s: they travel in the operation outcome next to the
//! (possibly unchanged) new text.

use std::ops::Range;

use thiserror::Error;

use crate::index::TypeKind;

/// Fatal pipeline errors. When one of these is returned, no output text exists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The grammar could not be loaded or the parser produced no tree at all.
    #[error("parse failure: {0}")]
    ParseFailure(String),

    /// The file has no top-level class, interface, enum, record or annotation type.
    #[error("source does not contain a top-level type declaration")]
    NotATypeDeclaration,

    /// A relationship target (or other required type) is unknown to the resolver.
    #[error("target type `{0}` cannot be resolved")]
    UnresolvedTargetType(String),

    /// Two planned edits touch the same bytes. Always a planner defect.
    #[error("overlapping edits at {first:?} and {second:?}")]
    OverlappingEdits {
        first: Range<usize>,
        second: Range<usize>,
    },

    /// A planned edit points outside the source or inside a UTF-8 sequence.
    #[error("edit range {0:?} is outside the source or splits a character")]
    InvalidEditRange(Range<usize>),

    #[error("`{0}` is not a valid Java identifier")]
    InvalidName(String),

    #[error("{operation} is not supported on {kind} declarations")]
    UnsupportedTypeKind {
        operation: &'static str,
        kind: TypeKind,
    },

    #[error("invalid {query} query: {message}")]
    InvalidQuery {
        query: &'static str,
        message: String,
    },

    /// The emitted text no longer parses although the input did.
    #[error("transformation produced output that does not parse cleanly")]
    MalformedOutput,
}

/// Non-fatal conditions reported alongside the produced text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Warning {
    #[error("attribute `{0}` already exists; nothing was added")]
    DuplicateAttributeName(String),

    #[error("method `{0}` is user-authored and was left untouched")]
    ConflictingUserMethod(String),

    #[error("type `{0}` has no identifier attributes; equals/hashCode were not generated")]
    MissingIdentifierAttributes(String),

    #[error("`{0}` could not be resolved as an enum type; no import was added for it")]
    UnresolvedEnumType(String),

    #[error("annotation `@{0}` is already present")]
    AnnotationAlreadyPresent(String),

    #[error("another import owns the simple name of `{0}`; it is referenced fully qualified")]
    QualifiedReference(String),
}
