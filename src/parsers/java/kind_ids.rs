//! Cached Tree-Sitter kind IDs for O(1) node type checking
//!
//! The semantic index walks class bodies and modifier lists repeatedly; comparing
//! `kind_id()` against a cached id avoids the string compare behind `kind()`.
//!
//! ```rust,ignore
//! let kind_id = node.kind_id();  // FFI call - cache it!
//! if is_modifiers(kind_id) { /* ... */ }
//! ```

use std::sync::OnceLock;

use super::language;

fn cached(slot: &OnceLock<u16>, kind: &str) -> u16 {
    *slot.get_or_init(|| language().id_for_node_kind(kind, true))
}

// ============================================================================
// Members
// ============================================================================

static METHOD_DECLARATION_KIND: OnceLock<u16> = OnceLock::new();
static ENUM_BODY_DECLARATIONS_KIND: OnceLock<u16> = OnceLock::new();
static ENUM_CONSTANT_KIND: OnceLock<u16> = OnceLock::new();

/// Methods only, constructors have their own kind
#[inline(always)]
pub(crate) fn is_method_declaration(kind_id: u16) -> bool {
    kind_id == cached(&METHOD_DECLARATION_KIND, "method_declaration")
}

#[inline(always)]
pub(crate) fn is_enum_body_declarations(kind_id: u16) -> bool {
    kind_id == cached(&ENUM_BODY_DECLARATIONS_KIND, "enum_body_declarations")
}

#[inline(always)]
pub(crate) fn is_enum_constant(kind_id: u16) -> bool {
    kind_id == cached(&ENUM_CONSTANT_KIND, "enum_constant")
}

// ============================================================================
// Modifiers and annotations
// ============================================================================

static MODIFIERS_KIND: OnceLock<u16> = OnceLock::new();
static MARKER_ANNOTATION_KIND: OnceLock<u16> = OnceLock::new();
static ANNOTATION_KIND: OnceLock<u16> = OnceLock::new();
static ELEMENT_VALUE_PAIR_KIND: OnceLock<u16> = OnceLock::new();

#[inline(always)]
pub(crate) fn is_modifiers(kind_id: u16) -> bool {
    kind_id == cached(&MODIFIERS_KIND, "modifiers")
}

/// `@Foo` or `@Foo(...)`
#[inline(always)]
pub(crate) fn is_annotation(kind_id: u16) -> bool {
    kind_id == cached(&MARKER_ANNOTATION_KIND, "marker_annotation")
        || kind_id == cached(&ANNOTATION_KIND, "annotation")
}

#[inline(always)]
pub(crate) fn is_element_value_pair(kind_id: u16) -> bool {
    kind_id == cached(&ELEMENT_VALUE_PAIR_KIND, "element_value_pair")
}

// ============================================================================
// Types and parameters
// ============================================================================

static GENERIC_TYPE_KIND: OnceLock<u16> = OnceLock::new();
static ARRAY_TYPE_KIND: OnceLock<u16> = OnceLock::new();
static SPREAD_PARAMETER_KIND: OnceLock<u16> = OnceLock::new();

#[inline(always)]
pub(crate) fn is_generic_type(kind_id: u16) -> bool {
    kind_id == cached(&GENERIC_TYPE_KIND, "generic_type")
}

#[inline(always)]
pub(crate) fn is_array_type(kind_id: u16) -> bool {
    kind_id == cached(&ARRAY_TYPE_KIND, "array_type")
}

#[inline(always)]
pub(crate) fn is_spread_parameter(kind_id: u16) -> bool {
    kind_id == cached(&SPREAD_PARAMETER_KIND, "spread_parameter")
}

// ============================================================================
// Trivia
// ============================================================================

static LINE_COMMENT_KIND: OnceLock<u16> = OnceLock::new();
static BLOCK_COMMENT_KIND: OnceLock<u16> = OnceLock::new();

#[inline(always)]
pub(crate) fn is_comment(kind_id: u16) -> bool {
    kind_id == cached(&LINE_COMMENT_KIND, "line_comment")
        || kind_id == cached(&BLOCK_COMMENT_KIND, "block_comment")
}
