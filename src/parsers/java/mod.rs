//! Java grammar adapter
//!
//! Wraps `tree-sitter-java` behind a small contract: [`parse_code`] turns file text into a
//! [`SyntaxTree`], and fails only when the grammar cannot be loaded or the parser refuses
//! to produce a tree. Malformed Java still yields a best-effort tree (tree-sitter is error
//! tolerant), which matters because the engine routinely runs on code that is mid-edit.

pub mod kind_ids;

use tree_sitter::{Language, Node as TsNode, Parser, Tree};
use tracing::{debug, trace};

use crate::errors::EngineError;

/// The Java tree-sitter language
pub fn language() -> Language {
    tree_sitter_java::LANGUAGE.into()
}

/// An immutable parse of one file's text
///
/// Owns both the tree and the text it was parsed from, so node ranges can always be
/// resolved back to source slices.
pub struct SyntaxTree {
    tree: Tree,
    source: String,
}

impl std::fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("bytes", &self.source.len())
            .field("has_errors", &self.has_errors())
            .finish()
    }
}

impl SyntaxTree {
    pub(crate) fn from_parts(tree: Tree, source: &str) -> Self {
        Self {
            tree,
            source: source.to_string(),
        }
    }

    pub fn root(&self) -> TsNode<'_> {
        self.tree.root_node()
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// True if the tree contains `ERROR` or `MISSING` nodes
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    /// Source text covered by `node`
    pub fn text(&self, node: TsNode<'_>) -> &str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    /// Byte offset of the start of the line containing `offset`
    pub fn line_start(&self, offset: usize) -> usize {
        self.source[..offset].rfind('\n').map_or(0, |i| i + 1)
    }

    /// Leading whitespace of the line on which `node` starts, if the node is the first
    /// thing on that line
    pub fn indentation_of(&self, node: TsNode<'_>) -> Option<&str> {
        let start = node.start_byte();
        let prefix = &self.source[self.line_start(start)..start];
        prefix
            .chars()
            .all(|c| c == ' ' || c == '\t')
            .then_some(prefix)
    }

    /// Newline convention of the file
    pub fn newline(&self) -> &'static str {
        if self.source.contains("\r\n") { "\r\n" } else { "\n" }
    }
}

/// Named children of `node`, in source order
pub fn named_children(node: TsNode<'_>) -> Vec<TsNode<'_>> {
    let mut cursor = node.walk();
    let nodes = node.named_children(&mut cursor).collect();
    nodes
}

/// All children of `node` (including anonymous tokens), in source order
pub fn children(node: TsNode<'_>) -> Vec<TsNode<'_>> {
    let mut cursor = node.walk();
    let nodes = node.children(&mut cursor).collect();
    nodes
}

/// Parses Java source text.
pub fn parse_code(source: &str) -> Result<SyntaxTree, EngineError> {
    let tree = parse_tree(source)?;
    Ok(SyntaxTree::from_parts(tree, source))
}

pub(crate) fn parse_tree(source: &str) -> Result<Tree, EngineError> {
    let mut parser = Parser::new();
    parser
        .set_language(&language())
        .map_err(|e| EngineError::ParseFailure(format!("failed to load Java grammar: {}", e)))?;

    trace!("Full parse of {} bytes", source.len());
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| EngineError::ParseFailure("parser produced no tree".to_string()))?;

    if tree.root_node().has_error() {
        debug!("Parse tree contains errors");
    }
    Ok(tree)
}
