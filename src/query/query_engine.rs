//! Query engine for executing structural queries against Java syntax trees
//!
//! The engine owns nothing mutable: it borrows a shared [`QueryTable`] and creates a
//! `QueryCursor` per execution, so one engine can serve several threads.

use std::sync::Arc;

use tree_sitter::{Node as TsNode, QueryCursor, StreamingIterator};
use tracing::{debug, trace};

use super::query_types::{Capture, CaptureRole, QueryMatch, QueryType};
use super::table::QueryTable;
use crate::errors::EngineError;
use crate::parsers::SyntaxTree;

/// Restriction applied to the primary capture of each match
#[derive(Debug, Clone, Default)]
pub enum Anchor {
    /// Keep every match inside the scope node
    #[default]
    Anywhere,
    /// Keep only matches whose primary node is a direct child of one of these nodes
    /// (by node id). Used to ignore members of nested/inner types.
    DirectChildOf(Vec<usize>),
}

impl Anchor {
    pub fn direct_child_of(containers: &[TsNode<'_>]) -> Self {
        Anchor::DirectChildOf(containers.iter().map(|n| n.id()).collect())
    }

    fn admits(&self, node: TsNode<'_>) -> bool {
        match self {
            Anchor::Anywhere => true,
            Anchor::DirectChildOf(ids) => node.parent().is_some_and(|p| ids.contains(&p.id())),
        }
    }
}

/// Executes queries from a [`QueryTable`]
#[derive(Debug, Clone)]
pub struct QueryEngine {
    table: Arc<QueryTable>,
}

impl QueryEngine {
    pub fn new(table: Arc<QueryTable>) -> Self {
        Self { table }
    }

    /// Engine over the built-in Java table
    pub fn builtin() -> Result<Self, EngineError> {
        Ok(Self::new(QueryTable::builtin()?))
    }

    pub fn table(&self) -> &QueryTable {
        &self.table
    }

    /// Execute a query within `scope`
    ///
    /// # Arguments
    /// * `tree` - Parsed file
    /// * `query_type` - Query to run
    /// * `scope` - Node whose subtree is searched (usually the root or a type body)
    /// * `anchor` - Filter applied to each match's primary capture
    ///
    /// # Returns
    /// Matches in source order
    pub fn matches<'tree>(
        &self,
        tree: &'tree SyntaxTree,
        query_type: QueryType,
        scope: TsNode<'tree>,
        anchor: &Anchor,
    ) -> Result<Vec<QueryMatch<'tree>>, EngineError> {
        let mut found = Vec::new();
        self.for_each_match(tree, query_type, scope, anchor, |m| {
            found.push(m);
            true
        })?;
        debug!("{} query produced {} matches", query_type.description(), found.len());
        Ok(found)
    }

    /// First match within `scope`, stopping the cursor as soon as one is found
    ///
    /// Used for singleton roles: the package clause, the outer type declaration.
    pub fn first<'tree>(
        &self,
        tree: &'tree SyntaxTree,
        query_type: QueryType,
        scope: TsNode<'tree>,
    ) -> Result<Option<QueryMatch<'tree>>, EngineError> {
        let mut first = None;
        self.for_each_match(tree, query_type, scope, &Anchor::Anywhere, |m| {
            first = Some(m);
            false
        })?;
        Ok(first)
    }

    /// All captures with `role` across the matches, flattened
    pub fn captures<'tree>(
        &self,
        tree: &'tree SyntaxTree,
        query_type: QueryType,
        scope: TsNode<'tree>,
        anchor: &Anchor,
        role: &CaptureRole,
    ) -> Result<Vec<Capture<'tree>>, EngineError> {
        Ok(self
            .matches(tree, query_type, scope, anchor)?
            .into_iter()
            .flat_map(|m| m.captures.into_iter())
            .filter(|c| &c.role == role)
            .collect())
    }

    /// Drive the cursor, handing each admitted match to `visit` until it returns false
    fn for_each_match<'tree>(
        &self,
        tree: &'tree SyntaxTree,
        query_type: QueryType,
        scope: TsNode<'tree>,
        anchor: &Anchor,
        mut visit: impl FnMut(QueryMatch<'tree>) -> bool,
    ) -> Result<(), EngineError> {
        let query = self.table.get(query_type)?;
        let names = query.capture_names();

        trace!("Executing {} query on {}", query_type.description(), scope.kind());

        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(query, scope, tree.source().as_bytes());
        while let Some(m) = matches.next() {
            let captures: Vec<Capture<'tree>> = m
                .captures
                .iter()
                .map(|c| Capture::new(c.node, CaptureRole::from_name(names[c.index as usize])))
                .collect();
            let query_match = QueryMatch { captures };

            let admitted = query_match
                .primary(query_type)
                .is_some_and(|primary| anchor.admits(primary.node));
            if admitted && !visit(query_match) {
                break;
            }
        }
        Ok(())
    }
}
