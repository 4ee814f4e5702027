//! Placement of new members inside the type body
//!
//! New fields and generated methods are collected as [`MemberBlock`]s and turned into one
//! edit at the type's [`MemberAnchor`]. Blocks are separated by a blank line, except
//! between two compact (single-line, unannotated) fields, which stay on adjacent lines.

use crate::edit::TextEdit;
use crate::index::{MemberAnchor, TypeDeclaration};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberBlock {
    /// First line unindented, following lines carrying the member indentation
    pub text: String,
    pub compact: bool,
}

impl MemberBlock {
    pub fn field(text: String) -> Self {
        let compact = !text.contains('\n') && !text.starts_with('@');
        Self { text, compact }
    }

    pub fn method(text: String) -> Self {
        Self {
            text,
            compact: false,
        }
    }
}

fn separator(nl: &str, previous_compact: bool, next_compact: bool) -> String {
    if previous_compact && next_compact {
        nl.to_string()
    } else {
        format!("{nl}{nl}")
    }
}

/// Concatenate `blocks`, each preceded by its separator from the previous one
fn join_blocks(blocks: &[MemberBlock], mut previous_compact: bool, first_prefix: Option<&str>, indent: &str, nl: &str) -> String {
    let mut text = String::new();
    for (i, block) in blocks.iter().enumerate() {
        match (i, first_prefix) {
            (0, Some(prefix)) => text.push_str(prefix),
            _ => text.push_str(&separator(nl, previous_compact, block.compact)),
        }
        text.push_str(indent);
        text.push_str(&block.text);
        previous_compact = block.compact;
    }
    text
}

/// Edits placing `blocks`, in order, at the declaration's member anchor
pub fn insertion(decl: &TypeDeclaration, blocks: &[MemberBlock]) -> Vec<TextEdit> {
    if blocks.is_empty() {
        return Vec::new();
    }
    let indent = decl.layout.indent.as_str();
    let nl = decl.layout.newline;

    let edit = match &decl.member_anchor {
        MemberAnchor::AfterMember { offset, compact } => {
            TextEdit::insert(*offset, join_blocks(blocks, *compact, None, indent, nl))
        }
        MemberAnchor::OpenBody {
            offset,
            followed_by_newline,
        } => {
            let mut text = join_blocks(blocks, false, Some(nl), indent, nl);
            text.push_str(nl);
            if !followed_by_newline {
                text.push_str(nl);
                text.push_str(indent);
            }
            TextEdit::insert(*offset, text)
        }
        MemberAnchor::EmptyBody {
            interior,
            closing_indent,
            enum_section,
        } => {
            let mut text = String::from(nl);
            if *enum_section {
                text.push_str(indent);
                text.push(';');
                text.push_str(nl);
            }
            text.push_str(&join_blocks(blocks, false, Some(""), indent, nl));
            text.push_str(nl);
            text.push_str(closing_indent);
            TextEdit::replace(interior.clone(), text)
        }
        MemberAnchor::AfterEnumConstants { semicolon, offset } => {
            return vec![
                TextEdit::insert(*semicolon, ";"),
                TextEdit::insert(*offset, join_blocks(blocks, false, None, indent, nl)),
            ];
        }
    };
    vec![edit]
}
