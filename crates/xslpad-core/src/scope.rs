//! Scope-aware discovery of global parameter declarations.
//!
//! A parameter is global when it is a direct child of the root element and
//! appears before the first template or function. Declarations after that
//! boundary bind callable-local parameters and are never reported (or
//! removed) here, even when they are structurally identical.

use indexmap::IndexSet;
use tracing::trace;

use crate::marker;
use crate::scan::{self, Tag, TagKind, Tags};
use crate::span::Span;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Declaration {
    /// Entity-expanded `name` attribute; empty when missing.
    pub name: String,
    /// The whole element, start tag through its end tag.
    pub span: Span,
}

/// Names of all global parameters, in first-seen document order.
///
/// A name counts when it is declared inside the marker block (wherever the
/// block sits) or by a root-scope declaration before the first callable.
pub fn extract_global_names(source: &str) -> IndexSet<String> {
    let mut names: IndexSet<String> = root_declarations(source)
        .into_iter()
        .map(|declaration| declaration.name)
        .filter(|name| !name.is_empty())
        .collect();
    names.extend(block_names(source));
    trace!(count = names.len(), "extracted global parameter names");
    names
}

/// Parameter declarations that are direct children of the root element
/// and precede the first `xsl:template` or `xsl:function`.
pub fn root_declarations(source: &str) -> Vec<Declaration> {
    let Some(root) = scan::find_root(source) else {
        return Vec::new();
    };
    if root.kind == TagKind::Empty {
        return Vec::new();
    }

    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut tags = scan::tags_from(source, root.span.end);
    while let Some(tag) = tags.next() {
        if tag.is_callable() {
            break;
        }
        match tag.kind {
            TagKind::End if depth == 0 => break,
            TagKind::End => depth -= 1,
            _ if depth == 0 && tag.is_xsl("param") => {
                let end = match tag.kind {
                    TagKind::Start => close_param(&mut tags).unwrap_or(tag.span.end),
                    _ => tag.span.end,
                };
                out.push(Declaration {
                    name: declared_name(&tag),
                    span: Span::new(tag.span.start, end),
                });
            }
            TagKind::Start => depth += 1,
            TagKind::Empty => {}
        }
    }
    out
}

/// Names declared between the marker sentinels.
pub fn block_names(source: &str) -> Vec<String> {
    let Some(block) = marker::find_block(source) else {
        return Vec::new();
    };
    scan::tags(block.inner.slice(source))
        .filter(|tag| tag.opens() && tag.is_xsl("param"))
        .map(|tag| declared_name(&tag))
        .filter(|name| !name.is_empty())
        .collect()
}

/// Advances past the end tag matching an open `xsl:param`. When the
/// element is not closed before its parent ends or a callable begins, the
/// iterator is left untouched and `None` is returned.
fn close_param(tags: &mut Tags<'_>) -> Option<usize> {
    let mut ahead = tags.clone();
    let mut depth = 0usize;
    while let Some(tag) = ahead.next() {
        if tag.is_callable() {
            return None;
        }
        match tag.kind {
            TagKind::Start => depth += 1,
            TagKind::Empty => {}
            TagKind::End if depth > 0 => depth -= 1,
            TagKind::End if tag.is_xsl("param") => {
                *tags = ahead;
                return Some(tag.span.end);
            }
            TagKind::End => return None,
        }
    }
    None
}

fn declared_name(tag: &Tag<'_>) -> String {
    tag.attribute("name")
        .map(|attr| htmlize::unescape_attribute(attr.value).into_owned())
        .unwrap_or_default()
}
