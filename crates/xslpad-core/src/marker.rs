//! The generated parameter block.
//!
//! The editor shows the user-authored stylesheet with a machine-written
//! block of `xsl:param` declarations right after the root open tag. The
//! block is delimited by two comment sentinels and is always regenerated
//! from the parameter list, so edits made inside it are discarded on the
//! next inject.

use std::borrow::Cow;
use std::fmt::Write as _;

use tracing::{debug, trace};

use crate::params::ParameterEntry;
use crate::scan::{self, TagKind};
use crate::scope;
use crate::span::Span;

pub const PARAM_START: &str = "<!--PARAMS_START-->";
pub const PARAM_END: &str = "<!--PARAMS_END-->";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MarkerBlock {
    /// Both sentinels included.
    pub span: Span,
    /// Text between the sentinels.
    pub inner: Span,
}

/// Locates the marker block: the first end sentinel that has a start
/// sentinel before it, paired with the nearest such start sentinel.
pub fn find_block(source: &str) -> Option<MarkerBlock> {
    for (end_at, _) in source.match_indices(PARAM_END) {
        if let Some(start_at) = source[..end_at].rfind(PARAM_START) {
            return Some(MarkerBlock {
                span: Span::new(start_at, end_at + PARAM_END.len()),
                inner: Span::new(start_at + PARAM_START.len(), end_at),
            });
        }
    }
    if source.contains(PARAM_START) || source.contains(PARAM_END) {
        debug!("unpaired parameter block sentinel, treated as text");
    }
    None
}

/// Returns the clean form of a stylesheet: every marker block removed and
/// every inline root-scope parameter declaration removed.
///
/// Removal repeats until nothing is left to remove, since splicing text out
/// can join the fragments around it into a new declaration or block.
pub fn strip(source: &str) -> String {
    let mut text = remove_blocks(source).into_owned();
    while let Some(next) = remove_root_declarations(&text) {
        text = remove_blocks(&next).into_owned();
    }
    text
}

/// Clean form of `source` with a fresh block for `params` after the root
/// open tag. Without a usable root tag the clean text is returned as is.
pub fn inject(source: &str, params: &[ParameterEntry]) -> String {
    insert_block(strip(source), params)
}

/// Like [`inject`], but inline root-scope declarations written by the user
/// are kept; only existing marker blocks are replaced.
pub fn annotate(source: &str, params: &[ParameterEntry]) -> String {
    insert_block(remove_blocks(source).into_owned(), params)
}

/// Renders the block text inserted by [`inject`], including the line break
/// that precedes the start sentinel.
pub fn render_block(params: &[ParameterEntry], eol: &str) -> String {
    let mut block = String::new();
    block.push_str(eol);
    block.push_str(PARAM_START);
    block.push_str(eol);
    for entry in params.iter().filter(|entry| entry.is_named()) {
        let _ = write!(
            block,
            "<xsl:param name=\"{}\"/>{}",
            htmlize::escape_attribute(entry.name.as_str()),
            eol
        );
    }
    block.push_str(PARAM_END);
    block
}

fn insert_block(text: String, params: &[ParameterEntry]) -> String {
    let Some(root) = scan::find_root(&text) else {
        debug!("no root stylesheet element, parameter block not injected");
        return text;
    };
    if root.kind == TagKind::Empty {
        debug!("self-closing root element, parameter block not injected");
        return text;
    }
    let at = root.span.end;
    let block = render_block(params, line_ending(&text));
    let mut out = String::with_capacity(text.len() + block.len());
    out.push_str(&text[..at]);
    out.push_str(&block);
    out.push_str(&text[at..]);
    out
}

fn remove_blocks(source: &str) -> Cow<'_, str> {
    let mut text = Cow::Borrowed(source);
    while let Some(block) = find_block(&text) {
        text = Cow::Owned(cut_block(&text, block));
    }
    text
}

fn cut_block(text: &str, block: MarkerBlock) -> String {
    let mut before = &text[..block.span.start];
    let mut after = &text[block.span.end..];
    // Drop one adjacent line break so repeated cycles do not pile up blank
    // lines. The break before the block wins; inject always writes one.
    if let Some(trimmed) = trim_break_end(before) {
        before = trimmed;
    } else if let Some(trimmed) = trim_break_start(after) {
        after = trimmed;
    }
    let mut out = String::with_capacity(before.len() + after.len());
    out.push_str(before);
    out.push_str(after);
    out
}

/// `None` when `text` has no root-scope declaration left.
fn remove_root_declarations(text: &str) -> Option<String> {
    let declarations = scope::root_declarations(text);
    if declarations.is_empty() {
        return None;
    }
    trace!(count = declarations.len(), "removing inline root parameters");
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for declaration in &declarations {
        let span = removal_span(text, declaration.span, cursor);
        out.push_str(&text[cursor..span.start]);
        cursor = span.end;
    }
    out.push_str(&text[cursor..]);
    Some(out)
}

/// Widens a declaration span over the indentation before it and the
/// trailing blanks plus one line break after it.
fn removal_span(text: &str, span: Span, floor: usize) -> Span {
    let bytes = text.as_bytes();
    let mut start = span.start;
    while start > floor && matches!(bytes[start - 1], b' ' | b'\t') {
        start -= 1;
    }
    let mut end = span.end;
    while end < bytes.len() && matches!(bytes[end], b' ' | b'\t') {
        end += 1;
    }
    if text[end..].starts_with("\r\n") {
        end += 2;
    } else if text[end..].starts_with('\n') {
        end += 1;
    }
    Span::new(start, end)
}

fn line_ending(text: &str) -> &'static str {
    if text.contains("\r\n") { "\r\n" } else { "\n" }
}

fn trim_break_end(text: &str) -> Option<&str> {
    text.strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
}

fn trim_break_start(text: &str) -> Option<&str> {
    text.strip_prefix("\r\n")
        .or_else(|| text.strip_prefix('\n'))
}
