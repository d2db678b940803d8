//! Forward-only tag scanner for stylesheet text.
//!
//! The scanner does not check well-formedness. It only finds tag-shaped
//! text, skipping markup that cannot hold live declarations (comments,
//! CDATA sections, processing instructions, doctype declarations). A tag
//! interrupted by another `<` is skipped; an unterminated comment, section
//! or quoted value ends the scan, and the rest is treated as text the user
//! is still typing.

use crate::span::Span;

pub(crate) const XSL_PREFIX: &str = "xsl:";

const ROOT_NAMES: &[&str] = &["stylesheet", "transform"];
const CALLABLE_NAMES: &[&str] = &["template", "function"];

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TagKind {
    Start,
    End,
    Empty,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Tag<'a> {
    pub kind: TagKind,
    pub name: &'a str,
    /// From `<` up to and including `>`.
    pub span: Span,
    raw: &'a str,
    name_end: usize,
}

impl<'a> Tag<'a> {
    pub fn opens(&self) -> bool {
        matches!(self.kind, TagKind::Start | TagKind::Empty)
    }

    /// Local name when the tag is in the `xsl:` prefix.
    pub fn xsl_name(&self) -> Option<&'a str> {
        self.name.strip_prefix(XSL_PREFIX)
    }

    pub fn is_xsl(&self, local: &str) -> bool {
        self.xsl_name() == Some(local)
    }

    pub fn is_root(&self) -> bool {
        self.opens()
            && self
                .xsl_name()
                .is_some_and(|local| ROOT_NAMES.contains(&local))
    }

    pub fn is_callable(&self) -> bool {
        self.opens()
            && self
                .xsl_name()
                .is_some_and(|local| CALLABLE_NAMES.contains(&local))
    }

    pub fn attributes(&self) -> Attributes<'a> {
        Attributes {
            raw: self.raw,
            base: self.span.start,
            pos: self.name_end,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<Attribute<'a>> {
        self.attributes().find(|attr| attr.name == name)
    }

    /// Offset just past the last attribute: where a new attribute goes.
    pub fn attributes_end(&self) -> usize {
        let closer = match self.kind {
            TagKind::Empty => 2,
            _ => 1,
        };
        let inner = &self.raw[..self.raw.len() - closer];
        self.span.start + inner.trim_end().len()
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Attribute<'a> {
    pub name: &'a str,
    /// Raw value text, entities not expanded.
    pub value: &'a str,
    /// Span of the value without its quotes.
    pub value_span: Span,
    /// The whole `name="value"` token.
    pub span: Span,
    /// Whether the value sits between matching quotes.
    pub quoted: bool,
}

pub struct Attributes<'a> {
    raw: &'a str,
    base: usize,
    pos: usize,
}

impl<'a> Iterator for Attributes<'a> {
    type Item = Attribute<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.raw.as_bytes();
        let mut i = self.pos;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() || matches!(bytes[i], b'>' | b'/') {
            self.pos = bytes.len();
            return None;
        }
        let name_start = i;
        while i < bytes.len()
            && !bytes[i].is_ascii_whitespace()
            && !matches!(bytes[i], b'=' | b'>' | b'/')
        {
            i += 1;
        }
        let name = &self.raw[name_start..i];
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if bytes.get(i) != Some(&b'=') {
            // Bare attribute name (HTML style or mid-edit), no value.
            let name_end = name_start + name.len();
            self.pos = i;
            return Some(Attribute {
                name,
                value: "",
                value_span: Span::new(self.base + name_end, self.base + name_end),
                span: Span::new(self.base + name_start, self.base + name_end),
                quoted: false,
            });
        }
        i += 1;
        let after_eq = i;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let (value_start, value_end, next, quoted) = match bytes.get(i) {
            Some(&quote) if quote == b'"' || quote == b'\'' => {
                let start = i + 1;
                match self.raw[start..].find(quote as char) {
                    Some(rel) => (start, start + rel, start + rel + 1, true),
                    None => (start, bytes.len(), bytes.len(), false),
                }
            }
            // `name=` followed by blanks: the value is still being typed and
            // whatever follows belongs to the next attribute.
            _ if i > after_eq => (after_eq, after_eq, after_eq, false),
            _ => {
                let start = i;
                while i < bytes.len()
                    && !bytes[i].is_ascii_whitespace()
                    && !matches!(bytes[i], b'>' | b'/')
                {
                    i += 1;
                }
                (start, i, i, false)
            }
        };
        self.pos = next;
        Some(Attribute {
            name,
            value: &self.raw[value_start..value_end],
            value_span: Span::new(self.base + value_start, self.base + value_end),
            span: Span::new(self.base + name_start, self.base + next),
            quoted,
        })
    }
}

#[derive(Clone, Debug)]
pub struct Tags<'a> {
    source: &'a str,
    pos: usize,
}

pub fn tags(source: &str) -> Tags<'_> {
    tags_from(source, 0)
}

pub fn tags_from(source: &str, offset: usize) -> Tags<'_> {
    Tags {
        source,
        pos: offset.min(source.len()),
    }
}

impl<'a> Iterator for Tags<'a> {
    type Item = Tag<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.source.as_bytes();
        loop {
            let start = self.pos + self.source[self.pos..].find('<')?;
            let rest = &self.source[start..];
            if rest.starts_with("<!--") {
                self.pos = skip_past(self.source, start + 4, "-->")?;
                continue;
            }
            if rest.starts_with("<![CDATA[") {
                self.pos = skip_past(self.source, start + 9, "]]>")?;
                continue;
            }
            if rest.starts_with("<?") {
                self.pos = skip_past(self.source, start + 2, "?>")?;
                continue;
            }
            if rest.starts_with("<!") {
                self.pos = skip_past(self.source, start + 2, ">")?;
                continue;
            }

            let closing = bytes.get(start + 1) == Some(&b'/');
            let name_start = if closing { start + 2 } else { start + 1 };
            if !bytes.get(name_start).copied().is_some_and(is_name_start) {
                self.pos = start + 1;
                continue;
            }
            let mut name_end = name_start + 1;
            while name_end < bytes.len() && is_name_char(bytes[name_end]) {
                name_end += 1;
            }
            let gt = match find_tag_end(bytes, name_end) {
                TagEnd::Closed(gt) => gt,
                TagEnd::Interrupted(next) => {
                    self.pos = next;
                    continue;
                }
                TagEnd::Unterminated => {
                    self.pos = self.source.len();
                    return None;
                }
            };
            let end = gt + 1;
            self.pos = end;
            let kind = if closing {
                TagKind::End
            } else if gt > name_end && bytes[gt - 1] == b'/' {
                TagKind::Empty
            } else {
                TagKind::Start
            };
            return Some(Tag {
                kind,
                name: &self.source[name_start..name_end],
                span: Span::new(start, end),
                raw: &self.source[start..end],
                name_end: name_end - start,
            });
        }
    }
}

/// First root element open tag (`xsl:stylesheet` or `xsl:transform`).
pub fn find_root(source: &str) -> Option<Tag<'_>> {
    tags(source).find(Tag::is_root)
}

fn skip_past(source: &str, from: usize, terminator: &str) -> Option<usize> {
    source[from..]
        .find(terminator)
        .map(|rel| from + rel + terminator.len())
}

enum TagEnd {
    Closed(usize),
    /// Another tag opens before this one closed; resume there.
    Interrupted(usize),
    Unterminated,
}

/// Finds the `>` that closes a tag, ignoring `>` inside quoted values.
fn find_tag_end(bytes: &[u8], from: usize) -> TagEnd {
    let mut quote: Option<u8> = None;
    for (idx, &b) in bytes.iter().enumerate().skip(from) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'<' => return TagEnd::Interrupted(idx),
            None if b == b'>' => return TagEnd::Closed(idx),
            None => {}
        }
    }
    TagEnd::Unterminated
}

fn is_name_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

fn is_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.' | b':') || b >= 0x80
}
