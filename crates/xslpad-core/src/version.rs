use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::VersionError;
use crate::scan;

/// XSLT versions accepted by the transform service.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum XsltVersion {
    #[default]
    #[serde(rename = "1.0")]
    V1,
    #[serde(rename = "2.0")]
    V2,
}

impl XsltVersion {
    pub fn as_str(self) -> &'static str {
        match self {
            XsltVersion::V1 => "1.0",
            XsltVersion::V2 => "2.0",
        }
    }
}

impl fmt::Display for XsltVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for XsltVersion {
    type Err = VersionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "1.0" | "1" => Ok(XsltVersion::V1),
            "2.0" | "2" => Ok(XsltVersion::V2),
            other => Err(VersionError::Unsupported(other.to_string())),
        }
    }
}

/// Sets the `version` attribute of the root stylesheet element.
///
/// A quoted value is replaced inside its quotes. A `version` attribute that
/// is bare or still missing its value is rewritten as a whole; otherwise
/// the attribute is appended after the last attribute of the open tag.
/// Text without a root element is returned unchanged.
pub fn set_version(source: &str, version: &str) -> String {
    let Some(root) = scan::find_root(source) else {
        debug!("no root stylesheet element, version not set");
        return source.to_string();
    };
    let escaped = htmlize::escape_attribute(version);
    match root.attribute("version") {
        Some(attr) if attr.quoted => {
            splice(source, attr.value_span.start, attr.value_span.end, &escaped)
        }
        Some(attr) => splice(
            source,
            attr.span.start,
            attr.span.end,
            &format!("version=\"{}\"", escaped),
        ),
        None => {
            let at = root.attributes_end();
            splice(source, at, at, &format!(" version=\"{}\"", escaped))
        }
    }
}

/// Value of the root element's `version` attribute, if any.
pub fn stylesheet_version(source: &str) -> Option<String> {
    let root = scan::find_root(source)?;
    let attr = root.attribute("version")?;
    Some(htmlize::unescape_attribute(attr.value).into_owned())
}

fn splice(source: &str, start: usize, end: usize, replacement: &str) -> String {
    let mut out = String::with_capacity(source.len() + replacement.len());
    out.push_str(&source[..start]);
    out.push_str(replacement);
    out.push_str(&source[end..]);
    out
}
