//! Segmentation of freeform diagnostic text returned by the transform
//! service. This is a heuristic: entries start at a severity keyword at the
//! start of a line, there is no grammar behind it.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static SEVERITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(Warning|Error)\b").expect("severity regex"));

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

impl DiagnosticSeverity {
    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "Error" => Some(DiagnosticSeverity::Error),
            "Warning" => Some(DiagnosticSeverity::Warning),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// `None` for a leading chunk that carries no keyword.
    pub severity: Option<DiagnosticSeverity>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(severity: Option<DiagnosticSeverity>, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

/// Splits raw diagnostic text into trimmed entries.
pub fn segment(raw: &str) -> Vec<String> {
    diagnostics(raw)
        .into_iter()
        .map(|diagnostic| diagnostic.message)
        .collect()
}

/// Same segmentation as [`segment`], keeping the severity of each entry.
pub fn diagnostics(raw: &str) -> Vec<Diagnostic> {
    let starts: Vec<(usize, &str)> = SEVERITY_RE
        .captures_iter(raw)
        .filter_map(|caps| caps.get(1))
        .map(|keyword| (keyword.start(), keyword.as_str()))
        .collect();

    let mut out = Vec::new();
    let first = starts.first().map_or(raw.len(), |(start, _)| *start);
    push_chunk(&mut out, None, &raw[..first]);
    for (idx, (start, keyword)) in starts.iter().enumerate() {
        let end = starts.get(idx + 1).map_or(raw.len(), |(next, _)| *next);
        push_chunk(
            &mut out,
            DiagnosticSeverity::from_keyword(keyword),
            &raw[*start..end],
        );
    }
    out
}

fn push_chunk(out: &mut Vec<Diagnostic>, severity: Option<DiagnosticSeverity>, chunk: &str) {
    let chunk = chunk.trim();
    if !chunk.is_empty() {
        out.push(Diagnostic::new(severity, chunk));
    }
}
