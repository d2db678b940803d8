//! Payloads exchanged with the transform service. The call itself is made
//! by the host application; this module only builds the request and
//! interprets the reply.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::diagnostic::{Diagnostic, DiagnosticSeverity, diagnostics};
use crate::params::ParameterEntry;
use crate::version::XsltVersion;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TransformRequest {
    /// Annotated stylesheet text.
    pub xslt: String,
    pub version: XsltVersion,
    pub parameters: IndexMap<String, String>,
    pub trace: bool,
}

impl TransformRequest {
    pub fn new(
        xslt: impl Into<String>,
        version: XsltVersion,
        params: &[ParameterEntry],
        trace: bool,
    ) -> Self {
        Self {
            xslt: xslt.into(),
            version,
            parameters: parameter_map(params),
            trace,
        }
    }
}

/// Name to value mapping for named entries. A repeated name keeps its
/// first position and takes the last value.
pub fn parameter_map(params: &[ParameterEntry]) -> IndexMap<String, String> {
    let mut map = IndexMap::new();
    for entry in params.iter().filter(|entry| entry.is_named()) {
        map.insert(entry.name.clone(), entry.value.clone());
    }
    map
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TraceEntry {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TransformResponse {
    pub result: String,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<Vec<TraceEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_text: Option<String>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TransformReply {
    Success(TransformResponse),
    Failure(Vec<Diagnostic>),
}

impl TransformReply {
    /// Interprets a reply body. `ok` is the transport-level success flag
    /// (an HTTP 2xx status, for instance).
    pub fn from_body(ok: bool, body: &str) -> Self {
        if ok {
            match serde_json::from_str::<TransformResponse>(body) {
                Ok(response) => return TransformReply::Success(response),
                Err(err) => debug!(%err, "transform response is not a result payload"),
            }
        }
        let mut found = diagnostics(&failure_text(body));
        if found.is_empty() {
            found.push(Diagnostic::new(
                Some(DiagnosticSeverity::Error),
                "transform failed without diagnostics",
            ));
        }
        TransformReply::Failure(found)
    }

    pub fn status(&self) -> RunStatus {
        match self {
            TransformReply::Success(response) => RunStatus::Succeeded {
                duration_ms: response.duration_ms,
            },
            TransformReply::Failure(diagnostics) => RunStatus::Failed {
                diagnostics: diagnostics.clone(),
            },
        }
    }
}

/// Outcome of the most recent run, kept with the workspace.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum RunStatus {
    #[default]
    Idle,
    Succeeded {
        duration_ms: u64,
    },
    Failed {
        diagnostics: Vec<Diagnostic>,
    },
}

fn failure_text(body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        if let Some(Value::String(error)) = map.get("error") {
            return error.clone();
        }
    }
    body.to_string()
}
