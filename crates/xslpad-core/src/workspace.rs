use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::ImportError;
use crate::marker::{annotate, inject, strip};
use crate::params::ParameterEntry;
use crate::reconcile::reconcile;
use crate::transform::{RunStatus, TransformReply, TransformRequest};
use crate::version::{XsltVersion, set_version, stylesheet_version};

pub const DEFAULT_STYLESHEET: &str = "<xsl:stylesheet version=\"1.0\" xmlns:xsl=\"http://www.w3.org/1999/XSL/Transform\">\n<xsl:template match=\"/\">\n<root/>\n</xsl:template>\n</xsl:stylesheet>";

pub fn default_params() -> Vec<ParameterEntry> {
    vec![ParameterEntry {
        name: "input1".to_string(),
        value: "<root/>".to_string(),
        open: true,
    }]
}

/// Edit applied to one parameter row.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParamEdit {
    Name(String),
    Value(String),
    Open(bool),
}

/// One editor tab: the clean stylesheet, its parameter rows and the last
/// run outcome.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    /// Always the clean form, without the generated block.
    pub stylesheet: String,
    pub params: Vec<ParameterEntry>,
    #[serde(default)]
    pub version: XsltVersion,
    #[serde(default)]
    pub status: RunStatus,
}

impl Default for Workspace {
    fn default() -> Self {
        Self {
            stylesheet: DEFAULT_STYLESHEET.to_string(),
            params: default_params(),
            version: XsltVersion::V1,
            status: RunStatus::Idle,
        }
    }
}

impl Workspace {
    /// The text shown in the editor and written to `.xsl` exports.
    pub fn annotated(&self) -> String {
        inject(&self.stylesheet, &self.params)
    }

    /// Takes the edited editor buffer as the new source. Returns whether
    /// the parameter list changed.
    pub fn apply_edit(&mut self, buffer: &str) -> bool {
        let changed = match reconcile(buffer, &self.params) {
            Cow::Borrowed(_) => false,
            Cow::Owned(next) => {
                self.params = next;
                true
            }
        };
        self.stylesheet = strip(buffer);
        changed
    }

    pub fn add_param(&mut self) {
        self.params.push(ParameterEntry::default());
    }

    pub fn remove_param(&mut self, index: usize) -> Option<ParameterEntry> {
        (index < self.params.len()).then(|| self.params.remove(index))
    }

    pub fn update_param(&mut self, index: usize, edit: ParamEdit) -> bool {
        let Some(entry) = self.params.get_mut(index) else {
            return false;
        };
        match edit {
            ParamEdit::Name(name) => entry.name = name,
            ParamEdit::Value(value) => entry.value = value,
            ParamEdit::Open(open) => entry.open = open,
        }
        true
    }

    pub fn set_version(&mut self, version: XsltVersion) {
        self.version = version;
        self.stylesheet = set_version(&self.stylesheet, version.as_str());
    }

    pub fn transform_request(&self, trace: bool) -> TransformRequest {
        TransformRequest::new(self.annotated(), self.version, &self.params, trace)
    }

    pub fn record(&mut self, reply: &TransformReply) {
        self.status = reply.status();
    }

    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Rebuilds a workspace from an exported document, tolerating missing
    /// or malformed parameter data. Parameters declared inline in the
    /// imported stylesheet are added to the list.
    pub fn import_json(text: &str) -> Result<Self, ImportError> {
        let value: Value = serde_json::from_str(text)?;
        let Value::Object(map) = value else {
            return Err(ImportError::NotAnObject);
        };
        let stylesheet = ["stylesheet", "xslt"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .filter(|text| !text.trim().is_empty())
            .ok_or(ImportError::MissingStylesheet)?;

        let params = match map.get("params") {
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(idx, item)| param_from_value(idx, item))
                .collect(),
            _ => {
                debug!("imported workspace has no parameter list, using defaults");
                default_params()
            }
        };
        let version = map
            .get("version")
            .and_then(version_from_value)
            .or_else(|| stylesheet_version(stylesheet).and_then(|v| v.parse().ok()))
            .unwrap_or_default();

        let status = map
            .get("status")
            .and_then(|value| RunStatus::deserialize(value).ok())
            .unwrap_or_default();

        let params = reconcile(&annotate(stylesheet, &params), &params).into_owned();
        Ok(Self {
            stylesheet: strip(stylesheet),
            params,
            version,
            status,
        })
    }
}

fn param_from_value(idx: usize, item: &Value) -> ParameterEntry {
    let field = |key: &str| item.as_object().and_then(|obj| obj.get(key));
    ParameterEntry {
        name: field("name")
            .and_then(Value::as_str)
            .map_or_else(|| format!("param{}", idx + 1), str::to_string),
        value: field("value")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        open: field("open").and_then(Value::as_bool).unwrap_or(false),
    }
}

fn version_from_value(value: &Value) -> Option<XsltVersion> {
    match value {
        Value::String(text) => text.parse().ok(),
        Value::Number(number) => number.to_string().parse().ok(),
        _ => None,
    }
}
