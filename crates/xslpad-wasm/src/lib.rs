use std::borrow::Cow;

use serde::Serialize;
use wasm_bindgen::prelude::*;
use xslpad_core::{ParameterEntry, RunStatus, TransformReply, TransformResponse, Workspace};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Analysis {
    names: Vec<String>,
    declarations: Vec<JsDeclaration>,
    block: Option<JsRange>,
    version: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsDeclaration {
    name: String,
    range: JsRange,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsRange {
    start_line: usize,
    start_col: usize,
    end_line: usize,
    end_col: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReconcileResult {
    params: Vec<ParameterEntry>,
    changed: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyResult {
    status: RunStatus,
    response: Option<TransformResponse>,
}

#[wasm_bindgen]
pub fn inject(source: &str, params: JsValue) -> Result<String, JsValue> {
    let params = params_from_js(params)?;
    Ok(xslpad_core::inject(source, &params))
}

#[wasm_bindgen]
pub fn strip(source: &str) -> String {
    xslpad_core::strip(source)
}

#[wasm_bindgen]
pub fn extract_names(source: &str) -> Result<JsValue, JsValue> {
    to_js(&xslpad_core::extract_global_names(source))
}

#[wasm_bindgen]
pub fn reconcile(source: &str, params: JsValue) -> Result<JsValue, JsValue> {
    let current = params_from_js(params)?;
    let next = xslpad_core::reconcile(source, &current);
    let result = ReconcileResult {
        changed: matches!(next, Cow::Owned(_)),
        params: next.into_owned(),
    };
    to_js(&result)
}

#[wasm_bindgen]
pub fn set_version(source: &str, version: &str) -> Result<String, JsValue> {
    let version: xslpad_core::XsltVersion = version
        .parse()
        .map_err(|err: xslpad_core::VersionError| JsValue::from_str(&err.to_string()))?;
    Ok(xslpad_core::set_version(source, version.as_str()))
}

/// Names, declaration ranges and the marker block range for editor
/// decorations.
#[wasm_bindgen]
pub fn analyze(source: &str) -> Result<JsValue, JsValue> {
    let source_map = xslpad_core::SourceMap::new(source);
    let declarations = xslpad_core::root_declarations(source)
        .into_iter()
        .filter(|declaration| !declaration.name.is_empty())
        .map(|declaration| JsDeclaration {
            range: js_range(&source_map, declaration.span),
            name: declaration.name,
        })
        .collect();
    let analysis = Analysis {
        names: xslpad_core::extract_global_names(source).into_iter().collect(),
        declarations,
        block: xslpad_core::find_block(source).map(|block| js_range(&source_map, block.span)),
        version: xslpad_core::stylesheet_version(source),
    };
    to_js(&analysis)
}

#[wasm_bindgen]
pub fn segment_diagnostics(raw: &str) -> Result<JsValue, JsValue> {
    to_js(&xslpad_core::diagnostics(raw))
}

#[wasm_bindgen]
pub fn transform_request(workspace: JsValue, trace: bool) -> Result<JsValue, JsValue> {
    let workspace = workspace_from_js(workspace)?;
    to_js(&workspace.transform_request(trace))
}

#[wasm_bindgen]
pub fn parse_transform_reply(ok: bool, body: &str) -> Result<JsValue, JsValue> {
    let reply = TransformReply::from_body(ok, body);
    let status = reply.status();
    let response = match reply {
        TransformReply::Success(response) => Some(response),
        TransformReply::Failure(_) => None,
    };
    to_js(&ReplyResult { status, response })
}

#[wasm_bindgen]
pub fn default_workspace() -> Result<JsValue, JsValue> {
    to_js(&Workspace::default())
}

#[wasm_bindgen]
pub fn import_workspace(text: &str) -> Result<JsValue, JsValue> {
    let workspace =
        Workspace::import_json(text).map_err(|err| JsValue::from_str(&err.to_string()))?;
    to_js(&workspace)
}

#[wasm_bindgen]
pub fn export_workspace(workspace: JsValue) -> Result<String, JsValue> {
    workspace_from_js(workspace)?
        .export_json()
        .map_err(|err| JsValue::from_str(&err.to_string()))
}

fn params_from_js(value: JsValue) -> Result<Vec<ParameterEntry>, JsValue> {
    if value.is_null() || value.is_undefined() {
        return Ok(Vec::new());
    }
    serde_wasm_bindgen::from_value(value).map_err(|err| JsValue::from_str(&err.to_string()))
}

fn workspace_from_js(value: JsValue) -> Result<Workspace, JsValue> {
    if value.is_null() || value.is_undefined() {
        return Ok(Workspace::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(|err| JsValue::from_str(&err.to_string()))
}

fn js_range(source_map: &xslpad_core::SourceMap, span: xslpad_core::Span) -> JsRange {
    let range = source_map.range(span);
    JsRange {
        start_line: range.start.line,
        start_col: range.start.character,
        end_line: range.end.line,
        end_col: range.end.character,
    }
}

// Plain objects instead of `Map`s so results can go straight to `JSON.stringify`.
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|err| JsValue::from_str(&err.to_string()))
}
