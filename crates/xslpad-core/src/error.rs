#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("workspace file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("workspace file must be a JSON object")]
    NotAnObject,

    #[error("workspace file has no stylesheet text")]
    MissingStylesheet,
}

#[derive(Debug, thiserror::Error)]
pub enum VersionError {
    #[error("unsupported XSLT version: {0:?} (expected 1.0 or 2.0)")]
    Unsupported(String),
}
