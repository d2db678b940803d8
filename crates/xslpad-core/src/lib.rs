//! Parameter synchronization engine for an interactive XSLT editor.
//!
//! Stylesheet text is handled as text, never parsed into a tree: editors
//! hold invalid XML most of the time while the user types. Every operation
//! here is total and degrades to returning its input unchanged.

mod diagnostic;
mod error;
mod marker;
mod params;
mod reconcile;
mod scan;
mod scope;
mod source_map;
mod span;
mod transform;
mod version;
mod workspace;

pub use diagnostic::{Diagnostic, DiagnosticSeverity, diagnostics, segment};
pub use error::{ImportError, VersionError};
pub use marker::{MarkerBlock, PARAM_END, PARAM_START, annotate, find_block, inject, strip};
pub use params::ParameterEntry;
pub use reconcile::reconcile;
pub use scan::{Attribute, Attributes, Tag, TagKind, Tags, find_root, tags, tags_from};
pub use scope::{Declaration, block_names, extract_global_names, root_declarations};
pub use source_map::{Position, Range, SourceMap};
pub use span::Span;
pub use transform::{
    RunStatus, TraceEntry, TransformReply, TransformRequest, TransformResponse, parameter_map,
};
pub use version::{XsltVersion, set_version, stylesheet_version};
pub use workspace::{DEFAULT_STYLESHEET, ParamEdit, Workspace, default_params};
