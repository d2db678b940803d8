use serde::{Deserialize, Serialize};

/// One row of the parameter panel: a global stylesheet parameter and the
/// value supplied for it when the stylesheet is run.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterEntry {
    /// May be empty while the user is still naming a new row.
    pub name: String,
    /// Opaque to the engine, usually an XML fragment.
    pub value: String,
    /// Whether the row is expanded in the panel.
    pub open: bool,
}

impl ParameterEntry {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            open: false,
        }
    }

    /// Row created for a name discovered in the stylesheet text.
    pub fn discovered(name: impl Into<String>) -> Self {
        Self::new(name, "")
    }

    pub fn is_named(&self) -> bool {
        !self.name.is_empty()
    }
}
