//! Compiler options, loadable from JSON.

use kite_binder::BindOptions;
use serde::{Deserialize, Serialize};

/// Options of one compilation, matching the `kite.json` schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerOptions {
    /// Compile global statements as a script returning their last value.
    pub script: bool,
    pub main_type_name: String,
    pub check_definite_assignment: bool,
    /// Keep at most this many diagnostics after sorting.
    pub max_diagnostics: Option<usize>,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        let bind = BindOptions::default();
        Self {
            script: bind.script,
            main_type_name: bind.main_type_name,
            check_definite_assignment: bind.check_definite_assignment,
            max_diagnostics: None,
        }
    }
}

impl CompilerOptions {
    /// Parse options from JSON. Missing keys take their default.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn bind_options(&self) -> BindOptions {
        BindOptions {
            script: self.script,
            main_type_name: self.main_type_name.clone(),
            check_definite_assignment: self.check_definite_assignment,
        }
    }
}
