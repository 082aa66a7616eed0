//! Extraction configuration.
//!
//! Loaded from YAML; every key is optional.
//!
//! ```yaml
//! emit-doc-comments: true
//! emit-usages: false
//! max-ast-value-chars: 4096
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Conventional configuration file name.
pub const CONFIG_FILE_NAME: &str = "tessera.yaml";

/// Options controlling which records the extractor emits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct ExtractorConfig {
    /// Emit `DocComment` records for documented declarations
    pub emit_doc_comments: bool,

    /// Emit usage `AstNode` records for resolved invocations
    pub emit_usages: bool,

    /// Truncate `AstNode::ast_value` to this many chars (no limit when unset)
    pub max_ast_value_chars: Option<usize>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            emit_doc_comments: true,
            emit_usages: true,
            max_ast_value_chars: None,
        }
    }
}

impl ExtractorConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file can't be read and `Error::Config` if
    /// it isn't valid configuration.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the text isn't valid configuration.
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Apply the AST value limit to raw node text.
    #[must_use]
    pub fn clip_ast_value(&self, text: &str) -> String {
        match self.max_ast_value_chars {
            Some(limit) => text.chars().take(limit).collect(),
            None => text.to_string(),
        }
    }
}
