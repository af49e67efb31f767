//! # Generation Configuration
//!
//! [`GenerationConfig`] is supplied by the caller and never changes for the
//! lifetime of a generation. It can be built in code with the `with_*` setters
//! or loaded from a JSON document using the usual `generation_config.json`
//! field names.
//!
//! ```rust
//! use griddle::config::GenerationConfig;
//!
//! let config = GenerationConfig::from_json_str(
//!     r#"{ "bos_token_id": 0, "eos_token_id": 2, "pad_token_id": 1, "max_new_tokens": 32 }"#,
//! ).unwrap();
//! assert_eq!(config.max_tokens, Some(32));
//! assert!(config.is_bounded());
//! ```

use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::error::Result;

/// How the attention bit appended for each row is chosen after a step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttentionPolicy {
    /// The appended bit depends only on the token sampled this step: `0` for the
    /// end-of-sequence or padding token, `1` otherwise. A finished row that samples
    /// an ordinary token again is attended again.
    #[default]
    LastToken,

    /// As [`AttentionPolicy::LastToken`], but once a row has finished every later
    /// position of that row is masked.
    Sticky,
}

/// Where blocking model forward passes run when a session is built from blocking models.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Run on the task driving the generation.
    #[default]
    Inline,

    /// Run on tokio's blocking worker pool, suspending the generation until done.
    Proxied,
}

/// Caller supplied settings for one generation.
///
/// At least one of `max_tokens`, `max_length` or `eos_token_id` should be set,
/// otherwise generation never stops on its own. This is the caller's
/// responsibility; see [`GenerationConfig::is_bounded`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// The first token of every row when no initial decoder input is supplied
    pub bos_token_id: i64,

    /// Marks a row as finished and masks its position
    #[serde(default)]
    pub eos_token_id: Option<i64>,

    /// Masks its position without finishing the row
    #[serde(default)]
    pub pad_token_id: Option<i64>,

    /// Hard cap on the number of decode steps
    #[serde(default, alias = "max_new_tokens")]
    pub max_tokens: Option<usize>,

    /// Hard cap on decoded length. Counts decode steps, exactly like `max_tokens`.
    #[serde(default)]
    pub max_length: Option<usize>,

    #[serde(default)]
    pub attention_policy: AttentionPolicy,

    #[serde(default)]
    pub execution_mode: ExecutionMode,
}

impl GenerationConfig {
    /// A configuration with only a beginning-of-sequence token. Add a stopping
    /// criterion before generating.
    pub fn new(bos_token_id: i64) -> Self {
        Self {
            bos_token_id,
            eos_token_id: None,
            pad_token_id: None,
            max_tokens: None,
            max_length: None,
            attention_policy: AttentionPolicy::default(),
            execution_mode: ExecutionMode::default(),
        }
    }

    pub fn with_eos_token_id(mut self, eos_token_id: i64) -> Self {
        self.eos_token_id = Some(eos_token_id);
        self
    }

    pub fn with_pad_token_id(mut self, pad_token_id: i64) -> Self {
        self.pad_token_id = Some(pad_token_id);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn with_attention_policy(mut self, attention_policy: AttentionPolicy) -> Self {
        self.attention_policy = attention_policy;
        self
    }

    pub fn with_execution_mode(mut self, execution_mode: ExecutionMode) -> Self {
        self.execution_mode = execution_mode;
        self
    }

    /// Parse a configuration from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// True if some criterion can end generation.
    ///
    /// A zero cap never matches the step counter, which starts counting at one,
    /// so it is not treated as a bound.
    pub fn is_bounded(&self) -> bool {
        matches!(self.max_tokens, Some(n) if n > 0)
            || matches!(self.max_length, Some(n) if n > 0)
            || self.eos_token_id.is_some()
    }

    /// Whether `token` closes its row's live attention span.
    pub(crate) fn masks(&self, token: i64) -> bool {
        self.eos_token_id == Some(token) || self.pad_token_id == Some(token)
    }
}
