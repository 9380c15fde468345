//! Error types for pagegroup.
//!
//! Exactly five kinds are visible to callers; everything that can go wrong
//! maps onto one of them at the boundary where it is detected. Nothing is
//! silently recovered: bbox repairs and similar non-fatal events are
//! warnings in the artifact meta, not errors.

use serde_json::json;
use thiserror::Error;

/// Result type alias using `GroupingError`.
pub type Result<T> = std::result::Result<T, GroupingError>;

/// The caller-visible error taxonomy.
///
/// - `InputMissing` - the OCR artifact path does not exist or is unreadable
/// - `InputMalformed` - schema violation, duplicate `token_id`, or `page_num`
///   mismatch; carries the offending identifiers when known
/// - `ConfigInvalid` - out-of-range configuration, raised before any processing
/// - `OutputUnwritable` - the output path cannot be written
/// - `InternalInvariantViolated` - a bug: a structural invariant failed in the
///   post-build audit; carries the invariant name
#[derive(Debug, Error)]
pub enum GroupingError {
    #[error("input artifact missing: {path}: {message}")]
    InputMissing { path: String, message: String },

    #[error("input artifact malformed: {message}")]
    InputMalformed {
        message: String,
        token_id: Option<String>,
        page_num: Option<u32>,
    },

    #[error("invalid configuration: {message}")]
    ConfigInvalid { message: String },

    #[error("cannot write output artifact: {path}: {message}")]
    OutputUnwritable { path: String, message: String },

    #[error("internal invariant violated: {invariant}: {message}")]
    InternalInvariantViolated {
        invariant: &'static str,
        message: String,
    },
}

impl GroupingError {
    /// Create an `InputMalformed` error with no offending identifiers.
    pub fn input_malformed<S: Into<String>>(message: S) -> Self {
        Self::InputMalformed {
            message: message.into(),
            token_id: None,
            page_num: None,
        }
    }

    /// Create an `InputMalformed` error naming the offending token.
    pub fn malformed_token<S: Into<String>>(message: S, token_id: &str, page_num: u32) -> Self {
        Self::InputMalformed {
            message: message.into(),
            token_id: Some(token_id.to_string()),
            page_num: Some(page_num),
        }
    }

    /// Create an `InputMalformed` error naming the offending page.
    pub fn malformed_page<S: Into<String>>(message: S, page_num: u32) -> Self {
        Self::InputMalformed {
            message: message.into(),
            token_id: None,
            page_num: Some(page_num),
        }
    }

    /// Create a `ConfigInvalid` error.
    pub fn config_invalid<S: Into<String>>(message: S) -> Self {
        Self::ConfigInvalid {
            message: message.into(),
        }
    }

    /// Create an `InternalInvariantViolated` error.
    pub fn invariant<S: Into<String>>(invariant: &'static str, message: S) -> Self {
        Self::InternalInvariantViolated {
            invariant,
            message: message.into(),
        }
    }

    /// Stable machine-readable name for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InputMissing { .. } => "InputMissing",
            Self::InputMalformed { .. } => "InputMalformed",
            Self::ConfigInvalid { .. } => "ConfigInvalid",
            Self::OutputUnwritable { .. } => "OutputUnwritable",
            Self::InternalInvariantViolated { .. } => "InternalInvariantViolated",
        }
    }

    /// Render the single structured error object emitted on the error stream.
    ///
    /// The record always carries `kind` and `message`; offending identifiers
    /// and the invariant name appear only when they exist, so consumers can
    /// key on presence rather than null-checking.
    pub fn to_record(&self) -> serde_json::Value {
        let mut inner = serde_json::Map::new();
        inner.insert("kind".to_string(), json!(self.kind()));
        inner.insert("message".to_string(), json!(self.to_string()));
        match self {
            Self::InputMissing { path, .. } | Self::OutputUnwritable { path, .. } => {
                inner.insert("path".to_string(), json!(path));
            }
            Self::InputMalformed {
                token_id, page_num, ..
            } => {
                if let Some(token_id) = token_id {
                    inner.insert("token_id".to_string(), json!(token_id));
                }
                if let Some(page_num) = page_num {
                    inner.insert("page_num".to_string(), json!(page_num));
                }
            }
            Self::ConfigInvalid { .. } => {}
            Self::InternalInvariantViolated { invariant, .. } => {
                inner.insert("invariant".to_string(), json!(invariant));
            }
        }
        json!({ "error": serde_json::Value::Object(inner) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_are_stable() {
        let err = GroupingError::input_malformed("bad");
        assert_eq!(err.kind(), "InputMalformed");

        let err = GroupingError::config_invalid("bad");
        assert_eq!(err.kind(), "ConfigInvalid");

        let err = GroupingError::invariant("partition_tokens_lines", "oops");
        assert_eq!(err.kind(), "InternalInvariantViolated");
    }

    #[test]
    fn test_display_includes_offenders() {
        let err = GroupingError::malformed_token("duplicate token_id 'p001_t000001'", "p001_t000001", 1);
        assert!(err.to_string().contains("p001_t000001"));
    }

    #[test]
    fn test_record_shape() {
        let err = GroupingError::malformed_token("duplicate token_id", "p001_t000001", 1);
        let record = err.to_record();
        assert_eq!(record["error"]["kind"], "InputMalformed");
        assert_eq!(record["error"]["token_id"], "p001_t000001");
        assert_eq!(record["error"]["page_num"], 1);
    }

    #[test]
    fn test_record_omits_absent_identifiers() {
        let err = GroupingError::input_malformed("not valid JSON");
        let record = err.to_record();
        assert!(record["error"].get("token_id").is_none());
        assert!(record["error"].get("page_num").is_none());
    }

    #[test]
    fn test_invariant_record_names_invariant() {
        let err = GroupingError::invariant("bbox_tightness", "line p001_l000000 bbox is not tight");
        let record = err.to_record();
        assert_eq!(record["error"]["invariant"], "bbox_tightness");
    }
}
