//! Input contract: the Stage 1 OCR artifact.
//!
//! Tokens are never mutated here; sanitization operates on copies and the
//! original artifact stays read-only for the whole run.

use crate::geometry::BBox;
use serde::{Deserialize, Serialize};

/// One OCR-detected text element with pixel geometry and confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrToken {
    /// Stable, document-unique identifier minted by Stage 1; opaque here
    /// except that it encodes the page number.
    pub token_id: String,
    pub page_num: u32,
    pub text: String,
    pub bbox: BBox,
    /// Normalized confidence in `[0, 1]`; absent means the engine reported none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Engine-native confidence, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_confidence: Option<f64>,
}

/// One page of the OCR artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrPage {
    /// 1-indexed page number.
    pub page_num: u32,
    /// Reference to the rasterized page image this page was OCR'd from.
    pub image_relpath: String,
    pub image_width: u32,
    pub image_height: u32,
    #[serde(default)]
    pub tokens: Vec<OcrToken>,
}

/// Document-level OCR artifact: the sole input of the grouping stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrArtifact {
    pub doc_id: String,
    /// OCR engine tag, informational only.
    #[serde(default)]
    pub engine: String,
    pub pages: Vec<OcrPage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_image_relpath: Option<String>,
}
