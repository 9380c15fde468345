//! Shared builders for integration tests.

use pagegroup::{BBox, OcrArtifact, OcrPage, OcrToken};

pub fn token(
    id: &str,
    page_num: u32,
    text: &str,
    bbox: (i64, i64, i64, i64),
    confidence: Option<f64>,
) -> OcrToken {
    OcrToken {
        token_id: id.to_string(),
        page_num,
        text: text.to_string(),
        bbox: BBox::new(bbox.0, bbox.1, bbox.2, bbox.3),
        confidence,
        raw_confidence: confidence.map(|c| c * 100.0),
    }
}

pub fn page(page_num: u32, tokens: Vec<OcrToken>) -> OcrPage {
    OcrPage {
        page_num,
        image_relpath: format!("pages/page_{page_num:03}.png"),
        image_width: 2480,
        image_height: 3508,
        tokens,
    }
}

pub fn doc(pages: Vec<OcrPage>) -> OcrArtifact {
    OcrArtifact {
        doc_id: "doc_test_abc".to_string(),
        engine: "tesseract".to_string(),
        pages,
        source_image_relpath: Some("incoming/doc_test_abc.pdf".to_string()),
    }
}
