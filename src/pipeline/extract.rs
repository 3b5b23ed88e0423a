//! Text extraction: normalise any supported document into one text blob.
//!
//! PDFs go through the rasteriser first and each page is OCR'd
//! independently; page texts are joined with a single space in page
//! order. Images are OCR'd as-is. Within one image, the OCR engine's own
//! span order is authoritative — this layer performs no re-sorting.

use crate::error::AnalyzeError;
use crate::ocr::OcrEngine;
use crate::output::ExtractedText;
use crate::pipeline::raster::PageRasterizer;
use crate::request::{Document, DocumentKind};
use tracing::debug;

/// Extract the text of one document.
///
/// Returns exactly one [`ExtractedText`] or an
/// [`AnalyzeError::Extraction`] naming the document.
pub async fn extract_document(
    rasterizer: &dyn PageRasterizer,
    ocr: &dyn OcrEngine,
    document: &Document,
) -> Result<ExtractedText, AnalyzeError> {
    let text = match document.kind {
        DocumentKind::Pdf => extract_pdf(rasterizer, ocr, document).await?,
        DocumentKind::Image => ocr_image(ocr, &document.bytes, &document.filename).await?,
    };

    debug!(
        "Extracted {} chars from '{}'",
        text.len(),
        document.filename
    );

    Ok(ExtractedText {
        filename: document.filename.clone(),
        text,
    })
}

/// Rasterise a PDF and OCR each page independently, joining page texts
/// with a single space in page order.
async fn extract_pdf(
    rasterizer: &dyn PageRasterizer,
    ocr: &dyn OcrEngine,
    document: &Document,
) -> Result<String, AnalyzeError> {
    let pages = rasterizer
        .rasterize(&document.bytes)
        .await
        .map_err(|e| AnalyzeError::Extraction {
            filename: document.filename.clone(),
            detail: e.to_string(),
        })?;

    let mut page_texts = Vec::with_capacity(pages.len());
    for page in &pages {
        page_texts.push(ocr_image(ocr, page, &document.filename).await?);
    }
    Ok(page_texts.join(" "))
}

/// Run the OCR engine over one image and join its span texts with a
/// single space, in the order the engine returned them.
async fn ocr_image(
    ocr: &dyn OcrEngine,
    image: &[u8],
    filename: &str,
) -> Result<String, AnalyzeError> {
    let spans = ocr
        .recognize(image)
        .await
        .map_err(|e| AnalyzeError::Extraction {
            filename: filename.to_string(),
            detail: e.to_string(),
        })?;

    Ok(spans
        .into_iter()
        .map(|s| s.text)
        .collect::<Vec<_>>()
        .join(" "))
}
