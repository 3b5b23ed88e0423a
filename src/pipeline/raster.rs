//! PDF rasterisation: render every page to a PNG byte buffer via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async
//! contexts. `tokio::task::spawn_blocking` moves the work onto the
//! blocking thread pool, preventing the Tokio worker threads from
//! stalling during CPU-heavy rendering.
//!
//! ## Why PNG?
//!
//! Lossless compression preserves text crispness. JPEG artefacts on
//! rendered text degrade OCR accuracy, especially at 150 DPI.
//!
//! ## Why cap pixels in addition to DPI?
//!
//! Page sizes vary: an A3 scan at 150 DPI already exceeds 2400 px on the
//! long edge. `max_pixels` caps the longest edge regardless of physical
//! size, keeping rasterisation memory bounded for arbitrary inputs.

use async_trait::async_trait;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::io::Cursor;
use tracing::debug;

/// Turns a PDF byte buffer into an ordered sequence of page images.
#[async_trait]
pub trait PageRasterizer: Send + Sync {
    /// Rasterise all pages, in page order, as PNG byte buffers.
    async fn rasterize(&self, pdf: &[u8]) -> Result<Vec<Vec<u8>>, RasterError>;
}

/// Rasterisation failure for one document.
#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    /// The buffer does not start with the `%PDF` magic.
    #[error("not a PDF (first bytes: {magic:?})")]
    NotAPdf { magic: Vec<u8> },

    /// pdfium could not parse the document.
    #[error("corrupt PDF: {0}")]
    Corrupt(String),

    /// A specific page failed to render or encode.
    #[error("page {page} failed: {detail}")]
    Page { page: usize, detail: String },

    /// The render task panicked or pdfium could not be bound.
    #[error("rasteriser internal error: {0}")]
    Internal(String),
}

/// Production rasteriser backed by pdfium.
///
/// `dpi` fixes the target resolution (150 balances OCR accuracy against
/// memory and latency); `max_pixels` caps the longest rendered edge.
#[derive(Debug, Clone)]
pub struct PdfiumRasterizer {
    dpi: u32,
    max_pixels: u32,
}

impl PdfiumRasterizer {
    pub fn new(dpi: u32, max_pixels: u32) -> Self {
        Self { dpi, max_pixels }
    }
}

#[async_trait]
impl PageRasterizer for PdfiumRasterizer {
    async fn rasterize(&self, pdf: &[u8]) -> Result<Vec<Vec<u8>>, RasterError> {
        if pdf.len() < 4 || &pdf[..4] != b"%PDF" {
            return Err(RasterError::NotAPdf {
                magic: pdf.iter().take(4).copied().collect(),
            });
        }

        let bytes = pdf.to_vec();
        let dpi = self.dpi;
        let max_pixels = self.max_pixels;

        tokio::task::spawn_blocking(move || rasterize_blocking(&bytes, dpi, max_pixels))
            .await
            .map_err(|e| RasterError::Internal(format!("render task panicked: {e}")))?
    }
}

/// Blocking implementation of page rendering.
fn rasterize_blocking(bytes: &[u8], dpi: u32, max_pixels: u32) -> Result<Vec<Vec<u8>>, RasterError> {
    let pdfium = Pdfium::default();

    let document = pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|e| RasterError::Corrupt(format!("{e:?}")))?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    debug!("PDF loaded: {} pages", total_pages);

    let mut rendered = Vec::with_capacity(total_pages);

    for (idx, page) in pages.iter().enumerate() {
        // Points are 1/72 inch, so width_px = width_pts / 72 * dpi,
        // capped at max_pixels on the long edge.
        let target_width = ((page.width().value / 72.0) * dpi as f32) as i32;
        let render_config = PdfRenderConfig::new()
            .set_target_width(target_width.clamp(1, max_pixels as i32))
            .set_maximum_height(max_pixels as i32);

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| RasterError::Page {
                page: idx + 1,
                detail: format!("{e:?}"),
            })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            idx + 1,
            image.width(),
            image.height()
        );

        rendered.push(encode_png(&image).map_err(|e| RasterError::Page {
            page: idx + 1,
            detail: format!("PNG encoding failed: {e}"),
        })?);
    }

    Ok(rendered)
}

/// Encode a rendered page as PNG bytes for the OCR engine.
fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
    Ok(buf)
}
