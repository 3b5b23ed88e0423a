//! Pipeline stages between raw document bytes and extracted text.
//!
//! ## Data Flow
//!
//! ```text
//! Document ──▶ raster ──▶ OCR ──▶ ExtractedText
//! (bytes)     (pdfium,   (engine  (space-joined,
//!              PDF only)  seam)    reading order)
//! ```
//!
//! 1. [`raster`]  — rasterise PDF pages to PNGs; runs in `spawn_blocking`
//!    because pdfium is not async-safe. Images skip this stage.
//! 2. [`extract`] — run the OCR engine per page/image and join the
//!    recognised texts in order.

pub mod extract;
pub mod raster;
