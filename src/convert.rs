//! Dark-mode document conversion.
//!
//! Drives the per-page pipeline (rasterize, invert, rebuild) over every
//! page of one source document, strictly in page order. The first page
//! failure aborts the whole conversion and the partially built output is
//! discarded: a partial dark-mode document is never returned as success.

use std::path::Path;

use lopdf::Document;

use crate::batch::CancelFlag;
use crate::error::{PdfDuskError, Result};
use crate::invert::invert_in_place;
use crate::rebuild::DocumentBuilder;
use crate::render::SourcePdf;

/// Converts one PDF document into its dark-mode counterpart.
///
/// Conversion is synchronous and CPU-bound; callers on an async runtime
/// should place it on a blocking thread.
pub struct DocumentConverter {
    scale: f32,
}

impl DocumentConverter {
    /// Create a converter rendering at `scale` times native resolution.
    pub fn new(scale: f32) -> Self {
        Self { scale }
    }

    /// Convert the document at `input` to a dark-mode output document.
    ///
    /// `on_page` is called after each completed page with
    /// `(pages_done, total_pages)`. Cancellation is checked between pages;
    /// the current page is always finished before the flag is honored.
    ///
    /// Converting the same input twice with the same scale produces
    /// identical output.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be opened, or a conversion
    /// error carrying the page index and cause if any page fails to render
    /// or embed.
    pub fn convert<F>(&self, input: &Path, cancel: &CancelFlag, mut on_page: F) -> Result<Document>
    where
        F: FnMut(usize, usize),
    {
        let source = SourcePdf::open(input)?;
        let total_pages = source.page_count();

        let mut builder = DocumentBuilder::new();
        for page_index in 0..total_pages {
            if cancel.is_cancelled() {
                return Err(PdfDuskError::Cancelled);
            }

            let mut raster = source
                .rasterize(page_index, self.scale)
                .map_err(|e| PdfDuskError::conversion_failed(input.to_path_buf(), page_index, e))?;

            invert_in_place(&mut raster.pixels);

            builder
                .append_page(&raster)
                .map_err(|e| PdfDuskError::conversion_failed(input.to_path_buf(), page_index, e))?;

            on_page(page_index + 1, total_pages);
        }

        Ok(builder.finish())
    }
}
