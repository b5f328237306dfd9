//! Page rasterization.
//!
//! Renders source PDF pages into in-memory RGB rasters using `hayro`, at a
//! configurable multiple of the page's native resolution. At scale 1.0 one
//! pixel corresponds to one PDF point (1/72 inch), so page geometry in
//! points can be recovered from the pixel dimensions of the render.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use hayro::{InterpreterSettings, Pdf, RenderSettings};
use image::RgbImage;

use crate::error::{PdfDuskError, Result};

/// A rendered page: a tightly packed 8-bit RGB pixel buffer together with
/// the page's geometry in PDF points.
///
/// The buffer always holds exactly `width * height * 3` bytes; the rebuild
/// stage treats any mismatch as a fatal internal error.
pub struct PageRaster {
    /// Decoded pixel data, row-major RGB8.
    pub pixels: RgbImage,
    /// Page width in PDF points.
    pub width_pts: f32,
    /// Page height in PDF points.
    pub height_pts: f32,
}

impl PageRaster {
    /// Raster width in pixels.
    pub fn pixel_width(&self) -> u32 {
        self.pixels.width()
    }

    /// Raster height in pixels.
    pub fn pixel_height(&self) -> u32 {
        self.pixels.height()
    }
}

/// An opened source PDF, ready for page rendering.
///
/// Owns the parsed document for the duration of one conversion; pages are
/// only ever read, never mutated.
pub struct SourcePdf {
    pdf: Pdf,
    path: PathBuf,
}

impl SourcePdf {
    /// Open and parse a PDF file for rendering.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The file is not a parseable PDF
    /// - The document contains no pages
    pub fn open(path: &Path) -> Result<Self> {
        let data = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PdfDuskError::file_not_found(path.to_path_buf()),
            _ => PdfDuskError::FileNotAccessible {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        let pdf = Pdf::new(Arc::new(data)).map_err(|e| {
            PdfDuskError::failed_to_load_pdf(path.to_path_buf(), format!("{e:?}"))
        })?;

        if pdf.pages().is_empty() {
            return Err(PdfDuskError::corrupted_pdf(
                path.to_path_buf(),
                "PDF has no pages",
            ));
        }

        Ok(Self {
            pdf,
            path: path.to_path_buf(),
        })
    }

    /// Path this document was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.pdf.pages().len()
    }

    /// Render one page at `scale` times its native resolution.
    ///
    /// Memory and time cost grow linearly with pixel count, i.e.
    /// quadratically with `scale`.
    ///
    /// # Errors
    ///
    /// Returns a page render error if the page index is out of bounds or
    /// the rendered bitmap cannot be decoded. A failure here aborts the
    /// conversion of the whole document; partial conversions are never kept.
    pub fn rasterize(&self, page_index: usize, scale: f32) -> Result<PageRaster> {
        let pages = self.pdf.pages();
        let page = pages.get(page_index).ok_or_else(|| {
            PdfDuskError::render_failed(
                self.path.clone(),
                page_index,
                format!("page index out of bounds (document has {} pages)", pages.len()),
            )
        })?;

        let render_settings = RenderSettings {
            x_scale: scale,
            y_scale: scale,
            width: None,
            height: None,
        };
        let interpreter_settings = InterpreterSettings::default();

        let pixmap = hayro::render(page, &interpreter_settings, &render_settings);
        let png_data = pixmap.take_png();

        let pixels = image::load_from_memory(&png_data)
            .map_err(|e| {
                PdfDuskError::render_failed(
                    self.path.clone(),
                    page_index,
                    format!("failed to decode rendered bitmap: {e}"),
                )
            })?
            .to_rgb8();

        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(PdfDuskError::render_failed(
                self.path.clone(),
                page_index,
                "rendered bitmap is empty",
            ));
        }

        Ok(PageRaster {
            width_pts: pixels.width() as f32 / scale,
            height_pts: pixels.height() as f32 / scale,
            pixels,
        })
    }
}
