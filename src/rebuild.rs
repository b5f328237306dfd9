//! Output document reconstruction.
//!
//! Builds a new PDF page-by-page, embedding each rendered raster as a
//! single full-page image. Pages keep the source geometry: the MediaBox is
//! the original width and height in points, and the image is stretched over
//! exactly that box. No vector content is added.

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};

use crate::error::{PdfDuskError, Result};
use crate::render::PageRaster;

/// Incremental builder for an image-backed output document.
///
/// Pages must be appended in order by a single owner; the builder is not
/// meant to be shared across threads. `finish` seals the document exactly
/// once.
pub struct DocumentBuilder {
    doc: Document,
    pages_id: ObjectId,
    page_ids: Vec<ObjectId>,
}

impl DocumentBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            page_ids: Vec::new(),
        }
    }

    /// Number of pages appended so far.
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Append one page carrying `raster` as its full-page content.
    ///
    /// The new page's MediaBox is `[0 0 width_pts height_pts]` taken from
    /// the raster's source geometry.
    ///
    /// # Errors
    ///
    /// Returns an embed error if the pixel buffer does not match its
    /// declared dimensions (a violated internal invariant) or the raster is
    /// empty. Either is fatal for the document build.
    pub fn append_page(&mut self, raster: &PageRaster) -> Result<()> {
        let page_index = self.page_ids.len();
        let width = raster.pixel_width();
        let height = raster.pixel_height();

        if width == 0 || height == 0 {
            return Err(PdfDuskError::embed_failed(page_index, "raster is empty"));
        }

        let samples = raster.pixels.as_raw();
        let expected = width as usize * height as usize * 3;
        if samples.len() != expected {
            return Err(PdfDuskError::embed_failed(
                page_index,
                format!(
                    "pixel buffer holds {} bytes, expected {} for {}x{} RGB",
                    samples.len(),
                    expected,
                    width,
                    height
                ),
            ));
        }

        let image_stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width as i64,
                "Height" => height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
            },
            samples.clone(),
        );
        let image_id = self.doc.add_object(image_stream);

        // Scale the unit image square up to the page box.
        let image_name = format!("Im{page_index}");
        let content = format!(
            "q\n{:.4} 0 0 {:.4} 0 0 cm\n/{} Do\nQ\n",
            raster.width_pts, raster.height_pts, image_name
        );
        let content_id = self
            .doc
            .add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let mut xobjects = Dictionary::new();
        xobjects.set(image_name, Object::Reference(image_id));

        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                raster.width_pts.into(),
                raster.height_pts.into(),
            ],
            "Resources" => dictionary! {
                "XObject" => Object::Dictionary(xobjects),
            },
            "Contents" => content_id,
        });

        self.page_ids.push(page_id);
        Ok(())
    }

    /// Seal the document: write the page tree and catalog, and hand the
    /// finished `lopdf::Document` to the caller.
    pub fn finish(mut self) -> Document {
        let kids: Vec<Object> = self
            .page_ids
            .iter()
            .map(|&id| Object::Reference(id))
            .collect();

        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => self.page_ids.len() as i64,
        };
        self.doc
            .objects
            .insert(self.pages_id, Object::Dictionary(pages_dict));

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        self.doc
    }
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}
