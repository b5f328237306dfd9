//! Shared fixture builders and inspection helpers.
//!
//! Fixtures are generated with lopdf instead of checked-in binaries: solid
//! color fills give exact, predictable pixel values after rendering.

use lopdf::{Dictionary, Document, Object, Stream, dictionary};
use std::io::Write;
use std::path::Path;

/// Write a PDF whose pages are solid-colored fills covering the whole
/// `width` x `height` point page.
pub fn write_solid_pages_pdf(
    path: &Path,
    colors: &[(f32, f32, f32)],
    width: i32,
    height: i32,
) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut page_ids = Vec::new();
    for (r, g, b) in colors {
        let content = format!("{r} {g} {b} rg\n0 0 {width} {height} re\nf\n");
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
            "Resources" => Dictionary::new(),
            "Contents" => content_id,
        });
        page_ids.push(page_id);
    }

    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => page_ids.iter().map(|&id| id.into()).collect::<Vec<Object>>(),
        "Count" => page_ids.len() as i64,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

/// Write a file that is not a parseable PDF.
pub fn write_corrupt_pdf(path: &Path) {
    let mut file = std::fs::File::create(path).unwrap();
    file.write_all(b"%PDF-1.5 truncated garbage").unwrap();
}

/// Decode the embedded page images of an image-backed document, in page
/// order.
pub fn embedded_images(doc: &Document) -> Vec<Vec<u8>> {
    let mut streams: Vec<(lopdf::ObjectId, Vec<u8>)> = doc
        .objects
        .iter()
        .filter_map(|(&id, obj)| match obj {
            Object::Stream(s)
                if s.dict.get(b"Subtype").and_then(Object::as_name).ok()
                    == Some(b"Image".as_slice()) =>
            {
                let content = s
                    .decompressed_content()
                    .unwrap_or_else(|_| s.content.clone());
                Some((id, content))
            }
            _ => None,
        })
        .collect();
    streams.sort_by_key(|(id, _)| *id);
    streams.into_iter().map(|(_, c)| c).collect()
}

/// MediaBox (width, height) of each page, in page order.
pub fn page_boxes(doc: &Document) -> Vec<(f32, f32)> {
    doc.get_pages()
        .into_values()
        .map(|page_id| {
            let Object::Dictionary(dict) = doc.get_object(page_id).unwrap() else {
                panic!("page is not a dictionary");
            };
            let Object::Array(arr) = dict.get(b"MediaBox").unwrap() else {
                panic!("MediaBox is not an array");
            };
            (arr[2].as_float().unwrap(), arr[3].as_float().unwrap())
        })
        .collect()
}

/// Sample the pixel at the center of a raw RGB image buffer.
pub fn center_pixel(data: &[u8], width: usize, height: usize) -> [u8; 3] {
    let offset = ((height / 2) * width + width / 2) * 3;
    [data[offset], data[offset + 1], data[offset + 2]]
}
