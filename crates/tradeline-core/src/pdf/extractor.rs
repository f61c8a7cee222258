//! PDF text and image extraction using lopdf and pdf-extract.

use image::{DynamicImage, ImageBuffer, Rgba};
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashSet;
use tracing::{debug, trace};

use super::{PdfProcessor, Result};
use crate::error::PdfError;

/// PDF extractor backed by a loaded lopdf document.
///
/// `raw_data` keeps the (decrypted) bytes for pdf-extract, which parses the
/// file independently.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

impl PdfExtractor {
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    /// Load a document, mapping failures to `PdfError`.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut extractor = Self::new();
        extractor.load(data)?;
        Ok(extractor)
    }

    fn document(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or_else(|| PdfError::Parse("no document loaded".to_string()))
    }

    /// Text of every page through lopdf, pages joined by blank lines.
    pub fn extract_pages_text(&self) -> Result<String> {
        let mut text = String::new();
        for page in 1..=self.page_count() {
            match self.extract_page_text(page) {
                Ok(page_text) if !page_text.trim().is_empty() => {
                    if !text.is_empty() {
                        text.push_str("\n\n");
                    }
                    text.push_str(page_text.trim_end());
                }
                Ok(_) => trace!("Page {} has no text layer", page),
                Err(e) => debug!("lopdf failed on page {}: {}", page, e),
            }
        }
        Ok(text)
    }

    /// Every decodable image in the document, in page order.
    pub fn extract_all_images(&self) -> Result<Vec<DynamicImage>> {
        let doc = self.document()?;
        let mut images = Vec::new();
        let mut seen: HashSet<ObjectId> = HashSet::new();

        for (_, page_id) in doc.get_pages() {
            for (id, obj) in self.page_image_objects(doc, page_id) {
                if seen.insert(id) {
                    if let Some(img) = decode_image_object(doc, obj) {
                        images.push(img);
                    }
                }
            }
        }

        // Scanned documents sometimes keep images outside page resources
        if images.is_empty() {
            for (id, obj) in doc.objects.iter() {
                if seen.insert(*id) {
                    if let Some(img) = decode_image_object(doc, obj) {
                        images.push(img);
                    }
                }
            }
        }

        debug!("Found {} images in document", images.len());
        Ok(images)
    }

    fn page_image_objects<'a>(&self, doc: &'a Document, page_id: ObjectId) -> Vec<(ObjectId, &'a Object)> {
        let Some(resources) = page_resources(doc, page_id) else {
            return Vec::new();
        };
        let Ok(xobjects) = resources.get(b"XObject") else {
            return Vec::new();
        };
        let Ok((_, Object::Dictionary(xobj_dict))) = doc.dereference(xobjects) else {
            return Vec::new();
        };

        xobj_dict
            .iter()
            .filter_map(|(_, obj_ref)| match obj_ref {
                Object::Reference(id) => doc.get_object(*id).ok().map(|obj| (*id, obj)),
                _ => None,
            })
            .collect()
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        if doc.is_encrypted() {
            // Many reports are "encrypted" with an empty user password
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted = Vec::new();
            doc.save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_text(&self) -> Result<String> {
        pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }

    fn extract_page_text(&self, page: u32) -> Result<String> {
        let doc = self.document()?;
        if !doc.get_pages().contains_key(&page) {
            return Err(PdfError::InvalidPage(page));
        }
        doc.extract_text(&[page])
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }

    fn extract_images(&self, page: u32) -> Result<Vec<DynamicImage>> {
        let doc = self.document()?;
        let page_id = *doc
            .get_pages()
            .get(&page)
            .ok_or(PdfError::InvalidPage(page))?;

        let images: Vec<DynamicImage> = self
            .page_image_objects(doc, page_id)
            .into_iter()
            .filter_map(|(_, obj)| decode_image_object(doc, obj))
            .collect();

        debug!("Extracted {} images from page {}", images.len(), page);
        Ok(images)
    }
}

/// Resources dictionary for a page, following `Parent` inheritance.
fn page_resources(doc: &Document, node_id: ObjectId) -> Option<Dictionary> {
    let Object::Dictionary(dict) = doc.get_object(node_id).ok()? else {
        return None;
    };

    if let Ok(resources) = dict.get(b"Resources") {
        if let Ok((_, Object::Dictionary(res_dict))) = doc.dereference(resources) {
            return Some(res_dict.clone());
        }
    }

    match dict.get(b"Parent") {
        Ok(Object::Reference(parent_id)) => page_resources(doc, *parent_id),
        _ => None,
    }
}

/// Decode an image XObject (JPEG or raw 8-bit RGB/gray).
fn decode_image_object(doc: &Document, obj: &Object) -> Option<DynamicImage> {
    let Object::Stream(stream) = obj else {
        return None;
    };
    let dict = &stream.dict;
    if dict.get(b"Subtype").ok()?.as_name().ok()? != b"Image" {
        return None;
    }

    let width = dict.get(b"Width").ok()?.as_i64().ok()? as u32;
    let height = dict.get(b"Height").ok()?.as_i64().ok()? as u32;
    trace!("Found image object: {}x{}", width, height);

    let filter = dict.get(b"Filter").ok().and_then(|f| match f {
        Object::Name(name) => Some(name.as_slice()),
        Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
        _ => None,
    });
    match filter {
        Some(b"DCTDecode") => {
            return image::load_from_memory_with_format(&stream.content, image::ImageFormat::Jpeg).ok();
        }
        Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
            trace!("Unsupported image filter {:?}", filter.map(String::from_utf8_lossy));
            return None;
        }
        _ => {}
    }

    let data = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());

    let color_space = dict
        .get(b"ColorSpace")
        .ok()
        .and_then(|o| match o {
            Object::Name(name) => Some(name.as_slice()),
            Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
            Object::Reference(r) => doc.get_object(*r).ok().and_then(|o| o.as_name().ok()),
            _ => None,
        })
        .unwrap_or(b"DeviceRGB");

    let bits = dict
        .get(b"BitsPerComponent")
        .ok()
        .and_then(|o| o.as_i64().ok())
        .unwrap_or(8);

    image_from_raw(&data, width, height, color_space, bits)
}

fn image_from_raw(
    data: &[u8],
    width: u32,
    height: u32,
    color_space: &[u8],
    bits_per_component: i64,
) -> Option<DynamicImage> {
    if bits_per_component != 8 {
        trace!("Unsupported bits per component: {}", bits_per_component);
        return None;
    }

    let pixels = (width as usize) * (height as usize);
    let channels = match color_space {
        b"DeviceRGB" | b"RGB" => 3,
        b"DeviceGray" | b"G" => 1,
        _ => return None,
    };
    if data.len() < pixels * channels {
        trace!("Image data too short: {} < {}", data.len(), pixels * channels);
        return None;
    }

    let mut rgba = Vec::with_capacity(pixels * 4);
    for px in data[..pixels * channels].chunks(channels) {
        match px {
            [r, g, b] => rgba.extend_from_slice(&[*r, *g, *b, 255]),
            [gray] => rgba.extend_from_slice(&[*gray, *gray, *gray, 255]),
            _ => return None,
        }
    }

    ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, rgba).map(DynamicImage::ImageRgba8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_loaded() {
        let extractor = PdfExtractor::new();
        assert_eq!(extractor.page_count(), 0);
        assert!(extractor.extract_page_text(1).is_err());
    }

    #[test]
    fn test_invalid_bytes() {
        assert!(matches!(
            PdfExtractor::from_bytes(b"not a pdf"),
            Err(PdfError::Parse(_))
        ));
    }

    #[test]
    fn test_gray_image_from_raw() {
        let img = image_from_raw(&[0, 128, 255, 64], 2, 2, b"DeviceGray", 8).unwrap();
        assert_eq!((img.width(), img.height()), (2, 2));
        assert!(image_from_raw(&[0, 1], 2, 2, b"DeviceGray", 8).is_none());
        assert!(image_from_raw(&[0; 12], 2, 2, b"DeviceRGB", 16).is_none());
    }
}
